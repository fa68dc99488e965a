//! Union resolution.
//!
//! Every candidate is tried against a fresh state and the one with the most
//! matched sub-values wins. Ties go to the candidate declared first, and a
//! value no candidate matches is passed through unchanged.
//!
//! When the payload's discriminator names a tag, only the variants carrying
//! that tag are candidates.

use schema::{Typed, UnionSchema, UnionVariant};
use serde_json::Value;

use crate::state::{CoerceState, DumpState};
use crate::Convert;

/// Variants whose tag equals the payload's discriminator value.
///
/// Empty when the union has no discriminator, the payload carries no string
/// tag, or no declared tag matches it.
fn discriminated<'a>(union: &'a UnionSchema, value: &Value) -> Vec<&'a UnionVariant> {
    let tag = union
        .discriminator()
        .and_then(|field| value.get(field))
        .and_then(Value::as_str);
    match tag {
        Some(tag) => union.tagged(tag).collect(),
        None => Vec::new(),
    }
}

pub(crate) fn coerce_union(
    union: &UnionSchema,
    value: &Value,
    state: &mut CoerceState,
) -> Typed {
    state.attempt();

    let tagged = discriminated(union, value);
    if let [variant] = tagged.as_slice() {
        let mut trial = CoerceState::new();
        let typed = variant.converter.coerce(value, &mut trial);
        state.absorb(trial);
        return typed;
    }
    let candidates = if tagged.is_empty() { union.variants().iter().collect() } else { tagged };

    let mut best: Option<(Typed, CoerceState)> = None;
    for variant in &candidates {
        let mut trial = CoerceState::new();
        let typed = variant.converter.coerce(value, &mut trial);
        let better = best.as_ref().map_or(true, |(_, current)| trial.matched > current.matched);
        if better {
            best = Some((typed, trial));
        }
    }

    match best {
        Some((typed, trial)) if trial.matched > 0 => {
            state.absorb(trial);
            typed
        }
        _ => {
            tracing::debug!(
                candidates = candidates.len(),
                "no union candidate matched, passing value through"
            );
            Typed::passthrough(value)
        }
    }
}

pub(crate) fn dump_union(union: &UnionSchema, value: &Typed, state: &mut DumpState) -> Value {
    state.attempt();

    let mut best: Option<(Value, DumpState)> = None;
    for variant in union.variants() {
        let mut trial = DumpState::new();
        let wire = variant.converter.dump(value, &mut trial);
        let better = best.as_ref().map_or(true, |(_, current)| trial.matched > current.matched);
        if better {
            best = Some((wire, trial));
        }
    }

    match best {
        Some((wire, trial)) if trial.matched > 0 => {
            state.absorb(trial);
            wire
        }
        _ => value.to_wire(),
    }
}

#[cfg(test)]
mod tests {
    use schema::Converter;
    use serde_json::json;

    use super::*;

    fn string_or_float() -> UnionSchema {
        UnionSchema::of([Converter::string(), Converter::float()])
    }

    fn coerce(union: &UnionSchema, value: Value) -> (Typed, CoerceState) {
        let mut state = CoerceState::new();
        let typed = coerce_union(union, &value, &mut state);
        (typed, state)
    }

    #[test]
    fn test_exact_type_wins() {
        assert_eq!(coerce(&string_or_float(), json!("3.5")).0, Typed::String("3.5".into()));
        assert_eq!(coerce(&string_or_float(), json!(3.5)).0, Typed::Float(3.5));
    }

    #[test]
    fn test_ties_go_to_first_declared() {
        let union = UnionSchema::of([Converter::float(), Converter::int()]);
        assert_eq!(coerce(&union, json!(4)).0, Typed::Float(4.0));

        let union = UnionSchema::of([Converter::int(), Converter::float()]);
        assert_eq!(coerce(&union, json!(4)).0, Typed::Int(4));
    }

    #[test]
    fn test_unmatched_value_falls_through() {
        let (typed, state) = coerce(&string_or_float(), json!({"unexpected": true}));
        assert_eq!(typed, Typed::Raw(json!({"unexpected": true})));
        assert_eq!(state, CoerceState { matched: 0, attempted: 1 });
    }

    #[test]
    fn test_discriminator_selects_single_tag() {
        let union = UnionSchema::new(vec![
            UnionVariant::tagged("text", Converter::map_of(Converter::string())),
            UnionVariant::tagged("count", Converter::map_of(Converter::int())),
        ])
        .with_discriminator("kind");

        // Scoring alone would pick the string map: both keys are strings.
        let (typed, _) = coerce(&union, json!({"kind": "count", "value": "7"}));
        let Typed::Map(entries) = typed else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("value"), Some(&Typed::Raw(json!("7"))));

        // Unknown tags fall back to scoring.
        let (typed, _) = coerce(&union, json!({"kind": "other", "value": "7"}));
        let Typed::Map(entries) = typed else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("value"), Some(&Typed::String("7".into())));
    }

    #[test]
    fn test_shared_tag_scores_only_tagged_variants() {
        let union = UnionSchema::new(vec![
            UnionVariant::new(Converter::map_of(Converter::string())),
            UnionVariant::tagged("n", Converter::map_of(Converter::int())),
            UnionVariant::tagged("n", Converter::map_of(Converter::bool())),
        ])
        .with_discriminator("k");

        // The untagged string map would win the tie; it is not a candidate.
        let (typed, _) = coerce(&union, json!({"k": "n", "v": true}));
        let Typed::Map(entries) = typed else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("k"), Some(&Typed::Raw(json!("n"))));
        assert_eq!(entries.get("v"), Some(&Typed::Bool(true)));

        // Neither tagged variant matches the values: first tagged one wins the tie.
        let (typed, state) = coerce(&union, json!({"k": "n", "v": "s"}));
        let Typed::Map(entries) = typed else {
            panic!("expected a map");
        };
        assert_eq!(entries.get("v"), Some(&Typed::Raw(json!("s"))));
        assert_eq!(state.matched, 1);
    }

    #[test]
    fn test_dump_keeps_best_shape() {
        let union = UnionSchema::of([
            Converter::map_of(Converter::int()),
            Converter::list_of(Converter::int()),
        ]);
        let mut state = DumpState::new();
        assert_eq!(dump_union(&union, &Typed::List(Vec::new()), &mut state), json!([]));
        assert_eq!(dump_union(&union, &Typed::Map(Default::default()), &mut state), json!({}));
        assert_eq!(dump_union(&union, &Typed::List(vec![Typed::Int(1)]), &mut state), json!([1]));

        let typed = Typed::Map([("a".to_string(), Typed::Int(1))].into_iter().collect());
        assert_eq!(dump_union(&union, &typed, &mut state), json!({"a": 1}));

        let mut missed = DumpState::new();
        assert_eq!(dump_union(&string_or_float(), &Typed::Bool(true), &mut missed), json!(true));
        assert_eq!(missed.matched, 0);
    }
}
