//! Scalar and enum coercers.
//!
//! Both are lenient: a wire value of the wrong type is handed back unchanged
//! (as [`Typed::Raw`], or [`Typed::Null`] for `null`) and simply does not
//! count as a match. Unknown enum literals are kept the same way so that
//! server-side additions never break decoding.

use chrono::{DateTime, NaiveDate};
use schema::{EnumMember, EnumSchema, ScalarKind, Typed, DATE_FORMAT};
use serde_json::{Number, Value};

use crate::state::{CoerceState, DumpState};

/// Integer view of a JSON number; floats qualify when they have no fraction
/// and fit in `i64`.
fn integer_of(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub(crate) fn coerce_scalar(kind: ScalarKind, value: &Value, state: &mut CoerceState) -> Typed {
    state.attempt();
    let typed = match (kind, value) {
        (ScalarKind::String, Value::String(s)) => Some(Typed::String(s.clone())),
        (ScalarKind::Int, Value::Number(n)) => integer_of(n).map(Typed::Int),
        (ScalarKind::Float, Value::Number(n)) => n.as_f64().map(Typed::Float),
        (ScalarKind::Bool, Value::Bool(b)) => Some(Typed::Bool(*b)),
        (ScalarKind::Date, Value::String(s)) =>
            NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(Typed::Date),
        (ScalarKind::DateTime, Value::String(s)) =>
            DateTime::parse_from_rfc3339(s).ok().map(Typed::DateTime),
        (ScalarKind::Any, other) => Some(Typed::passthrough(other)),
        _ => None,
    };

    match typed {
        Some(typed) => {
            state.hit();
            typed
        }
        None => Typed::passthrough(value),
    }
}

pub(crate) fn dump_scalar(kind: ScalarKind, value: &Typed, state: &mut DumpState) -> Value {
    state.attempt();
    let fits = matches!(
        (kind, value),
        (ScalarKind::String, Typed::String(_))
            | (ScalarKind::Int, Typed::Int(_))
            | (ScalarKind::Float, Typed::Float(_) | Typed::Int(_))
            | (ScalarKind::Bool, Typed::Bool(_))
            | (ScalarKind::Date, Typed::Date(_))
            | (ScalarKind::DateTime, Typed::DateTime(_))
            | (ScalarKind::Any, _)
    );
    if fits {
        state.hit();
    }
    value.to_wire()
}

pub(crate) fn coerce_enum(
    schema: &'static EnumSchema,
    value: &Value,
    state: &mut CoerceState,
) -> Typed {
    state.attempt();
    match schema.find(value) {
        Some(literal) => {
            state.hit();
            Typed::Enum(EnumMember::new(schema, literal))
        }
        None => Typed::passthrough(value),
    }
}

pub(crate) fn dump_enum(
    schema: &'static EnumSchema,
    value: &Typed,
    state: &mut DumpState,
) -> Value {
    state.attempt();
    let wire = value.to_wire();
    let fits = match value {
        Typed::Enum(member) => member.schema().name == schema.name,
        _ => schema.find(&wire).is_some(),
    };
    if fits {
        state.hit();
    }
    wire
}

#[cfg(test)]
mod tests {
    use schema::WireLiteral;
    use serde_json::json;

    use super::*;

    static PRIORITY: EnumSchema =
        EnumSchema::new("Priority", &[WireLiteral::Str("low"), WireLiteral::Int(9)]);

    fn coerce(kind: ScalarKind, value: Value) -> (Typed, CoerceState) {
        let mut state = CoerceState::new();
        let typed = coerce_scalar(kind, &value, &mut state);
        (typed, state)
    }

    #[test]
    fn test_matching_scalars_count() {
        assert_eq!(
            coerce(ScalarKind::String, json!("x")),
            (Typed::String("x".into()), CoerceState { matched: 1, attempted: 1 })
        );
        assert_eq!(coerce(ScalarKind::Int, json!(7)).0, Typed::Int(7));
        assert_eq!(coerce(ScalarKind::Int, json!(7.0)).0, Typed::Int(7));
        assert_eq!(coerce(ScalarKind::Float, json!(3)).0, Typed::Float(3.0));
        assert_eq!(coerce(ScalarKind::Bool, json!(false)).0, Typed::Bool(false));
    }

    #[test]
    fn test_mismatch_passes_through() {
        let (typed, state) = coerce(ScalarKind::Float, json!("3.5"));
        assert_eq!(typed, Typed::Raw(json!("3.5")));
        assert_eq!(state.matched, 0);
        assert_eq!(state.attempted, 1);

        assert_eq!(coerce(ScalarKind::Int, json!(7.5)).0, Typed::Raw(json!(7.5)));
        assert_eq!(coerce(ScalarKind::Int, json!(u64::MAX)).0, Typed::Raw(json!(u64::MAX)));
        assert_eq!(
            coerce(ScalarKind::String, json!(null)),
            (Typed::Null, CoerceState { matched: 0, attempted: 1 })
        );
    }

    #[test]
    fn test_dates() {
        let (typed, state) = coerce(ScalarKind::Date, json!("2024-03-01"));
        assert_eq!(typed.to_wire(), json!("2024-03-01"));
        assert_eq!(state.matched, 1);

        let (typed, state) = coerce(ScalarKind::Date, json!("01/03/2024"));
        assert_eq!(typed, Typed::Raw(json!("01/03/2024")));
        assert_eq!(state.matched, 0);

        let (typed, _) = coerce(ScalarKind::DateTime, json!("2024-03-01T08:15:00+01:00"));
        assert!(matches!(typed, Typed::DateTime(_)));
        assert_eq!(typed.to_wire(), json!("2024-03-01T08:15:00+01:00"));
    }

    #[test]
    fn test_any_always_matches() {
        let (typed, state) = coerce(ScalarKind::Any, json!({"free": ["form"]}));
        assert_eq!(typed, Typed::Raw(json!({"free": ["form"]})));
        assert_eq!(state.matched, 1);
    }

    #[test]
    fn test_enum_known_and_unknown_literals() {
        let mut state = CoerceState::new();
        let known = coerce_enum(&PRIORITY, &json!(9), &mut state);
        assert_eq!(known, Typed::Enum(EnumMember::new(&PRIORITY, WireLiteral::Int(9))));
        assert_eq!(state.matched, 1);

        let unknown = coerce_enum(&PRIORITY, &json!("urgent"), &mut state);
        assert_eq!(unknown, Typed::Raw(json!("urgent")));
        assert_eq!(state.matched, 1);
        assert_eq!(state.attempted, 2);
    }

    #[test]
    fn test_enum_dump_unwraps_member() {
        let mut state = DumpState::new();
        let member = Typed::Enum(EnumMember::new(&PRIORITY, WireLiteral::Str("low")));
        assert_eq!(dump_enum(&PRIORITY, &member, &mut state), json!("low"));
        assert_eq!(dump_enum(&PRIORITY, &Typed::String("low".into()), &mut state), json!("low"));
        assert_eq!(dump_enum(&PRIORITY, &Typed::String("high".into()), &mut state), json!("high"));
        assert_eq!(state, DumpState { matched: 2, attempted: 3 });
    }

    #[test]
    fn test_scalar_dump_is_identity() {
        let mut state = DumpState::new();
        assert_eq!(dump_scalar(ScalarKind::Float, &Typed::Int(2), &mut state), json!(2));
        assert_eq!(dump_scalar(ScalarKind::String, &Typed::Int(2), &mut state), json!(2));
        assert_eq!(state, DumpState { matched: 1, attempted: 2 });
    }
}
