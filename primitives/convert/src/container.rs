//! List-of and map-of coercers.
//!
//! The wire shape of an empty collection is decided by the converter kind,
//! not by the typed value: `[]` and `{}` are not interchangeable on the wire,
//! and an empty typed list may well be headed for a map-of field.

use indexmap::IndexMap;
use schema::{ContainerSchema, Typed};
use serde_json::{Map, Value};

use crate::state::{CoerceState, DumpState};
use crate::Convert;

fn coerce_element(container: &ContainerSchema, item: &Value, state: &mut CoerceState) -> Typed {
    if item.is_null() && container.nullable {
        state.attempt();
        state.hit();
        return Typed::Null;
    }
    container.inner.coerce(item, state)
}

fn dump_element(container: &ContainerSchema, item: &Typed, state: &mut DumpState) -> Value {
    if item.is_null() && container.nullable {
        state.attempt();
        state.hit();
        return Value::Null;
    }
    container.inner.dump(item, state)
}

/// Whether the value is a collection without elements, typed or raw.
fn is_empty_collection(value: &Typed) -> bool {
    match value {
        Typed::List(items) => items.is_empty(),
        Typed::Map(entries) => entries.is_empty(),
        Typed::Raw(Value::Array(items)) => items.is_empty(),
        Typed::Raw(Value::Object(entries)) => entries.is_empty(),
        _ => false,
    }
}

pub(crate) fn coerce_list(
    container: &ContainerSchema,
    value: &Value,
    state: &mut CoerceState,
) -> Typed {
    state.attempt();
    let Value::Array(items) = value else {
        return Typed::passthrough(value);
    };
    state.hit();
    Typed::List(items.iter().map(|item| coerce_element(container, item, state)).collect())
}

pub(crate) fn coerce_map(
    container: &ContainerSchema,
    value: &Value,
    state: &mut CoerceState,
) -> Typed {
    state.attempt();
    let Value::Object(entries) = value else {
        return Typed::passthrough(value);
    };
    state.hit();
    let mut coerced = IndexMap::with_capacity(entries.len());
    for (key, item) in entries {
        coerced.insert(key.clone(), coerce_element(container, item, state));
    }
    Typed::Map(coerced)
}

pub(crate) fn dump_list(
    container: &ContainerSchema,
    value: &Typed,
    state: &mut DumpState,
) -> Value {
    state.attempt();
    match value {
        Typed::List(items) => {
            state.hit();
            Value::Array(items.iter().map(|item| dump_element(container, item, state)).collect())
        }
        Typed::Raw(array @ Value::Array(_)) => {
            state.hit();
            array.clone()
        }
        // An empty map headed for a list field still goes out as `[]`.
        other if is_empty_collection(other) => Value::Array(Vec::new()),
        other => other.to_wire(),
    }
}

pub(crate) fn dump_map(
    container: &ContainerSchema,
    value: &Typed,
    state: &mut DumpState,
) -> Value {
    state.attempt();
    match value {
        Typed::Map(entries) => {
            state.hit();
            let mut object = Map::new();
            for (key, item) in entries {
                object.insert(key.clone(), dump_element(container, item, state));
            }
            Value::Object(object)
        }
        Typed::Raw(object @ Value::Object(_)) => {
            state.hit();
            object.clone()
        }
        other if is_empty_collection(other) => Value::Object(Map::new()),
        other => other.to_wire(),
    }
}
