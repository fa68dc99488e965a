//! Model coercion and dumping.
//!
//! Decoding trusts the server: unknown keys are dropped, missing required
//! fields are left unset, and mismatched field values are kept as raw JSON.
//! Dumping emits only the fields that are set, under their wire keys, so an
//! unset optional field never turns into `null`.

use schema::{FieldSchema, ModelInstance, ModelSchema, Typed};
use serde_json::{Map, Value};

use crate::state::{CoerceState, DumpState};
use crate::Convert;

pub(crate) fn coerce_model(
    schema: &'static ModelSchema,
    value: &Value,
    state: &mut CoerceState,
) -> Typed {
    state.attempt();
    let Value::Object(object) = value else {
        return Typed::passthrough(value);
    };
    state.hit();

    let mut instance = ModelInstance::new(schema);
    for field in schema.fields() {
        let Some(raw) = object.get(field.wire_key) else {
            continue;
        };
        if raw.is_null() && field.nullable {
            state.attempt();
            state.hit();
            instance.insert(field, Typed::Null);
            continue;
        }
        instance.insert(field, field.converter.coerce(raw, state));
    }
    Typed::Model(instance)
}

fn dump_field(field: &FieldSchema, value: &Typed, state: &mut DumpState) -> Value {
    if value.is_null() {
        state.attempt();
        if field.nullable {
            state.hit();
        }
        return Value::Null;
    }
    field.converter.dump(value, state)
}

/// Dump a model instance; the caller has already counted the attempt.
pub(crate) fn dump_instance(instance: &ModelInstance, state: &mut DumpState) -> Value {
    state.hit();
    let mut object = Map::new();
    for field in instance.schema().fields() {
        if let Some(value) = instance.get(field.name) {
            object.insert(field.wire_key.to_string(), dump_field(field, value, state));
        }
    }
    Value::Object(object)
}

pub(crate) fn dump_model(
    schema: &'static ModelSchema,
    value: &Typed,
    state: &mut DumpState,
) -> Value {
    state.attempt();
    match value {
        Typed::Model(instance) if instance.name() == schema.name => dump_instance(instance, state),
        // Plain maps are accepted as field-name or wire-key keyed payloads.
        Typed::Map(entries) => {
            state.hit();
            let mut object = Map::new();
            for field in schema.fields() {
                let entry = entries.get(field.name).or_else(|| entries.get(field.wire_key));
                if let Some(value) = entry {
                    object.insert(field.wire_key.to_string(), dump_field(field, value, state));
                }
            }
            Value::Object(object)
        }
        other => other.to_wire(),
    }
}
