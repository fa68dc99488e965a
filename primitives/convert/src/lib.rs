#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Tradewire Conversion Engine
//!
//! Walks [`Converter`] descriptors to turn wire JSON into [`Typed`] values
//! (`decode`) and back (`encode`).
//!
//! Decoding never fails on shape mismatches. A value that does not fit its
//! declared shape is kept as [`Typed::Raw`] and simply scores no match, so a
//! client compiled against an older schema keeps working when the server adds
//! fields, enum members, or union variants. The match counters collected on
//! the way drive union resolution; see [`CoerceState`].
//!
//! ```
//! use convert::decode;
//! use schema::{Converter, Typed};
//! use serde_json::json;
//!
//! let scalar = Converter::union_of([Converter::string(), Converter::float()]);
//! let converter = Converter::list_of(scalar);
//! let typed = decode(&converter, &json!(["x", 1.5]));
//! assert_eq!(typed, Typed::List(vec![Typed::String("x".into()), Typed::Float(1.5)]));
//! ```

mod container;
mod model;
mod scalar;
/// Per-call scoring counters.
pub mod state;
mod union;

use schema::{Converter, Model, ModelInstance, Typed};
use serde_json::Value;

pub use state::{CoerceState, DumpState};

/// Errors raised when a decoded value is read through a typed model view.
///
/// The engine itself never fails; these only surface at the boundary where a
/// caller insists on a particular shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The payload did not decode into a model at all
    #[error("Expected {expected} object, got {found}")]
    NotAModel {
        /// Expected model name
        expected: &'static str,
        /// Shape actually decoded
        found: &'static str,
    },
    /// The payload decoded into a different model
    #[error("Expected {expected}, decoded {found}")]
    WrongModel {
        /// Expected model name
        expected: &'static str,
        /// Decoded model name
        found: &'static str,
    },
    /// The payload was not a JSON array
    #[error("Expected a list of {expected}, got {found}")]
    NotAList {
        /// Expected element model name
        expected: &'static str,
        /// Shape actually decoded
        found: &'static str,
    },
    /// The body was not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self { ConvertError::Json(err.to_string()) }
}

/// The two directions of a converter.
pub trait Convert {
    /// Coerce a wire value, recording matches in `state`.
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Typed;

    /// Dump a typed value back to wire JSON, recording matches in `state`.
    fn dump(&self, value: &Typed, state: &mut DumpState) -> Value;
}

impl Convert for Converter {
    fn coerce(&self, value: &Value, state: &mut CoerceState) -> Typed {
        match self {
            Converter::Scalar(kind) => scalar::coerce_scalar(*kind, value, state),
            Converter::Enum(schema) => scalar::coerce_enum(schema, value, state),
            Converter::ListOf(container) => container::coerce_list(container, value, state),
            Converter::MapOf(container) => container::coerce_map(container, value, state),
            Converter::UnionOf(union) => union::coerce_union(union, value, state),
            Converter::Model(reference) => model::coerce_model(reference.resolve(), value, state),
        }
    }

    fn dump(&self, value: &Typed, state: &mut DumpState) -> Value {
        match self {
            Converter::Scalar(kind) => scalar::dump_scalar(*kind, value, state),
            Converter::Enum(schema) => scalar::dump_enum(schema, value, state),
            Converter::ListOf(container) => container::dump_list(container, value, state),
            Converter::MapOf(container) => container::dump_map(container, value, state),
            Converter::UnionOf(union) => union::dump_union(union, value, state),
            Converter::Model(reference) => model::dump_model(reference.resolve(), value, state),
        }
    }
}

/// Decode a wire value with a fresh state, returning the state as well.
pub fn decode_with_state(converter: &Converter, value: &Value) -> (Typed, CoerceState) {
    let mut state = CoerceState::new();
    let typed = converter.coerce(value, &mut state);
    (typed, state)
}

/// Decode a wire value.
///
/// The target converter comes first, as in every other entry point of this
/// crate; the wire value follows.
pub fn decode(converter: &Converter, value: &Value) -> Typed {
    decode_with_state(converter, value).0
}

/// Encode a typed value with a fresh state, returning the state as well.
pub fn encode_with_state(converter: &Converter, value: &Typed) -> (Value, DumpState) {
    let mut state = DumpState::new();
    let wire = converter.dump(value, &mut state);
    (wire, state)
}

/// Encode a typed value through `converter`, which comes first as in
/// [`decode`].
pub fn encode(converter: &Converter, value: &Typed) -> Value {
    encode_with_state(converter, value).0
}

/// JSON type name of a wire value, for diagnostics.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn model_name<M: Model>() -> &'static str {
    match M::converter() {
        Converter::Model(reference) => reference.name(),
        other => other.kind_name(),
    }
}

/// Decode a wire value into a model instance of `M`.
pub fn decode_instance<M: Model>(value: &Value) -> Result<ModelInstance, ConvertError> {
    let expected = model_name::<M>();
    match decode(M::converter(), value) {
        Typed::Model(instance) if instance.name() == expected => Ok(instance),
        Typed::Model(instance) =>
            Err(ConvertError::WrongModel { expected, found: instance.name() }),
        _ => Err(ConvertError::NotAModel { expected, found: json_kind(value) }),
    }
}

/// Decode a wire value into the typed view `M`.
///
/// Fails only when the payload is not an object; field-level mismatches show
/// up as `None` in the view.
pub fn decode_model<M: Model>(value: &Value) -> Result<M, ConvertError> {
    decode_instance::<M>(value).map(|instance| M::from_instance(&instance))
}

/// Decode a JSON array into typed views of `M`.
pub fn decode_models<M: Model>(value: &Value) -> Result<Vec<M>, ConvertError> {
    let Value::Array(items) = value else {
        return Err(ConvertError::NotAList {
            expected: model_name::<M>(),
            found: json_kind(value),
        });
    };
    items.iter().map(decode_model::<M>).collect()
}

/// Parse a JSON body and decode it into `M`.
pub fn from_str<M: Model>(body: &str) -> Result<M, ConvertError> {
    let value: Value = serde_json::from_str(body)?;
    decode_model::<M>(&value)
}

/// Encode a model instance, emitting only the fields that are set.
pub fn encode_instance(instance: &ModelInstance) -> Value {
    model::dump_instance(instance, &mut DumpState::new())
}

/// Encode the typed view `M`.
pub fn encode_model<M: Model>(model: &M) -> Value { encode_instance(&model.to_instance()) }
