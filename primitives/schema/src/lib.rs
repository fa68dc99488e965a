#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Tradewire Schema Descriptors
//!
//! This crate defines the declarative side of the conversion layer: the
//! [`Converter`] descriptors that describe how wire JSON maps onto typed
//! values, the [`Typed`] values themselves, and the [`Model`] / [`WireEnum`]
//! traits implemented by generated API models.
//!
//! Nothing in here walks JSON. The coercion engine lives in the `convert`
//! crate and the process-wide converter memo lives in the `registry` crate.

/// Converter descriptors (scalars, enums, containers, unions, models).
pub mod converter;
/// Typed values, model instances and typed views.
pub mod value;

pub use converter::{
    ContainerSchema, Converter, EnumSchema, FieldSchema, ModelRef, ModelSchema, ScalarKind,
    UnionSchema, UnionVariant, WireLiteral,
};
pub use value::{EnumMember, FromTyped, IntoTyped, ModelInstance, SchemaError, Typed, DATE_FORMAT};

/// A generated API model.
///
/// Implementors describe their fields once in [`Model::schema`]; the registry
/// memoizes the result, and [`Model::converter`] hands out the shared
/// converter. The struct itself is a typed view over a [`ModelInstance`]:
/// every field is an `Option` so that values missing from server payloads
/// stay representable.
pub trait Model: Sized + Send + Sync + 'static {
    /// Build the model's schema. Called once per process by the registry.
    fn schema() -> ModelSchema;

    /// Memoized converter for this model.
    fn converter() -> &'static Converter;

    /// Read the typed view out of a decoded instance.
    fn from_instance(instance: &ModelInstance) -> Self;

    /// Turn the typed view into an instance; `None` fields stay unset.
    fn to_instance(&self) -> ModelInstance;
}

/// A generated wire enum.
pub trait WireEnum: Sized + Copy + 'static {
    /// Declared members.
    fn schema() -> &'static EnumSchema;

    /// Member for a wire literal.
    fn from_literal(literal: WireLiteral) -> Option<Self>;

    /// Wire literal of this member.
    fn literal(&self) -> WireLiteral;

    /// This member as a typed enum member.
    fn member(&self) -> EnumMember { EnumMember::new(Self::schema(), self.literal()) }

    /// Member for a decoded enum value of the same enum.
    fn from_member(member: &EnumMember) -> Option<Self> {
        if member.schema().name != Self::schema().name {
            return None;
        }
        Self::from_literal(member.literal())
    }
}
