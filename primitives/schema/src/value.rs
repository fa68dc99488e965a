//! Typed values produced by coercion and consumed by dumping.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::converter::{EnumSchema, FieldSchema, ModelSchema, WireLiteral};

/// Wire format of [`Typed::Date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while building model instances locally.
///
/// Decoding server data never produces these; they only guard construction
/// of request payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A required field was not provided
    #[error("Missing required field `{field}` on {model}")]
    MissingRequiredField {
        /// Model name
        model: &'static str,
        /// Field name
        field: &'static str,
    },
    /// The field is not declared on the model
    #[error("Unknown field `{field}` on {model}")]
    UnknownField {
        /// Model name
        model: &'static str,
        /// Offending field name
        field: String,
    },
    /// Explicit `null` given for a field that does not accept it
    #[error("Field `{field}` on {model} is not nullable")]
    NotNullable {
        /// Model name
        model: &'static str,
        /// Field name
        field: &'static str,
    },
}

/// A member of a wire enum.
#[derive(Debug, Clone, Copy)]
pub struct EnumMember {
    schema: &'static EnumSchema,
    literal: WireLiteral,
}

impl EnumMember {
    /// Create a member. The literal is expected to be declared by `schema`.
    pub fn new(schema: &'static EnumSchema, literal: WireLiteral) -> Self {
        Self { schema, literal }
    }

    /// Enum the member belongs to.
    pub fn schema(&self) -> &'static EnumSchema { self.schema }

    /// Wire literal of the member.
    pub fn literal(&self) -> WireLiteral { self.literal }

    /// The member as a JSON value.
    pub fn to_value(&self) -> Value { self.literal.to_value() }
}

impl PartialEq for EnumMember {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.literal == other.literal
    }
}

/// A statically typed value.
///
/// `Raw` holds wire values that lenient decoding passed through unchanged
/// because they did not fit the declared shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Typed {
    /// Explicit `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp with offset
    DateTime(DateTime<FixedOffset>),
    /// Enum member
    Enum(EnumMember),
    /// Ordered sequence
    List(Vec<Typed>),
    /// String-keyed map, insertion ordered
    Map(IndexMap<String, Typed>),
    /// Model instance
    Model(ModelInstance),
    /// Untyped wire value
    Raw(Value),
}

impl Typed {
    /// Lift a wire value without typing it: `null` stays `Null`, anything
    /// else becomes `Raw`.
    pub fn passthrough(value: &Value) -> Self {
        match value {
            Value::Null => Typed::Null,
            other => Typed::Raw(other.clone()),
        }
    }

    /// Whether the value is explicit `null`.
    pub fn is_null(&self) -> bool { matches!(self, Typed::Null) }

    /// String contents, if this is a typed string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Typed::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this is a typed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Typed::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric contents; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Typed::Float(f) => Some(*f),
            Typed::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean contents.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Typed::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements, if this is a typed list.
    pub fn as_list(&self) -> Option<&[Typed]> {
        match self {
            Typed::List(items) => Some(items),
            _ => None,
        }
    }

    /// Model instance, if this is one.
    pub fn as_model(&self) -> Option<&ModelInstance> {
        match self {
            Typed::Model(instance) => Some(instance),
            _ => None,
        }
    }

    /// Short description of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Typed::Null => "null",
            Typed::Bool(_) => "bool",
            Typed::Int(_) => "int",
            Typed::Float(_) => "float",
            Typed::String(_) => "string",
            Typed::Date(_) => "date",
            Typed::DateTime(_) => "date-time",
            Typed::Enum(_) => "enum",
            Typed::List(_) => "list",
            Typed::Map(_) => "map",
            Typed::Model(_) => "model",
            Typed::Raw(_) => "raw",
        }
    }

    /// Render the value as JSON without consulting a converter.
    ///
    /// Model fields are emitted under their wire keys; unset fields are
    /// omitted.
    pub fn to_wire(&self) -> Value {
        match self {
            Typed::Null => Value::Null,
            Typed::Bool(b) => Value::Bool(*b),
            Typed::Int(i) => Value::from(*i),
            Typed::Float(f) => Value::from(*f),
            Typed::String(s) => Value::String(s.clone()),
            Typed::Date(date) => Value::String(date.format(DATE_FORMAT).to_string()),
            Typed::DateTime(timestamp) =>
                Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Typed::Enum(member) => member.to_value(),
            Typed::List(items) => Value::Array(items.iter().map(Typed::to_wire).collect()),
            Typed::Map(entries) => Value::Object(
                entries.iter().map(|(key, value)| (key.clone(), value.to_wire())).collect(),
            ),
            Typed::Model(instance) => instance.to_wire(),
            Typed::Raw(value) => value.clone(),
        }
    }
}

/// A decoded (or locally built) model: declared field name to typed value.
///
/// A field missing from the instance is unset; a field holding
/// [`Typed::Null`] was explicitly `null`. Equality ignores field order.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    schema: &'static ModelSchema,
    fields: IndexMap<&'static str, Typed>,
}

impl ModelInstance {
    /// Create an instance with every field unset.
    pub fn new(schema: &'static ModelSchema) -> Self { Self { schema, fields: IndexMap::new() } }

    /// Build an instance locally, enforcing the schema.
    ///
    /// Every name must be declared, every required field must be provided,
    /// and `null` is only accepted on nullable fields.
    pub fn build<'a>(
        schema: &'static ModelSchema,
        fields: impl IntoIterator<Item = (&'a str, Typed)>,
    ) -> Result<Self, SchemaError> {
        let mut instance = Self::new(schema);
        for (name, value) in fields {
            instance.set(name, value)?;
        }
        if let Some(&field) = instance.missing_required().first() {
            return Err(SchemaError::MissingRequiredField { model: schema.name, field });
        }
        Ok(instance)
    }

    /// Schema of the instance.
    pub fn schema(&self) -> &'static ModelSchema { self.schema }

    /// Model name.
    pub fn name(&self) -> &'static str { self.schema.name }

    /// Value of a field, `None` when unset.
    pub fn get(&self, field: &str) -> Option<&Typed> { self.fields.get(field) }

    /// Whether the field is set (explicit `null` counts as set).
    pub fn is_set(&self, field: &str) -> bool { self.fields.contains_key(field) }

    /// Set a declared field.
    pub fn set(&mut self, field: &str, value: Typed) -> Result<(), SchemaError> {
        let declared = self.schema.field(field).ok_or_else(|| SchemaError::UnknownField {
            model: self.schema.name,
            field: field.to_string(),
        })?;
        if value.is_null() && !declared.nullable {
            return Err(SchemaError::NotNullable { model: self.schema.name, field: declared.name });
        }
        self.fields.insert(declared.name, value);
        Ok(())
    }

    /// Set a field through its schema entry, without validation.
    pub fn insert(&mut self, field: &FieldSchema, value: Typed) {
        self.fields.insert(field.name, value);
    }

    /// Set a field from an optional typed view; `None` leaves it unset.
    ///
    /// Undeclared names are ignored.
    pub fn put<T: IntoTyped>(&mut self, field: &str, value: Option<&T>) {
        if let (Some(declared), Some(value)) = (self.schema.field(field), value) {
            self.fields.insert(declared.name, value.to_typed());
        }
    }

    /// Read a field through a typed view.
    pub fn value<T: FromTyped>(&self, field: &str) -> Option<T> {
        self.fields.get(field).and_then(T::from_typed)
    }

    /// Unset a field, returning its previous value.
    pub fn unset(&mut self, field: &str) -> Option<Typed> { self.fields.shift_remove(field) }

    /// Set fields in the order they were assigned.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Typed)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Number of set fields.
    pub fn len(&self) -> usize { self.fields.len() }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Required fields that are currently unset.
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.schema
            .required_fields()
            .filter(|field| !self.fields.contains_key(field.name))
            .map(|field| field.name)
            .collect()
    }

    /// Render as a JSON object keyed by wire keys, in declaration order.
    pub fn to_wire(&self) -> Value {
        let mut object = Map::new();
        for field in self.schema.fields() {
            if let Some(value) = self.fields.get(field.name) {
                object.insert(field.wire_key.to_string(), value.to_wire());
            }
        }
        Value::Object(object)
    }
}

impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.fields == other.fields
    }
}

/// Typed view extraction: read a Rust value out of a [`Typed`].
///
/// Returns `None` when the typed value does not have the expected shape.
pub trait FromTyped: Sized {
    /// Extract the view.
    fn from_typed(value: &Typed) -> Option<Self>;
}

/// Typed view insertion: turn a Rust value into a [`Typed`].
pub trait IntoTyped {
    /// Convert the view.
    fn to_typed(&self) -> Typed;
}

impl FromTyped for String {
    fn from_typed(value: &Typed) -> Option<Self> { value.as_str().map(str::to_string) }
}

impl IntoTyped for String {
    fn to_typed(&self) -> Typed { Typed::String(self.clone()) }
}

impl FromTyped for i64 {
    fn from_typed(value: &Typed) -> Option<Self> { value.as_i64() }
}

impl IntoTyped for i64 {
    fn to_typed(&self) -> Typed { Typed::Int(*self) }
}

impl FromTyped for f64 {
    fn from_typed(value: &Typed) -> Option<Self> { value.as_f64() }
}

impl IntoTyped for f64 {
    fn to_typed(&self) -> Typed { Typed::Float(*self) }
}

impl FromTyped for bool {
    fn from_typed(value: &Typed) -> Option<Self> { value.as_bool() }
}

impl IntoTyped for bool {
    fn to_typed(&self) -> Typed { Typed::Bool(*self) }
}

impl FromTyped for NaiveDate {
    fn from_typed(value: &Typed) -> Option<Self> {
        match value {
            Typed::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl IntoTyped for NaiveDate {
    fn to_typed(&self) -> Typed { Typed::Date(*self) }
}

impl FromTyped for DateTime<FixedOffset> {
    fn from_typed(value: &Typed) -> Option<Self> {
        match value {
            Typed::DateTime(timestamp) => Some(*timestamp),
            _ => None,
        }
    }
}

impl IntoTyped for DateTime<FixedOffset> {
    fn to_typed(&self) -> Typed { Typed::DateTime(*self) }
}

impl FromTyped for Value {
    fn from_typed(value: &Typed) -> Option<Self> { Some(value.to_wire()) }
}

impl IntoTyped for Value {
    fn to_typed(&self) -> Typed { Typed::passthrough(self) }
}

impl<T: FromTyped> FromTyped for Vec<T> {
    fn from_typed(value: &Typed) -> Option<Self> {
        value.as_list()?.iter().map(T::from_typed).collect()
    }
}

impl<T: IntoTyped> IntoTyped for Vec<T> {
    fn to_typed(&self) -> Typed { Typed::List(self.iter().map(IntoTyped::to_typed).collect()) }
}

impl<T: FromTyped> FromTyped for IndexMap<String, T> {
    fn from_typed(value: &Typed) -> Option<Self> {
        match value {
            Typed::Map(entries) => entries
                .iter()
                .map(|(key, value)| T::from_typed(value).map(|value| (key.clone(), value)))
                .collect(),
            _ => None,
        }
    }
}

impl<T: IntoTyped> IntoTyped for IndexMap<String, T> {
    fn to_typed(&self) -> Typed {
        Typed::Map(self.iter().map(|(key, value)| (key.clone(), value.to_typed())).collect())
    }
}
