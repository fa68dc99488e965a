//! Converter descriptors.
//!
//! A [`Converter`] is pure configuration: it names the shape a wire value is
//! expected to have and nothing else. The engine that walks these descriptors
//! lives in the `convert` crate, so the descriptors stay declarative and can be
//! built once and shared across threads.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Primitive target kinds understood by the scalar coercer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// JSON string
    String,
    /// JSON integer (floats with a zero fraction are accepted)
    Int,
    /// JSON number of any representation
    Float,
    /// JSON boolean
    Bool,
    /// Calendar date encoded as `YYYY-MM-DD`
    Date,
    /// RFC 3339 timestamp
    DateTime,
    /// Free-form JSON, kept as-is
    Any,
}

impl ScalarKind {
    /// Schema name of the kind, as used in API descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "date-time",
            ScalarKind::Any => "any",
        }
    }
}

impl FromStr for ScalarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ScalarKind::String),
            "int" | "integer" => Ok(ScalarKind::Int),
            "float" | "number" => Ok(ScalarKind::Float),
            "bool" | "boolean" => Ok(ScalarKind::Bool),
            "date" => Ok(ScalarKind::Date),
            "date-time" | "datetime" => Ok(ScalarKind::DateTime),
            "any" | "mixed" => Ok(ScalarKind::Any),
            _ => Err(format!("Unknown scalar kind: {}", s)),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// A literal value an enum member takes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireLiteral {
    /// String member, e.g. `"open"`
    Str(&'static str),
    /// Integer member, e.g. `2`
    Int(i64),
}

impl WireLiteral {
    /// Whether the raw wire value equals this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            WireLiteral::Str(expected) => value.as_str() == Some(*expected),
            WireLiteral::Int(expected) => value.as_i64() == Some(*expected),
        }
    }

    /// The literal as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            WireLiteral::Str(s) => Value::String((*s).to_string()),
            WireLiteral::Int(i) => Value::from(*i),
        }
    }
}

impl fmt::Display for WireLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireLiteral::Str(s) => write!(f, "{}", s),
            WireLiteral::Int(i) => write!(f, "{}", i),
        }
    }
}

/// Declared members of a wire enum.
///
/// Enum schemas are `const`-constructible so generated code can keep them in
/// `static` items.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumSchema {
    /// Enum name, used for diagnostics and equality of members
    pub name: &'static str,
    /// Wire literals in declaration order
    pub values: &'static [WireLiteral],
}

impl EnumSchema {
    /// Create a new enum schema.
    pub const fn new(name: &'static str, values: &'static [WireLiteral]) -> Self {
        Self { name, values }
    }

    /// Find the declared literal equal to `value`, if any.
    pub fn find(&self, value: &Value) -> Option<WireLiteral> {
        self.values.iter().copied().find(|literal| literal.matches(value))
    }

    /// Whether `literal` is one of the declared members.
    pub fn contains(&self, literal: &WireLiteral) -> bool { self.values.contains(literal) }
}

/// Element configuration shared by list-of and map-of converters.
#[derive(Debug, Clone)]
pub struct ContainerSchema {
    /// Converter applied to every element
    pub inner: Box<Converter>,
    /// Whether `null` elements are accepted without consulting `inner`
    pub nullable: bool,
}

impl ContainerSchema {
    /// Create a container over `inner`.
    pub fn new(inner: Converter, nullable: bool) -> Self {
        Self { inner: Box::new(inner), nullable }
    }
}

/// One candidate type of a union.
#[derive(Debug, Clone)]
pub struct UnionVariant {
    /// Converter for the candidate
    pub converter: Converter,
    /// Discriminator value naming this candidate, if the union is tagged
    pub tag: Option<&'static str>,
}

impl UnionVariant {
    /// An untagged candidate.
    pub fn new(converter: Converter) -> Self { Self { converter, tag: None } }

    /// A candidate selected when the discriminator field equals `tag`.
    pub fn tagged(tag: &'static str, converter: Converter) -> Self {
        Self { converter, tag: Some(tag) }
    }
}

/// Ordered candidates of a sum type, with an optional discriminator field.
#[derive(Debug, Clone)]
pub struct UnionSchema {
    variants: Vec<UnionVariant>,
    discriminator: Option<&'static str>,
}

impl UnionSchema {
    /// Create a union over `variants`, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `variants` is empty. An empty union can never match anything
    /// and is always a bug in the schema definition.
    pub fn new(variants: Vec<UnionVariant>) -> Self {
        assert!(!variants.is_empty(), "a union must declare at least one variant");
        Self { variants, discriminator: None }
    }

    /// Create an untagged union from plain converters.
    ///
    /// # Panics
    ///
    /// Panics if `converters` is empty.
    pub fn of(converters: impl IntoIterator<Item = Converter>) -> Self {
        Self::new(converters.into_iter().map(UnionVariant::new).collect())
    }

    /// Name the object field that carries the variant tag.
    pub fn with_discriminator(mut self, field: &'static str) -> Self {
        self.discriminator = Some(field);
        self
    }

    /// Candidates in declaration order.
    pub fn variants(&self) -> &[UnionVariant] { &self.variants }

    /// Discriminator field name, if configured.
    pub fn discriminator(&self) -> Option<&'static str> { self.discriminator }

    /// Candidates whose tag equals `tag`.
    pub fn tagged<'a, 't>(&'a self, tag: &'t str) -> impl Iterator<Item = &'a UnionVariant> + 't
    where
        'a: 't,
    {
        self.variants.iter().filter(move |variant| variant.tag == Some(tag))
    }
}

/// Lazy reference to a model schema.
///
/// Models may refer to themselves (a stock item made of stock items), so the
/// schema is resolved on first use instead of being embedded.
#[derive(Clone, Copy)]
pub struct ModelRef(fn() -> &'static ModelSchema);

impl ModelRef {
    /// Wrap a resolver function.
    pub fn new(resolve: fn() -> &'static ModelSchema) -> Self { Self(resolve) }

    /// Resolve the referenced schema.
    pub fn resolve(&self) -> &'static ModelSchema { (self.0)() }

    /// Name of the referenced model.
    pub fn name(&self) -> &'static str { self.resolve().name }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.name()).finish()
    }
}

/// A declared field of a model.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// In-memory field name
    pub name: &'static str,
    /// JSON object key on the wire
    pub wire_key: &'static str,
    /// Converter for the field value
    pub converter: Converter,
    /// Whether the field may be absent
    pub optional: bool,
    /// Whether the field may be explicitly `null`
    pub nullable: bool,
}

impl FieldSchema {
    /// A field that must be present when building a model locally.
    pub fn required(name: &'static str, converter: Converter) -> Self {
        Self { name, wire_key: name, converter, optional: false, nullable: false }
    }

    /// A field that may be left unset.
    pub fn optional(name: &'static str, converter: Converter) -> Self {
        Self { name, wire_key: name, converter, optional: true, nullable: false }
    }

    /// Use a different key on the wire.
    pub fn rename(mut self, wire_key: &'static str) -> Self {
        self.wire_key = wire_key;
        self
    }

    /// Accept explicit `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns whether the field is required (computed from optional).
    pub fn is_required(&self) -> bool { !self.optional }
}

/// Declared shape of a model: its name and fields in declaration order.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    /// Model name
    pub name: &'static str,
    fields: Vec<FieldSchema>,
}

impl ModelSchema {
    /// Create a model schema.
    pub fn new(name: &'static str, fields: Vec<FieldSchema>) -> Self { Self { name, fields } }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] { &self.fields }

    /// Look up a field by its in-memory name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Look up a field by its wire key.
    pub fn field_by_wire_key(&self, wire_key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.wire_key == wire_key)
    }

    /// Fields that must be present when building locally.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.is_required())
    }
}

/// Conversion descriptor for a single value.
#[derive(Debug, Clone)]
pub enum Converter {
    /// Primitive value
    Scalar(ScalarKind),
    /// Member of a closed set of wire literals
    Enum(&'static EnumSchema),
    /// JSON array whose elements share a converter
    ListOf(ContainerSchema),
    /// JSON object whose values share a converter
    MapOf(ContainerSchema),
    /// One of several candidate converters
    UnionOf(UnionSchema),
    /// Nested model
    Model(ModelRef),
}

impl Converter {
    /// String scalar.
    pub fn string() -> Self { Converter::Scalar(ScalarKind::String) }

    /// Integer scalar.
    pub fn int() -> Self { Converter::Scalar(ScalarKind::Int) }

    /// Float scalar.
    pub fn float() -> Self { Converter::Scalar(ScalarKind::Float) }

    /// Boolean scalar.
    pub fn bool() -> Self { Converter::Scalar(ScalarKind::Bool) }

    /// Calendar date scalar.
    pub fn date() -> Self { Converter::Scalar(ScalarKind::Date) }

    /// Timestamp scalar.
    pub fn date_time() -> Self { Converter::Scalar(ScalarKind::DateTime) }

    /// Free-form JSON.
    pub fn any() -> Self { Converter::Scalar(ScalarKind::Any) }

    /// List of `inner`.
    pub fn list_of(inner: Converter) -> Self {
        Converter::ListOf(ContainerSchema::new(inner, false))
    }

    /// List of `inner` that tolerates `null` elements.
    pub fn nullable_list_of(inner: Converter) -> Self {
        Converter::ListOf(ContainerSchema::new(inner, true))
    }

    /// String-keyed map of `inner`.
    pub fn map_of(inner: Converter) -> Self { Converter::MapOf(ContainerSchema::new(inner, false)) }

    /// String-keyed map of `inner` that tolerates `null` values.
    pub fn nullable_map_of(inner: Converter) -> Self {
        Converter::MapOf(ContainerSchema::new(inner, true))
    }

    /// Untagged union of `variants`.
    ///
    /// # Panics
    ///
    /// Panics if `variants` is empty.
    pub fn union_of(variants: impl IntoIterator<Item = Converter>) -> Self {
        Converter::UnionOf(UnionSchema::of(variants))
    }

    /// Short name of the converter kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Converter::Scalar(_) => "scalar",
            Converter::Enum(_) => "enum",
            Converter::ListOf(_) => "list",
            Converter::MapOf(_) => "map",
            Converter::UnionOf(_) => "union",
            Converter::Model(_) => "model",
        }
    }
}

impl From<ScalarKind> for Converter {
    fn from(kind: ScalarKind) -> Self { Converter::Scalar(kind) }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    static COLORS: EnumSchema =
        EnumSchema::new("Color", &[WireLiteral::Str("red"), WireLiteral::Int(2)]);

    #[test]
    fn test_scalar_kind_from_str() {
        assert_eq!("integer".parse::<ScalarKind>(), Ok(ScalarKind::Int));
        assert_eq!("number".parse::<ScalarKind>(), Ok(ScalarKind::Float));
        assert_eq!("date-time".parse::<ScalarKind>(), Ok(ScalarKind::DateTime));
        assert_eq!("mixed".parse::<ScalarKind>(), Ok(ScalarKind::Any));
        assert!("decimal".parse::<ScalarKind>().is_err());
        assert_eq!(ScalarKind::DateTime.to_string(), "date-time");
    }

    #[test]
    fn test_enum_schema_find() {
        assert_eq!(COLORS.find(&json!("red")), Some(WireLiteral::Str("red")));
        assert_eq!(COLORS.find(&json!(2)), Some(WireLiteral::Int(2)));
        assert_eq!(COLORS.find(&json!("2")), None);
        assert_eq!(COLORS.find(&json!("blue")), None);
        assert!(COLORS.contains(&WireLiteral::Int(2)));
    }

    #[test]
    fn test_union_tagged_lookup() {
        let union = UnionSchema::new(vec![
            UnionVariant::tagged("a", Converter::string()),
            UnionVariant::tagged("b", Converter::int()),
            UnionVariant::new(Converter::bool()),
        ])
        .with_discriminator("kind");

        assert_eq!(union.discriminator(), Some("kind"));
        assert_eq!(union.tagged("b").count(), 1);
        assert_eq!(union.tagged("c").count(), 0);
        assert_eq!(union.variants().len(), 3);

        // Variants outlive the tag they were looked up with.
        let payload_tag = String::from("a");
        let found: Vec<&UnionVariant> = union.tagged(&payload_tag).collect();
        drop(payload_tag);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, Some("a"));
    }

    #[test]
    #[should_panic(expected = "at least one variant")]
    fn test_empty_union_panics() { let _ = UnionSchema::of(Vec::new()); }

    #[test]
    fn test_field_schema_builders() {
        let field = FieldSchema::optional("postal_code", Converter::string())
            .rename("postalCode")
            .nullable();
        assert_eq!(field.wire_key, "postalCode");
        assert!(field.optional);
        assert!(field.nullable);
        assert!(!field.is_required());

        let schema = ModelSchema::new(
            "Address",
            vec![FieldSchema::required("city", Converter::string()), field],
        );
        assert_eq!(schema.required_fields().count(), 1);
        assert!(schema.field_by_wire_key("postalCode").is_some());
        assert!(schema.field("postalCode").is_none());
    }
}
