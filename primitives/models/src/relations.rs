use chrono::NaiveDate;
use indexmap::IndexMap;
use registry::{memoize, model_converter, model_ref, model_schema};
use schema::{
    Converter, FieldSchema, FromTyped, IntoTyped, Model, ModelInstance, ModelSchema, Typed,
    UnionSchema, UnionVariant,
};
use serde_json::Value;

/// Postal address.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    /// Street name
    pub street: Option<String>,
    /// House number including additions
    pub house_number: Option<String>,
    /// Postal code, `null` for countries without one
    pub postal_code: Option<String>,
    /// City
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: Option<String>,
}

impl Address {
    /// Create an address with its required fields.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: Some(street.into()),
            city: Some(city.into()),
            country_code: Some(country_code.into()),
            ..Self::default()
        }
    }
}

impl Model for Address {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "Address",
            vec![
                FieldSchema::required("street", Converter::string()),
                FieldSchema::optional("house_number", Converter::string()).rename("houseNumber"),
                FieldSchema::optional("postal_code", Converter::string())
                    .rename("postalCode")
                    .nullable(),
                FieldSchema::required("city", Converter::string()),
                FieldSchema::required("country_code", Converter::string()).rename("countryCode"),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            street: instance.value("street"),
            house_number: instance.value("house_number"),
            postal_code: instance.value("postal_code"),
            city: instance.value("city"),
            country_code: instance.value("country_code"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("street", self.street.as_ref());
        instance.put("house_number", self.house_number.as_ref());
        instance.put("postal_code", self.postal_code.as_ref());
        instance.put("city", self.city.as_ref());
        instance.put("country_code", self.country_code.as_ref());
        instance
    }
}

/// A company relation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Company {
    /// Server-assigned id
    pub id: Option<i64>,
    /// Relation tag, always `"company"`
    pub kind: Option<String>,
    /// Registered name
    pub name: Option<String>,
    /// VAT number
    pub vat_number: Option<String>,
    /// Visiting address
    pub address: Option<Address>,
    /// Free-form labels
    pub tags: Option<Vec<String>>,
    /// Account-specific extra fields
    pub custom_fields: Option<IndexMap<String, Value>>,
}

impl Company {
    /// Discriminator value of companies.
    pub const KIND: &'static str = "company";

    /// Create a company with its required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self { kind: Some(Self::KIND.to_string()), name: Some(name.into()), ..Self::default() }
    }
}

impl Model for Company {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "Company",
            vec![
                FieldSchema::optional("id", Converter::int()),
                FieldSchema::required("kind", Converter::string()).rename("type"),
                FieldSchema::required("name", Converter::string()),
                FieldSchema::optional("vat_number", Converter::string())
                    .rename("vatNumber")
                    .nullable(),
                FieldSchema::optional("address", model_ref::<Address>()),
                FieldSchema::optional("tags", Converter::list_of(Converter::string())),
                FieldSchema::optional("custom_fields", Converter::map_of(Converter::any()))
                    .rename("customFields"),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            id: instance.value("id"),
            kind: instance.value("kind"),
            name: instance.value("name"),
            vat_number: instance.value("vat_number"),
            address: instance.value("address"),
            tags: instance.value("tags"),
            custom_fields: instance.value("custom_fields"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("id", self.id.as_ref());
        instance.put("kind", self.kind.as_ref());
        instance.put("name", self.name.as_ref());
        instance.put("vat_number", self.vat_number.as_ref());
        instance.put("address", self.address.as_ref());
        instance.put("tags", self.tags.as_ref());
        instance.put("custom_fields", self.custom_fields.as_ref());
        instance
    }
}

/// A person relation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    /// Server-assigned id
    pub id: Option<i64>,
    /// Relation tag, always `"person"`
    pub kind: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Contact address, `null` when withheld
    pub email: Option<String>,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Company the person works for
    pub employer: Option<Company>,
}

impl Person {
    /// Discriminator value of persons.
    pub const KIND: &'static str = "person";

    /// Create a person with its required fields.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            kind: Some(Self::KIND.to_string()),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }

    /// Full name, when both parts are known.
    pub fn full_name(&self) -> Option<String> {
        Some(format!("{} {}", self.first_name.as_deref()?, self.last_name.as_deref()?))
    }
}

impl Model for Person {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "Person",
            vec![
                FieldSchema::optional("id", Converter::int()),
                FieldSchema::required("kind", Converter::string()).rename("type"),
                FieldSchema::required("first_name", Converter::string()).rename("firstName"),
                FieldSchema::required("last_name", Converter::string()).rename("lastName"),
                FieldSchema::optional("email", Converter::string()).nullable(),
                FieldSchema::optional("birth_date", Converter::date()).rename("birthDate"),
                FieldSchema::optional("employer", model_ref::<Company>()),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            id: instance.value("id"),
            kind: instance.value("kind"),
            first_name: instance.value("first_name"),
            last_name: instance.value("last_name"),
            email: instance.value("email"),
            birth_date: instance.value("birth_date"),
            employer: instance.value("employer"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("id", self.id.as_ref());
        instance.put("kind", self.kind.as_ref());
        instance.put("first_name", self.first_name.as_ref());
        instance.put("last_name", self.last_name.as_ref());
        instance.put("email", self.email.as_ref());
        instance.put("birth_date", self.birth_date.as_ref());
        instance.put("employer", self.employer.as_ref());
        instance
    }
}

model_views!(Address, Company, Person);

/// A customer or supplier: either a company or a person, tagged by `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// `"type": "company"`
    Company(Company),
    /// `"type": "person"`
    Person(Person),
    /// A relation kind this client does not know yet, kept as wire JSON
    Other(Value),
}

impl Relation {
    /// Shared converter for relations.
    pub fn converter() -> &'static Converter {
        memoize::<Relation>(|| {
            Converter::UnionOf(
                UnionSchema::new(vec![
                    UnionVariant::tagged(Company::KIND, model_ref::<Company>()),
                    UnionVariant::tagged(Person::KIND, model_ref::<Person>()),
                ])
                .with_discriminator("type"),
            )
        })
    }

    /// Id of the relation, whatever its kind.
    pub fn id(&self) -> Option<i64> {
        match self {
            Relation::Company(company) => company.id,
            Relation::Person(person) => person.id,
            Relation::Other(value) => value.get("id").and_then(Value::as_i64),
        }
    }
}

impl From<Company> for Relation {
    fn from(company: Company) -> Self { Relation::Company(company) }
}

impl From<Person> for Relation {
    fn from(person: Person) -> Self { Relation::Person(person) }
}

impl FromTyped for Relation {
    fn from_typed(value: &Typed) -> Option<Self> {
        if let Some(company) = Company::from_typed(value) {
            return Some(Relation::Company(company));
        }
        if let Some(person) = Person::from_typed(value) {
            return Some(Relation::Person(person));
        }
        match value {
            Typed::Null => None,
            other => Some(Relation::Other(other.to_wire())),
        }
    }
}

impl IntoTyped for Relation {
    fn to_typed(&self) -> Typed {
        match self {
            Relation::Company(company) => company.to_typed(),
            Relation::Person(person) => person.to_typed(),
            Relation::Other(value) => Typed::passthrough(value),
        }
    }
}
