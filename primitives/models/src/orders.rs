use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use registry::{memoize, model_converter, model_ref, model_schema};
use schema::{
    Converter, FieldSchema, FromTyped, IntoTyped, Model, ModelInstance, ModelSchema, Typed,
};

use crate::relations::{Address, Relation};

wire_enum! {
    /// Lifecycle of an order.
    pub enum OrderStatus("OrderStatus") {
        /// Being edited, not yet sent to the customer
        Draft => Str("draft"),
        /// Accepted by the customer
        Confirmed => Str("confirmed"),
        /// Handed to the carrier
        Shipped => Str("shipped"),
        /// Received by the customer
        Delivered => Str("delivered"),
        /// Withdrawn before delivery
        Cancelled => Str("cancelled"),
    }
}

impl OrderStatus {
    /// Whether the order can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Discount on an order line: a fixed amount or an expression such as `"10%"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Discount {
    /// Amount off the line total
    Amount(f64),
    /// Discount expression evaluated by the server
    Expression(String),
}

impl Discount {
    /// Shared converter for discounts.
    pub fn converter() -> &'static Converter {
        memoize::<Discount>(|| Converter::union_of([Converter::float(), Converter::string()]))
    }
}

impl FromTyped for Discount {
    fn from_typed(value: &Typed) -> Option<Self> {
        match value {
            Typed::Float(amount) => Some(Discount::Amount(*amount)),
            Typed::Int(amount) => Some(Discount::Amount(*amount as f64)),
            Typed::String(expression) => Some(Discount::Expression(expression.clone())),
            _ => None,
        }
    }
}

impl IntoTyped for Discount {
    fn to_typed(&self) -> Typed {
        match self {
            Discount::Amount(amount) => Typed::Float(*amount),
            Discount::Expression(expression) => Typed::String(expression.clone()),
        }
    }
}

/// A single line of an order or invoice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderLine {
    /// Stock keeping unit
    pub sku: Option<String>,
    /// Line description shown on documents
    pub description: Option<String>,
    /// Ordered quantity
    pub quantity: Option<i64>,
    /// Price per unit, excluding VAT
    pub unit_price: Option<f64>,
    /// Discount on the line
    pub discount: Option<Discount>,
}

impl OrderLine {
    /// Create a line with its required fields.
    pub fn new(sku: impl Into<String>, quantity: i64, unit_price: f64) -> Self {
        Self {
            sku: Some(sku.into()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            ..Self::default()
        }
    }

    /// Set the discount.
    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Quantity times unit price, before discounts.
    pub fn subtotal(&self) -> Option<f64> { Some(self.quantity? as f64 * self.unit_price?) }
}

impl Model for OrderLine {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "OrderLine",
            vec![
                FieldSchema::required("sku", Converter::string()),
                FieldSchema::optional("description", Converter::string()),
                FieldSchema::required("quantity", Converter::int()),
                FieldSchema::required("unit_price", Converter::float()).rename("unitPrice"),
                FieldSchema::optional("discount", Discount::converter().clone()).nullable(),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            sku: instance.value("sku"),
            description: instance.value("description"),
            quantity: instance.value("quantity"),
            unit_price: instance.value("unit_price"),
            discount: instance.value("discount"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("sku", self.sku.as_ref());
        instance.put("description", self.description.as_ref());
        instance.put("quantity", self.quantity.as_ref());
        instance.put("unit_price", self.unit_price.as_ref());
        instance.put("discount", self.discount.as_ref());
        instance
    }
}

/// A sales order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Order {
    /// Server-assigned id
    pub id: Option<i64>,
    /// Human-readable order number
    pub number: Option<String>,
    /// Current status
    pub status: Option<OrderStatus>,
    /// Ordering relation
    pub customer: Option<Relation>,
    /// Ordered lines
    pub lines: Option<Vec<OrderLine>>,
    /// When the order was placed
    pub ordered_at: Option<DateTime<FixedOffset>>,
    /// Promised delivery date, `null` when not yet planned
    pub delivery_date: Option<NaiveDate>,
    /// Where to deliver
    pub shipping_address: Option<Address>,
    /// Integration metadata
    pub metadata: Option<IndexMap<String, String>>,
}

impl Order {
    /// Create an order with its required fields.
    pub fn new(
        number: impl Into<String>,
        customer: impl Into<Relation>,
        lines: Vec<OrderLine>,
    ) -> Self {
        Self {
            number: Some(number.into()),
            customer: Some(customer.into()),
            lines: Some(lines),
            ..Self::default()
        }
    }

    /// Sum of the line subtotals; `None` if any line lacks a price or quantity.
    pub fn total(&self) -> Option<f64> {
        self.lines.as_ref()?.iter().map(OrderLine::subtotal).sum()
    }
}

impl Model for Order {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "Order",
            vec![
                FieldSchema::optional("id", Converter::int()),
                FieldSchema::required("number", Converter::string()),
                FieldSchema::optional("status", OrderStatus::converter()),
                FieldSchema::required("customer", Relation::converter().clone()),
                FieldSchema::required("lines", Converter::list_of(model_ref::<OrderLine>())),
                FieldSchema::optional("ordered_at", Converter::date_time()).rename("orderedAt"),
                FieldSchema::optional("delivery_date", Converter::date())
                    .rename("deliveryDate")
                    .nullable(),
                FieldSchema::optional("shipping_address", model_ref::<Address>())
                    .rename("shippingAddress"),
                FieldSchema::optional("metadata", Converter::map_of(Converter::string())),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            id: instance.value("id"),
            number: instance.value("number"),
            status: instance.value("status"),
            customer: instance.value("customer"),
            lines: instance.value("lines"),
            ordered_at: instance.value("ordered_at"),
            delivery_date: instance.value("delivery_date"),
            shipping_address: instance.value("shipping_address"),
            metadata: instance.value("metadata"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("id", self.id.as_ref());
        instance.put("number", self.number.as_ref());
        instance.put("status", self.status.as_ref());
        instance.put("customer", self.customer.as_ref());
        instance.put("lines", self.lines.as_ref());
        instance.put("ordered_at", self.ordered_at.as_ref());
        instance.put("delivery_date", self.delivery_date.as_ref());
        instance.put("shipping_address", self.shipping_address.as_ref());
        instance.put("metadata", self.metadata.as_ref());
        instance
    }
}

model_views!(OrderLine, Order);
