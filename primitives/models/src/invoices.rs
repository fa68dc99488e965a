use chrono::{DateTime, FixedOffset, NaiveDate};
use registry::{model_converter, model_ref, model_schema};
use schema::{Converter, FieldSchema, Model, ModelInstance, ModelSchema};

use crate::orders::OrderLine;

wire_enum! {
    /// Payment status of an invoice. Encoded as an integer on the wire.
    pub enum InvoiceStatus("InvoiceStatus") {
        /// Not yet sent
        Concept => Int(0),
        /// Sent and awaiting payment
        Open => Int(1),
        /// Fully paid
        Paid => Int(2),
        /// Past its due date
        Overdue => Int(3),
    }
}

/// An invoice sent to a relation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invoice {
    /// Server-assigned id
    pub id: Option<i64>,
    /// Invoice number
    pub number: Option<String>,
    /// Payment status
    pub status: Option<InvoiceStatus>,
    /// Order the invoice was created from
    pub order_id: Option<i64>,
    /// Total including VAT
    pub total_amount: Option<f64>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// Payment due date
    pub due_date: Option<NaiveDate>,
    /// When payment was registered, `null` while unpaid
    pub paid_at: Option<DateTime<FixedOffset>>,
    /// Invoiced lines
    pub lines: Option<Vec<OrderLine>>,
    /// Remarks printed on the invoice; elements may be `null`
    pub notes: Option<Vec<serde_json::Value>>,
}

impl Invoice {
    /// Create an invoice with its required fields.
    pub fn new(number: impl Into<String>, total_amount: f64, currency: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            total_amount: Some(total_amount),
            currency: Some(currency.into()),
            ..Self::default()
        }
    }

    /// Whether the invoice still needs to be paid.
    pub fn is_outstanding(&self) -> bool {
        matches!(self.status, Some(InvoiceStatus::Open | InvoiceStatus::Overdue))
    }
}

impl Model for Invoice {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "Invoice",
            vec![
                FieldSchema::optional("id", Converter::int()),
                FieldSchema::required("number", Converter::string()),
                FieldSchema::optional("status", InvoiceStatus::converter()),
                FieldSchema::optional("order_id", Converter::int()).rename("orderId"),
                FieldSchema::required("total_amount", Converter::float()).rename("totalAmount"),
                FieldSchema::required("currency", Converter::string()),
                FieldSchema::optional("due_date", Converter::date()).rename("dueDate"),
                FieldSchema::optional("paid_at", Converter::date_time())
                    .rename("paidAt")
                    .nullable(),
                FieldSchema::optional("lines", Converter::list_of(model_ref::<OrderLine>())),
                FieldSchema::optional("notes", Converter::nullable_list_of(Converter::string())),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self {
        Self {
            id: instance.value("id"),
            number: instance.value("number"),
            status: instance.value("status"),
            order_id: instance.value("order_id"),
            total_amount: instance.value("total_amount"),
            currency: instance.value("currency"),
            due_date: instance.value("due_date"),
            paid_at: instance.value("paid_at"),
            lines: instance.value("lines"),
            notes: instance.value("notes"),
        }
    }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("id", self.id.as_ref());
        instance.put("number", self.number.as_ref());
        instance.put("status", self.status.as_ref());
        instance.put("order_id", self.order_id.as_ref());
        instance.put("total_amount", self.total_amount.as_ref());
        instance.put("currency", self.currency.as_ref());
        instance.put("due_date", self.due_date.as_ref());
        instance.put("paid_at", self.paid_at.as_ref());
        instance.put("lines", self.lines.as_ref());
        instance.put("notes", self.notes.as_ref());
        instance
    }
}

model_views!(Invoice);
