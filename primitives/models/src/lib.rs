#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Generated Tradewire API Models
//!
//! Each model is a typed view: every field is an `Option` so that a payload
//! missing a field, or carrying a value of an unexpected shape, still decodes.
//! The schema declared in each [`Model::schema`] is the source of truth for
//! the wire format; the registry memoizes it per process.
//!
//! Named constructors (`Address::new`, `Order::new`, ...) take the required
//! fields, so a request payload built through them is always complete.

#[macro_use]
mod macros;

/// Invoices and their payment status.
pub mod invoices;
/// Orders, order lines and discounts.
pub mod orders;
/// Relations: companies and persons.
pub mod relations;
/// Stock items and their bills of materials.
pub mod stock;

pub use invoices::{Invoice, InvoiceStatus};
pub use orders::{Discount, Order, OrderLine, OrderStatus};
pub use relations::{Address, Company, Person, Relation};
use schema::{Model, SchemaError};
pub use stock::StockItem;

/// Check that a locally built model sets every required field.
///
/// Decoding never calls this: server data is accepted as-is.
pub fn validate<M: Model>(model: &M) -> Result<(), SchemaError> {
    let instance = model.to_instance();
    match instance.missing_required().first() {
        Some(&field) => Err(SchemaError::MissingRequiredField { model: instance.name(), field }),
        None => Ok(()),
    }
}

