//! # formkit-core: Foundational Types for formkit
//!
//! This crate defines the declarative form schema model. Every other crate
//! in the workspace depends on `formkit-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed field union.** `Field` is a single enum over the five field
//!    kinds. Every `match` on it is exhaustive, so adding a kind forces every
//!    consumer (validator compiler, widget dispatch) to handle it.
//!
//! 2. **Arrays do not nest.** An array field carries an `ItemType`, which has
//!    no array variant. `itemsType: "array"` fails to parse.
//!
//! 3. **Ordered fields.** `FormSchema` keeps fields in insertion order, which
//!    is the display order. Names are unique and non-empty.
//!
//! 4. **Immutable value data.** Schemas and fields hold no back-references.
//!    Programmatic rules are shared through `Arc`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formkit-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod field;
pub mod schema;

pub use error::SchemaError;
pub use field::{
    ArrayField, CrossFieldRule, CustomRule, EmailField, Field, FieldCommon, FieldType,
    FieldValidation, ItemType, NumberField, PasswordField, TextField,
};
pub use schema::{FormSchema, Styling};

/// A submitted mapping from field name to raw value.
pub type Record = serde_json::Map<String, serde_json::Value>;
