//! Inventory domain module.
//!
//! This crate contains business rules for categories, warehouses and products,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).
//!
//! Every entity follows the same shape:
//! - a `*Draft` deserialized from untrusted input, validated into a `New*`;
//! - a `*Patch` listing exactly the fields a caller may change;
//! - `apply`, which validates the whole patch and returns the changed copy,
//!   leaving the original untouched on any failure.

pub mod category;
pub mod patch;
pub mod product;
pub mod warehouse;

pub use category::{Category, CategoryDraft, CategoryPatch, NewCategory};
pub use product::{NewProduct, Product, ProductDraft, ProductPatch};
pub use warehouse::{NewWarehouse, Warehouse, WarehouseDraft, WarehousePatch};
