//! Infrastructure layer: record stores and the ownership-scoped access layer on top of them.

pub mod access;
pub mod store;
