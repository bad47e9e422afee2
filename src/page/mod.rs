// src/page/mod.rs
mod document;

pub use document::{FieldId, FormField, Page, Visibility};
