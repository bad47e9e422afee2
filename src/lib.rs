// src/lib.rs
pub mod check;
pub mod config;
pub mod endpoint;
pub mod page;
pub mod render;
pub mod token;
