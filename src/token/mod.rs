// src/token/mod.rs
mod refresher;
mod source;

pub use refresher::{RefreshTrigger, TokenRefresher, DEFAULT_REFRESH_INTERVAL};
pub use source::{HttpTokenSource, TokenError, TokenSource};
