// src/check/mod.rs
mod api;
mod callbacks;
mod client;
mod error;
mod types;

pub use api::{CheckApi, HttpCheckApi};
pub use callbacks::CheckCallbacks;
pub use client::{CheckClient, CheckPhase};
pub use error::CheckError;
pub use types::{
    AdResult, AdStatus, CheckPeriod, CheckRequest, CheckResponse, CheckStatus, StatusKind,
};
