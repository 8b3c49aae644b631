//! Record service behind the BVI company formation API.
//!
//! Companies, drafts and submissions are kept as open JSON objects in process
//! memory. The [`records`] module owns the store, the stamping rules and the
//! HTTP handlers; [`config`], [`telemetry`] and [`error`] carry the ambient
//! service plumbing shared with the `formation-api` binary.

pub mod config;
pub mod error;
pub mod records;
pub mod telemetry;
