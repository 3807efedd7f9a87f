//! Shared building blocks for svckit HTTP services
//!
//! This crate provides the cross-cutting pieces every service needs:
//! - Configuration loading from the environment
//! - The tagged application error and its HTTP mapping
//! - Database error classification by SQLSTATE
//! - Struct validation with translated field messages
//! - Extractors and caller information

pub mod caller;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod response;
pub mod validation;

pub use caller::Caller;
pub use config::ConfigError;
pub use error::{Code, Error, Interrupted, Result};
pub use extractors::ValidatedJson;
pub use response::{respond, respond_json, ErrorBody};
pub use validation::{Translator, ValidationFailure, Validator};
