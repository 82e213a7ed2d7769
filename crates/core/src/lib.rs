//! # sheetbridge-core
//!
//! Shared pieces for the sheetbridge service clients.
//!
//! This crate provides:
//! - The error taxonomy ([`BridgeError`])
//! - Credential loading ([`Credentials`])
//! - Configuration ([`BridgeConfig`], [`ApiEndpoints`])
//! - Input validators ([`validate`])

/// Configuration loading.
pub mod config;
/// Google credentials.
pub mod credentials;
/// Error types and result aliases.
pub mod error;
/// Input validators.
pub mod validate;

/// Re-export configuration types.
pub use config::{ApiEndpoints, BridgeConfig};
/// Re-export credential types.
pub use credentials::{Credentials, ServiceAccountKey};
/// Re-export core error types.
pub use error::{BridgeError, BridgeResult};
/// Re-export the validators.
pub use validate::{are_valid_tables, is_valid_folder_id, is_valid_workbook_name};
