//! bw-core - Core library for Branchway
//!
//! Holds the `branchway.yml` configuration model and the error type shared by
//! configuration loading.

pub mod config;
pub mod error;
pub(crate) mod serde_helpers;

pub use config::{BranchingConfig, Config, DatabaseConfig, DbType};
pub use error::{CoreError, CoreResult};
