//! bw-release - Release branching for Branchway
//!
//! The set of migration scripts a database sees depends on a release
//! identifier stored in the database itself. [`ReleaseStore`] owns the
//! single-row control table holding that identifier, and
//! [`BranchCoordinator`] keeps a [`bw_engine::MigrationEngine`]'s locations
//! pointed at the stored release, running another migration pass whenever a
//! pass changes it.

pub mod coordinator;
pub mod ddl;
pub mod error;
pub mod locations;
pub mod store;

pub use coordinator::{BranchCoordinator, MigrationSummary};
pub use error::{BranchError, BranchResult};
pub use locations::{compute_locations, validate_release};
pub use store::{ReleaseStore, ReleaseTable};
