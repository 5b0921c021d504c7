//! Stream Type Change
//!
//! Moves SDS streams from their existing `TimeIndexed.<DataType>` types to
//! the quality-augmented `TimeIndexed.<DataType>.<Adapter>Quality` types an
//! adapter upgrade introduces, without rewriting stored data:
//! 1. **Mapping**: find the upgraded types and get-or-create one stream view
//!    per existing type
//! 2. **Migration**: find the candidate streams and change each mapped
//!    stream's type through its stream view
//!
//! Both steps are gated by an [`Operator`](confirm::Operator) confirmation.
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_type_change::prelude::*;
//!
//! let settings = AppSettings::load("appsettings.json")?;
//! let source = MappingSource::resolve(&settings, None)?;
//! let client = HttpSdsClient::new(settings.connection())?;
//!
//! let summary = run(&settings, &source, &client, &mut AutoApprove).await?;
//! println!("converted {}", summary.outcome.converted_count());
//! ```

pub mod config;
pub mod confirm;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod migration;
pub mod type_id;
pub mod workflow;

pub use error::{ConfigError, MigrationError, TypeIdError};

/// Common imports for running the workflow
pub mod prelude {
    pub use crate::config::{AppSettings, MappingSource};
    pub use crate::confirm::{AutoApprove, ConsoleOperator, Operator};
    pub use crate::error::{ConfigError, MigrationError, TypeIdError};
    pub use crate::mapping::{generate_adapter_upgrade_mappings, TypeMappings};
    pub use crate::migration::{migrate_streams, MigrationOutcome, MigrationReport, SkippedStream};
    pub use crate::type_id::UpgradedTypeId;
    pub use crate::workflow::{run, RunMode, RunSummary};
    pub use sds_client::{HttpSdsClient, SdsClient};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
