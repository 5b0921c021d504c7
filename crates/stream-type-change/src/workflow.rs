//! Top-level orchestration
//!
//! Sequences mapping table → stream migration and hands back an explicit
//! result. The caller decides, through [`RunMode`], whether a failure is
//! surfaced to whatever launched the run.

use crate::config::{AppSettings, MappingSource};
use crate::confirm::Operator;
use crate::error::MigrationError;
use crate::mapping::{generate_adapter_upgrade_mappings, TypeMappings};
use crate::migration::{migrate_streams, MigrationOutcome};
use sds_client::SdsClient;

/// How the run was launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// An operator answers prompts at the console
    Interactive,
    /// Headless (automation, end-to-end tests); every gate proceeds
    Automated,
}

impl RunMode {
    /// Automated runs report failure to their launcher; interactive runs
    /// end normally once the error is logged
    #[inline]
    #[must_use]
    pub fn surfaces_failure(self) -> bool {
        matches!(self, Self::Automated)
    }
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The mapping table used
    pub mappings: TypeMappings,
    /// The driver's outcome
    pub outcome: MigrationOutcome,
}

/// Build the mapping table, then migrate the streams
pub async fn run<C, O>(
    settings: &AppSettings,
    source: &MappingSource,
    client: &C,
    operator: &mut O,
) -> Result<RunSummary, MigrationError>
where
    C: SdsClient + ?Sized,
    O: Operator + ?Sized,
{
    let mappings = match source {
        MappingSource::AdapterUpgrade { adapter_name } => {
            generate_adapter_upgrade_mappings(client, &settings.namespace_id, adapter_name, operator)
                .await?
        }
        MappingSource::Provided(mappings) => {
            tracing::info!("Using {} provided type mappings", mappings.len());
            for (existing_type_id, stream_view_id) in mappings.iter() {
                tracing::debug!("{} -> {}", existing_type_id, stream_view_id);
            }
            mappings.clone()
        }
    };

    let outcome = migrate_streams(
        client,
        &settings.namespace_id,
        &settings.stream_search_pattern,
        &mappings,
        operator,
    )
    .await?;

    Ok(RunSummary { mappings, outcome })
}
