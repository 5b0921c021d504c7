//! Stream migration driver
//!
//! Finds the candidate streams and, once the operator approves, moves every
//! stream whose type is in the mapping table onto its stream view's target
//! type. There is no rollback: a failed update stops the run and leaves the
//! streams converted so far as they are.

use crate::confirm::{review_and_confirm, Operator};
use crate::error::MigrationError;
use crate::mapping::TypeMappings;
use sds_client::SdsClient;

/// A stream left alone because its type has no mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStream {
    /// Stream id
    pub stream_id: String,
    /// The unmapped type it carries
    pub type_id: String,
}

/// Result of an approved migration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Ids of converted streams, in processing order
    pub converted: Vec<String>,
    /// Streams skipped, in processing order
    pub skipped: Vec<SkippedStream>,
}

impl MigrationReport {
    /// Number of converted streams
    #[inline]
    #[must_use]
    pub fn converted_count(&self) -> usize {
        self.converted.len()
    }

    /// Number of skipped streams
    #[inline]
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// How the driver finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The operator approved and every stream was processed
    Completed(MigrationReport),
    /// The operator declined; nothing was changed
    Declined,
}

impl MigrationOutcome {
    /// Number of converted streams (zero when declined)
    #[must_use]
    pub fn converted_count(&self) -> usize {
        match self {
            Self::Completed(report) => report.converted_count(),
            Self::Declined => 0,
        }
    }
}

/// Convert the streams matching `stream_query` using `mappings`
pub async fn migrate_streams<C, O>(
    client: &C,
    namespace_id: &str,
    stream_query: &str,
    mappings: &TypeMappings,
    operator: &mut O,
) -> Result<MigrationOutcome, MigrationError>
where
    C: SdsClient + ?Sized,
    O: Operator + ?Sized,
{
    let streams = client.list_streams(namespace_id, stream_query).await?;

    let listing: Vec<String> = streams
        .iter()
        .map(|s| format!("ID: {} Name: {}", s.id, s.display_name()))
        .collect();
    let summary = format!(
        "Found {} streams that are potentially going to be converted using stream view.",
        streams.len()
    );
    let proceed = review_and_confirm(
        operator,
        &summary,
        &listing,
        "Would you like to continue with the type conversions? (y/n): ",
    )?;

    if !proceed {
        tracing::info!("Exiting. No transformation is going to happen.");
        return Ok(MigrationOutcome::Declined);
    }

    tracing::info!("Processing streams...");
    let mut report = MigrationReport::default();

    for stream in &streams {
        let Some(stream_view_id) = mappings.get(&stream.type_id) else {
            tracing::info!(
                "Skipped {} because it has a type of {}, which is not in the mappings table.",
                stream.id,
                stream.type_id
            );
            report.skipped.push(SkippedStream {
                stream_id: stream.id.clone(),
                type_id: stream.type_id.clone(),
            });
            continue;
        };

        tracing::info!(
            "Changing type of {} away from {} using streamview id {}...",
            stream.id,
            stream.type_id,
            stream_view_id
        );
        if let Err(source) = client
            .update_stream_type(namespace_id, &stream.id, stream_view_id)
            .await
        {
            return Err(MigrationError::Aborted {
                stream_id: stream.id.clone(),
                converted: report.converted_count(),
                skipped: report.skipped_count(),
                source,
            });
        }
        report.converted.push(stream.id.clone());
    }

    let done = format!(
        "Operation completed. Successfully converted {} streams and skipped {} streams.",
        report.converted_count(),
        report.skipped_count()
    );
    tracing::info!("{}", done);
    operator.say(&done)?;

    Ok(MigrationOutcome::Completed(report))
}
