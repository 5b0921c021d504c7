//! Existing-type to stream-view mapping table
//!
//! The table is built once per run and never persisted. For the adapter
//! upgrade case it is generated from the upgraded types found in the
//! namespace, creating one stream view per existing type.

use crate::confirm::{review_and_confirm, Operator};
use crate::error::MigrationError;
use crate::type_id::UpgradedTypeId;
use sds_client::{SdsClient, SdsStreamView};
use std::collections::BTreeMap;

/// Map from existing type id to the stream view that upgrades it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMappings {
    entries: BTreeMap<String, String>,
}

impl TypeMappings {
    /// Create an empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `existing_type_id` to `stream_view_id`, replacing any previous view
    pub fn insert(&mut self, existing_type_id: impl Into<String>, stream_view_id: impl Into<String>) {
        self.entries.insert(existing_type_id.into(), stream_view_id.into());
    }

    /// Stream view for a stream currently typed `existing_type_id`
    #[must_use]
    pub fn get(&self, existing_type_id: &str) -> Option<&str> {
        self.entries.get(existing_type_id).map(String::as_str)
    }

    /// Number of mapped types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no type is mapped
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mapped existing type ids, in order
    pub fn existing_type_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(existing type id, stream view id)` pairs, in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TypeMappings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mappings = Self::new();
        for (k, v) in iter {
            mappings.insert(k, v);
        }
        mappings
    }
}

/// Build the table for an adapter upgrade
///
/// Finds the adapter's `TimeIndexed.<DataType>.<Adapter>Quality` types,
/// and once the operator approves, gets or creates a stream view
/// `<Adapter>_<DataType>_quality` from `TimeIndexed.<DataType>` to each.
/// Every id is parsed before anything is created, so a malformed id leaves
/// the namespace untouched. Declining yields an empty table.
pub async fn generate_adapter_upgrade_mappings<C, O>(
    client: &C,
    namespace_id: &str,
    adapter_name: &str,
    operator: &mut O,
) -> Result<TypeMappings, MigrationError>
where
    C: SdsClient + ?Sized,
    O: Operator + ?Sized,
{
    let query = UpgradedTypeId::search_query(adapter_name);
    tracing::debug!("Searching types with query {}", query);
    let new_types = client.list_types(namespace_id, &query).await?;

    let upgraded = new_types
        .iter()
        .map(|t| UpgradedTypeId::parse(&t.id, adapter_name))
        .collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<String> = upgraded.iter().map(ToString::to_string).collect();
    let summary = format!(
        "Found {} types that are potentially going to have stream views created to map existing types to them.",
        upgraded.len()
    );
    let proceed = review_and_confirm(
        operator,
        &summary,
        &ids,
        "Would you like to create the stream views? (y/n): ",
    )?;

    let mut mappings = TypeMappings::new();
    if !proceed {
        tracing::info!("Returning blank mapping table");
        return Ok(mappings);
    }

    for new_type in &upgraded {
        let existing_type_id = new_type.existing_type_id();
        let view = SdsStreamView::new(
            new_type.stream_view_id(),
            existing_type_id.clone(),
            new_type.as_str(),
        );

        tracing::info!(
            "Creating streamview with id {} mapping {} to {}...",
            view.id,
            existing_type_id,
            new_type
        );
        let view = client.get_or_create_stream_view(namespace_id, &view).await?;
        mappings.insert(existing_type_id, view.id);
    }

    tracing::info!("Done creating stream views.");
    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AutoApprove, ConsoleOperator};
    use crate::error::TypeIdError;
    use pretty_assertions::assert_eq;
    use sds_client::{InMemorySds, SdsType, SdsTypeCode};
    use std::io::Cursor;

    const NS: &str = "default";

    async fn namespace_with(type_ids: &[&str]) -> InMemorySds {
        let sds = InMemorySds::new();
        for id in type_ids {
            sds.get_or_create_type(NS, &SdsType::new(*id, SdsTypeCode::Object))
                .await
                .unwrap();
        }
        sds
    }

    #[tokio::test]
    async fn one_view_per_upgraded_type() {
        let sds = namespace_with(&[
            "TimeIndexed.Double",
            "TimeIndexed.Int32",
            "TimeIndexed.Double.OpcUaQuality",
            "TimeIndexed.Int32.OpcUaQuality",
            "TimeIndexed.Double.ModbusQuality",
        ])
        .await;

        let mappings = generate_adapter_upgrade_mappings(&sds, NS, "OpcUa", &mut AutoApprove)
            .await
            .unwrap();

        let expected: TypeMappings = [
            ("TimeIndexed.Double", "OpcUa_Double_quality"),
            ("TimeIndexed.Int32", "OpcUa_Int32_quality"),
        ]
        .into_iter()
        .collect();
        assert_eq!(mappings, expected);
        assert_eq!(sds.stats().stream_views_created, 2);
    }

    #[tokio::test]
    async fn declining_creates_nothing() {
        let sds = namespace_with(&["TimeIndexed.Double", "TimeIndexed.Double.OpcUaQuality"]).await;
        let mut operator = ConsoleOperator::new(Cursor::new(b"n\nn\n".to_vec()), Vec::new());

        let mappings = generate_adapter_upgrade_mappings(&sds, NS, "OpcUa", &mut operator)
            .await
            .unwrap();

        assert!(mappings.is_empty());
        assert_eq!(sds.stats().stream_views_created, 0);
    }

    #[tokio::test]
    async fn malformed_id_fails_before_any_view() {
        let sds = namespace_with(&[
            "TimeIndexed.Double",
            "TimeIndexed.Double.OpcUaQuality",
            "TimeIndexed.Double.Extra.OpcUaQuality",
        ])
        .await;

        let err = generate_adapter_upgrade_mappings(&sds, NS, "OpcUa", &mut AutoApprove)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MigrationError::TypeId(TypeIdError::Malformed { ref id, .. })
                if id == "TimeIndexed.Double.Extra.OpcUaQuality"
        ));
        assert_eq!(sds.stats().stream_views_created, 0);
    }

    #[tokio::test]
    async fn missing_existing_type_propagates_remote_error() {
        let sds = namespace_with(&["TimeIndexed.Double.OpcUaQuality"]).await;

        let err = generate_adapter_upgrade_mappings(&sds, NS, "OpcUa", &mut AutoApprove)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Client(_)));
    }

    #[test]
    fn later_insert_replaces_view() {
        let mut mappings = TypeMappings::new();
        mappings.insert("TimeIndexed.Double", "a");
        mappings.insert("TimeIndexed.Double", "b");

        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings.get("TimeIndexed.Double"), Some("b"));
        assert_eq!(mappings.existing_type_ids().collect::<Vec<_>>(), ["TimeIndexed.Double"]);
    }
}
