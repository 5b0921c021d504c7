//! Upgraded type identifiers
//!
//! An adapter upgrade adds a quality-augmented type next to every existing
//! time-indexed type:
//!
//! ```text
//! TimeIndexed.<DataType>                  existing type
//! TimeIndexed.<DataType>.<Adapter>Quality upgraded type
//! ```

use crate::error::TypeIdError;

/// Leading segment shared by existing and upgraded types
pub const TIME_INDEXED_PREFIX: &str = "TimeIndexed";

/// Suffix appended to the adapter name in the last segment
pub const QUALITY_SUFFIX: &str = "Quality";

/// Parsed `TimeIndexed.<DataType>.<Adapter>Quality`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradedTypeId {
    id: String,
    data_type: String,
    adapter_name: String,
}

impl UpgradedTypeId {
    /// Parse `id`, which must belong to `adapter_name`
    ///
    /// Exactly three non-empty dot-separated segments are accepted. The
    /// prefix and the quality segment compare case-insensitively, as the
    /// catalog search does.
    pub fn parse(id: &str, adapter_name: &str) -> Result<Self, TypeIdError> {
        let segments: Vec<&str> = id.split('.').collect();
        let [prefix, data_type, quality] = segments.as_slice() else {
            return Err(TypeIdError::malformed(
                id,
                format!("expected 3 dot-separated segments, found {}", segments.len()),
            ));
        };

        if !prefix.eq_ignore_ascii_case(TIME_INDEXED_PREFIX) {
            return Err(TypeIdError::malformed(
                id,
                format!("first segment must be '{TIME_INDEXED_PREFIX}'"),
            ));
        }
        if data_type.is_empty() {
            return Err(TypeIdError::malformed(id, "data type segment is empty"));
        }

        let expected = Self::quality_segment(adapter_name);
        if !quality.eq_ignore_ascii_case(&expected) {
            return Err(TypeIdError::malformed(
                id,
                format!("last segment must be '{expected}'"),
            ));
        }

        Ok(Self {
            id: id.to_string(),
            data_type: (*data_type).to_string(),
            adapter_name: adapter_name.to_string(),
        })
    }

    /// Catalog query selecting the adapter's upgraded types
    #[must_use]
    pub fn search_query(adapter_name: &str) -> String {
        format!("{TIME_INDEXED_PREFIX}.* AND *.{}", Self::quality_segment(adapter_name))
    }

    fn quality_segment(adapter_name: &str) -> String {
        format!("{adapter_name}{QUALITY_SUFFIX}")
    }

    /// The full upgraded type id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// The data type segment, e.g. `Double`
    #[inline]
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// The type streams carry before the upgrade, `TimeIndexed.<DataType>`
    #[must_use]
    pub fn existing_type_id(&self) -> String {
        format!("{TIME_INDEXED_PREFIX}.{}", self.data_type)
    }

    /// Id of the stream view mapping the existing type onto this one
    #[must_use]
    pub fn stream_view_id(&self) -> String {
        format!("{}_{}_quality", self.adapter_name, self.data_type)
    }
}

impl std::fmt::Display for UpgradedTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn derives_existing_type_and_view() {
        let parsed = UpgradedTypeId::parse("TimeIndexed.Double.OpcUaQuality", "OpcUa").unwrap();

        assert_eq!(parsed.data_type(), "Double");
        assert_eq!(parsed.existing_type_id(), "TimeIndexed.Double");
        assert_eq!(parsed.stream_view_id(), "OpcUa_Double_quality");
        assert_eq!(parsed.to_string(), "TimeIndexed.Double.OpcUaQuality");
    }

    #[test]
    fn search_query_shape() {
        assert_eq!(
            UpgradedTypeId::search_query("OpcUa"),
            "TimeIndexed.* AND *.OpcUaQuality"
        );
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        for id in ["TimeIndexed", "TimeIndexed.OpcUaQuality", "TimeIndexed.Foo.Bar.OpcUaQuality"] {
            let err = UpgradedTypeId::parse(id, "OpcUa").unwrap_err();
            assert!(matches!(err, TypeIdError::Malformed { .. }), "{id}");
        }
    }

    #[test]
    fn rejects_foreign_prefix_adapter_and_empty_data_type() {
        assert!(UpgradedTypeId::parse("Indexed.Double.OpcUaQuality", "OpcUa").is_err());
        assert!(UpgradedTypeId::parse("TimeIndexed.Double.ModbusQuality", "OpcUa").is_err());
        assert!(UpgradedTypeId::parse("TimeIndexed..OpcUaQuality", "OpcUa").is_err());
    }

    #[test]
    fn prefix_and_quality_segment_ignore_case() {
        for id in [
            "timeindexed.Double.OpcUaQuality",
            "TIMEINDEXED.Double.opcuaquality",
            "TimeIndexed.Double.OPCUAQUALITY",
        ] {
            let parsed = UpgradedTypeId::parse(id, "OpcUa").unwrap();
            assert_eq!(parsed.existing_type_id(), "TimeIndexed.Double", "{id}");
            assert_eq!(parsed.as_str(), id);
        }
    }

    proptest! {
        #[test]
        fn prop_well_formed_ids_round_trip(
            data_type in "[A-Za-z][A-Za-z0-9]{0,12}",
            adapter in "[A-Za-z][A-Za-z0-9]{0,8}",
        ) {
            let id = format!("TimeIndexed.{data_type}.{adapter}Quality");
            let parsed = UpgradedTypeId::parse(&id, &adapter).unwrap();

            prop_assert_eq!(parsed.existing_type_id(), format!("TimeIndexed.{data_type}"));
            prop_assert_eq!(parsed.stream_view_id(), format!("{adapter}_{data_type}_quality"));
        }
    }
}
