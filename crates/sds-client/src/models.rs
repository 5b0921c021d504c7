//! SDS resource models
//!
//! Field names follow the service's PascalCase JSON. Optional fields are
//! omitted on serialization so get-or-create requests carry only what the
//! caller set.

use serde::{Deserialize, Serialize};

/// SDS type code
///
/// Serialized as the integer code the service uses. Codes this crate does
/// not name are preserved in [`SdsTypeCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SdsTypeCode {
    /// No type
    #[default]
    Empty,
    /// Composite type with properties
    Object,
    /// Boolean
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Single,
    /// 64-bit float
    Double,
    /// Timestamp
    DateTime,
    /// UTF-16 string
    String,
    /// Any other code
    Other(i32),
}

impl From<i32> for SdsTypeCode {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Empty,
            1 => Self::Object,
            3 => Self::Boolean,
            9 => Self::Int32,
            10 => Self::UInt32,
            11 => Self::Int64,
            12 => Self::UInt64,
            13 => Self::Single,
            14 => Self::Double,
            16 => Self::DateTime,
            18 => Self::String,
            other => Self::Other(other),
        }
    }
}

impl From<SdsTypeCode> for i32 {
    fn from(code: SdsTypeCode) -> Self {
        match code {
            SdsTypeCode::Empty => 0,
            SdsTypeCode::Object => 1,
            SdsTypeCode::Boolean => 3,
            SdsTypeCode::Int32 => 9,
            SdsTypeCode::UInt32 => 10,
            SdsTypeCode::Int64 => 11,
            SdsTypeCode::UInt64 => 12,
            SdsTypeCode::Single => 13,
            SdsTypeCode::Double => 14,
            SdsTypeCode::DateTime => 16,
            SdsTypeCode::String => 18,
            SdsTypeCode::Other(other) => other,
        }
    }
}

/// A type schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdsType {
    /// Type identifier, e.g. `TimeIndexed.Double.OpcUaQuality`
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type code
    #[serde(default)]
    pub sds_type_code: SdsTypeCode,
    /// Properties, for object types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SdsTypeProperty>,
}

impl SdsType {
    /// Create a type with an id and code
    #[must_use]
    pub fn new(id: impl Into<String>, code: SdsTypeCode) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            sds_type_code: code,
            properties: Vec::new(),
        }
    }

    /// With display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With an appended property
    #[must_use]
    pub fn with_property(mut self, property: SdsTypeProperty) -> Self {
        self.properties.push(property);
        self
    }
}

/// A property of an object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdsTypeProperty {
    /// Property identifier
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the property is part of the index
    #[serde(default)]
    pub is_key: bool,
    /// Property type
    pub sds_type: Box<SdsType>,
}

impl SdsTypeProperty {
    /// Create a non-key property
    #[must_use]
    pub fn new(id: impl Into<String>, sds_type: SdsType) -> Self {
        let id = id.into();
        Self {
            name: Some(id.clone()),
            id,
            is_key: false,
            sds_type: Box::new(sds_type),
        }
    }

    /// Create an index property
    #[must_use]
    pub fn key(id: impl Into<String>, sds_type: SdsType) -> Self {
        Self {
            is_key: true,
            ..Self::new(id, sds_type)
        }
    }
}

/// A named time-indexed data sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdsStream {
    /// Stream identifier
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current type
    pub type_id: String,
}

impl SdsStream {
    /// Create a stream whose name equals its id
    #[must_use]
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: Some(id.clone()),
            id,
            description: None,
            type_id: type_id.into(),
        }
    }

    /// Display name, falling back to the id
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Explicit property mapping inside a stream view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdsStreamViewProperty {
    /// Property id on the source type
    pub source_id: String,
    /// Property id on the target type
    pub target_id: String,
}

/// A declarative mapping from a source type to a target type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SdsStreamView {
    /// Stream view identifier
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type streams must currently carry
    pub source_type_id: String,
    /// Type streams are reinterpreted as
    pub target_type_id: String,
    /// Explicit mappings; empty lets the service infer them by property id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SdsStreamViewProperty>,
}

impl SdsStreamView {
    /// Create a stream view relying on inferred property mappings
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source_type_id: impl Into<String>,
        target_type_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            source_type_id: source_type_id.into(),
            target_type_id: target_type_id.into(),
            properties: Vec::new(),
        }
    }
}
