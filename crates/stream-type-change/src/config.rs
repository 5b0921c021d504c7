//! Configuration loading
//!
//! Settings come from a JSON document (`appsettings.json` by default):
//!
//! ```json
//! {
//!   "Resource": "https://uswe.datahub.connect.aveva.com",
//!   "ApiVersion": "v1",
//!   "TenantId": "tenant",
//!   "NamespaceId": "namespace",
//!   "ClientId": "client id",
//!   "ClientSecret": "client secret",
//!   "StreamSearchPattern": "pump* AND *flow",
//!   "AdapterName": "OpcUa"
//! }
//! ```
//!
//! The document is parsed into an all-optional raw form first, then
//! validated so a missing key is reported by name.

use crate::error::ConfigError;
use crate::mapping::TypeMappings;
use sds_client::{ConnectionSettings, Credentials};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";

/// API version used when the document does not name one
pub const DEFAULT_API_VERSION: &str = "v1";

/// Per-request timeout for remote calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSettings {
    api_version: Option<String>,
    tenant_id: Option<String>,
    resource: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    namespace_id: Option<String>,
    stream_search_pattern: Option<String>,
    #[serde(alias = "AdapterType")]
    adapter_name: Option<String>,
}

/// Validated settings
#[derive(Clone)]
pub struct AppSettings {
    /// Service root URL
    pub resource: String,
    /// API version path segment
    pub api_version: String,
    /// Tenant id
    pub tenant_id: String,
    /// Namespace holding the streams to migrate
    pub namespace_id: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Search query selecting candidate streams
    pub stream_search_pattern: String,
    /// Adapter whose upgraded types drive the mapping (e.g. `OpcUa`)
    pub adapter_name: Option<String>,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("resource", &self.resource)
            .field("api_version", &self.api_version)
            .field("tenant_id", &self.tenant_id)
            .field("namespace_id", &self.namespace_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("stream_search_pattern", &self.stream_search_pattern)
            .field("adapter_name", &self.adapter_name)
            .finish()
    }
}

impl AppSettings {
    /// Read and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::parse(path, source),
            other => other,
        })
    }

    /// Parse and validate a settings document
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings =
            serde_json::from_str(text).map_err(|e| ConfigError::parse("<inline>", e))?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ConfigError> {
        let resource = required(raw.resource, "Resource")?;
        if !(resource.starts_with("https://") || resource.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "Resource",
                message: format!("'{resource}' is not an http(s) URL"),
            });
        }

        Ok(Self {
            resource,
            api_version: present(raw.api_version).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            tenant_id: required(raw.tenant_id, "TenantId")?,
            namespace_id: required(raw.namespace_id, "NamespaceId")?,
            client_id: required(raw.client_id, "ClientId")?,
            client_secret: required(raw.client_secret, "ClientSecret")?,
            stream_search_pattern: required(raw.stream_search_pattern, "StreamSearchPattern")?,
            adapter_name: present(raw.adapter_name),
        })
    }

    /// Connection settings for the remote client
    #[must_use]
    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings {
            resource: self.resource.clone(),
            api_version: self.api_version.clone(),
            tenant_id: self.tenant_id.clone(),
            credentials: Credentials {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
            },
            timeout: REQUEST_TIMEOUT,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    present(value).ok_or(ConfigError::MissingField(field))
}

/// Where the existing-type to stream-view table comes from
#[derive(Debug, Clone, PartialEq)]
pub enum MappingSource {
    /// Generate it from the adapter's upgraded types, creating stream views
    AdapterUpgrade {
        /// Adapter name, e.g. `OpcUa`
        adapter_name: String,
    },
    /// Use a table supplied by the operator; the stream views already exist
    Provided(TypeMappings),
}

impl MappingSource {
    /// Pick the source: a mapping file wins, otherwise `AdapterName` is required
    pub fn resolve(settings: &AppSettings, mappings_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = mappings_file {
            return Ok(Self::Provided(load_mappings(path)?));
        }

        settings
            .adapter_name
            .clone()
            .map(|adapter_name| Self::AdapterUpgrade { adapter_name })
            .ok_or(ConfigError::MissingField("AdapterName"))
    }
}

fn load_mappings(path: &Path) -> Result<TypeMappings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    let table: std::collections::BTreeMap<String, String> =
        serde_json::from_str(&text).map_err(|e| ConfigError::parse(PathBuf::from(path), e))?;

    let mut mappings = TypeMappings::new();
    for (existing_type_id, stream_view_id) in table {
        if existing_type_id.trim().is_empty() || stream_view_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "mappings",
                message: format!("blank entry '{existing_type_id}' -> '{stream_view_id}'"),
            });
        }
        mappings.insert(existing_type_id, stream_view_id);
    }
    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FULL: &str = r#"{
        "Resource": "https://uswe.datahub.connect.aveva.com",
        "ApiVersion": "v1",
        "TenantId": "tenant",
        "NamespaceId": "ns",
        "ClientId": "id",
        "ClientSecret": "secret",
        "StreamSearchPattern": "e2etest_for_* AND *_conversion",
        "AdapterName": "OpcUa"
    }"#;

    #[test]
    fn parses_full_document() {
        let settings = AppSettings::from_json(FULL).unwrap();

        assert_eq!(settings.namespace_id, "ns");
        assert_eq!(settings.adapter_name.as_deref(), Some("OpcUa"));
        assert_eq!(settings.connection().tenant_id, "tenant");
        assert!(!format!("{settings:?}").contains("secret\""));
    }

    #[test]
    fn adapter_type_alias_and_default_version() {
        let json = r#"{
            "Resource": "https://example.com",
            "TenantId": "t", "NamespaceId": "n", "ClientId": "c", "ClientSecret": "s",
            "StreamSearchPattern": "*", "AdapterType": "Modbus"
        }"#;
        let settings = AppSettings::from_json(json).unwrap();

        assert_eq!(settings.adapter_name.as_deref(), Some("Modbus"));
        assert_eq!(settings.api_version, DEFAULT_API_VERSION);
    }

    #[test]
    fn missing_and_blank_keys_are_named() {
        let err = AppSettings::from_json(&FULL.replace("\"TenantId\": \"tenant\",", "")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("TenantId")));

        let err = AppSettings::from_json(&FULL.replace("\"secret\"", "\"  \"")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("ClientSecret")));
    }

    #[test]
    fn resource_must_be_http() {
        let err = AppSettings::from_json(&FULL.replace("https://uswe", "ftp://uswe")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "Resource", .. }));
    }

    #[test]
    fn load_reports_path_of_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appsettings.json");

        let err = AppSettings::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("appsettings.json"));

        std::fs::write(&path, "{ not json").unwrap();
        let err = AppSettings::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: ref p, .. } if p == &path));
    }

    #[test]
    fn mapping_file_overrides_adapter() {
        let mut settings = AppSettings::from_json(FULL).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"TimeIndexed.Double": "OpcUa_Double_quality"}}"#).unwrap();

        let source = MappingSource::resolve(&settings, Some(file.path())).unwrap();
        let MappingSource::Provided(mappings) = source else {
            panic!("expected provided mappings");
        };
        assert_eq!(mappings.get("TimeIndexed.Double"), Some("OpcUa_Double_quality"));

        settings.adapter_name = None;
        let err = MappingSource::resolve(&settings, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("AdapterName")));
    }
}
