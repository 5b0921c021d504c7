//! Testing utilities for the stream type change workspace
//!
//! Shared fixtures: a seeded in-memory namespace laid out like a tenant
//! after an adapter upgrade, a scripted operator, and sample settings.

#![allow(missing_docs)]

use sds_client::{
    ClientError, InMemorySds, SdsClient, SdsStream, SdsType, SdsTypeCode, SdsTypeProperty,
};
use std::collections::{BTreeMap, VecDeque};
use std::io;
use stream_type_change::config::AppSettings;
use stream_type_change::confirm::Operator;

pub const NAMESPACE: &str = "e2e";
pub const ADAPTER: &str = "OpcUa";
pub const STREAM_SEARCH_PATTERN: &str = "e2etest_for_* AND *_conversion";
pub const STREAMS_PER_TYPE: usize = 2;

/// Settings pointing at the fixture namespace
pub fn sample_settings() -> AppSettings {
    AppSettings {
        resource: "https://example.com".to_string(),
        api_version: "v1".to_string(),
        tenant_id: "tenant".to_string(),
        namespace_id: NAMESPACE.to_string(),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        stream_search_pattern: STREAM_SEARCH_PATTERN.to_string(),
        adapter_name: Some(ADAPTER.to_string()),
    }
}

/// `e2etest_for_<type>_<i>_conversion`
pub fn stream_id(type_id: &str, i: usize) -> String {
    format!("e2etest_for_{type_id}_{i}_conversion")
}

/// `TimeIndexed.<data type>` with a timestamp key and a value
pub fn legacy_type(data_type: &str, value_code: SdsTypeCode) -> SdsType {
    let id = format!("TimeIndexed.{data_type}");
    SdsType::new(id.clone(), SdsTypeCode::Object)
        .with_name(id)
        .with_property(SdsTypeProperty::key(
            "Timestamp",
            SdsType::new("DateTime", SdsTypeCode::DateTime),
        ))
        .with_property(SdsTypeProperty::new(
            "Value",
            SdsType::new(data_type, value_code),
        ))
}

/// The legacy type's properties plus a `Quality` property
pub fn upgraded_type(legacy: &SdsType, adapter: &str) -> SdsType {
    let id = format!("{}.{adapter}Quality", legacy.id);
    let mut upgraded = SdsType::new(id.clone(), SdsTypeCode::Object).with_name(id);
    upgraded.properties = legacy.properties.clone();
    upgraded.with_property(SdsTypeProperty::new(
        "Quality",
        SdsType::new("uint32", SdsTypeCode::UInt32),
    ))
}

/// A namespace after an adapter upgrade
///
/// Every legacy type has an upgraded counterpart and
/// [`STREAMS_PER_TYPE`] streams still carrying the legacy type.
#[derive(Debug)]
pub struct UpgradedNamespace {
    pub sds: InMemorySds,
    /// Stream id -> type id the stream was created with
    pub original_types: BTreeMap<String, String>,
}

impl UpgradedNamespace {
    /// Seed legacy `Double`, `Int32` and `String` types
    pub async fn seed() -> Result<Self, ClientError> {
        Self::seed_with(&[
            ("Double", SdsTypeCode::Double),
            ("Int32", SdsTypeCode::Int32),
            ("String", SdsTypeCode::String),
        ])
        .await
    }

    pub async fn seed_with(data_types: &[(&str, SdsTypeCode)]) -> Result<Self, ClientError> {
        let sds = InMemorySds::new();
        let mut original_types = BTreeMap::new();

        for (data_type, code) in data_types {
            let legacy = sds
                .get_or_create_type(NAMESPACE, &legacy_type(data_type, *code))
                .await?;
            sds.get_or_create_type(NAMESPACE, &upgraded_type(&legacy, ADAPTER))
                .await?;

            for i in 0..STREAMS_PER_TYPE {
                let stream = SdsStream::new(stream_id(&legacy.id, i), legacy.id.clone());
                sds.get_or_create_stream(NAMESPACE, &stream).await?;
                original_types.insert(stream.id, legacy.id.clone());
            }
        }

        Ok(Self {
            sds,
            original_types,
        })
    }

    /// Type id each seeded stream should carry after migration
    pub fn expected_types(&self) -> BTreeMap<String, String> {
        self.original_types
            .iter()
            .map(|(stream, legacy)| (stream.clone(), format!("{legacy}.{ADAPTER}Quality")))
            .collect()
    }

    /// Current type id of every seeded stream
    pub async fn current_types(&self) -> Result<BTreeMap<String, String>, ClientError> {
        let mut current = BTreeMap::new();
        for stream in self.original_types.keys() {
            let sds_type = self.sds.get_stream_type(NAMESPACE, stream).await?;
            current.insert(stream.clone(), sds_type.id);
        }
        Ok(current)
    }
}

/// Operator answering from a script
///
/// Runs out of answers as "no". Records every prompt and line shown.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub lines: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Operator for ScriptedOperator {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}
