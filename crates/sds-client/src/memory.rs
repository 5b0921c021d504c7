//! In-process SDS namespace store
//!
//! Implements [`SdsClient`] against plain maps so the migration workflow can
//! be exercised without a tenant. It keeps the service rules the workflow
//! depends on:
//! - get-or-create returns the existing resource when the definition matches
//!   and fails with a conflict when it does not
//! - a stream's type can only change through a stream view whose source type
//!   is the stream's current type
//! - streams and stream views must reference existing types

use crate::client::SdsClient;
use crate::error::{ClientError, ResourceKind, Result};
use crate::models::{SdsStream, SdsStreamView, SdsType};
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
struct Namespace {
    types: BTreeMap<String, SdsType>,
    streams: BTreeMap<String, SdsStream>,
    stream_views: BTreeMap<String, SdsStreamView>,
}

/// Counters of mutating calls, for assertions in tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStats {
    /// Stream views actually inserted (not reused)
    pub stream_views_created: usize,
    /// Successful `update_stream_type` calls
    pub stream_type_updates: usize,
}

/// In-memory [`SdsClient`]
#[derive(Debug, Default)]
pub struct InMemorySds {
    namespaces: Mutex<HashMap<String, Namespace>>,
    stats: Mutex<CallStats>,
}

impl InMemorySds {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the call counters
    #[must_use]
    pub fn stats(&self) -> CallStats {
        *self.stats.lock()
    }

    /// Current state of one stream, if it exists
    #[must_use]
    pub fn stream(&self, namespace_id: &str, stream_id: &str) -> Option<SdsStream> {
        self.namespaces
            .lock()
            .get(namespace_id)
            .and_then(|ns| ns.streams.get(stream_id).cloned())
    }

    fn with_namespace<T>(&self, namespace_id: &str, f: impl FnOnce(&mut Namespace) -> T) -> T {
        let mut namespaces = self.namespaces.lock();
        f(namespaces.entry(namespace_id.to_string()).or_default())
    }
}

fn get_or_insert<T: Clone + PartialEq>(
    map: &mut BTreeMap<String, T>,
    kind: ResourceKind,
    id: &str,
    value: &T,
) -> Result<(T, bool)> {
    match map.get(id) {
        Some(existing) if existing == value => Ok((existing.clone(), false)),
        Some(_) => Err(ClientError::conflict(kind, id)),
        None => {
            map.insert(id.to_string(), value.clone());
            Ok((value.clone(), true))
        }
    }
}

fn require_type(ns: &Namespace, type_id: &str) -> Result<()> {
    if ns.types.contains_key(type_id) {
        Ok(())
    } else {
        Err(ClientError::InvalidRequest(format!(
            "type {type_id} does not exist"
        )))
    }
}

#[async_trait::async_trait]
impl SdsClient for InMemorySds {
    async fn list_types(&self, namespace_id: &str, query: &str) -> Result<Vec<SdsType>> {
        let query = SearchQuery::parse(query)?;
        Ok(self.with_namespace(namespace_id, |ns| {
            ns.types
                .values()
                .filter(|t| query.matches(&t.id, t.name.as_deref()))
                .cloned()
                .collect()
        }))
    }

    async fn get_type(&self, namespace_id: &str, type_id: &str) -> Result<SdsType> {
        self.with_namespace(namespace_id, |ns| {
            ns.types
                .get(type_id)
                .cloned()
                .ok_or_else(|| ClientError::not_found(ResourceKind::Type, type_id))
        })
    }

    async fn get_or_create_type(&self, namespace_id: &str, sds_type: &SdsType) -> Result<SdsType> {
        self.with_namespace(namespace_id, |ns| {
            get_or_insert(&mut ns.types, ResourceKind::Type, &sds_type.id, sds_type)
                .map(|(t, _)| t)
        })
    }

    async fn delete_type(&self, namespace_id: &str, type_id: &str) -> Result<()> {
        self.with_namespace(namespace_id, |ns| {
            let in_use = ns.streams.values().any(|s| s.type_id == type_id)
                || ns
                    .stream_views
                    .values()
                    .any(|v| v.source_type_id == type_id || v.target_type_id == type_id);
            if in_use {
                return Err(ClientError::InvalidRequest(format!(
                    "type {type_id} is still referenced"
                )));
            }
            ns.types
                .remove(type_id)
                .map(|_| ())
                .ok_or_else(|| ClientError::not_found(ResourceKind::Type, type_id))
        })
    }

    async fn list_streams(&self, namespace_id: &str, query: &str) -> Result<Vec<SdsStream>> {
        let query = SearchQuery::parse(query)?;
        Ok(self.with_namespace(namespace_id, |ns| {
            ns.streams
                .values()
                .filter(|s| query.matches(&s.id, s.name.as_deref()))
                .cloned()
                .collect()
        }))
    }

    async fn get_or_create_stream(
        &self,
        namespace_id: &str,
        stream: &SdsStream,
    ) -> Result<SdsStream> {
        self.with_namespace(namespace_id, |ns| {
            require_type(ns, &stream.type_id)?;
            get_or_insert(&mut ns.streams, ResourceKind::Stream, &stream.id, stream).map(|(s, _)| s)
        })
    }

    async fn get_stream_type(&self, namespace_id: &str, stream_id: &str) -> Result<SdsType> {
        self.with_namespace(namespace_id, |ns| {
            let stream = ns
                .streams
                .get(stream_id)
                .ok_or_else(|| ClientError::not_found(ResourceKind::Stream, stream_id))?;
            ns.types
                .get(&stream.type_id)
                .cloned()
                .ok_or_else(|| ClientError::not_found(ResourceKind::Type, stream.type_id.clone()))
        })
    }

    async fn update_stream_type(
        &self,
        namespace_id: &str,
        stream_id: &str,
        stream_view_id: &str,
    ) -> Result<()> {
        self.with_namespace(namespace_id, |ns| {
            let view = ns
                .stream_views
                .get(stream_view_id)
                .cloned()
                .ok_or_else(|| ClientError::not_found(ResourceKind::StreamView, stream_view_id))?;
            let stream = ns
                .streams
                .get_mut(stream_id)
                .ok_or_else(|| ClientError::not_found(ResourceKind::Stream, stream_id))?;

            if stream.type_id != view.source_type_id {
                return Err(ClientError::InvalidRequest(format!(
                    "stream view {} maps {}, but stream {} has type {}",
                    view.id, view.source_type_id, stream.id, stream.type_id
                )));
            }

            stream.type_id = view.target_type_id;
            Ok(())
        })?;

        self.stats.lock().stream_type_updates += 1;
        Ok(())
    }

    async fn delete_stream(&self, namespace_id: &str, stream_id: &str) -> Result<()> {
        self.with_namespace(namespace_id, |ns| {
            ns.streams
                .remove(stream_id)
                .map(|_| ())
                .ok_or_else(|| ClientError::not_found(ResourceKind::Stream, stream_id))
        })
    }

    async fn list_stream_views(
        &self,
        namespace_id: &str,
        query: &str,
    ) -> Result<Vec<SdsStreamView>> {
        let query = SearchQuery::parse(query)?;
        Ok(self.with_namespace(namespace_id, |ns| {
            ns.stream_views
                .values()
                .filter(|v| query.matches(&v.id, v.name.as_deref()))
                .cloned()
                .collect()
        }))
    }

    async fn get_or_create_stream_view(
        &self,
        namespace_id: &str,
        stream_view: &SdsStreamView,
    ) -> Result<SdsStreamView> {
        let (view, created) = self.with_namespace(namespace_id, |ns| {
            require_type(ns, &stream_view.source_type_id)?;
            require_type(ns, &stream_view.target_type_id)?;
            get_or_insert(
                &mut ns.stream_views,
                ResourceKind::StreamView,
                &stream_view.id,
                stream_view,
            )
        })?;

        if created {
            self.stats.lock().stream_views_created += 1;
        }
        Ok(view)
    }

    async fn delete_stream_view(&self, namespace_id: &str, stream_view_id: &str) -> Result<()> {
        self.with_namespace(namespace_id, |ns| {
            ns.stream_views
                .remove(stream_view_id)
                .map(|_| ())
                .ok_or_else(|| ClientError::not_found(ResourceKind::StreamView, stream_view_id))
        })
    }
}

/// The subset of SDS search syntax used by the workflow
///
/// Terms are `*` wildcard patterns joined by `AND`/`OR` (`AND` binds
/// tighter), optionally negated with `NOT`. Matching is case-insensitive
/// against the resource id or name. An empty query matches everything.
#[derive(Debug)]
pub struct SearchQuery {
    any_of: Vec<Vec<Term>>,
}

#[derive(Debug)]
struct Term {
    negated: bool,
    pattern: Regex,
}

impl SearchQuery {
    /// Parse a query string
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Self { any_of: Vec::new() });
        }

        let mut any_of = Vec::new();
        for clause in query.split(" OR ") {
            let mut all_of = Vec::new();
            for term in clause.split(" AND ") {
                let term = term.trim();
                let (negated, glob) = match term.strip_prefix("NOT ") {
                    Some(rest) => (true, rest.trim()),
                    None => (false, term),
                };
                if glob.is_empty() {
                    return Err(ClientError::InvalidRequest(format!(
                        "empty term in query '{query}'"
                    )));
                }
                all_of.push(Term {
                    negated,
                    pattern: glob_to_regex(glob)?,
                });
            }
            any_of.push(all_of);
        }

        Ok(Self { any_of })
    }

    /// Check whether a resource with `id` and `name` matches
    #[must_use]
    pub fn matches(&self, id: &str, name: Option<&str>) -> bool {
        if self.any_of.is_empty() {
            return true;
        }

        self.any_of.iter().any(|all_of| {
            all_of.iter().all(|term| {
                let hit = term.pattern.is_match(id)
                    || name.is_some_and(|name| term.pattern.is_match(name));
                hit != term.negated
            })
        })
    }
}

fn glob_to_regex(glob: &str) -> Result<Regex> {
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
        .map_err(|e| ClientError::InvalidRequest(format!("bad query term '{glob}': {e}")))
}
