//! Client facade over an SDS namespace
//!
//! [`SdsClient`] is the seam between the migration workflow and the hosted
//! service. Production code uses [`HttpSdsClient`](crate::HttpSdsClient);
//! tests use the in-memory backend or a mock.

use crate::error::Result;
use crate::models::{SdsStream, SdsStreamView, SdsType};

/// Types, streams and stream views operations
///
/// Every operation is scoped to a namespace. List operations take an SDS
/// search query and return all matching resources, not just the first page.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait::async_trait]
pub trait SdsClient: Send + Sync {
    /// List types matching `query`
    async fn list_types(&self, namespace_id: &str, query: &str) -> Result<Vec<SdsType>>;

    /// Get one type
    async fn get_type(&self, namespace_id: &str, type_id: &str) -> Result<SdsType>;

    /// Create a type, or return the existing one if its definition matches
    async fn get_or_create_type(&self, namespace_id: &str, sds_type: &SdsType) -> Result<SdsType>;

    /// Delete a type
    async fn delete_type(&self, namespace_id: &str, type_id: &str) -> Result<()>;

    /// List streams matching `query`
    async fn list_streams(&self, namespace_id: &str, query: &str) -> Result<Vec<SdsStream>>;

    /// Create a stream, or return the existing one if its definition matches
    async fn get_or_create_stream(
        &self,
        namespace_id: &str,
        stream: &SdsStream,
    ) -> Result<SdsStream>;

    /// Get the type a stream currently carries
    async fn get_stream_type(&self, namespace_id: &str, stream_id: &str) -> Result<SdsType>;

    /// Change a stream's type through a stream view
    ///
    /// The view's source type must equal the stream's current type; the
    /// stream ends up with the view's target type.
    async fn update_stream_type(
        &self,
        namespace_id: &str,
        stream_id: &str,
        stream_view_id: &str,
    ) -> Result<()>;

    /// Delete a stream
    async fn delete_stream(&self, namespace_id: &str, stream_id: &str) -> Result<()>;

    /// List stream views matching `query`
    async fn list_stream_views(&self, namespace_id: &str, query: &str)
        -> Result<Vec<SdsStreamView>>;

    /// Create a stream view, or return the existing one if its definition matches
    async fn get_or_create_stream_view(
        &self,
        namespace_id: &str,
        stream_view: &SdsStreamView,
    ) -> Result<SdsStreamView>;

    /// Delete a stream view
    async fn delete_stream_view(&self, namespace_id: &str, stream_view_id: &str) -> Result<()>;
}
