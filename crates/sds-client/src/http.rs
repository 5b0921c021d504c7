//! reqwest-backed SDS client
//!
//! Talks to `{resource}/api/{version}/Tenants/{tenant}/Namespaces/{namespace}`.
//! Redirects are not followed: the service answers get-or-create requests
//! for existing resources with `302 Found`, which is resolved here with an
//! explicit `GET`.

use crate::auth::{Credentials, TokenProvider};
use crate::client::SdsClient;
use crate::error::{ClientError, ResourceKind, Result};
use crate::models::{SdsStream, SdsStreamView, SdsType};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Page size for list requests
pub const PAGE_SIZE: usize = 100;

/// Connection settings for [`HttpSdsClient`]
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Service root, e.g. `https://uswe.datahub.connect.aveva.com`
    pub resource: String,
    /// API version path segment, e.g. `v1`
    pub api_version: String,
    /// Tenant id
    pub tenant_id: String,
    /// Client credentials
    pub credentials: Credentials,
    /// Per-request timeout
    pub timeout: Duration,
}

/// SDS client over HTTPS
#[derive(Debug)]
pub struct HttpSdsClient {
    http: reqwest::Client,
    root: Url,
    api_version: String,
    tenant_id: String,
    auth: TokenProvider,
}

impl HttpSdsClient {
    /// Build a client; no request is made until the first operation
    pub fn new(settings: ConnectionSettings) -> Result<Self> {
        let root = Url::parse(&settings.resource)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", settings.resource)))?;
        if root.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(settings.resource));
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            auth: TokenProvider::new(root.as_str(), settings.credentials),
            root,
            api_version: settings.api_version,
            tenant_id: settings.tenant_id,
        })
    }

    /// URL of `segments` below the namespace root
    pub fn namespace_url(&self, namespace_id: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.root.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ClientError::InvalidUrl(self.root.to_string()))?;
            path.pop_if_empty().extend([
                "api",
                self.api_version.as_str(),
                "Tenants",
                self.tenant_id.as_str(),
                "Namespaces",
                namespace_id,
            ]);
            path.extend(segments);
        }
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<reqwest::RequestBuilder> {
        let token = self.auth.access_token(&self.http).await?;
        tracing::debug!("{} {}", method, url);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Send a bodiless request addressing one resource
    async fn send(
        &self,
        method: Method,
        url: Url,
        kind: ResourceKind,
        id: &str,
    ) -> Result<reqwest::Response> {
        let response = self.request(method, url).await?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(kind, id));
        }
        check(response, &format!("{kind} {id}")).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        kind: ResourceKind,
        id: &str,
    ) -> Result<T> {
        let response = self.send(Method::GET, url, kind, id).await?;
        Ok(response.json().await?)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        namespace_id: &str,
        kind: ResourceKind,
        query: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut skip = 0;

        loop {
            let mut url = self.namespace_url(namespace_id, &[kind.collection()])?;
            url.query_pairs_mut()
                .append_pair("query", query)
                .append_pair("skip", &skip.to_string())
                .append_pair("count", &PAGE_SIZE.to_string());

            let response = self
                .request(Method::GET, url)
                .await?
                .send()
                .await?;
            let page: Vec<T> = check(response, &format!("list {}", kind.collection()))
                .await?
                .json()
                .await?;

            let page_len = page.len();
            items.extend(page);
            if page_len < PAGE_SIZE {
                break;
            }
            skip += PAGE_SIZE;
        }

        Ok(items)
    }

    async fn get_or_create<T>(
        &self,
        namespace_id: &str,
        kind: ResourceKind,
        id: &str,
        body: &T,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let url = self.namespace_url(namespace_id, &[kind.collection(), id])?;
        let response = self
            .request(Method::POST, url.clone())
            .await?
            .json(body)
            .send()
            .await?;

        match response.status() {
            StatusCode::FOUND => {
                tracing::debug!("{} {} already exists", kind, id);
                self.get_json(url, kind, id).await
            }
            StatusCode::CONFLICT => Err(ClientError::conflict(kind, id)),
            _ => Ok(check(response, &format!("create {kind} {id}")).await?.json().await?),
        }
    }

    async fn delete(&self, namespace_id: &str, kind: ResourceKind, id: &str) -> Result<()> {
        let url = self.namespace_url(namespace_id, &[kind.collection(), id])?;
        self.send(Method::DELETE, url, kind, id).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl SdsClient for HttpSdsClient {
    async fn list_types(&self, namespace_id: &str, query: &str) -> Result<Vec<SdsType>> {
        self.list(namespace_id, ResourceKind::Type, query).await
    }

    async fn get_type(&self, namespace_id: &str, type_id: &str) -> Result<SdsType> {
        let url = self.namespace_url(namespace_id, &["Types", type_id])?;
        self.get_json(url, ResourceKind::Type, type_id).await
    }

    async fn get_or_create_type(&self, namespace_id: &str, sds_type: &SdsType) -> Result<SdsType> {
        self.get_or_create(namespace_id, ResourceKind::Type, &sds_type.id, sds_type)
            .await
    }

    async fn delete_type(&self, namespace_id: &str, type_id: &str) -> Result<()> {
        self.delete(namespace_id, ResourceKind::Type, type_id).await
    }

    async fn list_streams(&self, namespace_id: &str, query: &str) -> Result<Vec<SdsStream>> {
        self.list(namespace_id, ResourceKind::Stream, query).await
    }

    async fn get_or_create_stream(
        &self,
        namespace_id: &str,
        stream: &SdsStream,
    ) -> Result<SdsStream> {
        self.get_or_create(namespace_id, ResourceKind::Stream, &stream.id, stream)
            .await
    }

    async fn get_stream_type(&self, namespace_id: &str, stream_id: &str) -> Result<SdsType> {
        let url = self.namespace_url(namespace_id, &["Streams", stream_id, "Type"])?;
        self.get_json(url, ResourceKind::Stream, stream_id).await
    }

    async fn update_stream_type(
        &self,
        namespace_id: &str,
        stream_id: &str,
        stream_view_id: &str,
    ) -> Result<()> {
        let mut url = self.namespace_url(namespace_id, &["Streams", stream_id, "Type"])?;
        url.query_pairs_mut().append_pair("streamViewId", stream_view_id);

        let response = self
            .request(Method::PUT, url)
            .await?
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(ResourceKind::Stream, stream_id));
        }
        check(response, &format!("update type of stream {stream_id}")).await?;
        Ok(())
    }

    async fn delete_stream(&self, namespace_id: &str, stream_id: &str) -> Result<()> {
        self.delete(namespace_id, ResourceKind::Stream, stream_id).await
    }

    async fn list_stream_views(
        &self,
        namespace_id: &str,
        query: &str,
    ) -> Result<Vec<SdsStreamView>> {
        self.list(namespace_id, ResourceKind::StreamView, query).await
    }

    async fn get_or_create_stream_view(
        &self,
        namespace_id: &str,
        stream_view: &SdsStreamView,
    ) -> Result<SdsStreamView> {
        self.get_or_create(
            namespace_id,
            ResourceKind::StreamView,
            &stream_view.id,
            stream_view,
        )
        .await
    }

    async fn delete_stream_view(&self, namespace_id: &str, stream_view_id: &str) -> Result<()> {
        self.delete(namespace_id, ResourceKind::StreamView, stream_view_id)
            .await
    }
}
