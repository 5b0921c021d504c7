//! `HttpSdsClient` against a local fake tenant
//!
//! The fake speaks just enough HTTP/1.1 to answer the identity discovery,
//! token and namespace requests, and records every request it sees.

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sds_client::http::PAGE_SIZE;
use sds_client::{
    ClientError, ConnectionSettings, Credentials, HttpSdsClient, ResourceKind, SdsClient,
    SdsStream, SdsType, SdsTypeCode,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const DISCOVERY_PATH: &str = "/identity/.well-known/openid-configuration";
const TOKEN_PATH: &str = "/identity/connect/token";
const NAMESPACE_PATH: &str = "/api/v1/Tenants/tenant/Namespaces/default";

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    target: String,
    authorization: Option<String>,
}

impl Recorded {
    fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn read_request(socket: &mut TcpStream) -> std::io::Result<Option<Recorded>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    // drain the body so the connection can be reused
    let mut body_len = buf.len() - header_end;
    while body_len < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body_len += n;
    }

    Ok(Some(Recorded {
        method,
        target,
        authorization,
    }))
}

/// Start a fake tenant; `handler` maps a request and the base URL to a
/// status and JSON body
async fn serve<F>(handler: F) -> (String, Log)
where
    F: Fn(&Recorded, &str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let log: Log = Arc::default();
    let handler = Arc::new(handler);

    let (server_base, server_log) = (base.clone(), Arc::clone(&log));
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let base = server_base.clone();
            let log = Arc::clone(&server_log);
            tokio::spawn(async move {
                while let Ok(Some(request)) = read_request(&mut socket).await {
                    let (status, body) = handler(&request, &base);
                    log.lock().push(request);
                    let response = format!(
                        "HTTP/1.1 {status} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                        body.len()
                    );
                    if socket.write_all(response.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (base, log)
}

/// Answer the identity requests, tokens living `expires_in` seconds
fn identity(request: &Recorded, base: &str, expires_in: u64) -> Option<(u16, String)> {
    match request.path() {
        DISCOVERY_PATH => Some((
            200,
            json!({ "token_endpoint": format!("{base}{TOKEN_PATH}") }).to_string(),
        )),
        TOKEN_PATH => Some((
            200,
            json!({ "access_token": "token-1", "expires_in": expires_in }).to_string(),
        )),
        _ => None,
    }
}

fn client(base: &str) -> HttpSdsClient {
    HttpSdsClient::new(ConnectionSettings {
        resource: base.to_string(),
        api_version: "v1".to_string(),
        tenant_id: "tenant".to_string(),
        credentials: Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        },
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn requests_to(log: &Log, path: &str) -> Vec<Recorded> {
    log.lock()
        .iter()
        .filter(|r| r.path() == path)
        .cloned()
        .collect()
}

fn types_page(start: usize, len: usize) -> String {
    let page: Vec<SdsType> = (start..start + len)
        .map(|i| SdsType::new(format!("TimeIndexed.T{i}"), SdsTypeCode::Object))
        .collect();
    serde_json::to_string(&page).unwrap()
}

#[tokio::test]
async fn list_pages_until_a_short_page() {
    let (base, log) = serve(|request, base| {
        identity(request, base, 3600).unwrap_or_else(|| {
            if request.target.contains(&format!("skip={PAGE_SIZE}")) {
                (200, types_page(PAGE_SIZE, 3))
            } else {
                (200, types_page(0, PAGE_SIZE))
            }
        })
    })
    .await;

    let types = client(&base).list_types("default", "TimeIndexed.*").await.unwrap();

    assert_eq!(types.len(), PAGE_SIZE + 3);
    assert_eq!(types[PAGE_SIZE].id, format!("TimeIndexed.T{PAGE_SIZE}"));

    let pages = requests_to(&log, &format!("{NAMESPACE_PATH}/Types"));
    assert_eq!(pages.len(), 2);
    assert!(pages[0].target.contains("skip=0&count=100"), "{}", pages[0].target);
    assert!(pages[1].target.contains("skip=100&count=100"), "{}", pages[1].target);
}

#[tokio::test]
async fn found_on_create_is_resolved_with_a_get() {
    let (base, log) = serve(|request, base| {
        identity(request, base, 3600).unwrap_or_else(|| match request.method.as_str() {
            "POST" => (302, String::new()),
            _ => (
                200,
                serde_json::to_string(&SdsStream::new("s1", "TimeIndexed.Double")).unwrap(),
            ),
        })
    })
    .await;

    let stream = client(&base)
        .get_or_create_stream("default", &SdsStream::new("s1", "TimeIndexed.Double"))
        .await
        .unwrap();

    assert_eq!(stream.type_id, "TimeIndexed.Double");
    let methods: Vec<String> = requests_to(&log, &format!("{NAMESPACE_PATH}/Streams/s1"))
        .into_iter()
        .map(|r| r.method)
        .collect();
    assert_eq!(methods, ["POST", "GET"]);
}

#[tokio::test]
async fn conflict_on_create_is_reported() {
    let (base, _log) = serve(|request, base| {
        identity(request, base, 3600).unwrap_or_else(|| (409, String::new()))
    })
    .await;

    let err = client(&base)
        .get_or_create_type("default", &SdsType::new("TimeIndexed.Double", SdsTypeCode::Object))
        .await
        .unwrap_err();

    assert!(
        matches!(
            &err,
            ClientError::Conflict { kind: ResourceKind::Type, id } if id == "TimeIndexed.Double"
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn missing_resource_is_not_found() {
    let (base, _log) = serve(|request, base| {
        identity(request, base, 3600).unwrap_or_else(|| (404, String::new()))
    })
    .await;

    let err = client(&base)
        .get_stream_type("default", "missing")
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "{err:?}");
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let (base, _log) = serve(|request, base| {
        identity(request, base, 3600)
            .unwrap_or_else(|| (400, r#"{"Reason":"bad view"}"#.to_string()))
    })
    .await;

    let err = client(&base)
        .update_stream_type("default", "s1", "view")
        .await
        .unwrap_err();

    match err {
        ClientError::Status {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert!(message.contains("bad view"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn token_is_cached_between_requests() {
    let (base, log) = serve(|request, base| {
        identity(request, base, 3600).unwrap_or_else(|| (200, "[]".to_string()))
    })
    .await;
    let client = client(&base);

    client.list_streams("default", "").await.unwrap();
    client.list_streams("default", "").await.unwrap();

    assert_eq!(requests_to(&log, DISCOVERY_PATH).len(), 1);
    assert_eq!(requests_to(&log, TOKEN_PATH).len(), 1);

    let streams = requests_to(&log, &format!("{NAMESPACE_PATH}/Streams"));
    assert_eq!(streams.len(), 2);
    assert!(streams
        .iter()
        .all(|r| r.authorization.as_deref() == Some("Bearer token-1")));
}

#[tokio::test]
async fn token_inside_expiry_margin_is_refreshed() {
    // 30s of life is already inside the refresh margin
    let (base, log) = serve(|request, base| {
        identity(request, base, 30).unwrap_or_else(|| (200, "[]".to_string()))
    })
    .await;
    let client = client(&base);

    client.list_streams("default", "").await.unwrap();
    client.list_streams("default", "").await.unwrap();

    assert_eq!(requests_to(&log, DISCOVERY_PATH).len(), 1);
    assert_eq!(requests_to(&log, TOKEN_PATH).len(), 2);
}
