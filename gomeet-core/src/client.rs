//! HTTP client for the meeting backend.
//!
//! [`Client`] turns typed [`Endpoint`] requests into [`Request`]s and hands
//! them to a [`Transport`]. The production transport is reqwest; tests swap
//! in a scripted one.

use std::future::Future;

use tracing::debug;
use url::Url;

use crate::error::{GoMeetError, GoMeetResult};
use crate::protocol::{Endpoint, ErrorResponse, Method};

/// A request ready to go on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub form: Vec<(&'static str, String)>,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .chain(self.form.iter())
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What came back, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    fn send(&self, request: Request) -> impl Future<Output = GoMeetResult<RawResponse>> + Send;
}

/// Transport backed by reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    cookie: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str, cookie: Option<String>) -> GoMeetResult<Self> {
        // Joining onto a base without a trailing slash drops its last segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| GoMeetError::Config(format!("Invalid backend URL '{base_url}': {e}")))?;

        Ok(HttpTransport {
            http: reqwest::Client::new(),
            base_url,
            cookie,
        })
    }

    fn url_for(&self, request: &Request) -> GoMeetResult<Url> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| GoMeetError::Config(e.to_string()))?;

        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> GoMeetResult<RawResponse> {
        let url = self.url_for(&request)?;
        debug!(method = ?request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => {
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(request.form.iter().map(|(k, v)| (*k, v.as_str())))
                    .finish();
                self.http
                    .post(url)
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(body)
            }
        };

        if let Some(cookie) = &self.cookie {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = resp.text().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

/// Typed access to the backend resources.
pub struct Client<T> {
    transport: T,
    base_url: String,
}

impl Client<HttpTransport> {
    pub fn connect(base_url: &str, cookie: Option<String>) -> GoMeetResult<Self> {
        Ok(Client::new(HttpTransport::new(base_url, cookie)?, base_url))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Client {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call a typed endpoint and decode its response.
    ///
    /// Non-2xx answers and 2xx answers carrying an in-band
    /// `{status, message}` with a status other than 200 both become
    /// [`GoMeetError::Remote`].
    pub async fn call<E: Endpoint>(&self, endpoint: E) -> GoMeetResult<E::Response> {
        let request = Request {
            method: E::METHOD,
            path: E::PATH,
            query: endpoint.query(),
            form: endpoint.form(),
        };

        let raw = self.transport.send(request).await?;
        check_status(&raw)?;
        E::decode(&raw.body)
    }
}

fn check_status(raw: &RawResponse) -> GoMeetResult<()> {
    let in_band = serde_json::from_str::<serde_json::Value>(&raw.body)
        .ok()
        .filter(|v| v.get("status").is_some())
        .and_then(|v| serde_json::from_value::<ErrorResponse>(v).ok());

    if !raw.is_success() {
        return Err(match in_band {
            Some(err) => GoMeetError::Remote {
                status: err.status,
                message: err.message,
            },
            None => GoMeetError::Remote {
                status: raw.status,
                message: raw.reason.clone(),
            },
        });
    }

    match in_band {
        Some(err) if err.status != 200 => Err(GoMeetError::Remote {
            status: err.status,
            message: err.message,
        }),
        _ => Ok(()),
    }
}
