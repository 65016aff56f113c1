use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Response, Url};

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Applies to each hop of a redirect chain.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Sent as the `Accept` header.
    pub accept: String,
    pub allowed_content_types: Vec<String>,
    /// Sent with every request, e.g. the session cookie of a signed-in user.
    pub headers: Vec<(String, String)>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            accept: "text/html".to_string(),
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            headers: Vec::new(),
        }
    }
}

impl FetchSettings {
    /// Settings for the chart JSON endpoints.
    pub fn json() -> Self {
        Self {
            accept: "application/json".to_string(),
            allowed_content_types: vec!["application/json".to_string()],
            ..Self::default()
        }
    }
}

/// GET collaborator. Injected into controllers so tests can stand in for the
/// server.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// One pooled HTTP client per fetcher. Redirects are followed here rather
/// than by reqwest so each request counts its own hops.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(redirect::Policy::none())
            .default_headers(default_headers(&settings)?)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Sends the GET and follows redirects up to the limit.
    async fn send(&self, url: Url) -> Result<(Response, usize), FetchError> {
        let mut current = url;
        let mut redirects = 0;
        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(map_reqwest_error)?;
            let Some(next) = redirect_target(&response) else {
                return Ok((response, redirects));
            };
            if redirects >= self.settings.redirect_limit {
                return Err(FetchError::new(
                    FailureKind::RedirectLimitExceeded,
                    format!("more than {} redirects", self.settings.redirect_limit),
                ));
            }
            redirects += 1;
            current = next;
        }
    }

    fn check_content_type(&self, content_type: Option<&str>) -> Result<(), FetchError> {
        let Some(content_type) = content_type else {
            return Ok(());
        };
        let essence = content_type.split(';').next().unwrap_or(content_type).trim();
        if self
            .settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
        {
            return Ok(());
        }
        Err(FetchError::new(
            FailureKind::UnsupportedContentType {
                content_type: content_type.to_string(),
            },
            "unsupported content type",
        ))
    }

    /// Streams the body, failing as soon as it passes `max_bytes`.
    async fn read_body(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(declared) = response.content_length().filter(|len| *len > max_bytes) {
            return Err(too_large(max_bytes, declared));
        }
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = (bytes.len() + chunk.len()) as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let parsed =
            Url::parse(url).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let (response, redirect_count) = self.send(parsed).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.check_content_type(content_type.as_deref())?;

        let bytes = self.read_body(response).await?;
        Ok(FetchOutput {
            metadata: FetchMetadata {
                url: url.to_string(),
                final_url,
                redirect_count,
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn default_headers(settings: &FetchSettings) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let accept = HeaderValue::from_str(&settings.accept)
        .map_err(|_| invalid_header(ACCEPT.as_str()))?;
    headers.insert(ACCEPT, accept);
    for (name, value) in &settings.headers {
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid_header(name))?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid_header(name))?;
        headers.insert(header, value);
    }
    Ok(headers)
}

/// Where a 3xx response points, resolved against the URL that produced it.
fn redirect_target(response: &Response) -> Option<Url> {
    if !response.status().is_redirection() {
        return None;
    }
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok()
}

fn invalid_header(name: &str) -> FetchError {
    FetchError::new(
        FailureKind::InvalidHeader {
            name: name.to_string(),
        },
        "header name or value is not valid",
    )
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
