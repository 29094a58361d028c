//! Blocking JSON-over-HTTP plumbing shared by both service clients.
//!
//! Each service gets its own [`RestClient`], built from a [`ServiceConfig`].
//! Status codes are checked here rather than by `ureq` so that the response
//! body of a failed call ends up in the error message.

use std::time::Duration;

use log::debug;
use serde_json::Value;
use url::Url;

use crate::error::PublishError;

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where a service lives and how to authenticate against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL; always ends with `/`.
    pub base_url: Url,
    /// Bearer token, sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    /// Global timeout for a single request.
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Parses a base URL, appending a trailing `/` if missing.
    pub fn new(base_url: &str) -> Result<Self, PublishError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_base_url(input: &str) -> Result<Url, PublishError> {
    let mut normalized = input.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized).map_err(|source| PublishError::InvalidUrl {
        input: input.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(PublishError::InvalidUrl {
            input: input.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }

    Ok(url)
}

/// A JSON client bound to one service base URL.
pub struct RestClient {
    agent: ureq::Agent,
    config: ServiceConfig,
}

impl RestClient {
    pub fn new(config: ServiceConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();
        let agent: ureq::Agent = agent_config.into();

        Self { agent, config }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn get(&self, url: Url) -> Result<Value, PublishError> {
        debug!("GET {url}");
        let response = self
            .authorize(self.agent.get(url.as_str()))
            .call()
            .map_err(|source| transport_error("GET", &url, source))?;
        read_json("GET", &url, response)
    }

    pub fn post(&self, url: Url, body: Option<&Value>) -> Result<Value, PublishError> {
        debug!("POST {url}");
        let request = self.authorize(self.agent.post(url.as_str()));
        let response = match body {
            Some(body) => request.send_json(body),
            None => request.send_empty(),
        }
        .map_err(|source| transport_error("POST", &url, source))?;
        read_json("POST", &url, response)
    }

    pub fn delete(&self, url: Url) -> Result<Value, PublishError> {
        debug!("DELETE {url}");
        let response = self
            .authorize(self.agent.delete(url.as_str()))
            .call()
            .map_err(|source| transport_error("DELETE", &url, source))?;
        read_json("DELETE", &url, response)
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match self.config.token.as_deref() {
            Some(token) => request.header("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }
}

/// Decodes a response body, mapping status codes >= 400 to errors.
///
/// An empty body decodes to `Value::Null`.
fn read_json(
    method: &'static str,
    url: &Url,
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<Value, PublishError> {
    let status = response.status().as_u16();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|source| transport_error(method, url, source))?;

    debug!("{method} {url} -> {status}");

    if status >= 400 {
        return Err(PublishError::Http {
            method,
            url: url.to_string(),
            status,
            body: text,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(PublishError::EntityParse)
}

fn transport_error(method: &'static str, url: &Url, source: ureq::Error) -> PublishError {
    PublishError::Transport {
        method,
        url: url.to_string(),
        source,
    }
}
