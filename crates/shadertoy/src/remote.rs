use reqwest::blocking::Client;
use reqwest::header::REFERER;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::descriptor::{ShaderDescriptor, ShaderPayload};
use crate::error::FetchError;

/// Public key the site hands out for read-only API access.
pub const DEFAULT_API_KEY: &str = "NdnKw7";

#[derive(Debug, Clone)]
pub struct ShadertoyConfig {
    pub api_key: String,
    pub api_base: Url,
    pub fallback_url: Url,
    pub referer: String,
    pub media_base: Url,
}

impl ShadertoyConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FetchError::InvalidConfig(
                "Shadertoy API key must not be empty".into(),
            ));
        }
        Ok(Self {
            api_key,
            api_base: parse_url("https://www.shadertoy.com/api/v1/")?,
            fallback_url: parse_url("https://www.shadertoy.com/shadertoy")?,
            referer: "https://www.shadertoy.com/".to_string(),
            media_base: parse_url("https://www.shadertoy.com/")?,
        })
    }
}

fn parse_url(value: &str) -> Result<Url, FetchError> {
    Url::parse(value).map_err(|err| FetchError::InvalidConfig(format!("{value}: {err}")))
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two request shapes the fetcher needs.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<HttpResponse, FetchError>;

    fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        referer: &str,
    ) -> Result<HttpResponse, FetchError>;
}

/// Blocking reqwest transport used by the binary.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("toyrender/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FetchError::InvalidConfig(err.to_string()))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|err| FetchError::network(redact(url), err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| FetchError::network(redact(url), err))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        referer: &str,
    ) -> Result<HttpResponse, FetchError> {
        let response = self
            .http
            .post(url.clone())
            .header(REFERER, referer)
            .form(form)
            .send()
            .map_err(|err| FetchError::network(url, err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| FetchError::network(url, err))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Result of asking one endpoint for a shader.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(ShaderDescriptor),
    Missing { reason: String },
}

#[derive(Debug)]
pub struct ShadertoyClient<T = HttpTransport> {
    transport: T,
    config: ShadertoyConfig,
}

impl ShadertoyClient<HttpTransport> {
    pub fn new(config: ShadertoyConfig) -> Result<Self, FetchError> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> ShadertoyClient<T> {
    pub fn with_transport(config: ShadertoyConfig, transport: T) -> Self {
        Self { transport, config }
    }

    /// Looks the shader up on the API, then once on the fallback endpoint if
    /// the API answer carries no shader.
    pub fn fetch(&self, shader_id: &str) -> Result<ShaderDescriptor, FetchError> {
        let shader_id = shader_id.trim();
        if shader_id.is_empty() {
            return Err(FetchError::NotFound {
                id: shader_id.to_string(),
            });
        }

        match self.lookup_primary(shader_id)? {
            LookupOutcome::Found(descriptor) => return Ok(descriptor),
            LookupOutcome::Missing { reason } => {
                warn!(shader = shader_id, %reason, "API lookup missed; trying fallback endpoint");
            }
        }

        match self.lookup_fallback(shader_id)? {
            LookupOutcome::Found(descriptor) => Ok(descriptor),
            LookupOutcome::Missing { reason } => {
                debug!(shader = shader_id, %reason, "fallback lookup missed");
                Err(FetchError::NotFound {
                    id: shader_id.to_string(),
                })
            }
        }
    }

    /// Downloads the raw bytes behind a channel `src` path.
    pub fn fetch_media(&self, src: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.media_url(src)?;
        info!(%url, "fetching channel media");
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            return Err(FetchError::network(
                &url,
                format!("HTTP status {}", response.status),
            ));
        }
        Ok(response.body)
    }

    pub fn media_url(&self, src: &str) -> Result<Url, FetchError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(FetchError::parse("channel input has no media path"));
        }
        let resolved = if src.starts_with("http://") || src.starts_with("https://") {
            Url::parse(src)
        } else if src.starts_with("//") {
            Url::parse(&format!("https:{src}"))
        } else {
            self.config.media_base.join(src.trim_start_matches('/'))
        };
        resolved.map_err(|err| FetchError::parse(format!("invalid media path '{src}': {err}")))
    }

    pub fn shader_url(&self, shader_id: &str) -> Result<Url, FetchError> {
        let mut url = self.config.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidConfig("API base url cannot be a base".into()))?
            .pop_if_empty()
            .push("shaders")
            .push(shader_id);
        url.query_pairs_mut()
            .clear()
            .append_pair("key", &self.config.api_key);
        Ok(url)
    }

    fn lookup_primary(&self, shader_id: &str) -> Result<LookupOutcome, FetchError> {
        let url = self.shader_url(shader_id)?;
        debug!(url = %redact(&url), "requesting shader from API");
        let response = self.transport.get(&url)?;
        if response.status == 404 {
            return Ok(LookupOutcome::Missing {
                reason: "API returned 404".into(),
            });
        }
        if !response.is_success() {
            return Err(FetchError::network(
                redact(&url),
                format!("HTTP status {}", response.status),
            ));
        }
        parse_primary(&response.body)
    }

    fn lookup_fallback(&self, shader_id: &str) -> Result<LookupOutcome, FetchError> {
        let url = &self.config.fallback_url;
        let payload = serde_json::json!({ "shaders": [shader_id] }).to_string();
        debug!(%url, %payload, "requesting shader from fallback endpoint");
        let response = self
            .transport
            .post_form(url, &[("s", payload.as_str())], &self.config.referer)?;
        if !response.is_success() {
            return Err(FetchError::network(
                url,
                format!("HTTP status {}", response.status),
            ));
        }
        parse_fallback(&response.body)
    }
}

/// Parses the API shape: `{ "Shader": { ... } }`, or an object without the
/// field (usually `{ "Error": "..." }`) when the lookup missed.
pub fn parse_primary(body: &[u8]) -> Result<LookupOutcome, FetchError> {
    let mut value: Value = serde_json::from_slice(body)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| FetchError::parse(format!("expected a JSON object, got {}", snippet(body))))?;

    match object.remove("Shader") {
        Some(shader) => {
            let payload: ShaderPayload = serde_json::from_value(shader)?;
            Ok(LookupOutcome::Found(payload.into_descriptor()?))
        }
        None => {
            let reason = object
                .get("Error")
                .or_else(|| object.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| "response has no 'Shader' field".to_string());
            Ok(LookupOutcome::Missing { reason })
        }
    }
}

/// Parses the fallback shape: a JSON array whose first element is the shader.
pub fn parse_fallback(body: &[u8]) -> Result<LookupOutcome, FetchError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Array(mut shaders) = value else {
        return Err(FetchError::parse(format!(
            "expected a JSON array, got {}",
            snippet(body)
        )));
    };
    if shaders.is_empty() {
        return Ok(LookupOutcome::Missing {
            reason: "fallback endpoint returned no shaders".into(),
        });
    }
    let payload: ShaderPayload = serde_json::from_value(shaders.swap_remove(0))?;
    Ok(LookupOutcome::Found(payload.into_descriptor()?))
}

fn snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(200).collect()
}

fn redact(url: &Url) -> Url {
    let mut redacted = url.clone();
    if redacted.query().is_some() {
        redacted.set_query(Some("key=***"));
    }
    redacted
}
