use std::fmt;
use std::io::Write;

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};

use crate::SpeechSynthesizer;

use super::config::{ClientConfig, ClientOptions};
use super::credentials::{CredentialSource, Credentials};
use super::error::{ConfigError, IvonaError};
use super::signer::{Aws4Signer, RequestSigner};
use super::speech::{CreateSpeechRequest, VoiceSelection};
use super::voices::{ListVoicesRequest, ListVoicesResponse, VoiceCatalog, VoiceDescriptor, VoiceFilter};

const LIST_VOICES: &str = "ListVoices";
const CREATE_SPEECH: &str = "CreateSpeech";

/// Response header that marks a failed call, whatever the status code.
pub const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Error types the service uses for rejected credentials or signatures.
const AUTH_ERROR_TYPES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidSignatureException",
    "IncompleteSignatureException",
    "MissingAuthenticationTokenException",
    "AccessDeniedException",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
];

/// Blocking client for the IVONA Speech Cloud.
///
/// Construction fetches the region's voice catalog once and checks the
/// configured default voice against it. The cached catalog only changes
/// through [`IvonaClient::refresh_catalog`].
///
/// A client is meant for one thread at a time; use one client per thread or
/// serialize access.
pub struct IvonaClient {
    config: ClientConfig,
    credentials: Credentials,
    signer: Box<dyn RequestSigner>,
    http: Client,
    endpoint: Option<Url>,
    max_retries: u32,
    catalog: VoiceCatalog,
}

impl fmt::Debug for IvonaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IvonaClient")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .field("catalog", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl IvonaClient {
    pub fn new(
        credentials: impl CredentialSource,
        config: ClientConfig,
    ) -> Result<Self, IvonaError> {
        Self::with_options(credentials, config, ClientOptions::default())
    }

    pub fn with_options(
        credentials: impl CredentialSource,
        config: ClientConfig,
        options: ClientOptions,
    ) -> Result<Self, IvonaError> {
        Self::with_signer(credentials, config, options, Aws4Signer)
    }

    /// Build a client that signs requests with `signer`.
    ///
    /// Fails without sending anything when no complete key pair is available
    /// or the endpoint override is not a usable URL.
    pub fn with_signer(
        credentials: impl CredentialSource,
        config: ClientConfig,
        options: ClientOptions,
        signer: impl RequestSigner + 'static,
    ) -> Result<Self, IvonaError> {
        let credentials = credentials
            .credentials()
            .filter(|c| !c.is_incomplete())
            .ok_or(ConfigError::MissingCredentials)?;

        let endpoint = options
            .endpoint
            .as_deref()
            .map(parse_base_url)
            .transpose()?;

        let mut builder = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout);
        if let Some(connect_timeout) = options.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http = builder.build()?;

        let mut client = Self {
            config,
            credentials,
            signer: Box::new(signer),
            http,
            endpoint,
            max_retries: options.max_retries,
            catalog: VoiceCatalog::default(),
        };

        client.catalog = VoiceCatalog::new(client.request_voices(&VoiceFilter::default())?);
        log::info!(
            "Loaded {} voices for region {}",
            client.catalog.len(),
            client.config.region()
        );

        let config = &client.config;
        client.ensure_voice(config.voice_name(), config.language())?;
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Settings used by the next request. Changing the region does not
    /// refresh the catalog; call [`IvonaClient::refresh_catalog`] for that.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// The catalog cached at construction (or at the last refresh).
    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    /// Exact, case-sensitive lookup in the cached catalog. Never touches the network.
    pub fn voice_exists(&self, name: &str, language: &str) -> bool {
        self.catalog.contains(name, language)
    }

    /// Change the default voice pair, provided the catalog lists it.
    pub fn set_default_voice(&mut self, name: &str, language: &str) -> Result<(), IvonaError> {
        self.ensure_voice(name, language)?;
        self.config.set_voice(name, language);
        Ok(())
    }

    /// Query the service's voice list.
    ///
    /// Every call is a fresh request and its result is not cached. A language
    /// filter must name a language present in the cached catalog.
    pub fn fetch_voices(&self, filter: &VoiceFilter) -> Result<Vec<VoiceDescriptor>, IvonaError> {
        if let Some(language) = &filter.language {
            if !self.catalog.has_language(language) {
                return Err(ConfigError::UnknownLanguageFilter(language.clone()).into());
            }
        }
        self.request_voices(filter)
    }

    /// Re-fetch the full catalog and replace the cached copy.
    pub fn refresh_catalog(&mut self) -> Result<&VoiceCatalog, IvonaError> {
        let voices = self.request_voices(&VoiceFilter::default())?;
        self.catalog = VoiceCatalog::new(voices);
        log::info!(
            "Refreshed catalog: {} voices for region {}",
            self.catalog.len(),
            self.config.region()
        );
        Ok(&self.catalog)
    }

    /// Synthesize `text` and stream the audio into `sink`.
    ///
    /// The voice pair is resolved from `voice` and the defaults, then checked
    /// against the cached catalog before any request is made. Returns the
    /// number of bytes written. On error `sink` may hold a partial payload.
    pub fn synthesize<W: Write + ?Sized>(
        &self,
        text: &str,
        sink: &mut W,
        voice: &VoiceSelection,
    ) -> Result<u64, IvonaError> {
        let (name, language) = voice.resolve(&self.config);
        self.ensure_voice(name, language)?;

        let body = serde_json::to_vec(&CreateSpeechRequest::new(
            text,
            &self.config,
            name,
            language,
        ))?;
        let mut response = self.send(Method::POST, CREATE_SPEECH, Some(body))?;

        let written = std::io::copy(&mut response, sink).map_err(body_error)?;
        sink.flush()?;
        log::debug!(
            "Wrote {written} bytes of {} audio for voice {name} ({language})",
            self.config.codec()
        );
        Ok(written)
    }

    fn ensure_voice(&self, name: &str, language: &str) -> Result<(), IvonaError> {
        if !self.voice_exists(name, language) {
            return Err(ConfigError::UnknownVoice {
                name: name.to_string(),
                language: language.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn request_voices(&self, filter: &VoiceFilter) -> Result<Vec<VoiceDescriptor>, IvonaError> {
        let response = if filter.is_empty() {
            self.send(Method::GET, LIST_VOICES, None)?
        } else {
            let body = serde_json::to_vec(&ListVoicesRequest::from(filter))?;
            self.send(Method::POST, LIST_VOICES, Some(body))?
        };
        let bytes = response.bytes()?;
        let parsed: ListVoicesResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.voices)
    }

    fn url_for(&self, action: &str) -> Result<Url, IvonaError> {
        let base = match &self.endpoint {
            Some(url) => url.clone(),
            None => parse_base_url(self.config.region().endpoint())?,
        };
        base.join(action)
            .map_err(|_| ConfigError::InvalidEndpoint(base.to_string()).into())
    }

    /// One signed round trip, retried only on connection failures.
    fn send(&self, method: Method, action: &str, body: Option<Vec<u8>>) -> Result<Response, IvonaError> {
        let url = self.url_for(action)?;
        let mut attempt = 0;
        loop {
            let mut builder = self.http.request(method.clone(), url.clone());
            if let Some(body) = &body {
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }
            let mut request = builder.build()?;
            self.signer
                .sign(&mut request, &self.credentials, self.config.region())?;

            log::debug!(
                "{method} {url} ({} byte body)",
                body.as_ref().map_or(0, Vec::len)
            );
            match self.http.execute(request) {
                Ok(response) => return check_response(response),
                Err(e) if e.is_connect() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!("Connection to {url} failed ({e}), retry {attempt}/{}", self.max_retries);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl SpeechSynthesizer for IvonaClient {
    type Voice = VoiceDescriptor;
    type VoiceParams = VoiceSelection;
    type Error = IvonaError;

    fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, IvonaError> {
        self.fetch_voices(&VoiceFilter::default())
    }

    fn synthesize_into(
        &self,
        text: &str,
        sink: &mut dyn Write,
        params: Option<VoiceSelection>,
    ) -> Result<u64, IvonaError> {
        self.synthesize(text, sink, &params.unwrap_or_default())
    }
}

/// Parse a base URL so that joining an action name appends to its path.
fn parse_base_url(raw: &str) -> Result<Url, IvonaError> {
    let mut url = Url::parse(raw).map_err(|_| ConfigError::InvalidEndpoint(raw.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::InvalidEndpoint(raw.to_string()).into());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Split a failed body copy into transport failures (reading the response)
/// and sink failures (writing the audio).
fn body_error(e: std::io::Error) -> IvonaError {
    if !e.get_ref().is_some_and(|inner| inner.is::<reqwest::Error>()) {
        return e.into();
    }
    match e.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(transport)) => IvonaError::Transport(*transport),
        Some(Err(inner)) => std::io::Error::other(inner).into(),
        None => std::io::Error::other("response body read failed").into(),
    }
}

/// Map a response carrying an error-type header or a non-2xx status to an error.
fn check_response(response: Response) -> Result<Response, IvonaError> {
    let status = response.status();
    let error_type = response
        .headers()
        .get(ERROR_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(':').next().unwrap_or(v).trim().to_string());

    if error_type.is_none() && status.is_success() {
        log::debug!("{} {}", status.as_u16(), response.url());
        return Ok(response);
    }

    let payload = response.text()?;
    log::warn!(
        "Request failed with HTTP {} ({})",
        status.as_u16(),
        error_type.as_deref().unwrap_or("no error type")
    );

    match error_type {
        Some(kind) if AUTH_ERROR_TYPES.contains(&kind.as_str()) => Err(IvonaError::Authentication {
            error_type: kind,
            message: error_message(&payload),
        }),
        error_type => Err(IvonaError::RemoteService {
            status: status.as_u16(),
            error_type,
            payload,
        }),
    }
}

/// The `message` field of a JSON error body, or the raw body when it has none.
fn error_message(payload: &str) -> Option<String> {
    let from_json = serde_json::from_str::<serde_json::Value>(payload)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("Message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
    from_json.or_else(|| {
        let trimmed = payload.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
