/// Invalid local configuration, detected before any request is sent (except
/// for the construction-time voice check, which needs the fetched catalog).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown region '{0}'. Expected one of: eu-west-1, us-east-1, us-west-2")]
    UnknownRegion(String),
    #[error("Unknown codec '{0}'. Expected one of: ogg, mp3, mp4")]
    UnknownCodec(String),
    #[error("Unknown speech rate '{0}'")]
    UnknownRate(String),
    #[error("Unknown volume '{0}'")]
    UnknownVolume(String),
    #[error("Unknown gender '{0}'. Expected Female or Male")]
    UnknownGender(String),
    #[error("{field} of {value} ms is out of range (0-{max} ms)")]
    BreakOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("Voice '{name}' ({language}) is not in the voice catalog")]
    UnknownVoice { name: String, language: String },
    #[error("Language filter '{0}' does not match any language in the voice catalog")]
    UnknownLanguageFilter(String),
    #[error("IVONA access key and secret key need to be available")]
    MissingCredentials,
    #[error("Value for header '{0}' contains characters HTTP does not allow")]
    InvalidHeaderValue(&'static str),
    #[error("Invalid endpoint URL '{0}'")]
    InvalidEndpoint(String),
    #[error("Invalid client config: {0}")]
    InvalidConfigFile(String),
}

#[derive(thiserror::Error, Debug)]
pub enum IvonaError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("Authentication failed ({error_type}): {}", .message.as_deref().unwrap_or("no details"))]
    Authentication {
        error_type: String,
        message: Option<String>,
    },
    #[error("Remote service error (HTTP {status}): {payload}")]
    RemoteService {
        status: u16,
        error_type: Option<String>,
        payload: String,
    },
    #[error("Request signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IvonaError {
    /// The configuration error behind this error, if it is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Configuration(e) => Some(e),
            _ => None,
        }
    }
}
