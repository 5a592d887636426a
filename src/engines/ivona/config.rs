use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, IvonaError};

/// Longest accepted pause between sentences.
pub const MAX_SENTENCE_BREAK_MS: u32 = 3000;
/// Longest accepted pause between paragraphs.
pub const MAX_PARAGRAPH_BREAK_MS: u32 = 5000;

pub const DEFAULT_VOICE_NAME: &str = "Salli";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_SENTENCE_BREAK_MS: u32 = 400;
pub const DEFAULT_PARAGRAPH_BREAK_MS: u32 = 650;

/// IVONA Speech Cloud datacenter region.
///
/// Each region has its own endpoint and its own voice catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// EU (Ireland)
    #[default]
    EuWest1,
    /// US East (N. Virginia)
    UsEast1,
    /// US West (Oregon)
    UsWest2,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::EuWest1, Region::UsEast1, Region::UsWest2];

    /// Region identifier, also used as the signing scope region.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EuWest1 => "eu-west-1",
            Self::UsEast1 => "us-east-1",
            Self::UsWest2 => "us-west-2",
        }
    }

    /// Base URL of the service in this region.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::EuWest1 => "https://tts.eu-west-1.ivonacloud.com",
            Self::UsEast1 => "https://tts.us-east-1.ivonacloud.com",
            Self::UsWest2 => "https://tts.us-west-2.ivonacloud.com",
        }
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRegion(s.to_string()))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio encoding of the synthesized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Codec {
    Ogg,
    #[default]
    Mp3,
    Mp4,
}

impl Codec {
    /// Canonical (lowercase) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }

    /// Name as the CreateSpeech endpoint expects it.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Ogg => "OGG",
            Self::Mp3 => "MP3",
            Self::Mp4 => "MP4",
        }
    }

    /// File extension for saved audio.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for Codec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ogg" => Ok(Self::Ogg),
            "mp3" => Ok(Self::Mp3),
            "mp4" => Ok(Self::Mp4),
            _ => Err(ConfigError::UnknownCodec(s.to_string())),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaking rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rate {
    XSlow,
    Slow,
    Medium,
    Fast,
    XFast,
    #[default]
    Default,
}

impl Rate {
    pub const ALL: [Rate; 6] = [
        Rate::XSlow,
        Rate::Slow,
        Rate::Medium,
        Rate::Fast,
        Rate::XFast,
        Rate::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XSlow => "x-slow",
            Self::Slow => "slow",
            Self::Medium => "medium",
            Self::Fast => "fast",
            Self::XFast => "x-fast",
            Self::Default => "default",
        }
    }
}

impl FromStr for Rate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownRate(s.to_string()))
    }
}

/// Output volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Volume {
    Silent,
    XSoft,
    Soft,
    Medium,
    Loud,
    XLoud,
    #[default]
    Default,
}

impl Volume {
    pub const ALL: [Volume; 7] = [
        Volume::Silent,
        Volume::XSoft,
        Volume::Soft,
        Volume::Medium,
        Volume::Loud,
        Volume::XLoud,
        Volume::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::XSoft => "x-soft",
            Self::Soft => "soft",
            Self::Medium => "medium",
            Self::Loud => "loud",
            Self::XLoud => "x-loud",
            Self::Default => "default",
        }
    }
}

impl FromStr for Volume {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownVolume(s.to_string()))
    }
}

/// Service-facing settings of a client.
///
/// Every field has its own setter, and every setter validates its input, so a
/// `ClientConfig` never holds an out-of-range value. The default voice pair is
/// not checked here; the client checks it against the voice catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct ClientConfig {
    region: Region,
    codec: Codec,
    voice_name: String,
    language: String,
    rate: Rate,
    volume: Volume,
    sentence_break: u32,
    paragraph_break: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: Region::default(),
            codec: Codec::default(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            rate: Rate::default(),
            volume: Volume::default(),
            sentence_break: DEFAULT_SENTENCE_BREAK_MS,
            paragraph_break: DEFAULT_PARAGRAPH_BREAK_MS,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config document. Missing fields keep their defaults.
    ///
    /// ```
    /// use ivona_rs::engines::ivona::{ClientConfig, Codec};
    ///
    /// let config = ClientConfig::from_json_str(r#"{"region": "us-east-1", "codec": "OGG"}"#)?;
    /// assert_eq!(config.codec(), Codec::Ogg);
    /// # Ok::<(), ivona_rs::engines::ivona::IvonaError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, IvonaError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidConfigFile(e.to_string()).into())
    }

    pub fn from_json_file(path: &Path) -> Result<Self, IvonaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn voice_name(&self) -> &str {
        &self.voice_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Pause between sentences, in milliseconds.
    pub fn sentence_break(&self) -> u32 {
        self.sentence_break
    }

    /// Pause between paragraphs, in milliseconds.
    pub fn paragraph_break(&self) -> u32 {
        self.paragraph_break
    }

    pub fn set_region(&mut self, region: &str) -> Result<(), ConfigError> {
        self.region = region.parse()?;
        Ok(())
    }

    /// Set the codec. Any letter case is accepted; the stored value is canonical.
    pub fn set_codec(&mut self, codec: &str) -> Result<(), ConfigError> {
        self.codec = codec.parse()?;
        Ok(())
    }

    pub fn set_rate(&mut self, rate: &str) -> Result<(), ConfigError> {
        self.rate = rate.parse()?;
        Ok(())
    }

    pub fn set_volume(&mut self, volume: &str) -> Result<(), ConfigError> {
        self.volume = volume.parse()?;
        Ok(())
    }

    pub fn set_sentence_break(&mut self, ms: u32) -> Result<(), ConfigError> {
        self.sentence_break = check_break("sentence break", ms, MAX_SENTENCE_BREAK_MS)?;
        Ok(())
    }

    pub fn set_paragraph_break(&mut self, ms: u32) -> Result<(), ConfigError> {
        self.paragraph_break = check_break("paragraph break", ms, MAX_PARAGRAPH_BREAK_MS)?;
        Ok(())
    }

    /// Set the default voice pair. Checked against the catalog on use.
    pub fn set_voice(&mut self, name: impl Into<String>, language: impl Into<String>) {
        self.voice_name = name.into();
        self.language = language.into();
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_rate(mut self, rate: Rate) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_voice(mut self, name: impl Into<String>, language: impl Into<String>) -> Self {
        self.set_voice(name, language);
        self
    }
}

fn check_break(field: &'static str, value: u32, max: u32) -> Result<u32, ConfigError> {
    if value > max {
        return Err(ConfigError::BreakOutOfRange { field, value, max });
    }
    Ok(value)
}

/// On-disk shape of [`ClientConfig`]; every value goes through the setters.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    region: Option<String>,
    codec: Option<String>,
    voice_name: Option<String>,
    language: Option<String>,
    rate: Option<String>,
    volume: Option<String>,
    sentence_break: Option<u32>,
    paragraph_break: Option<u32>,
}

impl TryFrom<ConfigFile> for ClientConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let mut config = ClientConfig::default();
        if let Some(region) = file.region {
            config.set_region(&region)?;
        }
        if let Some(codec) = file.codec {
            config.set_codec(&codec)?;
        }
        if let Some(rate) = file.rate {
            config.set_rate(&rate)?;
        }
        if let Some(volume) = file.volume {
            config.set_volume(&volume)?;
        }
        if let Some(ms) = file.sentence_break {
            config.set_sentence_break(ms)?;
        }
        if let Some(ms) = file.paragraph_break {
            config.set_paragraph_break(ms)?;
        }
        if let Some(name) = file.voice_name {
            config.voice_name = name;
        }
        if let Some(language) = file.language {
            config.language = language;
        }
        Ok(config)
    }
}

/// Transport knobs. None of these change the request contract.
///
/// ```
/// use std::time::Duration;
/// use ivona_rs::engines::ivona::ClientOptionsBuilder;
///
/// let options = ClientOptionsBuilder::default()
///     .timeout(Duration::from_secs(30))
///     .max_retries(2u32)
///     .build()?;
/// assert_eq!(options.max_retries, 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct ClientOptions {
    /// Base URL used instead of the region's endpoint (proxies, test servers).
    #[builder(setter(into, strip_option))]
    pub endpoint: Option<String>,
    /// Total time allowed for one request, body included.
    #[builder(setter(strip_option))]
    pub timeout: Option<Duration>,
    #[builder(setter(strip_option))]
    pub connect_timeout: Option<Duration>,
    /// Extra attempts after a connection failure. Remote errors are never retried.
    pub max_retries: u32,
    #[builder(setter(into))]
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: None,
            connect_timeout: None,
            max_retries: 0,
            user_agent: concat!("ivona-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
