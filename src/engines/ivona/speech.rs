use serde::Serialize;

use super::config::{ClientConfig, Rate, Volume};

/// Per-call voice override. Unset fields fall back to the client defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceSelection {
    pub name: Option<String>,
    pub language: Option<String>,
}

impl VoiceSelection {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            language: Some(language.into()),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            language: None,
        }
    }

    pub fn language(language: impl Into<String>) -> Self {
        Self {
            name: None,
            language: Some(language.into()),
        }
    }

    /// Fill the unset fields from `config`.
    pub fn resolve<'a>(&'a self, config: &'a ClientConfig) -> (&'a str, &'a str) {
        (
            self.name.as_deref().unwrap_or(config.voice_name()),
            self.language.as_deref().unwrap_or(config.language()),
        )
    }
}

/// CreateSpeech request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CreateSpeechRequest<'a> {
    pub input: Input<'a>,
    pub output_format: OutputFormat,
    pub parameters: Parameters,
    pub voice: Voice<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Input<'a> {
    pub data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OutputFormat {
    pub codec: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Parameters {
    pub rate: Rate,
    pub volume: Volume,
    pub sentence_break: u32,
    pub paragraph_break: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Voice<'a> {
    pub name: &'a str,
    pub language: &'a str,
}

impl<'a> CreateSpeechRequest<'a> {
    /// Everything but the text and voice comes from `config` as it is now.
    pub fn new(text: &'a str, config: &ClientConfig, name: &'a str, language: &'a str) -> Self {
        Self {
            input: Input { data: text },
            output_format: OutputFormat {
                codec: config.codec().wire_name(),
            },
            parameters: Parameters {
                rate: config.rate(),
                volume: config.volume(),
                sentence_break: config.sentence_break(),
                paragraph_break: config.paragraph_break(),
            },
            voice: Voice { name, language },
        }
    }
}
