use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// A voice the service advertises, identified by its (name, language) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Language")]
    pub language: String,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }

    pub fn matches(&self, name: &str, language: &str) -> bool {
        self.name == name && self.language == language
    }
}

impl fmt::Display for VoiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.language)
    }
}

/// Voices of one region, in server order.
///
/// Duplicates reported by the server are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDescriptor>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<VoiceDescriptor>) -> Self {
        Self { voices }
    }

    /// Exact, case-sensitive match on both fields.
    pub fn contains(&self, name: &str, language: &str) -> bool {
        self.voices.iter().any(|v| v.matches(name, language))
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.voices.iter().any(|v| v.language == language)
    }

    /// Distinct languages in first-seen order.
    pub fn languages(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for voice in &self.voices {
            if !seen.contains(&voice.language.as_str()) {
                seen.push(&voice.language);
            }
        }
        seen
    }

    pub fn voices(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VoiceDescriptor> {
        self.voices.iter()
    }
}

impl<'a> IntoIterator for &'a VoiceCatalog {
    type Item = &'a VoiceDescriptor;
    type IntoIter = std::slice::Iter<'a, VoiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.voices.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
}

impl FromStr for Gender {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(ConfigError::UnknownGender(s.to_string())),
        }
    }
}

/// Server-side criteria for a ListVoices query. The default filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceFilter {
    pub language: Option<String>,
    pub gender: Option<Gender>,
}

impl VoiceFilter {
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            gender: None,
        }
    }

    pub fn gender(gender: Gender) -> Self {
        Self {
            language: None,
            gender: Some(gender),
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.gender.is_none()
    }
}

/// Body of a filtered ListVoices call.
#[derive(Debug, Serialize)]
pub(crate) struct ListVoicesRequest<'a> {
    #[serde(rename = "Voice")]
    pub voice: VoiceCriteria<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoiceCriteria<'a> {
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<&'a str>,
    #[serde(rename = "Gender", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl<'a> From<&'a VoiceFilter> for ListVoicesRequest<'a> {
    fn from(filter: &'a VoiceFilter) -> Self {
        Self {
            voice: VoiceCriteria {
                language: filter.language.as_deref(),
                gender: filter.gender,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListVoicesResponse {
    #[serde(rename = "Voices")]
    pub voices: Vec<VoiceDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::new(vec![
            VoiceDescriptor::new("Salli", "en-US"),
            VoiceDescriptor::new("Maja", "pl-PL"),
            VoiceDescriptor::new("Joey", "en-US"),
            VoiceDescriptor::new("Salli", "en-US"),
        ])
    }

    #[test]
    fn contains_requires_exact_pair() {
        let catalog = catalog();
        assert!(catalog.contains("Salli", "en-US"));
        assert!(catalog.contains("Maja", "pl-PL"));
        assert!(!catalog.contains("salli", "en-US"));
        assert!(!catalog.contains("Salli", "en-us"));
        assert!(!catalog.contains("Salli", "pl-PL"));
        assert!(!catalog.contains("Ghost", "xx-XX"));
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(catalog().len(), 4);
    }

    #[test]
    fn languages_are_distinct_in_server_order() {
        assert_eq!(catalog().languages(), vec!["en-US", "pl-PL"]);
        assert!(catalog().has_language("pl-PL"));
        assert!(!catalog().has_language("de-DE"));
    }

    #[test]
    fn response_ignores_extra_voice_fields() {
        let body = r#"{"Voices": [{"Name": "Salli", "Language": "en-US", "Gender": "Female"}]}"#;
        let response: ListVoicesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.voices, vec![VoiceDescriptor::new("Salli", "en-US")]);
    }

    #[test]
    fn filter_body_merges_language_and_gender() {
        let filter = VoiceFilter::language("en-US").with_gender(Gender::Female);
        let body = serde_json::to_value(ListVoicesRequest::from(&filter)).unwrap();
        assert_eq!(
            body,
            json!({"Voice": {"Language": "en-US", "Gender": "Female"}})
        );

        let body = serde_json::to_value(ListVoicesRequest::from(&VoiceFilter::language("pl-PL"))).unwrap();
        assert_eq!(body, json!({"Voice": {"Language": "pl-PL"}}));
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("FEMALE".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }
}
