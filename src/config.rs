//! Navigator configuration, loaded from TOML.
//!
//! ```toml
//! [classify]
//! response_min_chars = 60
//! response_selectors = ['[data-message-author-role="assistant"]', ".bot-turn"]
//!
//! [labels]
//! body_max_chars = 200
//!
//! [speech]
//! enabled = false
//! command = "espeak"
//! ```
//!
//! Every field has a default, so a partial file (or none at all) is valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub classify: ClassifyConfig,
    pub labels: LabelConfig,
    pub speech: SpeechConfig,
    pub messages: MessageConfig,
}

impl NavConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading navigator config from {}", path.display());
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// Selector lists for each category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub landmark_selectors: Vec<String>,
    pub heading_selectors: Vec<String>,
    pub topic_selectors: Vec<String>,
    pub response_selectors: Vec<String>,
    /// Block-level content visited by body mode.
    pub body_selectors: Vec<String>,
    /// Responses with less text than this are treated as decoration.
    pub response_min_chars: usize,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            landmark_selectors: owned(&[
                r#"[role="main"]"#,
                r#"[role="navigation"]"#,
                r#"[role="search"]"#,
                r#"[role="banner"]"#,
                r#"[role="contentinfo"]"#,
                r#"[role="complementary"]"#,
                r#"[role="region"]"#,
                "main",
                "nav",
                "aside",
                "header",
                "footer",
            ]),
            heading_selectors: owned(&["h1", "h2", "h3", "h4", "h5", "h6", r#"[role="heading"]"#]),
            topic_selectors: owned(&[
                r#"[role="article"]"#,
                "[data-message-id]",
                ".message",
                ".chat-message",
                "article",
                ".card",
                r#"[role="listitem"]"#,
            ]),
            response_selectors: owned(&[
                r#"[data-message-author-role="assistant"]"#,
                r#"[data-role="assistant"]"#,
                r#"[data-testid*="assistant"]"#,
                r#"[data-testid*="bot"]"#,
                r#"[aria-label*="assistant" i]"#,
                r#"[aria-roledescription*="assistant" i]"#,
                "article",
                ".chat-message",
                r#"[role="article"]"#,
            ]),
            body_selectors: owned(&[
                "p",
                "li",
                "div",
                "section",
                "article",
                "dd",
                "td",
                "blockquote",
                "pre",
            ]),
            response_min_chars: 40,
        }
    }
}

/// Label truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub topic_max_chars: usize,
    pub response_max_chars: usize,
    pub body_max_chars: usize,
    /// Label for topics with no text at all.
    pub topic_fallback: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            topic_max_chars: 120,
            response_max_chars: 120,
            body_max_chars: 160,
            topic_fallback: "topic".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Initial state of the speech toggle.
    pub enabled: bool,
    pub rate: f32,
    /// External synthesizer, e.g. `espeak` or `say`. No speech when unset.
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1.0,
            command: None,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Announced once when a session starts.
    pub greeting: String,
    /// Appended to every scope announcement.
    pub scope_trailer: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            greeting: "Semantic Navigator ready. Use Alt Shift J/K for headings, Alt Shift R to read, Alt Shift B for body mode.".to_string(),
            scope_trailer: "Headings and topics limited to this response. Press Alt Shift C to clear scope.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = NavConfig::from_toml_str("").unwrap();
        assert_eq!(config, NavConfig::default());
        assert_eq!(config.classify.response_min_chars, 40);
        assert_eq!(config.labels.body_max_chars, 160);
        assert!(config.speech.enabled);
    }

    #[test]
    fn test_partial_override() {
        let config = NavConfig::from_toml_str(
            r#"
            [classify]
            response_min_chars = 10
            topic_selectors = [".post"]

            [speech]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.classify.response_min_chars, 10);
        assert_eq!(config.classify.topic_selectors, vec![".post"]);
        assert_eq!(config.classify.landmark_selectors, ClassifyConfig::default().landmark_selectors);
        assert!(!config.speech.enabled);
        assert_eq!(config.speech.rate, 1.0);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = NavConfig::from_toml_str("[classify\nresponse_min_chars = ").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[labels]\ntopic_fallback = \"block\"").unwrap();

        let config = NavConfig::load(file.path()).unwrap();
        assert_eq!(config.labels.topic_fallback, "block");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NavConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
