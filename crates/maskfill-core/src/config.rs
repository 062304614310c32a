//! Session configuration: the labels an operator picks before a session starts.
//!
//! Labels are free text and deliberately unvalidated; any string, including
//! the empty string, is accepted.

use serde::{Deserialize, Serialize};

/// Round label used when the operator does not pick one.
pub const DEFAULT_ROUND: &str = "anonymous";
/// Dataset label used when the operator does not pick one.
pub const DEFAULT_DATASET: &str = "toy";

/// Editable setup form, shown during the setup phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSetup {
    /// Tags every submitted response.
    #[serde(default = "default_round")]
    pub round: String,
    /// Selects which sentence collection to load, and tags responses.
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// Cap on the number of sentences in the session (first N are kept).
    #[serde(default)]
    pub quota: Option<usize>,
}

fn default_round() -> String {
    DEFAULT_ROUND.to_string()
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

impl Default for SessionSetup {
    fn default() -> Self {
        Self {
            round: default_round(),
            dataset: default_dataset(),
            quota: None,
        }
    }
}

impl SessionSetup {
    /// Freeze the form into an immutable configuration.
    pub fn confirm(self) -> SessionConfig {
        SessionConfig {
            round: self.round,
            dataset: self.dataset,
            quota: self.quota,
        }
    }
}

/// Frozen session configuration. Read-only once confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    round: String,
    dataset: String,
    quota: Option<usize>,
}

impl SessionConfig {
    pub fn round(&self) -> &str {
        &self.round
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn quota(&self) -> Option<usize> {
        self.quota
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_as_is() {
        let config = SessionSetup::default().confirm();
        assert_eq!(config.round(), "anonymous");
        assert_eq!(config.dataset(), "toy");
        assert_eq!(config.quota(), None);
    }

    #[test]
    fn empty_labels_are_accepted() {
        let setup = SessionSetup {
            round: String::new(),
            dataset: String::new(),
            quota: None,
        };
        let config = setup.confirm();
        assert_eq!(config.round(), "");
        assert_eq!(config.dataset(), "");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let setup: SessionSetup = serde_json::from_str(r#"{"round": "r7"}"#).unwrap();
        assert_eq!(setup.round, "r7");
        assert_eq!(setup.dataset, "toy");
        assert_eq!(setup.quota, None);
    }
}
