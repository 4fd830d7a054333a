//! The claimed researcher identity under verification.

use serde::{Deserialize, Serialize};

/// Query key for one verification run. Immutable for the run's duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Researcher {
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,

    /// Surname.
    #[serde(default)]
    pub surname: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// ORCID identifier.
    #[serde(default)]
    pub orcid: Option<String>,

    /// Claimed institutional affiliation (ROR, ISNI or name).
    #[serde(default)]
    pub affiliation: Option<String>,

    /// Whether given name and surname should be treated interchangeably.
    #[serde(default)]
    pub uncertain_name_order: bool,
}

impl Researcher {
    /// Create a researcher from the name pair alone.
    #[must_use]
    pub fn new(given_name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            given_name: Some(given_name.into()),
            surname: Some(surname.into()),
            ..Self::default()
        }
    }

    /// Given name, or an empty string when missing.
    #[must_use]
    pub fn given_name_or_empty(&self) -> &str {
        self.given_name.as_deref().unwrap_or("")
    }

    /// Surname, or an empty string when missing.
    #[must_use]
    pub fn surname_or_empty(&self) -> &str {
        self.surname.as_deref().unwrap_or("")
    }

    /// Whether both name parts are present and non-empty.
    #[must_use]
    pub fn has_full_name(&self) -> bool {
        !self.given_name_or_empty().is_empty() && !self.surname_or_empty().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_full_name() {
        assert!(Researcher::new("Jane", "Doe").has_full_name());
        assert!(!Researcher::new("", "Doe").has_full_name());
        assert!(!Researcher::default().has_full_name());
    }

    #[test]
    fn test_deserialize_minimal() {
        let researcher: Researcher =
            serde_json::from_str(r#"{"given_name": "Jane", "surname": "Doe"}"#).unwrap();
        assert_eq!(researcher.given_name_or_empty(), "Jane");
        assert!(!researcher.uncertain_name_order);
        assert!(researcher.orcid.is_none());
    }
}
