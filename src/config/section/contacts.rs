//! `[contacts]` section configuration.
//!
//! App-specific references are stored in a contact's URL addresses. An
//! address whose label equals `reference_label` and whose value starts with
//! `reference_prefix` followed by a decimal id links the contact to that id.
//!
//! # Example
//!
//! ```toml
//! [contacts]
//! reference_label = "profile"
//! reference_prefix = "profile://id/"
//! ```

use serde::{Deserialize, Serialize};

/// Contact index settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    /// Label of URL addresses that carry app references.
    pub reference_label: String,

    /// Prefix preceding the numeric id in a reference URL.
    pub reference_prefix: String,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            reference_label: "profile".to_string(),
            reference_prefix: "profile://id/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contacts_config_from_toml() {
        let config: ContactsConfig = toml::from_str(
            r#"
            reference_label = "Messenger"
            reference_prefix = "https://example.org/u/"
            "#,
        )
        .unwrap();
        assert_eq!(config.reference_label, "Messenger");
        assert_eq!(config.reference_prefix, "https://example.org/u/");
    }
}
