//! Contact records and fetch requests.

use serde::{Deserialize, Serialize};

use super::store::StateToken;

/// A labeled multi-value entry (phone number, URL address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A contact as delivered to visitors.
///
/// Only the keys named in the fetch request are populated; the others are
/// left empty. `identifier` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub identifier: String,
    pub given_name: String,
    pub family_name: String,
    pub phone_numbers: Vec<LabeledValue>,
    pub url_addresses: Vec<LabeledValue>,
}

impl Contact {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, given: impl Into<String>, family: impl Into<String>) -> Self {
        self.given_name = given.into();
        self.family_name = family.into();
        self
    }

    pub fn with_phone(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.phone_numbers.push(LabeledValue::new(label, value));
        self
    }

    pub fn with_url(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_addresses.push(LabeledValue::new(label, value));
        self
    }

    /// Copy of this contact holding only the requested keys.
    pub fn project(&self, keys: &[ContactKey]) -> Self {
        let has = |key| keys.contains(&key);
        Self {
            identifier: self.identifier.clone(),
            given_name: if has(ContactKey::GivenName) {
                self.given_name.clone()
            } else {
                String::new()
            },
            family_name: if has(ContactKey::FamilyName) {
                self.family_name.clone()
            } else {
                String::new()
            },
            phone_numbers: if has(ContactKey::PhoneNumbers) {
                self.phone_numbers.clone()
            } else {
                Vec::new()
            },
            url_addresses: if has(ContactKey::UrlAddresses) {
                self.url_addresses.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Fold `other` into `self`: empty names are filled in and multi-value
    /// entries appended without duplicates.
    pub fn merge(&mut self, other: &Contact) {
        if self.given_name.is_empty() {
            self.given_name.clone_from(&other.given_name);
        }
        if self.family_name.is_empty() {
            self.family_name.clone_from(&other.family_name);
        }
        for phone in &other.phone_numbers {
            if !self.phone_numbers.contains(phone) {
                self.phone_numbers.push(phone.clone());
            }
        }
        for url in &other.url_addresses {
            if !self.url_addresses.contains(url) {
                self.url_addresses.push(url.clone());
            }
        }
    }
}

/// Keys a fetch may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKey {
    GivenName,
    FamilyName,
    PhoneNumbers,
    UrlAddresses,
}

impl ContactKey {
    pub const ALL: [ContactKey; 4] = [
        ContactKey::GivenName,
        ContactKey::FamilyName,
        ContactKey::PhoneNumbers,
        ContactKey::UrlAddresses,
    ];
}

/// Which contacts a bulk fetch returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContactPredicate {
    #[default]
    All,
    Identifiers(Vec<String>),
    /// Case-insensitive match on given or family name.
    NameContains(String),
}

impl ContactPredicate {
    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Self::All => true,
            Self::Identifiers(ids) => ids.iter().any(|id| *id == contact.identifier),
            Self::NameContains(needle) => {
                let needle = needle.to_lowercase();
                contact.given_name.to_lowercase().contains(&needle)
                    || contact.family_name.to_lowercase().contains(&needle)
            }
        }
    }
}

/// What a bulk fetch returns and which keys it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFetchRequest {
    pub keys_to_fetch: Vec<ContactKey>,
    pub predicate: ContactPredicate,
    /// Merge linked contacts into one record.
    pub unify_results: bool,
}

impl ContactFetchRequest {
    pub fn new(keys_to_fetch: impl Into<Vec<ContactKey>>) -> Self {
        Self {
            keys_to_fetch: keys_to_fetch.into(),
            predicate: ContactPredicate::All,
            unify_results: false,
        }
    }

    pub fn with_predicate(mut self, predicate: ContactPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn unified(mut self) -> Self {
        self.unify_results = true;
        self
    }
}

/// Where a change-history walk starts and which keys it fills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeHistoryFetchRequest {
    /// Resume after this position; `None` walks from the beginning.
    pub starting_token: Option<StateToken>,
    /// Keys populated on contacts carried by add/update events.
    pub additional_keys: Vec<ContactKey>,
}

impl ChangeHistoryFetchRequest {
    pub fn new(starting_token: Option<StateToken>) -> Self {
        Self {
            starting_token,
            additional_keys: Vec::new(),
        }
    }

    pub fn with_keys(mut self, keys: impl Into<Vec<ContactKey>>) -> Self {
        self.additional_keys = keys.into();
        self
    }
}

/// One entry of the change history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Discard everything known; the following events rebuild the state.
    DropEverything,
    AddContact(Contact),
    UpdateContact(Contact),
    DeleteContact(String),
}
