//! Local contact index kept in sync with a [`ContactStore`].
//!
//! Besides a summary per contact, the index tracks app references: URL
//! addresses whose label matches the configured one and whose value is the
//! configured prefix followed by a decimal peer id.

use rustc_hash::{FxHashMap, FxHashSet};

use super::model::{
    ChangeHistoryFetchRequest, Contact, ContactFetchRequest, ContactKey,
};
use super::store::{ChangeHistoryVisitor, ContactStore, StateToken};
use super::{enumerate_changes, enumerate_contacts};
use crate::config::cfg;
use crate::debug;

/// What the index remembers about one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSummary {
    pub identifier: String,
    pub display_name: String,
    pub phone_numbers: Vec<String>,
}

impl From<&Contact> for ContactSummary {
    fn from(contact: &Contact) -> Self {
        let display_name = format!("{} {}", contact.given_name, contact.family_name)
            .trim()
            .to_owned();
        Self {
            identifier: contact.identifier.clone(),
            display_name,
            phone_numbers: contact
                .phone_numbers
                .iter()
                .map(|p| p.value.clone())
                .collect(),
        }
    }
}

/// Parse `prefix<decimal id>`.
pub fn parse_reference(value: &str, prefix: &str) -> Option<i64> {
    let digits = value.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Default)]
pub struct ContactIndex {
    label: String,
    prefix: String,
    contacts: FxHashMap<String, ContactSummary>,
    /// peer id -> contacts referencing it
    by_peer: FxHashMap<i64, FxHashSet<String>>,
    /// contact -> peer ids it references
    by_contact: FxHashMap<String, FxHashSet<i64>>,
    token: Option<StateToken>,
}

impl ContactIndex {
    /// Index using the reference label and prefix from the config.
    pub fn new() -> Self {
        let config = cfg();
        Self::with_reference(
            config.contacts.reference_label.clone(),
            config.contacts.reference_prefix.clone(),
        )
    }

    pub fn with_reference(label: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&ContactSummary> {
        self.contacts.get(identifier)
    }

    /// Token of the last successful refresh.
    pub fn token(&self) -> Option<&StateToken> {
        self.token.as_ref()
    }

    /// Contacts referencing `peer`, sorted.
    pub fn contacts_for_peer(&self, peer: i64) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .by_peer
            .get(&peer)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Peers referenced by `identifier`, sorted.
    pub fn peers_for_contact(&self, identifier: &str) -> Vec<i64> {
        let mut peers: Vec<i64> = self
            .by_contact
            .get(identifier)
            .map(|peers| peers.iter().copied().collect())
            .unwrap_or_default();
        peers.sort_unstable();
        peers
    }

    /// Bring the index up to date.
    ///
    /// With a token, only the changes since the last refresh are applied.
    /// Without one (first run, or after a failure) the index is rebuilt from
    /// a full fetch. Returns whether the store could be read.
    pub fn refresh<S: ContactStore + ?Sized>(&mut self, store: &S) -> bool {
        match self.token.clone() {
            Some(token) => {
                let request =
                    ChangeHistoryFetchRequest::new(Some(token)).with_keys(ContactKey::ALL);
                let result = enumerate_changes(store, &request, self);
                self.finish(result.and_then(|r| r.state_token))
            }
            None => {
                self.clear();
                let request = ContactFetchRequest::new(ContactKey::ALL);
                let result = enumerate_contacts(store, &request, |contact| self.insert(contact));
                self.finish(result.and_then(|r| r.state_token))
            }
        }
    }

    fn finish(&mut self, token: Option<StateToken>) -> bool {
        let ok = token.is_some();
        if !ok {
            debug!("contacts"; "refresh failed, next refresh rebuilds the index");
        }
        self.token = token;
        ok
    }

    fn clear(&mut self) {
        self.contacts.clear();
        self.by_peer.clear();
        self.by_contact.clear();
    }

    fn insert(&mut self, contact: &Contact) {
        self.remove(&contact.identifier);

        let peers: FxHashSet<i64> = contact
            .url_addresses
            .iter()
            .filter(|url| url.label == self.label)
            .filter_map(|url| parse_reference(&url.value, &self.prefix))
            .collect();
        for &peer in &peers {
            self.by_peer
                .entry(peer)
                .or_default()
                .insert(contact.identifier.clone());
        }
        if !peers.is_empty() {
            self.by_contact.insert(contact.identifier.clone(), peers);
        }
        self.contacts
            .insert(contact.identifier.clone(), ContactSummary::from(contact));
    }

    fn remove(&mut self, identifier: &str) {
        self.contacts.remove(identifier);
        let Some(peers) = self.by_contact.remove(identifier) else {
            return;
        };
        for peer in peers {
            if let Some(ids) = self.by_peer.get_mut(&peer) {
                ids.remove(identifier);
                if ids.is_empty() {
                    self.by_peer.remove(&peer);
                }
            }
        }
    }
}

impl ChangeHistoryVisitor for ContactIndex {
    fn drop_everything(&mut self) {
        self.clear();
    }

    fn add_contact(&mut self, contact: &Contact) {
        self.insert(contact);
    }

    fn update_contact(&mut self, contact: &Contact) {
        self.insert(contact);
    }

    fn delete_contact(&mut self, identifier: &str) {
        self.remove(identifier);
    }
}
