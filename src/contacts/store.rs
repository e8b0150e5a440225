//! Contact store abstraction.
//!
//! A store owns the contact records and the change log. The adapters in
//! [`super`] only pass its tokens through; they never look inside them.

use std::fmt;

use super::model::{ChangeEvent, ChangeHistoryFetchRequest, Contact, ContactFetchRequest};

/// Opaque resumption token issued by a [`ContactStore`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StateToken(Vec<u8>);

impl StateToken {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateToken({self})")
    }
}

/// Whether the caller may read the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorizationStatus {
    #[default]
    Authorized,
    Denied,
    Restricted,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("access to contacts is not authorized ({0:?})")]
    AccessDenied(AuthorizationStatus),

    #[error("contact store is unavailable")]
    Unavailable,

    #[error("malformed state token: {0}")]
    MalformedToken(String),
}

/// Receives change-history events in log order.
pub trait ChangeHistoryVisitor {
    /// Everything known so far is stale; the events that follow rebuild it.
    fn drop_everything(&mut self);
    fn add_contact(&mut self, contact: &Contact);
    fn update_contact(&mut self, contact: &Contact);
    fn delete_contact(&mut self, identifier: &str);

    /// Dispatch one event to the matching method.
    fn visit(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::DropEverything => self.drop_everything(),
            ChangeEvent::AddContact(contact) => self.add_contact(contact),
            ChangeEvent::UpdateContact(contact) => self.update_contact(contact),
            ChangeEvent::DeleteContact(identifier) => self.delete_contact(identifier),
        }
    }
}

/// Collects events as values. Handy for callers that diff later.
impl ChangeHistoryVisitor for Vec<ChangeEvent> {
    fn drop_everything(&mut self) {
        self.push(ChangeEvent::DropEverything);
    }

    fn add_contact(&mut self, contact: &Contact) {
        self.push(ChangeEvent::AddContact(contact.clone()));
    }

    fn update_contact(&mut self, contact: &Contact) {
        self.push(ChangeEvent::UpdateContact(contact.clone()));
    }

    fn delete_contact(&mut self, identifier: &str) {
        self.push(ChangeEvent::DeleteContact(identifier.to_owned()));
    }
}

/// A contacts database.
///
/// Records are handed to the callback one at a time, in store order. Both
/// walks return the store's history position at the time of the call.
pub trait ContactStore {
    fn authorization_status(&self) -> AuthorizationStatus;

    fn current_history_token(&self) -> Result<StateToken, StoreError>;

    fn enumerate_change_history(
        &self,
        request: &ChangeHistoryFetchRequest,
        visit: &mut dyn FnMut(&ChangeEvent),
    ) -> Result<StateToken, StoreError>;

    fn enumerate_contacts(
        &self,
        request: &ContactFetchRequest,
        visit: &mut dyn FnMut(&Contact),
    ) -> Result<StateToken, StoreError>;
}
