//! In-process contact store with an append-only change log.
//!
//! Tokens encode `(store id, log position)`. A token from another store, or
//! one pointing outside the retained log, can no longer be resumed; the walk
//! then starts over with `DropEverything` and a full replay.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::model::{
    ChangeEvent, ChangeHistoryFetchRequest, Contact, ContactFetchRequest, ContactKey,
};
use super::store::{AuthorizationStatus, ContactStore, StateToken, StoreError};
use crate::debug;

const TOKEN_MAGIC: &[u8; 4] = b"TSCT";
const TOKEN_LEN: usize = 4 + 8 + 8;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct Record {
    contact: Contact,
    /// Records sharing a link id unify into one contact.
    link_id: Option<String>,
}

#[derive(Debug)]
struct Inner {
    records: Vec<Record>,
    /// Events after `base`; earlier ones were compacted away.
    log: Vec<ChangeEvent>,
    base: u64,
    authorization: AuthorizationStatus,
    available: bool,
}

impl Inner {
    fn head(&self) -> u64 {
        self.base + self.log.len() as u64
    }

    fn position(&self, identifier: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.contact.identifier == identifier)
    }

    fn check_access(&self) -> Result<(), StoreError> {
        if self.authorization != AuthorizationStatus::Authorized {
            return Err(StoreError::AccessDenied(self.authorization));
        }
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

/// Thread-safe contact store kept in memory.
///
/// Callbacks run while the store is read-locked; they must not call the
/// mutating methods of the same store.
#[derive(Debug)]
pub struct MemoryContactStore {
    id: u64,
    inner: RwLock<Inner>,
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::with_id(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Store with a fixed id, so tokens survive re-creating the store.
    pub fn with_id(id: u64) -> Self {
        Self {
            id,
            inner: RwLock::new(Inner {
                records: Vec::new(),
                log: Vec::new(),
                base: 0,
                authorization: AuthorizationStatus::Authorized,
                available: true,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Insert a new contact. Returns `false` if the identifier is taken.
    pub fn add(&self, contact: Contact) -> bool {
        let mut inner = self.inner.write();
        if inner.position(&contact.identifier).is_some() {
            return false;
        }
        inner.log.push(ChangeEvent::AddContact(contact.clone()));
        inner.records.push(Record {
            contact,
            link_id: None,
        });
        true
    }

    /// Replace an existing contact. Returns `false` if it is unknown.
    pub fn update(&self, contact: Contact) -> bool {
        let mut inner = self.inner.write();
        let Some(index) = inner.position(&contact.identifier) else {
            return false;
        };
        inner.log.push(ChangeEvent::UpdateContact(contact.clone()));
        inner.records[index].contact = contact;
        true
    }

    pub fn delete(&self, identifier: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(index) = inner.position(identifier) else {
            return false;
        };
        inner.records.remove(index);
        inner
            .log
            .push(ChangeEvent::DeleteContact(identifier.to_owned()));
        true
    }

    /// Link a contact with every other contact carrying the same link id.
    pub fn link(&self, identifier: &str, link_id: impl Into<String>) -> bool {
        let mut inner = self.inner.write();
        let Some(index) = inner.position(identifier) else {
            return false;
        };
        inner.records[index].link_id = Some(link_id.into());
        true
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget the change log. Tokens issued before this point replay from
    /// the beginning.
    pub fn compact_history(&self) {
        let mut inner = self.inner.write();
        inner.base = inner.head();
        inner.log.clear();
    }

    pub fn set_authorization(&self, status: AuthorizationStatus) {
        self.inner.write().authorization = status;
    }

    pub fn set_available(&self, available: bool) {
        self.inner.write().available = available;
    }

    fn encode_token(&self, position: u64) -> StateToken {
        let mut bytes = Vec::with_capacity(TOKEN_LEN);
        bytes.extend_from_slice(TOKEN_MAGIC);
        bytes.extend_from_slice(&self.id.to_le_bytes());
        bytes.extend_from_slice(&position.to_le_bytes());
        StateToken::from_bytes(bytes)
    }

    /// Decode `(store id, position)`.
    fn decode_token(token: &StateToken) -> Result<(u64, u64), StoreError> {
        let bytes = token.as_bytes();
        if bytes.len() != TOKEN_LEN || &bytes[..4] != TOKEN_MAGIC {
            return Err(StoreError::MalformedToken(token.to_string()));
        }
        let mut id = [0u8; 8];
        let mut position = [0u8; 8];
        id.copy_from_slice(&bytes[4..12]);
        position.copy_from_slice(&bytes[12..20]);
        Ok((u64::from_le_bytes(id), u64::from_le_bytes(position)))
    }

    /// Index into the retained log to resume from, if the token allows it.
    fn resume_index(
        &self,
        inner: &Inner,
        token: &StateToken,
    ) -> Result<Option<usize>, StoreError> {
        let (id, position) = Self::decode_token(token)?;
        if id != self.id {
            debug!("contacts"; "token from store {} replayed on store {}", id, self.id);
            return Ok(None);
        }
        if position < inner.base || position > inner.head() {
            debug!(
                "contacts";
                "token position {} outside retained history {}..{}",
                position, inner.base, inner.head()
            );
            return Ok(None);
        }
        Ok(Some((position - inner.base) as usize))
    }
}

/// Contacts after unification, in store order.
fn unified(records: &[Record]) -> Vec<Contact> {
    let mut merged: Vec<(Option<&str>, Contact)> = Vec::with_capacity(records.len());
    for record in records {
        let link = record.link_id.as_deref();
        if let Some(link) = link
            && let Some((_, contact)) = merged.iter_mut().find(|(l, _)| *l == Some(link))
        {
            contact.merge(&record.contact);
            continue;
        }
        merged.push((link, record.contact.clone()));
    }
    merged.into_iter().map(|(_, contact)| contact).collect()
}

fn projected(event: &ChangeEvent, keys: &[ContactKey]) -> ChangeEvent {
    match event {
        ChangeEvent::AddContact(c) => ChangeEvent::AddContact(c.project(keys)),
        ChangeEvent::UpdateContact(c) => ChangeEvent::UpdateContact(c.project(keys)),
        other => other.clone(),
    }
}

impl ContactStore for MemoryContactStore {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.inner.read().authorization
    }

    fn current_history_token(&self) -> Result<StateToken, StoreError> {
        let inner = self.inner.read();
        inner.check_access()?;
        Ok(self.encode_token(inner.head()))
    }

    fn enumerate_change_history(
        &self,
        request: &ChangeHistoryFetchRequest,
        visit: &mut dyn FnMut(&ChangeEvent),
    ) -> Result<StateToken, StoreError> {
        let inner = self.inner.read();
        inner.check_access()?;

        let resume = match &request.starting_token {
            Some(token) => self.resume_index(&inner, token)?,
            None => None,
        };
        let keys = &request.additional_keys;

        match resume {
            Some(index) => {
                for event in &inner.log[index..] {
                    visit(&projected(event, keys));
                }
            }
            None => {
                visit(&ChangeEvent::DropEverything);
                for record in &inner.records {
                    visit(&ChangeEvent::AddContact(record.contact.project(keys)));
                }
            }
        }

        Ok(self.encode_token(inner.head()))
    }

    fn enumerate_contacts(
        &self,
        request: &ContactFetchRequest,
        visit: &mut dyn FnMut(&Contact),
    ) -> Result<StateToken, StoreError> {
        let inner = self.inner.read();
        inner.check_access()?;

        let keys = &request.keys_to_fetch;
        if request.unify_results {
            for contact in unified(&inner.records) {
                if request.predicate.matches(&contact) {
                    visit(&contact.project(keys));
                }
            }
        } else {
            for record in &inner.records {
                if request.predicate.matches(&record.contact) {
                    visit(&record.contact.project(keys));
                }
            }
        }

        Ok(self.encode_token(inner.head()))
    }
}
