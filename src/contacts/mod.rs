//! Change and contact enumeration.
//!
//! ```text
//! contacts/
//! ├── model.rs    # Contact, keys, predicates, fetch requests
//! ├── store.rs    # ContactStore trait, StateToken, visitor
//! ├── memory.rs   # MemoryContactStore
//! └── sync.rs     # ContactIndex kept current from the change history
//! ```
//!
//! The two adapters walk a store, hand each record to the caller as soon as
//! the store yields it, and return the store's continuation token. A store
//! failure (access denied, unavailable, malformed token) yields `None`.

mod memory;
mod model;
mod store;
pub mod sync;

pub use memory::MemoryContactStore;
pub use model::{
    ChangeEvent, ChangeHistoryFetchRequest, Contact, ContactFetchRequest, ContactKey,
    ContactPredicate, LabeledValue,
};
pub use store::{
    AuthorizationStatus, ChangeHistoryVisitor, ContactStore, StateToken, StoreError,
};
pub use sync::{ContactIndex, ContactSummary};

use crate::debug;

/// Outcome of a change-history walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEnumerationResult {
    pub state_token: Option<StateToken>,
}

/// Outcome of a bulk contact fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationResult {
    pub state_token: Option<StateToken>,
}

/// Walk the change history from `request.starting_token`, feeding each
/// event to `visitor`.
pub fn enumerate_changes<S, V>(
    store: &S,
    request: &ChangeHistoryFetchRequest,
    visitor: &mut V,
) -> Option<ChangeEnumerationResult>
where
    S: ContactStore + ?Sized,
    V: ChangeHistoryVisitor + ?Sized,
{
    let mut delivered = 0usize;
    let result = store.enumerate_change_history(request, &mut |event| {
        delivered += 1;
        visitor.visit(event);
    });

    match result {
        Ok(token) => {
            debug!("contacts"; "delivered {} change events, token {}", delivered, token);
            Some(ChangeEnumerationResult {
                state_token: Some(token),
            })
        }
        Err(err) => {
            debug!("contacts"; "change history walk failed: {}", err);
            None
        }
    }
}

/// Fetch every contact matching `request`, calling `visit` once per contact.
pub fn enumerate_contacts<S, F>(
    store: &S,
    request: &ContactFetchRequest,
    mut visit: F,
) -> Option<EnumerationResult>
where
    S: ContactStore + ?Sized,
    F: FnMut(&Contact),
{
    let mut delivered = 0usize;
    let result = store.enumerate_contacts(request, &mut |contact| {
        delivered += 1;
        visit(contact);
    });

    match result {
        Ok(token) => {
            debug!("contacts"; "delivered {} contacts, token {}", delivered, token);
            Some(EnumerationResult {
                state_token: Some(token),
            })
        }
        Err(err) => {
            debug!("contacts"; "contact fetch failed: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryContactStore {
        let store = MemoryContactStore::new();
        store.add(Contact::new("a").with_name("Alice", "Liddell"));
        store.add(Contact::new("b").with_name("Bob", "Stone"));
        store.add(Contact::new("c").with_name("Carol", "Reed"));
        store
    }

    fn identifiers(events: &[ChangeEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                ChangeEvent::AddContact(c) | ChangeEvent::UpdateContact(c) => {
                    Some(c.identifier.clone())
                }
                ChangeEvent::DeleteContact(id) => Some(id.clone()),
                ChangeEvent::DropEverything => None,
            })
            .collect()
    }

    #[test]
    fn test_changes_from_beginning_in_store_order() {
        let store = store();
        let mut events: Vec<ChangeEvent> = Vec::new();
        let result = enumerate_changes(&store, &ChangeHistoryFetchRequest::default(), &mut events)
            .unwrap();

        assert!(result.state_token.is_some());
        assert_eq!(events[0], ChangeEvent::DropEverything);
        assert_eq!(identifiers(&events), ["a", "b", "c"]);
    }

    #[test]
    fn test_resumed_walk_never_redelivers() {
        let store = store();
        let mut first: Vec<ChangeEvent> = Vec::new();
        let token = enumerate_changes(&store, &ChangeHistoryFetchRequest::default(), &mut first)
            .unwrap()
            .state_token;

        store.add(Contact::new("d"));
        store.delete("a");

        let mut second: Vec<ChangeEvent> = Vec::new();
        let request = ChangeHistoryFetchRequest::new(token);
        let token = enumerate_changes(&store, &request, &mut second)
            .unwrap()
            .state_token;
        assert_eq!(identifiers(&second), ["d", "a"]);
        assert!(!second.contains(&ChangeEvent::DropEverything));

        let mut third: Vec<ChangeEvent> = Vec::new();
        enumerate_changes(&store, &ChangeHistoryFetchRequest::new(token), &mut third).unwrap();
        assert!(third.is_empty());
    }

    #[test]
    fn test_additional_keys_populate_contacts() {
        let store = store();
        let mut events: Vec<ChangeEvent> = Vec::new();
        let request = ChangeHistoryFetchRequest::default().with_keys([ContactKey::FamilyName]);
        enumerate_changes(&store, &request, &mut events).unwrap();

        let ChangeEvent::AddContact(first) = &events[1] else {
            panic!("expected add, got {:?}", events[1]);
        };
        assert_eq!(first.family_name, "Liddell");
        assert!(first.given_name.is_empty());
    }

    #[test]
    fn test_denied_store_yields_none() {
        let store = store();
        store.set_authorization(AuthorizationStatus::Denied);

        let mut events: Vec<ChangeEvent> = Vec::new();
        assert!(
            enumerate_changes(&store, &ChangeHistoryFetchRequest::default(), &mut events)
                .is_none()
        );
        assert!(events.is_empty());

        let mut count = 0;
        let request = ContactFetchRequest::new(ContactKey::ALL);
        assert!(enumerate_contacts(&store, &request, |_| count += 1).is_none());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_malformed_token_yields_none() {
        let store = store();
        let request =
            ChangeHistoryFetchRequest::new(Some(StateToken::from_bytes(vec![1, 2, 3])));
        assert!(enumerate_changes(&store, &request, &mut Vec::<ChangeEvent>::new()).is_none());
    }

    #[test]
    fn test_fetch_visits_each_match_once() {
        let store = store();
        let request = ContactFetchRequest::new([ContactKey::GivenName]).with_predicate(
            ContactPredicate::Identifiers(vec!["c".into(), "a".into()]),
        );

        let mut seen = Vec::new();
        let result = enumerate_contacts(&store, &request, |c| seen.push(c.given_name.clone()));

        assert_eq!(seen, ["Alice", "Carol"]);
        let token = result.unwrap().state_token.unwrap();
        assert_eq!(Some(token), store.current_history_token().ok());
    }

    #[test]
    fn test_dyn_store() {
        let store = store();
        let dyn_store: &dyn ContactStore = &store;
        let mut count = 0;
        let request = ContactFetchRequest::new(ContactKey::ALL);
        assert!(enumerate_contacts(dyn_store, &request, |_| count += 1).is_some());
        assert_eq!(count, 3);
    }
}
