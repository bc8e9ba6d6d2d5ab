//! View state held by the realtime sync layer

use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::entities::{Client, Notification, Payment, Task, TaxFiling};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory copy of the five collections plus load bookkeeping
///
/// Owned by [`RealtimeSync`](super::RealtimeSync); everyone else reads it
/// through a `watch::Receiver` and never mutates it directly.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Sorted by name
    pub clients: Vec<Client>,
    pub payments: Vec<Payment>,
    pub taxes: Vec<TaxFiling>,
    pub tasks: Vec<Task>,
    pub notifications: Vec<Notification>,
    load_errors: BTreeMap<Collection, String>,
    write_errors: BTreeMap<Collection, String>,
    loaded: BTreeSet<Collection>,
    revisions: BTreeMap<Collection, u64>,
}

impl ViewState {
    /// True until every collection has delivered a snapshot or failed
    pub fn is_loading(&self) -> bool {
        self.loaded.len() < Collection::ALL.len()
    }

    pub fn has_loaded(&self, collection: Collection) -> bool {
        self.loaded.contains(&collection)
    }

    /// Number of snapshots applied to a collection
    pub fn revision(&self, collection: Collection) -> u64 {
        self.revisions.get(&collection).copied().unwrap_or(0)
    }

    /// Inline error for a collection whose subscription failed
    pub fn load_error(&self, collection: Collection) -> Option<&str> {
        self.load_errors.get(&collection).map(String::as_str)
    }

    /// Last failed write in a collection, until the next successful one
    pub fn write_error(&self, collection: Collection) -> Option<&str> {
        self.write_errors.get(&collection).map(String::as_str)
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Display name of a client, `None` for unknown ids
    pub fn client_name(&self, id: &str) -> Option<&str> {
        self.client(id).map(|c| c.name.as_str())
    }

    /// Replace a collection wholesale with a fresh snapshot
    pub fn apply<T: ViewSlot>(&mut self, mut records: Vec<T>) {
        T::arrange(&mut records);
        *T::slot(self) = records;
        self.load_errors.remove(&T::COLLECTION);
        self.loaded.insert(T::COLLECTION);
        *self.revisions.entry(T::COLLECTION).or_insert(0) += 1;
    }

    /// Mark a collection as failed
    ///
    /// Its records are dropped so the section shows the error in their place.
    pub fn fail(&mut self, collection: Collection, message: impl Into<String>) {
        match collection {
            Collection::Clients => self.clients.clear(),
            Collection::Payments => self.payments.clear(),
            Collection::Taxes => self.taxes.clear(),
            Collection::Tasks => self.tasks.clear(),
            Collection::Notifications => self.notifications.clear(),
        }
        self.load_errors.insert(collection, message.into());
        self.loaded.insert(collection);
    }

    pub fn record_write_error(&mut self, collection: Collection, message: impl Into<String>) {
        self.write_errors.insert(collection, message.into());
    }

    pub fn clear_write_error(&mut self, collection: Collection) {
        self.write_errors.remove(&collection);
    }
}

/// A record type with a slot in [`ViewState`]
pub trait ViewSlot: Record {
    fn slot(state: &mut ViewState) -> &mut Vec<Self>;

    /// Order applied to every incoming snapshot (backend order by default)
    fn arrange(_records: &mut [Self]) {}
}

impl ViewSlot for Client {
    fn slot(state: &mut ViewState) -> &mut Vec<Self> {
        &mut state.clients
    }

    fn arrange(records: &mut [Self]) {
        records.sort_by_cached_key(|client| collation_key(&client.name));
    }
}

impl ViewSlot for Payment {
    fn slot(state: &mut ViewState) -> &mut Vec<Self> {
        &mut state.payments
    }
}

impl ViewSlot for TaxFiling {
    fn slot(state: &mut ViewState) -> &mut Vec<Self> {
        &mut state.taxes
    }
}

impl ViewSlot for Task {
    fn slot(state: &mut ViewState) -> &mut Vec<Self> {
        &mut state.tasks
    }
}

impl ViewSlot for Notification {
    fn slot(state: &mut ViewState) -> &mut Vec<Self> {
        &mut state.notifications
    }
}

/// Case-insensitive, accent-folded sort key
///
/// Folded and raw names are both kept so that "Álvaro" and "Alvaro" still
/// have a deterministic relative order.
pub fn collation_key(name: &str) -> (String, String) {
    let folded = name
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect();
    (folded, name.to_string())
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
