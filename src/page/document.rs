// src/page/document.rs
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// The dashboard page as seen by client-side components: the anti-forgery
/// token from the page metadata, the form inputs, and whether the page is in
/// the foreground.
#[derive(Debug)]
pub struct Page {
    meta_token: ArcSwap<String>,
    fields: DashMap<FieldId, FormField>,
    next_field: AtomicU64,
    visibility_tx: watch::Sender<Visibility>,
}

impl Page {
    pub fn new(meta_token: impl Into<String>) -> Self {
        let (visibility_tx, _) = watch::channel(Visibility::Visible);

        Self {
            meta_token: ArcSwap::from_pointee(meta_token.into()),
            fields: DashMap::new(),
            next_field: AtomicU64::new(0),
            visibility_tx,
        }
    }

    pub fn meta_token(&self) -> Arc<String> {
        self.meta_token.load_full()
    }

    pub fn set_meta_token(&self, token: impl Into<String>) {
        self.meta_token.store(Arc::new(token.into()));
    }

    pub fn add_field(&self, name: impl Into<String>, value: impl Into<String>) -> FieldId {
        let id = FieldId(self.next_field.fetch_add(1, Ordering::Relaxed));
        self.fields.insert(
            id,
            FormField {
                name: name.into(),
                value: value.into(),
            },
        );
        id
    }

    pub fn field_value(&self, id: FieldId) -> Option<String> {
        self.fields.get(&id).map(|f| f.value.clone())
    }

    /// Values of every field called `name`, in insertion order.
    pub fn values_named(&self, name: &str) -> Vec<String> {
        let mut matching: Vec<(FieldId, String)> = self
            .fields
            .iter()
            .filter(|entry| entry.value().name == name)
            .map(|entry| (*entry.key(), entry.value().value.clone()))
            .collect();
        matching.sort_by_key(|(id, _)| *id);
        matching.into_iter().map(|(_, value)| value).collect()
    }

    /// Overwrite the value of every field called `name`. Returns how many
    /// fields were written.
    pub fn write_named(&self, name: &str, value: &str) -> usize {
        let mut written = 0;
        for mut entry in self.fields.iter_mut() {
            let field = entry.value_mut();
            if field.name == name {
                field.value = value.to_string();
                written += 1;
            }
        }
        written
    }

    pub fn visibility(&self) -> Visibility {
        *self.visibility_tx.borrow()
    }

    /// Subscribers are only notified when the visibility actually changes.
    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility_tx.send_if_modified(|current| {
            if *current == visibility {
                return false;
            }
            *current = visibility;
            true
        });
    }

    pub fn subscribe_visibility(&self) -> watch::Receiver<Visibility> {
        self.visibility_tx.subscribe()
    }
}
