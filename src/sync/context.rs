use std::collections::{HashMap, HashSet};

/// Lookups that outlive a single sync pass: name caches keyed by upstream id,
/// and the ids of cards already emitted. Entries are never invalidated.
#[derive(Debug, Default)]
pub struct LookupContext {
    member_names: HashMap<String, String>,
    list_names: HashMap<String, String>,
    processed_cards: HashSet<String>,
}

impl LookupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_name(&self, member_id: &str) -> Option<&str> {
        self.member_names.get(member_id).map(String::as_str)
    }

    pub fn remember_member(&mut self, member_id: impl Into<String>, name: impl Into<String>) {
        self.member_names.insert(member_id.into(), name.into());
    }

    pub fn list_name(&self, list_id: &str) -> Option<&str> {
        self.list_names.get(list_id).map(String::as_str)
    }

    pub fn remember_list(&mut self, list_id: impl Into<String>, name: impl Into<String>) {
        self.list_names.insert(list_id.into(), name.into());
    }

    pub fn is_processed(&self, card_id: &str) -> bool {
        self.processed_cards.contains(card_id)
    }

    pub fn mark_processed(&mut self, card_id: impl Into<String>) {
        self.processed_cards.insert(card_id.into());
    }

    pub fn processed_count(&self) -> usize {
        self.processed_cards.len()
    }
}
