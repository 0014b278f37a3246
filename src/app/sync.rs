//! Local copies of server-owned lists.
//!
//! Every list screen holds a [`SyncedList`] populated from one GET and patched
//! only after the backend confirms a mutation. Free-text entries that are
//! staged before a save (shopping list lines, allergies, generator inputs)
//! live in a [`ChipSet`].

use std::{collections::HashMap, hash::Hash};

use itertools::Itertools;

use super::backend::{Allergy, Bookmark, Comment, Failure, Outcome, Post, Recipe};

/// Server-assigned identity of a list entry.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Post {
    fn key(&self) -> &str {
        &self.smid
    }
}

impl Keyed for Recipe {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Comment {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Bookmark {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Allergy {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedList<T> {
    items: Vec<T>,
}

impl<T> Default for SyncedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed + Clone> SyncedList<T> {
    pub fn from_server(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Appends `item`, or replaces the entry already carrying its key.
    pub fn append(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.key() == item.key()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Removes the entry with `key`, leaving every other entry in order.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == key)?;
        Some(self.items.remove(index))
    }

    /// Applies `patch` to the entry with `key`. Returns whether it existed.
    pub fn update(&mut self, key: &str, patch: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.key() == key) {
            Some(item) => {
                patch(item);
                true
            }
            None => false,
        }
    }

    /// Confirm-then-patch: runs `patch` with the confirmed value only when
    /// `outcome` is a success, otherwise leaves the list untouched.
    pub fn commit<R>(
        &mut self,
        outcome: Outcome<R>,
        patch: impl FnOnce(&mut Self, R),
    ) -> Result<(), Failure> {
        let confirmed = outcome.into_result()?;
        patch(self, confirmed);
        Ok(())
    }

    pub fn filtered(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.items.iter().filter(|item| keep(item)).cloned().collect()
    }
}

/// Ordered set of trimmed, non-blank text entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipSet {
    chips: Vec<String>,
}

impl ChipSet {
    pub fn from_saved(items: Vec<String>) -> Self {
        let mut set = Self::default();
        for item in items {
            set.insert(&item);
        }
        set
    }

    /// Adds `text` unless it is blank or already present. Returns whether it
    /// was added.
    pub fn insert(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.contains(text) {
            return false;
        }
        self.chips.push(text.to_string());
        true
    }

    pub fn remove(&mut self, text: &str) -> bool {
        let before = self.chips.len();
        self.chips.retain(|chip| chip != text.trim());
        self.chips.len() != before
    }

    /// Case-insensitive, so "Soy" and "soy" are one entry.
    pub fn contains(&self, text: &str) -> bool {
        let text = text.trim();
        self.chips.iter().any(|chip| chip.eq_ignore_ascii_case(text))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.chips
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.chips.clone()
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn clear(&mut self) {
        self.chips.clear();
    }
}

/// Shopping list editor state: the last list the backend confirmed and the
/// draft being edited on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingDraft {
    saved: Vec<String>,
    draft: ChipSet,
}

impl ShoppingDraft {
    pub fn from_saved(saved: Vec<String>) -> Self {
        Self {
            draft: ChipSet::from_saved(saved.clone()),
            saved,
        }
    }

    pub fn draft(&self) -> &ChipSet {
        &self.draft
    }

    pub fn add(&mut self, text: &str) -> bool {
        self.draft.insert(text)
    }

    pub fn remove(&mut self, text: &str) -> bool {
        self.draft.remove(text)
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.as_slice() != self.saved.as_slice()
    }

    /// Marks the draft as saved once the backend accepted it.
    pub fn confirm_saved(&mut self) {
        self.saved = self.draft.to_vec();
    }
}

/// Stages `text` as a new allergy unless it is already saved or staged.
pub fn stage_allergy(saved: &SyncedList<Allergy>, staged: &mut ChipSet, text: &str) -> bool {
    let text = text.trim();
    let already_saved = saved
        .items()
        .iter()
        .any(|allergy| allergy.ingredient.trim().eq_ignore_ascii_case(text));
    !already_saved && staged.insert(text)
}

/// Pairs every item with a render key that stays unique when several items
/// share the same `identity`: repeats get an increasing occurrence number.
pub fn with_occurrence<T, K>(items: Vec<T>, identity: impl Fn(&T) -> K) -> Vec<((K, usize), T)>
where
    K: Eq + Hash + Clone,
{
    let mut seen: HashMap<K, usize> = HashMap::new();
    items
        .into_iter()
        .map(|item| {
            let key = identity(&item);
            let count = seen.entry(key.clone()).or_default();
            let occurrence = *count;
            *count += 1;
            ((key, occurrence), item)
        })
        .collect()
}

/// Distinct cuisine tags in a recipe list, sorted for a filter dropdown.
pub fn cuisines<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> Vec<String> {
    recipes
        .into_iter()
        .filter_map(|recipe| recipe.cuisine.as_deref())
        .map(str::trim)
        .filter(|cuisine| !cuisine.is_empty())
        .unique_by(|cuisine| cuisine.to_lowercase())
        .map(str::to_string)
        .sorted_by_key(|cuisine| cuisine.to_lowercase())
        .collect()
}

/// First `max_lines` lines of `content`, with a marker when cut.
pub fn truncate_content(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }

    format!("{}\n.....", lines[..max_lines].join("\n"))
}

pub fn like_label(likes: u32) -> String {
    match likes {
        1 => "1 Like".to_string(),
        n => format!("{n} Likes"),
    }
}
