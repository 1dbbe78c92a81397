use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::{
    merge::Import,
    model::{ConstSpec, MethodSpec, PropertySpec, name_key},
};

/// An item stored in a [`MemberMap`], identified by name.
pub trait Keyed {
    fn name(&self) -> &str;

    /// Map key for `name`; names that PHP treats as equal share a key.
    fn key_of(name: &str) -> String {
        name.to_string()
    }
}

impl Keyed for ConstSpec {
    fn name(&self) -> &str {
        ConstSpec::name(self)
    }
}

impl Keyed for PropertySpec {
    fn name(&self) -> &str {
        PropertySpec::name(self)
    }
}

impl Keyed for MethodSpec {
    fn name(&self) -> &str {
        MethodSpec::name(self)
    }

    fn key_of(name: &str) -> String {
        name.to_ascii_lowercase()
    }
}

/// Class and interface names.
impl Keyed for String {
    fn name(&self) -> &str {
        self
    }

    fn key_of(name: &str) -> String {
        name_key(name)
    }
}

impl Keyed for Import {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_of(name: &str) -> String {
        name_key(name)
    }
}

/// Insertion-ordered items keyed by name.
///
/// [`MemberMap::add`] is an upsert: an item with a known name replaces the
/// old one in place. [`MemberMap::set`] replaces everything.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberMap<T> {
    items: IndexMap<String, T>,
}

impl<T> Default for MemberMap<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: Keyed> MemberMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced item.
    pub fn add(&mut self, item: T) -> Option<T> {
        self.items.insert(T::key_of(item.name()), item)
    }

    pub fn set(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        for item in items {
            self.add(item);
        }
    }

    /// Remove by name; absent names are ignored.
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.items.shift_remove(&T::key_of(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(&T::key_of(name))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(&T::key_of(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.get_mut(&T::key_of(name))
    }

    /// Stable sort with the given comparator.
    pub fn sort_by(&mut self, mut cmp: impl FnMut(&T, &T) -> Ordering) {
        self.items.sort_by(|_, a, _, b| cmp(a, b));
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Item names in order, as given.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|item| item.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Keyed> FromIterator<T> for MemberMap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut map = Self::new();
        map.set(iter);
        map
    }
}
