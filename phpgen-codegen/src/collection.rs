//! Builders keyed by identity.

use indexmap::IndexMap;

use crate::builder::{FileSpec, Identity};

/// Ordered set of builders keyed by `(namespace, name)`.
///
/// Adding a builder whose identity is already present replaces it in place.
/// Renaming an item through [`BuilderCollection::get_mut`] leaves it under
/// its old key; remove and re-add it instead.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderCollection<T> {
    items: IndexMap<Identity, T>,
}

impl<T> Default for BuilderCollection<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: FileSpec> BuilderCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced builder.
    pub fn add(&mut self, item: T) -> Option<T> {
        self.items.insert(item.identity(), item)
    }

    pub fn remove(&mut self, identity: &Identity) -> Option<T> {
        self.items.shift_remove(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.items.contains_key(identity)
    }

    pub fn get(&self, identity: &Identity) -> Option<&T> {
        self.items.get(identity)
    }

    pub fn get_mut(&mut self, identity: &Identity) -> Option<&mut T> {
        self.items.get_mut(identity)
    }

    /// A new collection with the items matching `predicate`.
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
    {
        self.iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    pub fn retain(&mut self, mut predicate: impl FnMut(&T) -> bool) {
        self.items.retain(|_, item| predicate(item));
    }

    /// Group items by namespace so consecutive items share resolved paths.
    pub fn sort_by_identity(&mut self) {
        self.items.sort_keys();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.items.keys()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: FileSpec> FromIterator<T> for BuilderCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl<T: FileSpec> Extend<T> for BuilderCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T> IntoIterator for BuilderCollection<T> {
    type Item = T;
    type IntoIter = indexmap::map::IntoValues<Identity, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

impl<'a, T> IntoIterator for &'a BuilderCollection<T> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Values<'a, Identity, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassBuilder, FileBuilder, InterfaceBuilder};

    fn class(namespace: &str, name: &str) -> ClassBuilder {
        let mut class = ClassBuilder::from_scratch(name);
        class.set_namespace(namespace);
        class
    }

    #[test]
    fn test_same_identity_replaces() {
        let mut collection = BuilderCollection::new();
        assert!(collection.add(class("App", "User")).is_none());
        collection.add(class("App", "Post"));

        let mut user = class("App", "User");
        user.set_final(true);
        let replaced = collection.add(user).unwrap();
        assert!(!replaced.is_final());

        let names: Vec<_> = collection.iter().map(|c| c.name().unwrap()).collect();
        assert_eq!(names, vec!["User", "Post"]);
        assert!(collection.get(&class("App", "User").identity()).unwrap().is_final());
    }

    #[test]
    fn test_namespace_is_part_of_identity() {
        let collection: BuilderCollection<_> =
            [class("App", "User"), class("Admin", "User")].into_iter().collect();
        assert_eq!(collection.len(), 2);
        assert!(collection.contains(&class("Admin", "User").identity()));
        assert!(!collection.contains(&class("", "User").identity()));
    }

    #[test]
    fn test_filter_remove_and_sort() {
        let mut collection: BuilderCollection<FileBuilder> = [
            FileBuilder::from(class("B", "Two")),
            InterfaceBuilder::from_scratch("Named").into(),
            class("A", "One").into(),
        ]
        .into_iter()
        .collect();

        let classes = collection.filter(|item| matches!(item, FileBuilder::Class(_)));
        assert_eq!(classes.len(), 2);

        collection.sort_by_identity();
        let order: Vec<String> = collection.identities().map(ToString::to_string).collect();
        assert_eq!(order, vec!["Named", "A\\One", "B\\Two"]);

        let named = InterfaceBuilder::from_scratch("Named").identity();
        assert!(collection.remove(&named).is_some());
        assert!(collection.remove(&named).is_none());
        assert_eq!(collection.len(), 2);
    }
}
