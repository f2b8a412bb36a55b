//! Ordered, identifier-unique sequence of records of one kind.
//!
//! A [`Collection`] is the storage primitive behind every entity kind. It
//! keeps records in append order; removing one shifts the records after it.
//! Lookups are linear scans. Index-based operations are bounds-checked and
//! report a miss through `Option` instead of panicking.

use std::collections::HashSet;

use rendezvous_types::Record;

use crate::error::StoreError;

/// Append-ordered records of a single kind with unique identifiers.
#[derive(Debug, Clone)]
pub struct Collection<R: Record> {
    records: Vec<R>,
}

impl<R: Record> Collection<R> {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Build a collection from existing records, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two records share an identifier.
    pub fn from_records(records: Vec<R>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(StoreError::duplicate::<R>(record.id()));
            }
        }
        Ok(Self { records })
    }

    /// The full ordered sequence.
    pub fn list(&self) -> &[R] {
        &self.records
    }

    /// Iterate over the records in order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the record with the given identifier.
    pub fn position(&self, id: &R::Id) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// The record with the given identifier, if present.
    pub fn find_by_id(&self, id: &R::Id) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Whether a record with the given identifier is present.
    pub fn contains(&self, id: &R::Id) -> bool {
        self.find_by_id(id).is_some()
    }

    /// The record at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    /// Append a record at the end.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the identifier is already taken;
    /// the collection is left unchanged.
    pub fn append(&mut self, record: R) -> Result<(), StoreError> {
        if self.contains(record.id()) {
            return Err(StoreError::duplicate::<R>(record.id()));
        }
        self.records.push(record);
        Ok(())
    }

    /// Remove and return the record at `index`, shifting later records down.
    pub fn remove_at(&mut self, index: usize) -> Option<R> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Replace the record at `index` in place, returning the previous value.
    pub fn replace_at(&mut self, index: usize, record: R) -> Option<R> {
        self.records
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, record))
    }

    /// Remove every record, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rendezvous_types::{User, UserId};

    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: UserId::new(id),
            username: name.to_owned(),
            email: format!("{name}@example.com"),
        }
    }

    fn names(collection: &Collection<User>) -> Vec<&str> {
        collection.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut users = Collection::new();
        users.append(user("1", "ann")).unwrap();
        users.append(user("2", "bob")).unwrap();
        users.append(user("3", "cid")).unwrap();
        assert_eq!(names(&users), ["ann", "bob", "cid"]);
        assert_eq!(users.position(&UserId::new("2")), Some(1));
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let mut users = Collection::new();
        users.append(user("1", "ann")).unwrap();
        let err = users.append(user("1", "imposter")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));
        assert_eq!(users.len(), 1);
        assert_eq!(users.find_by_id(&UserId::new("1")).unwrap().username, "ann");
    }

    #[test]
    fn remove_shifts_following_records() {
        let mut users = Collection::from_records(vec![
            user("1", "ann"),
            user("2", "bob"),
            user("3", "cid"),
        ])
        .unwrap();
        let removed = users.remove_at(0).unwrap();
        assert_eq!(removed.username, "ann");
        assert_eq!(names(&users), ["bob", "cid"]);
        assert_eq!(users.position(&UserId::new("3")), Some(1));
    }

    #[test]
    fn out_of_bounds_index_operations_return_none() {
        let mut users: Collection<User> = Collection::new();
        assert!(users.remove_at(0).is_none());
        assert!(users.replace_at(3, user("9", "zed")).is_none());
        assert!(users.get(0).is_none());
        assert!(users.is_empty());
    }

    #[test]
    fn replace_preserves_position() {
        let mut users =
            Collection::from_records(vec![user("1", "ann"), user("2", "bob")]).unwrap();
        let previous = users.replace_at(0, user("1", "annie")).unwrap();
        assert_eq!(previous.username, "ann");
        assert_eq!(names(&users), ["annie", "bob"]);
    }

    #[test]
    fn clear_reports_removed_count() {
        let mut users =
            Collection::from_records(vec![user("1", "ann"), user("2", "bob")]).unwrap();
        assert_eq!(users.clear(), 2);
        assert_eq!(users.clear(), 0);
    }

    #[test]
    fn from_records_rejects_duplicates() {
        let result = Collection::from_records(vec![user("1", "ann"), user("1", "bob")]);
        assert!(result.is_err());
    }
}
