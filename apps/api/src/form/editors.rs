//! Append-only indexed record collections backing the CV editors.
//!
//! Each slot holds an `Arc<T>`. Updating a slot swaps in a fresh `Arc` for
//! that index only; every sibling keeps its identity, so change detection can
//! compare slots with `Arc::ptr_eq` instead of deep equality.

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{collection} has no record at index {index} (len {len})")]
    IndexOutOfBounds {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{collection} records have no repeatable sub-items")]
    NoSubItems { collection: &'static str },

    #[error("{collection} records have no field '{field}'")]
    FieldNotInCollection {
        collection: &'static str,
        field: &'static str,
    },

    #[error("{collection} is not a plain text list")]
    NotATextList { collection: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordList<T> {
    name: &'static str,
    slots: Vec<Arc<T>>,
}

impl<T: Clone + Default> RecordList<T> {
    /// A list seeded with one default row, so the editor always has a row to show.
    pub fn seeded(name: &'static str) -> Self {
        Self {
            name,
            slots: vec![Arc::new(T::default())],
        }
    }

    /// Appends a default record and returns its index.
    pub fn append(&mut self) -> usize {
        self.slots.push(Arc::new(T::default()));
        self.slots.len() - 1
    }

    /// Copy-on-write update of one slot.
    pub fn update_at<F>(&mut self, index: usize, edit: F) -> Result<(), FormError>
    where
        F: FnOnce(&mut T) -> Result<(), FormError>,
    {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(FormError::IndexOutOfBounds {
                collection: self.name,
                index,
                len,
            })?;

        let mut next = (**slot).clone();
        edit(&mut next)?;
        *slot = Arc::new(next);
        Ok(())
    }
}

impl<T> RecordList<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|slot| slot.as_ref())
    }

    /// Owned snapshot of every record, in insertion order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}
