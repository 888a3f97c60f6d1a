// 5.0: in-memory position and order collections.
// newest first. lookups are linear, the lists hold tens of entries at most.

use crate::order::Order;
use crate::position::Position;
use crate::types::{OrderId, PositionId};
use serde::{Deserialize, Serialize};

pub trait Keyed {
    type Id: Copy + PartialEq;

    fn key(&self) -> Self::Id;
}

impl Keyed for Position {
    type Id = PositionId;

    fn key(&self) -> PositionId {
        self.id
    }
}

impl Keyed for Order {
    type Id = OrderId;

    fn key(&self) -> OrderId {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordList<T> {
    items: Vec<T>,
}

impl<T> Default for RecordList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> RecordList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // 5.1: newest goes to the head
    pub fn prepend(&mut self, item: T) {
        debug_assert!(
            self.get(item.key()).is_none(),
            "record ids must be unique"
        );
        self.items.insert(0, item);
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.get(id).is_some()
    }

    // swaps the record in place so list order is kept. returns the old one
    pub fn replace(&mut self, item: T) -> Option<T> {
        let slot = self.items.iter_mut().find(|existing| existing.key() == item.key())?;
        Some(std::mem::replace(slot, item))
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == id)?;
        Some(self.items.remove(index))
    }

    // 5.2: bulk clear, returns what was dropped
    pub fn clear(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub type PositionStore = RecordList<Position>;
pub type OrderStore = RecordList<Order>;
