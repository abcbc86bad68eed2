//! Process-local item table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tk_domain::error::Result;

use crate::backend::{Item, ItemBackend, ItemQuery};

type Table = BTreeMap<(String, String), Item>;

/// In-memory backend keyed by `(partition_key, sort_key)`.
///
/// The `BTreeMap` ordering gives ascending sort-key order within a
/// partition for free.
#[derive(Default)]
pub struct MemoryBackend {
    table: RwLock<Table>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let table = items
            .into_iter()
            .map(|item| ((item.partition_key.clone(), item.sort_key.clone()), item))
            .collect();
        Self {
            table: RwLock::new(table),
        }
    }

    /// All items in key order.
    pub fn snapshot(&self) -> Vec<Item> {
        self.table.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    pub(crate) fn insert(&self, item: Item) {
        self.replace(item);
    }

    /// Swap `item` in under a single write lock, returning what it displaced.
    pub(crate) fn replace(&self, item: Item) -> Option<Item> {
        let key = (item.partition_key.clone(), item.sort_key.clone());
        self.table.write().insert(key, item)
    }

    /// Put `previous` back (or drop the key when `None`) only while the
    /// stored item is still `expected`.  Returns whether anything changed.
    pub(crate) fn restore_if_current(&self, expected: &Item, previous: Option<Item>) -> bool {
        let key = (expected.partition_key.clone(), expected.sort_key.clone());
        let mut table = self.table.write();
        if table.get(&key) != Some(expected) {
            return false;
        }
        match previous {
            Some(prev) => table.insert(key, prev),
            None => table.remove(&key),
        };
        true
    }

    pub(crate) fn remove(&self, partition_key: &str, sort_key: &str) -> Option<Item> {
        self.table
            .write()
            .remove(&(partition_key.to_owned(), sort_key.to_owned()))
    }

    pub(crate) fn select(&self, query: &ItemQuery) -> Vec<Item> {
        let table = self.table.read();
        table
            .range((query.partition_key.clone(), String::new())..)
            .take_while(|((pk, _), _)| *pk == query.partition_key)
            .map(|(_, item)| item)
            .filter(|item| query.matches(item))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ItemBackend for MemoryBackend {
    async fn get_item(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>> {
        Ok(self
            .table
            .read()
            .get(&(partition_key.to_owned(), sort_key.to_owned()))
            .cloned())
    }

    async fn put_item(&self, item: Item) -> Result<()> {
        self.insert(item);
        Ok(())
    }

    async fn query(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        Ok(self.select(query))
    }

    async fn delete_item(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        self.remove(partition_key, sort_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SortKeyCondition;

    #[tokio::test]
    async fn put_overwrites_whole_item() {
        let backend = MemoryBackend::new();
        backend
            .put_item(Item::new("u1", "yamato_1").with("Alias", "gift").with("ShippingFinishFlg", "0"))
            .await
            .unwrap();
        backend
            .put_item(Item::new("u1", "yamato_1").with("ShippingFinishFlg", "1"))
            .await
            .unwrap();

        let item = backend.get_item("u1", "yamato_1").await.unwrap().unwrap();
        assert_eq!(item.attr("ShippingFinishFlg"), Some("1"));
        assert_eq!(item.attr("Alias"), None);
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn query_stays_inside_partition_in_sort_order() {
        let backend = MemoryBackend::from_items([
            Item::new("u1", "yamato_2"),
            Item::new("u0", "yamato_0"),
            Item::new("u1", "sagawa_9"),
            Item::new("u1", "yamato_1"),
            Item::new("u2", "yamato_3"),
        ]);

        let all = backend.query(&ItemQuery::partition("u1")).await.unwrap();
        let keys: Vec<_> = all.iter().map(|i| i.sort_key.as_str()).collect();
        assert_eq!(keys, ["sagawa_9", "yamato_1", "yamato_2"]);

        let yamato = backend
            .query(&ItemQuery::partition("u1").sort_key(SortKeyCondition::BeginsWith("yamato_".into())))
            .await
            .unwrap();
        assert_eq!(yamato.len(), 2);
    }

    #[test]
    fn restore_skips_a_newer_write() {
        let backend = MemoryBackend::new();
        let a = Item::new("u1", "yamato_1").with("Alias", "a");
        let b = Item::new("u1", "yamato_1").with("Alias", "b");
        assert_eq!(backend.replace(a.clone()), None);
        assert_eq!(backend.replace(b.clone()), Some(a.clone()));

        assert!(!backend.restore_if_current(&a, None));
        assert_eq!(backend.snapshot(), vec![b.clone()]);

        assert!(backend.restore_if_current(&b, Some(a.clone())));
        assert_eq!(backend.snapshot(), vec![a]);
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let backend = MemoryBackend::new();
        backend.delete_item("u1", "nope_1").await.unwrap();
        assert!(backend.is_empty());
    }
}
