//! Partition/sort-key item store abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tk_domain::error::Result;

/// One stored item: two key strings plus flat string attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub partition_key: String,
    pub sort_key: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Item {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_owned(), value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Condition applied to the sort key within one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyCondition {
    Any,
    Equals(String),
    BeginsWith(String),
}

impl SortKeyCondition {
    pub fn matches(&self, sort_key: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Equals(k) => sort_key == k,
            Self::BeginsWith(prefix) => sort_key.starts_with(prefix.as_str()),
        }
    }
}

/// A query over a single partition.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub partition_key: String,
    pub sort_key: SortKeyCondition,
    /// `(attribute, value)` equality filter applied after the key condition.
    pub filter: Option<(String, String)>,
}

impl ItemQuery {
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: SortKeyCondition::Any,
            filter: None,
        }
    }

    pub fn sort_key(mut self, condition: SortKeyCondition) -> Self {
        self.sort_key = condition;
        self
    }

    pub fn filter_eq(mut self, attribute: &str, value: impl Into<String>) -> Self {
        self.filter = Some((attribute.to_owned(), value.into()));
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        if item.partition_key != self.partition_key || !self.sort_key.matches(&item.sort_key) {
            return false;
        }
        match &self.filter {
            Some((name, value)) => item.attr(name) == Some(value.as_str()),
            None => true,
        }
    }
}

/// Generic partition/sort-key store.
///
/// Writes are atomic per item.  `put_item` replaces the whole item.
/// `query` returns matches in ascending sort-key order.
#[async_trait]
pub trait ItemBackend: Send + Sync {
    async fn get_item(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>>;

    async fn put_item(&self, item: Item) -> Result<()>;

    async fn query(&self, query: &ItemQuery) -> Result<Vec<Item>>;

    async fn delete_item(&self, partition_key: &str, sort_key: &str) -> Result<()>;

    /// Push buffered state to durable storage.  No-op for volatile backends.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
