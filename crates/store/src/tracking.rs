//! Tracking-record view over an [`ItemBackend`].
//!
//! Partition key = user id, sort key = `"<carrier>_<number>"`.  Item
//! attributes: `ShippingFinishFlg` (`"0"`/`"1"`), `Alias`, `UpdatedAt`.
//!
//! Failure policy: reads degrade to "no results" and say so through
//! [`ReadOutcome`]; `put` returns the error; `delete` logs it.

use std::sync::Arc;

use chrono::Utc;
use tk_domain::error::Result;
use tk_domain::trace::TraceEvent;
use tk_domain::tracking::{carrier_prefix, CompletionFlag, TrackingRecord};

use crate::backend::{Item, ItemBackend, ItemQuery, SortKeyCondition};
use crate::outcome::ReadOutcome;

pub const ATTR_FLAG: &str = "ShippingFinishFlg";
pub const ATTR_ALIAS: &str = "Alias";
pub const ATTR_UPDATED_AT: &str = "UpdatedAt";

/// Tracking persistence.  Constructed once at startup and shared.
#[derive(Clone)]
pub struct TrackingStore {
    backend: Arc<dyn ItemBackend>,
    table: String,
}

impl TrackingStore {
    pub fn new(backend: Arc<dyn ItemBackend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Point lookup.  `Fresh(None)` means not stored.
    pub async fn get(&self, user_id: &str, sort_key: &str) -> ReadOutcome<Option<TrackingRecord>> {
        match self.backend.get_item(user_id, sort_key).await {
            Ok(item) => ReadOutcome::Fresh(item.map(record_from_item)),
            Err(e) => self.degraded("get", user_id, e.to_string()),
        }
    }

    /// Full overwrite of flag and alias.  `alias = ""` clears it.
    pub async fn put(
        &self,
        user_id: &str,
        sort_key: &str,
        flag: CompletionFlag,
        alias: &str,
    ) -> Result<()> {
        let item = Item::new(user_id, sort_key)
            .with(ATTR_FLAG, flag.as_str())
            .with(ATTR_ALIAS, alias)
            .with(ATTR_UPDATED_AT, Utc::now().format("%Y-%m-%d").to_string());

        match self.backend.put_item(item).await {
            Ok(()) => {
                TraceEvent::TrackingWritten {
                    user_id: user_id.to_owned(),
                    sort_key: sort_key.to_owned(),
                    flag: flag.as_str().to_owned(),
                    has_alias: !alias.is_empty(),
                }
                .emit();
                Ok(())
            }
            Err(e) => {
                TraceEvent::TrackingWriteFailed {
                    user_id: user_id.to_owned(),
                    sort_key: sort_key.to_owned(),
                    error: e.to_string(),
                }
                .emit();
                Err(e)
            }
        }
    }

    /// Every record filed under `carrier`, any flag.
    pub async fn query_by_carrier_prefix(
        &self,
        user_id: &str,
        carrier: &str,
    ) -> ReadOutcome<Vec<TrackingRecord>> {
        let query = ItemQuery::partition(user_id)
            .sort_key(SortKeyCondition::BeginsWith(carrier_prefix(carrier)));
        self.run_query("query_by_carrier_prefix", user_id, &query).await
    }

    /// Exact key match that also carries `flag`.  Empty when the record is
    /// missing or has the other flag.
    pub async fn query_by_key_and_flag(
        &self,
        user_id: &str,
        sort_key: &str,
        flag: CompletionFlag,
    ) -> ReadOutcome<Vec<TrackingRecord>> {
        let query = ItemQuery::partition(user_id)
            .sort_key(SortKeyCondition::Equals(sort_key.to_owned()))
            .filter_eq(ATTR_FLAG, flag.as_str());
        self.run_query("query_by_key_and_flag", user_id, &query).await
    }

    /// All pending records for the user across carriers, in sort-key order.
    pub async fn query_all_pending(&self, user_id: &str) -> ReadOutcome<Vec<TrackingRecord>> {
        let query = ItemQuery::partition(user_id).filter_eq(ATTR_FLAG, CompletionFlag::Pending.as_str());
        self.run_query("query_all_pending", user_id, &query).await
    }

    /// Flush the backend; called once on shutdown.
    pub async fn flush(&self) -> Result<()> {
        self.backend.flush().await
    }

    /// Best-effort delete.  Errors are logged, never returned.
    pub async fn delete(&self, user_id: &str, sort_key: &str) {
        match self.backend.delete_item(user_id, sort_key).await {
            Ok(()) => TraceEvent::TrackingDeleted {
                user_id: user_id.to_owned(),
                sort_key: sort_key.to_owned(),
            }
            .emit(),
            Err(e) => tracing::warn!(
                user_id = %user_id,
                sort_key = %sort_key,
                error = %e,
                "tracking delete failed"
            ),
        }
    }

    async fn run_query(
        &self,
        operation: &str,
        user_id: &str,
        query: &ItemQuery,
    ) -> ReadOutcome<Vec<TrackingRecord>> {
        match self.backend.query(query).await {
            Ok(items) => ReadOutcome::Fresh(items.into_iter().map(record_from_item).collect()),
            Err(e) => self.degraded(operation, user_id, e.to_string()),
        }
    }

    fn degraded<T: Default>(&self, operation: &str, user_id: &str, reason: String) -> ReadOutcome<T> {
        tracing::warn!(
            table = %self.table,
            operation,
            user_id = %user_id,
            error = %reason,
            "store read failed, answering with empty result"
        );
        TraceEvent::StoreReadDegraded {
            operation: operation.to_owned(),
            user_id: user_id.to_owned(),
            reason: reason.clone(),
        }
        .emit();
        ReadOutcome::degraded(reason)
    }
}

fn record_from_item(item: Item) -> TrackingRecord {
    let flag = match item.attr(ATTR_FLAG) {
        Some(raw) => CompletionFlag::parse(raw).unwrap_or_else(|| {
            tracing::warn!(sort_key = %item.sort_key, flag = raw, "unknown completion flag, reading as pending");
            CompletionFlag::Pending
        }),
        None => CompletionFlag::Pending,
    };
    TrackingRecord {
        alias: item.attr(ATTR_ALIAS).unwrap_or_default().to_owned(),
        updated_at: item.attr(ATTR_UPDATED_AT).map(str::to_owned),
        flag,
        user_id: item.partition_key,
        sort_key: item.sort_key,
    }
}
