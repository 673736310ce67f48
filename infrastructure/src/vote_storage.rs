//! Local record of which bills this device has voted on.
//!
//! All votes live in one JSON object under [`STORAGE_KEY`], mapping the bill
//! id as a string to `{"choice": "agree"|"disagree", "timestamp": <ms>}`.
//! Reads never fail: a missing, unreadable or corrupt blob counts as empty.

use domain::error::StoreError;
use domain::store::KeyValueStore;
use domain::vote::{VoteChoice, VoteRecord, VoteStatus};
use serde_json::Value;
use shared::utils::now_millis;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

pub const STORAGE_KEY: &str = "na_itssu_votes";

pub type StoredVotes = BTreeMap<String, VoteRecord>;

#[derive(Clone)]
pub struct VoteGuard {
    store: Arc<dyn KeyValueStore>,
}

impl VoteGuard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get_vote_status(&self, bill_id: i64) -> VoteStatus {
        match self.load().get(&bill_id.to_string()) {
            Some(record) => VoteStatus::voted(record.choice),
            None => VoteStatus::not_voted(),
        }
    }

    /// Records a vote the backend has already accepted. Last write wins.
    pub fn set_vote_status(&self, bill_id: i64, choice: VoteChoice) -> Result<(), StoreError> {
        let mut votes = self.load();
        votes.insert(
            bill_id.to_string(),
            VoteRecord {
                choice,
                timestamp: now_millis(),
            },
        );
        self.save(&votes)?;
        info!(bill_id, %choice, "vote recorded locally");
        Ok(())
    }

    pub fn clear(&self, bill_id: i64) -> Result<bool, StoreError> {
        let mut votes = self.load();
        let removed = votes.remove(&bill_id.to_string()).is_some();
        if removed {
            self.save(&votes)?;
        }
        Ok(removed)
    }

    pub fn all(&self) -> StoredVotes {
        self.load()
    }

    fn load(&self) -> StoredVotes {
        match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => safe_parse(&raw),
            Ok(None) => StoredVotes::new(),
            Err(err) => {
                warn!(error = %err, "vote storage unreadable, treating as empty");
                StoredVotes::new()
            }
        }
    }

    fn save(&self, votes: &StoredVotes) -> Result<(), StoreError> {
        let json = serde_json::to_string(votes)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.store.set(STORAGE_KEY, &json)
    }
}

/// Keeps every entry that parses as a record; anything else is skipped.
fn safe_parse(raw: &str) -> StoredVotes {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "corrupt vote storage, treating as empty");
            return StoredVotes::new();
        }
    };
    let Value::Object(entries) = value else {
        warn!("vote storage is not an object, treating as empty");
        return StoredVotes::new();
    };
    entries
        .into_iter()
        .filter_map(|(bill_id, entry)| {
            serde_json::from_value::<VoteRecord>(entry)
                .ok()
                .map(|record| (bill_id, record))
        })
        .collect()
}
