use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;

use super::settings::EngineSettings;
use crate::model::{Achievements, Statistics};
use crate::store::{KeyValueStore, StoreError};

/// What `restore` found for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Restored,
    /// Nothing stored yet; defaults used.
    Missing,
    /// Stored text was not a record; defaults used.
    Malformed,
    /// The store refused the read; defaults used.
    Unavailable,
}

impl RecordStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, RecordStatus::Malformed | RecordStatus::Unavailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub statistics: RecordStatus,
    pub achievements: RecordStatus,
}

impl RestoreReport {
    pub fn has_failures(&self) -> bool {
        self.statistics.is_failure() || self.achievements.is_failure()
    }
}

#[derive(Debug, Clone)]
pub struct RestoredRecords {
    pub statistics: Statistics,
    pub achievements: Achievements,
    pub report: RestoreReport,
}

/// Mirrors the statistics and achievement records into a key/value store.
pub struct StatsManager {
    store: Rc<dyn KeyValueStore>,
    statistics_key: String,
    achievements_key: String,
}

impl StatsManager {
    pub fn new(store: Rc<dyn KeyValueStore>, settings: &EngineSettings) -> Self {
        Self {
            store,
            statistics_key: settings.statistics_key.clone(),
            achievements_key: settings.achievements_key.clone(),
        }
    }

    /// Loads both records independently; a bad record falls back to its
    /// defaults without affecting the other.
    pub fn restore(&self) -> RestoredRecords {
        let (raw_statistics, statistics_status) =
            self.load_record::<Statistics>(&self.statistics_key);
        let statistics = raw_statistics.normalized();
        if statistics != raw_statistics {
            warn!(target: "stats", "Repaired inconsistent statistics record: {:?}", raw_statistics);
        }

        let (achievements, achievements_status) =
            self.load_record::<Achievements>(&self.achievements_key);

        let report = RestoreReport {
            statistics: statistics_status,
            achievements: achievements_status,
        };
        info!(target: "stats", "Restored records: {:?}", report);
        RestoredRecords {
            statistics,
            achievements,
            report,
        }
    }

    fn load_record<T>(&self, key: &str) -> (T, RecordStatus)
    where
        T: DeserializeOwned + Default,
    {
        match self.store.get(key) {
            Ok(Some(contents)) => match serde_json::from_str::<T>(&contents) {
                Ok(record) => (record, RecordStatus::Restored),
                Err(err) => {
                    warn!(target: "stats", "Could not parse {} data: {}", key, err);
                    (T::default(), RecordStatus::Malformed)
                }
            },
            Ok(None) => (T::default(), RecordStatus::Missing),
            Err(err) => {
                warn!(target: "stats", "Could not read {}: {}", key, err);
                (T::default(), RecordStatus::Unavailable)
            }
        }
    }

    fn save_record<T: Serialize>(&self, key: &str, record: &T) -> Result<(), StoreError> {
        let contents = serde_json::to_string(record)?;
        self.store.set(key, &contents)
    }

    /// Writes both records. Both writes are attempted; the first failure is
    /// returned.
    pub fn save(
        &self,
        statistics: &Statistics,
        achievements: &Achievements,
    ) -> Result<(), StoreError> {
        let statistics_result = self.save_record(&self.statistics_key, statistics);
        let achievements_result = self.save_record(&self.achievements_key, achievements);
        statistics_result.and(achievements_result)
    }
}
