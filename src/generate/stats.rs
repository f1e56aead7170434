//! Generation statistics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics from one generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Descriptor files written or rewritten
    pub descriptors_written: usize,
    /// Descriptor files already up to date
    pub descriptors_unchanged: usize,
    /// License keys served from the reference library
    pub licenses_reused: usize,
    /// License keys served by the license provider
    pub licenses_fetched: usize,
    /// License keys with no text available
    pub licenses_missing: usize,
    /// License text files written or rewritten
    pub license_files_written: usize,
    /// Notice files written or rewritten
    pub notices_written: usize,
    /// Records that could not be placed and were not written
    pub records_skipped: usize,
    /// Duration of the generation
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl GenerationStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records considered (written, unchanged or skipped)
    #[must_use]
    pub const fn records_seen(&self) -> usize {
        self.descriptors_written + self.descriptors_unchanged + self.records_skipped
    }

    /// Log a summary of the generation run
    pub fn log_summary(&self) {
        tracing::info!(
            "Generation complete: {} records, {} descriptors written ({} unchanged), \
             {} licenses reused, {} fetched, {} missing, {} license files and {} notices \
             written, {} records skipped in {:?}",
            self.records_seen(),
            self.descriptors_written,
            self.descriptors_unchanged,
            self.licenses_reused,
            self.licenses_fetched,
            self.licenses_missing,
            self.license_files_written,
            self.notices_written,
            self.records_skipped,
            self.duration
        );
    }

}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
