//! Publish summary and reporting

use crate::domain::SampleId;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome of one publish run
#[derive(Debug, Clone)]
pub struct PublishSummary {
    /// Patients visited
    pub total_patients: usize,

    /// Samples visited, skipped ones included
    pub total_samples: usize,

    /// Documents written to the cache (or that would have been, in a dry run)
    pub published: usize,

    /// Samples left out because they had no rows
    pub skipped: Vec<SampleId>,

    /// True if no cache writes were issued
    pub dry_run: bool,

    /// True if a shutdown signal stopped the run early
    pub interrupted: bool,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl PublishSummary {
    /// Create an empty summary starting now
    pub fn new(dry_run: bool) -> Self {
        Self {
            total_patients: 0,
            total_samples: 0,
            published: 0,
            skipped: Vec::new(),
            dry_run,
            interrupted: false,
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a skipped sample
    pub fn add_skipped(&mut self, sample: SampleId) {
        self.skipped.push(sample);
    }

    /// True if the run visited every patient
    pub fn is_complete(&self) -> bool {
        !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_patients = self.total_patients,
            total_samples = self.total_samples,
            published = self.published,
            skipped = self.skipped.len(),
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            started_at = %self.started_at.to_rfc3339(),
            duration_ms = self.duration.as_millis() as u64,
            "Publish completed"
        );

        for sample in &self.skipped {
            tracing::warn!(sample = %sample, "Sample skipped: no attribute rows");
        }

        if self.interrupted {
            tracing::warn!("Publish was interrupted before all patients were visited");
        }
    }
}

impl Default for PublishSummary {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary() {
        let summary = PublishSummary::new(true);
        assert!(summary.dry_run);
        assert!(summary.is_complete());
        assert_eq!(summary.published, 0);
        assert!(summary.skipped.is_empty());
    }

    #[test]
    fn test_with_duration_and_skipped() {
        let mut summary = PublishSummary::default().with_duration(Duration::from_millis(1500));
        summary.add_skipped(SampleId::new("S4").unwrap());

        assert_eq!(summary.duration, Duration::from_millis(1500));
        assert_eq!(summary.skipped, vec![SampleId::new("S4").unwrap()]);
    }
}
