//! Counters for an upload batch

use mail2do_domain::UploadStatus;

/// Outcome counts collected during a batch upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Records written (or that would have been, in a dry run)
    pub created: usize,

    /// Candidates skipped because the title already exists
    pub duplicates: usize,

    /// Candidates skipped because of a fallback title
    pub fallback: usize,

    /// Candidates whose query or write failed
    pub failed: usize,
}

impl UploadSummary {
    /// Create empty counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one resolved status
    pub fn record(&mut self, status: &UploadStatus) {
        match status {
            UploadStatus::Created => self.created += 1,
            UploadStatus::SkippedDuplicate => self.duplicates += 1,
            UploadStatus::SkippedFallbackName => self.fallback += 1,
            UploadStatus::Failed(_) => self.failed += 1,
        }
    }

    /// Candidates seen
    pub fn total(&self) -> usize {
        self.created + self.duplicates + self.fallback + self.failed
    }

    /// Candidates skipped for either reason
    pub fn total_skipped(&self) -> usize {
        self.duplicates + self.fallback
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// One-line report
    pub fn summary(&self) -> String {
        format!(
            "Upload summary: {} candidates, {} created, {} duplicates, {} fallback names, {} failed",
            self.total(),
            self.created,
            self.duplicates,
            self.fallback,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_each_status() {
        let mut summary = UploadSummary::new();
        summary.record(&UploadStatus::Created);
        summary.record(&UploadStatus::Created);
        summary.record(&UploadStatus::SkippedDuplicate);
        summary.record(&UploadStatus::SkippedFallbackName);
        summary.record(&UploadStatus::Failed("boom".to_string()));

        assert_eq!(summary.created, 2);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.total_skipped(), 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_summary_line() {
        let mut summary = UploadSummary::new();
        summary.record(&UploadStatus::Created);
        assert_eq!(
            summary.summary(),
            "Upload summary: 1 candidates, 1 created, 0 duplicates, 0 fallback names, 0 failed"
        );
    }

    #[test]
    fn test_reset() {
        let mut summary = UploadSummary::new();
        summary.record(&UploadStatus::SkippedDuplicate);
        summary.reset();
        assert_eq!(summary, UploadSummary::default());
    }
}
