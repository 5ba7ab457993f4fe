//! Per-item outcome types collected into a batch report.
//!
//! The continue-on-error policy is data, not control flow: every record and
//! attachment ends up in the report, whatever happened to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment pipeline steps that can fail terminally for one attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentStage {
    Upload,
    Sign,
}

/// Record-level steps whose failure skips the whole record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStage {
    Fetch,
    Decode,
}

/// Final state of one attachment part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttachmentOutcome {
    /// Stored, signed, and the webhook accepted the notification
    Delivered { key: String },
    /// Stored, but notification delivery failed. The attachment still
    /// counts as processed; the destination object remains.
    StoredUnnotified { key: String, detail: String },
    /// Filename did not match the extension allow-list
    Skipped,
    /// Upload or signing failed; nothing was notified for this attachment
    Failed { stage: AttachmentStage, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentReport {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: AttachmentOutcome,
}

/// Final state of one event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    Processed { attachments: Vec<AttachmentReport> },
    Skipped { stage: RecordStage, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    pub source_bucket: String,
    pub object_key: String,
    #[serde(flatten)]
    pub status: RecordStatus,
}

/// Aggregate counts for alerting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    pub records: usize,
    pub records_skipped: usize,
    pub attachments_stored: usize,
    pub attachments_delivered: usize,
    pub attachments_skipped: usize,
    pub attachments_failed: usize,
}

/// One invocation's processing result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub totals: BatchTotals,
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            started_at: Utc::now(),
            totals: BatchTotals::default(),
            records: Vec::new(),
        }
    }

    /// Append a record report and fold it into the totals
    pub fn push(&mut self, record: RecordReport) {
        self.totals.records += 1;

        match &record.status {
            RecordStatus::Skipped { .. } => self.totals.records_skipped += 1,
            RecordStatus::Processed { attachments } => {
                for attachment in attachments {
                    match &attachment.outcome {
                        AttachmentOutcome::Delivered { .. } => {
                            self.totals.attachments_stored += 1;
                            self.totals.attachments_delivered += 1;
                        }
                        AttachmentOutcome::StoredUnnotified { .. } => {
                            self.totals.attachments_stored += 1;
                        }
                        AttachmentOutcome::Skipped => self.totals.attachments_skipped += 1,
                        AttachmentOutcome::Failed { .. } => self.totals.attachments_failed += 1,
                    }
                }
            }
        }

        self.records.push(record);
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
