//! Batch processor: retrieval -> MIME decode -> filter -> per-attachment
//! upload, link signing, and webhook notification.
//!
//! Failure isolation is the contract here. A fetch or decode failure skips
//! one record; an upload or signing failure skips one attachment; nothing
//! ever aborts the batch. All skips and failures land in the
//! [`BatchReport`] and in the log stream.

mod report;

pub use report::{
    AttachmentOutcome, AttachmentReport, AttachmentStage, BatchReport, BatchTotals, RecordReport,
    RecordStage, RecordStatus,
};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, StorageProvider};
use crate::event::EventRecord;
use crate::filter::ExtensionFilter;
use crate::mime::{AttachmentPart, EnvelopeDecoder, MailDecoder};
use crate::observability::Metrics;
use crate::storage::sign::{LinkSigner, LocalLinkSigner, S3LinkSigner};
use crate::storage::{self, MemorySources, S3Sources, SourceFetcher, StorageClient, StorageError};
use crate::webhook::{HttpNotifier, Notifier, NotifyError};

/// Destination key prefix for extracted attachments
pub const DEST_PREFIX: &str = "attachments";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Destination bucket not configured")]
    MissingBucket,

    #[error("Storage setup failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Webhook setup failed: {0}")]
    Webhook(#[from] NotifyError),
}

/// Destination key for an extracted attachment
///
/// Pure function of the filename; original case is preserved and there is
/// no collision handling. Identical filenames overwrite each other, which
/// is accepted behavior.
pub fn destination_key(filename: &str) -> String {
    format!("{DEST_PREFIX}/{filename}")
}

/// Directory marker forwarded to the webhook for downstream routing
///
/// The parent path of the object key, where an empty parent, ".", or the
/// literal "root" all normalize to "/".
pub fn dir_marker(object_key: &str) -> String {
    let parent = match object_key.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    };

    if parent.is_empty() || parent == "." || parent == "root" {
        "/".to_string()
    } else {
        parent.to_string()
    }
}

/// Batch processor with injected collaborators
pub struct Pipeline {
    sources: Arc<dyn SourceFetcher>,
    destination: StorageClient,
    signer: Arc<dyn LinkSigner>,
    decoder: Arc<dyn EnvelopeDecoder>,
    notifier: Arc<dyn Notifier>,
    filter: ExtensionFilter,
    link_ttl: Duration,
    metrics: Arc<Metrics>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sources: Arc<dyn SourceFetcher>,
        destination: StorageClient,
        signer: Arc<dyn LinkSigner>,
        decoder: Arc<dyn EnvelopeDecoder>,
        notifier: Arc<dyn Notifier>,
        filter: ExtensionFilter,
        link_ttl: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            sources,
            destination,
            signer,
            decoder,
            notifier,
            filter,
            link_ttl,
            metrics,
        }
    }

    /// Wire up the production pipeline from validated configuration
    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> Result<Self, BootstrapError> {
        let bucket = config
            .storage
            .bucket
            .as_deref()
            .ok_or(BootstrapError::MissingBucket)?;

        let (sources, destination, signer): (
            Arc<dyn SourceFetcher>,
            StorageClient,
            Arc<dyn LinkSigner>,
        ) = match config.storage.provider {
            StorageProvider::S3 => {
                let store = Arc::new(storage::build_s3(&config.storage, bucket)?);
                (
                    Arc::new(S3Sources::new(config.storage.clone())),
                    StorageClient::new(store.clone(), bucket.to_string()),
                    Arc::new(S3LinkSigner::new(store)),
                )
            }
            StorageProvider::Local => (
                Arc::new(MemorySources::new()),
                StorageClient::in_memory(bucket),
                Arc::new(LocalLinkSigner::new(bucket)),
            ),
        };

        let notifier = Arc::new(HttpNotifier::from_config(&config.webhook)?);

        Ok(Self::new(
            sources,
            destination,
            signer,
            Arc::new(MailDecoder::new()),
            notifier,
            ExtensionFilter::new(&config.filter.extensions),
            Duration::from_secs(config.links.ttl_secs),
            metrics,
        ))
    }

    /// Process one batch of event records sequentially
    ///
    /// Always returns a report; per-item failures are entries in it.
    pub async fn run(&self, records: Vec<EventRecord>) -> BatchReport {
        let mut report = BatchReport::new();

        for record in records {
            let status = self.process_record(&record).await;
            report.push(RecordReport {
                source_bucket: record.source_bucket,
                object_key: record.object_key,
                status,
            });
        }

        info!(
            batch_id = %report.batch_id,
            records = report.totals.records,
            stored = report.totals.attachments_stored,
            delivered = report.totals.attachments_delivered,
            "Batch complete"
        );

        report
    }

    async fn process_record(&self, record: &EventRecord) -> RecordStatus {
        let bucket = record.source_bucket.as_str();
        let key = record.object_key.as_str();

        let raw = match self.sources.fetch(bucket, key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(bucket, key, error = %e, "Fetch failed, skipping record");
                self.metrics.record_skipped();
                return RecordStatus::Skipped {
                    stage: RecordStage::Fetch,
                    detail: e.to_string(),
                };
            }
        };

        let envelope = match self.decoder.decode(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(bucket, key, error = %e, "MIME decode failed, skipping record");
                self.metrics.record_skipped();
                return RecordStatus::Skipped {
                    stage: RecordStage::Decode,
                    detail: e.to_string(),
                };
            }
        };

        // Computed once per record, shared by all its attachments
        let rm_dir = dir_marker(key);

        let mut attachments = Vec::with_capacity(envelope.attachments.len());
        for part in &envelope.attachments {
            let outcome = if self.filter.qualifies(&part.filename) {
                self.process_attachment(part, &rm_dir).await
            } else {
                AttachmentOutcome::Skipped
            };

            attachments.push(AttachmentReport {
                filename: part.filename.clone(),
                outcome,
            });
        }

        self.metrics.record_processed();

        RecordStatus::Processed { attachments }
    }

    /// Upload -> sign -> notify for one qualifying attachment
    ///
    /// Each step only runs if the previous one succeeded; a notify failure
    /// still leaves the attachment processed (stored, no rollback).
    async fn process_attachment(&self, part: &AttachmentPart, rm_dir: &str) -> AttachmentOutcome {
        let key = destination_key(&part.filename);

        if let Err(e) = self.destination.store(&key, part.content.clone()).await {
            warn!(key, error = %e, "Upload failed, skipping attachment");
            return AttachmentOutcome::Failed {
                stage: AttachmentStage::Upload,
                detail: e.to_string(),
            };
        }
        self.metrics.attachment_stored();

        let link = match self.signer.signed_url(&key, self.link_ttl).await {
            Ok(link) => link,
            Err(e) => {
                warn!(key, error = %e, "Signing failed, skipping attachment");
                return AttachmentOutcome::Failed {
                    stage: AttachmentStage::Sign,
                    detail: e.to_string(),
                };
            }
        };

        match self.notifier.notify(&link, rm_dir).await {
            Ok(()) => {
                info!(key, rm_dir, "Attachment extracted and notified");
                self.metrics.attachment_delivered();
                AttachmentOutcome::Delivered { key }
            }
            Err(e) => {
                warn!(key, error = %e, "Webhook notification failed");
                self.metrics.notify_failed();
                AttachmentOutcome::StoredUnnotified {
                    key,
                    detail: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_key_is_pure_prefix_join() {
        assert_eq!(destination_key("invoice.pdf"), "attachments/invoice.pdf");
        assert_eq!(destination_key("manual.EPUB"), "attachments/manual.EPUB");
    }

    #[test]
    fn test_dir_marker_normalizes_root_forms() {
        // No parent directory
        assert_eq!(dir_marker("msg.eml"), "/");
        // Parent is the literal "root"
        assert_eq!(dir_marker("root/msg.eml"), "/");
        // Leading slash, parent empty
        assert_eq!(dir_marker("/msg.eml"), "/");
    }

    #[test]
    fn test_dir_marker_keeps_real_parents() {
        assert_eq!(dir_marker("inbox/sub/msg.eml"), "inbox/sub");
        assert_eq!(dir_marker("inbox/msg.eml"), "inbox");
        assert_eq!(dir_marker("inbox/root/msg.eml"), "inbox/root");
    }

    #[test]
    fn test_dir_marker_with_trailing_slash() {
        assert_eq!(dir_marker("inbox/sub/"), "inbox/sub");
    }
}
