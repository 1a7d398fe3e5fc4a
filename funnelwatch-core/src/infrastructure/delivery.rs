// funnelwatch-core/src/infrastructure/delivery.rs
//
// Outbox delivery: the weekly summary lands as <outbox>/<YYYY-MM-DD>-funnel.md,
// picked up by whatever mailer or chat bot watches the folder.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::error::FunnelError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::delivery::Delivery;

pub struct OutboxDelivery {
    outbox_dir: PathBuf,
}

impl OutboxDelivery {
    pub fn new(outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            outbox_dir: outbox_dir.into(),
        }
    }

    pub fn message_path(&self, window_end: NaiveDate) -> PathBuf {
        self.outbox_dir
            .join(format!("{}-funnel.md", window_end.format("%Y-%m-%d")))
    }
}

impl Delivery for OutboxDelivery {
    #[instrument(skip(self, body))]
    fn deliver(
        &self,
        window_end: NaiveDate,
        subject: &str,
        body: &str,
    ) -> Result<PathBuf, FunnelError> {
        let path = self.message_path(window_end);
        let message = format!("Subject: {}\n\n{}", subject, body);
        atomic_write(&path, message)?;
        info!(path = ?path, "Summary delivered to outbox");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_deliver_writes_message() -> Result<()> {
        let dir = tempdir()?;
        let outbox = OutboxDelivery::new(dir.path().join("outbox"));
        let end = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();

        let path = outbox.deliver(end, "Weekly funnel", "body")?;

        assert!(path.ends_with("2025-11-11-funnel.md"));
        assert_eq!(fs::read_to_string(path)?, "Subject: Weekly funnel\n\nbody");
        Ok(())
    }

    #[test]
    fn test_redelivery_replaces_message() -> Result<()> {
        let dir = tempdir()?;
        let outbox = OutboxDelivery::new(dir.path());
        let end = NaiveDate::from_ymd_opt(2025, 11, 11).unwrap();

        outbox.deliver(end, "s", "first")?;
        let path = outbox.deliver(end, "s", "second")?;

        assert_eq!(fs::read_to_string(path)?, "Subject: s\n\nsecond");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
