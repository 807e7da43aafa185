use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;
use url::Url;

const SNAPSHOT_VERSION: u32 = 1;

/// One persisted row per monitored region: exactly the four fields of a
/// record, in a layout that stays stable across implementations.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SnapshotRecord {
    pub region: String,
    pub on_sale: bool,
    pub source_url: Url,
    pub coupon_code: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct VersionedSnapshot {
    version: u32,
    records: Vec<SnapshotRecord>,
}

/// Last-known record set, one file, replaced wholesale after a notified run.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing, empty or undecodable file is an empty snapshot; the run
    /// then treats every region as changed instead of failing forever on a
    /// bad file. Any other read failure surfaces.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn read(&self) -> anyhow::Result<Vec<SnapshotRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read snapshot file {}", self.path.display())
                })
            }
        };
        if bytes.is_empty() {
            return Ok(vec![]);
        }
        match serde_json::from_slice::<VersionedSnapshot>(&bytes) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => Ok(snapshot.records),
            Ok(snapshot) => {
                warn!(
                    "Ignoring snapshot with unsupported version {}",
                    snapshot.version
                );
                Ok(vec![])
            }
            Err(err) => {
                warn!("Ignoring undecodable snapshot file: {err}");
                Ok(vec![])
            }
        }
    }

    /// Write failures must surface: silently losing the new snapshot would
    /// repeat every notification on the next run.
    #[tracing::instrument(skip(self, records), level = "debug")]
    pub async fn write(&self, records: Vec<SnapshotRecord>) -> anyhow::Result<()> {
        let snapshot = VersionedSnapshot {
            version: SNAPSHOT_VERSION,
            records,
        };
        let bytes = serde_json::to_vec(&snapshot).context("Failed to serialize snapshot")?;
        tokio::fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Failed to write snapshot file {}", self.path.display()))
    }
}
