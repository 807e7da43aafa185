pub mod changes;
pub mod config;

use anyhow::Context;
use itertools::Itertools;
use notifications::contracts::send_notification::webhook::WebhookNotificationInteractor;
use notifications::contracts::send_notification::{SaleChange, SaleChangeNotification};
use pizza_discounts::contracts::import_sale_status::{
    RegionName, RetryPolicy, SaleRecord, SaleStatus, SaleStatusImporter,
};
use snapshot_store::{SnapshotRecord, SnapshotStore};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Settings;

/// One full poll cycle: read the last snapshot, fetch every monitored page,
/// diff, and only on a non-empty diff notify and persist the new state.
#[tracing::instrument(err, skip(settings), level = "info")]
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let store = SnapshotStore::new(settings.snapshot.file.clone());
    let previous = previous_records(&store).await?;

    let retry_policy = RetryPolicy {
        max_retries: settings.pages.retry_max,
        delay: Duration::from_secs(settings.pages.retry_delay_seconds),
    };
    let current: HashSet<_> =
        SaleStatusImporter::import(settings.pages.urls.clone(), retry_policy)
            .await?
            .into_iter()
            .collect();

    let changed = changes::changed_records(&previous, &current);
    if changed.is_empty() {
        info!("No sale changes detected");
        return Ok(());
    }
    info!("Detected {} changed records, notifying", changed.len());

    let notifier = WebhookNotificationInteractor::new(
        settings.webhooks.urls.clone(),
        Duration::from_secs(settings.webhooks.delivery_delay_seconds),
    );
    let sale_changes = changed.into_iter().map(to_notification).collect_vec();
    notifier.send(sale_changes).await?;

    let rows = current.into_iter().map(to_snapshot_record).collect_vec();
    store.write(rows).await
}

/// Stored rows that no longer map onto valid records are discarded as a
/// whole, which downgrades the run to a notify-everything first run.
async fn previous_records(store: &SnapshotStore) -> anyhow::Result<HashSet<SaleRecord>> {
    let rows = store.read().await?;
    match rows
        .into_iter()
        .map(to_domain_record)
        .collect::<anyhow::Result<HashSet<_>>>()
    {
        Ok(records) => Ok(records),
        Err(err) => {
            warn!("Discarding stored snapshot: {err}");
            Ok(HashSet::new())
        }
    }
}

fn to_domain_record(row: SnapshotRecord) -> anyhow::Result<SaleRecord> {
    let region = RegionName::try_from(row.region)
        .map_err(|err| anyhow::anyhow!("Invalid stored region name: {err}"))
        .with_context(|| format!("Bad stored record for {}", row.source_url))?;
    let status = match (row.on_sale, row.coupon_code) {
        (true, Some(coupon_code)) => SaleStatus::OnSale { coupon_code },
        (false, None) => SaleStatus::NotOnSale,
        (true, None) => anyhow::bail!(
            "Stored record for {} is on sale without a coupon code",
            row.source_url
        ),
        (false, Some(_)) => anyhow::bail!(
            "Stored record for {} carries a coupon code while not on sale",
            row.source_url
        ),
    };
    Ok(SaleRecord {
        region,
        status,
        source_url: row.source_url,
    })
}

fn to_snapshot_record(record: SaleRecord) -> SnapshotRecord {
    SnapshotRecord {
        region: record.region.inner(),
        on_sale: record.status.is_on_sale(),
        coupon_code: record.status.coupon_code().map(ToString::to_string),
        source_url: record.source_url,
    }
}

fn to_notification(record: SaleRecord) -> SaleChangeNotification {
    let change = match record.status {
        SaleStatus::OnSale { coupon_code } => SaleChange::OnSale { coupon_code },
        SaleStatus::NotOnSale => SaleChange::NoLongerOnSale,
    };
    SaleChangeNotification {
        region: record.region.inner(),
        source_url: record.source_url,
        change,
    }
}
