use url::Url;

use crate::page_reader::PageReader;

pub use crate::page_reader::{RegionName, RetryPolicy, SaleRecord, SaleStatus};

pub struct SaleStatusImporter;

impl SaleStatusImporter {
    /// Fetches and parses every monitored page into one record per region.
    /// All-or-nothing: a single page that exhausts its retry budget or fails
    /// to parse fails the whole import.
    #[tracing::instrument(err, level = "info")]
    pub async fn import(urls: Vec<Url>, retry_policy: RetryPolicy) -> anyhow::Result<Vec<SaleRecord>> {
        let reader = PageReader::new(retry_policy);
        reader.extract(urls).await
    }
}
