mod content_extractor;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::time::Duration;
use url::Url;

pub struct PageReader {
    retry_policy: RetryPolicy,
}

impl PageReader {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self { retry_policy }
    }

    /// Fetches and parses all pages concurrently. The first page that
    /// ultimately fails aborts the whole batch; the remaining in-flight
    /// fetches are dropped so no partial result ever escapes.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn extract(&self, urls: Vec<Url>) -> anyhow::Result<Vec<SaleRecord>> {
        let number_of_pages = urls.len();

        let mut futures: FuturesUnordered<_> = urls
            .into_iter()
            .map(|url| fetch_and_extract::execute(url, self.retry_policy))
            .collect();

        let mut records = Vec::with_capacity(number_of_pages);
        while let Some(result) = futures.next().await {
            records.push(result?);
        }

        Ok(records)
    }
}

mod fetch_and_extract {
    use crate::page_reader::content_extractor;
    use crate::page_reader::{RetryPolicy, SaleRecord};
    use anyhow::Context;
    use shared_kernel::http_client::{HttpClient, HttpClientError};
    use tracing::warn;
    use url::Url;

    pub(super) async fn execute(url: Url, retry_policy: RetryPolicy) -> anyhow::Result<SaleRecord> {
        let html = fetch_with_retry(&url, retry_policy).await?;
        let record = content_extractor::extract(&html, url)?;
        Ok(record)
    }

    /// Only a non-success status is worth waiting out; a transport failure
    /// (DNS, refused connection) escapes immediately.
    async fn fetch_with_retry(url: &Url, retry_policy: RetryPolicy) -> anyhow::Result<String> {
        let mut failed_attempts = 0;
        loop {
            match HttpClient::get_text(url.clone()).await {
                Ok(html) => return Ok(html),
                Err(error @ HttpClientError::ErrorStatus { .. }) => {
                    if failed_attempts >= retry_policy.max_retries {
                        return Err(error).with_context(|| {
                            format!("Giving up on {url} after {failed_attempts} retries")
                        });
                    }
                    failed_attempts += 1;
                    warn!(
                        "{error}, retry {failed_attempts} of {} in {:?}",
                        retry_policy.max_retries, retry_policy.delay
                    );
                    tokio::time::sleep(retry_policy.delay).await;
                }
                Err(error) => {
                    return Err(error).with_context(|| format!("Failed to fetch {url}"));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaleRecord {
    pub region: RegionName,
    pub status: SaleStatus,
    pub source_url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SaleStatus {
    OnSale { coupon_code: String },
    NotOnSale,
}

impl SaleStatus {
    pub fn is_on_sale(&self) -> bool {
        matches!(self, SaleStatus::OnSale { .. })
    }

    pub fn coupon_code(&self) -> Option<&str> {
        match self {
            SaleStatus::OnSale { coupon_code } => Some(coupon_code),
            SaleStatus::NotOnSale => None,
        }
    }
}

/// Trimmed, non-empty display name of a monitored region.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RegionName(String);

impl RegionName {
    pub fn inner(&self) -> String {
        self.0.clone()
    }
}

impl AsRef<str> for RegionName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl std::fmt::Display for RegionName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<String> for RegionName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("region name cannot be empty".to_string());
        }
        Ok(RegionName(trimmed.to_string()))
    }
}
