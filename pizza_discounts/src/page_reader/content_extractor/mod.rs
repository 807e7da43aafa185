use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::page_reader::{RegionName, SaleRecord, SaleStatus};

lazy_static! {
    static ref REGION_BUTTON: Selector =
        Selector::parse(".btn").expect("REGION_BUTTON selector to compile");
    static ref VERDICT_PARAGRAPH: Selector =
        Selector::parse(".verdict p").expect("VERDICT_PARAGRAPH selector to compile");
    static ref COUPON_CODE: Selector =
        Selector::parse("strong").expect("COUPON_CODE selector to compile");
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{url} has no region marker element")]
    MissingRegion { url: Url },
    #[error("{url} has no verdict paragraph")]
    MissingVerdict { url: Url },
    #[error("{url} reports a sale but carries no coupon code")]
    MissingCouponCode { url: Url },
}

/// Pure text-to-record extraction; the same document always yields the
/// same record. The sale verdict is the first paragraph under the verdict
/// marker, and a page only counts as on sale when that paragraph says
/// "yes" somewhere.
pub fn extract(html: &str, url: Url) -> Result<SaleRecord, ParseError> {
    let document = Html::parse_document(html);

    let region = document
        .select(&REGION_BUTTON)
        .next()
        .map(element_text)
        .and_then(|text| RegionName::try_from(text).ok())
        .ok_or_else(|| ParseError::MissingRegion { url: url.clone() })?;

    let verdict = document
        .select(&VERDICT_PARAGRAPH)
        .next()
        .ok_or_else(|| ParseError::MissingVerdict { url: url.clone() })?;

    let on_sale = element_text(verdict).to_lowercase().contains("yes");
    let status = if on_sale {
        let coupon_code = verdict
            .select(&COUPON_CODE)
            .next()
            .map(element_text)
            .ok_or_else(|| ParseError::MissingCouponCode { url: url.clone() })?;
        SaleStatus::OnSale { coupon_code }
    } else {
        SaleStatus::NotOnSale
    };

    Ok(SaleRecord {
        region,
        status,
        source_url: url,
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
