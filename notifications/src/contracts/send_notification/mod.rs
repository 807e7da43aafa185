pub mod webhook;

use url::Url;

#[derive(Clone, Debug)]
pub enum SaleChange {
    OnSale { coupon_code: String },
    NoLongerOnSale,
}

#[derive(Clone, Debug)]
pub struct SaleChangeNotification {
    pub region: String,
    pub source_url: Url,
    pub change: SaleChange,
}
