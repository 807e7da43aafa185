use lazy_static::lazy_static;
use secrecy::Secret;
use serde::Deserialize;
use shared_kernel::configuration::config;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct PagesSettings {
    pub urls: Vec<Url>,
    pub retry_max: u32,
    pub retry_delay_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookSettings {
    pub urls: Vec<Secret<String>>,
    pub delivery_delay_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SnapshotSettings {
    pub file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub pages: PagesSettings,
    pub webhooks: WebhookSettings,
    pub snapshot: SnapshotSettings,
}

lazy_static! {
    pub static ref SETTINGS_CONFIG: Settings = config::<Settings>().unwrap();
}
