use track_and_notify_sale_changes::config::SETTINGS_CONFIG;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shared_kernel::telemetry::config_telemetry();
    track_and_notify_sale_changes::run(&SETTINGS_CONFIG).await
}
