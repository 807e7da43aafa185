use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use shared_kernel::http_client::HttpClient;
use std::time::Duration;
use tracing::error;
use url::Url;

use crate::contracts::send_notification::SaleChangeNotification;

pub struct WebhookNotificationInteractor {
    webhook_urls: Vec<Secret<String>>,
    delivery_delay: Duration,
}

impl WebhookNotificationInteractor {
    pub fn new(webhook_urls: Vec<Secret<String>>, delivery_delay: Duration) -> Self {
        Self {
            webhook_urls,
            delivery_delay,
        }
    }

    /// Posts one batched payload per configured endpoint, pausing between
    /// deliveries so a burst of changes does not flood the receivers.
    /// A failed delivery is logged and the remaining endpoints are still
    /// attempted; the run carries on either way.
    #[tracing::instrument(skip(self, changes), level = "info")]
    pub async fn send(&self, changes: Vec<SaleChangeNotification>) -> anyhow::Result<()> {
        let message = webhook_message::build(&changes);
        let body = serde_json::to_value(message)
            .context("Failed to convert the message to a valid json body")?;

        for webhook_url in &self.webhook_urls {
            if let Err(err) = deliver(webhook_url, body.clone()).await {
                error!("Error delivering sale change notification: {err:?}");
            }
            tokio::time::sleep(self.delivery_delay).await;
        }
        Ok(())
    }
}

async fn deliver(webhook_url: &Secret<String>, body: serde_json::Value) -> anyhow::Result<()> {
    // the url embeds a capability token, so it never appears in errors
    let url = Url::parse(webhook_url.expose_secret()).context("Invalid webhook url")?;
    HttpClient::post_json(url, body).await?;
    Ok(())
}

mod webhook_message {
    use serde::Serialize;

    use crate::contracts::send_notification::{SaleChange, SaleChangeNotification};

    const ON_SALE_COLOR: &str = "3468084";
    const OFF_SALE_COLOR: &str = "15414324";

    #[derive(Serialize, Debug)]
    pub(super) struct WebhookMessage {
        pub content: String,
        pub embeds: Vec<Embed>,
    }

    #[derive(Serialize, Debug)]
    pub(super) struct Embed {
        pub title: String,
        pub description: String,
        pub color: String,
        pub url: String,
    }

    pub(super) fn build(changes: &[SaleChangeNotification]) -> WebhookMessage {
        let embeds = changes.iter().map(embed).collect();
        WebhookMessage {
            content: String::new(),
            embeds,
        }
    }

    fn embed(change: &SaleChangeNotification) -> Embed {
        let region = title_case(&change.region);
        match &change.change {
            SaleChange::OnSale { coupon_code } => Embed {
                title: format!("Pizza is on sale in {region}"),
                description: format!("Coupon Code: {coupon_code}"),
                color: ON_SALE_COLOR.to_string(),
                url: change.source_url.to_string(),
            },
            SaleChange::NoLongerOnSale => Embed {
                title: format!("Pizza is no longer on sale in {region}"),
                description: String::new(),
                color: OFF_SALE_COLOR.to_string(),
                url: change.source_url.to_string(),
            },
        }
    }

    /// Every alphabetic run starts uppercase with the rest lowered:
    /// "new york city" becomes "New York City", "DFW" becomes "Dfw".
    pub(super) fn title_case(text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut at_word_start = true;
        for ch in text.chars() {
            if ch.is_alphabetic() {
                if at_word_start {
                    result.extend(ch.to_uppercase());
                } else {
                    result.extend(ch.to_lowercase());
                }
                at_word_start = false;
            } else {
                result.push(ch);
                at_word_start = true;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::webhook_message::{build, title_case};
    use super::WebhookNotificationInteractor;
    use crate::contracts::send_notification::{SaleChange, SaleChangeNotification};
    use httpmock::prelude::*;
    use secrecy::Secret;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;

    fn chicago_on_sale() -> SaleChangeNotification {
        SaleChangeNotification {
            region: "chicago".to_string(),
            source_url: Url::parse("http://ispizzahalfprice.com/chicago").unwrap(),
            change: SaleChange::OnSale {
                coupon_code: "SAVE10".to_string(),
            },
        }
    }

    fn nyc_off_sale() -> SaleChangeNotification {
        SaleChangeNotification {
            region: "nyc".to_string(),
            source_url: Url::parse("http://ispizzahalfprice.com/nyc").unwrap(),
            change: SaleChange::NoLongerOnSale,
        }
    }

    #[test]
    fn test_on_sale_embed_carries_coupon_and_on_color() {
        let message = build(&[chicago_on_sale()]);

        assert_eq!(message.content, "");
        assert_eq!(message.embeds.len(), 1);
        let embed = &message.embeds[0];
        assert_eq!(embed.title, "Pizza is on sale in Chicago");
        assert_eq!(embed.description, "Coupon Code: SAVE10");
        assert_eq!(embed.color, "3468084");
        assert_eq!(embed.url, "http://ispizzahalfprice.com/chicago");
    }

    #[test]
    fn test_off_sale_embed_has_empty_description_and_off_color() {
        let message = build(&[nyc_off_sale()]);

        let embed = &message.embeds[0];
        assert_eq!(embed.title, "Pizza is no longer on sale in Nyc");
        assert_eq!(embed.description, "");
        assert_eq!(embed.color, "15414324");
    }

    #[test]
    fn test_all_changes_are_batched_into_one_message() {
        let message = build(&[chicago_on_sale(), nyc_off_sale()]);

        assert_eq!(message.embeds.len(), 2);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("chicago"), "Chicago");
        assert_eq!(title_case("new york city"), "New York City");
        assert_eq!(title_case("DFW"), "Dfw");
        assert_eq!(title_case("washington d.c."), "Washington D.C.");
    }

    #[tokio::test]
    async fn test_every_endpoint_receives_the_batched_payload() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(POST).path("/hook/first").json_body(json!({
                "content": "",
                "embeds": [{
                    "title": "Pizza is on sale in Chicago",
                    "description": "Coupon Code: SAVE10",
                    "color": "3468084",
                    "url": "http://ispizzahalfprice.com/chicago"
                }]
            }));
            then.status(204);
        });
        let second = server.mock(|when, then| {
            when.method(POST).path("/hook/second");
            then.status(204);
        });

        let interactor = WebhookNotificationInteractor::new(
            vec![
                Secret::new(server.url("/hook/first")),
                Secret::new(server.url("/hook/second")),
            ],
            Duration::from_millis(1),
        );
        interactor.send(vec![chicago_on_sale()]).await.unwrap();

        first.assert();
        second.assert();
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_stop_the_remaining_ones() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/hook/broken");
            then.status(500);
        });
        let healthy = server.mock(|when, then| {
            when.method(POST).path("/hook/healthy");
            then.status(204);
        });

        let interactor = WebhookNotificationInteractor::new(
            vec![
                Secret::new(server.url("/hook/broken")),
                Secret::new(server.url("/hook/healthy")),
            ],
            Duration::from_millis(1),
        );
        let result = interactor.send(vec![nyc_off_sale()]).await;

        assert!(result.is_ok());
        healthy.assert();
    }
}
