use anyhow::{Context, Error};
use lazy_static::lazy_static;
use reqwest::{Response, StatusCode};
use reqwest_tracing::TracingMiddleware;
use thiserror::Error as ThisError;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::Value;
use url::Url;

lazy_static! {
    static ref CLIENT: ClientWithMiddleware = ClientBuilder::new(reqwest::Client::new())
        .with(TracingMiddleware::default())
        .build();
}

pub struct HttpClient;

#[derive(ThisError, Debug)]
pub enum HttpClientError {
    /// The server answered with a non-success status. Callers that poll
    /// flaky pages match on this variant to schedule a retry.
    #[error("{url} responded with status {status}")]
    ErrorStatus { status: StatusCode, url: Url },
    #[error(transparent)]
    RequestError(#[from] Error),
}

impl HttpClient {
    async fn get(url: Url) -> Result<Response, HttpClientError> {
        let response = CLIENT
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch request from {url}"))?;
        Self::accept_success(response, url)
    }

    pub async fn get_text(url: Url) -> Result<String, HttpClientError> {
        let response = Self::get(url).await?;
        let text = response
            .text()
            .await
            .context("Failed to get text response")?;
        Ok(text)
    }

    /// POSTs a JSON body and discards the response payload. Webhook
    /// endpoints reply with `204 No Content`, so there is nothing to read.
    pub async fn post_json(url: Url, body: Value) -> Result<(), HttpClientError> {
        let response = CLIENT
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to post request to {url}"))?;
        Self::accept_success(response, url).map(|_| ())
    }

    fn accept_success(response: Response, url: Url) -> Result<Response, HttpClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(HttpClientError::ErrorStatus { status, url })
        }
    }
}
