use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::sources::{FetchError, Result};

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GET `url` and decode the body as JSON.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let response = client
        .get(url)
        .query(query)
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
