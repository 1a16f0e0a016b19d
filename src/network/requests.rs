use crate::accounts::Account;
use anyhow::{anyhow, Result};
use reqwest::{header::AUTHORIZATION, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const MAX_ATTEMPTS: u8 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Join an API path onto an instance base URL, tolerating trailing slashes.
pub fn api_url(instance: &str, path: &str) -> Result<Url> {
  let instance = instance.trim_end_matches('/');
  if instance.is_empty() {
    return Err(anyhow!("no instance URL configured"));
  }
  let url = format!("{}/{}", instance, path.trim_start_matches('/'));
  Url::parse(&url).map_err(|e| anyhow!("invalid API URL {}: {}", url, e))
}

/// Issue a request with the account's authorization attached, retrying
/// transient failures (429 and 5xx) a couple of times.
pub async fn api_request(
  client: &Client,
  account: &Account,
  method: Method,
  url: Url,
  body: Option<Value>,
) -> Result<reqwest::Response> {
  let mut attempt: u8 = 0;

  loop {
    attempt += 1;

    let mut request = client.request(method.clone(), url.clone());
    if let Some(authorization) = account.authorization() {
      request = request.header(AUTHORIZATION, authorization);
    }
    if let Some(ref body) = body {
      request = request.json(body);
    }

    let response = request.send().await;
    match response {
      Ok(response) => {
        let status = response.status();
        if status.is_success() {
          return Ok(response);
        }
        let retryable = status.as_u16() == 429 || status.is_server_error();
        if retryable && attempt < MAX_ATTEMPTS {
          log::warn!("{} {} returned {}, retrying", method, url, status);
          tokio::time::sleep(RETRY_BACKOFF * attempt as u32).await;
          continue;
        }
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!(
          "{} {} failed with status {}: {}",
          method,
          url,
          status,
          body.chars().take(200).collect::<String>()
        ));
      }
      Err(e) if attempt < MAX_ATTEMPTS => {
        log::warn!("{} {} failed: {}, retrying", method, url, e);
        tokio::time::sleep(RETRY_BACKOFF * attempt as u32).await;
      }
      Err(e) => return Err(anyhow!("{} {} failed: {}", method, url, e)),
    }
  }
}

pub async fn get_typed<T: DeserializeOwned>(
  client: &Client,
  account: &Account,
  url: Url,
) -> Result<T> {
  let response = api_request(client, account, Method::GET, url.clone(), None).await?;
  response
    .json::<T>()
    .await
    .map_err(|e| anyhow!("failed to decode response from {}: {}", url, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_url_joins_paths() {
    let url = api_url("https://invidious.example.com", "api/v1/auth/playlists").unwrap();
    assert_eq!(
      url.as_str(),
      "https://invidious.example.com/api/v1/auth/playlists"
    );
  }

  #[test]
  fn test_api_url_tolerates_slashes() {
    let url = api_url("https://pipedapi.example.com/", "/user/playlists").unwrap();
    assert_eq!(url.as_str(), "https://pipedapi.example.com/user/playlists");
  }

  #[test]
  fn test_api_url_rejects_empty_instance() {
    assert!(api_url("", "api/v1/videos").is_err());
    assert!(api_url("not a url", "api/v1/videos").is_err());
  }
}
