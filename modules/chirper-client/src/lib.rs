pub mod error;
pub mod types;

pub use error::{ChirperError, Result};
pub use types::{Entities, GeoPoint, HashtagEntity, IdPage, Post, Profile};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.chirper.social/1.1";

/// Fallback wait when a 429 response carries no usable reset header.
const RATE_LIMIT_FALLBACK_SECS: u64 = 60;

/// Upper bound on a single rate-limit wait, whatever the header says.
const RATE_LIMIT_MAX_WAIT_SECS: u64 = 900;

pub struct ChirperClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ChirperClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host. Used by tests.
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url,
        }
    }

    /// Fetch an account profile by handle.
    pub async fn get_profile(&self, handle: &str) -> Result<Profile> {
        self.get_json("users/show.json", &[("screen_name", handle.to_string())])
            .await
    }

    /// Fetch an account profile by numeric id.
    pub async fn get_profile_by_id(&self, id: u64) -> Result<Profile> {
        self.get_json("users/show.json", &[("user_id", id.to_string())])
            .await
    }

    /// Fetch up to `count` most recent posts for an account. Single page;
    /// no cursoring into older history.
    pub async fn get_timeline(&self, handle: &str, count: u32) -> Result<Vec<Post>> {
        self.get_json(
            "statuses/user_timeline.json",
            &[
                ("screen_name", handle.to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    /// Fetch one page of friend ids for a handle.
    pub async fn get_friend_ids(&self, handle: &str, cursor: i64) -> Result<IdPage> {
        self.get_json(
            "friends/ids.json",
            &[
                ("screen_name", handle.to_string()),
                ("cursor", cursor.to_string()),
            ],
        )
        .await
    }

    /// Fetch one page of follower ids for a numeric account id.
    pub async fn get_follower_ids(&self, id: u64, cursor: i64) -> Result<IdPage> {
        self.get_json(
            "followers/ids.json",
            &[("user_id", id.to_string()), ("cursor", cursor.to_string())],
        )
        .await
    }

    /// GET a JSON endpoint, sleeping through rate-limit windows.
    ///
    /// A 429 is retried after waiting out `x-rate-limit-reset`; every other
    /// non-success status surfaces as `ChirperError::Api`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        loop {
            let url = format!("{}/{}", self.base_url, path);
            let resp = self
                .client
                .get(&url)
                .query(params)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if status.as_u16() == 429 {
                let wait = rate_limit_wait(&resp);
                tracing::warn!(path, wait_secs = wait.as_secs(), "Rate limited, waiting");
                tokio::time::sleep(wait).await;
                continue;
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ChirperError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            return Ok(resp.json().await?);
        }
    }
}

/// Time to wait after a 429, from the `x-rate-limit-reset` epoch header.
fn rate_limit_wait(resp: &reqwest::Response) -> Duration {
    let reset = resp
        .headers()
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    match reset {
        Some(at) if at > now => {
            Duration::from_secs((at - now).min(RATE_LIMIT_MAX_WAIT_SECS))
        }
        _ => Duration::from_secs(RATE_LIMIT_FALLBACK_SECS),
    }
}
