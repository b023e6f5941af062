//! HTTP client for the user directory service
//!
//! Talks to a JSONPlaceholder-compatible REST API exposing `/users/{id}` and
//! `/users?email=...`.

use super::{DirectoryError, UserDirectory};
use crate::state::User;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default directory address
pub const DEFAULT_ADDRESS: &str = "https://jsonplaceholder.typicode.com";

/// Client for communicating with the user directory
pub struct HttpUserDirectory {
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl HttpUserDirectory {
    /// Create a new directory client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DirectoryError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, DirectoryError> {
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: url.clone(),
                source,
            })?;

        decode(&url, &body)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn get_user(&self, id: u32) -> Result<User, DirectoryError> {
        let url = format!("{}/{id}", self.users_url());
        tracing::debug!("Fetching seed user from {url}");
        self.get_json(url, &[]).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, DirectoryError> {
        tracing::debug!("Looking up users with email {email}");
        self.get_json(self.users_url(), &[("email", email)]).await
    }
}

/// Parse a response body, rejecting anything that is not the expected JSON
fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, DirectoryError> {
    serde_json::from_str(body).map_err(|source| DirectoryError::Decode {
        url: url.to_string(),
        source,
    })
}
