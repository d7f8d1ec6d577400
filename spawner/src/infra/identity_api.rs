//! Infrastructure implementation of the `IdentityApi` port over HTTP.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::ports::IdentityApi;
use crate::domain::ExternalAccount;

const API_VERSION: &str = "v1alpha1";

/// REST client for the identity API's user endpoints.
///
/// Every request carries the admin token as the `token` query parameter.
pub struct HttpIdentityApi {
    client: reqwest::Client,
    endpoint: String,
    admin_token: String,
}

impl HttpIdentityApi {
    /// Build a client for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: &str, admin_token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sandbox-spawner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building identity API client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            admin_token,
        })
    }

    fn users_url(&self) -> String {
        format!("{}/{API_VERSION}/users", self.endpoint)
    }
}

impl IdentityApi for HttpIdentityApi {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn create_account(&self, identity: &str) -> Result<ExternalAccount> {
        let body = CreateUserRequest {
            version: API_VERSION,
            metadata: NewUser {
                name: identity,
                email: "-",
                globus_id: identity,
                admin: false,
            },
        };
        let response = self
            .client
            .post(self.users_url())
            .query(&[("token", &self.admin_token)])
            .json(&body)
            .send()
            .await
            .context("sending create-user request")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("identity API returned {status}: {}", text.trim());
        }
        let created: CreateUserResponse = response
            .json()
            .await
            .context("Unable to parse JSON from identity API")?;
        Ok(ExternalAccount {
            id: created.metadata.id,
            access_token: created.metadata.access_token,
        })
    }

    async fn delete_account(&self, account_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{account_id}", self.users_url()))
            .query(&[("token", &self.admin_token)])
            .send()
            .await
            .context("sending delete-user request")?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("identity API returned {status}: {}", text.trim());
        }
        Ok(())
    }
}

// ── Wire shapes ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    version: &'static str,
    metadata: NewUser<'a>,
}

#[derive(Serialize)]
struct NewUser<'a> {
    name: &'a str,
    email: &'static str,
    #[serde(rename = "globusID")]
    globus_id: &'a str,
    admin: bool,
}

#[derive(Deserialize)]
struct CreateUserResponse {
    metadata: CreatedUser,
}

#[derive(Deserialize)]
struct CreatedUser {
    id: String,
    access_token: String,
}
