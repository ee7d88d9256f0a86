use anyhow::{Context, Result};
use async_trait::async_trait;
use sb_api_types::ApprovedNamespace;
use sb_sign_client::{ApproveRequest, ApproveResult, RejectRequest, SignClient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// HTTP adapter for the WalletKit relay sidecar.
///
/// Reads `WALLETKIT_RELAY_URL` from environment at construction time
/// (default: `http://localhost:3100`).
pub struct RelaySignClient {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for RelaySignClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RelaySignClient {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("WALLETKIT_RELAY_URL").ok())
            .unwrap_or_else(|| "http://localhost:3100".to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

// ── WalletKit sidecar REST API types ─────────────────────────────────

#[derive(Debug, Serialize)]
struct PairBody<'a> {
    uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApproveBody {
    proposal_id: u64,
    namespaces: BTreeMap<String, ApprovedNamespace>,
}

#[derive(Debug, Deserialize)]
struct ApproveResponse {
    topic: String,
    #[serde(default)]
    acknowledged: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectBody<'a> {
    proposal_id: u64,
    reason: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelayErrorResponse {
    error: String,
}

async fn check_success(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<RelayErrorResponse>(&text) {
        anyhow::bail!("walletkit {operation} failed: {}", body.error);
    }
    anyhow::bail!("walletkit {operation} HTTP {status}: {text}");
}

#[async_trait]
impl SignClient for RelaySignClient {
    async fn pair(&self, uri: &str) -> Result<()> {
        let url = format!("{}/pair", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(&PairBody { uri })
            .send()
            .await
            .context("walletkit pair transport")?;

        check_success(response, "pair").await?;
        Ok(())
    }

    async fn approve_session(&self, req: ApproveRequest) -> Result<ApproveResult> {
        let url = format!("{}/session/approve", self.endpoint);
        let body = ApproveBody {
            proposal_id: req.proposal_id,
            namespaces: req.namespaces,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("walletkit approve transport")?;

        let body: ApproveResponse = check_success(response, "approve")
            .await?
            .json()
            .await
            .context("walletkit approve parse")?;

        if !body.acknowledged {
            warn!("walletkit approved session {} without relay ack", body.topic);
        }

        Ok(ApproveResult {
            topic: body.topic,
            acknowledged: body.acknowledged,
        })
    }

    async fn reject_session(&self, req: RejectRequest) -> Result<()> {
        let url = format!("{}/session/reject", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(&RejectBody {
                proposal_id: req.proposal_id,
                reason: &req.reason,
            })
            .send()
            .await
            .context("walletkit reject transport")?;

        check_success(response, "reject").await?;
        Ok(())
    }

    async fn disconnect_session(&self, topic: &str) -> Result<()> {
        let url = format!("{}/session/{topic}", self.endpoint);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .context("walletkit disconnect transport")?;

        check_success(response, "disconnect").await?;
        Ok(())
    }
}
