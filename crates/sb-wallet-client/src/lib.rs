use async_trait::async_trait;
use sb_api_types::{Account, WalletAccountsResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletApiError {
    #[error("wallet api transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("wallet api returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Account-listing surface of the host wallet. The message-passing transport
/// behind it is an external collaborator; this crate only models the call.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>, WalletApiError>;
}

/// HTTP client for the host wallet's account API.
///
/// Reads `WALLET_API_URL` from environment at construction time
/// (default: `http://localhost:3200`).
pub struct HttpWalletApi {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for HttpWalletApi {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpWalletApi {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("WALLET_API_URL").ok())
            .unwrap_or_else(|| "http://localhost:3200".to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    async fn list_accounts(&self) -> Result<Vec<Account>, WalletApiError> {
        let url = format!("{}/accounts", self.endpoint);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: WalletAccountsResponse = response.json().await?;
        Ok(body.accounts)
    }
}

/// Serves a fixed account list. Used by tests and local runs without a host
/// wallet.
#[derive(Default)]
pub struct StaticWalletApi {
    accounts: Vec<Account>,
}

impl StaticWalletApi {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl WalletApi for StaticWalletApi {
    async fn list_accounts(&self) -> Result<Vec<Account>, WalletApiError> {
        Ok(self.accounts.clone())
    }
}
