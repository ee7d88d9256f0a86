use anyhow::Result;
use async_trait::async_trait;
use sb_api_types::ApprovedNamespace;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ApproveRequest {
    pub proposal_id: u64,
    pub namespaces: BTreeMap<String, ApprovedNamespace>,
}

#[derive(Debug, Clone)]
pub struct ApproveResult {
    pub topic: String,
    pub acknowledged: bool,
}

#[derive(Debug, Clone)]
pub struct RejectRequest {
    pub proposal_id: u64,
    pub reason: String,
}

/// Seam to the WalletConnect sign SDK. Pairing, relay transport, and session
/// crypto all live behind this trait; implementations are consumed as opaque,
/// already-correct collaborators.
#[async_trait]
pub trait SignClient: Send + Sync {
    async fn pair(&self, uri: &str) -> Result<()>;
    async fn approve_session(&self, req: ApproveRequest) -> Result<ApproveResult>;
    async fn reject_session(&self, req: RejectRequest) -> Result<()>;
    async fn disconnect_session(&self, topic: &str) -> Result<()>;
}

/// Acknowledges everything without talking to a relay. Used by tests and
/// offline runs.
#[derive(Default)]
pub struct NoopSignClient;

#[async_trait]
impl SignClient for NoopSignClient {
    async fn pair(&self, _uri: &str) -> Result<()> {
        Ok(())
    }

    async fn approve_session(&self, _req: ApproveRequest) -> Result<ApproveResult> {
        Ok(ApproveResult {
            topic: Uuid::new_v4().to_string(),
            acknowledged: true,
        })
    }

    async fn reject_session(&self, _req: RejectRequest) -> Result<()> {
        Ok(())
    }

    async fn disconnect_session(&self, _topic: &str) -> Result<()> {
        Ok(())
    }
}
