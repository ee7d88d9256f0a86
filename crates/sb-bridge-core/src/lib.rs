use anyhow::{Result, bail};
use sb_api_types::{Account, AccountsInChain, ApprovedNamespace, SessionProposal};
use thiserror::Error;
use sb_networks::ChainResolver;
use sb_proposal::{accounts_by_chain, namespace_families, sort_chains};
use sb_sign_client::{ApproveRequest, RejectRequest, SignClient};
use sb_store::{SessionRecord, SessionStore};
use sb_wallet_client::WalletApi;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Builds the namespaces granted at approval time from the proposal's
/// families and the accounts the user selected.
///
/// Families sharing a namespace key merge. A chain is granted iff at least
/// one selected account lives on it; a required chain with no matching
/// selected account fails the whole build. Accounts are formatted as CAIP-10
/// strings (`"<chain identifier>:<address>"`).
pub fn build_approved_namespaces(
    proposal: &SessionProposal,
    accounts: &[Account],
    selected_account_ids: &[String],
    resolver: &dyn ChainResolver,
) -> Result<BTreeMap<String, ApprovedNamespace>> {
    let selected: Vec<&Account> = accounts
        .iter()
        .filter(|account| selected_account_ids.contains(&account.id))
        .collect();

    let mut namespaces: BTreeMap<String, ApprovedNamespace> = BTreeMap::new();

    for family in namespace_families(proposal) {
        let entry = namespaces.entry(family.key.clone()).or_default();
        for method in family.methods {
            push_unique(&mut entry.methods, method);
        }
        for event in family.events {
            push_unique(&mut entry.events, event);
        }

        for chain_id in &family.chains {
            let chain = resolver.chain_key(chain_id);
            let matching: Vec<&Account> = selected
                .iter()
                .filter(|account| account.currency == chain.as_str())
                .copied()
                .collect();

            if matching.is_empty() {
                if family.required {
                    bail!("no account selected for required chain {chain_id}");
                }
                continue;
            }

            push_unique(&mut entry.chains, chain_id.clone());
            for account in matching {
                push_unique(&mut entry.accounts, format!("{chain_id}:{}", account.address));
            }
        }
    }

    // Namespaces the selection cannot serve at all are not granted.
    namespaces.retain(|_, namespace| !namespace.chains.is_empty());

    Ok(namespaces)
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.iter().any(|existing| *existing == value) {
        values.push(value);
    }
}

/// Approval failure, split by who can act on it: `Selection` problems are
/// fixable on the review screen, `Seam` failures are collaborator outages.
#[derive(Debug, Error)]
pub enum ApproveError {
    #[error("{0}")]
    Selection(String),
    #[error(transparent)]
    Seam(anyhow::Error),
}

/// Orchestrates the wallet-connection flow over injected collaborators.
///
/// Explicitly constructed and dependency-injected; the only construction
/// site in the service is `main`.
pub struct BridgeCore {
    sign: Arc<dyn SignClient>,
    wallet: Arc<dyn WalletApi>,
    store: Arc<dyn SessionStore>,
    resolver: Arc<dyn ChainResolver>,
}

impl BridgeCore {
    pub fn new(
        sign: Arc<dyn SignClient>,
        wallet: Arc<dyn WalletApi>,
        store: Arc<dyn SessionStore>,
        resolver: Arc<dyn ChainResolver>,
    ) -> Self {
        Self {
            sign,
            wallet,
            store,
            resolver,
        }
    }

    pub async fn pair(&self, uri: &str) -> Result<()> {
        let uri = uri.trim();
        if uri.is_empty() {
            bail!("pairing uri cannot be empty");
        }
        if !uri.starts_with("wc:") {
            bail!("pairing uri must use the wc: scheme");
        }

        self.sign.pair(uri).await
    }

    /// Reconciles the proposal against the wallet's accounts and returns the
    /// chains in display order.
    pub async fn review_proposal(&self, proposal: &SessionProposal) -> Result<Vec<AccountsInChain>> {
        let accounts = self.wallet.list_accounts().await?;
        let reconciled = accounts_by_chain(proposal, &accounts, self.resolver.as_ref());
        Ok(sort_chains(&reconciled))
    }

    pub async fn approve_proposal(
        &self,
        proposal: &SessionProposal,
        selected_account_ids: &[String],
    ) -> Result<SessionRecord, ApproveError> {
        if selected_account_ids.is_empty() {
            return Err(ApproveError::Selection(
                "at least one account must be selected".to_owned(),
            ));
        }

        let accounts = self
            .wallet
            .list_accounts()
            .await
            .map_err(|err| ApproveError::Seam(err.into()))?;
        let namespaces = build_approved_namespaces(
            proposal,
            &accounts,
            selected_account_ids,
            self.resolver.as_ref(),
        )
        .map_err(|err| ApproveError::Selection(err.to_string()))?;

        if namespaces.is_empty() {
            return Err(ApproveError::Selection(
                "selected accounts match none of the requested chains".to_owned(),
            ));
        }

        let result = self
            .sign
            .approve_session(ApproveRequest {
                proposal_id: proposal.id,
                namespaces: namespaces.clone(),
            })
            .await
            .map_err(ApproveError::Seam)?;

        let (peer_name, peer_url) = match &proposal.proposer {
            Some(peer) => (peer.name.clone(), peer.url.clone()),
            None => (String::new(), String::new()),
        };

        let record = SessionRecord {
            topic: result.topic,
            peer_name,
            peer_url,
            namespaces,
            account_ids: selected_account_ids.to_vec(),
            created_at_epoch_ms: epoch_ms().map_err(ApproveError::Seam)?,
        };
        self.store
            .save_session(&record)
            .await
            .map_err(ApproveError::Seam)?;

        Ok(record)
    }

    pub async fn reject_proposal(&self, proposal_id: u64, reason: Option<String>) -> Result<()> {
        let reason = reason
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "rejected by user".to_owned());

        self.sign
            .reject_session(RejectRequest {
                proposal_id,
                reason,
            })
            .await
    }

    pub async fn sessions(&self) -> Result<Vec<SessionRecord>> {
        self.store.list_sessions().await
    }

    /// Disconnects at the protocol level, then drops the record. Returns
    /// whether a record existed.
    pub async fn disconnect(&self, topic: &str) -> Result<bool> {
        self.sign.disconnect_session(topic).await?;
        self.store.remove_session(topic).await
    }
}

fn epoch_ms() -> Result<u128> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis())
}
