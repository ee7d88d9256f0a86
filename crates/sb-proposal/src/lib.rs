//! Proposal-to-account reconciliation.
//!
//! Pure, synchronous transformations from a session proposal and the host
//! wallet's account list to the per-chain support model that drives the
//! proposal-review screen. Nothing here touches I/O or shared state; every
//! call is independent and idempotent given the same inputs.

use sb_api_types::{Account, AccountsInChain, SessionProposal};
use sb_networks::ChainResolver;
use std::collections::HashSet;

/// A namespace group flattened out of a proposal, tagged with whether the
/// proposer listed it as required.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub key: String,
    pub methods: Vec<String>,
    pub chains: Vec<String>,
    pub events: Vec<String>,
    pub required: bool,
}

/// Flattens a proposal's namespace groups into one ordered family list:
/// required entries first, then optional, each group in wire insertion order.
pub fn namespace_families(proposal: &SessionProposal) -> Vec<Family> {
    let mut families = Vec::new();

    for (key, family) in proposal.required_namespaces.iter() {
        families.push(Family {
            key: key.to_owned(),
            methods: family.methods.clone(),
            chains: family.chains.clone(),
            events: family.events.clone(),
            required: true,
        });
    }

    if let Some(optional) = &proposal.optional_namespaces {
        for (key, family) in optional.iter() {
            families.push(Family {
                key: key.to_owned(),
                methods: family.methods.clone(),
                chains: family.chains.clone(),
                events: family.events.clone(),
                required: false,
            });
        }
    }

    families
}

/// Cross-references every chain a proposal requests against the wallet's
/// accounts and the network registry.
///
/// Output has exactly one record per distinct raw chain identifier, in
/// first-occurrence order across required-then-optional families. A chain
/// listed by both a required and an optional family appears once, required.
pub fn accounts_by_chain(
    proposal: &SessionProposal,
    accounts: &[Account],
    resolver: &dyn ChainResolver,
) -> Vec<AccountsInChain> {
    let families = namespace_families(proposal);

    let mut seen = HashSet::new();
    let mut requested = Vec::new();
    for family in &families {
        for chain_id in &family.chains {
            if seen.insert(chain_id.as_str()) {
                requested.push(chain_id.as_str());
            }
        }
    }

    requested
        .into_iter()
        .map(|chain_id| {
            let chain = resolver.chain_key(chain_id);
            let matching = accounts
                .iter()
                .filter(|account| account.currency == chain.as_str())
                .cloned()
                .collect();
            let is_required = families
                .iter()
                .any(|family| family.required && family.chains.iter().any(|c| c == chain_id));

            AccountsInChain {
                display_name: sb_networks::display_name(chain.as_str()).to_owned(),
                is_supported: sb_networks::is_supported(chain.as_str()),
                is_required,
                accounts: matching,
                chain,
            }
        })
        .collect()
}

/// Orders reconciled chains for display: required chains first, then chains
/// with at least one matching account, then the rest. Each group is sorted
/// lexicographically by chain key; a chain placed by an earlier group is not
/// repeated by a later one.
pub fn sort_chains(chains: &[AccountsInChain]) -> Vec<AccountsInChain> {
    let mut required: Vec<&AccountsInChain> =
        chains.iter().filter(|record| record.is_required).collect();
    required.sort_by(|a, b| a.chain.cmp(&b.chain));

    let mut funded: Vec<&AccountsInChain> = chains
        .iter()
        .filter(|record| !record.accounts.is_empty())
        .collect();
    funded.sort_by(|a, b| a.chain.cmp(&b.chain));

    let mut remaining: Vec<&AccountsInChain> = chains.iter().collect();
    remaining.sort_by(|a, b| a.chain.cmp(&b.chain));

    let mut placed = HashSet::new();
    let mut ordered = Vec::with_capacity(chains.len());
    for record in required.into_iter().chain(funded).chain(remaining) {
        if placed.insert(record.chain.clone()) {
            ordered.push(record.clone());
        }
    }

    ordered
}
