use serde::{Deserialize, Serialize};

/// Short internal chain identifier (e.g. "ethereum"), distinct from the
/// protocol-level namespace string (e.g. "eip155:1").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainKey(pub String);

impl ChainKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One namespace group from a session proposal.
///
/// Arrays default to empty on decode; proposal well-formedness beyond JSON
/// shape is not validated here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceFamily {
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

/// JSON object of namespace families, preserving key insertion order as
/// received on the wire. Iteration order drives downstream dedup order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceMap(#[serde(with = "ordered_families")] pub Vec<(String, NamespaceFamily)>);

impl NamespaceMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceFamily)> {
        self.0.iter().map(|(key, family)| (key.as_str(), family))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, family: NamespaceFamily) {
        self.0.push((key.into(), family));
    }
}

mod ordered_families {
    use super::NamespaceFamily;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(
        entries: &[(String, NamespaceFamily)],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, family) in entries {
            map.serialize_entry(key, family)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, NamespaceFamily)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Vec<(String, NamespaceFamily)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of namespace families")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, family)) = access.next_entry()? {
                    entries.push((key, family));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerMetadata {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icons: Vec<String>,
}

/// A WalletConnect session-connection request, as delivered by the sign SDK's
/// proposal event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionProposal {
    pub id: u64,
    #[serde(default)]
    pub proposer: Option<PeerMetadata>,
    #[serde(default)]
    pub required_namespaces: NamespaceMap,
    #[serde(default)]
    pub optional_namespaces: Option<NamespaceMap>,
}

/// A host-wallet account. `currency` is the chain key used as the join key
/// during reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub address: String,
    pub currency: String,
    pub balance: String,
}

/// One reconciled record per distinct chain requested by a proposal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountsInChain {
    pub chain: ChainKey,
    pub display_name: String,
    pub is_supported: bool,
    pub is_required: bool,
    pub accounts: Vec<Account>,
}

/// Namespace granted at approval time. `accounts` entries are CAIP-10
/// strings: `"<chain identifier>:<address>"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApprovedNamespace {
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub chain: ChainKey,
    pub chain_id: u64,
    pub namespace: String,
    pub ticker: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkListResponse {
    pub networks: Vec<NetworkInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccountsResponse {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRequest {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResponse {
    pub paired: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalReviewRequest {
    pub proposal: SessionProposal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalReviewResponse {
    pub chains: Vec<AccountsInChain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalApproveRequest {
    pub proposal: SessionProposal,
    pub selected_account_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRejectRequest {
    pub proposal_id: u64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRejectResponse {
    pub rejected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}
