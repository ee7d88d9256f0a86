use sb_api_types::{ChainKey, NetworkInfo};

/// Build-time chain metadata. The table below is the authoritative list of
/// networks the host wallet can fund; it is never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEntry {
    pub chain_id: u64,
    pub namespace: &'static str,
    pub ticker: &'static str,
    pub display_name: &'static str,
}

const NETWORKS: &[(&str, NetworkEntry)] = &[
    (
        "ethereum",
        NetworkEntry {
            chain_id: 1,
            namespace: "eip155",
            ticker: "ETH",
            display_name: "Ethereum",
        },
    ),
    (
        "optimism",
        NetworkEntry {
            chain_id: 10,
            namespace: "eip155",
            ticker: "ETH",
            display_name: "OP Mainnet",
        },
    ),
    (
        "bsc",
        NetworkEntry {
            chain_id: 56,
            namespace: "eip155",
            ticker: "BNB",
            display_name: "BNB Smart Chain",
        },
    ),
    (
        "polygon",
        NetworkEntry {
            chain_id: 137,
            namespace: "eip155",
            ticker: "POL",
            display_name: "Polygon",
        },
    ),
    (
        "fantom",
        NetworkEntry {
            chain_id: 250,
            namespace: "eip155",
            ticker: "FTM",
            display_name: "Fantom",
        },
    ),
    (
        "base",
        NetworkEntry {
            chain_id: 8453,
            namespace: "eip155",
            ticker: "ETH",
            display_name: "Base",
        },
    ),
    (
        "arbitrum",
        NetworkEntry {
            chain_id: 42161,
            namespace: "eip155",
            ticker: "ETH",
            display_name: "Arbitrum One",
        },
    ),
    (
        "avalanche_c_chain",
        NetworkEntry {
            chain_id: 43114,
            namespace: "eip155",
            ticker: "AVAX",
            display_name: "Avalanche C-Chain",
        },
    ),
];

pub fn entry(chain_key: &str) -> Option<&'static NetworkEntry> {
    NETWORKS
        .iter()
        .find(|(key, _)| *key == chain_key)
        .map(|(_, network)| network)
}

pub fn is_supported(chain_key: &str) -> bool {
    entry(chain_key).is_some()
}

/// Display name for a chain key, falling back to the key itself when the key
/// is not in the registry.
pub fn display_name(chain_key: &str) -> &str {
    match entry(chain_key) {
        Some(network) => network.display_name,
        None => chain_key,
    }
}

pub fn all() -> Vec<NetworkInfo> {
    NETWORKS
        .iter()
        .map(|(key, network)| NetworkInfo {
            chain: ChainKey((*key).to_owned()),
            chain_id: network.chain_id,
            namespace: network.namespace.to_owned(),
            ticker: network.ticker.to_owned(),
            display_name: network.display_name.to_owned(),
        })
        .collect()
}

/// Maps a protocol-level chain identifier to a short chain key.
///
/// The reconciler treats this mapping as a pluggable contract; implementors
/// must return a best-effort key for identifiers they cannot map, never fail.
pub trait ChainResolver: Send + Sync {
    fn chain_key(&self, chain_id: &str) -> ChainKey;
}

/// Registry-backed resolver: `"<namespace>:<numeric reference>"` resolves to
/// the chain key of the matching registry entry. Anything else (unknown
/// namespace, non-numeric reference, no separator) is returned unchanged, so
/// downstream support checks come up false rather than guessing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryResolver;

impl ChainResolver for RegistryResolver {
    fn chain_key(&self, chain_id: &str) -> ChainKey {
        if let Some((namespace, reference)) = chain_id.split_once(':') {
            if let Ok(numeric) = reference.parse::<u64>() {
                let matched = NETWORKS
                    .iter()
                    .find(|(_, network)| {
                        network.namespace == namespace && network.chain_id == numeric
                    })
                    .map(|(key, _)| *key);
                if let Some(key) = matched {
                    return ChainKey(key.to_owned());
                }
            }
        }

        ChainKey(chain_id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup_round_trip() {
        let ethereum = entry("ethereum").expect("ethereum should be registered");
        assert_eq!(ethereum.chain_id, 1);
        assert_eq!(ethereum.namespace, "eip155");
        assert!(is_supported("polygon"));
        assert!(!is_supported("dogecoin"));
    }

    #[test]
    fn display_name_falls_back_to_chain_key() {
        assert_eq!(display_name("arbitrum"), "Arbitrum One");
        assert_eq!(display_name("optionalChain:1"), "optionalChain:1");
    }

    #[test]
    fn resolver_maps_known_caip2_identifiers() {
        let resolver = RegistryResolver;
        assert_eq!(resolver.chain_key("eip155:1").as_str(), "ethereum");
        assert_eq!(resolver.chain_key("eip155:137").as_str(), "polygon");
        assert_eq!(resolver.chain_key("eip155:43114").as_str(), "avalanche_c_chain");
    }

    #[test]
    fn resolver_passes_through_unmapped_identifiers() {
        let resolver = RegistryResolver;
        assert_eq!(resolver.chain_key("eip155:230").as_str(), "eip155:230");
        assert_eq!(
            resolver.chain_key("optionalChain:1").as_str(),
            "optionalChain:1"
        );
        assert_eq!(resolver.chain_key("solana").as_str(), "solana");
    }
}
