//! Testnet manifest type definitions.
//!
//! These structures are the declarative output of the generator: one
//! `Manifest` per testnet, holding a `ManifestNode` for every node. They are
//! serialized as-is by the output layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Number of blocks after which evidence expires in generated testnets.
pub const EVIDENCE_AGE_HEIGHT: u64 = 7;

// ============================================================================
// Enumerated node settings
// ============================================================================

/// Role a node plays in the testnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Seed,
    Validator,
    Full,
    Light,
}

impl Mode {
    /// Prefix used when naming nodes of this role, e.g. `validator` in
    /// `validator03`.
    pub fn name_prefix(self) -> &'static str {
        match self {
            Mode::Seed => "seed",
            Mode::Validator => "validator",
            Mode::Full => "full",
            Mode::Light => "light",
        }
    }

    /// Name of the `index`-th node (1-based) of this role.
    pub fn node_name(self, index: usize) -> String {
        format!("{}{:02}", self.name_prefix(), index)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_prefix())
    }
}

/// Transport between the consensus engine and the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbciProtocol {
    Unix,
    Tcp,
    Builtin,
    BuiltinUnsync,
}

/// Storage engine backing the node's block and state stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    GoLevelDb,
    CLevelDb,
    RocksDb,
    BoltDb,
    BadgerDb,
}

/// Transport used to reach the validator's signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivvalProtocol {
    File,
    Unix,
    Tcp,
}

/// Block sync reactor version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockSync {
    V0,
}

/// Mempool implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mempool {
    V0,
    V1,
}

/// Fault injected into a running node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perturbation {
    Disconnect,
    Pause,
    Kill,
    Restart,
}

// ============================================================================
// Manifest structures
// ============================================================================

/// One generated testnet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Whether nodes use IPv6 addresses
    pub ipv6: bool,
    /// Height of the first block
    pub initial_height: u64,
    /// Initial key/value state of the application
    #[serde(default)]
    pub initial_state: BTreeMap<String, String>,
    /// Genesis validator set; empty when validators come from InitChain
    #[serde(default)]
    pub validators: BTreeMap<String, u64>,
    /// Validator set transitions keyed by the decimal height they apply at
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validator_update: BTreeMap<String, BTreeMap<String, u64>>,
    /// All nodes, keyed by generated name
    pub nodes: BTreeMap<String, ManifestNode>,
    /// Transport between consensus and application
    pub abci_protocol: AbciProtocol,
    /// Number of evidence items to inject
    pub evidence: u32,
    #[serde(default, with = "humantime_serde")]
    pub prepare_proposal_delay: Duration,
    #[serde(default, with = "humantime_serde")]
    pub process_proposal_delay: Duration,
    #[serde(default, with = "humantime_serde")]
    pub check_tx_delay: Duration,
}

impl Manifest {
    /// Create an empty manifest with no nodes, validators or delays.
    pub fn new(
        ipv6: bool,
        abci_protocol: AbciProtocol,
        initial_height: u64,
        initial_state: BTreeMap<String, String>,
        evidence: u32,
    ) -> Self {
        Self {
            ipv6,
            initial_height,
            initial_state,
            validators: BTreeMap::new(),
            validator_update: BTreeMap::new(),
            nodes: BTreeMap::new(),
            abci_protocol,
            evidence,
            prepare_proposal_delay: Duration::ZERO,
            process_proposal_delay: Duration::ZERO,
            check_tx_delay: Duration::ZERO,
        }
    }

    /// Names of all nodes with the given role, in name order.
    pub fn node_names(&self, mode: Mode) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.mode == mode)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Validator set installed through InitChain, if any.
    pub fn init_chain_validators(&self) -> Option<&BTreeMap<String, u64>> {
        self.validator_update.get("0")
    }
}

/// Configuration of a single testnet node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    pub mode: Mode,
    /// Software version; empty means the locally built binary
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Height at which the node joins; 0 means genesis
    #[serde(default)]
    pub start_at: u64,
    pub database: Database,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privval_protocol: Option<PrivvalProtocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_sync: Option<BlockSync>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mempool: Option<Mempool>,
    #[serde(default)]
    pub state_sync: bool,
    /// Persist state every N blocks; `None` persists every block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_interval: Option<u64>,
    /// Take a state sync snapshot every N blocks; 0 disables snapshots
    #[serde(default)]
    pub snapshot_interval: u64,
    /// Number of trailing blocks kept; 0 keeps everything
    #[serde(default)]
    pub retain_blocks: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perturb: Vec<Perturbation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seeds: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persistent_peers: Vec<String>,
}

impl ManifestNode {
    /// An archive node keeps every block and serves snapshots.
    pub fn is_archive(&self) -> bool {
        self.retain_blocks == 0 && self.snapshot_interval > 0
    }

    /// Whether this node can back light clients: it must be present from
    /// the start of the chain and keep every block.
    pub fn is_light_provider(&self, initial_height: u64) -> bool {
        self.mode != Mode::Seed
            && self.mode != Mode::Light
            && (self.start_at == 0 || self.start_at == initial_height)
            && self.retain_blocks == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(mode: Mode, start_at: u64, retain_blocks: u64) -> ManifestNode {
        ManifestNode {
            mode,
            version: String::new(),
            start_at,
            database: Database::GoLevelDb,
            privval_protocol: Some(PrivvalProtocol::File),
            block_sync: Some(BlockSync::V0),
            mempool: Some(Mempool::V0),
            state_sync: false,
            persist_interval: None,
            snapshot_interval: 0,
            retain_blocks,
            perturb: Vec::new(),
            seeds: Vec::new(),
            persistent_peers: Vec::new(),
        }
    }

    #[test]
    fn test_node_names() {
        assert_eq!(Mode::Seed.node_name(1), "seed01");
        assert_eq!(Mode::Validator.node_name(7), "validator07");
        assert_eq!(Mode::Light.node_name(12), "light12");
    }

    #[test]
    fn test_light_provider_rules() {
        assert!(node(Mode::Validator, 0, 0).is_light_provider(1000));
        assert!(node(Mode::Full, 1000, 0).is_light_provider(1000));
        assert!(!node(Mode::Full, 1005, 0).is_light_provider(1000));
        assert!(!node(Mode::Validator, 0, 14).is_light_provider(0));
        assert!(!node(Mode::Seed, 0, 0).is_light_provider(0));
    }

    #[test]
    fn test_node_serialization_omits_absent_fields() {
        let mut n = node(Mode::Full, 0, 0);
        n.privval_protocol = None;
        n.persist_interval = Some(0);
        n.perturb = vec![Perturbation::Kill];

        let yaml = serde_yaml::to_string(&n).unwrap();
        assert!(yaml.contains("mode: full"));
        assert!(yaml.contains("database: goleveldb"));
        assert!(yaml.contains("persist_interval: 0"));
        assert!(yaml.contains("- kill"));
        assert!(!yaml.contains("privval_protocol"));
        assert!(!yaml.contains("version"));
        assert!(!yaml.contains("seeds"));
    }

    #[test]
    fn test_manifest_delay_round_trip() {
        let mut manifest =
            Manifest::new(true, AbciProtocol::BuiltinUnsync, 1000, BTreeMap::new(), 10);
        manifest.prepare_proposal_delay = Duration::from_millis(200);
        manifest.check_tx_delay = Duration::from_millis(20);
        manifest.nodes.insert("validator01".into(), node(Mode::Validator, 0, 0));

        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(yaml.contains("abci_protocol: builtin_unsync"));
        assert!(yaml.contains("prepare_proposal_delay: 200ms"));

        let parsed: Manifest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.node_names(Mode::Validator), vec!["validator01"]);
    }
}
