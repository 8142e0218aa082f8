//! Choice tables for randomized testnet settings.
//!
//! A `ChoiceTables` value is built once per run and passed down to every
//! generator call, so nothing about a run lives in shared state.

use crate::choice::{ProbSetChoice, UniformChoice, WeightedChoice};
use crate::generator::GenerateError;
use crate::manifest::{
    AbciProtocol, BlockSync, Database, Mempool, Perturbation, PrivvalProtocol, EVIDENCE_AGE_HEIGHT,
};
use crate::version::default_node_versions;
use std::time::Duration;

/// Delay tier applied to the ABCI callbacks of a testnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbciDelay {
    None,
    Small,
    Large,
}

impl AbciDelay {
    /// `(prepare_proposal, process_proposal, check_tx)` delays for this tier.
    pub fn durations(self) -> (Duration, Duration, Duration) {
        match self {
            AbciDelay::None => (Duration::ZERO, Duration::ZERO, Duration::ZERO),
            AbciDelay::Small => (
                Duration::from_millis(100),
                Duration::from_millis(100),
                Duration::ZERO,
            ),
            AbciDelay::Large => (
                Duration::from_millis(200),
                Duration::from_millis(200),
                Duration::from_millis(20),
            ),
        }
    }
}

/// Every randomized setting the generator draws from.
#[derive(Debug, Clone)]
pub struct ChoiceTables {
    pub node_versions: WeightedChoice<String>,
    pub ipv6: UniformChoice<bool>,
    pub abci_protocols: UniformChoice<AbciProtocol>,
    pub evidence: UniformChoice<u32>,
    pub abci_delays: UniformChoice<AbciDelay>,
    pub databases: UniformChoice<Database>,
    pub privval_protocols: UniformChoice<PrivvalProtocol>,
    pub block_syncs: UniformChoice<BlockSync>,
    pub state_syncs: UniformChoice<bool>,
    pub mempools: UniformChoice<Mempool>,
    pub persist_intervals: UniformChoice<u64>,
    pub snapshot_intervals: UniformChoice<u64>,
    pub retain_blocks: UniformChoice<u64>,
    pub perturbations: ProbSetChoice<Perturbation>,
}

impl Default for ChoiceTables {
    fn default() -> Self {
        Self {
            node_versions: default_node_versions(),
            ipv6: vec![false, true].into(),
            // no grpc
            abci_protocols: vec![
                AbciProtocol::Unix,
                AbciProtocol::Tcp,
                AbciProtocol::Builtin,
                AbciProtocol::BuiltinUnsync,
            ]
            .into(),
            evidence: vec![0, 1, 10].into(),
            abci_delays: vec![AbciDelay::None, AbciDelay::Small, AbciDelay::Large].into(),
            databases: vec![
                Database::GoLevelDb,
                Database::CLevelDb,
                Database::RocksDb,
                Database::BoltDb,
                Database::BadgerDb,
            ]
            .into(),
            privval_protocols: vec![
                PrivvalProtocol::File,
                PrivvalProtocol::Unix,
                PrivvalProtocol::Tcp,
            ]
            .into(),
            block_syncs: vec![BlockSync::V0].into(),
            state_syncs: vec![false, true].into(),
            mempools: vec![Mempool::V0, Mempool::V1].into(),
            persist_intervals: vec![0, 1, 5].into(),
            snapshot_intervals: vec![0, 3].into(),
            retain_blocks: vec![0, 2 * EVIDENCE_AGE_HEIGHT, 4 * EVIDENCE_AGE_HEIGHT].into(),
            perturbations: [
                (Perturbation::Disconnect, 0.1),
                (Perturbation::Pause, 0.1),
                (Perturbation::Kill, 0.1),
                (Perturbation::Restart, 0.1),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl ChoiceTables {
    /// Replace the node version table, keeping every other setting.
    pub fn with_node_versions(mut self, node_versions: WeightedChoice<String>) -> Self {
        self.node_versions = node_versions;
        self
    }

    /// Check that every table can produce a value.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.node_versions.total_weight() == 0 {
            return Err(GenerateError::EmptyChoiceTable("node_versions"));
        }
        let empty = [
            ("ipv6", self.ipv6.is_empty()),
            ("abci_protocols", self.abci_protocols.is_empty()),
            ("evidence", self.evidence.is_empty()),
            ("abci_delays", self.abci_delays.is_empty()),
            ("databases", self.databases.is_empty()),
            ("privval_protocols", self.privval_protocols.is_empty()),
            ("block_syncs", self.block_syncs.is_empty()),
            ("state_syncs", self.state_syncs.is_empty()),
            ("mempools", self.mempools.is_empty()),
            ("persist_intervals", self.persist_intervals.is_empty()),
            ("snapshot_intervals", self.snapshot_intervals.is_empty()),
            ("retain_blocks", self.retain_blocks.is_empty()),
        ];
        match empty.into_iter().find(|(_, is_empty)| *is_empty) {
            Some((name, _)) => Err(GenerateError::EmptyChoiceTable(name)),
            None => Ok(()),
        }
    }
}
