//! Per-node randomized configuration.
//!
//! Seeds and peers are left empty here; they depend on the whole network
//! and its start order, which only the topology builder knows.

use crate::generator::ChoiceTables;
use crate::manifest::{ManifestNode, Mode};
use log::debug;
use rand::Rng;

/// Snapshot interval forced on archive nodes.
pub const ARCHIVE_SNAPSHOT_INTERVAL: u64 = 3;

/// Randomly generate one node starting at `start_at`.
///
/// Draws happen in a fixed order (version, database, privval, block sync,
/// mempool, state sync, persist interval, snapshot interval, retained
/// blocks, perturbations) and are followed by [`reconcile_storage`], which
/// may draw once more.
pub fn generate_node<R: Rng + ?Sized>(
    rng: &mut R,
    tables: &ChoiceTables,
    mode: Mode,
    start_at: u64,
    force_archive: bool,
) -> ManifestNode {
    let mut node = ManifestNode {
        mode,
        version: tables.node_versions.choose(rng),
        start_at,
        database: tables.databases.choose(rng),
        privval_protocol: Some(tables.privval_protocols.choose(rng)),
        block_sync: Some(tables.block_syncs.choose(rng)),
        mempool: Some(tables.mempools.choose(rng)),
        // Only nodes joining after genesis have anything to sync from.
        state_sync: tables.state_syncs.choose(rng) && start_at > 0,
        persist_interval: Some(tables.persist_intervals.choose(rng)),
        snapshot_interval: tables.snapshot_intervals.choose(rng),
        retain_blocks: tables.retain_blocks.choose(rng),
        perturb: tables.perturbations.choose(rng),
        seeds: Vec::new(),
        persistent_peers: Vec::new(),
    };

    reconcile_storage(rng, &mut node, force_archive);
    node
}

/// Resolve conflicts between persistence, snapshotting and pruning.
///
/// In order:
/// 1. archive nodes keep every block and snapshot every
///    [`ARCHIVE_SNAPSHOT_INTERVAL`] blocks
/// 2. a node that never persists state must not prune either, so either
///    pruning is turned off or state is persisted at the retention interval
/// 3. pruning never drops below the persist or snapshot interval
pub fn reconcile_storage<R: Rng + ?Sized>(
    rng: &mut R,
    node: &mut ManifestNode,
    force_archive: bool,
) {
    if force_archive {
        node.retain_blocks = 0;
        node.snapshot_interval = ARCHIVE_SNAPSHOT_INTERVAL;
    }

    if node.persist_interval == Some(0) && node.retain_blocks > 0 {
        if rng.gen_bool(0.5) {
            node.retain_blocks = 0;
        } else {
            node.persist_interval = Some(node.retain_blocks);
        }
    }

    if node.retain_blocks > 0 {
        if let Some(persist) = node.persist_interval {
            node.retain_blocks = node.retain_blocks.max(persist);
        }
        node.retain_blocks = node.retain_blocks.max(node.snapshot_interval);
    }
}

/// Generate a light client that trusts `providers`.
pub fn generate_light_node<R: Rng + ?Sized>(
    rng: &mut R,
    tables: &ChoiceTables,
    start_at: u64,
    providers: &[String],
) -> ManifestNode {
    let version = tables.node_versions.choose(rng);
    let database = tables.databases.choose(rng);
    debug!("Light client starting at {} trusts {:?}", start_at, providers);

    ManifestNode {
        mode: Mode::Light,
        version,
        start_at,
        database,
        privval_protocol: None,
        block_sync: None,
        mempool: None,
        state_sync: false,
        persist_interval: Some(0),
        snapshot_interval: 0,
        retain_blocks: 0,
        perturb: Vec::new(),
        seeds: Vec::new(),
        persistent_peers: providers.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::UniformChoice;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tables(persist: u64, snapshot: u64, retain: u64) -> ChoiceTables {
        ChoiceTables {
            persist_intervals: UniformChoice::new(vec![persist]),
            snapshot_intervals: UniformChoice::new(vec![snapshot]),
            retain_blocks: UniformChoice::new(vec![retain]),
            ..ChoiceTables::default()
        }
    }

    #[test]
    fn test_forced_archive_overrides_draws() {
        let tables = tables(1, 0, 28);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let node = generate_node(&mut rng, &tables, Mode::Validator, 0, true);
        assert_eq!(node.retain_blocks, 0);
        assert_eq!(node.snapshot_interval, ARCHIVE_SNAPSHOT_INTERVAL);
        assert!(node.is_archive());
    }

    #[test]
    fn test_unpersisted_pruning_is_resolved() {
        let tables = tables(0, 0, 14);
        let mut outcomes = (false, false);
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let node = generate_node(&mut rng, &tables, Mode::Full, 0, false);
            match (node.persist_interval, node.retain_blocks) {
                (Some(0), 0) => outcomes.0 = true,
                (Some(14), 14) => outcomes.1 = true,
                other => panic!("unexpected storage settings {:?}", other),
            }
        }
        assert!(outcomes.0 && outcomes.1, "both resolutions should occur");
    }

    #[test]
    fn test_retention_raised_to_intervals() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let node = generate_node(&mut rng, &tables(5, 0, 2), Mode::Full, 0, false);
        assert_eq!(node.retain_blocks, 5);

        let node = generate_node(&mut rng, &tables(1, 3, 2), Mode::Full, 0, false);
        assert_eq!(node.retain_blocks, 3);

        let node = generate_node(&mut rng, &tables(5, 3, 28), Mode::Full, 0, false);
        assert_eq!(node.retain_blocks, 28);
    }

    #[test]
    fn test_state_sync_only_after_genesis() {
        let tables = ChoiceTables {
            state_syncs: UniformChoice::new(vec![true]),
            ..ChoiceTables::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(!generate_node(&mut rng, &tables, Mode::Full, 0, false).state_sync);
        assert!(generate_node(&mut rng, &tables, Mode::Full, 1010, false).state_sync);
    }

    #[test]
    fn test_default_nodes_satisfy_storage_invariants() {
        let tables = ChoiceTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for i in 0..500 {
            let node = generate_node(&mut rng, &tables, Mode::Validator, 0, i % 7 == 0);
            assert!(node.persist_interval.is_some());
            if node.retain_blocks > 0 {
                assert_ne!(node.persist_interval, Some(0));
                assert!(node.retain_blocks >= node.persist_interval.unwrap_or(0));
                assert!(node.retain_blocks >= node.snapshot_interval);
            }
            assert!(node.seeds.is_empty() && node.persistent_peers.is_empty());
        }
    }

    #[test]
    fn test_light_node() {
        let tables = ChoiceTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let providers = vec!["validator01".to_string(), "validator02".to_string()];
        let node = generate_light_node(&mut rng, &tables, 1010, &providers);

        assert_eq!(node.mode, Mode::Light);
        assert_eq!(node.start_at, 1010);
        assert_eq!(node.persist_interval, Some(0));
        assert_eq!(node.persistent_peers, providers);
        assert!(node.seeds.is_empty());
        assert!(node.privval_protocol.is_none());
        assert!(node.block_sync.is_none() && node.mempool.is_none());
    }
}
