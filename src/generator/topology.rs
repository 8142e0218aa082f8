//! Testnet topology construction.
//!
//! Builds a full manifest for one set of options: network-wide settings,
//! seeds, validators (with their genesis power or delayed set transition),
//! full nodes, discovery wiring and finally light clients. The order of RNG
//! draws below is part of the reproducibility contract.

use crate::choice::uniform_set_choice;
use crate::generator::node::{generate_light_node, generate_node};
use crate::generator::options::{TestnetOptions, Topology, ValidatorsOption};
use crate::generator::ChoiceTables;
use crate::manifest::{Manifest, Mode};
use log::debug;
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Blocks between successive delayed node starts.
pub const START_HEIGHT_SPACING: u64 = 5;

/// Voting power given to each validator.
pub const VALIDATOR_POWER: RangeInclusive<u64> = 30..=100;

/// Number of nodes of each role in a testnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkShape {
    pub seeds: usize,
    pub validators: usize,
    pub fulls: usize,
    pub light_clients: usize,
}

impl NetworkShape {
    /// Draw the node counts for `topology`. Only `large` consumes randomness.
    pub fn for_topology<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Self {
        match topology {
            Topology::Single => Self {
                validators: 1,
                ..Self::default()
            },
            Topology::Quad => Self {
                validators: 4,
                ..Self::default()
            },
            Topology::Large => {
                let seeds = rng.gen_range(0..2);
                let light_clients = rng.gen_range(0..3);
                let validators = 4 + rng.gen_range(0..4);
                let fulls = rng.gen_range(0..4);
                Self {
                    seeds,
                    validators,
                    fulls,
                    light_clients,
                }
            }
        }
    }
}

/// Smallest number of validators holding more than two thirds of the set.
pub fn quorum(validators: usize) -> usize {
    validators * 2 / 3 + 1
}

/// Generate one testnet manifest.
pub fn generate_testnet<R: Rng + ?Sized>(
    rng: &mut R,
    tables: &ChoiceTables,
    options: &TestnetOptions,
) -> Manifest {
    let ipv6 = tables.ipv6.choose(rng);
    let abci_protocol = tables.abci_protocols.choose(rng);
    let evidence = tables.evidence.choose(rng);
    let mut manifest = Manifest::new(
        ipv6,
        abci_protocol,
        options.initial_height,
        options.initial_state.clone(),
        evidence,
    );

    let delay = tables.abci_delays.choose(rng);
    (
        manifest.prepare_proposal_delay,
        manifest.process_proposal_delay,
        manifest.check_tx_delay,
    ) = delay.durations();

    let shape = NetworkShape::for_topology(options.topology, rng);
    debug!(
        "Testnet {} at height {}: {} seeds, {} validators, {} full nodes, {} light clients",
        options.topology,
        options.initial_height,
        shape.seeds,
        shape.validators,
        shape.fulls,
        shape.light_clients
    );

    for i in 1..=shape.seeds {
        let node = generate_node(rng, tables, Mode::Seed, 0, false);
        manifest.nodes.insert(Mode::Seed.node_name(i), node);
    }

    // A quorum starts at genesis and the first two are archive nodes. The
    // rest join later through validator set updates.
    let mut next_start_at = options.initial_height + START_HEIGHT_SPACING;
    let quorum = quorum(shape.validators);
    for i in 1..=shape.validators {
        let start_at = if i > quorum {
            let start_at = next_start_at;
            next_start_at += START_HEIGHT_SPACING;
            start_at
        } else {
            0
        };
        let name = Mode::Validator.node_name(i);
        let node = generate_node(rng, tables, Mode::Validator, start_at, i <= 2);
        manifest.nodes.insert(name.clone(), node);

        let power = rng.gen_range(VALIDATOR_POWER);
        if start_at == 0 {
            manifest.validators.insert(name, power);
        } else {
            manifest.validator_update.insert(
                (start_at + START_HEIGHT_SPACING).to_string(),
                BTreeMap::from([(name, power)]),
            );
        }
    }

    match options.validators {
        ValidatorsOption::Genesis => {}
        ValidatorsOption::InitChain => {
            let initial = std::mem::take(&mut manifest.validators);
            manifest.validator_update.insert("0".to_string(), initial);
        }
    }

    for i in 1..=shape.fulls {
        let start_at = if rng.gen_bool(0.5) {
            let start_at = next_start_at;
            next_start_at += START_HEIGHT_SPACING;
            start_at
        } else {
            0
        };
        let node = generate_node(rng, tables, Mode::Full, start_at, false);
        manifest.nodes.insert(Mode::Full.node_name(i), node);
    }

    let light_providers = wire_peers(rng, &mut manifest);

    for i in 1..=shape.light_clients {
        let start_at = options.initial_height + START_HEIGHT_SPACING * (1 + i as u64);
        let node = generate_light_node(rng, tables, start_at, &light_providers);
        manifest.nodes.insert(Mode::Light.node_name(i), node);
    }

    manifest
}

/// Set up peer discovery and return the names of light client providers.
///
/// Seeds are fully meshed. Every other node, taken in (start height, name)
/// order, either bootstraps from a random subset of seeds or connects to a
/// random subset of nodes that come strictly before it, so persistent peers
/// never point forward in start order.
fn wire_peers<R: Rng + ?Sized>(rng: &mut R, manifest: &mut Manifest) -> Vec<String> {
    let initial_height = manifest.initial_height;

    let mut seed_names = Vec::new();
    let mut peers: Vec<(u64, String)> = Vec::new();
    let mut light_providers = Vec::new();
    for (name, node) in &manifest.nodes {
        if node.mode == Mode::Seed {
            seed_names.push(name.clone());
            continue;
        }
        if node.is_light_provider(initial_height) {
            light_providers.push(name.clone());
        }
        peers.push((node.start_at, name.clone()));
    }

    for name in &seed_names {
        let others: Vec<String> = seed_names
            .iter()
            .filter(|other| *other != name)
            .cloned()
            .collect();
        if let Some(node) = manifest.nodes.get_mut(name) {
            node.seeds = others;
        }
    }

    peers.sort();
    let peer_names: Vec<String> = peers.into_iter().map(|(_, name)| name).collect();
    for (i, name) in peer_names.iter().enumerate() {
        let use_seeds = !seed_names.is_empty() && (i == 0 || rng.gen_bool(0.5));
        let Some(node) = manifest.nodes.get_mut(name) else {
            continue;
        };
        if use_seeds {
            node.seeds = uniform_set_choice(&seed_names, rng);
            debug!("{} bootstraps from seeds {:?}", name, node.seeds);
        } else if i > 0 {
            node.persistent_peers = uniform_set_choice(&peer_names[..i], rng);
            debug!("{} connects to peers {:?}", name, node.persistent_peers);
        }
    }

    light_providers
}
