use std::collections::BTreeSet;
use std::path::Path;

use proptest::prelude::*;

use testnetgen::combinations::OptionValue;
use testnetgen::generator::{
    default_testnet_matrix, generate, quorum, GenerateRequest, ARCHIVE_SNAPSHOT_INTERVAL,
};
use testnetgen::manifest::{Manifest, Mode};
use testnetgen::version::ResolveError;

fn fixed_release(_: &Path) -> Result<String, ResolveError> {
    Ok("v0.34.22".to_string())
}

fn generate_batch(seed: u64, multi_version: Option<&str>) -> Vec<Manifest> {
    let request =
        GenerateRequest::new(seed, ".").with_multi_version(multi_version.map(str::to_string));
    generate(&request, &fixed_release).unwrap()
}

fn check_manifest(manifest: &Manifest) -> Result<(), TestCaseError> {
    let validators = manifest.node_names(Mode::Validator);
    let at_genesis = validators
        .iter()
        .filter(|name| manifest.nodes[*name].start_at == 0)
        .count();
    prop_assert!(at_genesis >= quorum(validators.len()));

    if validators.len() >= 2 {
        let archives = validators
            .iter()
            .filter(|name| {
                let node = &manifest.nodes[*name];
                node.retain_blocks == 0 && node.snapshot_interval == ARCHIVE_SNAPSHOT_INTERVAL
            })
            .count();
        prop_assert!(archives >= 2);
    }

    prop_assert!(manifest.validators.is_empty() != manifest.init_chain_validators().is_none());
    let initial_set = manifest
        .init_chain_validators()
        .unwrap_or(&manifest.validators);
    prop_assert_eq!(initial_set.len(), at_genesis);

    for (height, update) in &manifest.validator_update {
        prop_assert!(height.parse::<u64>().is_ok());
        for name in update.keys() {
            prop_assert_eq!(manifest.nodes[name].mode, Mode::Validator);
        }
    }

    let seeds: BTreeSet<&String> = manifest
        .nodes
        .iter()
        .filter(|(_, node)| node.mode == Mode::Seed)
        .map(|(name, _)| name)
        .collect();

    for (name, node) in &manifest.nodes {
        for seed in &node.seeds {
            prop_assert!(seeds.contains(seed), "{} lists unknown seed {}", name, seed);
        }
        for peer in &node.persistent_peers {
            let target = manifest.nodes.get(peer);
            prop_assert!(target.is_some(), "{} lists unknown peer {}", name, peer);
            let target = target.unwrap();
            prop_assert!(target.start_at <= node.start_at);
            if node.mode == Mode::Light {
                prop_assert!(target.start_at == 0 || target.start_at == manifest.initial_height);
                prop_assert_eq!(target.retain_blocks, 0);
            }
        }
        if node.retain_blocks > 0 {
            prop_assert_ne!(node.persist_interval, Some(0));
            prop_assert!(node.retain_blocks >= node.snapshot_interval);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generated_testnets_are_safe(seed in any::<u64>()) {
        let manifests = generate_batch(seed, None);
        prop_assert_eq!(manifests.len(), 24);
        for manifest in &manifests {
            check_manifest(manifest)?;
        }
    }

    #[test]
    fn generated_versions_are_weighted_entries(seed in any::<u64>()) {
        let manifests = generate_batch(seed, Some("v0.34.0:1,latest:2,local:1"));
        let allowed = ["v0.34.0", "v0.34.22", ""];
        for node in manifests.iter().flat_map(|m| m.nodes.values()) {
            prop_assert!(allowed.contains(&node.version.as_str()));
        }
    }
}

#[test]
fn test_options_carried_into_manifests() {
    let manifests = generate_batch(4827085738, None);
    let heights: BTreeSet<u64> = manifests.iter().map(|m| m.initial_height).collect();
    assert_eq!(heights, BTreeSet::from([0, 1000]));

    let with_state = manifests.iter().filter(|m| !m.initial_state.is_empty()).count();
    assert_eq!(with_state, 12);

    let init_chain = manifests
        .iter()
        .filter(|m| m.init_chain_validators().is_some())
        .count();
    assert_eq!(init_chain, 12);

    let singles = manifests.iter().filter(|m| m.nodes.len() == 1).count();
    assert_eq!(singles, 8);
}

#[test]
fn test_same_seed_gives_identical_files() {
    let render = |manifests: &[Manifest]| -> Vec<String> {
        manifests
            .iter()
            .map(|m| serde_yaml::to_string(m).unwrap())
            .collect()
    };

    let first = render(&generate_batch(99, Some("v0.34.0:1,local:1")));
    let second = render(&generate_batch(99, Some("v0.34.0:1,local:1")));
    assert_eq!(first, second);

    let other = render(&generate_batch(100, Some("v0.34.0:1,local:1")));
    assert_ne!(first, other);
}

#[test]
fn test_invalid_matrix_value_fails_batch() {
    let mut matrix = default_testnet_matrix();
    matrix.insert("initialHeight".to_string(), vec![OptionValue::Str("high".into())]);
    let request = GenerateRequest::new(1, ".").with_matrix(matrix);
    assert!(generate(&request, &fixed_release).is_err());
}
