//! # Testnetgen - Randomized testnet manifest generator
//!
//! This library generates declarative manifests describing test networks of
//! a BFT consensus node, for end-to-end testing.
//!
//! ## Overview
//!
//! Every generated manifest is one testnet: its topology, node roles, start
//! heights, storage settings, validator set and validator set changes, peer
//! wiring, fault injections and light clients. A run expands an option
//! matrix into every combination and generates one testnet per combination,
//! drawing every randomized setting from a single seeded RNG.
//!
//! ## Key Features
//!
//! - **Reproducible**: The same seed and options produce byte-identical manifests
//! - **Safe by construction**: Quorum at genesis, archive nodes for state sync,
//!   peers that are always up before the nodes dialing them
//! - **Multi-version networks**: Weighted node versions, including the latest
//!   compatible release found in the git repository
//! - **Grouping**: Manifests can be split into groups for parallel CI jobs
//!
//! ## Architecture
//!
//! - `choice`: Uniform, weighted and probabilistic random choice
//! - `combinations`: Cartesian expansion of the option matrix
//! - `manifest`: Manifest data structures and serialization
//! - `version`: Weighted version specifications and release tag resolution
//! - `generator`: Testnet and node generation
//! - `config` / `config_loader`: Run configuration and YAML loading
//! - `output`: Writing manifests to disk
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use testnetgen::{config_loader, generator, output, version::GitTagResolver};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("generator.yaml"))?;
//! let dir = Path::new("networks/generated");
//!
//! let resolver = GitTagResolver::new(config.base_version());
//! let manifests = generator::generate(&config.generate_request(dir), &resolver)?;
//! output::write_manifests(dir, &manifests, config.groups(), config.format())?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Generation errors are typed (`GenerateError`, `VersionError`,
//! `ValidationError`); file loading and writing use `color_eyre` for
//! error reporting with context.

pub mod choice;
pub mod combinations;
pub mod config;
pub mod config_loader;
pub mod generator;
pub mod manifest;
pub mod output;
pub mod version;
