//! # Testnet Manifest Module
//!
//! Declarative descriptions of generated testnets. A manifest lists every
//! node with its role, start height, storage and sync settings, injected
//! faults and discovery wiring, plus network-wide settings such as the
//! genesis validator set and scheduled validator set transitions.
//!
//! ## Naming
//!
//! Node names are generated, never user supplied, and carry their role as a
//! prefix followed by a two-digit 1-based index (`seed01`, `validator03`,
//! `full02`, `light01`).
//!
//! ## Validator Sets
//!
//! Exactly one of `validators` (genesis) and `validator_update["0"]`
//! (InitChain) carries the initial set. Later transitions are keyed by the
//! decimal height at which they take effect.
//!
//! ## Example
//!
//! ```yaml
//! ipv6: false
//! initial_height: 1000
//! validators:
//!   validator01: 57
//!   validator02: 91
//! nodes:
//!   validator01:
//!     mode: validator
//!     database: rocksdb
//!     snapshot_interval: 3
//!     retain_blocks: 0
//! abci_protocol: builtin
//! evidence: 10
//! prepare_proposal_delay: 100ms
//! ```

pub mod types;

pub use types::{
    AbciProtocol, BlockSync, Database, Manifest, ManifestNode, Mempool, Mode, Perturbation,
    PrivvalProtocol, EVIDENCE_AGE_HEIGHT,
};
