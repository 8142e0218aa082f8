//! Per-testnet options and the default option matrix.

use crate::combinations::{Combination, OptionMatrix, OptionValue};
use crate::generator::GenerateError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const TOPOLOGY_AXIS: &str = "topology";
pub const INITIAL_HEIGHT_AXIS: &str = "initialHeight";
pub const INITIAL_STATE_AXIS: &str = "initialState";
pub const VALIDATORS_AXIS: &str = "validators";

/// Overall network shape of a testnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// One validator
    Single,
    /// Four validators
    Quad,
    /// Randomly sized network with seeds, full nodes and light clients
    Large,
}

impl FromStr for Topology {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Topology::Single),
            "quad" => Ok(Topology::Quad),
            "large" => Ok(Topology::Large),
            other => Err(GenerateError::UnknownTopology(other.to_string())),
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Topology::Single => "single",
            Topology::Quad => "quad",
            Topology::Large => "large",
        })
    }
}

/// How the initial validator set reaches the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorsOption {
    /// Validators are listed in the genesis document
    Genesis,
    /// Validators are returned by the application from InitChain
    InitChain,
}

impl FromStr for ValidatorsOption {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genesis" => Ok(ValidatorsOption::Genesis),
            "initchain" => Ok(ValidatorsOption::InitChain),
            other => Err(GenerateError::InvalidValidators(other.to_string())),
        }
    }
}

/// Typed view of one combination from the option matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TestnetOptions {
    pub topology: Topology,
    pub initial_height: u64,
    pub initial_state: BTreeMap<String, String>,
    pub validators: ValidatorsOption,
}

impl TestnetOptions {
    /// Read the four testnet axes out of a combination.
    pub fn from_combination(combination: &Combination) -> Result<Self, GenerateError> {
        let topology: Topology = axis_str(combination, TOPOLOGY_AXIS)?.parse()?;
        let validators: ValidatorsOption = axis_str(combination, VALIDATORS_AXIS)?.parse()?;

        let height = axis(combination, INITIAL_HEIGHT_AXIS)?;
        let initial_height = height
            .as_int()
            .and_then(|h| u64::try_from(h).ok())
            .ok_or_else(|| invalid_type(INITIAL_HEIGHT_AXIS, "non-negative integer", height))?;

        let state = axis(combination, INITIAL_STATE_AXIS)?;
        let initial_state = state
            .as_map()
            .cloned()
            .ok_or_else(|| invalid_type(INITIAL_STATE_AXIS, "map", state))?;

        Ok(Self {
            topology,
            initial_height,
            initial_state,
            validators,
        })
    }
}

fn axis<'a>(
    combination: &'a Combination,
    name: &'static str,
) -> Result<&'a OptionValue, GenerateError> {
    combination
        .get(name)
        .ok_or(GenerateError::MissingOption { axis: name })
}

fn axis_str<'a>(
    combination: &'a Combination,
    name: &'static str,
) -> Result<&'a str, GenerateError> {
    let value = axis(combination, name)?;
    value.as_str().ok_or_else(|| invalid_type(name, "string", value))
}

fn invalid_type(axis: &'static str, expected: &'static str, value: &OptionValue) -> GenerateError {
    GenerateError::InvalidOptionType {
        axis,
        expected,
        value: value.clone(),
    }
}

/// The option matrix every run expands unless configured otherwise:
/// 3 topologies x 2 initial heights x 2 initial states x 2 validator modes.
pub fn default_testnet_matrix() -> OptionMatrix {
    let initial_state: BTreeMap<String, String> = [
        ("initial01", "a"),
        ("initial02", "b"),
        ("initial03", "c"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut matrix = OptionMatrix::new();
    matrix.insert(
        TOPOLOGY_AXIS.to_string(),
        vec!["single".into(), "quad".into(), "large".into()],
    );
    matrix.insert(
        INITIAL_HEIGHT_AXIS.to_string(),
        vec![OptionValue::Int(0), OptionValue::Int(1000)],
    );
    matrix.insert(
        INITIAL_STATE_AXIS.to_string(),
        vec![OptionValue::Map(BTreeMap::new()), OptionValue::Map(initial_state)],
    );
    matrix.insert(
        VALIDATORS_AXIS.to_string(),
        vec!["genesis".into(), "initchain".into()],
    );
    matrix
}
