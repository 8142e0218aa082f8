//! Cartesian-product expansion of named option axes.
//!
//! Axes are expanded in sorted name order with the first axis varying
//! slowest, so the enumeration is stable across runs. That order decides
//! which testnet consumes which slice of the shared RNG stream.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single candidate value on an option axis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Int(i64),
    Str(String),
    Map(BTreeMap<String, String>),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Short human-readable kind, used in option type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::Map(_) => "map",
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Map(m) => write!(f, "{:?}", m),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<BTreeMap<String, String>> for OptionValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::Map(value)
    }
}

/// Axis name to candidate values.
pub type OptionMatrix = BTreeMap<String, Vec<OptionValue>>;

/// Axis name to the one value chosen for it.
pub type Combination = BTreeMap<String, OptionValue>;

/// Enumerate every combination of one value per axis.
///
/// An empty matrix yields a single empty combination; an axis without
/// values yields no combinations at all.
pub fn combinations(matrix: &OptionMatrix) -> Vec<Combination> {
    let mut result = vec![Combination::new()];
    for (axis, values) in matrix {
        result = result
            .into_iter()
            .flat_map(|partial| {
                values.iter().map(move |value| {
                    let mut combination = partial.clone();
                    combination.insert(axis.clone(), value.clone());
                    combination
                })
            })
            .collect();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn matrix() -> OptionMatrix {
        let state: BTreeMap<String, String> =
            [("initial01".to_string(), "a".to_string())].into_iter().collect();
        let mut matrix = OptionMatrix::new();
        matrix.insert("topology".into(), vec!["single".into(), "quad".into(), "large".into()]);
        matrix.insert("initialHeight".into(), vec![OptionValue::Int(0), OptionValue::Int(1000)]);
        matrix.insert(
            "initialState".into(),
            vec![BTreeMap::<String, String>::new().into(), state.into()],
        );
        matrix.insert("validators".into(), vec!["genesis".into(), "initchain".into()]);
        matrix
    }

    #[test]
    fn test_combinations_cover_product() {
        let combos = combinations(&matrix());
        assert_eq!(combos.len(), 24);

        let distinct: BTreeSet<&Combination> = combos.iter().collect();
        assert_eq!(distinct.len(), 24);

        for combo in &combos {
            let axes: Vec<&str> = combo.keys().map(String::as_str).collect();
            assert_eq!(axes, vec!["initialHeight", "initialState", "topology", "validators"]);
        }
    }

    #[test]
    fn test_combinations_order_is_stable() {
        let combos = combinations(&matrix());
        assert_eq!(combos, combinations(&matrix()));

        // First sorted axis varies slowest, last varies fastest.
        assert_eq!(combos[0]["initialHeight"], OptionValue::Int(0));
        assert_eq!(combos[0]["validators"], OptionValue::from("genesis"));
        assert_eq!(combos[1]["validators"], OptionValue::from("initchain"));
        assert_eq!(combos[12]["initialHeight"], OptionValue::Int(1000));
    }

    #[test]
    fn test_combinations_edge_cases() {
        assert_eq!(combinations(&OptionMatrix::new()), vec![Combination::new()]);

        let mut matrix = matrix();
        matrix.insert("topology".into(), Vec::new());
        assert!(combinations(&matrix).is_empty());
    }

    #[test]
    fn test_option_value_untagged_yaml() {
        let yaml = r#"
topology: [single, quad]
initialHeight: [0, 1000]
initialState:
  - {}
  - { initial01: a }
"#;
        let parsed: OptionMatrix = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["topology"][1].as_str(), Some("quad"));
        assert_eq!(parsed["initialHeight"][1].as_int(), Some(1000));
        assert_eq!(parsed["initialState"][1].as_map().map(|m| m.len()), Some(1));
        assert_eq!(parsed["initialState"][0].kind(), "map");
    }
}
