//! Modifier stack types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis along which decimation is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SymmetryAxis {
    #[default]
    X,
    Y,
    Z,
}

impl SymmetryAxis {
    /// Fixed lookup table; the index of an axis here is its host-side enum index
    pub const ALL: [SymmetryAxis; 3] = [SymmetryAxis::X, SymmetryAxis::Y, SymmetryAxis::Z];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            SymmetryAxis::X => 0,
            SymmetryAxis::Y => 1,
            SymmetryAxis::Z => 2,
        }
    }
}

impl fmt::Display for SymmetryAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymmetryAxis::X => "X",
            SymmetryAxis::Y => "Y",
            SymmetryAxis::Z => "Z",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SymmetryAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(SymmetryAxis::X),
            "Y" => Ok(SymmetryAxis::Y),
            "Z" => Ok(SymmetryAxis::Z),
            other => Err(Error::InvalidParameter(format!(
                "unknown symmetry axis '{}', expected X, Y or Z",
                other
            ))),
        }
    }
}

/// Decimation algorithm. Only edge collapse is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DecimateAlgorithm {
    #[default]
    Collapse,
}

/// Configuration carried by a decimate modifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecimateSettings {
    pub algorithm: DecimateAlgorithm,
    /// Fraction of the original triangle count to retain, in [0, 1]
    pub ratio: f32,
    pub triangulate: bool,
    pub use_symmetry: bool,
    /// Only set when `use_symmetry` is true
    pub symmetry_axis: Option<SymmetryAxis>,
}

impl DecimateSettings {
    /// Reject ratios outside [0, 1] (NaN included)
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ratio) {
            return Err(Error::InvalidParameter(format!(
                "decimate ratio must be between 0.0 and 1.0, got {}",
                self.ratio
            )));
        }
        if !self.use_symmetry && self.symmetry_axis.is_some() {
            return Err(Error::InvalidParameter(
                "symmetry axis set while symmetry is disabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// A modifier attached to an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Modifier {
    Decimate {
        name: String,
        #[serde(flatten)]
        settings: DecimateSettings,
    },
    /// Any modifier kind the pipeline does not manage; carried untouched
    Other { name: String, type_tag: String },
}

impl Modifier {
    pub fn name(&self) -> &str {
        match self {
            Modifier::Decimate { name, .. } | Modifier::Other { name, .. } => name,
        }
    }

    /// Host type tag, e.g. `DECIMATE`
    pub fn type_tag(&self) -> &str {
        match self {
            Modifier::Decimate { .. } => "DECIMATE",
            Modifier::Other { type_tag, .. } => type_tag,
        }
    }

    pub fn is_decimate(&self) -> bool {
        matches!(self, Modifier::Decimate { .. })
    }

    pub fn decimate_settings(&self) -> Option<&DecimateSettings> {
        match self {
            Modifier::Decimate { settings, .. } => Some(settings),
            Modifier::Other { .. } => None,
        }
    }
}

/// Ordered modifier stack of an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Remove every modifier matching `predicate`, returning how many were removed
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Modifier) -> bool,
    {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| !predicate(m));
        before - self.modifiers.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Modifier> {
        self.modifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Number of decimate modifiers in the stack
    pub fn decimate_count(&self) -> usize {
        self.modifiers.iter().filter(|m| m.is_decimate()).count()
    }
}

impl FromIterator<Modifier> for ModifierStack {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self {
            modifiers: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ModifierStack {
    type Item = &'a Modifier;
    type IntoIter = std::slice::Iter<'a, Modifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifiers.iter()
    }
}
