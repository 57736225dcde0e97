use crate::core::spectroscopy::error::SpectroscopyError;
use crate::core::spectroscopy::partition::partition;
use crate::core::units::{Quantity, Scalar, Unit};
use std::collections::HashMap;

/// A rovibronic energy level from an ExoMol states file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyLevel {
    pub id: u64,
    /// Term value in cm⁻¹.
    pub energy: f64,
    /// Total degeneracy `g_total`.
    pub degeneracy: f64,
    pub j: f64,
}

impl EnergyLevel {
    pub fn new(id: u64, energy: f64, degeneracy: f64, j: f64) -> Self {
        Self {
            id,
            energy,
            degeneracy,
            j,
        }
    }
}

/// Energy levels of one molecule/isotopologue, keyed by their unique id.
#[derive(Debug, Clone, Default)]
pub struct LevelTable {
    levels: Vec<EnergyLevel>,
    index: HashMap<u64, usize>,
}

impl LevelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            levels: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Adds a level. Returns `false` and leaves the table unchanged if the id is taken.
    pub fn insert(&mut self, level: EnergyLevel) -> bool {
        if self.index.contains_key(&level.id) {
            return false;
        }
        self.index.insert(level.id, self.levels.len());
        self.levels.push(level);
        true
    }

    pub fn get(&self, id: u64) -> Option<&EnergyLevel> {
        self.index.get(&id).map(|&i| &self.levels[i])
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels in file order.
    pub fn iter(&self) -> impl Iterator<Item = &EnergyLevel> {
        self.levels.iter()
    }

    pub fn energies(&self) -> Quantity {
        Quantity::new(
            self.levels.iter().map(|l| l.energy).collect(),
            Unit::PerCentimeter,
        )
    }

    pub fn degeneracies(&self) -> Quantity {
        Quantity::new(
            self.levels.iter().map(|l| l.degeneracy).collect(),
            Unit::Dimensionless,
        )
    }

    pub fn j_values(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.j).collect()
    }

    /// Partition function `Q(T)` over every level in the table.
    pub fn partition_function(&self, temperature: &Scalar) -> Result<Scalar, SpectroscopyError> {
        partition(&self.energies(), &self.degeneracies(), temperature)
    }
}

/// Builds a table keeping the first occurrence of any repeated id.
impl FromIterator<EnergyLevel> for LevelTable {
    fn from_iter<I: IntoIterator<Item = EnergyLevel>>(iter: I) -> Self {
        let mut table = LevelTable::new();
        for level in iter {
            table.insert(level);
        }
        table
    }
}
