use super::level::{EnergyLevel, LevelTable};
use tracing::debug;

/// A single line from an ExoMol `.trans` file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub upper_id: u64,
    pub lower_id: u64,
    /// Einstein A coefficient, s⁻¹.
    pub afi: f64,
}

impl Transition {
    pub fn new(upper_id: u64, lower_id: u64, afi: f64) -> Self {
        Self {
            upper_id,
            lower_id,
            afi,
        }
    }
}

/// A bounded batch of transitions read from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionChunk {
    transitions: Vec<Transition>,
}

impl TransitionChunk {
    pub fn new(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    pub fn as_slice(&self) -> &[Transition] {
        &self.transitions
    }
}

impl FromIterator<Transition> for TransitionChunk {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Transitions joined with both endpoint levels, stored column-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTransitions {
    pub upper_id: Vec<u64>,
    pub lower_id: Vec<u64>,
    pub afi: Vec<f64>,
    pub energy_upper: Vec<f64>,
    pub energy_lower: Vec<f64>,
    pub g_total_upper: Vec<f64>,
    pub g_total_lower: Vec<f64>,
    /// Line position `energy_upper - energy_lower`, cm⁻¹.
    pub vfi: Vec<f64>,
    /// Transitions dropped because an endpoint id is missing from the level table.
    pub unmatched: usize,
}

impl JoinedTransitions {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            upper_id: Vec::with_capacity(capacity),
            lower_id: Vec::with_capacity(capacity),
            afi: Vec::with_capacity(capacity),
            energy_upper: Vec::with_capacity(capacity),
            energy_lower: Vec::with_capacity(capacity),
            g_total_upper: Vec::with_capacity(capacity),
            g_total_lower: Vec::with_capacity(capacity),
            vfi: Vec::with_capacity(capacity),
            unmatched: 0,
        }
    }

    pub fn push(&mut self, upper: &EnergyLevel, lower: &EnergyLevel, afi: f64) {
        self.upper_id.push(upper.id);
        self.lower_id.push(lower.id);
        self.afi.push(afi);
        self.energy_upper.push(upper.energy);
        self.energy_lower.push(lower.energy);
        self.g_total_upper.push(upper.degeneracy);
        self.g_total_lower.push(lower.degeneracy);
        self.vfi.push(upper.energy - lower.energy);
    }

    pub fn len(&self) -> usize {
        self.vfi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vfi.is_empty()
    }

    /// Rows with `vfi <= 0` (or NaN), which cannot be emission lines.
    pub fn non_physical_count(&self) -> usize {
        self.vfi.iter().filter(|&&v| !(v > 0.0)).count()
    }

    /// Drops every row with `vfi <= 0` and returns how many were removed.
    pub fn retain_physical(&mut self) -> usize {
        let keep: Vec<bool> = self.vfi.iter().map(|&v| v > 0.0).collect();
        let removed = keep.iter().filter(|&&k| !k).count();
        if removed == 0 {
            return 0;
        }

        fn filter<T: Copy>(column: &mut Vec<T>, keep: &[bool]) {
            let mut flags = keep.iter();
            column.retain(|_| *flags.next().unwrap_or(&false));
        }

        filter(&mut self.upper_id, &keep);
        filter(&mut self.lower_id, &keep);
        filter(&mut self.afi, &keep);
        filter(&mut self.energy_upper, &keep);
        filter(&mut self.energy_lower, &keep);
        filter(&mut self.g_total_upper, &keep);
        filter(&mut self.g_total_lower, &keep);
        filter(&mut self.vfi, &keep);
        removed
    }
}

/// Inner-joins a transition chunk with the level table on both endpoint ids.
///
/// Row order of the chunk is preserved. Transitions referring to an id that is not in
/// `levels` are skipped and counted in [`JoinedTransitions::unmatched`].
pub fn merge_transitions_states(
    levels: &LevelTable,
    chunk: &TransitionChunk,
) -> JoinedTransitions {
    let mut joined = JoinedTransitions::with_capacity(chunk.len());

    for transition in chunk.iter() {
        match (
            levels.get(transition.upper_id),
            levels.get(transition.lower_id),
        ) {
            (Some(upper), Some(lower)) => joined.push(upper, lower, transition.afi),
            _ => joined.unmatched += 1,
        }
    }

    if joined.unmatched > 0 {
        debug!(
            unmatched = joined.unmatched,
            joined = joined.len(),
            "Dropped transitions referring to unknown level ids."
        );
    }
    joined
}
