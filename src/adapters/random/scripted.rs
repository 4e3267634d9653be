use parking_lot::Mutex;

use crate::ports::RandomSource;

/// Random source that replays fixed sequences.
///
/// `below` returns the scripted indices in order, cycling when the script
/// runs out, and returns them unmodified (callers that must stay in range
/// clamp on their side). `unit` does the same for its own script. Empty
/// scripts yield zero.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    indices: Vec<usize>,
    units: Vec<f64>,
    cursor: Mutex<Cursor>,
}

#[derive(Debug, Default)]
struct Cursor {
    index: usize,
    unit: usize,
}

impl ScriptedRandom {
    /// Creates a source that replays `indices` from `below`.
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            units: Vec::new(),
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Adds a script for `unit` draws.
    pub fn with_units(mut self, units: Vec<f64>) -> Self {
        self.units = units;
        self
    }

    /// Number of `below` draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor.lock().index
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&self, _bound: usize) -> usize {
        let mut cursor = self.cursor.lock();
        let value = if self.indices.is_empty() {
            0
        } else {
            self.indices[cursor.index % self.indices.len()]
        };
        cursor.index += 1;
        value
    }

    fn unit(&self) -> f64 {
        let mut cursor = self.cursor.lock();
        let value = if self.units.is_empty() {
            0.0
        } else {
            self.units[cursor.unit % self.units.len()]
        };
        cursor.unit += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_indices_in_order_then_cycles() {
        let random = ScriptedRandom::new(vec![4, 1, 7]);

        let drawn: Vec<usize> = (0..5).map(|_| random.below(10)).collect();

        assert_eq!(drawn, vec![4, 1, 7, 4, 1]);
        assert_eq!(random.draws(), 5);
    }

    #[test]
    fn empty_scripts_yield_zero() {
        let random = ScriptedRandom::new(vec![]);
        assert_eq!(random.below(5), 0);
        assert_eq!(random.unit(), 0.0);
    }

    #[test]
    fn unit_script_is_independent_of_index_script() {
        let random = ScriptedRandom::new(vec![2]).with_units(vec![0.25, 0.75]);

        assert_eq!(random.unit(), 0.25);
        assert_eq!(random.below(3), 2);
        assert_eq!(random.unit(), 0.75);
    }
}
