use std::collections::HashMap;

use crate::config::Precision;

/// Sorted distinct values and the per-sample indices into them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictionaryAxis {
    /// Distinct values, ascending
    pub axis: Vec<f64>,
    /// One index into `axis` per pushed sample
    pub indices: Vec<u32>,
}

/// Value dictionary for one cluster's m/z samples (or the chromatogram times).
///
/// Values are keyed by the representation they will be stored with, so two
/// doubles that round to the same `f32` share an entry under
/// [`Precision::Float32`]. Ids handed out while pushing are provisional: they
/// follow first appearance and are remapped to ascending ranks by
/// [`MassDictionary::finish`].
#[derive(Debug, Clone, Default)]
pub struct MassDictionary {
    precision: Precision,
    ids: HashMap<u64, u32>,
    values: Vec<f64>,
    samples: Vec<u32>,
}

impl MassDictionary {
    /// Create an empty dictionary storing values with `precision`
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    fn stored(&self, value: f64) -> f64 {
        let value = match self.precision {
            Precision::Float64 => value,
            Precision::Float32 => value as f32 as f64,
        };
        // -0.0 == 0.0, but the bit patterns differ
        if value == 0.0 {
            0.0
        } else {
            value
        }
    }

    /// Record one sample. Returns `None` once the dictionary holds
    /// `u32::MAX` distinct values.
    pub fn push(&mut self, value: f64) -> Option<u32> {
        let value = self.stored(value);
        let id = match self.ids.get(&value.to_bits()) {
            Some(id) => *id,
            None => {
                let id = u32::try_from(self.values.len()).ok().filter(|id| *id < u32::MAX)?;
                self.ids.insert(value.to_bits(), id);
                self.values.push(value);
                id
            }
        };
        self.samples.push(id);
        Some(id)
    }

    /// Record every sample of `values`, stopping at the first overflow
    pub fn extend(&mut self, values: &[f64]) -> Option<()> {
        for value in values {
            self.push(*value)?;
        }
        Some(())
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no sample was pushed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of samples pushed
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Sort the distinct values and rewrite every sample id to its rank.
    pub fn finish(self) -> DictionaryAxis {
        let mut order: Vec<u32> = (0..self.values.len() as u32).collect();
        order.sort_unstable_by(|a, b| self.values[*a as usize].total_cmp(&self.values[*b as usize]));

        let mut rank = vec![0u32; order.len()];
        for (position, id) in order.iter().enumerate() {
            rank[*id as usize] = position as u32;
        }

        DictionaryAxis {
            axis: order.iter().map(|id| self.values[*id as usize]).collect(),
            indices: self.samples.iter().map(|id| rank[*id as usize]).collect(),
        }
    }
}
