//! Sampled coordinate combinations.
//!
//! A [`CoordinateCombination`] is a column-major table: one column of values
//! per coordinate, one row per pose. Column order is kinematic discovery
//! order (distal joint first), and every column has the same length.

use serde::{Deserialize, Serialize};

/// One coordinate's sampled values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CoordinateSamples {
    name: String,
    values: Vec<f64>,
}

/// The set of poses sampled for one muscle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateCombination {
    columns: Vec<CoordinateSamples>,
}

impl CoordinateCombination {
    /// Create an empty combination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a coordinate column.
    ///
    /// Returns `false` and leaves the combination untouched if the name is
    /// already present or the column length disagrees with existing columns.
    pub fn push(&mut self, name: impl Into<String>, values: Vec<f64>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return false;
            }
        }
        self.columns.push(CoordinateSamples { name, values });
        true
    }

    /// Check whether a coordinate is part of the combination.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Coordinate names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Values of one coordinate.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Number of coordinates.
    #[must_use]
    pub fn coordinate_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of poses (rows).
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// True when there are no coordinates or no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    /// The `(name, value)` pairs making up row `index`.
    pub fn row(&self, index: usize) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .filter_map(move |c| c.values.get(index).map(|&v| (c.name.as_str(), v)))
    }

    /// Remove rows from every column.
    ///
    /// Indices may be given in any order and may repeat; they are removed
    /// from the highest down so earlier removals never shift later ones.
    /// Out-of-range indices are ignored.
    pub fn remove_rows(&mut self, indices: &[usize]) {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for &index in sorted.iter().rev() {
            for column in &mut self.columns {
                if index < column.values.len() {
                    column.values.remove(index);
                }
            }
        }
    }

    /// Check that every column has the same length.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        let n = self.sample_count();
        self.columns.iter().all(|c| c.values.len() == n)
    }
}
