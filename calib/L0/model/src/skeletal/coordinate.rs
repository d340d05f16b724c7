//! Coordinates and linear coordinate couplers.

use serde::{Deserialize, Serialize};

/// A generalized coordinate (joint degree of freedom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Coordinate name.
    pub name: String,

    /// Allowed range `(min, max)` (radians for rotations, meters for
    /// translations).
    pub range: (f64, f64),

    /// Value of the default pose.
    pub default_value: f64,

    /// Locked coordinates cannot be moved.
    pub locked: bool,

    /// Current value.
    #[serde(skip)]
    pub(crate) value: f64,
}

impl Coordinate {
    /// Create an unlocked coordinate whose default is zero clamped into range.
    #[must_use]
    pub fn new(name: impl Into<String>, range: (f64, f64)) -> Self {
        let default_value = 0.0_f64.clamp(range.0.min(range.1), range.0.max(range.1));
        Self {
            name: name.into(),
            range,
            default_value,
            locked: false,
            value: default_value,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = value;
        self.value = value;
        self
    }

    /// Lock or unlock the coordinate.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// One independent term of a coupler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplerTerm {
    /// Independent coordinate.
    pub coordinate: String,
    /// Multiplier applied to its value.
    pub multiplier: f64,
}

/// Linear coupling constraint.
///
/// Enforces: `q_dependent = Σᵢ mᵢ · q_independent_i + offset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateCoupler {
    /// Coordinate whose value is driven.
    pub dependent: String,
    /// Driving terms.
    pub independents: Vec<CouplerTerm>,
    /// Constant offset.
    pub offset: f64,
}

impl CoordinateCoupler {
    /// Create a mimic coupler: `q_follower = multiplier · q_leader + offset`.
    #[must_use]
    pub fn mimic(
        leader: impl Into<String>,
        follower: impl Into<String>,
        multiplier: f64,
        offset: f64,
    ) -> Self {
        Self {
            dependent: follower.into(),
            independents: vec![CouplerTerm {
                coordinate: leader.into(),
                multiplier,
            }],
            offset,
        }
    }

    /// Create a coupler with no independent terms yet.
    #[must_use]
    pub fn new(dependent: impl Into<String>) -> Self {
        Self {
            dependent: dependent.into(),
            independents: Vec::new(),
            offset: 0.0,
        }
    }

    /// Add an independent term.
    #[must_use]
    pub fn with_term(mut self, coordinate: impl Into<String>, multiplier: f64) -> Self {
        self.independents.push(CouplerTerm {
            coordinate: coordinate.into(),
            multiplier,
        });
        self
    }

    /// Set the offset.
    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Evaluate the dependent value given a lookup of independent values.
    ///
    /// Returns `None` if any independent coordinate cannot be resolved.
    pub fn evaluate<F>(&self, get_value: F) -> Option<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut sum = self.offset;
        for term in &self.independents {
            sum += term.multiplier * get_value(&term.coordinate)?;
        }
        Some(sum)
    }
}
