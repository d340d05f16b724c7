//! Hill-type musculotendon actuator with a compliant tendon.
//!
//! ```text
//!        fiber (length l_f, pennation α)       tendon (length l_t)
//!   ●━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━●──────────────────●
//!   |<-------- l_f · cos α -------->|<-------- l_t -------->|
//!   |<------------------- musculotendon length L ---------------->|
//! ```
//!
//! Pennation follows the constant-width assumption
//! `l_f · sin α = l_opt · sin α_opt`.

use serde::{Deserialize, Serialize};

use crate::curves::{ActiveForceLengthCurve, PassiveForceLengthCurve, TendonForceLengthCurve};

/// Largest pennation angle the fiber can reach: `cos α_max = 0.1`.
const MIN_COS_PENNATION: f64 = 0.1;

/// Bisection iterations for the force balance.
const MAX_EQUILIBRIUM_ITERATIONS: usize = 200;

/// Material and architecture parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleParameters {
    /// Maximum isometric force (N).
    pub max_isometric_force: f64,

    /// Optimal fiber length (m).
    pub optimal_fiber_length: f64,

    /// Tendon slack length (m).
    pub tendon_slack_length: f64,

    /// Pennation angle at optimal fiber length (radians).
    pub pennation_angle_at_optimal: f64,

    /// Active force-length curve.
    #[serde(default)]
    pub active_force_length: ActiveForceLengthCurve,

    /// Passive force-length curve.
    #[serde(default)]
    pub passive_force_length: PassiveForceLengthCurve,

    /// Tendon force-length curve.
    #[serde(default)]
    pub tendon_force_length: TendonForceLengthCurve,
}

impl Default for MuscleParameters {
    fn default() -> Self {
        Self {
            max_isometric_force: 1000.0,
            optimal_fiber_length: 0.10,
            tendon_slack_length: 0.20,
            pennation_angle_at_optimal: 0.0,
            active_force_length: ActiveForceLengthCurve::default(),
            passive_force_length: PassiveForceLengthCurve::default(),
            tendon_force_length: TendonForceLengthCurve::default(),
        }
    }
}

impl MuscleParameters {
    /// Create parameters with the given lengths and default curves.
    #[must_use]
    pub fn new(optimal_fiber_length: f64, tendon_slack_length: f64) -> Self {
        Self {
            optimal_fiber_length,
            tendon_slack_length,
            ..Default::default()
        }
    }

    /// Set the pennation angle at optimal fiber length.
    #[must_use]
    pub fn with_pennation(mut self, angle: f64) -> Self {
        self.pennation_angle_at_optimal = angle;
        self
    }

    /// Fiber height, held constant as the fiber changes length.
    #[must_use]
    pub fn fiber_width(&self) -> f64 {
        self.optimal_fiber_length * self.pennation_angle_at_optimal.sin()
    }

    /// Shortest fiber length the pennation model admits.
    #[must_use]
    pub fn min_fiber_length(&self) -> f64 {
        let max_sin = (1.0 - MIN_COS_PENNATION * MIN_COS_PENNATION).sqrt();
        (self.fiber_width() / max_sin).max(0.01 * self.optimal_fiber_length)
    }
}

/// One term of the musculotendon length polynomial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTerm {
    /// Coordinate name.
    pub coordinate: String,
    /// Length change per unit coordinate (m/rad or m/m).
    pub coefficient: f64,
}

/// Musculotendon path geometry.
///
/// ```text
/// L = L₀ + Σᵢ cᵢ qᵢ
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusclePath {
    /// Length with every coordinate at zero (L₀).
    pub rest_length: f64,
    /// Coordinate contributions.
    pub terms: Vec<PathTerm>,
}

impl MusclePath {
    /// Create a path with no coordinate dependence.
    #[must_use]
    pub fn new(rest_length: f64) -> Self {
        Self {
            rest_length,
            terms: Vec::new(),
        }
    }

    /// Add a coordinate term. Negative coefficients shorten the path as the
    /// coordinate increases.
    #[must_use]
    pub fn with_term(mut self, coordinate: impl Into<String>, coefficient: f64) -> Self {
        self.terms.push(PathTerm {
            coordinate: coordinate.into(),
            coefficient,
        });
        self
    }

    /// Evaluate path length given a lookup of coordinate values.
    pub fn length<F>(&self, get_value: F) -> Option<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut length = self.rest_length;
        for term in &self.terms {
            length += term.coefficient * get_value(&term.coordinate)?;
        }
        Some(length)
    }

    /// Multiply the path by `factor` (uniform segment scaling).
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rest_length: self.rest_length * factor,
            terms: self
                .terms
                .iter()
                .map(|t| PathTerm {
                    coordinate: t.coordinate.clone(),
                    coefficient: t.coefficient * factor,
                })
                .collect(),
        }
    }
}

/// Fiber/tendon state satisfying the force balance at one pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equilibrium {
    /// Fiber length (m).
    pub fiber_length: f64,
    /// Pennation angle (radians).
    pub pennation_angle: f64,
    /// Tendon length (m).
    pub tendon_length: f64,
    /// Active fiber force (N).
    pub active_force: f64,
    /// Tendon force (N).
    pub tendon_force: f64,
}

/// Time-varying state; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MuscleState {
    pub(crate) activation: f64,
    pub(crate) length: Option<f64>,
    pub(crate) equilibrium: Option<Equilibrium>,
}

impl Default for MuscleState {
    fn default() -> Self {
        Self {
            activation: 0.01,
            length: None,
            equilibrium: None,
        }
    }
}

/// A musculotendon actuator spanning a chain of bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muscle {
    /// Muscle name.
    pub name: String,
    /// Body of the origin.
    pub proximal_body: String,
    /// Body of the insertion.
    pub distal_body: String,
    /// Parameters.
    pub parameters: MuscleParameters,
    /// Path geometry.
    pub path: MusclePath,
    #[serde(skip)]
    pub(crate) state: MuscleState,
}

impl Muscle {
    /// Create a muscle.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        proximal_body: impl Into<String>,
        distal_body: impl Into<String>,
        parameters: MuscleParameters,
        path: MusclePath,
    ) -> Self {
        Self {
            name: name.into(),
            proximal_body: proximal_body.into(),
            distal_body: distal_body.into(),
            parameters,
            path,
            state: MuscleState::default(),
        }
    }

    /// Solve the fiber/tendon force balance at musculotendon length `length`.
    ///
    /// Finds the projected fiber length `x = l_f · cos α` such that
    /// tendon force equals fiber force along the tendon, by bisection on
    /// `x ∈ [x_min, L − l_slack]`. Tendon force falls and fiber force rises
    /// (up to the active plateau) as `x` grows, so the balance residual
    /// changes sign over that interval.
    ///
    /// When the path is shorter than `l_slack + x_min` the tendon is slack:
    /// the fiber sits at its minimum length and transmits no force.
    #[must_use]
    pub fn solve_equilibrium(&self, length: f64) -> Equilibrium {
        let p = &self.parameters;
        let width = p.fiber_width();
        let l_min = p.min_fiber_length();
        let x_min = (l_min * l_min - width * width).max(0.0).sqrt();
        let x_max = length - p.tendon_slack_length;

        if x_max <= x_min {
            return Equilibrium {
                fiber_length: l_min,
                pennation_angle: pennation(width, l_min),
                tendon_length: length - x_min,
                active_force: 0.0,
                tendon_force: 0.0,
            };
        }

        let residual = |x: f64| self.tendon_force(length - x) - self.fiber_force_along_tendon(x);

        let (mut lo, mut hi) = (x_min, x_max);
        let x = if residual(lo) <= 0.0 {
            lo
        } else {
            for _ in 0..MAX_EQUILIBRIUM_ITERATIONS {
                let mid = 0.5 * (lo + hi);
                if residual(mid) > 0.0 {
                    lo = mid;
                } else {
                    hi = mid;
                }
                if hi - lo <= f64::EPSILON * hi.abs() {
                    break;
                }
            }
            0.5 * (lo + hi)
        };

        let fiber_length = x.hypot(width);
        Equilibrium {
            fiber_length,
            pennation_angle: pennation(width, fiber_length),
            tendon_length: length - x,
            active_force: self.active_fiber_force(fiber_length),
            tendon_force: self.tendon_force(length - x),
        }
    }

    fn active_fiber_force(&self, fiber_length: f64) -> f64 {
        let p = &self.parameters;
        let l_norm = fiber_length / p.optimal_fiber_length;
        p.max_isometric_force * self.state.activation * p.active_force_length.evaluate(l_norm)
    }

    fn fiber_force_along_tendon(&self, projected_length: f64) -> f64 {
        let p = &self.parameters;
        let fiber_length = projected_length.hypot(p.fiber_width());
        let l_norm = fiber_length / p.optimal_fiber_length;
        let passive = p.max_isometric_force * p.passive_force_length.evaluate(l_norm);
        let cos_alpha = projected_length / fiber_length;
        (self.active_fiber_force(fiber_length) + passive) * cos_alpha
    }

    fn tendon_force(&self, tendon_length: f64) -> f64 {
        let p = &self.parameters;
        p.max_isometric_force
            * p.tendon_force_length
                .evaluate(tendon_length / p.tendon_slack_length)
    }
}

fn pennation(width: f64, fiber_length: f64) -> f64 {
    if width.abs() < 1e-12 {
        return 0.0;
    }
    (width / fiber_length).clamp(-1.0, 1.0).asin()
}
