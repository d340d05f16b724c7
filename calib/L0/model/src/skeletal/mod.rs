//! In-memory reference model.

mod coordinate;
mod muscle;

use std::collections::HashSet;
use std::path::Path;

use calib_types::{CouplingDriver, JointInfo, MuscleQuantity, MuscleSpan, Stage};
use serde::{Deserialize, Serialize};

pub use coordinate::{Coordinate, CoordinateCoupler, CouplerTerm};
pub use muscle::{Equilibrium, Muscle, MuscleParameters, MusclePath, PathTerm};

use crate::PosableModel;
use crate::error::{ModelError, Result};

/// A tree of bodies and joints actuated by Hill-type muscles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletalModel {
    name: String,
    bodies: Vec<String>,
    joints: Vec<JointInfo>,
    coordinates: Vec<Coordinate>,
    #[serde(default)]
    couplers: Vec<CoordinateCoupler>,
    muscles: Vec<Muscle>,
    #[serde(skip)]
    realized: Option<Stage>,
}

impl SkeletalModel {
    /// Create an empty model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bodies: Vec::new(),
            joints: Vec::new(),
            coordinates: Vec::new(),
            couplers: Vec::new(),
            muscles: Vec::new(),
            realized: None,
        }
    }

    /// Add a body.
    #[must_use]
    pub fn with_body(mut self, name: impl Into<String>) -> Self {
        self.bodies.push(name.into());
        self
    }

    /// Add a joint.
    #[must_use]
    pub fn with_joint(mut self, joint: JointInfo) -> Self {
        self.joints.push(joint);
        self
    }

    /// Add a coordinate.
    #[must_use]
    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinates.push(coordinate);
        self
    }

    /// Add a coupler.
    #[must_use]
    pub fn with_coupler(mut self, coupler: CoordinateCoupler) -> Self {
        self.couplers.push(coupler);
        self
    }

    /// Add a muscle.
    #[must_use]
    pub fn with_muscle(mut self, muscle: Muscle) -> Self {
        self.muscles.push(muscle);
        self
    }

    /// Load a model written by [`PosableModel::persist`].
    ///
    /// The loaded model is validated and placed in its default pose.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut model: Self = serde_json::from_str(&text)?;
        model.validate()?;
        model.reset_pose();
        Ok(model)
    }

    /// Check names and cross references.
    ///
    /// This checks:
    /// - No duplicate body, joint, coordinate or muscle names
    /// - Joints and muscles reference declared bodies
    /// - Joint, coupler and path coordinates are declared
    pub fn validate(&self) -> Result<()> {
        check_unique("body", self.bodies.iter())?;
        check_unique("joint", self.joints.iter().map(|j| &j.name))?;
        check_unique("coordinate", self.coordinates.iter().map(|c| &c.name))?;
        check_unique("muscle", self.muscles.iter().map(|m| &m.name))?;

        let bodies: HashSet<&str> = self.bodies.iter().map(String::as_str).collect();
        for joint in &self.joints {
            for body in [&joint.parent_body, &joint.child_body] {
                if !bodies.contains(body.as_str()) {
                    return Err(ModelError::undefined_body(body, format!("joint {}", joint.name)));
                }
            }
            for coordinate in &joint.coordinates {
                self.coordinate(coordinate)?;
            }
        }
        for coupler in &self.couplers {
            self.coordinate(&coupler.dependent)?;
            for term in &coupler.independents {
                self.coordinate(&term.coordinate)?;
            }
        }
        for muscle in &self.muscles {
            for body in [&muscle.proximal_body, &muscle.distal_body] {
                if !bodies.contains(body.as_str()) {
                    return Err(ModelError::undefined_body(body, format!("muscle {}", muscle.name)));
                }
            }
            for term in &muscle.path.terms {
                self.coordinate(&term.coordinate)?;
            }
        }
        Ok(())
    }

    /// Look up a muscle.
    pub fn muscle(&self, name: &str) -> Result<&Muscle> {
        self.muscles
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ModelError::UnknownMuscle(name.to_string()))
    }

    /// Look up a coordinate.
    pub fn coordinate(&self, name: &str) -> Result<&Coordinate> {
        self.coordinates
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ModelError::UnknownCoordinate(name.to_string()))
    }

    /// Stage the model is currently realized to.
    #[must_use]
    pub fn realized_stage(&self) -> Option<Stage> {
        self.realized
    }

    fn muscle_mut(&mut self, name: &str) -> Result<&mut Muscle> {
        self.muscles
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| ModelError::UnknownMuscle(name.to_string()))
    }

    fn coordinate_mut(&mut self, name: &str) -> Result<&mut Coordinate> {
        self.coordinates
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ModelError::UnknownCoordinate(name.to_string()))
    }

    fn value_of(&self, name: &str) -> Option<f64> {
        self.coordinates
            .iter()
            .find(|c| c.name == name)
            .map(Coordinate::value)
    }

    fn invalidate(&mut self) {
        self.realized = None;
        for muscle in &mut self.muscles {
            muscle.state.length = None;
            muscle.state.equilibrium = None;
        }
    }

    /// Propagate coupler drivers into dependent coordinates, in declaration
    /// order.
    fn apply_couplers(&mut self) -> Result<()> {
        for i in 0..self.couplers.len() {
            let coupler = &self.couplers[i];
            let value = coupler
                .evaluate(|name| self.value_of(name))
                .ok_or_else(|| ModelError::UnknownCoordinate(coupler.dependent.clone()))?;
            let dependent = coupler.dependent.clone();
            self.coordinate_mut(&dependent)?.value = value;
        }
        Ok(())
    }

    fn update_path_lengths(&mut self) -> Result<()> {
        let lengths = self
            .muscles
            .iter()
            .map(|m| {
                m.path.length(|name| self.value_of(name)).ok_or_else(|| {
                    ModelError::equilibrium(&m.name, "path references an unknown coordinate")
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        for (muscle, length) in self.muscles.iter_mut().zip(lengths) {
            muscle.state.length = Some(length);
        }
        Ok(())
    }

    fn require_stage(&self, quantity: MuscleQuantity) -> Result<()> {
        if let Some(required) = quantity.required_stage() {
            if self.realized.is_none_or(|current| current < required) {
                return Err(ModelError::StageNotRealized {
                    quantity,
                    required,
                    current: self.realized,
                });
            }
        }
        Ok(())
    }
}

fn check_unique<'a>(kind: &'static str, names: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::duplicate(kind, name));
        }
    }
    Ok(())
}

impl PosableModel for SkeletalModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn muscle_names(&self) -> Vec<String> {
        self.muscles.iter().map(|m| m.name.clone()).collect()
    }

    fn has_muscle(&self, muscle: &str) -> bool {
        self.muscles.iter().any(|m| m.name == muscle)
    }

    fn muscle_span(&self, muscle: &str) -> Result<MuscleSpan> {
        let m = self.muscle(muscle)?;
        Ok(MuscleSpan {
            proximal_body: m.proximal_body.clone(),
            distal_body: m.distal_body.clone(),
        })
    }

    fn joints(&self) -> &[JointInfo] {
        &self.joints
    }

    fn coordinate_range(&self, coordinate: &str) -> Result<(f64, f64)> {
        Ok(self.coordinate(coordinate)?.range)
    }

    fn is_locked(&self, coordinate: &str) -> Result<bool> {
        Ok(self.coordinate(coordinate)?.locked)
    }

    fn is_constrained(&self, coordinate: &str) -> Result<bool> {
        self.coordinate(coordinate)?;
        Ok(self.couplers.iter().any(|c| c.dependent == coordinate))
    }

    fn coupling_driver(&self, coordinate: &str) -> Result<CouplingDriver> {
        self.coordinate(coordinate)?;
        let Some(coupler) = self.couplers.iter().find(|c| c.dependent == coordinate) else {
            return Ok(CouplingDriver::None);
        };
        let mut drivers: Vec<String> = coupler
            .independents
            .iter()
            .map(|t| t.coordinate.clone())
            .collect();
        Ok(match drivers.len() {
            0 => CouplingDriver::None,
            1 => CouplingDriver::Single(drivers.remove(0)),
            _ => CouplingDriver::Multiple(drivers),
        })
    }

    fn coordinate_value(&self, coordinate: &str) -> Result<f64> {
        Ok(self.coordinate(coordinate)?.value)
    }

    fn set_coordinate_value(&mut self, coordinate: &str, value: f64) -> Result<()> {
        let c = self.coordinate_mut(coordinate)?;
        if c.locked {
            return Err(ModelError::LockedCoordinate(coordinate.to_string()));
        }
        c.value = value;
        self.invalidate();
        Ok(())
    }

    fn is_default_pose(&self) -> bool {
        self.coordinates.iter().all(|c| c.value == c.default_value)
    }

    fn reset_pose(&mut self) {
        for coordinate in &mut self.coordinates {
            coordinate.value = coordinate.default_value;
        }
        self.invalidate();
    }

    fn realize(&mut self, stage: Stage) -> Result<()> {
        if self.realized.is_some_and(|current| current >= stage) {
            return Ok(());
        }
        if self.realized.is_none() {
            self.apply_couplers()?;
            self.update_path_lengths()?;
        }
        self.realized = Some(stage);
        Ok(())
    }

    fn set_activation(&mut self, muscle: &str, activation: f64) -> Result<()> {
        let m = self.muscle_mut(muscle)?;
        if !(0.0..=1.0).contains(&activation) {
            return Err(ModelError::invalid_parameter(muscle, "activation", activation));
        }
        m.state.activation = activation;
        m.state.equilibrium = None;
        Ok(())
    }

    fn equilibrate_muscle(&mut self, muscle: &str) -> Result<()> {
        if self.realized.is_none_or(|s| s < Stage::Dynamics) {
            self.realize(Stage::Dynamics)?;
        }
        let m = self.muscle_mut(muscle)?;
        let length = m
            .state
            .length
            .ok_or_else(|| ModelError::equilibrium(muscle, "path length not computed"))?;
        if !length.is_finite() {
            return Err(ModelError::equilibrium(muscle, format!("path length is {length}")));
        }
        let equilibrium = m.solve_equilibrium(length);
        m.state.equilibrium = Some(equilibrium);
        Ok(())
    }

    fn muscle_scalar(&self, muscle: &str, quantity: MuscleQuantity) -> Result<f64> {
        let m = self.muscle(muscle)?;
        self.require_stage(quantity)?;

        let equilibrium = || {
            m.state
                .equilibrium
                .ok_or_else(|| ModelError::NotEquilibrated(muscle.to_string()))
        };

        let p = &m.parameters;
        Ok(match quantity {
            MuscleQuantity::OptimalFiberLength => p.optimal_fiber_length,
            MuscleQuantity::TendonSlackLength => p.tendon_slack_length,
            MuscleQuantity::Length => m
                .state
                .length
                .ok_or_else(|| ModelError::equilibrium(muscle, "path length not computed"))?,
            MuscleQuantity::NormalizedFiberLength => {
                equilibrium()?.fiber_length / p.optimal_fiber_length
            }
            MuscleQuantity::TendonLength => equilibrium()?.tendon_length,
            MuscleQuantity::ActiveForce => equilibrium()?.active_force,
            MuscleQuantity::PennationAngle => equilibrium()?.pennation_angle,
        })
    }

    fn set_optimal_fiber_length(&mut self, muscle: &str, value: f64) -> Result<()> {
        if !(value > 0.0 && value.is_finite()) {
            return Err(ModelError::invalid_parameter(muscle, "optimal fiber length", value));
        }
        let m = self.muscle_mut(muscle)?;
        m.parameters.optimal_fiber_length = value;
        m.state.equilibrium = None;
        Ok(())
    }

    fn set_tendon_slack_length(&mut self, muscle: &str, value: f64) -> Result<()> {
        if !(value > 0.0 && value.is_finite()) {
            return Err(ModelError::invalid_parameter(muscle, "tendon slack length", value));
        }
        let m = self.muscle_mut(muscle)?;
        m.parameters.tendon_slack_length = value;
        m.state.equilibrium = None;
        Ok(())
    }

    fn persist(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        tracing::info!("Wrote model {} to {}", self.name, path.display());
        Ok(())
    }
}
