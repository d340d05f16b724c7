//! Kinematic topology and muscle query vocabulary shared by models and the
//! calibration pipeline.

use serde::{Deserialize, Serialize};

/// A joint connecting a parent body to a child body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointInfo {
    /// Joint name.
    pub name: String,
    /// Body closer to the root of the tree.
    pub parent_body: String,
    /// Body moved by this joint.
    pub child_body: String,
    /// Coordinates (generalized degrees of freedom) owned by the joint.
    pub coordinates: Vec<String>,
}

impl JointInfo {
    /// Create a joint with no coordinates.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parent_body: impl Into<String>,
        child_body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parent_body: parent_body.into(),
            child_body: child_body.into(),
            coordinates: Vec::new(),
        }
    }

    /// Add a coordinate.
    #[must_use]
    pub fn with_coordinate(mut self, name: impl Into<String>) -> Self {
        self.coordinates.push(name.into());
        self
    }

    /// Check if the joint has any coordinate.
    #[must_use]
    pub fn is_articulated(&self) -> bool {
        !self.coordinates.is_empty()
    }
}

/// The bodies a muscle path is attached to at either end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleSpan {
    /// Body of the first path point (origin).
    pub proximal_body: String,
    /// Body of the last path point (insertion).
    pub distal_body: String,
}

/// Independent coordinate(s) driving a coupled coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouplingDriver {
    /// The coordinate is not the dependent of any coupler.
    None,
    /// Driven by exactly one independent coordinate.
    Single(String),
    /// Driven by several independent coordinates.
    Multiple(Vec<String>),
}

/// Computation stage a model has been realized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Geometry is current: path lengths can be read.
    Position,
    /// Forces can be evaluated.
    Dynamics,
}

/// Scalar quantities that can be read from a muscle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuscleQuantity {
    /// Musculotendon length (m).
    Length,
    /// Fiber length / optimal fiber length.
    NormalizedFiberLength,
    /// Tendon length (m).
    TendonLength,
    /// Tendon slack length parameter (m).
    TendonSlackLength,
    /// Active fiber force (N).
    ActiveForce,
    /// Pennation angle (radians).
    PennationAngle,
    /// Optimal fiber length parameter (m).
    OptimalFiberLength,
}

impl MuscleQuantity {
    /// Minimum stage the model must be realized to before this is readable.
    /// Parameters need none.
    #[must_use]
    pub const fn required_stage(self) -> Option<Stage> {
        match self {
            Self::TendonSlackLength | Self::OptimalFiberLength => None,
            Self::Length => Some(Stage::Position),
            Self::NormalizedFiberLength
            | Self::TendonLength
            | Self::ActiveForce
            | Self::PennationAngle => Some(Stage::Dynamics),
        }
    }
}

impl std::fmt::Display for MuscleQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Length => "length",
            Self::NormalizedFiberLength => "normalized fiber length",
            Self::TendonLength => "tendon length",
            Self::TendonSlackLength => "tendon slack length",
            Self::ActiveForce => "active force",
            Self::PennationAngle => "pennation angle",
            Self::OptimalFiberLength => "optimal fiber length",
        };
        f.write_str(name)
    }
}
