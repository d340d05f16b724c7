//! Kinematic chain discovery.
//!
//! A muscle's length can only change when a joint between its two attachment
//! bodies moves. The chain is found by walking the joint tree from the
//! distal body towards the proximal one:
//!
//! ```text
//!   pelvis ◄──hip_r── femur_r ◄──knee_r── tibia_r
//!   (proximal)                            (distal)
//!
//!   chain = [knee_r, hip_r]
//! ```
//!
//! Every step follows the joint whose child is the current body. Joints
//! without coordinates are walked through but not reported.

use std::collections::HashSet;

use calib_model::PosableModel;

use crate::error::{CalibError, Result};

/// Joints spanned by `muscle`, distal first.
///
/// The walk fails with [`CalibError::Reachability`] when no joint leads out
/// of the current body, when a body is visited twice (the joint graph has a
/// cycle), or when more than `max_steps` joints have been crossed.
///
/// A muscle attached to a single body spans no joints and yields an empty
/// chain.
pub fn resolve_chain<M>(model: &M, muscle: &str, max_steps: usize) -> Result<Vec<String>>
where
    M: PosableModel + ?Sized,
{
    let span = model.muscle_span(muscle)?;
    let joints = model.joints();

    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = span.distal_body.as_str();
    visited.insert(current);

    let fail = |reason: String| {
        CalibError::reachability(muscle, &span.distal_body, &span.proximal_body, reason)
    };

    let mut steps = 0;
    while current != span.proximal_body {
        if steps >= max_steps {
            return Err(fail(format!("walk exceeded {max_steps} joints")));
        }
        steps += 1;

        let joint = joints
            .iter()
            .find(|j| j.child_body == current)
            .ok_or_else(|| fail(format!("no joint has {current} as its child body")))?;

        if joint.is_articulated() {
            chain.push(joint.name.clone());
        }

        current = joint.parent_body.as_str();
        if !visited.insert(current) {
            return Err(fail(format!("joint graph has a cycle through {current}")));
        }
    }

    tracing::debug!("Muscle {} spans {} articulated joints", muscle, chain.len());
    Ok(chain)
}
