//! Scoped pose handle.
//!
//! A [`PoseScope`] borrows a model mutably for the duration of one pose and
//! restores the model's default pose when dropped, so a sampling pass can
//! never leave a model in a half-posed state, even when it bails out early.

use std::ops::{Deref, DerefMut};

use calib_types::CoordinateCombination;

use crate::PosableModel;
use crate::error::Result;

/// Exclusive, self-resetting access to a model's pose.
pub struct PoseScope<'a, M: PosableModel + ?Sized> {
    model: &'a mut M,
}

impl<'a, M: PosableModel + ?Sized> PoseScope<'a, M> {
    /// Take the pose of `model` until the scope is dropped.
    pub fn acquire(model: &'a mut M) -> Self {
        Self { model }
    }

    /// Set every coordinate of row `row` of `combination`.
    ///
    /// Stops at the first coordinate the model rejects.
    pub fn apply_row(&mut self, combination: &CoordinateCombination, row: usize) -> Result<()> {
        for (name, value) in combination.row(row) {
            self.model.set_coordinate_value(name, value)?;
        }
        Ok(())
    }
}

impl<M: PosableModel + ?Sized> Deref for PoseScope<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.model
    }
}

impl<M: PosableModel + ?Sized> DerefMut for PoseScope<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.model
    }
}

impl<M: PosableModel + ?Sized> Drop for PoseScope<'_, M> {
    fn drop(&mut self) {
        self.model.reset_pose();
    }
}
