//! Integration tests for musculotendon calibration.
//!
//! Every test runs against the reference right leg in [`fixtures`]:
//!
//! - `end_to_end` - grid sizes, scaled-target recovery, filters, parallel runs
//! - `failures` - muscles that fail alone without stopping the run
//! - `mismatch` - template and target muscle sets that disagree
//! - `fallback` - the two-stage fit for non-physical joint fits
//! - `persistence` - writing results and loading setup files
//! - `properties` - properties of whole runs

mod end_to_end;
mod fallback;
mod fixtures;
mod mismatch;
mod persistence;
