//! Engine leaves: embedding contract, intensity models, null calibration,
//! spatial indexing, paired density sampling, divergence estimation.

pub mod density;
pub mod embedding;
pub mod grid;
pub mod intensity;
pub mod ks;
pub mod nullfield;
