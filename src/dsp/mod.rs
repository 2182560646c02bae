//! Signal-processing primitives shared by the analysis stages.

pub mod fft;
pub mod noise;
pub mod window;

pub use noise::{NoiseProfile, NoiseReducer};
