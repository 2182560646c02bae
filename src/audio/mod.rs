pub mod decoder;
pub mod encoder;
pub mod pause_detector;
pub mod preprocess;
pub mod resample;
