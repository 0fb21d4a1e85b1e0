//! Time-frequency analysis engine: perceptual frequency axes and
//! auditory filterbanks, CWT/PWT/NSGT/S-transform/FST spectral
//! transforms, and streaming pitch estimation / phase-vocoder
//! pipelines built on a shared FFT/DFT core.

pub mod error;
pub mod fft;
pub mod filterbank;
pub mod freq_axis;
pub mod numeric;
pub mod pitch;
pub mod prelude;
pub mod streaming;
pub mod transform;
pub mod vocoder;
pub mod window;

pub use error::{AuroraError, AuroraResult};
