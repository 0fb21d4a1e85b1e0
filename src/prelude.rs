//! Convenience re-export of the crate's public surface.

pub use crate::error::*;
pub use crate::fft::*;
pub use crate::filterbank::*;
pub use crate::freq_axis::*;
pub use crate::numeric::*;
pub use crate::pitch::*;
pub use crate::streaming::*;
pub use crate::transform::*;
pub use crate::vocoder::*;
pub use crate::window::*;
