//! Filterbank construction: the auditory weight matrix (ETSI, Slaney,
//! gammatone, window-shaped styles) and the two frequency-adaptive
//! window families (NSGT, CWT kernels) built on top of it.

pub mod auditory;
pub mod cwt;
pub mod nsgt;

pub use auditory::{AuditoryFilterBank, AuditoryStyle, Normalization};
pub use cwt::{CwtFilterBank, WaveletType};
pub use nsgt::{NsgtFilterBank, NsgtFilterBankType};
