//! Edge post-processing: orientation-aware non-maximum suppression and
//! double-threshold hysteresis with skeleton thinning.
//!
//! Both stages consume 8-bit maps produced by response normalization and
//! keep their input shape. Suppression needs the orientation map from the
//! response builder; hysteresis and thinning are purely local.

pub mod hysteresis;
pub mod nms;

pub use hysteresis::{hysteresis_binarize, thin};
pub use nms::suppress_non_maxima;
