//! All fitting parameters in one struct.
//!
//! Read-only during a call: short outlines need a smaller corner-detection
//! window, and that is handled by passing an effective surround value down,
//! never by mutating the shared options.

use crate::bitmap::Color;

/// Tunable parameters for outline tracing and spline fitting.
#[derive(Debug, Clone)]
pub struct FittingOptions {
    /// Number of points on either side of a point to consider when
    /// measuring its corner angle.
    pub corner_surround: usize,
    /// A point whose angle is at most this (degrees) opens a corner search
    /// window. Smaller = fewer corners.
    pub corner_threshold: f64,
    /// Any candidate in the window at or below this angle (degrees) is
    /// accepted as a corner outright.
    pub corner_always_threshold: f64,
    /// Smoothing passes over each curve before fitting. 0 disables.
    pub filter_iterations: usize,
    /// Points to average when estimating an endpoint tangent.
    pub tangent_surround: usize,
    /// Worst per-point fit error (pixels) accepted before subdividing.
    pub error_threshold: f64,
    /// Mean chord deviation (pixels) under which a cubic is demoted to a
    /// line, capped at half the chord length.
    pub line_threshold: f64,
    /// Lines whose linearity score exceeds this revert to cubics once the
    /// containing list holds at least one real cubic.
    pub line_reversion_threshold: f64,
    /// Maximum junction gap (pixels, per axis) snapped shut by alignment.
    pub align_threshold: f64,
    /// Drop one of each pair of immediately adjacent corners.
    pub remove_adjacent_corners: bool,

    /// Trace the medial skeleton instead of region boundaries.
    pub centerline: bool,
    /// In centerline mode, attach stroke half-width hints from the
    /// distance map to each point's z coordinate.
    pub preserve_width: bool,
    /// Scale factor applied to distance-map values when preserving width.
    pub width_weight_factor: f64,

    /// Regions of exactly this color produce no outlines.
    pub background: Option<Color>,
}

impl Default for FittingOptions {
    fn default() -> Self {
        Self {
            corner_surround: 4,
            corner_threshold: 100.0,
            corner_always_threshold: 60.0,
            filter_iterations: 4,
            tangent_surround: 3,
            error_threshold: 2.0,
            line_threshold: 1.0,
            line_reversion_threshold: 0.01,
            align_threshold: 0.5,
            remove_adjacent_corners: false,
            centerline: false,
            preserve_width: false,
            width_weight_factor: 6.0,
            background: None,
        }
    }
}
