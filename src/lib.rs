//! pix2bez: bitmap regions → cubic bezier splines.
//!
//! Traces the boundaries (or, in centerline mode, the skeletons) of
//! contiguous color regions and fits them with lines and cubic beziers.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pix2bez::{trace_bitmap, Bitmap, FittingOptions, TraceHooks};
//!
//! let bitmap = Bitmap::load(Path::new("glyph.png"))?;
//! let result = trace_bitmap(&bitmap, &FittingOptions::default(), &mut TraceHooks::default())?;
//! for list in &result.lists {
//!     println!("{}", list.to_bez_path().to_svg());
//! }
//! # Ok::<(), pix2bez::TraceError>(())
//! ```

#![forbid(unsafe_code)]

pub mod bitmap;
pub mod config;
pub mod curve;
pub mod distmap;
pub mod error;
pub mod geom;
pub mod output;
pub mod spline;
pub mod vectorize;

// Re-export kurbo so downstream users get the same version behind
// SplineList::to_bez_path.
pub use kurbo;

pub use bitmap::{Bitmap, Color};
pub use config::FittingOptions;
pub use error::TraceError;
pub use spline::{Spline, SplineDegree, SplineList, SplineListArray};
pub use vectorize::outline::{PixelOutline, PixelOutlineList};

use distmap::DistanceMap;

/// Caller-injected observation points for a trace.
///
/// All hooks are optional; a defaulted value observes nothing and never
/// cancels. Progress runs from 0.0 to 1.0 across the whole trace, with
/// tracing mapped to the first half and fitting to the second.
pub struct TraceHooks {
    /// Called with overall progress in `[0.0, 1.0]`.
    pub progress: Option<Box<dyn FnMut(f32)>>,
    /// Polled at row/outline granularity; returning true aborts the trace
    /// with [`TraceError::Cancelled`].
    pub cancel: Option<Box<dyn Fn() -> bool>>,
    /// Receives one message per recoverable fitting failure.
    pub warning: Option<Box<dyn FnMut(&str)>>,
    pub(crate) phase_base: f32,
    pub(crate) phase_span: f32,
}

impl Default for TraceHooks {
    fn default() -> Self {
        TraceHooks { progress: None, cancel: None, warning: None, phase_base: 0.0, phase_span: 1.0 }
    }
}

impl TraceHooks {
    pub(crate) fn report_progress(&mut self, fraction: f32) {
        if let Some(progress) = &mut self.progress {
            progress(self.phase_base + fraction * self.phase_span);
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c())
    }

    pub(crate) fn warn(&mut self, message: &str) {
        log::warn!("{message}");
        if let Some(warning) = &mut self.warning {
            warning(message);
        }
    }

    fn phase(&mut self, base: f32, span: f32) {
        self.phase_base = base;
        self.phase_span = span;
    }
}

/// Full pipeline: bitmap → fitted splines.
///
/// Region boundaries are traced counterclockwise (holes clockwise) with
/// y growing upward; in centerline mode the skeleton is traced instead,
/// against `background` (white when unset). Recoverable fitting failures
/// surface through `hooks.warning` and omit the affected curve.
pub fn trace_bitmap(
    bitmap: &Bitmap,
    opts: &FittingOptions,
    hooks: &mut TraceHooks,
) -> Result<SplineListArray, TraceError> {
    let (width, height) = (bitmap.width(), bitmap.height());

    hooks.phase(0.0, 0.5);
    let (outlines, dmap) = if opts.centerline {
        let background = opts.background.unwrap_or(Color::WHITE);
        let outlines = vectorize::centerline::find_centerline_pixels(bitmap, background, hooks)?;
        let dmap = opts.preserve_width.then(|| DistanceMap::new(bitmap, background, true));
        (outlines, dmap)
    } else {
        (vectorize::outline::find_outline_pixels(bitmap, opts.background, hooks)?, None)
    };

    hooks.phase(0.5, 0.5);
    let result = vectorize::fit_outlines(&outlines, width, height, opts, dmap.as_ref(), hooks)?;

    hooks.phase(0.0, 1.0);
    hooks.report_progress(1.0);
    Ok(result)
}
