//! The tracing pipeline, pixel edges to splines:
//!
//! 1. [`outline`] / [`centerline`] walk the bitmap into pixel chains,
//! 2. [`corners`] partitions each chain at its hard vertices,
//! 3. [`filter`] conditions the partitions in place,
//! 4. [`fit`] turns each partition into lines and cubics.

pub mod centerline;
pub mod corners;
pub mod filter;
pub mod fit;
pub mod outline;

use log::debug;

use crate::config::FittingOptions;
use crate::distmap::DistanceMap;
use crate::error::TraceError;
use crate::spline::{SplineList, SplineListArray};
use crate::TraceHooks;
use outline::PixelOutlineList;

/// Fit every traced outline, collecting the per-outline spline lists.
///
/// Outlines that produce no splines (after degenerate-curve warnings) are
/// omitted rather than failing the whole trace. Progress is reported once
/// per outline and cancellation polled at the same cadence.
pub fn fit_outlines(
    outlines: &PixelOutlineList,
    width: u32,
    height: u32,
    opts: &FittingOptions,
    dmap: Option<&DistanceMap>,
    hooks: &mut TraceHooks,
) -> Result<SplineListArray, TraceError> {
    let mut lists: Vec<SplineList> = Vec::with_capacity(outlines.len());
    for (n, outline) in outlines.iter().enumerate() {
        hooks.report_progress(n as f32 / outlines.len() as f32);
        if hooks.is_cancelled() {
            return Err(TraceError::Cancelled);
        }

        let corners = match corners::effective_surround(outline, opts) {
            Some(surround) => corners::find_corners(outline, opts, surround)?,
            None => Vec::new(),
        };
        debug!("outline {n}: {} points, {} corners", outline.len(), corners.len());

        let mut curves = corners::split_at_corners(outline, &corners, opts, dmap, height);
        let splines = fit::fit_curve_list(&mut curves, opts, hooks);
        if !splines.is_empty() {
            lists.push(splines);
        }
    }

    Ok(SplineListArray {
        lists,
        width,
        height,
        centerline: opts.centerline,
        preserve_width: opts.preserve_width,
        width_weight_factor: opts.width_weight_factor,
        background: opts.background,
    })
}
