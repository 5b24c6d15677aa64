//! Boundary tracing: bitmap → pixel outlines via an edge-following state
//! machine.
//!
//! Every pixel has four traceable edges. A raster scan starts a
//! counterclockwise trace at each unvisited TOP edge that borders a color
//! change, and a clockwise (hole) trace at each unvisited BOTTOM edge of
//! the pixel above. From the current edge, at most three successors are
//! tried in fixed priority — straight, diagonal, turn on the same pixel —
//! each of which must be an unmarked, actual color-boundary edge. The trace
//! ends when no successor exists.

use log::debug;

use crate::bitmap::{Bitmap, Color};
use crate::error::TraceError;
use crate::geom::Coord;
use crate::TraceHooks;

/// One traced boundary: a cyclic (or, from the centerline tracer, possibly
/// open) run of pixel coordinates. Consecutive points are edge- or
/// corner-adjacent pixels.
#[derive(Debug, Clone)]
pub struct PixelOutline {
    pub points: Vec<Coord>,
    /// True for hole boundaries, false for outer boundaries.
    pub clockwise: bool,
    pub open: bool,
    pub color: Color,
}

impl PixelOutline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Outlines in raster discovery order.
pub type PixelOutlineList = Vec<PixelOutline>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Left,
    Bottom,
    Right,
}

impl Edge {
    const fn bit(self) -> u8 {
        match self {
            Edge::Top => 1,
            Edge::Left => 2,
            Edge::Bottom => 4,
            Edge::Right => 8,
        }
    }
}

/// Per-pixel visited-edge bitmask.
struct EdgeMarks {
    width: u32,
    bits: Vec<u8>,
}

impl EdgeMarks {
    fn new(width: u32, height: u32) -> Self {
        EdgeMarks { width, bits: vec![0; (width * height) as usize] }
    }

    fn is_marked(&self, row: u32, col: u32, edge: Edge) -> bool {
        self.bits[(row * self.width + col) as usize] & edge.bit() != 0
    }

    fn mark(&mut self, row: u32, col: u32, edge: Edge) {
        self.bits[(row * self.width + col) as usize] |= edge.bit();
    }
}

/// Trace the boundary of every non-background region.
///
/// `hooks.progress` is reported once per row and `hooks.cancel` polled at
/// the same interval; cancellation drops all partial outlines.
pub fn find_outline_pixels(
    bitmap: &Bitmap,
    background: Option<Color>,
    hooks: &mut TraceHooks,
) -> Result<PixelOutlineList, TraceError> {
    let (w, h) = (bitmap.width(), bitmap.height());
    let mut marks = EdgeMarks::new(w, h);
    let mut outlines = PixelOutlineList::new();

    for row in 0..h {
        hooks.report_progress(row as f32 / h as f32);
        if hooks.is_cancelled() {
            return Err(TraceError::Cancelled);
        }
        for col in 0..w {
            let color = bitmap.get_color(row, col);
            if background != Some(color)
                && is_unmarked_outline_edge(bitmap, &marks, row, col, Edge::Top, color)
            {
                let outline = trace_one(bitmap, &mut marks, row, col, Edge::Top, false, color)?;
                if outline.len() > 1 {
                    debug!(
                        "outline {}: {} points, counterclockwise",
                        outlines.len(),
                        outline.len()
                    );
                    outlines.push(outline);
                }
            }
            if row > 0 {
                let above = bitmap.get_color(row - 1, col);
                if above != color
                    && background != Some(above)
                    && is_unmarked_outline_edge(bitmap, &marks, row - 1, col, Edge::Bottom, above)
                {
                    let outline =
                        trace_one(bitmap, &mut marks, row - 1, col, Edge::Bottom, true, above)?;
                    if outline.len() > 1 {
                        debug!("outline {}: {} points, clockwise", outlines.len(), outline.len());
                        outlines.push(outline);
                    }
                }
            }
        }
    }
    Ok(outlines)
}

/// Follow one boundary from `(row, col, edge)` until no unmarked boundary
/// edge continues it.
fn trace_one(
    bitmap: &Bitmap,
    marks: &mut EdgeMarks,
    start_row: u32,
    start_col: u32,
    start_edge: Edge,
    clockwise: bool,
    color: Color,
) -> Result<PixelOutline, TraceError> {
    let h = bitmap.height();
    let mut points: Vec<Coord> = Vec::new();
    let (mut row, mut col, mut edge) = (start_row, start_col, start_edge);
    // A boundary can visit each pixel edge at most once.
    let max_steps = (bitmap.width() as u64 * h as u64).saturating_mul(4);
    let mut steps = 0u64;

    loop {
        let pos = Coord::new(col as i32, (h - row - 1) as i32);
        if points.last() != Some(&pos) {
            points.push(pos);
        }
        marks.mark(row, col, edge);

        steps += 1;
        if steps > max_steps {
            return Err(TraceError::Fatal(format!(
                "outline trace from ({start_row},{start_col}) did not terminate"
            )));
        }

        match next_edge(bitmap, marks, row, col, edge, color) {
            Some((r, c, e)) => {
                row = r;
                col = c;
                edge = e;
            }
            None => break,
        }
    }

    // The trace closes back onto its starting pixel; drop the duplicate.
    if points.len() > 1 && points.last() == points.first() {
        points.pop();
    }
    Ok(PixelOutline { points, clockwise, open: false, color })
}

/// The three candidate successors of an edge, in priority order:
/// continue straight onto the adjacent pixel, cut the diagonal, or turn on
/// the current pixel.
fn next_edge(
    bitmap: &Bitmap,
    marks: &EdgeMarks,
    row: u32,
    col: u32,
    edge: Edge,
    color: Color,
) -> Option<(u32, u32, Edge)> {
    // (row offset, col offset, edge) triplets; the turn candidate is last.
    let candidates: [(i64, i64, Edge); 3] = match edge {
        // Traveling left along the top of the region.
        Edge::Top => [(0, -1, Edge::Top), (-1, -1, Edge::Right), (0, 0, Edge::Left)],
        // Traveling down the left side.
        Edge::Left => [(1, 0, Edge::Left), (1, -1, Edge::Top), (0, 0, Edge::Bottom)],
        // Traveling right along the bottom.
        Edge::Bottom => [(0, 1, Edge::Bottom), (1, 1, Edge::Left), (0, 0, Edge::Right)],
        // Traveling up the right side.
        Edge::Right => [(-1, 0, Edge::Right), (-1, 1, Edge::Bottom), (0, 0, Edge::Top)],
    };

    for (dr, dc, e) in candidates {
        let r = row as i64 + dr;
        let c = col as i64 + dc;
        if r < 0 || c < 0 || r >= bitmap.height() as i64 || c >= bitmap.width() as i64 {
            continue;
        }
        let (r, c) = (r as u32, c as u32);
        if is_unmarked_outline_edge(bitmap, marks, r, c, e, color) {
            return Some((r, c, e));
        }
    }
    None
}

/// An edge is traceable when its pixel is `color`, the neighbor across the
/// edge is not (or is off-bitmap), and it has not been visited.
fn is_unmarked_outline_edge(
    bitmap: &Bitmap,
    marks: &EdgeMarks,
    row: u32,
    col: u32,
    edge: Edge,
    color: Color,
) -> bool {
    !marks.is_marked(row, col, edge) && is_outline_edge(bitmap, row, col, edge, color)
}

fn is_outline_edge(bitmap: &Bitmap, row: u32, col: u32, edge: Edge, color: Color) -> bool {
    if bitmap.get_color(row, col) != color {
        return false;
    }
    match edge {
        Edge::Top => row == 0 || bitmap.get_color(row - 1, col) != color,
        Edge::Bottom => row == bitmap.height() - 1 || bitmap.get_color(row + 1, col) != color,
        Edge::Left => col == 0 || bitmap.get_color(row, col - 1) != color,
        Edge::Right => col == bitmap.width() - 1 || bitmap.get_color(row, col + 1) != color,
    }
}
