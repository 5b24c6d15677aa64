//! Centerline tracing: 8-connected walks along a pre-thinned skeleton.
//!
//! Thinning itself is a collaborator's job; this module assumes the
//! non-background pixels already form a 1-pixel-wide skeleton and walks it,
//! preferring East, then Southeast, South, Southwest. A walk refuses to
//! enter a pixel with more than four same-color neighbors (a junction) and
//! never retraverses a direction already taken in both senses. A walk that
//! fails to return to its origin is completed by a second walk from the
//! origin in the complementary direction; the halves are joined at the
//! shared origin into one open outline.

use log::debug;

use super::outline::{PixelOutline, PixelOutlineList};
use crate::bitmap::{Bitmap, Color};
use crate::error::TraceError;
use crate::geom::Coord;
use crate::TraceHooks;

/// (row, col) steps in preference order: E, SE, S, SW, W, NW, N, NE.
const DIRECTIONS: [(i64, i64); 8] =
    [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];

/// Direction indices in preference order for the first walk.
const FORWARD: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// The same directions starting from West, used for the second walk.
const COMPLEMENT: [usize; 8] = [4, 5, 6, 7, 0, 1, 2, 3];

const fn opposite(dir: usize) -> usize {
    (dir + 4) % 8
}

/// Per-pixel bitmask of traversal directions already taken.
struct DirMarks {
    width: u32,
    bits: Vec<u8>,
}

impl DirMarks {
    fn new(width: u32, height: u32) -> Self {
        DirMarks { width, bits: vec![0; (width * height) as usize] }
    }

    fn is_marked(&self, row: u32, col: u32, dir: usize) -> bool {
        self.bits[(row * self.width + col) as usize] & (1 << dir) != 0
    }

    fn mark(&mut self, row: u32, col: u32, dir: usize) {
        self.bits[(row * self.width + col) as usize] |= 1 << dir;
    }
}

/// Walk the skeleton of every non-background region.
///
/// Progress and cancellation follow the same per-row cadence as outline
/// tracing.
pub fn find_centerline_pixels(
    bitmap: &Bitmap,
    background: Color,
    hooks: &mut TraceHooks,
) -> Result<PixelOutlineList, TraceError> {
    let (w, h) = (bitmap.width(), bitmap.height());
    let mut marks = DirMarks::new(w, h);
    let mut traced = vec![false; (w * h) as usize];
    let mut outlines = PixelOutlineList::new();

    for row in 0..h {
        hooks.report_progress(row as f32 / h as f32);
        if hooks.is_cancelled() {
            return Err(TraceError::Cancelled);
        }
        for col in 0..w {
            let color = bitmap.get_color(row, col);
            if color == background || traced[(row * w + col) as usize] {
                continue;
            }

            let (mut path, closed) =
                walk(bitmap, &mut marks, &mut traced, (row, col), color, &FORWARD);
            let mut open = false;
            if !closed {
                // Complete the other arm from the origin, then join the two
                // partial paths so they share the origin exactly once.
                let (back, _) =
                    walk(bitmap, &mut marks, &mut traced, (row, col), color, &COMPLEMENT);
                if back.len() > 1 {
                    let mut joined: Vec<(u32, u32)> = back.into_iter().rev().collect();
                    joined.extend(path.into_iter().skip(1));
                    path = joined;
                }
                open = true;
            }

            if path.len() < 2 {
                continue; // degenerate single-pixel outline
            }
            debug!(
                "centerline {}: {} points, {}",
                outlines.len(),
                path.len(),
                if open { "open" } else { "closed" }
            );
            let points: Vec<Coord> = path
                .into_iter()
                .map(|(r, c)| Coord::new(c as i32, (h - r - 1) as i32))
                .collect();
            outlines.push(PixelOutline { points, clockwise: false, open, color });
        }
    }
    Ok(outlines)
}

/// Walk from `origin` taking the first viable direction at each step until
/// the walk closes on the origin or dead-ends. Returns the visited pixels
/// (origin first) and whether it closed.
fn walk(
    bitmap: &Bitmap,
    marks: &mut DirMarks,
    traced: &mut [bool],
    origin: (u32, u32),
    color: Color,
    dir_order: &[usize],
) -> (Vec<(u32, u32)>, bool) {
    let (w, h) = (bitmap.width(), bitmap.height());
    let mut path = vec![origin];
    let (mut row, mut col) = origin;
    traced[(row * w + col) as usize] = true;

    'walk: loop {
        for &dir in dir_order {
            let (dr, dc) = DIRECTIONS[dir];
            let r = row as i64 + dr;
            let c = col as i64 + dc;
            if r < 0 || c < 0 || r >= h as i64 || c >= w as i64 {
                continue;
            }
            let (r, c) = (r as u32, c as u32);
            if bitmap.get_color(r, c) != color {
                continue;
            }
            // Junction guard: never advance through a crowded pixel.
            if same_color_neighbors(bitmap, r, c, color) > 4 {
                continue;
            }
            if marks.is_marked(row, col, dir) && marks.is_marked(r, c, opposite(dir)) {
                continue;
            }
            marks.mark(row, col, dir);
            marks.mark(r, c, opposite(dir));
            row = r;
            col = c;
            if (row, col) == origin {
                return (path, true);
            }
            path.push((row, col));
            traced[(row * w + col) as usize] = true;
            continue 'walk;
        }
        return (path, false);
    }
}

fn same_color_neighbors(bitmap: &Bitmap, row: u32, col: u32, color: Color) -> u32 {
    let mut n = 0;
    for (dr, dc) in DIRECTIONS {
        let r = row as i64 + dr;
        let c = col as i64 + dc;
        if r < 0 || c < 0 || r >= bitmap.height() as i64 || c >= bitmap.width() as i64 {
            continue;
        }
        if bitmap.get_color(r as u32, c as u32) == color {
            n += 1;
        }
    }
    n
}
