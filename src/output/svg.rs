//! SVG writer.
//!
//! Spline coordinates have y growing upward, so the whole document gets a
//! single flip transform rather than rewriting every point. Consecutive
//! lists of the same color share one path element; with opposite winding
//! for holes, the default nonzero fill rule cuts them out.

use std::io::{self, Write};

use kurbo::BezPath;

use crate::bitmap::Color;
use crate::spline::SplineListArray;

fn color_attr(c: Color) -> String {
    format!("rgb({},{},{})", c.r, c.g, c.b)
}

/// Write `result` as a standalone SVG document.
pub fn write_svg<W: Write>(out: &mut W, result: &SplineListArray) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" standalone="yes"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = result.width,
        h = result.height,
    )?;
    write!(out, r#"<g transform="translate(0,{}) scale(1,-1)">"#, result.height)?;
    writeln!(out)?;

    let mut i = 0;
    while i < result.lists.len() {
        let color = result.lists[i].color;
        let mut path = BezPath::new();
        let mut widths = Vec::new();
        while i < result.lists.len() && result.lists[i].color == color {
            path.extend(result.lists[i].to_bez_path().elements().iter().copied());
            widths.push(result.lists[i].mean_width());
            i += 1;
        }

        if result.centerline {
            let stroke_width = if result.preserve_width {
                let mean = widths.iter().sum::<f64>() / widths.len() as f64;
                (2.0 * mean).max(1.0)
            } else {
                1.0
            };
            writeln!(
                out,
                r#"<path style="fill:none; stroke:{}; stroke-width:{:.2}" d="{}"/>"#,
                color_attr(color),
                stroke_width,
                path.to_svg(),
            )?;
        } else {
            writeln!(
                out,
                r#"<path style="fill:{}; stroke:none" d="{}"/>"#,
                color_attr(color),
                path.to_svg(),
            )?;
        }
    }

    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")?;
    Ok(())
}
