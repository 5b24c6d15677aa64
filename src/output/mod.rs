//! Output back ends for fitted splines.

pub mod svg;
