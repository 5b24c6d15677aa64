use thiserror::Error;

/// Errors that abort a whole top-level tracing or fitting call.
///
/// Recoverable per-curve problems (a single curve that could not be fit,
/// a subdivision that bottomed out) never surface here; they are reported
/// through [`TraceHooks::warning`](crate::TraceHooks) and the affected curve
/// is omitted from the output. An `Err` from the library means the call
/// unwound and all partial results were dropped.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceError {
    /// Impossible numeric or logical state (e.g. an acos argument outside
    /// its domain). Nothing produced by this call is usable.
    #[error("fatal: {0}")]
    Fatal(String),

    /// The caller's cancel predicate returned true. Not a failure; partial
    /// state has been freed and the call can simply be retried later.
    #[error("cancelled by caller")]
    Cancelled,

    /// Bitmaps must carry 1 (grayscale) or 3 (RGB) byte planes.
    #[error("unsupported bitmap plane count: {0}")]
    UnsupportedPlanes(u8),

    /// Bitmap width and height are limited to 65535.
    #[error("bitmap dimension {0} exceeds 65535")]
    DimensionTooLarge(u32),

    /// The raw byte buffer does not match width x height x planes.
    #[error("bitmap data is {actual} bytes, expected {expected}")]
    DataLength { expected: u64, actual: usize },

    #[error("failed to load image: {0}")]
    ImageLoad(String),
}
