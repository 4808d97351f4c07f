use image::RgbImage;

use crate::error::FaceSwapError;

/// Forward-only source of decoded video frames.
///
/// Frames are produced one at a time in stream order; the stream cannot be
/// rewound. Implementations own whatever handle backs the stream and must
/// release it when dropped, on every exit path.
pub trait FrameSource {
    /// Frame dimensions as (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Frames per second of the underlying stream.
    fn frame_rate(&self) -> f64;

    /// Produce the next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FaceSwapError>;
}

/// Sequential sink for processed video frames.
///
/// Frames must be written in order; [`FrameSink::finish`] performs the
/// orderly close. Dropping a sink without finishing it abandons the output.
pub trait FrameSink {
    /// Append one frame to the output stream.
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), FaceSwapError>;

    /// Flush and close the output, surfacing any deferred encoder error.
    fn finish(&mut self) -> Result<(), FaceSwapError>;
}

/// Frame counters from a completed video swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    /// Total frames read from the source and written to the sink.
    pub frames: u64,

    /// Frames on which a face was found and actually composited. Frames
    /// where detection failed pass through unchanged and are not counted
    /// here.
    pub swapped: u64,
}
