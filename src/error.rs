use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceSwapError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("blend ratio must be between 0.0 and 1.0, got {0}")]
    InvalidBlendRatio(f32),

    #[error("failed to open video {path}: {reason}")]
    VideoOpen { path: String, reason: String },

    #[error("failed to create video writer for {path}: {reason}")]
    VideoCreate { path: String, reason: String },

    #[error("truncated video frame: expected {expected} bytes, got {got}")]
    TruncatedFrame { expected: usize, got: usize },

    #[error("video stream error: {0}")]
    Stream(String),

    #[error("muxer failed: {0}")]
    Mux(String),
}
