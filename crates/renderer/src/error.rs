use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    /// A channel type the canvas deliberately does not implement.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The wrapped fragment shader (or its pipeline) was rejected by the GPU layer.
    #[error("shader compilation failed: {0}")]
    Compile(String),

    #[error("failed to decode texture for channel {channel}: {message}")]
    Texture { channel: usize, message: String },

    /// Adapter, device, surface, or window creation failed.
    #[error("GPU setup failed: {0}")]
    Gpu(String),

    #[error("channel {0} exceeds supported ShaderToy channel count (4)")]
    ChannelOutOfRange(usize),

    #[error("canvas is {actual} but the operation requires {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}
