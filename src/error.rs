use crate::handles::AnyHandle;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The driver refused to create an object (out of names, lost context, ...)
    #[error("driver error: {0}")]
    Driver(String),

    #[error("handle {0:?} does not refer to a registered resource")]
    UnknownHandle(AnyHandle),

    #[error("unsupported vertex format tag {0}")]
    UnsupportedVertexFormat(u32),

    #[error("buffer holds {len} bytes, too few for {count} elements")]
    InvalidBufferData { count: usize, len: usize },

    #[error("texture data holds {actual} bytes but its dimensions need {expected}")]
    InvalidTextureData { expected: usize, actual: usize },
}
