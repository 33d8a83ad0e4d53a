use super::core::Millis;

pub type ClawResult<T> = Result<T, ClawError>;

#[derive(thiserror::Error, Debug)]
pub enum ClawError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("keyframe track error: {0}")]
    Keyframes(String),

    /// A timer or lookup named a particle the field never created.
    #[error("unknown particle #{0}")]
    UnknownParticle(u32),

    #[error("frame at {at} pushed after frame at {last}")]
    FrameOrder { at: Millis, last: Millis },

    #[error("config error: {0}")]
    Config(String),

    #[error("trace output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClawError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn keyframes(msg: impl Into<String>) -> Self {
        Self::Keyframes(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ClawError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return Self::Output(err.into());
        }
        Self::serde(err.to_string())
    }
}
