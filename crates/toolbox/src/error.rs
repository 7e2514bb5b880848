pub type Result<T, E = ToolboxError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ToolboxError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("expected exactly one item, found {found}")]
    NotSingle { found: &'static str },

    #[error("time data {input:?} does not match any of the {which} formats")]
    UnparsableTime { input: String, which: &'static str },
}
