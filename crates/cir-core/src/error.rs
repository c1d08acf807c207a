use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown {vocabulary} name: {name}")]
    UnknownName {
        vocabulary: &'static str,
        name: String,
    },
}
