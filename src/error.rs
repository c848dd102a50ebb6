use crate::item::AddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer already rendered its template; create a new renderer")]
    AlreadyRendered,
    #[error("unknown structure `{0}`")]
    UnknownStructure(String),
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("invalid template: {0}")]
    Template(String),
    #[error(transparent)]
    Address(#[from] AddressError),
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
