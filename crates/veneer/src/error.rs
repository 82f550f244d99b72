use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A module lookup came back empty: no module with that name is loaded.
    #[error("Module not found: {0}")]
    ModuleNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
