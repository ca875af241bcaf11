use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("polygon needs at least 3 vertices, got {vertices}")]
    InvalidGeometry { vertices: usize },
    #[error("vertex {index} does not exist in a sketch of {vertices} vertices")]
    MissingVertex { index: usize, vertices: usize },
    #[error("insertion target {target_index} is out of bounds for a route of {entries} entries")]
    StaleInsertionRequest { target_index: usize, entries: usize },
    #[error("route has no entry {index}, it holds {entries} entries")]
    MissingEntry { index: usize, entries: usize },
    #[error("no draw session is active")]
    NoActiveSession,
    #[error("no polygon is waiting to be imported")]
    NoPendingImport,
}

pub type Result<T> = std::result::Result<T, PlannerError>;
