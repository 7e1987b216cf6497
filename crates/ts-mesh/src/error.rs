use thiserror::Error;

use ts_core::CellId;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("a mesh needs at least one root cell")]
    NoRootCells,

    #[error("cell {0} does not exist in this mesh")]
    UnknownCell(CellId),

    #[error("cell {0} is not active (it has children or was coarsened away)")]
    CellNotActive(CellId),
}

pub type MeshResult<T> = Result<T, MeshError>;
