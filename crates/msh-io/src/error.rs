//! Error types for msh-io

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("malformed section: {0}")]
    MalformedSection(String),

    #[error("unrecognized element type code {0}")]
    UnknownElementType(i32),

    #[error("no elements of type {0} in mesh")]
    MissingElementType(String),

    #[error("unsupported output cell type: {0}")]
    UnsupportedCellType(String),

    #[error("tag mismatch: {0}")]
    TagMismatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("VTK error: {0}")]
    Vtk(String),
}

impl From<msh_parse::ParseError> for IoError {
    fn from(err: msh_parse::ParseError) -> Self {
        IoError::MalformedSection(err.to_string())
    }
}

impl From<vtkio::Error> for IoError {
    fn from(err: vtkio::Error) -> Self {
        IoError::Vtk(format!("{err:?}"))
    }
}
