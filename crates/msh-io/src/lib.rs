//! I/O support for the Gmsh mesh conversion toolkit.
//!
//! This crate provides:
//! - **Intermediate tables**: the tab-delimited node/element pair handed to
//!   the solver tooling
//! - **Array loader**: fixed-shape numeric arrays rebuilt from the tables
//! - **VTU export** for ParaView visualization
//! - **Conversion drivers** with a JSON-loadable configuration

pub mod arrays;
pub mod convert;
pub mod error;
pub mod tables;
pub mod vtu_writer;

pub use arrays::{MeshArrays, load_arrays};
pub use convert::{
    ConvertConfig, TableConversion, convert_to_arrays, convert_to_vtu, table_stem,
};
pub use error::{IoError, Result};
pub use tables::{TablePaths, node_positions, write_tables};
pub use vtu_writer::{VtuWriter, cell_type_from_name};
