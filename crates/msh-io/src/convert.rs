//! Conversion configuration and pipeline drivers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use msh_model::MshModel;
use msh_parse::MshFile;

use crate::arrays::{MeshArrays, load_arrays};
use crate::error::Result;
use crate::tables::{TablePaths, write_tables};
use crate::vtu_writer::VtuWriter;

fn default_cell_type() -> String {
    "hexahedron".to_string()
}

/// Conversion parameters, replacing the hard-coded paths and type constant
/// of the workflow this tool descends from. Loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Source mesh file.
    pub input: PathBuf,
    /// Directory receiving the intermediate tables.
    pub out_dir: PathBuf,
    /// MSH type code of the elements to convert.
    pub element_type: i32,
    /// Output cell type name for VTU conversion. The source element type is
    /// not inspected; the hexahedron default matches the downstream
    /// visualization workflow this replaces.
    #[serde(default = "default_cell_type")]
    pub cell_type: String,
}

impl ConvertConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Result of a full table conversion run.
#[derive(Debug, Clone)]
pub struct TableConversion {
    pub paths: TablePaths,
    pub arrays: MeshArrays,
}

/// Solver hand-off: parse the mesh, write the intermediate tables, and
/// reload them as numeric arrays.
pub fn convert_to_arrays(config: &ConvertConfig) -> Result<TableConversion> {
    let msh = MshFile::parse_file(&config.input)?;
    let stem = table_stem(&config.input);
    let paths = write_tables(
        &msh.nodes,
        &msh.elements,
        &config.out_dir,
        &stem,
        config.element_type,
    )?;
    let arrays = load_arrays(&paths.nodes_path, &paths.elements_path, config.element_type)?;
    Ok(TableConversion { paths, arrays })
}

/// Visualization hand-off: load the mesh model and write one VTU file.
pub fn convert_to_vtu(input: &Path, output: &Path, cell_type: &str) -> Result<()> {
    let model = MshModel::open(input)?;
    VtuWriter::new(&model)
        .with_cell_type(cell_type)?
        .write_vtu(output)
}

/// Intermediate file stem: the input stem with any `gmsh_` prefix dropped.
pub fn table_stem(input: &Path) -> String {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("mesh");
    stem.strip_prefix("gmsh_").unwrap_or(stem).to_string()
}
