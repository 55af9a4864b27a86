//! VTU (XML UnstructuredGrid) export of a mesh model.
//!
//! Takes the first element block at the model's top dimension and writes
//! its elements as a single cell block: node coordinates, zero-based
//! connectivity, and the re-based element tags as a cell attribute. The
//! output cell type is not derived from the source element type; it
//! defaults to hexahedron and can be overridden by name.

use std::fs;
use std::path::Path;

use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataSet, IOBuffer, UnstructuredGridPiece,
    Version, VertexNumbers, Vtk,
};

use msh_model::MshModel;

use crate::error::{IoError, Result};

/// Map an output cell type name to the VTK cell type.
///
/// The names follow the visualization toolkit's conventions for the
/// element types the converters recognize.
pub fn cell_type_from_name(name: &str) -> Option<CellType> {
    match name {
        "triangle" => Some(CellType::Triangle),
        "quad" | "quadrangle" => Some(CellType::Quad),
        "tetra" | "tetrahedron" => Some(CellType::Tetra),
        "hexahedron" => Some(CellType::Hexahedron),
        "triangle6" => Some(CellType::QuadraticTriangle),
        "quad9" => Some(CellType::QuadraticQuad),
        "tetra10" => Some(CellType::QuadraticTetra),
        "hexahedron27" => Some(CellType::QuadraticHexahedron),
        _ => None,
    }
}

/// VTU writer over a borrowed mesh model.
#[derive(Debug)]
pub struct VtuWriter<'a> {
    model: &'a MshModel,
    cell_type: CellType,
}

impl<'a> VtuWriter<'a> {
    pub fn new(model: &'a MshModel) -> Self {
        Self {
            model,
            cell_type: CellType::Hexahedron,
        }
    }

    /// Override the output cell type by name.
    pub fn with_cell_type(mut self, name: &str) -> Result<Self> {
        self.cell_type =
            cell_type_from_name(name).ok_or_else(|| IoError::UnsupportedCellType(name.to_string()))?;
        Ok(self)
    }

    /// Write the model as one VTU file at `path`.
    pub fn write_vtu(&self, path: impl AsRef<Path>) -> Result<()> {
        let piece = self.build_piece()?;
        let mut buffer = Vec::new();
        Vtk {
            version: Version { major: 2, minor: 2 },
            title: String::new(),
            byte_order: ByteOrder::LittleEndian,
            file_path: None,
            data: DataSet::inline(piece),
        }
        .write_xml(&mut buffer)?;
        fs::write(path, &buffer)?;
        Ok(())
    }

    /// Assemble the single grid piece from the model's top dimension.
    fn build_piece(&self) -> Result<UnstructuredGridPiece> {
        let dim = self.model.dimension();
        let blocks = self.model.elements(dim);
        let block = blocks
            .first()
            .ok_or_else(|| IoError::MalformedSection("mesh has no element blocks".to_string()))?;
        let sample = block
            .elements
            .first()
            .ok_or_else(|| IoError::MalformedSection("element block is empty".to_string()))?;
        let nodes_per_element = sample.nodes.len();

        let num_points = self.model.num_nodes();
        let points = self.model.node_coords();

        // Element tags re-based to start at 1, kept as cell data.
        let first_tag = sample.tag as i64;
        let cell_tags: Vec<f64> = block
            .elements
            .iter()
            .map(|e| (e.tag as i64 - first_tag + 1) as f64)
            .collect();

        let mut connectivity = Vec::with_capacity(block.elements.len() * nodes_per_element);
        let mut offsets = Vec::with_capacity(block.elements.len());
        let mut offset = 0u64;
        for element in &block.elements {
            if element.nodes.len() != nodes_per_element {
                return Err(IoError::TagMismatch(format!(
                    "element {} carries {} node tags, the block's first element has {}",
                    element.tag,
                    element.nodes.len(),
                    nodes_per_element
                )));
            }
            for &tag in &element.nodes {
                // Zero-based output indexing: node tags are offset by one.
                if tag == 0 || tag > num_points as u64 {
                    return Err(IoError::TagMismatch(format!(
                        "element {} references node tag {tag} outside the {num_points}-point output",
                        element.tag
                    )));
                }
                connectivity.push(tag - 1);
            }
            offset += nodes_per_element as u64;
            offsets.push(offset);
        }

        let num_cells = block.elements.len();
        Ok(UnstructuredGridPiece {
            points: IOBuffer::F64(points),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets,
                },
                types: vec![self.cell_type; num_cells],
            },
            data: Attributes {
                point: Vec::new(),
                cell: vec![
                    Attribute::scalars("ElementTag", 1).with_data(IOBuffer::F64(cell_tags)),
                ],
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_HEX: &str = r#"$Nodes
1 8 1 8
3 1 0 8
1
2
3
4
5
6
7
8
0 0 0
1 0 0
1 1 0
0 1 0
0 0 1
1 0 1
1 1 1
0 1 1
$EndNodes
$Elements
1 1 1 1
3 1 5 1
1 1 2 3 4 5 6 7 8
$EndElements
"#;

    fn one_hex_model() -> MshModel {
        MshModel::from_str(ONE_HEX).expect("fixture should parse")
    }

    #[test]
    fn piece_holds_zero_based_connectivity() {
        let model = one_hex_model();
        let piece = VtuWriter::new(&model)
            .build_piece()
            .expect("piece should build");

        match piece.points {
            IOBuffer::F64(ref points) => assert_eq!(points.len(), 24),
            ref other => panic!("expected F64 points, got {other:?}"),
        }
        match piece.cells.cell_verts {
            VertexNumbers::XML {
                ref connectivity,
                ref offsets,
            } => {
                assert_eq!(connectivity, &vec![0, 1, 2, 3, 4, 5, 6, 7]);
                assert_eq!(offsets, &vec![8]);
            }
            ref other => panic!("expected XML cell numbering, got {other:?}"),
        }
        assert_eq!(piece.cells.types, vec![CellType::Hexahedron]);
    }

    #[test]
    fn cell_type_override_is_validated() {
        let model = one_hex_model();
        let writer = VtuWriter::new(&model)
            .with_cell_type("tetra10")
            .expect("known cell type");
        assert_eq!(writer.cell_type, CellType::QuadraticTetra);

        let err = VtuWriter::new(&model)
            .with_cell_type("dodecahedron")
            .expect_err("unknown cell type");
        assert!(matches!(err, IoError::UnsupportedCellType(_)));
    }

    #[test]
    fn out_of_range_connectivity_is_a_tag_mismatch() {
        let src = r#"$Nodes
1 2 1 2
3 1 0 2
1
2
0 0 0
1 0 0
$EndNodes
$Elements
1 1 1 1
3 1 1 1
1 1 9
$EndElements
"#;
        let model = MshModel::from_str(src).expect("fixture should parse");
        let err = VtuWriter::new(&model)
            .build_piece()
            .expect_err("should fail");
        assert!(matches!(err, IoError::TagMismatch(_)));
    }

    #[test]
    fn rebased_cell_tags_start_at_one() {
        let src = r#"$Nodes
1 3 1 3
2 1 0 3
1
2
3
0 0 0
1 0 0
0 1 0
$EndNodes
$Elements
1 2 40 41
2 1 2 2
40 1 2 3
41 3 2 1
$EndElements
"#;
        let model = MshModel::from_str(src).expect("fixture should parse");
        let piece = VtuWriter::new(&model)
            .build_piece()
            .expect("piece should build");
        match &piece.data.cell[0] {
            Attribute::DataArray(array) => match &array.data {
                IOBuffer::F64(tags) => assert_eq!(tags, &vec![1.0, 2.0]),
                other => panic!("expected F64 cell tags, got {other:?}"),
            },
            other => panic!("expected data array attribute, got {other:?}"),
        }
    }
}
