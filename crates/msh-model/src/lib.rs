//! Recognized element types, the in-memory mesh model, and summary views.

use std::collections::BTreeMap;
use std::path::Path;

use msh_parse::{ElementBlock, MshFile, MshNode, ParseError};

/// Element types recognized by the converters, keyed by the MSH integer
/// type code.
///
/// Connectivity keeps the node ordering the mesh file produced; no
/// reordering toward solver conventions is applied here (tetrahedra in
/// particular differ between conventions, which is the caller's concern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 3-node triangle (code 2)
    Triangle3,
    /// 4-node quadrangle (code 3)
    Quadrangle4,
    /// 4-node tetrahedron (code 4)
    Tetrahedron4,
    /// 8-node hexahedron (code 5)
    Hexahedron8,
    /// 6-node second-order triangle (code 9)
    Triangle6,
    /// 9-node second-order quadrangle (code 10)
    Quadrangle9,
    /// 10-node second-order tetrahedron (code 11)
    Tetrahedron10,
    /// 27-node second-order hexahedron (code 12)
    Hexahedron27,
}

impl ElementType {
    /// Look up an element type by its MSH type code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            2 => Some(ElementType::Triangle3),
            3 => Some(ElementType::Quadrangle4),
            4 => Some(ElementType::Tetrahedron4),
            5 => Some(ElementType::Hexahedron8),
            9 => Some(ElementType::Triangle6),
            10 => Some(ElementType::Quadrangle9),
            11 => Some(ElementType::Tetrahedron10),
            12 => Some(ElementType::Hexahedron27),
            _ => None,
        }
    }

    /// The MSH type code.
    pub fn code(&self) -> i32 {
        match self {
            ElementType::Triangle3 => 2,
            ElementType::Quadrangle4 => 3,
            ElementType::Tetrahedron4 => 4,
            ElementType::Hexahedron8 => 5,
            ElementType::Triangle6 => 9,
            ElementType::Quadrangle9 => 10,
            ElementType::Tetrahedron10 => 11,
            ElementType::Hexahedron27 => 12,
        }
    }

    /// Human-readable label used in the intermediate element table.
    pub fn label(&self) -> &'static str {
        match self {
            ElementType::Triangle3 => "3-node-triangle",
            ElementType::Quadrangle4 => "4-node-quadrangle",
            ElementType::Tetrahedron4 => "4-node-tetrahedron",
            ElementType::Hexahedron8 => "8-node-hexahedron",
            ElementType::Triangle6 => "6-node-second-order-triangle",
            ElementType::Quadrangle9 => "9-node-second-order-quadrangle",
            ElementType::Tetrahedron10 => "10-node-second-order-tetrahedron",
            ElementType::Hexahedron27 => "27-node-second-order-hexahedron",
        }
    }

    /// Look up an element type by its intermediate-table label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "3-node-triangle" => Some(ElementType::Triangle3),
            "4-node-quadrangle" => Some(ElementType::Quadrangle4),
            "4-node-tetrahedron" => Some(ElementType::Tetrahedron4),
            "8-node-hexahedron" => Some(ElementType::Hexahedron8),
            "6-node-second-order-triangle" => Some(ElementType::Triangle6),
            "9-node-second-order-quadrangle" => Some(ElementType::Quadrangle9),
            "10-node-second-order-tetrahedron" => Some(ElementType::Tetrahedron10),
            "27-node-second-order-hexahedron" => Some(ElementType::Hexahedron27),
            _ => None,
        }
    }

    /// Number of nodes per element of this type.
    pub fn num_nodes(&self) -> usize {
        match self {
            ElementType::Triangle3 => 3,
            ElementType::Quadrangle4 => 4,
            ElementType::Tetrahedron4 => 4,
            ElementType::Hexahedron8 => 8,
            ElementType::Triangle6 => 6,
            ElementType::Quadrangle9 => 9,
            ElementType::Tetrahedron10 => 10,
            ElementType::Hexahedron27 => 27,
        }
    }

    /// Spatial dimension of the element.
    pub fn dimension(&self) -> i32 {
        match self {
            ElementType::Triangle3
            | ElementType::Quadrangle4
            | ElementType::Triangle6
            | ElementType::Quadrangle9 => 2,
            ElementType::Tetrahedron4
            | ElementType::Hexahedron8
            | ElementType::Tetrahedron10
            | ElementType::Hexahedron27 => 3,
        }
    }
}

/// In-memory mesh model backing the VTU conversion path.
///
/// Exposes the query sequence that pipeline needs: model dimension, the
/// flat node arrays, and the element blocks of a given dimension. The model
/// is a plain owned value, so it is released on every exit path when it
/// goes out of scope.
#[derive(Debug, Clone)]
pub struct MshModel {
    nodes: Vec<MshNode>,
    element_blocks: Vec<ElementBlock>,
}

impl MshModel {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        Ok(Self::from_msh(MshFile::parse_file(path)?))
    }

    pub fn from_str(raw: &str) -> Result<Self, ParseError> {
        Ok(Self::from_msh(MshFile::parse_str(raw)?))
    }

    pub fn from_msh(msh: MshFile) -> Self {
        let nodes = msh
            .nodes
            .blocks
            .into_iter()
            .flat_map(|b| b.nodes)
            .collect();
        Self {
            nodes,
            element_blocks: msh.elements.blocks,
        }
    }

    /// Highest entity dimension present among the element blocks.
    pub fn dimension(&self) -> i32 {
        self.element_blocks
            .iter()
            .map(|b| b.entity_dim)
            .max()
            .unwrap_or(0)
    }

    /// All node tags, in file order.
    pub fn node_tags(&self) -> Vec<u64> {
        self.nodes.iter().map(|n| n.tag).collect()
    }

    /// All node coordinates as a flat x,y,z sequence, in file order.
    pub fn node_coords(&self) -> Vec<f64> {
        self.nodes.iter().flat_map(|n| n.coords).collect()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Element blocks whose entity dimension equals `dim`, in file order.
    pub fn elements(&self, dim: i32) -> Vec<&ElementBlock> {
        self.element_blocks
            .iter()
            .filter(|b| b.entity_dim == dim)
            .collect()
    }

    pub fn element_blocks(&self) -> &[ElementBlock] {
        &self.element_blocks
    }
}

/// Counting view over a parsed mesh file, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSummary {
    pub num_node_blocks: usize,
    pub num_nodes: usize,
    pub min_node_tag: u64,
    pub max_node_tag: u64,
    pub num_element_blocks: usize,
    pub num_elements: usize,
    pub dimension: i32,
    /// Elements per recognized type label; unrecognized codes are keyed as
    /// `type-<code>`.
    pub type_counts: BTreeMap<String, usize>,
}

impl MeshSummary {
    pub fn from_msh(msh: &MshFile) -> Self {
        let mut type_counts = BTreeMap::<String, usize>::new();
        let mut dimension = 0;

        for block in &msh.elements.blocks {
            let key = match ElementType::from_code(block.element_type) {
                Some(ty) => ty.label().to_string(),
                None => format!("type-{}", block.element_type),
            };
            *type_counts.entry(key).or_insert(0) += block.elements.len();
            dimension = dimension.max(block.entity_dim);
        }

        Self {
            num_node_blocks: msh.nodes.blocks.len(),
            num_nodes: msh.nodes.header.num_entities,
            min_node_tag: msh.nodes.header.min_tag,
            max_node_tag: msh.nodes.header.max_tag,
            num_element_blocks: msh.elements.blocks.len(),
            num_elements: msh.elements.header.num_entities,
            dimension,
            type_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BLOCKS: &str = r#"$Nodes
1 4 1 4
3 1 0 4
1
2
3
4
0 0 0
1 0 0
0 1 0
0 0 1
$EndNodes
$Elements
2 3 1 3
2 1 2 2
1 1 2 3
2 2 3 4
3 1 4 1
3 1 2 3 4
$EndElements
"#;

    #[test]
    fn type_table_round_trips_codes_and_labels() {
        for code in [2, 3, 4, 5, 9, 10, 11, 12] {
            let ty = ElementType::from_code(code).expect("code should be recognized");
            assert_eq!(ty.code(), code);
            assert_eq!(ElementType::from_label(ty.label()), Some(ty));
        }
        assert!(ElementType::from_code(7).is_none());
        assert_eq!(ElementType::Tetrahedron10.num_nodes(), 10);
        assert_eq!(
            ElementType::Tetrahedron10.label(),
            "10-node-second-order-tetrahedron"
        );
    }

    #[test]
    fn model_reports_top_dimension_and_filters_blocks() {
        let model = MshModel::from_str(TWO_BLOCKS).expect("parse should succeed");
        assert_eq!(model.dimension(), 3);
        assert_eq!(model.num_nodes(), 4);
        assert_eq!(model.node_tags(), vec![1, 2, 3, 4]);
        assert_eq!(model.node_coords().len(), 12);

        let surface = model.elements(2);
        assert_eq!(surface.len(), 1);
        assert_eq!(surface[0].elements.len(), 2);

        let volume = model.elements(3);
        assert_eq!(volume.len(), 1);
        assert_eq!(volume[0].element_type, 4);
    }

    #[test]
    fn summary_counts_elements_by_label() {
        let msh = MshFile::parse_str(TWO_BLOCKS).expect("parse should succeed");
        let summary = MeshSummary::from_msh(&msh);
        assert_eq!(summary.num_nodes, 4);
        assert_eq!(summary.num_elements, 3);
        assert_eq!(summary.dimension, 3);
        assert_eq!(summary.type_counts.get("3-node-triangle"), Some(&2));
        assert_eq!(summary.type_counts.get("4-node-tetrahedron"), Some(&1));
    }

    #[test]
    fn summary_keys_unrecognized_codes_by_number() {
        let src = r#"$Nodes
1 2 1 2
1 1 0 2
1
2
0 0 0
1 0 0
$EndNodes
$Elements
1 1 1 1
1 1 1 1
1 1 2
$EndElements
"#;
        let msh = MshFile::parse_str(src).expect("parse should succeed");
        let summary = MeshSummary::from_msh(&msh);
        assert_eq!(summary.type_counts.get("type-1"), Some(&1));
    }
}
