//! Numeric array loading from the intermediate tables.
//!
//! Stage 3 of the solver hand-off: re-reads the table pair written by
//! [`crate::tables::write_tables`] and builds fixed-shape arrays restricted
//! to one element type. The arrays are positional: row i does not in
//! general correspond to tag i, and callers must cross-reference the
//! parallel tag/index vectors.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::{DMatrix, DVector};

use msh_model::ElementType;

use crate::error::{IoError, Result};

/// Solver-ready arrays for one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshArrays {
    /// Count of retained (referenced) nodes.
    pub num_nodes: usize,
    /// Count of elements of the requested type.
    pub num_elements: usize,
    /// Node tags, parallel to the coordinate rows.
    pub node_tags: DVector<u64>,
    /// Node coordinates, one x,y,z row per retained node.
    pub node_coords: DMatrix<f64>,
    /// Element-to-node connectivity, one row per element, in source order.
    pub connectivity: DMatrix<u64>,
    /// 1-based contiguous element indices; not validated against the
    /// source element tags.
    pub element_indices: DVector<u64>,
}

/// Load the table pair back into [`MeshArrays`] for `type_code`.
///
/// Node rows are kept by an explicit filter-and-rebuild: every row whose
/// tag is not referenced by an element of the requested type is dropped,
/// wherever it sits in the file.
pub fn load_arrays(nodes_path: &Path, elements_path: &Path, type_code: i32) -> Result<MeshArrays> {
    let requested =
        ElementType::from_code(type_code).ok_or(IoError::UnknownElementType(type_code))?;
    let label = requested.label();
    let nodes_per_element = requested.num_nodes();

    let element_lines = read_lines(elements_path)?;
    if element_lines.is_empty() {
        return Err(IoError::MalformedSection(format!(
            "element table {} is empty",
            elements_path.display()
        )));
    }

    // Scan every parsed type label; the requested label must occur.
    let mut label_counts = BTreeMap::<String, usize>::new();
    let mut connectivity_flat = Vec::new();
    for (row, line) in element_lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(IoError::MalformedSection(format!(
                "element table row {} has {} fields, expected a label, a tag and connectivity",
                row + 1,
                fields.len()
            )));
        }
        *label_counts.entry(fields[0].to_string()).or_insert(0) += 1;

        if fields[0] != label {
            continue;
        }
        let connectivity = &fields[2..];
        if connectivity.len() != nodes_per_element {
            return Err(IoError::TagMismatch(format!(
                "element table row {} carries {} node tags, {label} needs {nodes_per_element}",
                row + 1,
                connectivity.len()
            )));
        }
        for field in connectivity {
            connectivity_flat.push(parse_u64(field, "connectivity node tag")?);
        }
    }

    let num_elements = *label_counts
        .get(label)
        .ok_or_else(|| IoError::MissingElementType(label.to_string()))?;
    let referenced: HashSet<u64> = connectivity_flat.iter().copied().collect();

    let node_lines = read_lines(nodes_path)?;
    if node_lines.is_empty() {
        return Err(IoError::MalformedSection(format!(
            "node table {} is empty",
            nodes_path.display()
        )));
    }
    let declared_nodes = parse_node_header(&node_lines[0])?;

    let mut node_tags = Vec::new();
    let mut coords_flat = Vec::new();
    for (row, line) in node_lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(IoError::MalformedSection(format!(
                "node table row {} has {} fields, expected tag and x y z",
                row + 1,
                fields.len()
            )));
        }
        let tag = parse_u64(fields[0], "node tag")?;
        if !referenced.contains(&tag) {
            continue;
        }
        node_tags.push(tag);
        for field in &fields[1..] {
            coords_flat.push(parse_f64(field, "node coordinate")?);
        }
    }

    if node_tags.len() > declared_nodes {
        return Err(IoError::TagMismatch(format!(
            "node table retains {} rows but its header declares {declared_nodes} nodes",
            node_tags.len()
        )));
    }

    let num_nodes = node_tags.len();
    Ok(MeshArrays {
        num_nodes,
        num_elements,
        node_tags: DVector::from_vec(node_tags),
        node_coords: DMatrix::from_row_slice(num_nodes, 3, &coords_flat),
        connectivity: DMatrix::from_row_slice(num_elements, nodes_per_element, &connectivity_flat),
        element_indices: DVector::from_iterator(num_elements, 1..=num_elements as u64),
    })
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

fn parse_node_header(line: &str) -> Result<usize> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(IoError::MalformedSection(format!(
            "node table header needs 4 fields: {line:?}"
        )));
    }
    parse_u64(fields[1], "declared node count").map(|n| n as usize)
}

fn parse_u64(field: &str, what: &str) -> Result<u64> {
    field
        .parse::<u64>()
        .map_err(|_| IoError::MalformedSection(format!("invalid {what}: {field:?}")))
}

fn parse_f64(field: &str, what: &str) -> Result<f64> {
    field
        .parse::<f64>()
        .map_err(|_| IoError::MalformedSection(format!("invalid {what}: {field:?}")))
}
