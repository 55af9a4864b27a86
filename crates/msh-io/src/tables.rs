//! Intermediate tab-delimited node and element tables.
//!
//! Stage 2 of the solver hand-off: the parsed `$Nodes`/`$Elements` sections
//! are re-emitted as two flat tables, `<stem>_cvtMSH.nodes` and
//! `<stem>_cvtMSH.ele`. Each table starts with its source section summary
//! line. The element table is filtered to one requested element type;
//! connectivity keeps the source file's node ordering.

use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use msh_model::ElementType;
use msh_parse::{ElementSection, NodeSection};

use crate::error::{IoError, Result};

/// Paths of one written table pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub nodes_path: PathBuf,
    pub elements_path: PathBuf,
}

/// Write the node and element tables for `type_code` into `out_dir`.
///
/// Element blocks whose type code is not in the recognized table are
/// skipped without error; blocks of recognized but non-requested types are
/// filtered out. The requested code itself must be recognized.
pub fn write_tables(
    nodes: &NodeSection,
    elements: &ElementSection,
    out_dir: &Path,
    stem: &str,
    type_code: i32,
) -> Result<TablePaths> {
    let requested =
        ElementType::from_code(type_code).ok_or(IoError::UnknownElementType(type_code))?;
    fs::create_dir_all(out_dir)?;

    let nodes_path = out_dir.join(format!("{stem}_cvtMSH.nodes"));
    let elements_path = out_dir.join(format!("{stem}_cvtMSH.ele"));

    write_node_table(nodes, &nodes_path)?;
    write_element_table(elements, &elements_path, requested)?;

    Ok(TablePaths {
        nodes_path,
        elements_path,
    })
}

fn write_node_table(nodes: &NodeSection, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let h = nodes.header;
    writeln!(
        writer,
        "{} {} {} {}",
        h.num_blocks, h.num_entities, h.min_tag, h.max_tag
    )?;

    for block in &nodes.blocks {
        for node in &block.nodes {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                node.tag, node.coords[0], node.coords[1], node.coords[2]
            )?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_element_table(
    elements: &ElementSection,
    path: &Path,
    requested: ElementType,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let h = elements.header;
    writeln!(
        writer,
        "{} {} {} {}",
        h.num_blocks, h.num_entities, h.min_tag, h.max_tag
    )?;

    for block in &elements.blocks {
        let ty = match ElementType::from_code(block.element_type) {
            Some(ty) => ty,
            None => continue,
        };
        if ty != requested {
            continue;
        }
        for element in &block.elements {
            write!(writer, "{}\t{}", ty.label(), element.tag)?;
            for node_tag in &element.nodes {
                write!(writer, "\t{node_tag}")?;
            }
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Ordered tag-to-coordinate mapping over all node blocks.
pub fn node_positions(nodes: &NodeSection) -> BTreeMap<u64, [f64; 3]> {
    nodes
        .blocks
        .iter()
        .flat_map(|b| b.nodes.iter())
        .map(|n| (n.tag, n.coords))
        .collect()
}
