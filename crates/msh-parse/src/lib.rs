//! Minimal Gmsh MSH 4.x ASCII section and entity-block parser.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

/// Raw `$Nodes` and `$Elements` section contents, one line per entry.
///
/// Each sequence starts with its section summary line
/// (`numEntityBlocks numEntities minTag maxTag`), exactly as it appears in
/// the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSections {
    pub nodes: Vec<String>,
    /// 1-based line number of the node section summary line.
    pub nodes_line: usize,
    pub elements: Vec<String>,
    /// 1-based line number of the element section summary line.
    pub elements_line: usize,
}

/// Section summary: `numEntityBlocks numEntities minTag maxTag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub num_blocks: usize,
    pub num_entities: usize,
    pub min_tag: u64,
    pub max_tag: u64,
}

/// A node record: integer tag plus coordinate triple.
#[derive(Debug, Clone, PartialEq)]
pub struct MshNode {
    pub tag: u64,
    pub coords: [f64; 3],
}

/// One node entity block: `entityDim entityTag parametric numNodesInBlock`,
/// followed by the block's tag lines and coordinate lines.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBlock {
    pub entity_dim: i32,
    pub entity_tag: i32,
    pub parametric: i32,
    pub nodes: Vec<MshNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSection {
    pub header: SectionHeader,
    pub blocks: Vec<NodeBlock>,
}

/// An element record: integer tag plus connectivity in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MshElement {
    pub tag: u64,
    pub nodes: Vec<u64>,
}

/// One element entity block: `entityDim entityTag elementType
/// numElementsInBlock`, followed by one line per element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBlock {
    pub entity_dim: i32,
    pub entity_tag: i32,
    pub element_type: i32,
    pub elements: Vec<MshElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSection {
    pub header: SectionHeader,
    pub blocks: Vec<ElementBlock>,
}

/// Parsed node and element sections of one MSH file.
#[derive(Debug, Clone, PartialEq)]
pub struct MshFile {
    pub nodes: NodeSection,
    pub elements: ElementSection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

impl RawSections {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ParseError {
            line: 0,
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let mut nodes = Vec::new();
        let mut nodes_line = 0usize;
        let mut elements = Vec::new();
        let mut elements_line = 0usize;
        let mut open: Option<(String, usize)> = None;

        for (idx, line) in raw.lines().enumerate() {
            let lineno = idx + 1;
            let trimmed = line.trim();

            if let Some(marker) = trimmed.strip_prefix('$') {
                if let Some(closed) = marker.strip_prefix("End") {
                    match open.take() {
                        Some((ref name, _)) if name.as_str() == closed => {}
                        Some((name, start)) => {
                            return Err(ParseError {
                                line: lineno,
                                message: format!(
                                    "$End{closed} closes section ${name} opened at line {start}"
                                ),
                            });
                        }
                        None => {
                            return Err(ParseError {
                                line: lineno,
                                message: format!("$End{closed} without matching ${closed}"),
                            });
                        }
                    }
                    continue;
                }
                if let Some((name, start)) = &open {
                    return Err(ParseError {
                        line: lineno,
                        message: format!(
                            "${marker} inside section ${name} opened at line {start}"
                        ),
                    });
                }
                if marker == "Nodes" {
                    nodes_line = lineno + 1;
                } else if marker == "Elements" {
                    elements_line = lineno + 1;
                }
                open = Some((marker.to_string(), lineno));
                continue;
            }

            match open.as_ref().map(|(name, _)| name.as_str()) {
                Some("Nodes") => nodes.push(trimmed.to_string()),
                Some("Elements") => elements.push(trimmed.to_string()),
                _ => {}
            }
        }

        if let Some((name, start)) = open {
            return Err(ParseError {
                line: start,
                message: format!("section ${name} is never closed"),
            });
        }
        if nodes.is_empty() {
            return Err(ParseError {
                line: 0,
                message: "missing $Nodes section".to_string(),
            });
        }
        if elements.is_empty() {
            return Err(ParseError {
                line: 0,
                message: "missing $Elements section".to_string(),
            });
        }

        Ok(Self {
            nodes,
            nodes_line,
            elements,
            elements_line,
        })
    }
}

impl SectionHeader {
    fn parse(line: &str, lineno: usize) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ParseError {
                line: lineno,
                message: format!(
                    "section summary needs 4 fields, found {}: {line:?}",
                    fields.len()
                ),
            });
        }
        Ok(Self {
            num_blocks: parse_field(fields[0], lineno, "entity block count")?,
            num_entities: parse_field(fields[1], lineno, "entity count")?,
            min_tag: parse_field(fields[2], lineno, "minimum tag")?,
            max_tag: parse_field(fields[3], lineno, "maximum tag")?,
        })
    }
}

impl NodeSection {
    /// Parse the raw node section lines. `first_line` is the 1-based line
    /// number of the summary line, used for error reporting.
    pub fn from_raw(lines: &[String], first_line: usize) -> Result<Self, ParseError> {
        if lines.is_empty() {
            return Err(ParseError {
                line: first_line,
                message: "empty node section".to_string(),
            });
        }
        let header = SectionHeader::parse(&lines[0], first_line)?;
        let mut blocks = Vec::with_capacity(header.num_blocks);
        let mut total = 0usize;
        let mut i = 1usize;

        while i < lines.len() {
            let block_line = first_line + i;
            let fields: Vec<&str> = lines[i].split_whitespace().collect();
            if fields.len() != 4 {
                return Err(ParseError {
                    line: block_line,
                    message: format!("node block header needs 4 fields: {:?}", lines[i]),
                });
            }
            let entity_dim = parse_field(fields[0], block_line, "entity dimension")?;
            let entity_tag = parse_field(fields[1], block_line, "entity tag")?;
            let parametric = parse_field(fields[2], block_line, "parametric flag")?;
            let count: usize = parse_field(fields[3], block_line, "node count")?;

            // The block count is both the tag-to-coordinate line offset and
            // the loop bound: tags occupy lines i+1..=i+count, coordinates
            // lines i+count+1..=i+2*count.
            if i + 2 * count >= lines.len() {
                return Err(ParseError {
                    line: block_line,
                    message: format!(
                        "node block declares {count} nodes but the section ends early"
                    ),
                });
            }

            let mut nodes = Vec::with_capacity(count);
            for j in 0..count {
                let tag_line = first_line + i + 1 + j;
                let tag: u64 = parse_field(lines[i + 1 + j].trim(), tag_line, "node tag")?;
                let coord_idx = i + 1 + count + j;
                let coord_line = first_line + coord_idx;
                let coords = parse_coords(&lines[coord_idx], coord_line)?;
                nodes.push(MshNode { tag, coords });
            }

            blocks.push(NodeBlock {
                entity_dim,
                entity_tag,
                parametric,
                nodes,
            });
            total += count;
            i += 1 + 2 * count;
        }

        if total != header.num_entities {
            return Err(ParseError {
                line: first_line,
                message: format!(
                    "node section declares {} nodes but blocks contain {total}",
                    header.num_entities
                ),
            });
        }

        Ok(Self { header, blocks })
    }
}

impl ElementSection {
    /// Parse the raw element section lines. `first_line` is the 1-based line
    /// number of the summary line, used for error reporting.
    pub fn from_raw(lines: &[String], first_line: usize) -> Result<Self, ParseError> {
        if lines.is_empty() {
            return Err(ParseError {
                line: first_line,
                message: "empty element section".to_string(),
            });
        }
        let header = SectionHeader::parse(&lines[0], first_line)?;
        let mut blocks = Vec::with_capacity(header.num_blocks);
        let mut total = 0usize;
        let mut i = 1usize;

        while i < lines.len() {
            let block_line = first_line + i;
            let fields: Vec<&str> = lines[i].split_whitespace().collect();
            if fields.len() != 4 {
                return Err(ParseError {
                    line: block_line,
                    message: format!("element block header needs 4 fields: {:?}", lines[i]),
                });
            }
            let entity_dim = parse_field(fields[0], block_line, "entity dimension")?;
            let entity_tag = parse_field(fields[1], block_line, "entity tag")?;
            let element_type = parse_field(fields[2], block_line, "element type code")?;
            let count: usize = parse_field(fields[3], block_line, "element count")?;

            if i + count >= lines.len() {
                return Err(ParseError {
                    line: block_line,
                    message: format!(
                        "element block declares {count} elements but the section ends early"
                    ),
                });
            }

            let mut elements = Vec::with_capacity(count);
            for j in 0..count {
                let elem_idx = i + 1 + j;
                let elem_line = first_line + elem_idx;
                let fields: Vec<&str> = lines[elem_idx].split_whitespace().collect();
                if fields.len() < 2 {
                    return Err(ParseError {
                        line: elem_line,
                        message: format!("element line has no connectivity: {:?}", lines[elem_idx]),
                    });
                }
                let tag: u64 = parse_field(fields[0], elem_line, "element tag")?;
                let nodes = fields[1..]
                    .iter()
                    .map(|f| parse_field(f, elem_line, "connectivity node tag"))
                    .collect::<Result<Vec<u64>, _>>()?;
                elements.push(MshElement { tag, nodes });
            }

            blocks.push(ElementBlock {
                entity_dim,
                entity_tag,
                element_type,
                elements,
            });
            total += count;
            i += 1 + count;
        }

        if total != header.num_entities {
            return Err(ParseError {
                line: first_line,
                message: format!(
                    "element section declares {} elements but blocks contain {total}",
                    header.num_entities
                ),
            });
        }

        Ok(Self { header, blocks })
    }
}

impl MshFile {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let raw = RawSections::parse_file(path)?;
        Self::from_raw(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let raw = RawSections::parse_str(raw)?;
        Self::from_raw(&raw)
    }

    pub fn from_raw(raw: &RawSections) -> Result<Self, ParseError> {
        Ok(Self {
            nodes: NodeSection::from_raw(&raw.nodes, raw.nodes_line)?,
            elements: ElementSection::from_raw(&raw.elements, raw.elements_line)?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    line: usize,
    what: &str,
) -> Result<T, ParseError> {
    field.parse::<T>().map_err(|_| ParseError {
        line,
        message: format!("invalid {what}: {field:?}"),
    })
}

fn parse_coords(line: &str, lineno: usize) -> Result<[f64; 3], ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(ParseError {
            line: lineno,
            message: format!("coordinate line needs 3 fields: {line:?}"),
        });
    }
    Ok([
        parse_field(fields[0], lineno, "x coordinate")?,
        parse_field(fields[1], lineno, "y coordinate")?,
        parse_field(fields[2], lineno, "z coordinate")?,
    ])
}
