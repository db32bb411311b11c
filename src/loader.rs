//! Parse external text formats into [`Graph`] values: MDL molfiles, SDF
//! record lists, and the plain five-line graph format.

use std::fmt::Display;

use crate::graph::Graph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    NotEnoughLines,
    AtomCountNotInt(usize),
    BondCountNotInt(usize),
    BadAtomLine(usize),
    BadBondAtom(usize),
    BondTypeNotInt(usize),
    BondTypeOutOfBounds(usize),
    BadVertexNumber(usize),
    OddEdgeList(usize),
    VertexColorCountMismatch(usize),
    EdgeColorCountMismatch(usize),
    EdgeVertexUnknown(usize),
}

/// Parse a single MDL V2000 mol block. Only the counts line, the element
/// symbol of each atom line, and the bond block are consumed. Hydrogen atoms
/// and their bonds are stripped; the search core is insensitive to that
/// choice, this parser simply mirrors the usual heavy-atom convention.
///
/// Atoms become vertices labeled `0..n` with their element symbol as color;
/// bonds become edges colored `single`, `double`, `triple`, or `aromatic`.
pub fn parse_molfile_str(input: &str) -> Result<Graph, ParserError> {
    let lines: Vec<&str> = input.lines().collect();
    let (ix, counts_line) = lines
        .iter()
        .enumerate()
        .nth(3)
        .ok_or(ParserError::NotEnoughLines)?;
    let n_atoms: usize = counts_line
        .get(0..3)
        .map(str::trim)
        .ok_or(ParserError::AtomCountNotInt(ix))?
        .parse()
        .map_err(|_| ParserError::AtomCountNotInt(ix))?;
    let n_bonds: usize = counts_line
        .get(3..6)
        .map(str::trim)
        .ok_or(ParserError::BondCountNotInt(ix))?
        .parse()
        .map_err(|_| ParserError::BondCountNotInt(ix))?;

    if lines.len() < 4 + n_atoms + n_bonds {
        return Err(ParserError::NotEnoughLines);
    }

    let mut elements = Vec::with_capacity(n_atoms);
    for (ix, line) in lines.iter().enumerate().skip(4).take(n_atoms) {
        let element = line
            .split_whitespace()
            .nth(3)
            .ok_or(ParserError::BadAtomLine(ix))?;
        elements.push(element.to_owned());
    }

    let mut bonds = Vec::with_capacity(n_bonds);
    let mut bond_types = Vec::with_capacity(n_bonds);
    for (ix, &line) in lines.iter().enumerate().skip(4 + n_atoms).take(n_bonds) {
        let (first, second, bond_type) = parse_bond_line(ix, line)?;
        if first == 0 || first > n_atoms || second == 0 || second > n_atoms {
            return Err(ParserError::BadBondAtom(ix));
        }
        // 1-indexed in the file, 0-indexed here.
        bonds.push((first as u32 - 1, second as u32 - 1));
        bond_types.push(bond_type);
    }

    let (elements, bonds, bond_types) = strip_hydrogens(elements, bonds, bond_types);
    let vertices: Vec<u32> = (0..elements.len() as u32).collect();
    Ok(Graph::with_colors(vertices, bonds, elements, bond_types))
}

fn parse_bond_line(ix: usize, line: &str) -> Result<(usize, usize, String), ParserError> {
    let first = line
        .get(0..3)
        .map(str::trim)
        .ok_or(ParserError::BadBondAtom(ix))?
        .parse()
        .map_err(|_| ParserError::BadBondAtom(ix))?;
    let second = line
        .get(3..6)
        .map(str::trim)
        .ok_or(ParserError::BadBondAtom(ix))?
        .parse()
        .map_err(|_| ParserError::BadBondAtom(ix))?;
    let bond_type = match line
        .get(6..9)
        .map(str::trim)
        .ok_or(ParserError::BondTypeNotInt(ix))?
        .parse::<u32>()
        .map_err(|_| ParserError::BondTypeNotInt(ix))?
    {
        1 => "single",
        2 => "double",
        3 => "triple",
        4 => "aromatic",
        _ => return Err(ParserError::BondTypeOutOfBounds(ix)),
    };
    Ok((first, second, bond_type.to_owned()))
}

/// Drop H atoms and their bonds, renumbering the remaining atoms to `0..k`
/// in their original order.
fn strip_hydrogens(
    elements: Vec<String>,
    bonds: Vec<(u32, u32)>,
    bond_types: Vec<String>,
) -> (Vec<String>, Vec<(u32, u32)>, Vec<String>) {
    if !elements.iter().any(|e| e == "H") {
        return (elements, bonds, bond_types);
    }

    let mut renumber = vec![None; elements.len()];
    let mut kept_elements = Vec::new();
    for (i, element) in elements.into_iter().enumerate() {
        if element != "H" {
            renumber[i] = Some(kept_elements.len() as u32);
            kept_elements.push(element);
        }
    }

    let mut kept_bonds = Vec::new();
    let mut kept_types = Vec::new();
    for ((u, v), bond_type) in bonds.into_iter().zip(bond_types) {
        if let (Some(u), Some(v)) = (renumber[u as usize], renumber[v as usize]) {
            kept_bonds.push((u, v));
            kept_types.push(bond_type);
        }
    }
    (kept_elements, kept_bonds, kept_types)
}

/// Parse an SDF record list: mol blocks separated by `$$$$` on its own line.
/// Blank records (such as the trailing one) are skipped.
pub fn parse_sdfile_str(input: &str) -> Result<Vec<Graph>, ParserError> {
    let normalized = input.replace("\r\n", "\n");
    let mut graphs = Vec::new();
    for record in normalized.split("$$$$\n") {
        if record.trim().is_empty() {
            continue;
        }
        let graph = parse_molfile_str(record)?;
        if graph.vertex_count() > 0 {
            graphs.push(graph);
        }
    }
    Ok(graphs)
}

/// Parse the plain graph format: five lines holding a name, space-separated
/// vertex labels, a flat space-separated edge list of even length, vertex
/// colors (or `!` for none), and edge colors (or `!` for none). A three-line
/// file is an uncolored graph; content past line five is ignored.
pub fn parse_graph_str(input: &str) -> Result<(Graph, String), ParserError> {
    let lines: Vec<&str> = input.lines().collect();
    if lines.len() < 3 {
        return Err(ParserError::NotEnoughLines);
    }
    let name = lines[0].trim().to_owned();

    let mut vertices = Vec::new();
    for field in lines[1].split_whitespace() {
        let label = field.parse().map_err(|_| ParserError::BadVertexNumber(1))?;
        vertices.push(label);
    }

    let mut endpoints = Vec::new();
    for field in lines[2].split_whitespace() {
        let label: u32 = field.parse().map_err(|_| ParserError::BadVertexNumber(2))?;
        if !vertices.contains(&label) {
            return Err(ParserError::EdgeVertexUnknown(2));
        }
        endpoints.push(label);
    }
    if endpoints.len() % 2 != 0 {
        return Err(ParserError::OddEdgeList(2));
    }
    let edges: Vec<(u32, u32)> = endpoints.chunks(2).map(|pair| (pair[0], pair[1])).collect();

    let vertex_colors = match lines.get(3).map(|line| line.trim()) {
        None | Some("!") => Vec::new(),
        Some(line) => {
            let colors: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
            if colors.len() != vertices.len() {
                return Err(ParserError::VertexColorCountMismatch(3));
            }
            colors
        }
    };
    let edge_colors = match lines.get(4).map(|line| line.trim()) {
        None | Some("!") => Vec::new(),
        Some(line) => {
            let colors: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
            if colors.len() != edges.len() {
                return Err(ParserError::EdgeColorCountMismatch(4));
            }
            colors
        }
    };

    Ok((
        Graph::with_colors(vertices, edges, vertex_colors, edge_colors),
        name,
    ))
}

impl Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEnoughLines => write!(f, "File does not have enough lines"),
            Self::AtomCountNotInt(line) => {
                write!(f, "Line {line}: Atom count is not an integer")
            }
            Self::BondCountNotInt(line) => {
                write!(f, "Line {line}: Bond count is not an integer")
            }
            Self::BadAtomLine(line) => {
                write!(f, "Line {line}: Atom line has no element symbol")
            }
            Self::BadBondAtom(line) => write!(f, "Line {line}: Bad bond atom number"),
            Self::BondTypeNotInt(line) => {
                write!(f, "Line {line}: Bond type is not an integer")
            }
            Self::BondTypeOutOfBounds(line) => {
                write!(f, "Line {line}: Bond type is not 1, 2, 3, or 4")
            }
            Self::BadVertexNumber(line) => {
                write!(f, "Line {line}: Bad vertex number")
            }
            Self::OddEdgeList(line) => {
                write!(f, "Line {line}: Edge list must contain an even number of vertices")
            }
            Self::VertexColorCountMismatch(line) => {
                write!(f, "Line {line}: Vertex colors must match the number of vertices")
            }
            Self::EdgeColorCountMismatch(line) => {
                write!(f, "Line {line}: Edge colors must match the number of edges")
            }
            Self::EdgeVertexUnknown(line) => {
                write!(f, "Line {line}: Edge references a vertex that is not listed")
            }
        }
    }
}

impl std::error::Error for ParserError {}
