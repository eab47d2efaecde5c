//! TSPLIB instance parsing and TSPLIB-style result files.
//!
//! An instance is a `KEY : VALUE` header followed by a
//! `NODE_COORD_SECTION` of `<id> <x> <y>` lines, optionally closed by
//! `EOF`:
//!
//! ```text
//! NAME : square4
//! TYPE : TSP
//! DIMENSION : 4
//! EDGE_WEIGHT_TYPE : EUC_2D
//! NODE_COORD_SECTION
//! 1 0 0
//! 2 1 0
//! 3 1 1
//! 4 0 1
//! EOF
//! ```
//!
//! Output files use the same header layout with an `MST_SECTION` of
//! 1-based `a b` pairs or a `TOUR_SECTION` of 1-based indices ended by
//! `-1`.

use std::fmt::Write;

use mstour_pipeline::{Mst, Point, Tour};

/// `EDGE_WEIGHT_TYPE` values whose coordinates are read as plain 2D
/// points. Distances are always Euclidean regardless of which one is
/// named.
pub const SUPPORTED_EDGE_WEIGHT_TYPES: &[&str] = &["EUC_2D", "ATT", "CEIL_2D", "GEO"];

/// Errors from [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A header line has no `:` separator.
    #[error("line {line}: expected `KEY : VALUE`, found {text:?}")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// `DIMENSION` is not a non-negative integer.
    #[error("line {line}: invalid DIMENSION {value:?}")]
    InvalidDimension {
        /// 1-based line number.
        line: usize,
        /// The value as written.
        value: String,
    },

    /// The header never set `DIMENSION`.
    #[error("missing DIMENSION header")]
    MissingDimension,

    /// The input has no `NODE_COORD_SECTION`.
    #[error("missing NODE_COORD_SECTION")]
    MissingCoordSection,

    /// `EDGE_WEIGHT_TYPE` names something other than 2D coordinates.
    #[error("unsupported EDGE_WEIGHT_TYPE {0:?}")]
    UnsupportedEdgeWeightType(String),

    /// A coordinate line is not `<id> <x> <y>`.
    #[error("line {line}: expected `<id> <x> <y>`, found {text:?}")]
    MalformedCoordinate {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// The number of coordinate lines differs from `DIMENSION`.
    #[error("DIMENSION is {expected} but {found} coordinates were read")]
    DimensionMismatch {
        /// Declared `DIMENSION`.
        expected: usize,
        /// Coordinate lines read.
        found: usize,
    },
}

/// A parsed TSPLIB instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TspInstance {
    /// `NAME`, if present.
    pub name: Option<String>,
    /// Every `COMMENT` line, in order.
    pub comments: Vec<String>,
    /// `TYPE`, if present (usually `TSP`).
    pub problem_type: Option<String>,
    /// `EDGE_WEIGHT_TYPE`, if present.
    pub edge_weight_type: Option<String>,
    /// Header entries with other keys, in order.
    pub extra: Vec<(String, String)>,
    /// Node coordinates in file order. Point `i` has TSPLIB id `i + 1`
    /// in well-formed files.
    pub points: Vec<Point>,
}

impl TspInstance {
    /// Number of nodes.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.points.len()
    }

    /// `NAME`, or `fallback` when the header has none.
    #[must_use]
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}

/// Parse a TSPLIB instance.
///
/// Header keys are matched case-sensitively after trimming; spaces
/// around the `:` are optional. Reading stops at `EOF` or the end of
/// input.
///
/// # Errors
///
/// Returns a [`FormatError`] describing the first problem found.
pub fn parse(input: &str) -> Result<TspInstance, FormatError> {
    let mut instance = TspInstance::default();
    let mut dimension = None;
    let mut in_coords = false;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == "EOF" {
            break;
        }

        if in_coords {
            instance.points.push(parse_coordinate(line, line_no)?);
            continue;
        }
        if line.starts_with("NODE_COORD_SECTION") {
            in_coords = true;
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(FormatError::MalformedHeader {
                line: line_no,
                text: line.to_string(),
            });
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "NAME" => instance.name = Some(value.to_string()),
            "COMMENT" => instance.comments.push(value.to_string()),
            "TYPE" => instance.problem_type = Some(value.to_string()),
            "DIMENSION" => {
                let n = value
                    .parse::<usize>()
                    .map_err(|_| FormatError::InvalidDimension {
                        line: line_no,
                        value: value.to_string(),
                    })?;
                dimension = Some(n);
            }
            "EDGE_WEIGHT_TYPE" => {
                if !SUPPORTED_EDGE_WEIGHT_TYPES.contains(&value) {
                    return Err(FormatError::UnsupportedEdgeWeightType(value.to_string()));
                }
                instance.edge_weight_type = Some(value.to_string());
            }
            _ => instance.extra.push((key.to_string(), value.to_string())),
        }
    }

    let expected = dimension.ok_or(FormatError::MissingDimension)?;
    if !in_coords {
        return Err(FormatError::MissingCoordSection);
    }
    if instance.points.len() != expected {
        return Err(FormatError::DimensionMismatch {
            expected,
            found: instance.points.len(),
        });
    }
    Ok(instance)
}

fn parse_coordinate(line: &str, line_no: usize) -> Result<Point, FormatError> {
    let malformed = || FormatError::MalformedCoordinate {
        line: line_no,
        text: line.to_string(),
    };
    let mut fields = line.split_whitespace();
    let (Some(id), Some(x), Some(y), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };
    id.parse::<usize>().map_err(|_| malformed())?;
    let x = x.parse::<f32>().map_err(|_| malformed())?;
    let y = y.parse::<f32>().map_err(|_| malformed())?;
    Ok(Point::new(x, y))
}

/// Serialize a spanning tree as a TSPLIB-style `MST` file.
///
/// Edges are written in tree order as 1-based `a b` pairs.
///
/// # Examples
///
/// ```
/// use mstour_pipeline::{Edge, Mst};
/// use mstour_format::to_mst_file;
///
/// # fn main() -> Result<(), mstour_pipeline::PipelineError> {
/// let mst = Mst::new(2, vec![Edge::new(0, 1, 1.0)?]);
/// let text = to_mst_file("pair", &mst);
/// assert!(text.contains("TYPE: MST\n"));
/// assert!(text.contains("MST_SECTION\n1 2\nEOF\n"));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn to_mst_file(name: &str, mst: &Mst) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "NAME: {name}");
    let _ = writeln!(out, "TYPE: MST");
    let _ = writeln!(out, "DIMENSION: {}", mst.vertex_count());
    let _ = writeln!(out, "MST_SECTION");
    for edge in mst.edges() {
        let _ = writeln!(out, "{} {}", edge.a() + 1, edge.b() + 1);
    }
    let _ = writeln!(out, "EOF");
    out
}

/// Serialize a tour as a TSPLIB `TOUR` file.
///
/// Vertices are written 1-based, one per line, followed by `-1`.
/// `dimension` is the instance's point count, which exceeds the tour
/// length when the walk got stuck.
#[must_use]
pub fn to_tour_file(name: &str, tour: &Tour, dimension: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "NAME: {name}");
    let _ = writeln!(out, "TYPE: TOUR");
    let _ = writeln!(out, "DIMENSION: {dimension}");
    let _ = writeln!(out, "TOUR_SECTION");
    for &v in tour.vertices() {
        let _ = writeln!(out, "{}", v + 1);
    }
    let _ = writeln!(out, "-1");
    let _ = writeln!(out, "EOF");
    out
}
