//! mstour-format: Pure TSPLIB parsing and output serializers (sans-IO)
//!
//! Reads TSPLIB instances into points and writes spanning trees and
//! tours back out as TSPLIB-style text or SVG. Everything works on
//! `&str` in and `String` out; callers own the filesystem.

pub mod svg;
pub mod tsplib;

pub use svg::{SvgMetadata, to_svg};
pub use tsplib::{FormatError, TspInstance, parse, to_mst_file, to_tour_file};
