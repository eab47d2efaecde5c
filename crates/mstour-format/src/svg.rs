//! SVG export serializer.
//!
//! Renders the input points, the spanning tree and the closed tour into
//! one SVG document using the [`svg`] crate for document construction,
//! XML escaping, and path data formatting.
//!
//! The document contains three groups, drawn back to front:
//!
//! - `<g id="mst-edges">`: one `<line>` per tree edge.
//! - `<g id="tour">`: a single closed `<path>` through the tour.
//! - `<g id="points">`: one `<circle>` per point.
//!
//! TSPLIB coordinates grow upward, so the y axis is flipped to keep the
//! picture the right way up.
//!
//! This is a pure function with no I/O. It returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Line, Path, Title};
use svg::node::{Node, Text};

use mstour_pipeline::{Mst, Point, Tour};

/// Margin around the drawing, as a fraction of the larger extent.
const MARGIN_RATIO: f32 = 0.05;

/// Point marker radius, as a fraction of the larger extent.
const POINT_RADIUS_RATIO: f32 = 0.004;

/// Stroke width, as a fraction of the larger extent.
const STROKE_RATIO: f32 = 0.002;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. When present, a `<title>`, `<desc>` or
/// `<metadata>` element is emitted immediately after the opening
/// `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the instance `NAME`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Pipeline configuration JSON, emitted inside `<metadata>` wrapped
    /// in a namespaced `<mstour:pipeline>` element.
    pub config_json: Option<&'a str>,
}

/// Maps input coordinates into the document's coordinate space.
#[derive(Debug, Clone, Copy)]
struct Frame {
    min_x: f32,
    max_y: f32,
    margin: f32,
    width: f32,
    height: f32,
    extent: f32,
}

impl Frame {
    fn fit(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self {
                min_x: 0.0,
                max_y: 0.0,
                margin: 0.0,
                width: 1.0,
                height: 1.0,
                extent: 1.0,
            };
        };
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        let span = (max_x - min_x).max(max_y - min_y);
        let extent = if span > 0.0 { span } else { 1.0 };
        let margin = extent * MARGIN_RATIO;
        Self {
            min_x,
            max_y,
            margin,
            width: 2.0f32.mul_add(margin, max_x - min_x),
            height: 2.0f32.mul_add(margin, max_y - min_y),
            extent,
        }
    }

    fn map(&self, p: Point) -> (f32, f32) {
        (p.x - self.min_x + self.margin, self.max_y - p.y + self.margin)
    }
}

/// Serialize points, spanning tree and tour into an SVG string.
///
/// Edges or tour entries that refer to a vertex outside `points` are
/// skipped. A tour with fewer than 2 vertices draws no path.
///
/// # Examples
///
/// ```
/// use mstour_pipeline::{PipelineConfig, Point, process};
/// use mstour_format::{SvgMetadata, to_svg};
///
/// # fn main() -> Result<(), mstour_pipeline::PipelineError> {
/// let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
/// let solution = process(&points, &PipelineConfig::default())?;
/// let metadata = SvgMetadata {
///     title: Some("triangle"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&points, &solution.mst, &solution.tour, &metadata);
/// assert!(svg.contains("<title>triangle</title>"));
/// assert!(svg.contains(r#"id="mst-edges""#));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn to_svg(points: &[Point], mst: &Mst, tour: &Tour, metadata: &SvgMetadata<'_>) -> String {
    let frame = Frame::fit(points);
    let stroke = frame.extent * STROKE_RATIO;

    let mut doc = Document::new()
        .set("width", frame.width)
        .set("height", frame.height)
        .set("viewBox", (0.0, 0.0, frame.width, frame.height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    if let Some(config_json) = metadata.config_json {
        let mut pipeline_el = Element::new("mstour:pipeline");
        pipeline_el.assign("xmlns:mstour", "https://github.com/altendky/mstour/ns/1");
        pipeline_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(pipeline_el);
        doc = doc.add(metadata_el);
    }

    // Spanning tree edges.
    let mut edges = Group::new()
        .set("id", "mst-edges")
        .set("stroke", "red")
        .set("stroke-width", stroke);
    for (a, b, _) in mst.triples() {
        let (Some(&pa), Some(&pb)) = (points.get(a), points.get(b)) else {
            continue;
        };
        let (x1, y1) = frame.map(pa);
        let (x2, y2) = frame.map(pb);
        edges = edges.add(
            Line::new()
                .set("x1", x1)
                .set("y1", y1)
                .set("x2", x2)
                .set("y2", y2),
        );
    }
    doc = doc.add(edges);

    // Closed tour.
    let mut route = Group::new()
        .set("id", "tour")
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", stroke);
    let coords: Vec<(f32, f32)> = tour
        .vertices()
        .iter()
        .filter_map(|&v| points.get(v).map(|&p| frame.map(p)))
        .collect();
    if let Some((&first, rest)) = coords.split_first()
        && !rest.is_empty()
    {
        let mut data = Data::new().move_to(first);
        for &c in rest {
            data = data.line_to(c);
        }
        route = route.add(Path::new().set("d", data.close()));
    }
    doc = doc.add(route);

    // Points on top.
    let radius = frame.extent * POINT_RADIUS_RATIO;
    let mut markers = Group::new().set("id", "points").set("fill", "blue");
    for &p in points {
        let (cx, cy) = frame.map(p);
        markers = markers.add(Circle::new().set("cx", cx).set("cy", cy).set("r", radius));
    }
    doc = doc.add(markers);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mstour_pipeline::Edge;

    use super::*;

    fn square() -> (Vec<Point>, Mst, Tour) {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let mst = Mst::new(
            4,
            vec![
                Edge::new(0, 1, 10.0).unwrap(),
                Edge::new(0, 3, 10.0).unwrap(),
                Edge::new(1, 2, 10.0).unwrap(),
            ],
        );
        (points, mst, Tour::new(vec![0, 1, 2, 3]))
    }

    #[test]
    fn svg_has_declaration_and_groups() {
        let (points, mst, tour) = square();
        let svg = to_svg(&points, &mst, &tour, &SvgMetadata::default());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg"));
        assert!(svg.contains(r#"id="mst-edges""#));
        assert!(svg.contains(r#"id="tour""#));
        assert!(svg.contains(r#"id="points""#));
        assert_eq!(svg.matches("<line").count(), 3);
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(!svg.contains("<title>"));
    }

    #[test]
    fn y_axis_is_flipped() {
        let (points, mst, tour) = square();
        let svg = to_svg(&points, &mst, &tour, &SvgMetadata::default());
        // Margin is 0.5, so (0, 0) lands bottom-left at (0.5, 10.5).
        assert!(svg.contains(r#"cy="10.5""#), "{svg}");
        assert!(svg.contains(r#"cx="10.5""#), "{svg}");
        assert!(!svg.contains(r#"cy="-"#), "{svg}");
    }

    #[test]
    fn tour_path_is_closed() {
        let (points, mst, tour) = square();
        let svg = to_svg(&points, &mst, &tour, &SvgMetadata::default());
        assert!(svg.contains('z') || svg.contains('Z'));
    }

    #[test]
    fn metadata_is_escaped() {
        let (points, mst, tour) = square();
        let metadata = SvgMetadata {
            title: Some("a<b"),
            description: Some("x & y"),
            config_json: Some(r#"{"verify_sorted":true}"#),
        };
        let svg = to_svg(&points, &mst, &tour, &metadata);
        assert!(svg.contains("<title>a&lt;b</title>"));
        assert!(svg.contains("<desc>x &amp; y</desc>"));
        assert!(svg.contains("<mstour:pipeline"));
    }

    #[test]
    fn empty_and_single_point() {
        let empty = to_svg(&[], &Mst::new(0, Vec::new()), &Tour::default(), &SvgMetadata::default());
        assert!(empty.contains(r#"viewBox="0 0 1 1""#));
        assert!(!empty.contains("<path"));

        let single = to_svg(
            &[Point::new(3.0, 3.0)],
            &Mst::new(1, Vec::new()),
            &Tour::new(vec![0]),
            &SvgMetadata::default(),
        );
        assert_eq!(single.matches("<circle").count(), 1);
        assert!(!single.contains("<path"));
    }

    #[test]
    fn unknown_vertices_are_skipped() {
        let (points, _, _) = square();
        let mst = Mst::new(5, vec![Edge::new(0, 4, 1.0).unwrap()]);
        let svg = to_svg(&points, &mst, &Tour::new(vec![4]), &SvgMetadata::default());
        assert_eq!(svg.matches("<line").count(), 0);
        assert!(!svg.contains("<path"));
    }
}
