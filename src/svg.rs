//! Minimal SVG document writer for the map renderer.
//!
//! Emits the handful of tags the map needs as plain text. Unset attributes
//! are omitted; text payloads are XML-escaped.

use std::fmt::{self, Write as _};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A fill or stroke color, printed per case.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Color {
    #[default]
    None,
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::None => f.write_str("none"),
            Color::Named(name) => f.write_str(name),
            Color::Rgb(r, g, b) => write!(f, "rgb({r},{g},{b})"),
            Color::Rgba(r, g, b, opacity) => write!(f, "rgba({r},{g},{b},{opacity})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeLineCap {
    Butt,
    Round,
    Square,
}

impl fmt::Display for StrokeLineCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineCap::Butt => "butt",
            StrokeLineCap::Round => "round",
            StrokeLineCap::Square => "square",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeLineJoin {
    Miter,
    Round,
    Bevel,
}

impl fmt::Display for StrokeLineJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrokeLineJoin::Miter => "miter",
            StrokeLineJoin::Round => "round",
            StrokeLineJoin::Bevel => "bevel",
        })
    }
}

/// Stroke and fill attributes shared by every element.
#[derive(Clone, Debug, Default, PartialEq)]
struct PathProps {
    fill: Option<Color>,
    stroke_color: Option<Color>,
    stroke_width: Option<f64>,
    line_cap: Option<StrokeLineCap>,
    line_join: Option<StrokeLineJoin>,
}

impl PathProps {
    fn render(&self, out: &mut String) {
        if let Some(fill) = &self.fill {
            let _ = write!(out, " fill=\"{fill}\"");
        }
        if let Some(stroke) = &self.stroke_color {
            let _ = write!(out, " stroke=\"{stroke}\"");
        }
        if let Some(width) = self.stroke_width {
            let _ = write!(out, " stroke-width=\"{width}\"");
        }
        if let Some(cap) = self.line_cap {
            let _ = write!(out, " stroke-linecap=\"{cap}\"");
        }
        if let Some(join) = self.line_join {
            let _ = write!(out, " stroke-linejoin=\"{join}\"");
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
    props: PathProps,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.props.fill = Some(color);
        self
    }

    pub fn stroke_color(mut self, color: Color) -> Self {
        self.props.stroke_color = Some(color);
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.props.stroke_width = Some(width);
        self
    }

    pub fn stroke_line_cap(mut self, cap: StrokeLineCap) -> Self {
        self.props.line_cap = Some(cap);
        self
    }

    pub fn stroke_line_join(mut self, join: StrokeLineJoin) -> Self {
        self.props.line_join = Some(join);
        self
    }

    fn render(&self, out: &mut String) {
        out.push_str("<polyline points=\"");
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{},{}", point.x, point.y);
        }
        out.push('"');
        self.props.render(out);
        out.push_str("/>");
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f64,
    props: PathProps,
}

impl Circle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.props.fill = Some(color);
        self
    }

    fn render(&self, out: &mut String) {
        let _ = write!(
            out,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
            self.center.x, self.center.y, self.radius
        );
        self.props.render(out);
        out.push_str("/>");
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Text {
    position: Point,
    offset: Point,
    font_size: u32,
    font_family: Option<String>,
    font_weight: Option<String>,
    data: String,
    props: PathProps,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family = Some(family.to_string());
        self
    }

    pub fn font_weight(mut self, weight: &str) -> Self {
        self.font_weight = Some(weight.to_string());
        self
    }

    pub fn data(mut self, data: &str) -> Self {
        self.data = data.to_string();
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.props.fill = Some(color);
        self
    }

    pub fn stroke_color(mut self, color: Color) -> Self {
        self.props.stroke_color = Some(color);
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.props.stroke_width = Some(width);
        self
    }

    pub fn stroke_line_cap(mut self, cap: StrokeLineCap) -> Self {
        self.props.line_cap = Some(cap);
        self
    }

    pub fn stroke_line_join(mut self, join: StrokeLineJoin) -> Self {
        self.props.line_join = Some(join);
        self
    }

    fn render(&self, out: &mut String) {
        let _ = write!(
            out,
            "<text x=\"{}\" y=\"{}\" dx=\"{}\" dy=\"{}\" font-size=\"{}\"",
            self.position.x, self.position.y, self.offset.x, self.offset.y, self.font_size
        );
        if let Some(family) = &self.font_family {
            let _ = write!(out, " font-family=\"{family}\"");
        }
        if let Some(weight) = &self.font_weight {
            let _ = write!(out, " font-weight=\"{weight}\"");
        }
        self.props.render(out);
        out.push('>');
        escape_into(&self.data, out);
        out.push_str("</text>");
    }
}

fn escape_into(data: &str, out: &mut String) {
    for c in data.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Polyline(Polyline),
    Circle(Circle),
    Text(Text),
}

impl From<Polyline> for Element {
    fn from(value: Polyline) -> Self {
        Element::Polyline(value)
    }
}

impl From<Circle> for Element {
    fn from(value: Circle) -> Self {
        Element::Circle(value)
    }
}

impl From<Text> for Element {
    fn from(value: Text) -> Self {
        Element::Text(value)
    }
}

/// An SVG document; elements render in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n");
        out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n");
        for element in &self.elements {
            out.push_str("  ");
            match element {
                Element::Polyline(polyline) => polyline.render(&mut out),
                Element::Circle(circle) => circle.render(&mut out),
                Element::Text(text) => text.render(&mut out),
            }
            out.push('\n');
        }
        out.push_str("</svg>");
        out
    }
}
