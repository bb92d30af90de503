//! Renders the catalogue as an SVG map.
//!
//! Stops served by at least one route define the bounding box; everything
//! is scaled into the padded canvas with the tightest coefficient that
//! fits both axes. Four layers, in order: route lines, route name labels,
//! stop markers, stop name labels. Routes and stops render in
//! lexicographic name order; each non-empty route takes the next palette
//! color, cyclically.

use crate::catalogue::TransportCatalogue;
use crate::geo::Coordinates;
use crate::models::{Route, RouteType, Stop, StopId};
use crate::svg::{self, Circle, Color, Point, Polyline, StrokeLineCap, StrokeLineJoin, Text};

const LABEL_FONT_FAMILY: &str = "Verdana";

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Canvas size in pixels.
    pub size: Point,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: Point,
    pub stop_label_font_size: u32,
    pub stop_label_offset: Point,
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            size: Point::default(),
            padding: 0.0,
            line_width: 0.0,
            stop_radius: 0.0,
            bus_label_font_size: 0,
            bus_label_offset: Point::default(),
            stop_label_font_size: 0,
            stop_label_offset: Point::default(),
            underlayer_color: Color::None,
            underlayer_width: 0.0,
            color_palette: Vec::new(),
        }
    }
}

pub struct MapRenderer {
    settings: RenderSettings,
}

impl MapRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn render_map(&self, catalogue: &TransportCatalogue) -> svg::Document {
        let projector = Projector::new(catalogue, &self.settings);

        let mut sorted_routes: Vec<&Route> = catalogue.routes().iter().collect();
        sorted_routes.sort_unstable_by(|a, b| a.name.cmp(&b.name));

        let mut sorted_stops: Vec<(StopId, &Stop)> = catalogue
            .stops()
            .iter()
            .enumerate()
            .map(|(i, stop)| (StopId(i), stop))
            .filter(|&(id, _)| catalogue.stop_is_served(id))
            .collect();
        sorted_stops.sort_unstable_by(|a, b| a.1.name.cmp(&b.1.name));

        let mut doc = svg::Document::new();
        self.render_lines(&mut doc, catalogue, &sorted_routes, &projector);
        self.render_route_names(&mut doc, catalogue, &sorted_routes, &projector);
        self.render_stops(&mut doc, &sorted_stops, &projector);
        self.render_stop_names(&mut doc, &sorted_stops, &projector);
        doc
    }

    fn palette_color(&self, index: usize) -> Color {
        if self.settings.color_palette.is_empty() {
            Color::None
        } else {
            self.settings.color_palette[index % self.settings.color_palette.len()].clone()
        }
    }

    fn render_lines(
        &self,
        doc: &mut svg::Document,
        catalogue: &TransportCatalogue,
        routes: &[&Route],
        projector: &Projector,
    ) {
        let mut color_index = 0;
        for route in routes {
            if route.stops.is_empty() {
                continue;
            }
            let mut line = Polyline::new()
                .stroke_color(self.palette_color(color_index))
                .fill(Color::None)
                .stroke_width(self.settings.line_width)
                .stroke_line_cap(StrokeLineCap::Round)
                .stroke_line_join(StrokeLineJoin::Round);
            for &stop_id in &route.stops {
                line = line.add_point(projector.project(catalogue.stop(stop_id).coordinates));
            }
            // A LINEAR route is drawn back through the same stops, pivot
            // excluded.
            if route.route_type == RouteType::Linear {
                for &stop_id in route.stops.iter().rev().skip(1) {
                    line = line.add_point(projector.project(catalogue.stop(stop_id).coordinates));
                }
            }
            doc.add(line);
            color_index += 1;
        }
    }

    fn render_route_names(
        &self,
        doc: &mut svg::Document,
        catalogue: &TransportCatalogue,
        routes: &[&Route],
        projector: &Projector,
    ) {
        let mut color_index = 0;
        for route in routes {
            let (Some(&first), Some(&last)) = (route.stops.first(), route.stops.last()) else {
                continue;
            };
            let position = projector.project(catalogue.stop(first).coordinates);
            self.add_route_label(doc, &route.name, position, color_index);
            // LINEAR routes with distinct endpoints are labelled at both.
            if route.route_type == RouteType::Linear && first != last {
                let position = projector.project(catalogue.stop(last).coordinates);
                self.add_route_label(doc, &route.name, position, color_index);
            }
            color_index += 1;
        }
    }

    fn add_route_label(&self, doc: &mut svg::Document, name: &str, position: Point, color_index: usize) {
        let text = Text::new()
            .data(name)
            .position(position)
            .offset(self.settings.bus_label_offset)
            .font_size(self.settings.bus_label_font_size)
            .font_family(LABEL_FONT_FAMILY)
            .font_weight("bold");
        let underlayer = text
            .clone()
            .fill(self.settings.underlayer_color.clone())
            .stroke_color(self.settings.underlayer_color.clone())
            .stroke_width(self.settings.underlayer_width)
            .stroke_line_cap(StrokeLineCap::Round)
            .stroke_line_join(StrokeLineJoin::Round);
        doc.add(underlayer);
        doc.add(text.fill(self.palette_color(color_index)));
    }

    fn render_stops(&self, doc: &mut svg::Document, stops: &[(StopId, &Stop)], projector: &Projector) {
        for (_, stop) in stops {
            doc.add(
                Circle::new()
                    .center(projector.project(stop.coordinates))
                    .radius(self.settings.stop_radius)
                    .fill(Color::Named("white".to_string())),
            );
        }
    }

    fn render_stop_names(
        &self,
        doc: &mut svg::Document,
        stops: &[(StopId, &Stop)],
        projector: &Projector,
    ) {
        for (_, stop) in stops {
            let text = Text::new()
                .data(&stop.name)
                .position(projector.project(stop.coordinates))
                .offset(self.settings.stop_label_offset)
                .font_size(self.settings.stop_label_font_size)
                .font_family(LABEL_FONT_FAMILY);
            let underlayer = text
                .clone()
                .fill(self.settings.underlayer_color.clone())
                .stroke_color(self.settings.underlayer_color.clone())
                .stroke_width(self.settings.underlayer_width)
                .stroke_line_cap(StrokeLineCap::Round)
                .stroke_line_join(StrokeLineJoin::Round);
            doc.add(underlayer);
            doc.add(text.fill(Color::Named("black".to_string())));
        }
    }
}

/// Equirectangular projection into the padded canvas.
struct Projector {
    min_lng: f64,
    max_lat: f64,
    zoom_coef: f64,
    padding: f64,
}

impl Projector {
    fn new(catalogue: &TransportCatalogue, settings: &RenderSettings) -> Self {
        let mut min = Coordinates::new(90.0, 180.0);
        let mut max = Coordinates::new(-90.0, -180.0);
        for (i, stop) in catalogue.stops().iter().enumerate() {
            if !catalogue.stop_is_served(StopId(i)) {
                continue;
            }
            min.lat = min.lat.min(stop.coordinates.lat);
            min.lng = min.lng.min(stop.coordinates.lng);
            max.lat = max.lat.max(stop.coordinates.lat);
            max.lng = max.lng.max(stop.coordinates.lng);
        }

        let width = max.lng - min.lng;
        let height = max.lat - min.lat;
        let width_zero = width.abs() < 1e-6;
        let height_zero = height.abs() < 1e-6;
        let zoom_coef = if width_zero && height_zero {
            0.0
        } else if width_zero {
            (settings.size.y - 2.0 * settings.padding) / height
        } else if height_zero {
            (settings.size.x - 2.0 * settings.padding) / width
        } else {
            f64::min(
                (settings.size.y - 2.0 * settings.padding) / height,
                (settings.size.x - 2.0 * settings.padding) / width,
            )
        };

        Self {
            min_lng: min.lng,
            max_lat: max.lat,
            zoom_coef,
            padding: settings.padding,
        }
    }

    fn project(&self, coordinates: Coordinates) -> Point {
        Point::new(
            (coordinates.lng - self.min_lng) * self.zoom_coef + self.padding,
            (self.max_lat - coordinates.lat) * self.zoom_coef + self.padding,
        )
    }
}
