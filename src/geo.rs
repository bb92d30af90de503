//! Geographic primitives shared by the catalogue, router and renderer.

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Absolute tolerance for comparing coordinate components.
const COORD_EPSILON: f64 = 1e-6;

/// A point on the Earth surface, in degrees (WGS84).
#[derive(Clone, Copy, Debug, Default)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        (self.lat - other.lat).abs() < COORD_EPSILON && (self.lng - other.lng).abs() < COORD_EPSILON
    }
}

/// Great-circle distance between two points in meters, using the spherical
/// law of cosines.
pub fn compute_distance(from: Coordinates, to: Coordinates) -> f64 {
    if from == to {
        return 0.0;
    }
    let p1 = from.lat.to_radians();
    let p2 = to.lat.to_radians();
    let dl = (from.lng - to.lng).abs().to_radians();
    let cos_sigma = p1.sin() * p2.sin() + p1.cos() * p2.cos() * dl.cos();
    // Clamp against rounding drift before acos.
    cos_sigma.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M
}
