use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    datatypes::{Spring, Vertex},
    error::{Result, ValveError},
};

/// Relative tolerance under which a hull is treated as having no area
const DEGENERATE_AREA_EPS: f64 = 1e-12;

/// Area enclosed by the vertex set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HullArea {
    /// Area of the convex hull
    Hull(f64),
    /// The hull had no area; this is the circle of minimum radius instead
    Degenerate(f64),
}

impl HullArea {
    pub fn value(&self) -> f64 {
        match self {
            HullArea::Hull(a) | HullArea::Degenerate(a) => *a,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, HullArea::Degenerate(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessStats {
    pub average: f64,
    pub max: f64,
}

/// Derived metrics of a valve model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricProperties {
    pub center: Point2<f64>,
    pub min_radius: f64,
    pub max_radius: f64,
    pub radial_extent: f64,
    pub orifice_area: HullArea,
    /// `None` when there are no springs
    pub stiffness: Option<StiffnessStats>,
    pub vertex_count: usize,
    pub spring_count: usize,
}

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let oa: Vector2<f64> = a - o;
    let ob: Vector2<f64> = b - o;
    oa.perp(&ob)
}

/// Convex hull by monotone chain, counter-clockwise without repeated endpoint
///
/// # Returns
/// `None` if fewer than three non-colinear points exist
pub fn convex_hull(points: &[Point2<f64>]) -> Option<Vec<Point2<f64>>> {
    let mut sorted: Vec<Point2<f64>> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return None;
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(2 * sorted.len());

    // lower hull
    for p in &sorted {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }

    // upper hull
    let lower_len = hull.len() + 1;
    for p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();

    if hull.len() < 3 {
        return None;
    }
    Some(hull)
}

/// Shoelace area of a simple polygon
///
/// Coordinates are taken relative to the first vertex so that polygons far
/// from the origin keep their precision.
pub fn polygon_area(polygon: &[Point2<f64>]) -> f64 {
    let Some(origin) = polygon.first() else {
        return 0.0;
    };
    let twice: f64 = polygon
        .windows(2)
        .skip(1)
        .map(|pair| cross(origin, &pair[0], &pair[1]))
        .sum();
    twice.abs() / 2.0
}

/// Squared diagonal of the axis-aligned bounding box
fn squared_extent(points: &[Point2<f64>]) -> f64 {
    let (lo, hi) = points.iter().fold(
        (
            Point2::new(f64::INFINITY, f64::INFINITY),
            Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(lo, hi), p| (lo.inf(p), hi.sup(p)),
    );
    (hi - lo).norm_squared()
}

/// Computes the orifice area, falling back to `pi * min_radius^2`
/// when the hull is degenerate
pub fn orifice_area(points: &[Point2<f64>], min_radius: f64) -> HullArea {
    if let Some(hull) = convex_hull(points) {
        let area = polygon_area(&hull);
        let scale = squared_extent(&hull);
        if area > DEGENERATE_AREA_EPS * scale.max(f64::MIN_POSITIVE) {
            return HullArea::Hull(area);
        }
    }

    let fallback = PI * min_radius * min_radius;
    warn!(fallback, "degenerate point set, using circle area for orifice");
    HullArea::Degenerate(fallback)
}

/// Computes geometric properties of a model
///
/// # Arguments
/// * `vertices` - The model vertices
/// * `springs` - The model springs
pub fn compute_properties(vertices: &[Vertex], springs: &[Spring]) -> Result<GeometricProperties> {
    if vertices.is_empty() {
        return Err(ValveError::EmptyGeometry);
    }

    let positions: Vec<Point2<f64>> = vertices.iter().map(|v| v.position).collect();

    let sum: Vector2<f64> = positions.iter().map(|p| p.coords).sum();
    let center = Point2::from(sum / positions.len() as f64);

    let (min_radius, max_radius) = positions
        .iter()
        .map(|p| nalgebra::distance(p, &center))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r), hi.max(r))
        });

    let stiffness = if springs.is_empty() {
        None
    } else {
        let total: f64 = springs.iter().map(|s| s.stiffness).sum();
        Some(StiffnessStats {
            average: total / springs.len() as f64,
            max: springs
                .iter()
                .map(|s| s.stiffness)
                .fold(f64::NEG_INFINITY, f64::max),
        })
    };

    Ok(GeometricProperties {
        center,
        min_radius,
        max_radius,
        radial_extent: max_radius - min_radius,
        orifice_area: orifice_area(&positions, min_radius),
        stiffness,
        vertex_count: vertices.len(),
        spring_count: springs.len(),
    })
}

/// Change from a healthy valve to a diseased one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Orifice area lost, in percent of the healthy area
    pub area_reduction_percent: f64,
    /// Ratio of average stiffness, `None` without springs on either side
    pub stiffness_increase: Option<f64>,
}

pub fn progression(healthy: &GeometricProperties, diseased: &GeometricProperties) -> Progression {
    let area_reduction_percent =
        (1.0 - diseased.orifice_area.value() / healthy.orifice_area.value()) * 100.0;
    let stiffness_increase = match (healthy.stiffness, diseased.stiffness) {
        (Some(h), Some(d)) => Some(d.average / h.average),
        _ => None,
    };
    Progression {
        area_reduction_percent,
        stiffness_increase,
    }
}
