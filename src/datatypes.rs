use std::f64::consts::PI;
use std::ops::Range;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValveError};
use crate::profiles::SeverityProfile;

/// Number of leaflets (cusps) in the valve
pub const LEAFLET_COUNT: usize = 3;

/// Share of each leaflet's 120 degree sector that the cusp nominally spans
pub const LEAFLET_ARC_FRACTION: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub index: usize,
    /// Position in centimeters
    pub position: Point2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub nodes: [usize; 2],
    pub stiffness: f64,
    /// Reserved for the solver, always zero here
    pub damping: f64,
}

/// Three-point element resisting curvature change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BendingElement {
    pub nodes: [usize; 3],
    pub rigidity: f64,
}

/// Index layout shared by the assembler and the connectivity builder.
///
/// Leaflet `k` owns the contiguous block
/// `[k * points_per_leaflet, (k + 1) * points_per_leaflet)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafletLayout {
    leaflet_count: usize,
    points_per_leaflet: usize,
}

impl LeafletLayout {
    pub fn new(points_per_leaflet: usize) -> Result<LeafletLayout> {
        if points_per_leaflet < 2 {
            return Err(ValveError::InvalidResolution(points_per_leaflet));
        }
        Ok(LeafletLayout {
            leaflet_count: LEAFLET_COUNT,
            points_per_leaflet,
        })
    }

    pub fn leaflet_count(&self) -> usize {
        self.leaflet_count
    }

    pub fn points_per_leaflet(&self) -> usize {
        self.points_per_leaflet
    }

    pub fn total_points(&self) -> usize {
        self.leaflet_count * self.points_per_leaflet
    }

    /// First global index of leaflet `k`
    pub fn base_offset(&self, k: usize) -> usize {
        k * self.points_per_leaflet
    }

    pub fn block(&self, k: usize) -> Range<usize> {
        self.base_offset(k)..self.base_offset(k + 1)
    }

    pub fn blocks(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.leaflet_count).map(move |k| self.block(k))
    }

    /// Leaflet owning a global index, if the index is in range
    pub fn leaflet_of(&self, index: usize) -> Option<usize> {
        if index < self.total_points() {
            Some(index / self.points_per_leaflet)
        } else {
            None
        }
    }

    /// Angle of the attachment point of leaflet `k`
    pub fn base_angle(&self, k: usize) -> f64 {
        k as f64 * self.sector_width()
    }

    pub fn sector_width(&self) -> f64 {
        2.0 * PI / self.leaflet_count as f64
    }

    /// Nominal angular width of a single cusp
    pub fn arc_width(&self) -> f64 {
        self.sector_width() * LEAFLET_ARC_FRACTION
    }
}

/// Counts reported after generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub vertices: usize,
    pub springs: usize,
    pub longitudinal_springs: usize,
    pub cross_springs: usize,
    pub beams: usize,
}

/// A fully generated valve: points, springs and bending elements.
///
/// Built once by [`crate::mesher::run`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValveModel {
    pub(crate) profile: SeverityProfile,
    pub(crate) layout: LeafletLayout,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) springs: Vec<Spring>,
    /// Springs before this index are longitudinal, the rest are cross springs
    pub(crate) longitudinal_count: usize,
    pub(crate) beams: Vec<BendingElement>,
}

impl ValveModel {
    pub fn profile(&self) -> &SeverityProfile {
        &self.profile
    }

    pub fn layout(&self) -> &LeafletLayout {
        &self.layout
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn longitudinal_springs(&self) -> &[Spring] {
        &self.springs[..self.longitudinal_count]
    }

    pub fn cross_springs(&self) -> &[Spring] {
        &self.springs[self.longitudinal_count..]
    }

    pub fn beams(&self) -> &[BendingElement] {
        &self.beams
    }

    /// Vertices belonging to leaflet `k`
    pub fn leaflet(&self, k: usize) -> &[Vertex] {
        &self.vertices[self.layout.block(k)]
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            vertices: self.vertices.len(),
            springs: self.springs.len(),
            longitudinal_springs: self.longitudinal_count,
            cross_springs: self.springs.len() - self.longitudinal_count,
            beams: self.beams.len(),
        }
    }
}
