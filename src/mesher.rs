use std::f64::consts::PI;

use nalgebra::Point2;
use tracing::{debug, info};

use crate::{
    config::{self, ArcMode, GeneratorConfig},
    connectivity,
    datatypes::{LeafletLayout, ValveModel, Vertex, LEAFLET_ARC_FRACTION},
    error::{Result, ValveError},
    profiles::SeverityProfile,
};

/// Peak angular deflection of a fully mobile leaflet (radians)
const BASE_CURVATURE: f64 = 0.3;

/// Generates the ordered points of a single leaflet, from annulus to free tip
///
/// # Arguments
/// * `points_per_leaflet` - Number of points along the leaflet, at least 2
/// * `annulus_radius` - Radius of the attachment ring, positive
/// * `leaflet_length` - Nominal leaflet length, positive, scaled by the profile
/// * `profile` - Severity profile driving length and curvature
/// * `base_angle` - Angle of the attachment point
///
/// # Returns
/// A vector of `points_per_leaflet` positions ordered by increasing `t`
pub fn generate_leaflet(
    points_per_leaflet: usize,
    annulus_radius: f64,
    leaflet_length: f64,
    profile: &SeverityProfile,
    base_angle: f64,
) -> Result<Vec<Point2<f64>>> {
    generate_leaflet_with(
        points_per_leaflet,
        annulus_radius,
        leaflet_length,
        profile,
        base_angle,
        1.0,
    )
}

fn generate_leaflet_with(
    points_per_leaflet: usize,
    annulus_radius: f64,
    leaflet_length: f64,
    profile: &SeverityProfile,
    base_angle: f64,
    deflection_scale: f64,
) -> Result<Vec<Point2<f64>>> {
    if points_per_leaflet < 2 {
        return Err(ValveError::InvalidResolution(points_per_leaflet));
    }
    config::check_dimensions(annulus_radius, leaflet_length)?;

    let effective_length = leaflet_length * profile.leaflet_length_factor;
    let last = (points_per_leaflet - 1) as f64;

    let points = (0..points_per_leaflet)
        .map(|i| {
            let t = i as f64 / last;
            let r = annulus_radius + effective_length * t;

            // curvature peaks at the base and vanishes at the tip
            let curvature = BASE_CURVATURE * (1.0 - t * t) * profile.mobility_factor;
            let theta = base_angle + deflection_scale * curvature * f64::sin(PI * t);

            Point2::new(r * theta.cos(), r * theta.sin())
        })
        .collect();

    Ok(points)
}

/// Generates the three leaflets and concatenates them in leaflet order
///
/// # Returns
/// A model with vertices and layout populated and no springs or beams
pub fn assemble(config: &GeneratorConfig, profile: &SeverityProfile) -> Result<ValveModel> {
    config.validate()?;
    let layout = LeafletLayout::new(config.points_per_leaflet)?;

    let deflection_scale = match config.arc_mode {
        ArcMode::Ignore => 1.0,
        ArcMode::Confine => LEAFLET_ARC_FRACTION,
    };

    let mut vertices: Vec<Vertex> = Vec::with_capacity(layout.total_points());

    for k in 0..layout.leaflet_count() {
        let base_angle = layout.base_angle(k);
        debug!(
            leaflet = k,
            base_angle,
            arc_width = layout.arc_width(),
            arc_mode = ?config.arc_mode,
            "generating leaflet"
        );

        let points = generate_leaflet_with(
            layout.points_per_leaflet(),
            config.annulus_radius,
            config.leaflet_length,
            profile,
            base_angle,
            deflection_scale,
        )?;

        let offset = layout.base_offset(k);
        vertices.extend(points.into_iter().enumerate().map(|(i, position)| Vertex {
            index: offset + i,
            position,
        }));
    }

    Ok(ValveModel {
        profile: *profile,
        layout,
        vertices,
        springs: Vec::new(),
        longitudinal_count: 0,
        beams: Vec::new(),
    })
}

/// Runs the generator: leaflet geometry followed by connectivity
///
/// # Arguments
/// * `config` - Resolution and nominal geometry
/// * `profile` - Severity profile to build with
pub fn run(config: &GeneratorConfig, profile: &SeverityProfile) -> Result<ValveModel> {
    let mut model = assemble(config, profile)?;

    let connections = connectivity::build(model.layout(), profile);
    model.longitudinal_count = connections.longitudinal_count;
    model.springs = connections.springs;
    model.beams = connections.beams;

    let summary = model.summary();
    info!(
        severity = %profile.severity,
        vertices = summary.vertices,
        springs = summary.springs,
        beams = summary.beams,
        "generated valve model"
    );

    Ok(model)
}
