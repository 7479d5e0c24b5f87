//! Procedural generator for a discrete three-leaflet valve model.
//!
//! A severity profile drives the leaflet curve generator; the assembled
//! points are connected by longitudinal springs, cross springs and bending
//! elements, then written out as `.vertex`, `.spring` and `.beam` files for
//! an external immersed-boundary solver.

pub mod config;
pub mod connectivity;
pub mod datatypes;
pub mod error;
pub mod mesher;
pub mod profiles;
pub mod properties;
pub mod serializer;

pub use config::{ArcMode, GeneratorConfig, InputSettings};
pub use datatypes::{BendingElement, LeafletLayout, ModelSummary, Spring, ValveModel, Vertex};
pub use error::{Result, ValveError};
pub use profiles::{Severity, SeverityProfile, SeverityTable};
pub use properties::{compute_properties, GeometricProperties, HullArea};
