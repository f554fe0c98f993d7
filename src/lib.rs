//! Analytic surface area and volume of molecules modelled as unions of balls.
//!
//! Each atom is a ball; the van der Waals surface is the boundary of their
//! union, and the solvent-accessible surface is the boundary of the union with
//! every radius grown by the probe radius. Both measures are computed exactly
//! by inclusion-exclusion over the dual complex of the union (the alpha shape
//! at alpha = 0), following Edelsbrunner's formulation.
//!
//! # Example
//!
//! ```
//! use molecular_surface::{Ball, MolecularSurface, SurfaceOptions, SurfaceType};
//!
//! let balls = vec![
//!     Ball::new(0.0, 0.0, 0.0, 1.7),
//!     Ball::new(1.4, 0.0, 0.0, 1.55),
//!     Ball::new(0.7, 1.2, 0.0, 1.52),
//! ];
//!
//! let options = SurfaceOptions::new(SurfaceType::SolventAccessible, 1.4);
//! let surface = MolecularSurface::with_options(&balls, options).unwrap();
//!
//! println!("SAS area = {:.2}", surface.surface_area());
//! println!("SAS volume = {:.2}", surface.volume());
//!
//! let measure = surface.measure();
//! println!("lens 0-1 volume = {:.3}", measure.pair_intersection_volume(0, 1));
//! ```

mod alpha_shape;
mod complex;
mod error;
pub mod geometry;
mod measure;
mod spheres_searcher;
mod surface;
mod types;

pub use alpha_shape::{AlphaShape, AlphaShapeBuilder};
pub use complex::{ComplexBuilder, DualComplex, Edge, Tetrahedron, Triangle};
pub use error::SurfaceError;
pub use measure::SurfaceMeasure;
pub use surface::{MeasureHandle, MolecularSurface};
pub use types::{Ball, Sphere, SurfaceOptions, SurfaceType};
