//! Contract between the analytic engine and the weighted Delaunay provider.
//!
//! The engine never builds a triangulation itself. It reads the dual complex of
//! the union of balls through [`DualComplex`], and the surface model obtains one
//! through a [`ComplexBuilder`]. Any triangulation library able to answer these
//! queries can be plugged in; [`AlphaShapeBuilder`](crate::AlphaShapeBuilder)
//! is the default.

use nalgebra::Point3;

/// Unordered pair of sphere indices.
pub type Edge = [usize; 2];
/// Unordered triple of sphere indices.
pub type Triangle = [usize; 3];
/// Unordered quadruple of sphere indices.
pub type Tetrahedron = [usize; 4];

/// Dual complex of a union of balls, restricted to the simplices that shape its
/// boundary, with the orthocenter queries and attachment predicates used by the
/// cap formulas.
///
/// Indices refer to the point sequence the complex was built from. Orthocenter
/// queries are symmetric in their arguments.
pub trait DualComplex: Sync {
    /// Spheres whose power cell reaches into their own ball.
    fn vertices(&self) -> &[usize];
    fn edges(&self) -> &[Edge];
    fn triangles(&self) -> &[Triangle];
    fn tetrahedra(&self) -> &[Tetrahedron];

    fn edge_orthocenter(&self, i: usize, j: usize) -> Point3<f64>;
    fn triangle_orthocenter(&self, i: usize, j: usize, k: usize) -> Point3<f64>;
    fn tetrahedron_orthocenter(&self, i: usize, j: usize, k: usize, l: usize) -> Point3<f64>;

    /// Whether the orthocenter of edge (`i`, `j`) lies beyond the center of
    /// `i`, on the side facing away from `j`.
    fn vertex_attached(&self, i: usize, j: usize) -> bool;

    /// Whether the orthocenter of triangle (`i`, `j`, `k`) lies, within the
    /// radical plane of (`i`, `j`), on the side of the edge orthocenter facing
    /// away from `k`.
    fn edge_attached(&self, i: usize, j: usize, k: usize) -> bool;
}

/// Builds a [`DualComplex`] from sphere centers weighted by squared radius.
pub trait ComplexBuilder {
    type Complex: DualComplex;

    fn build(&self, points: &[Point3<f64>], weights: &[f64]) -> Self::Complex;
}
