//! Stateful molecular surface with lazily computed, cached measures.
//!
//! [`MolecularSurface`] owns a copy of the input balls and the surface
//! configuration. The dual complex and the two scalar measures are computed on
//! first request and kept until the molecule, the probe radius or the surface
//! type changes.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, OnceLock};

use log::debug;
use nalgebra::Point3;

use crate::alpha_shape::AlphaShapeBuilder;
use crate::complex::{ComplexBuilder, DualComplex};
use crate::error::SurfaceError;
use crate::measure::SurfaceMeasure;
use crate::types::{Ball, Sphere, SurfaceOptions, SurfaceType, validate_balls, validate_probe};

/// Molecular surface of a set of atomic balls.
///
/// # Example
///
/// ```
/// use molecular_surface::{Ball, MolecularSurface, SurfaceType};
///
/// let balls = vec![
///     Ball::new(0.0, 0.0, 0.0, 1.7),
///     Ball::new(1.5, 0.0, 0.0, 1.55),
/// ];
///
/// let mut surface = MolecularSurface::new(&balls, SurfaceType::VanDerWaals).unwrap();
/// let vdw = surface.volume();
///
/// surface.set_surface_type(SurfaceType::SolventAccessible);
/// assert!(surface.volume() > vdw);
/// ```
pub struct MolecularSurface<B: ComplexBuilder = AlphaShapeBuilder> {
    balls: Vec<Ball>,
    options: SurfaceOptions,
    spheres: Vec<Sphere>,
    builder: B,
    complex: OnceLock<B::Complex>,
    volume: OnceLock<f64>,
    surface_area: OnceLock<f64>,
}

impl MolecularSurface {
    /// Create a surface with the default probe radius.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidBall`] if any ball has non-finite
    /// coordinates or a non-positive radius.
    pub fn new(balls: &[Ball], surface_type: SurfaceType) -> Result<Self, SurfaceError> {
        Self::with_options(
            balls,
            SurfaceOptions {
                surface_type,
                ..SurfaceOptions::default()
            },
        )
    }

    /// # Errors
    ///
    /// Returns an error if the options or any ball are invalid.
    pub fn with_options(balls: &[Ball], options: SurfaceOptions) -> Result<Self, SurfaceError> {
        Self::with_builder(balls, options, AlphaShapeBuilder)
    }
}

impl<B: ComplexBuilder> MolecularSurface<B> {
    /// Create a surface whose dual complex is produced by `builder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options or any ball are invalid.
    pub fn with_builder(
        balls: &[Ball],
        options: SurfaceOptions,
        builder: B,
    ) -> Result<Self, SurfaceError> {
        options.validate()?;
        validate_balls(balls)?;

        let mut surface = Self {
            balls: balls.to_vec(),
            options,
            spheres: Vec::new(),
            builder,
            complex: OnceLock::new(),
            volume: OnceLock::new(),
            surface_area: OnceLock::new(),
        };
        surface.update_spheres();
        Ok(surface)
    }

    #[must_use]
    pub const fn surface_type(&self) -> SurfaceType {
        self.options.surface_type
    }

    #[must_use]
    pub const fn probe_radius(&self) -> f64 {
        self.options.probe_radius
    }

    #[must_use]
    pub const fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    /// Input balls with their base radii.
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Spheres with the radii actually measured for the current surface type.
    #[must_use]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Center of ball `index`, or `None` if out of range.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.balls.get(index).map(Ball::center)
    }

    /// Base radius of ball `index`, or `None` if out of range.
    #[must_use]
    pub fn radius(&self, index: usize) -> Option<f64> {
        self.balls.get(index).map(|b| b.r)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Replace the molecule. On error the surface is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidBall`] for the first invalid ball.
    pub fn set_molecule(&mut self, balls: &[Ball]) -> Result<(), SurfaceError> {
        validate_balls(balls)?;
        self.balls = balls.to_vec();
        self.update_spheres();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidProbe`] if `probe_radius` is negative or
    /// not finite; the surface is left unchanged.
    pub fn set_probe_radius(&mut self, probe_radius: f64) -> Result<(), SurfaceError> {
        validate_probe(probe_radius)?;
        self.options.probe_radius = probe_radius;
        self.update_spheres();
        Ok(())
    }

    pub fn set_surface_type(&mut self, surface_type: SurfaceType) {
        self.options.surface_type = surface_type;
        self.update_spheres();
    }

    /// Dual complex of the current spheres, built on first use.
    pub fn alpha_shape(&self) -> &B::Complex {
        self.complex.get_or_init(|| {
            let points: Vec<Point3<f64>> = self.spheres.iter().map(|s| s.center).collect();
            let weights: Vec<f64> = self.spheres.iter().map(|s| s.r * s.r).collect();
            self.builder.build(&points, &weights)
        })
    }

    /// Analytic evaluator over the current spheres and dual complex.
    pub fn measure(&self) -> SurfaceMeasure<'_, B::Complex> {
        SurfaceMeasure::new(&self.spheres, self.alpha_shape())
    }

    /// Volume enclosed by the surface. Zero for an empty molecule.
    pub fn volume(&self) -> f64 {
        *self.volume.get_or_init(|| {
            if self.spheres.is_empty() {
                return 0.0;
            }
            let volume = self.measure().volume();
            debug!(
                "Volume of {} spheres ({:?}): {volume}",
                self.spheres.len(),
                self.options.surface_type
            );
            volume
        })
    }

    /// Area of the surface. Zero for an empty molecule.
    pub fn surface_area(&self) -> f64 {
        *self.surface_area.get_or_init(|| {
            if self.spheres.is_empty() {
                return 0.0;
            }
            let area = self.measure().surface_area();
            debug!(
                "Surface area of {} spheres ({:?}): {area}",
                self.spheres.len(),
                self.options.surface_type
            );
            area
        })
    }

    fn update_spheres(&mut self) {
        let inflation = self.options.surface_type.inflation(self.options.probe_radius);
        self.spheres = self
            .balls
            .iter()
            .map(|b| Sphere::from_ball(b, inflation))
            .collect();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.complex.take();
        self.volume.take();
        self.surface_area.take();
    }
}

impl<B> MolecularSurface<B>
where
    B: ComplexBuilder + Send + Sync + 'static,
    B::Complex: DualComplex + Send + Sync,
{
    /// Compute [`volume`](Self::volume) on the rayon pool, or on a dedicated
    /// thread when called from a rayon worker.
    ///
    /// The surface cannot be mutated while the returned handle is pending,
    /// because the worker holds a clone of the `Arc`.
    pub fn volume_async(self: &Arc<Self>) -> MeasureHandle {
        let surface = Arc::clone(self);
        MeasureHandle::spawn(move || surface.volume())
    }

    /// Compute [`surface_area`](Self::surface_area) in the background, like
    /// [`volume_async`](Self::volume_async).
    pub fn surface_area_async(self: &Arc<Self>) -> MeasureHandle {
        let surface = Arc::clone(self);
        MeasureHandle::spawn(move || surface.surface_area())
    }
}

/// Pending result of an asynchronous measurement.
pub struct MeasureHandle {
    receiver: Receiver<f64>,
    value: Option<f64>,
}

impl MeasureHandle {
    fn spawn<F>(compute: F) -> Self
    where
        F: FnOnce() -> f64 + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let job = move || {
            // receiver may already be gone
            let _ = sender.send(compute());
        };
        // waiting on a pool job from inside that pool can starve it
        if rayon::current_thread_index().is_some() {
            std::thread::spawn(job);
        } else {
            rayon::spawn(job);
        }
        Self {
            receiver,
            value: None,
        }
    }

    /// Non-blocking check; returns the value once the worker has delivered it.
    pub fn poll(&mut self) -> Option<f64> {
        if self.value.is_none()
            && let Ok(value) = self.receiver.try_recv()
        {
            self.value = Some(value);
        }
        self.value
    }

    pub fn is_ready(&mut self) -> bool {
        self.poll().is_some()
    }

    /// Block until the value is available.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::TaskAborted`] if the worker ended without
    /// delivering a value.
    pub fn wait(self) -> Result<f64, SurfaceError> {
        match self.value {
            Some(value) => Ok(value),
            None => self.receiver.recv().map_err(|_| SurfaceError::TaskAborted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn two_balls() -> Vec<Ball> {
        vec![Ball::new(0.0, 0.0, 0.0, 1.5), Ball::new(2.0, 0.0, 0.0, 1.5)]
    }

    #[test]
    fn test_defaults() {
        let surface = MolecularSurface::new(&two_balls(), SurfaceType::VanDerWaals).unwrap();
        assert_eq!(surface.surface_type(), SurfaceType::VanDerWaals);
        assert_relative_eq!(surface.probe_radius(), 1.4);
        assert_eq!(surface.len(), 2);
        assert!(!surface.is_empty());
        assert_eq!(surface.position(1), Some(Point3::new(2.0, 0.0, 0.0)));
        assert_eq!(surface.radius(0), Some(1.5));
        assert_eq!(surface.radius(2), None);
    }

    #[test]
    fn test_empty_molecule() {
        let surface = MolecularSurface::new(&[], SurfaceType::SolventAccessible).unwrap();
        assert!(surface.is_empty());
        assert_eq!(surface.volume(), 0.0);
        assert_eq!(surface.surface_area(), 0.0);
    }

    #[test]
    fn test_inflation_follows_surface_type() {
        let mut surface = MolecularSurface::new(&two_balls(), SurfaceType::VanDerWaals).unwrap();
        assert_relative_eq!(surface.spheres()[0].r, 1.5);

        surface.set_surface_type(SurfaceType::SolventAccessible);
        assert_relative_eq!(surface.spheres()[0].r, 2.9);

        surface.set_probe_radius(0.5).unwrap();
        assert_relative_eq!(surface.spheres()[1].r, 2.0);
        // base radii are untouched
        assert_relative_eq!(surface.balls()[1].r, 1.5);
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let mut surface = MolecularSurface::new(&two_balls(), SurfaceType::VanDerWaals).unwrap();
        let before = surface.volume();

        surface
            .set_molecule(&[Ball::new(0.0, 0.0, 0.0, 1.0)])
            .unwrap();
        assert!(surface.volume() < before);
        assert_relative_eq!(surface.volume(), 4.0 / 3.0 * PI, max_relative = 1e-12);
        assert_relative_eq!(surface.surface_area(), 4.0 * PI, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let bad = [Ball::new(0.0, f64::NAN, 0.0, 1.0)];
        assert!(matches!(
            MolecularSurface::new(&bad, SurfaceType::VanDerWaals),
            Err(SurfaceError::InvalidBall { index: 0, .. })
        ));

        let options = SurfaceOptions::new(SurfaceType::SolventAccessible, -1.0);
        assert_eq!(
            MolecularSurface::with_options(&two_balls(), options).err(),
            Some(SurfaceError::InvalidProbe(-1.0))
        );

        let mut surface = MolecularSurface::new(&two_balls(), SurfaceType::VanDerWaals).unwrap();
        assert!(surface.set_probe_radius(f64::INFINITY).is_err());
        assert_relative_eq!(surface.probe_radius(), 1.4);
        assert!(surface.set_molecule(&[Ball::new(0.0, 0.0, 0.0, 0.0)]).is_err());
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn test_async_matches_sync() {
        let surface = Arc::new(
            MolecularSurface::new(&two_balls(), SurfaceType::SolventAccessible).unwrap(),
        );
        let volume = surface.volume_async().wait().unwrap();
        let area = surface.surface_area_async().wait().unwrap();

        assert_eq!(volume, surface.volume());
        assert_eq!(area, surface.surface_area());
    }

    #[test]
    fn test_handle_poll_eventually_ready() {
        let surface =
            Arc::new(MolecularSurface::new(&two_balls(), SurfaceType::VanDerWaals).unwrap());
        let mut handle = surface.volume_async();
        while !handle.is_ready() {
            std::thread::yield_now();
        }
        let polled = handle.poll();
        assert_eq!(polled, Some(surface.volume()));
        assert_eq!(handle.wait(), Ok(surface.volume()));
    }

    #[test]
    fn test_wait_inside_single_thread_pool() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let surface = Arc::new(
            MolecularSurface::new(&two_balls(), SurfaceType::SolventAccessible).unwrap(),
        );

        let (volume, area) = pool.install(|| {
            let volume = surface.volume_async().wait().unwrap();
            let area = surface.surface_area_async().wait().unwrap();
            (volume, area)
        });
        assert_eq!(volume, surface.volume());
        assert_eq!(area, surface.surface_area());
    }
}
