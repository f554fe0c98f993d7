use nalgebra::Point3;

use crate::error::SurfaceError;

/// Input ball (center + base radius), user-facing type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
}

impl Ball {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self { x, y, z, r }
    }

    #[must_use]
    pub const fn center(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

impl From<(Point3<f64>, f64)> for Ball {
    fn from((p, r): (Point3<f64>, f64)) -> Self {
        Self::new(p.x, p.y, p.z, r)
    }
}

/// Sphere with its effective radius, as seen by the complex and the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub r: f64,
}

impl Sphere {
    #[must_use]
    pub const fn new(center: Point3<f64>, r: f64) -> Self {
        Self { center, r }
    }

    #[must_use]
    pub const fn from_coords(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self {
            center: Point3::new(x, y, z),
            r,
        }
    }

    /// Convert Ball to Sphere with `inflation` added to the radius
    #[must_use]
    pub fn from_ball(ball: &Ball, inflation: f64) -> Self {
        Self {
            center: ball.center(),
            r: ball.r + inflation,
        }
    }
}

/// Kind of molecular surface to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceType {
    /// Union of the atomic balls with their van der Waals radii.
    #[default]
    VanDerWaals,
    /// Surface traced by the center of a probe rolling over the atoms.
    SolventAccessible,
    /// Surface of the region the probe cannot enter. Measured here through the
    /// same probe-inflated balls as the solvent-accessible surface.
    SolventExcluded,
}

impl SurfaceType {
    /// Amount added to every base radius for this surface type.
    #[must_use]
    pub const fn inflation(self, probe_radius: f64) -> f64 {
        match self {
            Self::VanDerWaals => 0.0,
            Self::SolventAccessible | Self::SolventExcluded => probe_radius,
        }
    }
}

/// Surface configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceOptions {
    pub surface_type: SurfaceType,
    /// Probe radius in Ångströms (1.4 approximates a water molecule).
    pub probe_radius: f64,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            surface_type: SurfaceType::VanDerWaals,
            probe_radius: 1.4,
        }
    }
}

impl SurfaceOptions {
    #[must_use]
    pub const fn new(surface_type: SurfaceType, probe_radius: f64) -> Self {
        Self {
            surface_type,
            probe_radius,
        }
    }

    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidProbe`] if the probe radius is negative,
    /// NaN, or infinite.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        validate_probe(self.probe_radius)
    }
}

pub(crate) fn validate_probe(probe: f64) -> Result<(), SurfaceError> {
    if !probe.is_finite() || probe < 0.0 {
        return Err(SurfaceError::InvalidProbe(probe));
    }
    Ok(())
}

pub(crate) fn validate_balls(balls: &[Ball]) -> Result<(), SurfaceError> {
    for (i, ball) in balls.iter().enumerate() {
        if !ball.x.is_finite() || !ball.y.is_finite() || !ball.z.is_finite() {
            return Err(SurfaceError::InvalidBall {
                index: i,
                reason: "coordinates must be finite",
            });
        }
        if !ball.r.is_finite() || ball.r <= 0.0 {
            return Err(SurfaceError::InvalidBall {
                index: i,
                reason: "radius must be positive and finite",
            });
        }
    }
    Ok(())
}
