#![allow(dead_code)]

use std::f64::consts::PI;

use molecular_surface::{Ball, Sphere};

/// Macro for approximate equality with relative tolerance and context
macro_rules! assert_close {
    ($actual:expr, $expected:expr, $rel:expr, $($arg:tt)*) => {
        let actual: f64 = $actual;
        let expected: f64 = $expected;
        let diff = (actual - expected).abs();
        assert!(
            diff <= $rel * expected.abs(),
            "{}: expected {}, got {} (rel diff={})",
            format!($($arg)*),
            expected,
            actual,
            diff / expected.abs()
        );
    };
}

pub fn ball_area(r: f64) -> f64 {
    4.0 * PI * r * r
}

pub fn ball_volume(r: f64) -> f64 {
    4.0 / 3.0 * PI * r * r * r
}

/// Lens volume of two balls with radii `a`, `b` at center distance `d`.
pub fn lens_volume(a: f64, b: f64, d: f64) -> f64 {
    PI * (a + b - d).powi(2) * (d * d + 2.0 * d * b - 3.0 * b * b + 2.0 * d * a + 6.0 * b * a
        - 3.0 * a * a)
        / (12.0 * d)
}

/// Area of the boundary of a lens: the two caps cut by the radical plane.
pub fn lens_area(a: f64, b: f64, d: f64) -> f64 {
    let x = (d * d + a * a - b * b) / (2.0 * d);
    let ha = a - x;
    let hb = b - (d - x);
    2.0 * PI * (a * ha + b * hb)
}

/// Boundary area of a union of spheres, estimated from `samples` Fibonacci
/// lattice points per sphere.
#[allow(clippy::cast_precision_loss)]
pub fn sampled_area(spheres: &[Sphere], samples: usize) -> f64 {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    let n = samples as f64;

    spheres
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let exposed = (0..samples)
                .filter(|&k| {
                    let z = 1.0 - (2.0 * k as f64 + 1.0) / n;
                    let rho = (1.0 - z * z).sqrt();
                    let phi = k as f64 * golden_angle;
                    let x = s.center.x + s.r * rho * phi.cos();
                    let y = s.center.y + s.r * rho * phi.sin();
                    let z = s.center.z + s.r * z;

                    spheres.iter().enumerate().all(|(j, o)| {
                        j == i
                            || (x - o.center.x).powi(2)
                                + (y - o.center.y).powi(2)
                                + (z - o.center.z).powi(2)
                                >= o.r * o.r
                    })
                })
                .count();
            4.0 * PI * s.r * s.r * exposed as f64 / n
        })
        .sum()
}

/// Volume of a union of spheres by midpoint integration on a cubic grid.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn sampled_volume(spheres: &[Sphere], step: f64) -> f64 {
    let lo = |f: fn(&Sphere) -> f64| spheres.iter().map(|s| f(s) - s.r).fold(f64::MAX, f64::min);
    let hi = |f: fn(&Sphere) -> f64| spheres.iter().map(|s| f(s) + s.r).fold(f64::MIN, f64::max);

    let min = [lo(|s| s.center.x), lo(|s| s.center.y), lo(|s| s.center.z)];
    let max = [hi(|s| s.center.x), hi(|s| s.center.y), hi(|s| s.center.z)];
    let cells: Vec<usize> = (0..3)
        .map(|d| ((max[d] - min[d]) / step).ceil() as usize)
        .collect();

    let mut inside = 0usize;
    for a in 0..cells[0] {
        let x = (a as f64 + 0.5).mul_add(step, min[0]);
        for b in 0..cells[1] {
            let y = (b as f64 + 0.5).mul_add(step, min[1]);
            for c in 0..cells[2] {
                let z = (c as f64 + 0.5).mul_add(step, min[2]);
                let covered = spheres.iter().any(|s| {
                    (x - s.center.x).powi(2) + (y - s.center.y).powi(2) + (z - s.center.z).powi(2)
                        < s.r * s.r
                });
                if covered {
                    inside += 1;
                }
            }
        }
    }

    inside as f64 * step.powi(3)
}

pub fn spheres_of(balls: &[Ball], inflation: f64) -> Vec<Sphere> {
    balls.iter().map(|b| Sphere::from_ball(b, inflation)).collect()
}

/// Four mutually overlapping balls forming one tetrahedron of the complex.
pub fn tetrahedron_cluster() -> Vec<Ball> {
    vec![
        Ball::new(0.0, 0.0, 0.0, 1.6),
        Ball::new(2.1, 0.1, 0.0, 1.5),
        Ball::new(0.9, 1.9, 0.1, 1.7),
        Ball::new(1.0, 0.6, 1.8, 1.4),
    ]
}

/// Equal balls on the corners of a cube; all eight share one orthocenter.
pub fn cube_corners(side: f64, r: f64) -> Vec<Ball> {
    let mut balls = Vec::with_capacity(8);
    for x in [0.0, side] {
        for y in [0.0, side] {
            for z in [0.0, side] {
                balls.push(Ball::new(x, y, z, r));
            }
        }
    }
    balls
}

/// Six balls on a planar hexagon, like the carbons of a benzene ring.
pub fn hexagonal_ring(radius: f64, r: f64) -> Vec<Ball> {
    (0..6)
        .map(|k| {
            let angle = f64::from(k) * PI / 3.0;
            Ball::new(radius * angle.cos(), radius * angle.sin(), 0.0, r)
        })
        .collect()
}

/// Deterministic packed cluster of `n` balls (a 3D lattice walk with jitter).
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn lattice_cluster(n: usize, spacing: f64) -> Vec<Ball> {
    let side = (n as f64).cbrt().ceil() as usize;
    (0..n)
        .map(|i| {
            let (x, y, z) = (i % side, (i / side) % side, i / (side * side));
            let jitter = |k: usize| ((i * 7919 + k * 104_729) % 1000) as f64 / 1000.0 - 0.5;
            Ball::new(
                (jitter(1) * 0.4 + x as f64) * spacing,
                (jitter(2) * 0.4 + y as f64) * spacing,
                (jitter(3) * 0.4 + z as f64) * spacing,
                1.5 + 0.3 * jitter(4),
            )
        })
        .collect()
}
