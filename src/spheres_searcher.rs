use std::collections::HashMap;

use crate::geometry::sphere_intersects_sphere;
use crate::types::Sphere;

/// Grid coordinates for spatial indexing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
struct GridPoint {
    x: i64,
    y: i64,
    z: i64,
}

impl GridPoint {
    #[allow(clippy::cast_possible_truncation)]
    fn from_sphere(s: &Sphere, box_size: f64) -> Self {
        // saturating casts keep absurd coordinates in the outermost cells
        Self {
            x: (s.center.x / box_size).floor() as i64,
            y: (s.center.y / box_size).floor() as i64,
            z: (s.center.z / box_size).floor() as i64,
        }
    }

    const fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

/// Grid-based spatial index for finding overlapping spheres
pub struct SpheresSearcher<'a> {
    spheres: &'a [Sphere],
    box_size: f64,
    /// Occupied cells only, so memory follows the sphere count
    boxes: HashMap<GridPoint, Vec<usize>>,
}

impl<'a> SpheresSearcher<'a> {
    pub fn new(spheres: &'a [Sphere]) -> Self {
        // Box size = max(2*r + margin): overlapping spheres sit in adjacent cells
        let box_size = spheres
            .iter()
            .map(|s| s.r.mul_add(2.0, 0.25))
            .fold(1.0, f64::max);

        let mut boxes: HashMap<GridPoint, Vec<usize>> = HashMap::new();
        for (i, sphere) in spheres.iter().enumerate() {
            boxes
                .entry(GridPoint::from_sphere(sphere, box_size))
                .or_default()
                .push(i);
        }

        Self {
            spheres,
            box_size,
            boxes,
        }
    }

    /// Indices of all spheres overlapping the sphere at `central_id`, ascending.
    pub fn find_colliding_ids(&self, central_id: usize) -> Vec<usize> {
        let mut colliding_ids = Vec::new();

        let Some(central_sphere) = self.spheres.get(central_id) else {
            return colliding_ids;
        };
        let gp = GridPoint::from_sphere(central_sphere, self.box_size);

        // Search 27-cell neighborhood (3x3x3) to catch all potential overlaps
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(ids) = self.boxes.get(&gp.offset(dx, dy, dz)) else {
                        continue;
                    };
                    for &id in ids {
                        if id != central_id
                            && sphere_intersects_sphere(central_sphere, &self.spheres[id])
                        {
                            colliding_ids.push(id);
                        }
                    }
                }
            }
        }

        // saturated cells can be visited twice
        colliding_ids.sort_unstable();
        colliding_ids.dedup();
        colliding_ids
    }
}
