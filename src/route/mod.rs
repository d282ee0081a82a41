//! The authored route the car drives along.
//!
//! A route is a parametric 3D curve addressed by normalised progress in
//! `[0, 1]`. Progress is distance-based: equal progress steps cover equal
//! stretches of road regardless of how the control points are spaced.

use bevy::prelude::*;

pub mod waypoints;

/// Path provider consumed by the motion model and the scene dressing.
pub trait RoutePath {
    /// World position at normalised progress `t`.
    fn point_at(&self, t: f32) -> Vec3;
    /// Unit-ish direction of travel at normalised progress `t`.
    fn tangent_at(&self, t: f32) -> Vec3;
}

/// Number of samples in the arc-length table.
const LENGTH_DIVISIONS: usize = 200;

/// Step used for finite-difference tangents.
const TANGENT_DELTA: f32 = 0.0001;

/// Centripetal Catmull-Rom spline through a list of control points.
///
/// Knot spacing grows with the square root of the distance between control
/// points, so unevenly spaced points neither overshoot nor loop. End segments
/// use mirrored phantom points so the curve passes through the first and last
/// control points.
#[derive(Clone, Debug)]
pub struct CatmullRomRoute {
    points: Vec<Vec3>,
    /// Cumulative arc length at `LENGTH_DIVISIONS + 1` evenly spaced curve parameters.
    lengths: Vec<f32>,
}

impl CatmullRomRoute {
    /// Builds a route; `None` if fewer than two control points are given.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let mut route = Self {
            points,
            lengths: Vec::with_capacity(LENGTH_DIVISIONS + 1),
        };

        let mut total = 0.0;
        let mut last = route.point(0.0);
        route.lengths.push(0.0);
        for i in 1..=LENGTH_DIVISIONS {
            let current = route.point(i as f32 / LENGTH_DIVISIONS as f32);
            total += current.distance(last);
            route.lengths.push(total);
            last = current;
        }

        Some(route)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total arc length in world units.
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at raw curve parameter `t` (not arc-length corrected).
    fn point(&self, t: f32) -> Vec3 {
        let segments = self.points.len() - 1;
        let scaled = t.clamp(0.0, 1.0) * segments as f32;
        let mut index = scaled.floor() as usize;
        let mut weight = scaled - index as f32;
        if index >= segments {
            index = segments - 1;
            weight = 1.0;
        }

        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        let p0 = if index == 0 {
            p1 * 2.0 - p2
        } else {
            self.points[index - 1]
        };
        let p3 = if index + 2 < self.points.len() {
            self.points[index + 2]
        } else {
            p2 * 2.0 - p1
        };

        centripetal(p0, p1, p2, p3, weight)
    }

    /// Maps normalised arc length `u` to the curve parameter covering it.
    fn parameter_for_distance(&self, u: f32) -> f32 {
        let total = self.length();
        if total <= 0.0 {
            return u.clamp(0.0, 1.0);
        }

        let target = u.clamp(0.0, 1.0) * total;
        let upper = self.lengths.partition_point(|&len| len < target);
        if upper == 0 {
            return 0.0;
        }
        if upper >= self.lengths.len() {
            return 1.0;
        }

        let lower = upper - 1;
        let before = self.lengths[lower];
        let segment = self.lengths[upper] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };

        (lower as f32 + fraction) / LENGTH_DIVISIONS as f32
    }
}

impl RoutePath for CatmullRomRoute {
    fn point_at(&self, t: f32) -> Vec3 {
        self.point(self.parameter_for_distance(t))
    }

    fn tangent_at(&self, t: f32) -> Vec3 {
        let param = self.parameter_for_distance(t);
        let a = self.point((param - TANGENT_DELTA).max(0.0));
        let b = self.point((param + TANGENT_DELTA).min(1.0));
        let dir = (b - a).normalize_or_zero();
        if dir == Vec3::ZERO {
            Vec3::Z
        } else {
            dir
        }
    }
}

/// Knot intervals shorter than this are treated as coincident points.
const MIN_KNOT_INTERVAL: f32 = 1e-4;

/// Segment `p1..p2` of a centripetal (alpha 0.5) Catmull-Rom curve.
fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);
    if dt1 < MIN_KNOT_INTERVAL {
        dt1 = 1.0;
    }
    if dt0 < MIN_KNOT_INTERVAL {
        dt0 = dt1;
    }
    if dt2 < MIN_KNOT_INTERVAL {
        dt2 = dt1;
    }

    // Hermite tangents, rescaled to the unit parameter of this segment.
    let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    let t2 = t * t;
    let t3 = t2 * t;

    (p1 * 2.0 - p2 * 2.0 + m1 + m2) * t3
        + (p1 * -3.0 + p2 * 3.0 - m1 * 2.0 - m2) * t2
        + m1 * t
        + p1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio_route() -> CatmullRomRoute {
        CatmullRomRoute::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(40.0, 0.0, 600.0),
            Vec3::new(-40.0, 0.0, 1200.0),
            Vec3::new(20.0, 0.0, 1800.0),
            Vec3::new(0.0, 0.0, 2500.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_routes() {
        assert!(CatmullRomRoute::new(vec![]).is_none());
        assert!(CatmullRomRoute::new(vec![Vec3::ONE]).is_none());
    }

    #[test]
    fn passes_through_end_points() {
        let route = portfolio_route();
        assert!(route.point_at(0.0).distance(Vec3::ZERO) < 1e-3);
        assert!(route.point_at(1.0).distance(Vec3::new(0.0, 0.0, 2500.0)) < 1e-2);
    }

    #[test]
    fn progress_is_distance_based() {
        let route = portfolio_route();
        let quarter = route.length() / 4.0;
        let steps: Vec<Vec3> = (0..=4).map(|i| route.point_at(i as f32 / 4.0)).collect();
        for pair in steps.windows(2) {
            // Chord is never longer than the arc it spans.
            let chord = pair[0].distance(pair[1]);
            assert!(chord <= quarter + 1.0);
            assert!(chord > quarter * 0.95);
        }
    }

    #[test]
    fn short_segment_does_not_overshoot() {
        // A long run into a one-unit hop: a uniform spline bulges well past
        // the last point here.
        let route = CatmullRomRoute::new(vec![Vec3::ZERO, Vec3::X * 100.0, Vec3::X * 101.0]).unwrap();
        let mut last = f32::NEG_INFINITY;
        for i in 0..=400 {
            let x = route.point(i as f32 / 400.0).x;
            assert!(x <= 101.0 + 1e-3);
            assert!(x >= last - 1e-3);
            last = x;
        }
    }

    #[test]
    fn even_spacing_matches_uniform_tangents() {
        let (p0, p1, p2, p3) = (Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0);
        let mid = centripetal(p0, p1, p2, p3, 0.5);
        assert!(mid.distance(Vec3::X * 1.5) < 1e-5);
    }

    #[test]
    fn tangent_points_down_the_road() {
        let route = portfolio_route();
        for t in [0.0, 0.3, 0.7, 1.0] {
            let tangent = route.tangent_at(t);
            assert!((tangent.length() - 1.0).abs() < 1e-3);
            assert!(tangent.z > 0.9);
        }
    }
}
