use crate::prelude::*;

/// the implicit circle of a perfect-circle segment
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct CircularArc {
    pub center: Vector2,
    pub radius: f32,
    pub t_initial: f32,
    pub t_final: f32,
}
impl CircularArc {
    pub fn through(a:Vector2, b:Vector2, c:Vector2) -> Result<Self, GeometryError> {
        let (center, radius, t_initial, t_final) = circle_through_points(a, b, c).ok_or(GeometryError::DegenerateArc)?;
        Ok(Self { center, radius, t_initial, t_final })
    }

    pub fn point_at(&self, t: f32) -> Vector2 {
        let angle = self.t_initial + (self.t_final - self.t_initial) * t;
        circle_point(self.center, self.radius, angle)
    }
}


/// one typed piece of a slider path
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum CurveSegment {
    Linear {
        p1: Vector2,
        p2: Vector2,
    },

    /// arc from `points[0]` through `points[1]` to `points[2]`
    Circular {
        points: [Vector2; 3],
        arc: CircularArc,
    },

    Bezier {
        points: Vec<Vector2>,
    },
}
impl CurveSegment {
    pub fn start(&self) -> Vector2 {
        match self {
            Self::Linear { p1, .. } => *p1,
            Self::Circular { points, .. } => points[0],
            Self::Bezier { points } => points.first().copied().unwrap_or_default(),
        }
    }

    pub fn end(&self) -> Vector2 {
        match self {
            Self::Linear { p2, .. } => *p2,
            Self::Circular { points, .. } => points[2],
            Self::Bezier { points } => points.last().copied().unwrap_or_default(),
        }
    }

    /// position at the segment's own parameter `t` (0..=1).
    /// only linear and circular segments are uniform in arc length
    pub fn point_at(&self, t: f32) -> Vector2 {
        match self {
            Self::Linear { p1, p2 } => Vector2::lerp(*p1, *p2, t),
            Self::Circular { arc, .. } => arc.point_at(t),
            Self::Bezier { points } => bezier_point(points, t),
        }
    }

    /// how many arc-length samples this segment wants
    pub fn sample_count(&self, detail_level: u32) -> u32 {
        let detail_level = detail_level.clamp(1, MAX_SLIDER_DETAIL_LEVEL);
        match self {
            Self::Linear { .. } => 1,
            Self::Circular { .. } => detail_level,
            Self::Bezier { points } => detail_level.saturating_mul(points.len().try_into().unwrap_or(u32::MAX)),
        }
    }

    /// cumulative length at each of `sample_count + 1` evenly spaced parameters, starting at 0
    pub fn sample_lengths(&self, detail_level: u32) -> Vec<f32> {
        let count = self.sample_count(detail_level);
        let mut lengths = Vec::with_capacity(count as usize + 1);
        lengths.push(0.0);

        let mut total = 0.0;
        let mut last = self.start();
        for i in 1..=count {
            let p = self.point_at(i as f32 / count as f32);
            let mut add = last.distance(p);
            if add.is_nan() { add = 0.0 }
            total += add;
            lengths.push(total);
            last = p;
        }

        lengths
    }
}


#[test]
fn segment_endpoints() {
    let linear = CurveSegment::Linear { p1: Vector2::new(0.0, 0.0), p2: Vector2::new(10.0, 0.0) };
    assert_eq!(linear.point_at(0.5), Vector2::new(5.0, 0.0));
    assert_eq!(linear.sample_lengths(50), vec![0.0, 10.0]);

    let points = [Vector2::new(0.0, 0.0), Vector2::new(50.0, 50.0), Vector2::new(100.0, 0.0)];
    let circular = CurveSegment::Circular { points, arc: CircularArc::through(points[0], points[1], points[2]).unwrap() };
    assert_eq!(circular.start(), points[0]);
    assert_eq!(circular.end(), points[2]);

    let lengths = circular.sample_lengths(50);
    assert_eq!(lengths.len(), 51);
    // chords slightly undershoot the true arc length of 50pi
    let total = *lengths.last().unwrap();
    assert!(total < 50.0 * PI && total > 50.0 * PI - 0.1, "{total}");
}

#[test]
fn sample_count_saturates() {
    let bezier = CurveSegment::Bezier { points: vec![Vector2::ZERO, Vector2::new(10.0, 0.0), Vector2::new(20.0, 5.0)] };
    assert_eq!(bezier.sample_count(50), 150);
    assert_eq!(bezier.sample_count(0), 3);
    assert_eq!(bezier.sample_count(u32::MAX), MAX_SLIDER_DETAIL_LEVEL * 3);

    let circular_points = [Vector2::ZERO, Vector2::new(50.0, 50.0), Vector2::new(100.0, 0.0)];
    let circular = CurveSegment::Circular { points: circular_points, arc: CircularArc::through(circular_points[0], circular_points[1], circular_points[2]).unwrap() };
    assert_eq!(circular.sample_count(u32::MAX), MAX_SLIDER_DETAIL_LEVEL);
}
