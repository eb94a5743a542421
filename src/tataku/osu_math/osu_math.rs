use crate::prelude::*;

// this is essentially osu's math helper
pub const SLIDER_DETAIL_LEVEL:u32 = 50;
pub const MAX_SLIDER_DETAIL_LEVEL:u32 = 1000;
pub const TWO_PI:f32 = PI * 2.0;

/// point on the bezier curve defined by `points` at `t`, via the bernstein form.
/// the binomial coefficient is built up incrementally, and the whole basis is kept as a log
/// so neither `C(n, i)` nor the powers of `t` leave f64 range on long control point lists
pub fn bezier_point(points: &[Vector2], t: f32) -> Vector2 {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else { return Vector2::ZERO };
    if t <= 0.0 { return first }
    if t >= 1.0 { return last }

    let n = points.len() - 1;
    let t = t as f64;
    let ln_t = t.ln();
    let ln_one_minus_t = (1.0 - t).ln();

    let mut ln_coefficient = 0.0f64;
    let mut x = 0.0f64;
    let mut y = 0.0f64;

    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            ln_coefficient += ((n - i + 1) as f64 / i as f64).ln();
        }

        let basis = (ln_coefficient + i as f64 * ln_t + (n - i) as f64 * ln_one_minus_t).exp();
        x += basis * p.x as f64;
        y += basis * p.y as f64;
    }

    Vector2::new(x as f32, y as f32)
}

/// true if every point lies on the line from the first to the last point,
/// and they only ever move forward along it
pub fn is_monotone_line(points: &[Vector2]) -> bool {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else { return false };
    let dir = last - first;
    if dir == Vector2::ZERO { return false }

    let mut last_projection = f32::NEG_INFINITY;
    for &p in points {
        let offset = p - first;
        if dir.cross(offset) != 0.0 { return false }

        let projection = dir.dot(offset);
        if projection < last_projection { return false }
        last_projection = projection;
    }

    true
}

pub fn circle_t_at(p:Vector2, c:Vector2) -> f32 {
    (p.y - c.y).atan2(p.x - c.x)
}

/// center of the circle through 3 points, from the slopes of the chords a-b and b-c.
/// returns None if either chord is vertical or the points are collinear
pub fn circle_center(a:Vector2, b:Vector2, c:Vector2) -> Option<Vector2> {
    let (x1, y1) = (a.x as f64, a.y as f64);
    let (x2, y2) = (b.x as f64, b.y as f64);
    let (x3, y3) = (c.x as f64, c.y as f64);

    if x2 == x1 || x3 == x2 { return None }
    let s1 = (y2 - y1) / (x2 - x1);
    let s2 = (y3 - y2) / (x3 - x2);
    if s1 == s2 { return None }

    let cx = (s1 * s2 * (y1 - y3) + s2 * (x1 + x2) - s1 * (x2 + x3)) / (2.0 * (s2 - s1));

    // the perpendicular bisector of a horizontal chord is vertical, use the other chord's instead
    let cy = if s1 != 0.0 {
        -(cx - (x1 + x2) / 2.0) / s1 + (y1 + y2) / 2.0
    } else {
        -(cx - (x2 + x3) / 2.0) / s2 + (y2 + y3) / 2.0
    };

    let center = Vector2::new(cx as f32, cy as f32);
    center.is_finite().then_some(center)
}

/// Circle through 3 points.
/// returns (center, radius, t_initial, t_final), where the arc goes from t_initial to t_final through b
pub fn circle_through_points(a:Vector2, b:Vector2, c:Vector2) -> Option<(Vector2, f32, f32, f32)> {
    let center = circle_center(a, b, c)?;
    let radius = center.distance(a);

    let t_initial = circle_t_at(a, center);
    let mut t_mid = circle_t_at(b, center);
    let mut t_final = circle_t_at(c, center);

    while t_mid < t_initial {t_mid += TWO_PI}
    while t_final < t_initial {t_final += TWO_PI}
    if t_mid > t_final {t_final -= TWO_PI}

    Some((center, radius, t_initial, t_final))
}

pub fn circle_point(center:Vector2, radius:f32, a:f32) -> Vector2 {
    Vector2::from_angle(a) * radius + center
}


#[allow(unused)]
mod osu_math_tests {
    use crate::prelude::*;

    fn close(a: Vector2, b: Vector2) -> bool {
        a.distance(b) < 0.001
    }

    #[test]
    fn bezier_endpoints_and_midpoint() {
        let points = [Vector2::new(0.0, 0.0), Vector2::new(50.0, 100.0), Vector2::new(100.0, 0.0)];
        assert_eq!(bezier_point(&points, 0.0), points[0]);
        assert_eq!(bezier_point(&points, 1.0), points[2]);
        assert!(close(bezier_point(&points, 0.5), Vector2::new(50.0, 50.0)));
    }

    #[test]
    fn bezier_long_control_list_stays_finite() {
        // C(200, 100) overflows u64 and f32
        let points = (0..=200).map(|i| Vector2::new(i as f32, 0.0)).collect::<Vec<_>>();
        let mid = bezier_point(&points, 0.5);
        assert!(mid.is_finite());
        assert!((mid.x - 100.0).abs() < 0.01);

        // C(1200, 600) overflows f64 and 0.5^1200 underflows it
        let points = (0..=1200).map(|i| Vector2::new(i as f32, 0.0)).collect::<Vec<_>>();
        let mid = bezier_point(&points, 0.5);
        assert!(mid.is_finite());
        assert!((mid.x - 600.0).abs() < 0.1);
        assert_eq!(bezier_point(&points, 0.0), points[0]);
        assert_eq!(bezier_point(&points, 1.0), points[1200]);
    }

    #[test]
    fn long_zigzag_bezier_has_a_length() {
        let points = (1..=1200).map(|i| Vector2::new(i as f32, if i % 2 == 0 { 0.0 } else { 40.0 })).collect::<Vec<_>>();
        let path = CompiledPath::compile_with_detail(Vector2::ZERO, CurveType::Bezier, &points, 1, 0.0, 2).unwrap();

        assert!(path.sampled_length().is_finite());
        assert!(path.sampled_length() > 0.0);
        assert!(path.point_at_progress(0.5).is_finite());
    }

    #[test]
    fn circle_center_from_slopes() {
        let center = circle_center(Vector2::new(0.0, 0.0), Vector2::new(50.0, 50.0), Vector2::new(100.0, 0.0)).unwrap();
        assert!(close(center, Vector2::new(50.0, 0.0)));

        // first chord horizontal
        let center = circle_center(Vector2::new(0.0, 0.0), Vector2::new(100.0, 0.0), Vector2::new(150.0, 50.0)).unwrap();
        assert!(close(center, Vector2::new(50.0, 100.0)));
    }

    #[test]
    fn degenerate_circles() {
        // collinear
        assert_eq!(circle_center(Vector2::new(0.0, 0.0), Vector2::new(50.0, 50.0), Vector2::new(100.0, 100.0)), None);
        // vertical chord
        assert_eq!(circle_center(Vector2::new(0.0, 0.0), Vector2::new(0.0, 50.0), Vector2::new(100.0, 0.0)), None);
    }

    #[test]
    fn arc_passes_through_middle_point() {
        let (a, b, c) = (Vector2::new(0.0, 0.0), Vector2::new(50.0, 50.0), Vector2::new(100.0, 0.0));
        let (center, radius, t_initial, t_final) = circle_through_points(a, b, c).unwrap();
        assert!((radius - 50.0).abs() < 0.001);
        assert!(close(circle_point(center, radius, t_initial), a));
        assert!(close(circle_point(center, radius, t_final), c));
        assert!(close(circle_point(center, radius, (t_initial + t_final) / 2.0), b));
    }

    #[test]
    fn monotone_lines() {
        let forward = [Vector2::new(0.0, 0.0), Vector2::new(100.0, 0.0), Vector2::new(200.0, 0.0)];
        let backtrack = [Vector2::new(0.0, 0.0), Vector2::new(200.0, 0.0), Vector2::new(100.0, 0.0)];
        let bent = [Vector2::new(0.0, 0.0), Vector2::new(100.0, 10.0), Vector2::new(200.0, 0.0)];
        assert!(is_monotone_line(&forward));
        assert!(!is_monotone_line(&backtrack));
        assert!(!is_monotone_line(&bent));
    }
}
