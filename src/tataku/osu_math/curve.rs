use crate::prelude::*;

/// the path shape tag from a slider line. only the first letter is significant
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CurveType {
    Bezier,
    Catmull,
    Perfect,
    Linear,
}
impl CurveType {
    pub fn from_tag(tag: &str) -> Result<Self, GeometryError> {
        match tag.trim().chars().next() {
            Some('B') => Ok(Self::Bezier),
            Some('C') => Ok(Self::Catmull),
            Some('P') => Ok(Self::Perfect),
            Some('L') => Ok(Self::Linear),
            _ => Err(GeometryError::UnknownCurveType(tag.trim().to_owned())),
        }
    }
}


/// split the control points into typed curve segments.
///
/// the anchor is the first vertex of the first segment. a point repeated twice in a row
/// ends the current segment and starts the next one from the same point.
/// the second value is true if a perfect circle had to fall back to a bezier
pub fn build_segments(anchor: Vector2, curve_type: CurveType, control_points: &[Vector2]) -> (Vec<CurveSegment>, bool) {
    // the whole stream, anchor included, must be exactly 3 points for a circle
    let whole_stream_is_arc = curve_type == CurveType::Perfect && control_points.len() + 1 == 3;

    let mut segments = Vec::new();
    let mut degenerate_arc = false;
    let mut close = |buffer: Vec<Vector2>| {
        if buffer.len() < 2 { return }

        let segment = if buffer.len() == 2 {
            CurveSegment::Linear { p1: buffer[0], p2: buffer[1] }
        } else if buffer.len() == 3 && whole_stream_is_arc {
            match CircularArc::through(buffer[0], buffer[1], buffer[2]) {
                Ok(arc) => CurveSegment::Circular { points: [buffer[0], buffer[1], buffer[2]], arc },
                Err(_) => {
                    degenerate_arc = true;
                    CurveSegment::Bezier { points: buffer }
                }
            }
        } else if is_monotone_line(&buffer) {
            // a straight bezier that never doubles back is just a line
            CurveSegment::Linear { p1: buffer[0], p2: buffer[buffer.len() - 1] }
        } else {
            CurveSegment::Bezier { points: buffer }
        };

        segments.push(segment);
    };

    let mut buffer = vec![anchor];
    for &point in control_points {
        if buffer.last() == Some(&point) {
            let boundary = point;
            close(std::mem::replace(&mut buffer, vec![boundary]));
            continue;
        }

        buffer.push(point);
    }
    close(buffer);

    (segments, degenerate_arc)
}


#[derive(Clone, Debug, Serialize)]
struct SampledSegment {
    segment: CurveSegment,
    /// cumulative length at evenly spaced parameters
    #[serde(skip)]
    lengths: Vec<f32>,
}
impl SampledSegment {
    fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or_default()
    }

    fn point_at_length(&self, length: f32) -> Vector2 {
        let samples = self.lengths.len().saturating_sub(1);
        if samples == 0 { return self.segment.start() }

        let i = self.lengths.partition_point(|l| *l < length);
        if i == 0 { return self.segment.start() }
        if i > samples { return self.segment.end() }

        let length_previous = self.lengths[i - 1];
        let length_next = self.lengths[i];
        let mut frac = 0.0;
        if length_next != length_previous {
            frac = (length - length_previous) / (length_next - length_previous);
        }

        self.segment.point_at(((i - 1) as f32 + frac) / samples as f32)
    }

    /// direction of travel at the very end of the segment
    fn end_direction(&self) -> Vector2 {
        let samples = self.lengths.len().saturating_sub(1).max(1);
        let before_end = self.segment.point_at((samples - 1) as f32 / samples as f32);
        (self.segment.end() - before_end).normalize()
    }
}


/// a slider path, ready to be queried by progress or distance
#[derive(Clone, Debug, Serialize)]
pub struct CompiledPath {
    pub curve_type: CurveType,
    pub repeat_count: u32,
    /// the authored length. the path ends exactly here
    pub pixel_length: f32,

    segments: Vec<SampledSegment>,
    /// distance along the path at the end of each segment
    #[serde(skip)]
    segment_ends: Vec<f32>,
    degenerate_arc: bool,
}
impl CompiledPath {
    pub fn compile(anchor: Vector2, curve_type: CurveType, control_points: &[Vector2], repeat_count: u32, pixel_length: f32) -> Result<Self, GeometryError> {
        Self::compile_with_detail(anchor, curve_type, control_points, repeat_count, pixel_length, SLIDER_DETAIL_LEVEL)
    }

    pub fn compile_with_detail(
        anchor: Vector2,
        curve_type: CurveType,
        control_points: &[Vector2],
        repeat_count: u32,
        pixel_length: f32,
        detail_level: u32,
    ) -> Result<Self, GeometryError> {
        if !pixel_length.is_finite() { return Err(GeometryError::InvalidLength(pixel_length)) }

        let (segments, degenerate_arc) = build_segments(anchor, curve_type, control_points);
        if segments.is_empty() { return Err(GeometryError::EmptyPath) }

        let mut total = 0.0;
        let mut segment_ends = Vec::with_capacity(segments.len());
        let segments = segments
            .into_iter()
            .map(|segment| {
                let lengths = segment.sample_lengths(detail_level);
                let sampled = SampledSegment { segment, lengths };
                total += sampled.length();
                segment_ends.push(total);
                sampled
            })
            .collect::<Vec<_>>();

        // no usable authored length, use the path as drawn
        let pixel_length = if pixel_length > 0.0 { pixel_length } else { total };

        #[cfg(feature="debug_sliders")]
        debug!("compiled {curve_type:?} slider: {} segments, sampled length {total}, authored length {pixel_length}", segments.len());

        Ok(Self {
            curve_type,
            repeat_count,
            pixel_length,
            segments,
            segment_ends,
            degenerate_arc,
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = &CurveSegment> {
        self.segments.iter().map(|s| &s.segment)
    }
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// true if a perfect circle in this path had to be treated as a bezier
    pub fn had_degenerate_arc(&self) -> bool {
        self.degenerate_arc
    }

    /// length of the path as drawn, before clipping to the authored length
    pub fn sampled_length(&self) -> f32 {
        self.segment_ends.last().copied().unwrap_or_default()
    }

    /// length of one span of the slider
    pub fn length(&self) -> f32 {
        self.pixel_length
    }

    pub fn start_point(&self) -> Vector2 {
        self.segments.first().map(|s| s.segment.start()).unwrap_or_default()
    }
    pub fn end_point(&self) -> Vector2 {
        self.point_at_length(self.pixel_length)
    }

    /// position `length` pixels along the path.
    /// past the drawn geometry the path continues straight along its final direction
    pub fn point_at_length(&self, length: f32) -> Vector2 {
        let length = length.clamp(0.0, self.pixel_length);
        let Some(last) = self.segments.last() else { return Vector2::ZERO };

        let sampled_length = self.sampled_length();
        if length >= sampled_length {
            return last.segment.end() + last.end_direction() * (length - sampled_length);
        }

        let i = self.segment_ends.partition_point(|end| *end < length).min(self.segments.len() - 1);
        let segment_start = if i == 0 { 0.0 } else { self.segment_ends[i - 1] };
        self.segments[i].point_at_length(length - segment_start)
    }

    /// position at `t` (0..=1) along one span of the slider
    pub fn point_at_progress(&self, t: f32) -> Vector2 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.point_at_length(t * self.pixel_length)
    }

    /// position at `progress` (0..=1) through the whole slider, repeats included.
    /// every other span runs backwards
    pub fn position_at_slider_progress(&self, progress: f32) -> Vector2 {
        let spans = self.repeat_count.max(1) as f32;
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };

        let span_pos = progress * spans;
        let span = span_pos.floor().min(spans - 1.0);
        let mut t = span_pos - span;
        if span as u32 % 2 == 1 { t = 1.0 - t }

        self.point_at_progress(t)
    }
}

/// compile a slider path without loading a whole beatmap (for editors and tooling)
pub fn compile(anchor: Vector2, shape_tag: &str, points: &[Vector2], repeat_count: u32, pixel_length: f32) -> Result<CompiledPath, GeometryError> {
    let curve_type = CurveType::from_tag(shape_tag)?;
    CompiledPath::compile(anchor, curve_type, points, repeat_count, pixel_length)
}


#[allow(unused)]
mod curve_tests {
    use crate::prelude::*;

    fn v(x: f32, y: f32) -> Vector2 { Vector2::new(x, y) }
    fn close(a: Vector2, b: Vector2) -> bool { a.distance(b) < 0.05 }

    #[test]
    fn duplicate_point_splits_segments() {
        let (segments, degenerate) = build_segments(
            v(0.0, 0.0),
            CurveType::Bezier,
            &[v(100.0, 0.0), v(200.0, 0.0), v(200.0, 0.0), v(300.0, 100.0)]
        );

        assert!(!degenerate);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], CurveSegment::Linear { p1: v(0.0, 0.0), p2: v(200.0, 0.0) });
        assert_eq!(segments[0].end(), v(200.0, 0.0));
        assert_eq!(segments[1].start(), v(200.0, 0.0));
        assert_eq!(segments[1], CurveSegment::Linear { p1: v(200.0, 0.0), p2: v(300.0, 100.0) });
    }

    #[test]
    fn curved_pieces_stay_bezier() {
        let (segments, _) = build_segments(
            v(0.0, 0.0),
            CurveType::Bezier,
            &[v(50.0, 100.0), v(100.0, 0.0), v(100.0, 0.0), v(150.0, -100.0), v(200.0, 0.0)]
        );

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], CurveSegment::Bezier { points: vec![v(0.0, 0.0), v(50.0, 100.0), v(100.0, 0.0)] });
        assert_eq!(segments[1], CurveSegment::Bezier { points: vec![v(100.0, 0.0), v(150.0, -100.0), v(200.0, 0.0)] });
    }

    #[test]
    fn repeated_anchor_makes_no_empty_segment() {
        let (segments, _) = build_segments(v(0.0, 0.0), CurveType::Bezier, &[v(0.0, 0.0), v(100.0, 0.0)]);
        assert_eq!(segments, vec![CurveSegment::Linear { p1: v(0.0, 0.0), p2: v(100.0, 0.0) }]);
    }

    #[test]
    fn perfect_circle_needs_the_whole_stream() {
        let (segments, _) = build_segments(v(0.0, 0.0), CurveType::Perfect, &[v(50.0, 50.0), v(100.0, 0.0)]);
        assert!(matches!(segments[..], [CurveSegment::Circular { .. }]));

        // same 3 points followed by more stream is not a circle
        let (segments, _) = build_segments(
            v(0.0, 0.0),
            CurveType::Perfect,
            &[v(50.0, 50.0), v(100.0, 0.0), v(100.0, 0.0), v(150.0, 0.0)]
        );
        assert!(matches!(segments[0], CurveSegment::Bezier { .. }));
        assert_eq!(segments.len(), 2);

        // a bezier tag never makes circles
        let (segments, _) = build_segments(v(0.0, 0.0), CurveType::Bezier, &[v(50.0, 50.0), v(100.0, 0.0)]);
        assert!(matches!(segments[0], CurveSegment::Bezier { .. }));
    }

    #[test]
    fn degenerate_perfect_circle_falls_back_to_bezier() {
        let (segments, degenerate) = build_segments(v(0.0, 0.0), CurveType::Perfect, &[v(50.0, 50.0), v(100.0, 100.0)]);
        assert!(degenerate);
        assert_eq!(segments, vec![CurveSegment::Bezier { points: vec![v(0.0, 0.0), v(50.0, 50.0), v(100.0, 100.0)] }]);

        let path = CompiledPath::compile(v(0.0, 0.0), CurveType::Perfect, &[v(0.0, 50.0), v(100.0, 0.0)], 1, 100.0).unwrap();
        assert!(path.had_degenerate_arc());
    }

    #[test]
    fn perfect_circle_clips_to_authored_length() {
        let path = compile(v(0.0, 0.0), "P", &[v(50.0, 50.0), v(100.0, 0.0)], 1, 150.0).unwrap();
        assert_eq!(path.segment_count(), 1);
        assert!(matches!(path.segments().next(), Some(CurveSegment::Circular { .. })));
        assert_eq!(path.length(), 150.0);
        assert!(path.sampled_length() > 150.0);

        // 150px along a radius 50 circle starting at angle pi, heading through (50, 50)
        let angle = PI - 150.0 / 50.0;
        let expected = v(50.0 + 50.0 * angle.cos(), 50.0 * angle.sin());
        let end = path.point_at_progress(1.0);
        assert!(end.distance(expected) < 0.1, "{end} vs {expected}");
        assert_eq!(path.end_point(), end);

        // walking the clipped path in small steps adds up to the authored length
        let steps = 1000;
        let mut walked = 0.0;
        let mut last = path.point_at_progress(0.0);
        for i in 1..=steps {
            let p = path.point_at_progress(i as f32 / steps as f32);
            walked += last.distance(p);
            last = p;
        }
        assert!((walked - 150.0).abs() < 0.5, "{walked}");
    }

    #[test]
    fn short_geometry_is_extended() {
        let path = CompiledPath::compile(v(0.0, 0.0), CurveType::Linear, &[v(100.0, 0.0)], 1, 150.0).unwrap();
        assert_eq!(path.sampled_length(), 100.0);
        assert!(close(path.point_at_progress(1.0), v(150.0, 0.0)));
        assert!(close(path.point_at_progress(0.5), v(75.0, 0.0)));
    }

    #[test]
    fn progress_crosses_segments() {
        // two lines of 100px each, at right angles
        let path = CompiledPath::compile(v(0.0, 0.0), CurveType::Linear, &[v(100.0, 0.0), v(100.0, 0.0), v(100.0, 100.0)], 1, 200.0).unwrap();
        assert_eq!(path.segment_count(), 2);
        assert!(close(path.point_at_progress(0.0), v(0.0, 0.0)));
        assert!(close(path.point_at_progress(0.25), v(50.0, 0.0)));
        assert!(close(path.point_at_progress(0.5), v(100.0, 0.0)));
        assert!(close(path.point_at_progress(0.75), v(100.0, 50.0)));
        assert!(close(path.point_at_progress(1.0), v(100.0, 100.0)));

        // out of range progress is clamped
        assert!(close(path.point_at_progress(-1.0), v(0.0, 0.0)));
        assert!(close(path.point_at_progress(2.0), v(100.0, 100.0)));
        assert!(close(path.point_at_progress(f32::NAN), v(0.0, 0.0)));
    }

    #[test]
    fn repeats_bounce() {
        let path = CompiledPath::compile(v(0.0, 0.0), CurveType::Linear, &[v(100.0, 0.0)], 3, 100.0).unwrap();
        assert!(close(path.position_at_slider_progress(0.0), v(0.0, 0.0)));
        assert!(close(path.position_at_slider_progress(1.0 / 3.0), v(100.0, 0.0)));
        assert!(close(path.position_at_slider_progress(0.5), v(50.0, 0.0)));
        assert!(close(path.position_at_slider_progress(2.0 / 3.0), v(0.0, 0.0)));
        assert!(close(path.position_at_slider_progress(1.0), v(100.0, 0.0)));
    }

    #[test]
    fn missing_length_uses_drawn_path() {
        let path = CompiledPath::compile(v(0.0, 0.0), CurveType::Linear, &[v(30.0, 40.0)], 1, 0.0).unwrap();
        assert_eq!(path.length(), 50.0);
        assert!(close(path.end_point(), v(30.0, 40.0)));
    }

    #[test]
    fn compile_errors() {
        assert!(matches!(
            CompiledPath::compile(v(0.0, 0.0), CurveType::Bezier, &[], 1, 100.0),
            Err(GeometryError::EmptyPath)
        ));
        assert!(matches!(
            CompiledPath::compile(v(0.0, 0.0), CurveType::Bezier, &[v(0.0, 0.0)], 1, 100.0),
            Err(GeometryError::EmptyPath)
        ));
        assert!(matches!(
            CompiledPath::compile(v(0.0, 0.0), CurveType::Bezier, &[v(10.0, 0.0)], 1, f32::NAN),
            Err(GeometryError::InvalidLength(_))
        ));
        assert_eq!(
            compile(v(0.0, 0.0), "X", &[v(10.0, 0.0)], 1, 10.0).err(),
            Some(GeometryError::UnknownCurveType("X".to_owned()))
        );
        assert_eq!(CurveType::from_tag(""), Err(GeometryError::UnknownCurveType(String::new())));
    }

    #[test]
    fn bezier_path_is_measured_by_arc_length() {
        // symmetric curve, so half the length is at the apex
        let path = CompiledPath::compile(v(0.0, 0.0), CurveType::Bezier, &[v(50.0, 100.0), v(100.0, 0.0)], 1, 0.0).unwrap();
        let mid = path.point_at_progress(0.5);
        assert!(close(mid, v(50.0, 50.0)), "{mid}");
    }
}
