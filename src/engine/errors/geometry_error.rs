
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryError {
    /// the control points did not produce a single curve segment
    EmptyPath,
    /// a perfect-circle arc whose points are collinear, or whose chord is vertical
    DegenerateArc,
    /// the authored pixel length is not a finite number
    InvalidLength(f32),
    /// the path-shape tag is not one of `B`, `C`, `P` or `L`
    UnknownCurveType(String),
}
impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "slider path has no segments"),
            Self::DegenerateArc => write!(f, "perfect circle arc is degenerate"),
            Self::InvalidLength(l) => write!(f, "invalid slider length {l}"),
            Self::UnknownCurveType(tag) => write!(f, "unknown curve type '{tag}'"),
        }
    }
}
impl std::error::Error for GeometryError {}
