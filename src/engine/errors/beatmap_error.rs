
/// fatal parse outcomes. anything recoverable is reported as a [`Diagnostic`](crate::prelude::Diagnostic) instead
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BeatmapError {
    /// the input had no non-whitespace lines
    EmptyInput,
    /// the whole file was read but no hit object survived decoding
    NoHitObjects,
}
impl std::fmt::Display for BeatmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "beatmap input is empty"),
            Self::NoHitObjects => write!(f, "beatmap has no hit objects"),
        }
    }
}
impl std::error::Error for BeatmapError {}
