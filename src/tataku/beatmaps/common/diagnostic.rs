use crate::prelude::*;

/// something wrong with the input that didnt stop the beatmap from loading
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Diagnostic {
    /// a line that couldnt be decoded. `line` is 1-based
    MalformedLine {
        line: usize,
        section: BeatmapSection,
        text: String,
        reason: String,
    },
    /// hit object with a type code that isnt a circle, slider or spinner
    UnknownHitObjectType {
        line: usize,
        type_code: u32,
    },
    /// perfect-circle slider whose points dont make a circle, it was loaded as a bezier
    DegenerateArc {
        line: usize,
    },
    UnsupportedFormatVersion {
        found: u8,
        supported: u8,
    },
}
impl Diagnostic {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedLine { line, .. }
            | Self::UnknownHitObjectType { line, .. }
            | Self::DegenerateArc { line } => Some(*line),
            Self::UnsupportedFormatVersion { .. } => None,
        }
    }
}
impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine { line, section, text, reason } => write!(f, "line {line} [{section:?}]: {reason} ('{text}')"),
            Self::UnknownHitObjectType { line, type_code } => write!(f, "line {line}: unknown hit object type {type_code}"),
            Self::DegenerateArc { line } => write!(f, "line {line}: perfect circle slider is degenerate, using a bezier instead"),
            Self::UnsupportedFormatVersion { found, supported } => write!(f, "file format v{found} is older than v{supported}, map may not load correctly"),
        }
    }
}
