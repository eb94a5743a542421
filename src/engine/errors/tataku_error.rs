use std::{fmt::Display, io::Error as IOError};
use serde_json::Error as JsonError;

use super::*;

pub type TatakuResult<T=()> = Result<T, TatakuError>;

#[derive(Debug)]
pub enum TatakuError {
    Beatmap(BeatmapError),
    Geometry(GeometryError),
    Difficulty(DifficultyError),
    IO(IOError),
    Serde(JsonError),

    String(String),
}

impl Display for TatakuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Self::Beatmap(e) => write!(f, "{e}"),
            Self::Geometry(e) => write!(f, "{e}"),
            Self::Difficulty(e) => write!(f, "{e}"),
            Self::IO(e) => write!(f, "{e}"),
            Self::Serde(e) => write!(f, "{e}"),
            Self::String(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for TatakuError {}

impl From<JsonError> for TatakuError {
    fn from(e: JsonError) -> Self {Self::Serde(e)}
}
impl From<IOError> for TatakuError {
    fn from(e: IOError) -> Self {Self::IO(e)}
}
impl From<BeatmapError> for TatakuError {
    fn from(e: BeatmapError) -> Self {Self::Beatmap(e)}
}
impl From<GeometryError> for TatakuError {
    fn from(e: GeometryError) -> Self {Self::Geometry(e)}
}
impl From<DifficultyError> for TatakuError {
    fn from(e: DifficultyError) -> Self {Self::Difficulty(e)}
}
impl From<String> for TatakuError {
    fn from(e: String) -> Self {Self::String(e)}
}
