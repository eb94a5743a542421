
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DifficultyError {
    /// only 300, 100 and 50 have hit windows
    InvalidJudgement(u16),
}
impl std::fmt::Display for DifficultyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJudgement(j) => write!(f, "invalid judgement {j}, expected 300, 100 or 50"),
        }
    }
}
impl std::error::Error for DifficultyError {}
