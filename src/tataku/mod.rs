pub mod cli;
pub mod beatmaps;
pub mod osu_math;

pub use cli::*;
pub use beatmaps::*;
pub use osu_math::*;
