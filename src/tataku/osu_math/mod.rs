mod curve;
mod osu_math;
mod curve_segment;

pub use curve::*;
pub use osu_math::*;
pub use curve_segment::*;
