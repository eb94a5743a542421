mod osu_beatmap;
mod timing_point;
mod hitobject_defs;
mod line_classifier;
mod section_decoders;

pub use osu_beatmap::*;
pub use timing_point::*;
pub use hitobject_defs::*;
pub use line_classifier::*;
pub use section_decoders::*;
