mod md5_hash;
mod diagnostic;
mod beatmap_meta;
mod difficulty_model;

pub use md5_hash::*;
pub use diagnostic::*;
pub use beatmap_meta::*;
pub use difficulty_model::*;

