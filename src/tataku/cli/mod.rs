mod beatmap_dump;

pub use beatmap_dump::*;
