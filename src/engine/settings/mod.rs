mod parser_settings;

pub use parser_settings::*;
