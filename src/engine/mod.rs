mod io;
mod math;
mod errors;
mod settings;

pub use io::*;
pub use math::*;
pub use errors::*;
pub use settings::*;
