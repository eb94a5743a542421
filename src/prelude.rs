// std imports
pub use std::fmt::Display;
pub use std::str::FromStr;
pub use std::f32::consts::PI;
pub use std::path::Path;
pub use std::collections::HashMap;

// serde imports
pub use serde::{ Serialize, Deserialize };

// constant imports
pub use crate::SUPPORTED_FORMAT_VERSION;

// general imports
pub use crate::engine::*;
pub use crate::tataku::*;
