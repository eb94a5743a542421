#![deny(unused_must_use)]

#[macro_use] extern crate log;
pub mod engine;
pub mod tataku;
pub mod prelude;

/// newest `osu file format vNN` this loader knows about
pub const SUPPORTED_FORMAT_VERSION:u8 = 14;
