use crate::prelude::*;
use std::io;
use std::time::Instant;
use encoding_rs::{ UTF_8, WINDOWS_1252 };


pub struct Io;
impl Io {
    /// read a file into bytes
    pub fn read_file(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
        let time = Instant::now();
        let f = std::fs::read(&path);

        let duration = time.elapsed().as_secs_f32() * 1000.0;
        if duration > 1000.0 { warn!("took {duration:.2}ms to load file bytes {}", path.as_ref().display()); }

        f
    }

    /// turn raw chart bytes into text.
    /// utf-8 (with or without a bom) is tried first, anything else is read as windows-1252
    pub fn decode_text(bytes: &[u8]) -> String {
        let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
        if !had_errors { return text.into_owned() }

        debug!("input is not valid utf-8, decoding as windows-1252");
        let (text, _, _) = WINDOWS_1252.decode(bytes);
        text.into_owned()
    }
}


#[test]
fn decode_utf8_with_bom() {
    let bytes = b"\xEF\xBB\xBFosu file format v14";
    assert_eq!(Io::decode_text(bytes), "osu file format v14");
}

#[test]
fn decode_legacy_encoding() {
    // "Caf\xe9" is not valid utf-8
    let bytes = b"Title:Caf\xE9";
    assert_eq!(Io::decode_text(bytes), "Title:Caf\u{e9}");
}
