use crate::prelude::*;

/// which part of the file a line came from
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BeatmapSection {
    /// before any header. only the `osu file format vNN` line lives here
    Version,
    General,
    Metadata,
    Difficulty,
    Events,
    TimingPoints,
    Colours,
    HitObjects,
    /// a section we dont read (`[Editor]` etc)
    Ignored,
}
impl BeatmapSection {
    /// try to read a section header. anything in square brackets is a header, unknown ones are ignored
    pub fn from_header(line: &str) -> Option<Self> {
        let name = line.strip_prefix('[')?.strip_suffix(']')?;

        Some(match name {
            "General" => Self::General,
            "Metadata" => Self::Metadata,
            "Difficulty" => Self::Difficulty,
            "Events" => Self::Events,
            "TimingPoints" => Self::TimingPoints,
            "Colours" => Self::Colours,
            "HitObjects" => Self::HitObjects,
            _ => Self::Ignored,
        })
    }
}


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// 1-based line number in the original text
    pub number: usize,
    pub section: BeatmapSection,
    /// trimmed, never empty
    pub text: &'a str,
}

/// raw lines, ended by `\n`, `\r\n` or a lone `\r`
struct RawLines<'a> {
    rest: &'a str,
}
impl<'a> Iterator for RawLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() { return None }

        match self.rest.find(['\r', '\n']) {
            Some(end) => {
                let line = &self.rest[..end];
                let terminator = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = &self.rest[end + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut self.rest)),
        }
    }
}

/// walks the chart text, swallowing headers and tagging every other line with its section
pub struct LineClassifier<'a> {
    lines: std::iter::Enumerate<RawLines<'a>>,
    section: BeatmapSection,
}
impl<'a> LineClassifier<'a> {
    pub fn new(text: &'a str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            lines: RawLines { rest: text }.enumerate(),
            section: BeatmapSection::Version,
        }
    }
}
impl<'a> Iterator for LineClassifier<'a> {
    type Item = ClassifiedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for (i, line) in self.lines.by_ref() {
            let text = line.trim();
            if text.is_empty() { continue }

            if let Some(section) = BeatmapSection::from_header(text) {
                trace!("line {}: {:?} -> {section:?}", i + 1, self.section);
                self.section = section;
                continue;
            }

            let section = self.section;
            // only the very first line can be the version line
            if section == BeatmapSection::Version {
                self.section = BeatmapSection::Ignored;
            }

            return Some(ClassifiedLine { number: i + 1, section, text });
        }

        None
    }
}


#[allow(unused)]
mod line_classifier_tests {
    use crate::prelude::*;

    #[test]
    fn headers_are_consumed() {
        let text = "osu file format v14\r\n\r\n[General]\r\n  AudioFilename: audio.mp3  \r\n[HitObjects]\r\n256,192,1000,1,0\r\n";
        let lines = LineClassifier::new(text).collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ClassifiedLine { number: 1, section: BeatmapSection::Version, text: "osu file format v14" });
        assert_eq!(lines[1], ClassifiedLine { number: 4, section: BeatmapSection::General, text: "AudioFilename: audio.mp3" });
        assert_eq!(lines[2].section, BeatmapSection::HitObjects);
        assert_eq!(lines[2].number, 6);
    }

    #[test]
    fn every_line_ending_splits() {
        let text = "[General]\rAudioFilename:a.mp3\r[HitObjects]\r0,0,0,1,0";
        let lines = LineClassifier::new(text).collect::<Vec<_>>();
        assert_eq!(lines, vec![
            ClassifiedLine { number: 2, section: BeatmapSection::General, text: "AudioFilename:a.mp3" },
            ClassifiedLine { number: 4, section: BeatmapSection::HitObjects, text: "0,0,0,1,0" },
        ]);

        // \r\n is one terminator, so mixed endings keep their line numbers
        let numbers = LineClassifier::new("a\r\nb\rc\nd\r\r\ne").map(|l| (l.number, l.text)).collect::<Vec<_>>();
        assert_eq!(numbers, vec![(1, "a"), (2, "b"), (3, "c"), (4, "d"), (6, "e")]);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let text = "[Editor]\nBookmarks: 1,2,3\n[Metadata]\nTitle:a";
        let sections = LineClassifier::new(text).map(|l| l.section).collect::<Vec<_>>();
        assert_eq!(sections, vec![BeatmapSection::Ignored, BeatmapSection::Metadata]);
    }

    #[test]
    fn bom_is_stripped() {
        let mut lines = LineClassifier::new("\u{feff}osu file format v9\n");
        assert_eq!(lines.next().map(|l| l.text), Some("osu file format v9"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn only_first_line_is_version() {
        let lines = LineClassifier::new("osu file format v14\nstray line\n").collect::<Vec<_>>();
        assert_eq!(lines[0].section, BeatmapSection::Version);
        assert_eq!(lines[1].section, BeatmapSection::Ignored);
    }
}
