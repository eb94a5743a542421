use crate::prelude::*;
use super::section_decoders::*;

/// ticks closer than this to a slider's edge are dropped
const MIN_TICK_DISTANCE_FROM_END: f32 = 10.0;
/// upper bound on the ticks one slider can produce
const MAX_SLIDER_TICKS: usize = 10_000;

/// the beatmap while its being read. nothing outside the parse ever sees this
pub(super) struct BeatmapBuilder {
    pub(super) settings: ParserSettings,

    pub(super) metadata: BeatmapMeta,
    pub(super) difficulty: DifficultyModel,
    pub(super) approach_rate_set: bool,

    pub(super) timing_points: Vec<TimingPoint>,
    pub(super) breaks: Vec<BreakEvent>,
    pub(super) combo_colours: Vec<ColourEntry>,
    pub(super) slider_track_override: Option<ColourEntry>,
    pub(super) slider_border: Option<ColourEntry>,
    pub(super) hit_objects: Vec<HitObject>,

    pub(super) diagnostics: Vec<Diagnostic>,
}
impl BeatmapBuilder {
    pub(super) fn new(hash: Md5Hash, settings: ParserSettings) -> Self {
        Self {
            settings,
            metadata: BeatmapMeta::new(hash),
            difficulty: DifficultyModel::default(),
            approach_rate_set: false,

            timing_points: Vec::new(),
            breaks: Vec::new(),
            combo_colours: Vec::new(),
            slider_track_override: None,
            slider_border: None,
            hit_objects: Vec::new(),

            diagnostics: Vec::new(),
        }
    }

    fn decode_line(&mut self, line: ClassifiedLine) {
        let result = match line.section {
            BeatmapSection::Version => decode_version(self, line.text),
            BeatmapSection::General
            | BeatmapSection::Metadata
            | BeatmapSection::Difficulty => decode_key_value(self, line.section, line.text),
            BeatmapSection::Events => decode_event(self, line.text),
            BeatmapSection::TimingPoints => decode_timing_point(self, line.text),
            BeatmapSection::Colours => decode_colour(self, line.text),
            BeatmapSection::HitObjects => {
                self.decode_hit_object(line);
                Ok(())
            }
            BeatmapSection::Ignored => Ok(()),
        };

        if let Err(reason) = result {
            self.malformed(line, reason);
        }
    }

    fn decode_hit_object(&mut self, line: ClassifiedLine) {
        match HitObject::decode(line.text, self.settings.slider_detail_level) {
            Ok(object) => {
                if let HitObject::Slider(slider) = &object {
                    if slider.path.had_degenerate_arc() {
                        self.diagnostics.push(Diagnostic::DegenerateArc { line: line.number });
                    }
                }
                self.hit_objects.push(object);
            }
            Err(HitObjectError::UnknownType(type_code)) => self.diagnostics.push(Diagnostic::UnknownHitObjectType { line: line.number, type_code }),
            Err(HitObjectError::Malformed(reason)) => self.malformed(line, reason),
        }
    }

    fn malformed(&mut self, line: ClassifiedLine, reason: String) {
        self.diagnostics.push(Diagnostic::MalformedLine {
            line: line.number,
            section: line.section,
            text: line.text.to_owned(),
            reason,
        });
    }

    fn finish(mut self) -> TatakuResult<ParsedBeatmap> {
        if self.settings.log_diagnostics {
            for d in self.diagnostics.iter() {
                warn!("[{}] {d}", self.metadata.beatmap_hash);
            }
        }

        if self.hit_objects.is_empty() {
            return Err(BeatmapError::NoHitObjects)?;
        }

        // old maps have no approach rate, it used to be the same as od
        if !self.approach_rate_set {
            self.difficulty.approach_rate = self.difficulty.overall_difficulty;
        }

        // sort_by_key is stable, objects on the same ms keep their file order
        self.hit_objects.sort_by_key(HitObject::time);

        let timing_points = TimingPoints::new(self.timing_points);
        if let Some((min, max)) = timing_points.bpm_range() {
            self.metadata.bpm_min = min;
            self.metadata.bpm_max = max;
        }

        let mut beatmap = Beatmap {
            metadata: self.metadata,
            difficulty: self.difficulty,
            timing_points,
            breaks: self.breaks,
            combo_colours: self.combo_colours,
            slider_track_override: self.slider_track_override,
            slider_border: self.slider_border,
            hit_objects: self.hit_objects,
        };
        beatmap.metadata.duration = beatmap.drain_duration();

        debug!(
            "loaded {} ({}): {} hit objects, {} timing points, {} breaks, {} diagnostics",
            beatmap.metadata.version_string(),
            beatmap.metadata.beatmap_hash,
            beatmap.hit_objects.len(),
            beatmap.timing_points.len(),
            beatmap.breaks.len(),
            self.diagnostics.len(),
        );

        Ok(ParsedBeatmap {
            beatmap,
            diagnostics: self.diagnostics,
        })
    }
}


/// a successfully loaded beatmap, along with anything that was skipped or looked wrong
#[derive(Clone, Debug, Serialize)]
pub struct ParsedBeatmap {
    pub beatmap: Beatmap,
    pub diagnostics: Vec<Diagnostic>,
}
impl ParsedBeatmap {
    /// true if nothing had to be skipped or worked around
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_beatmap(self) -> Beatmap {
        self.beatmap
    }
}


/// a fully loaded .osu chart. read-only once parsed
#[derive(Clone, Debug, Serialize)]
pub struct Beatmap {
    metadata: BeatmapMeta,
    difficulty: DifficultyModel,

    timing_points: TimingPoints,
    breaks: Vec<BreakEvent>,
    combo_colours: Vec<ColourEntry>,
    slider_track_override: Option<ColourEntry>,
    slider_border: Option<ColourEntry>,

    /// sorted by time
    hit_objects: Vec<HitObject>,
}
impl Beatmap {
    pub fn parse(text: &str) -> TatakuResult<ParsedBeatmap> {
        Self::parse_with_settings(text, &ParserSettings::default())
    }

    pub fn parse_with_settings(text: &str, settings: &ParserSettings) -> TatakuResult<ParsedBeatmap> {
        Self::parse_hashed(text, Md5Hash::of(text), settings)
    }

    /// parse raw file contents. utf-8 is preferred, anything else is read as windows-1252
    pub fn parse_bytes(bytes: &[u8], settings: &ParserSettings) -> TatakuResult<ParsedBeatmap> {
        let text = Io::decode_text(bytes);
        Self::parse_hashed(&text, Md5Hash::of(bytes), settings)
    }

    pub fn load(path: impl AsRef<Path>, settings: &ParserSettings) -> TatakuResult<ParsedBeatmap> {
        let path = path.as_ref();
        trace!("loading beatmap {}", path.display());

        let bytes = Io::read_file(path)?;
        Self::parse_bytes(&bytes, settings)
    }

    fn parse_hashed(text: &str, hash: Md5Hash, settings: &ParserSettings) -> TatakuResult<ParsedBeatmap> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        if text.trim().is_empty() {
            return Err(BeatmapError::EmptyInput)?;
        }

        let mut builder = BeatmapBuilder::new(hash, settings.clone());
        for line in LineClassifier::new(text) {
            builder.decode_line(line);
        }
        builder.finish()
    }
}

// getters
impl Beatmap {
    pub fn metadata(&self) -> &BeatmapMeta { &self.metadata }
    pub fn hash(&self) -> Md5Hash { self.metadata.beatmap_hash }
    pub fn difficulty(&self) -> &DifficultyModel { &self.difficulty }
    pub fn timing_points(&self) -> &TimingPoints { &self.timing_points }
    pub fn breaks(&self) -> &[BreakEvent] { &self.breaks }
    pub fn combo_colours(&self) -> &[ColourEntry] { &self.combo_colours }
    pub fn slider_track_override(&self) -> Option<ColourEntry> { self.slider_track_override }
    pub fn slider_border(&self) -> Option<ColourEntry> { self.slider_border }
    pub fn hit_objects(&self) -> &[HitObject] { &self.hit_objects }
}

// timing
impl Beatmap {
    pub fn timing_point_at(&self, time: i32) -> Option<&TimingPoint> {
        self.timing_points.timing_point_at(time)
    }
    pub fn beat_length_at(&self, time: i32) -> f32 {
        self.timing_points.beat_length_at(time)
    }
    pub fn slider_velocity_at(&self, time: i32) -> f32 {
        self.timing_points.slider_velocity_at(time)
    }

    pub fn in_break(&self, time: i32) -> bool {
        self.breaks.iter().any(|b| b.contains(time))
    }

    /// how long the slider takes, repeats included
    pub fn slider_duration(&self, slider: &SliderDef) -> f32 {
        let beat_length = self.beat_length_at(slider.time);
        let velocity = 100.0 * self.difficulty.slider_velocity * self.slider_velocity_at(slider.time);
        if velocity <= 0.0 { return 0.0 }

        let spans = slider.repeat_count().max(1) as f32;
        slider.pixel_length() * spans / velocity * beat_length
    }

    pub fn slider_end_time(&self, slider: &SliderDef) -> f32 {
        slider.time as f32 + self.slider_duration(slider)
    }

    /// times of every slider tick, in order. reversed spans tick from the other end
    pub fn slider_tick_times(&self, slider: &SliderDef) -> Vec<f32> {
        let spans = slider.repeat_count().max(1);
        let span_duration = self.slider_duration(slider) / spans as f32;
        let tick_spacing = self.beat_length_at(slider.time) / self.difficulty.slider_tick_rate;
        if !span_duration.is_finite() || !tick_spacing.is_finite() || tick_spacing <= 0.0 {
            return Vec::new();
        }

        let tick_limit = span_duration - MIN_TICK_DISTANCE_FROM_END;
        if tick_limit <= 0.0 { return Vec::new() }

        // every multiple of the spacing strictly below the limit
        let per_span = ((tick_limit / tick_spacing).ceil() as usize).saturating_sub(1);
        if per_span == 0 { return Vec::new() }
        if per_span.saturating_mul(spans as usize) > MAX_SLIDER_TICKS {
            warn!("slider at {} wants more than {MAX_SLIDER_TICKS} ticks, truncating", slider.time);
        }

        let offsets = (1..=per_span.min(MAX_SLIDER_TICKS))
            .map(|i| i as f32 * tick_spacing)
            .collect::<Vec<_>>();

        let mut ticks = Vec::with_capacity(per_span.saturating_mul(spans as usize).min(MAX_SLIDER_TICKS));
        for span in 0..spans {
            let remaining = MAX_SLIDER_TICKS - ticks.len();
            if remaining == 0 { break }

            let span_start = slider.time as f32 + span as f32 * span_duration;
            if span % 2 == 0 {
                ticks.extend(offsets.iter().take(remaining).map(|o| span_start + o));
            } else {
                ticks.extend(offsets.iter().rev().take(remaining).map(|o| span_start + span_duration - o));
            }
        }
        ticks
    }

    /// when the object stops needing input
    pub fn end_time(&self, object: &HitObject) -> f32 {
        match object {
            HitObject::Circle(c) => c.time as f32,
            HitObject::Slider(s) => self.slider_end_time(s),
            HitObject::Spinner(s) => s.end_time as f32,
        }
    }

    /// ms from the first object to the end of the last one
    pub fn drain_duration(&self) -> i32 {
        let Some(first) = self.hit_objects.first() else { return 0 };
        let end = self.hit_objects
            .iter()
            .map(|o| self.end_time(o))
            .fold(first.time() as f32, f32::max);

        (end - first.time() as f32) as i32
    }

    pub fn bpm_min(&self) -> f32 { self.metadata.bpm_min }
    pub fn bpm_max(&self) -> f32 { self.metadata.bpm_max }
}

// colours
impl Beatmap {
    /// combo colour of the object at `index`.
    /// every new combo after the first object moves one colour forward
    pub fn combo_colour_for(&self, index: usize) -> Option<ColourEntry> {
        if self.combo_colours.is_empty() || index >= self.hit_objects.len() { return None }

        let combo = self.hit_objects
            .iter()
            .take(index + 1)
            .skip(1)
            .filter(|o| o.new_combo())
            .count();

        Some(self.combo_colours[combo % self.combo_colours.len()])
    }
}


#[allow(unused)]
mod osu_beatmap_tests {
    use crate::prelude::*;

    const FULL_MAP: &str = "osu file format v14

[General]
AudioFilename: audio.mp3
AudioLeadIn: 0
PreviewTime: 12000
StackLeniency: 0.7
Mode: 0

[Editor]
Bookmarks: 1000,2000
DistanceSpacing: 1.2

[Metadata]
Title:Song
TitleUnicode:歌
Artist:Someone
Creator:mapper
Version:Hard
Tags:one two
BeatmapID:123

[Difficulty]
HPDrainRate:6
CircleSize:4
OverallDifficulty:8
SliderMultiplier:1.4
SliderTickRate:2

[Events]
//Background and Video events
0,0,\"bg.png\",0,0
2,5000,6000
//Storyboard Layer 0 (Background)
Sprite,Background,Centre,\"sb/bg.png\",320,240

[TimingPoints]
0,500,4,2,0,70,1,0
3000,-50,4,2,0,70,0,1
8000,250,4,2,0,70,1,0

[Colours]
Combo1 : 255,0,0
Combo2 : 0,255,0
SliderBorder : 255,255,255

[HitObjects]
256,192,2000,1,0,0:0:0:0:
100,100,1000,6,0,L|240:100,2,140
256,192,4000,12,0,7000,0:0:0:0:
300,200,2000,5,2,0:0:0:0:
300,200,7500,128,0,8000:0:0:0:0:
";

    #[test]
    fn minimal_chart() {
        let parsed = Beatmap::parse("[Difficulty]\nApproachRate:9\n[HitObjects]\n256,192,1000,1,0,0:0:0:0:").unwrap();
        assert!(parsed.is_clean());

        let map = parsed.beatmap;
        assert_eq!(map.hit_objects().len(), 1);
        let HitObject::Circle(circle) = &map.hit_objects()[0] else { panic!("expected a circle") };
        assert_eq!((circle.x, circle.y, circle.time), (256, 192, 1000));

        assert_eq!(map.difficulty().approach_rate, 9.0);
        assert_eq!(map.difficulty().approach_time(), 600.0);
        assert_eq!(DifficultyModel::approach_time_ms(9.0), 1950.0 - 150.0 * 9.0);
    }

    #[test]
    fn full_chart() {
        let parsed = Beatmap::parse(FULL_MAP).unwrap();
        // only the mania hold is skipped
        assert_eq!(parsed.diagnostics, vec![Diagnostic::UnknownHitObjectType { line: 52, type_code: 128 }]);
        assert!(!parsed.is_clean());

        let map = parsed.into_beatmap();
        let meta = map.metadata();
        assert_eq!(meta.format_version, 14);
        assert_eq!(meta.audio_filename, "audio.mp3");
        assert_eq!(meta.preview_time, 12000);
        assert_eq!(meta.title_unicode, "歌");
        assert_eq!(meta.version_string(), "Someone - Song [Hard]");
        assert_eq!(meta.tags, vec!["one", "two"]);
        assert_eq!(meta.beatmap_id, Some(123));
        assert_eq!(meta.background_filename, "bg.png");
        assert_eq!((meta.bpm_min, meta.bpm_max), (120.0, 240.0));

        let diff = map.difficulty();
        assert_eq!(diff.stack_leniency, 0.7);
        assert_eq!(diff.circle_size, 4.0);
        // no ApproachRate line, falls back to od
        assert_eq!(diff.approach_rate, 8.0);

        assert_eq!(map.breaks(), &[BreakEvent { start_time: 5000, end_time: 6000 }]);
        assert!(map.in_break(5500));
        assert!(!map.in_break(6500));
        assert_eq!(map.timing_points().len(), 3);
        assert!(map.timing_point_at(3500).unwrap().kiai);

        assert_eq!(map.combo_colours().len(), 2);
        assert_eq!(map.slider_border(), Some(ColourEntry { r: 255, g: 255, b: 255 }));

        // sorted by time, ties in file order
        let times = map.hit_objects().iter().map(HitObject::time).collect::<Vec<_>>();
        assert_eq!(times, vec![1000, 2000, 2000, 4000]);
        assert!(map.hit_objects()[0].is_slider());
        assert!(!map.hit_objects()[1].new_combo());
        assert!(map.hit_objects()[2].new_combo());
        assert!(map.hit_objects()[3].is_spinner());

        // slider at 1000: 140px * 2 spans / (100 * 1.4) * 500ms
        let HitObject::Slider(slider) = &map.hit_objects()[0] else { panic!("expected a slider") };
        assert_eq!(map.slider_duration(slider), 1000.0);
        assert_eq!(map.slider_end_time(slider), 2000.0);
        // tick every 250ms, the second span runs backwards
        assert_eq!(map.slider_tick_times(slider), vec![1250.0, 1750.0]);

        // 1000 to the end of the spinner
        assert_eq!(meta.duration, 6000);
        assert_eq!(map.drain_duration(), 6000);
    }

    #[test]
    fn slider_velocity_changes_duration() {
        let text = "[Difficulty]\nSliderMultiplier:1\n[TimingPoints]\n0,500,4,0,0,100,1,0\n1000,-50,4,0,0,100,0,0\n[HitObjects]\n0,0,0,2,0,L|100:0,1,100\n0,0,2000,2,0,L|100:0,1,100";
        let map = Beatmap::parse(text).unwrap().beatmap;

        let durations = map.hit_objects().iter().map(|o| match o {
            HitObject::Slider(s) => map.slider_duration(s),
            _ => panic!("expected sliders"),
        }).collect::<Vec<_>>();
        assert_eq!(durations, vec![500.0, 250.0]);
    }

    #[test]
    fn huge_tick_rate_is_bounded() {
        let text = "[Difficulty]\nSliderMultiplier:1\nSliderTickRate:1000000000\n[TimingPoints]\n0,500,4,0,0,100,1,0\n[HitObjects]\n0,0,0,2,0,L|1000:0,1,1000";
        let map = Beatmap::parse(text).unwrap().beatmap;
        let HitObject::Slider(slider) = &map.hit_objects()[0] else { panic!("expected a slider") };
        assert_eq!(map.slider_duration(slider), 5000.0);

        let ticks = map.slider_tick_times(slider);
        assert_eq!(ticks.len(), super::MAX_SLIDER_TICKS);
        assert!(ticks.iter().all(|t| t.is_finite() && *t > 0.0 && *t < 5000.0));
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));

        // lots of repeats share the same cap
        let text = "[Difficulty]\nSliderMultiplier:1\nSliderTickRate:1000\n[TimingPoints]\n0,500,4,0,0,100,1,0\n[HitObjects]\n0,0,0,2,0,L|1000:0,200,1000";
        let map = Beatmap::parse(text).unwrap().beatmap;
        let HitObject::Slider(slider) = &map.hit_objects()[0] else { panic!("expected a slider") };
        assert_eq!(map.slider_tick_times(slider).len(), super::MAX_SLIDER_TICKS);
    }

    #[test]
    fn malformed_lines_dont_stop_parsing() {
        let text = "osu file format v14\n[Difficulty]\nCircleSize:big\n[TimingPoints]\n0\n[HitObjects]\n256,192\n256,192,1000,1,0\n1,2,3,4,5,6\n300,300,1500,1,0";
        let parsed = Beatmap::parse(text).unwrap();

        assert_eq!(parsed.beatmap.hit_objects().len(), 2);
        assert_eq!(parsed.beatmap.difficulty().circle_size, 5.0);
        assert_eq!(parsed.diagnostics.len(), 4);
        assert!(matches!(&parsed.diagnostics[0], Diagnostic::MalformedLine { line: 3, section: BeatmapSection::Difficulty, .. }));
        assert!(matches!(&parsed.diagnostics[1], Diagnostic::MalformedLine { line: 5, section: BeatmapSection::TimingPoints, .. }));
        assert!(matches!(&parsed.diagnostics[2], Diagnostic::MalformedLine { line: 7, section: BeatmapSection::HitObjects, .. }));
        assert_eq!(parsed.diagnostics[3], Diagnostic::UnknownHitObjectType { line: 9, type_code: 4 });
    }

    #[test]
    fn old_format_version_warns() {
        let parsed = Beatmap::parse("osu file format v5\n[HitObjects]\n0,0,0,1,0").unwrap();
        assert_eq!(parsed.diagnostics, vec![Diagnostic::UnsupportedFormatVersion { found: 5, supported: 14 }]);
        assert_eq!(parsed.beatmap.metadata().format_version, 5);
    }

    #[test]
    fn degenerate_circle_is_reported() {
        let parsed = Beatmap::parse("[HitObjects]\n0,0,0,2,0,P|50:0|100:0,1,100").unwrap();
        assert_eq!(parsed.diagnostics, vec![Diagnostic::DegenerateArc { line: 2 }]);

        let HitObject::Slider(slider) = &parsed.beatmap.hit_objects()[0] else { panic!("expected a slider") };
        assert!(matches!(slider.path.segments().next(), Some(CurveSegment::Bezier { .. })));
    }

    #[test]
    fn fatal_errors() {
        assert!(matches!(Beatmap::parse(""), Err(TatakuError::Beatmap(BeatmapError::EmptyInput))));
        assert!(matches!(Beatmap::parse(" \r\n\t\n"), Err(TatakuError::Beatmap(BeatmapError::EmptyInput))));
        assert!(matches!(Beatmap::parse("[Metadata]\nTitle:x"), Err(TatakuError::Beatmap(BeatmapError::NoHitObjects))));
        assert!(matches!(Beatmap::parse("[HitObjects]\n0,0,0,128,0"), Err(TatakuError::Beatmap(BeatmapError::NoHitObjects))));
    }

    #[test]
    fn legacy_bytes() {
        let bytes = b"[Metadata]\nTitle:Caf\xE9\n[HitObjects]\n0,0,0,1,0";
        let map = Beatmap::parse_bytes(bytes, &ParserSettings::default()).unwrap().beatmap;
        assert_eq!(map.metadata().title, "Caf\u{e9}");
        assert_eq!(map.hash(), Md5Hash::of(bytes));
    }

    #[test]
    fn combo_colours_cycle() {
        let text = "[Colours]\nCombo1:1,1,1\nCombo2:2,2,2\nCombo3:3,3,3\n[HitObjects]\n0,0,0,5,0\n0,0,1,1,0\n0,0,2,5,0\n0,0,3,5,0\n0,0,4,5,0";
        let map = Beatmap::parse(text).unwrap().beatmap;

        let colours = (0..5).filter_map(|i| map.combo_colour_for(i)).map(|c| c.r).collect::<Vec<_>>();
        // new combo, same combo, next colour, next colour, wraps around
        assert_eq!(colours, vec![1, 1, 2, 3, 1]);
        assert_eq!(map.combo_colour_for(5), None);
    }

    #[test]
    fn colour_skip_codes_are_unknown_objects() {
        let parsed = Beatmap::parse("[HitObjects]\n0,0,0,1,0\n10,10,100,21,0\n20,20,200,37,0").unwrap();
        assert_eq!(parsed.beatmap.hit_objects().len(), 1);
        assert_eq!(parsed.diagnostics, vec![
            Diagnostic::UnknownHitObjectType { line: 3, type_code: 21 },
            Diagnostic::UnknownHitObjectType { line: 4, type_code: 37 },
        ]);
    }
}
