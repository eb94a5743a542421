use crate::prelude::*;
use super::osu_beatmap::BeatmapBuilder;
use super::timing_point::parse_time;

/// a `[General]`/`[Metadata]`/`[Difficulty]` value setter. returns why the value was rejected
type FieldSetter = fn(&mut BeatmapBuilder, &str) -> Result<(), String>;

lazy_static::lazy_static! {
    static ref GENERAL_KEYS: HashMap<&'static str, FieldSetter> = {
        let mut keys: HashMap<&'static str, FieldSetter> = HashMap::new();
        keys.insert("AudioFilename", |b, v| { b.metadata.audio_filename = v.to_owned(); Ok(()) });
        keys.insert("AudioLeadIn", |b, v| { b.metadata.audio_lead_in = int(v)?; Ok(()) });
        keys.insert("PreviewTime", |b, v| { b.metadata.preview_time = int(v)?; Ok(()) });
        keys.insert("StackLeniency", |b, v| { b.difficulty.stack_leniency = finite(v)?; Ok(()) });
        keys.insert("Mode", |b, v| {
            let mode = v.parse::<u8>().ok().and_then(PlayMode::from_u8).ok_or_else(|| format!("unknown mode '{v}'"))?;
            b.metadata.mode = mode;
            Ok(())
        });
        keys
    };

    static ref METADATA_KEYS: HashMap<&'static str, FieldSetter> = {
        let mut keys: HashMap<&'static str, FieldSetter> = HashMap::new();
        keys.insert("Title", |b, v| { b.metadata.title = v.to_owned(); Ok(()) });
        keys.insert("TitleUnicode", |b, v| { b.metadata.title_unicode = v.to_owned(); Ok(()) });
        keys.insert("Artist", |b, v| { b.metadata.artist = v.to_owned(); Ok(()) });
        keys.insert("ArtistUnicode", |b, v| { b.metadata.artist_unicode = v.to_owned(); Ok(()) });
        keys.insert("Creator", |b, v| { b.metadata.creator = v.to_owned(); Ok(()) });
        keys.insert("Version", |b, v| { b.metadata.version = v.to_owned(); Ok(()) });
        keys.insert("Source", |b, v| { b.metadata.source = v.to_owned(); Ok(()) });
        keys.insert("Tags", |b, v| { b.metadata.tags = v.split_whitespace().map(str::to_owned).collect(); Ok(()) });
        keys.insert("BeatmapID", |b, v| { b.metadata.beatmap_id = Some(int(v)?); Ok(()) });
        keys.insert("BeatmapSetID", |b, v| { b.metadata.beatmap_set_id = Some(int(v)?); Ok(()) });
        keys
    };

    static ref DIFFICULTY_KEYS: HashMap<&'static str, FieldSetter> = {
        let mut keys: HashMap<&'static str, FieldSetter> = HashMap::new();
        keys.insert("HPDrainRate", |b, v| { b.difficulty.hp_drain = finite(v)?; Ok(()) });
        keys.insert("CircleSize", |b, v| { b.difficulty.circle_size = finite(v)?; Ok(()) });
        keys.insert("OverallDifficulty", |b, v| { b.difficulty.overall_difficulty = finite(v)?; Ok(()) });
        keys.insert("ApproachRate", |b, v| {
            b.difficulty.approach_rate = finite(v)?;
            b.approach_rate_set = true;
            Ok(())
        });
        keys.insert("SliderMultiplier", |b, v| { b.difficulty.slider_velocity = finite(v)?; Ok(()) });
        keys.insert("SliderTickRate", |b, v| { b.difficulty.slider_tick_rate = finite(v)?; Ok(()) });
        keys
    };
}

fn int(v: &str) -> Result<i32, String> {
    parse_time(v).ok_or_else(|| format!("expected a number, got '{v}'"))
}
fn finite(v: &str) -> Result<f32, String> {
    v.parse::<f32>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| format!("expected a number, got '{v}'"))
}

/// the setter table for a key/value section
fn key_table(section: BeatmapSection) -> Option<&'static HashMap<&'static str, FieldSetter>> {
    match section {
        BeatmapSection::General => Some(&*GENERAL_KEYS),
        BeatmapSection::Metadata => Some(&*METADATA_KEYS),
        BeatmapSection::Difficulty => Some(&*DIFFICULTY_KEYS),
        _ => None,
    }
}


/// `osu file format vNN`
pub(super) fn decode_version(builder: &mut BeatmapBuilder, line: &str) -> Result<(), String> {
    let version = line.strip_prefix("osu file format v").ok_or("expected 'osu file format vNN'")?;
    let version = version.trim().parse::<u8>().map_err(|_| format!("bad format version '{version}'"))?;
    builder.metadata.format_version = version;

    let supported = builder.settings.supported_format_version;
    if version < supported {
        builder.diagnostics.push(Diagnostic::UnsupportedFormatVersion { found: version, supported });
    }
    Ok(())
}

/// `Key:Value`. unknown keys are skipped
pub(super) fn decode_key_value(builder: &mut BeatmapBuilder, section: BeatmapSection, line: &str) -> Result<(), String> {
    let Some(table) = key_table(section) else { return Ok(()) };

    let (key, value) = line.split_once(':').ok_or("expected 'Key:Value'")?;
    let key = key.trim();
    let Some(setter) = table.get(key) else { return Ok(()) };

    setter(builder, value.trim()).map_err(|e| format!("{key}: {e}"))
}


#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreakEvent {
    pub start_time: i32,
    pub end_time: i32,
}
impl BreakEvent {
    pub fn contains(&self, time: i32) -> bool {
        (self.start_time..=self.end_time).contains(&time)
    }
}

/// only breaks and the background are kept, everything else (videos, storyboard commands) is dropped
pub(super) fn decode_event(builder: &mut BeatmapBuilder, line: &str) -> Result<(), String> {
    if line.starts_with("//") { return Ok(()) }

    // eventType,startTime,eventParams
    let mut split = line.split(',').map(str::trim);
    match split.next() {
        // 0,0,filename,xOffset,yOffset
        Some("0") | Some("Background") => {
            if let Some(filename) = split.nth(1) {
                builder.metadata.background_filename = filename.trim_matches('"').to_owned();
            }
        }

        Some("2") | Some("Break") => {
            let mut time = |name: &str| -> Result<i32, String> {
                let s = split.next().ok_or_else(|| format!("missing break {name} time"))?;
                parse_time(s).ok_or_else(|| format!("bad break {name} time '{s}'"))
            };
            let start_time = time("start")?;
            let end_time = time("end")?;

            builder.breaks.push(BreakEvent { start_time, end_time });
        }

        _ => {}
    }

    Ok(())
}


pub(super) fn decode_timing_point(builder: &mut BeatmapBuilder, line: &str) -> Result<(), String> {
    builder.timing_points.push(line.parse()?);
    Ok(())
}


#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ColourEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
impl FromStr for ColourEntry {
    type Err = String;

    /// `r,g,b`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.split(',').map(str::trim);
        let mut read = || -> Result<u8, String> {
            let c = split.next().ok_or("expected 'r,g,b'")?;
            c.parse::<u8>().map_err(|_| format!("bad colour component '{c}'"))
        };

        Ok(Self {
            r: read()?,
            g: read()?,
            b: read()?,
        })
    }
}

/// `Combo[n] : r,g,b`, `SliderTrackOverride : r,g,b`, `SliderBorder : r,g,b`
pub(super) fn decode_colour(builder: &mut BeatmapBuilder, line: &str) -> Result<(), String> {
    let (key, value) = line.split_once(':').ok_or("expected 'Key : r,g,b'")?;
    let colour = value.parse::<ColourEntry>()?;

    match key.trim() {
        "SliderTrackOverride" => builder.slider_track_override = Some(colour),
        "SliderBorder" => builder.slider_border = Some(colour),
        key if key.strip_prefix("Combo").map_or(false, |n| n.parse::<u32>().is_ok()) => builder.combo_colours.push(colour),
        _ => {}
    }

    Ok(())
}


#[allow(unused)]
mod section_decoder_tests {
    use crate::prelude::*;
    use super::*;

    fn builder() -> BeatmapBuilder {
        BeatmapBuilder::new(Md5Hash::default(), ParserSettings::default())
    }

    #[test]
    fn key_values() {
        let mut b = builder();
        decode_key_value(&mut b, BeatmapSection::Metadata, "Title:Re:Zero").unwrap();
        decode_key_value(&mut b, BeatmapSection::Metadata, "Tags: a b  c").unwrap();
        decode_key_value(&mut b, BeatmapSection::Metadata, "SomethingNew:1").unwrap();
        decode_key_value(&mut b, BeatmapSection::General, "Mode: 1").unwrap();
        decode_key_value(&mut b, BeatmapSection::Difficulty, "CircleSize:4.2").unwrap();

        assert_eq!(b.metadata.title, "Re:Zero");
        assert_eq!(b.metadata.tags, vec!["a", "b", "c"]);
        assert_eq!(b.metadata.mode, PlayMode::Taiko);
        assert_eq!(b.difficulty.circle_size, 4.2);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let mut b = builder();
        assert!(decode_key_value(&mut b, BeatmapSection::Difficulty, "OverallDifficulty:lots").is_err());
        assert!(decode_key_value(&mut b, BeatmapSection::Difficulty, "OverallDifficulty:NaN").is_err());
        assert!(decode_key_value(&mut b, BeatmapSection::Difficulty, "no colon here").is_err());
        assert!(decode_key_value(&mut b, BeatmapSection::General, "Mode:9").is_err());
        assert_eq!(b.difficulty.overall_difficulty, DifficultyModel::default().overall_difficulty);
        assert_eq!(b.metadata.mode, PlayMode::Osu);
    }

    #[test]
    fn version_line() {
        let mut b = builder();
        decode_version(&mut b, "osu file format v14").unwrap();
        assert_eq!(b.metadata.format_version, 14);
        assert!(b.diagnostics.is_empty());

        decode_version(&mut b, "osu file format v7").unwrap();
        assert_eq!(b.diagnostics, vec![Diagnostic::UnsupportedFormatVersion { found: 7, supported: 14 }]);

        assert!(decode_version(&mut b, "osu file format vX").is_err());
        assert!(decode_version(&mut b, "not a version").is_err());
    }

    #[test]
    fn events() {
        let mut b = builder();
        decode_event(&mut b, "//Background and Video events").unwrap();
        decode_event(&mut b, "0,0,\"bg.jpg\",0,0").unwrap();
        decode_event(&mut b, "Video,0,\"video.avi\"").unwrap();
        decode_event(&mut b, "2,10000,15000").unwrap();
        decode_event(&mut b, "Sprite,Foreground,Centre,\"sb/star.png\",320,240").unwrap();
        decode_event(&mut b, " F,0,1000,2000,0,1").unwrap();
        assert!(decode_event(&mut b, "2,10000").is_err());

        assert_eq!(b.metadata.background_filename, "bg.jpg");
        assert_eq!(b.breaks, vec![BreakEvent { start_time: 10000, end_time: 15000 }]);
        assert!(b.breaks[0].contains(15000));
    }

    #[test]
    fn colours() {
        let mut b = builder();
        decode_colour(&mut b, "Combo1 : 255,128,0").unwrap();
        decode_colour(&mut b, "Combo2 : 0,0,255").unwrap();
        decode_colour(&mut b, "SliderBorder : 1,2,3").unwrap();
        assert!(decode_colour(&mut b, "Combo3 : 256,0,0").is_err());
        assert!(decode_colour(&mut b, "Combo3 : 1,2").is_err());

        assert_eq!(b.combo_colours, vec![ColourEntry { r: 255, g: 128, b: 0 }, ColourEntry { r: 0, g: 0, b: 255 }]);
        assert_eq!(b.slider_border, Some(ColourEntry { r: 1, g: 2, b: 3 }));
        assert_eq!(b.slider_track_override, None);
    }
}
