use crate::prelude::*;

/// knobs for the beatmap loader. defaults match what osu!stable does
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ParserSettings {
    /// files declaring an older `osu file format` than this get a compatibility warning
    pub supported_format_version: u8,

    /// how many arc-length samples to take per slider control point
    pub slider_detail_level: u32,

    /// should every recoverable diagnostic also be logged as a warning?
    pub log_diagnostics: bool,
}
impl ParserSettings {
    /// load settings from a json file, falling back to the defaults if anything goes wrong
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path).map(|s| serde_json::from_str::<Self>(&s).map_err(|e|e.to_string())).map_err(|e|e.to_string()) {
            Ok(Ok(settings)) => Self {
                slider_detail_level: Self::clamp_detail_level(settings.slider_detail_level),
                ..settings
            },
            Err(e) | Ok(Err(e)) => {
                warn!("Error reading {}, loading defaults: {e}", path.display());
                Self::default()
            }
        }
    }

    fn clamp_detail_level(level: u32) -> u32 {
        let clamped = level.clamp(1, MAX_SLIDER_DETAIL_LEVEL);
        if clamped != level {
            warn!("slider_detail_level {level} is out of range, using {clamped}");
        }
        clamped
    }

    pub fn save(&self, path: impl AsRef<Path>) -> TatakuResult {
        debug!("Saving parser settings");
        let str = serde_json::to_string_pretty(self)?;
        std::fs::write(path, str)?;
        Ok(())
    }
}
impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            supported_format_version: SUPPORTED_FORMAT_VERSION,
            slider_detail_level: SLIDER_DETAIL_LEVEL,
            log_diagnostics: true,
        }
    }
}


#[test]
fn partial_settings_fill_defaults() {
    let settings: ParserSettings = serde_json::from_str(r#"{"slider_detail_level": 10}"#).unwrap();
    assert_eq!(settings.slider_detail_level, 10);
    assert_eq!(settings.supported_format_version, SUPPORTED_FORMAT_VERSION);
    assert!(settings.log_diagnostics);
}

#[test]
fn missing_settings_file_loads_defaults() {
    let settings = ParserSettings::load("this/file/does/not/exist.json");
    assert_eq!(settings, ParserSettings::default());
}

#[test]
fn detail_level_is_clamped_on_load() {
    let path = std::env::temp_dir().join("tataku-beatmap-detail-level.json");

    std::fs::write(&path, r#"{"slider_detail_level": 4294967295}"#).unwrap();
    assert_eq!(ParserSettings::load(&path).slider_detail_level, MAX_SLIDER_DETAIL_LEVEL);

    std::fs::write(&path, r#"{"slider_detail_level": 0}"#).unwrap();
    assert_eq!(ParserSettings::load(&path).slider_detail_level, 1);

    let _ = std::fs::remove_file(&path);
}
