use crate::prelude::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    Osu,
    Taiko,
    Catch,
    Mania,
}
impl PlayMode {
    pub fn from_u8(p:u8) -> Option<Self> {
        match p {
            0 => Some(Self::Osu),
            1 => Some(Self::Taiko),
            2 => Some(Self::Catch),
            3 => Some(Self::Mania),
            _ => None,
        }
    }
}

// contains beatmap info unrelated to notes and timing points, etc
#[derive(Clone, Debug, Serialize)]
pub struct BeatmapMeta {
    pub beatmap_hash: Md5Hash,
    /// the `vNN` from the header line, 0 if the file had none
    pub format_version: u8,

    pub mode: PlayMode,
    pub artist: String,
    pub title: String,
    pub artist_unicode: String,
    pub title_unicode: String,
    pub creator: String,
    pub version: String,
    pub source: String,
    pub tags: Vec<String>,
    pub beatmap_id: Option<i32>,
    pub beatmap_set_id: Option<i32>,

    pub audio_filename: String,
    pub audio_lead_in: i32,
    pub preview_time: i32,
    pub background_filename: String,

    /// time in ms from first note to last note
    pub duration: i32,
    pub bpm_min: f32,
    pub bpm_max: f32,
}
impl BeatmapMeta {
    pub fn new(beatmap_hash: Md5Hash) -> BeatmapMeta {
        let unknown = "Unknown".to_owned();

        BeatmapMeta {
            beatmap_hash,
            format_version: 0,
            mode: PlayMode::Osu,
            artist: unknown.clone(),
            title: unknown.clone(),
            artist_unicode: unknown.clone(),
            title_unicode: unknown.clone(),
            creator: unknown.clone(),
            version: unknown,
            source: String::new(),
            tags: Vec::new(),
            beatmap_id: None,
            beatmap_set_id: None,

            audio_filename: String::new(),
            audio_lead_in: 0,
            preview_time: -1,
            background_filename: String::new(),

            duration: 0,
            bpm_min: 0.0,
            bpm_max: 0.0,
        }
    }

    /// get the title string with the version
    pub fn version_string(&self) -> String {
        let artist = if self.artist.is_empty() {&self.artist_unicode} else {&self.artist};
        let title = if self.title.is_empty() {&self.title_unicode} else {&self.title};
        format!("{} - {} [{}]", artist, title, self.version)
    }
}

// getter helpers
impl BeatmapMeta {
    pub fn mins(&self, speed:f32) -> f32 {
        ((self.duration as f32 / speed) / 60000.0).floor()
    }
    pub fn secs(&self, speed:f32) -> f32 {
        let mins = self.mins(speed);
        let remaining_ms = (self.duration as f32 / speed) - mins * 60000.0;
        (remaining_ms / 1000.0).floor()
    }
}


#[test]
fn version_string_prefers_romanised() {
    let mut meta = BeatmapMeta::new(Md5Hash::default());
    meta.artist = "Artist".to_owned();
    meta.title = String::new();
    meta.title_unicode = "タイトル".to_owned();
    meta.version = "Insane".to_owned();
    assert_eq!(meta.version_string(), "Artist - タイトル [Insane]");

    meta.duration = 125_000;
    assert_eq!(meta.mins(1.0), 2.0);
    assert_eq!(meta.secs(1.0), 5.0);
}
