use crate::prelude::*;

/// beat length used when a map has no uninherited timing point at all (60 bpm)
pub const DEFAULT_BEAT_LENGTH: f32 = 1000.0;

///https://osu.ppy.sh/wiki/en/osu%21_File_Formats/Osu_%28file_format%29#timing-points
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TimingPoint {
    /// Start time of the timing section, in milliseconds from the beginning of the beatmap's audio.
    pub time: i32,
    /// This property has two meanings:
    ///     For uninherited timing points, the duration of a beat, in milliseconds.
    ///     For inherited timing points, a negative inverse slider velocity multiplier, as a percentage.
    pub beat_length: f32,
    /// Amount of beats in a measure. Inherited timing points ignore this property.
    pub meter: u8,
    /// Default sample set for hit objects (0 = beatmap default, 1 = normal, 2 = soft, 3 = drum)
    pub sample_set: u8,
    /// Custom sample index for hit objects. 0 indicates osu!'s default hitsounds
    pub sample_index: u8,
    /// Volume percentage for hit objects
    pub volume: u8,
    pub inherited: bool,
    /// Whether or not kiai time is enabled
    pub kiai: bool,
}
impl TimingPoint {
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn bpm(&self) -> Option<f32> {
        if self.inherited || self.beat_length <= 0.0 { return None }
        Some(60_000.0 / self.beat_length)
    }

    /// slider velocity multiplier for this section, 1.0 for uninherited points
    pub fn slider_velocity_multiplier(&self) -> f32 {
        if !self.inherited { return 1.0 }
        100.0 / self.beat_length.abs().clamp(10.0, 1000.0)
    }
}
impl FromStr for TimingPoint {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // time,beatLength,meter,sampleSet,sampleIndex,volume,uninherited,effects
        let mut split = line.split(',').map(str::trim);

        let time = split.next().filter(|s| !s.is_empty()).ok_or("missing time")?;
        let time = parse_time(time).ok_or_else(|| format!("bad time '{time}'"))?;

        let beat_length = split.next().ok_or("missing beat length")?;
        let beat_length = beat_length.parse::<f32>().ok().filter(|b| b.is_finite()).ok_or_else(|| format!("bad beat length '{beat_length}'"))?;

        macro_rules! read_val {
            ($split:expr, $default:expr) => {
                match $split.next() {
                    Some(s) => s.parse().map_err(|_| format!("bad value '{s}'"))?,
                    None => $default,
                }
            };
        }

        let meter = read_val!(split, 4);
        let sample_set = read_val!(split, 0);
        let sample_index = read_val!(split, 0);
        let volume = read_val!(split, 100);
        let inherited = match split.next() {
            Some("0") => true,
            Some("1") => false,
            Some(other) => return Err(format!("bad uninherited flag '{other}'")),
            None => beat_length < 0.0,
        };
        let effects: u8 = read_val!(split, 0);

        Ok(Self {
            time,
            beat_length,
            meter,
            sample_set,
            sample_index,
            volume,
            inherited,
            kiai: effects & 1 == 1,
        })
    }
}

/// osu times are ints, but some exporters write decimals
pub(super) fn parse_time(s: &str) -> Option<i32> {
    s.parse::<i32>().ok().or_else(|| {
        s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i32)
    })
}


/// timing points in authored order, plus an offset index for lookups.
/// points sharing an offset keep their file order, so the last one written wins
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct TimingPoints {
    points: Vec<TimingPoint>,
    #[serde(skip)]
    by_offset: Vec<usize>,
}
impl TimingPoints {
    pub fn new(points: Vec<TimingPoint>) -> Self {
        let mut by_offset = (0..points.len()).collect::<Vec<_>>();
        // sort_by_key is stable
        by_offset.sort_by_key(|i| points[*i].time);
        Self { points, by_offset }
    }

    /// in file order
    pub fn iter(&self) -> impl Iterator<Item = &TimingPoint> {
        self.points.iter()
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// in offset order
    pub fn iter_by_offset(&self) -> impl Iterator<Item = &TimingPoint> {
        self.by_offset.iter().map(|i| &self.points[*i])
    }

    /// the point in effect at `time`. before the first point, the first point applies
    pub fn timing_point_at(&self, time: i32) -> Option<&TimingPoint> {
        let i = self.by_offset.partition_point(|i| self.points[*i].time <= time);
        let i = i.max(1) - 1;
        self.by_offset.get(i).map(|i| &self.points[*i])
    }

    /// beat length of the uninherited point in effect at `time`
    pub fn beat_length_at(&self, time: i32) -> f32 {
        let mut uninherited = self.iter_by_offset().filter(|p| !p.inherited);
        let Some(first) = uninherited.next() else { return DEFAULT_BEAT_LENGTH };

        let mut current = first;
        for p in uninherited {
            if p.time > time { break }
            current = p;
        }
        current.beat_length
    }

    pub fn slider_velocity_at(&self, time: i32) -> f32 {
        self.timing_point_at(time)
            .map(TimingPoint::slider_velocity_multiplier)
            .unwrap_or(1.0)
    }

    /// (min, max) bpm over uninherited points
    pub fn bpm_range(&self) -> Option<(f32, f32)> {
        self.points
            .iter()
            .filter_map(TimingPoint::bpm)
            .fold(None, |range, bpm| match range {
                None => Some((bpm, bpm)),
                Some((min, max)) => Some((f32::min(min, bpm), f32::max(max, bpm))),
            })
    }
}


#[allow(unused)]
mod timing_point_tests {
    use crate::prelude::*;

    fn tp(line: &str) -> TimingPoint {
        line.parse().unwrap()
    }

    #[test]
    fn full_layout() {
        let p = tp("1000,333.33,4,2,1,60,1,1");
        assert_eq!(p.time, 1000);
        assert_eq!(p.sample_set, 2);
        assert_eq!(p.volume, 60);
        assert!(!p.inherited);
        assert!(p.kiai);
        assert!((p.bpm().unwrap() - 180.0).abs() < 0.01);
    }

    #[test]
    fn short_layout_uses_defaults() {
        let p = tp("500,-50");
        assert_eq!(p.meter, 4);
        assert_eq!(p.volume, 100);
        assert!(p.inherited);
        assert!(!p.kiai);
        assert_eq!(p.bpm(), None);
        assert_eq!(p.slider_velocity_multiplier(), 2.0);
    }

    #[test]
    fn bad_lines_are_rejected() {
        assert!("".parse::<TimingPoint>().is_err());
        assert!("100".parse::<TimingPoint>().is_err());
        assert!("100,abc".parse::<TimingPoint>().is_err());
        assert!("100,500,4,0,0,100,2,0".parse::<TimingPoint>().is_err());
    }

    #[test]
    fn lookups_keep_authored_order() {
        // authored out of order, with two points on the same offset
        let points = TimingPoints::new(vec![
            tp("2000,250,4,0,0,100,1,0"),
            tp("0,500,4,0,0,100,1,0"),
            tp("2000,-50,4,0,0,100,0,0"),
        ]);

        assert_eq!(points.iter().next().map(|p| p.time), Some(2000));
        assert_eq!(points.iter_by_offset().map(|p| p.time).collect::<Vec<_>>(), vec![0, 2000, 2000]);

        assert_eq!(points.timing_point_at(-100).map(|p| p.time), Some(0));
        assert_eq!(points.beat_length_at(1000), 500.0);
        assert_eq!(points.slider_velocity_at(1000), 1.0);

        // last write wins
        assert!(points.timing_point_at(2000).unwrap().inherited);
        assert_eq!(points.slider_velocity_at(2500), 2.0);
        assert_eq!(points.beat_length_at(2500), 250.0);

        assert_eq!(points.bpm_range(), Some((120.0, 240.0)));
    }

    #[test]
    fn empty_lookups() {
        let points = TimingPoints::default();
        assert!(points.timing_point_at(0).is_none());
        assert_eq!(points.beat_length_at(0), DEFAULT_BEAT_LENGTH);
        assert_eq!(points.slider_velocity_at(0), 1.0);
        assert_eq!(points.bpm_range(), None);
    }
}
