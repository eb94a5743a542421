use crate::prelude::*;
use super::timing_point::parse_time;

// type bits
const CIRCLE: u32 = 1;
const SLIDER: u32 = 2;
const NEW_COMBO: u32 = 4;
const SPINNER: u32 = 8;


#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitObjectError {
    /// wrong field count or a field that doesnt parse
    Malformed(String),
    /// type code with no circle/slider/spinner bit
    UnknownType(u32),
}
impl From<String> for HitObjectError {
    fn from(s: String) -> Self { Self::Malformed(s) }
}
impl From<&str> for HitObjectError {
    fn from(s: &str) -> Self { Self::Malformed(s.to_owned()) }
}


/// `set:addition` pair, as used by slider edges
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Sampling {
    pub sample_set: u8,
    pub sample_set_addition: u8,
}
impl Sampling {
    fn from_str(s: &str) -> Self {
        let mut split = s.split(':');
        Self {
            sample_set: split.next().unwrap_or("0").trim().parse().unwrap_or(0),
            sample_set_addition: split.next().unwrap_or("0").trim().parse().unwrap_or(0),
        }
    }
}


#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HitSamples {
    // Hit sample syntax: normalSet:additionSet:index:volume:filename

    /// Sample set of the normal sound.
    pub normal_set: u8,
    /// Sample set of the whistle, finish, and clap sounds.
    pub addition_set: u8,
    /// Index of the sample. If this is 0, the timing point's sample index will be used instead.
    pub index: u8,
    /// Volume of the sample from 1 to 100. If this is 0, the timing point's volume will be used instead.
    pub volume: u8,
    /// Custom filename of the addition sound.
    pub filename: Option<String>
}
impl HitSamples {
    pub fn from_str(raw: Option<&str>) -> Self {
        let Some(raw) = raw else { return Self::default() };

        macro_rules! read_val {
            ($split:expr) => {
                $split.next().unwrap_or("0").trim().parse().unwrap_or(0)
            };
        }

        let mut split = raw.split(':');
        Self {
            normal_set: read_val!(split),
            addition_set: read_val!(split),
            index: read_val!(split),
            volume: read_val!(split),
            filename: split.next().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned),
        }
    }

    pub fn sampling(&self) -> Sampling {
        Sampling {
            sample_set: self.normal_set,
            sample_set_addition: self.addition_set,
        }
    }
}


#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CircleDef {
    /// position in osu pixels
    pub x: i32,
    pub y: i32,
    pub time: i32,
    pub new_combo: bool,
    /// bit flags (0 = normal, 2 = whistle, 4 = finish, 8 = clap)
    pub hitsound: u8,
    pub hitsamples: HitSamples,
}

#[derive(Clone, Debug, Serialize)]
pub struct SliderDef {
    pub x: i32,
    pub y: i32,
    pub time: i32,
    pub new_combo: bool,
    pub hitsound: u8,

    /// compiled path, holds the repeat count and authored length too
    pub path: CompiledPath,

    /// hitsound for every edge (head, repeats, tail). only present on long-form sliders
    pub edge_hitsounds: Option<Vec<u8>>,
    pub edge_samplings: Option<Vec<Sampling>>,
    /// sampling of the slider body
    pub hitsamples: HitSamples,
}
impl SliderDef {
    pub fn repeat_count(&self) -> u32 { self.path.repeat_count }
    pub fn pixel_length(&self) -> f32 { self.path.pixel_length }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpinnerDef {
    pub x: i32,
    pub y: i32,
    pub time: i32,
    pub end_time: i32,
    pub new_combo: bool,
    pub hitsound: u8,
    pub hitsamples: HitSamples,
}


#[derive(Clone, Debug, Serialize)]
pub enum HitObject {
    Circle(CircleDef),
    Slider(SliderDef),
    Spinner(SpinnerDef),
}
impl HitObject {
    pub fn time(&self) -> i32 {
        match self {
            Self::Circle(c) => c.time,
            Self::Slider(s) => s.time,
            Self::Spinner(s) => s.time,
        }
    }

    pub fn pos(&self) -> Vector2 {
        let (x, y) = match self {
            Self::Circle(c) => (c.x, c.y),
            Self::Slider(s) => (s.x, s.y),
            Self::Spinner(s) => (s.x, s.y),
        };
        Vector2::from((x, y))
    }

    pub fn new_combo(&self) -> bool {
        match self {
            Self::Circle(c) => c.new_combo,
            Self::Slider(s) => s.new_combo,
            Self::Spinner(s) => s.new_combo,
        }
    }

    pub fn is_slider(&self) -> bool { matches!(self, Self::Slider(_)) }
    pub fn is_spinner(&self) -> bool { matches!(self, Self::Spinner(_)) }

    /// decode one `[HitObjects]` line.
    /// x,y,time,type,hitSound,objectParams,hitSample
    pub fn decode(line: &str, slider_detail_level: u32) -> Result<Self, HitObjectError> {
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        if fields.len() < 5 {
            return Err(HitObjectError::Malformed(format!("expected at least 5 fields, got {}", fields.len())));
        }

        let x = parse_coord(fields[0])?;
        let y = parse_coord(fields[1])?;
        let time = parse_time(fields[2]).ok_or_else(|| format!("bad time '{}'", fields[2]))?;
        let read_type = fields[3].parse::<u32>().map_err(|_| format!("bad type '{}'", fields[3]))?;
        let hitsound = fields[4].parse::<u8>().map_err(|_| format!("bad hitsound '{}'", fields[4]))?;

        // read type:
        // abcdefgh
        // a = note
        // b = slider
        // c = new combo
        // g = spinner
        // anything else set (combo colour skips, mania holds) is not a type we load
        let new_combo = read_type & NEW_COMBO > 0;
        let kind = read_type & !NEW_COMBO;

        let params = &fields[5..];
        match kind {
            CIRCLE => Ok(Self::Circle(CircleDef {
                x, y, time,
                new_combo,
                hitsound,
                hitsamples: HitSamples::from_str(params.first().copied()),
            })),

            SLIDER => {
                // curveType|curvePoints,slides,length,edgeSounds,edgeSets,hitSample
                let curve_raw = params.first().ok_or("missing slider path")?;
                let mut curve = curve_raw.split('|');
                let curve_type = CurveType::from_tag(curve.next().unwrap_or_default()).map_err(|e| e.to_string())?;
                let curve_points = curve.map(parse_point).collect::<Result<Vec<_>, _>>()?;

                let slides = params.get(1).ok_or("missing slide count")?;
                let slides = slides.parse::<u32>().map_err(|_| format!("bad slide count '{slides}'"))?;
                let length = match params.get(2) {
                    Some(l) => l.parse::<f32>().map_err(|_| format!("bad slider length '{l}'"))?,
                    None => 0.0,
                };

                let path = CompiledPath::compile_with_detail(Vector2::from((x, y)), curve_type, &curve_points, slides, length, slider_detail_level)
                    .map_err(|e| format!("bad slider path: {e}"))?;

                // the edge and body samples come as a block, or not at all
                let (edge_hitsounds, edge_samplings, hitsamples) = match params.get(3) {
                    None => (None, None, HitSamples::default()),
                    Some(edge_sounds) => {
                        let edge_hitsounds: Vec<u8> = edge_sounds
                            .split('|')
                            .map(|s| s.trim().parse::<u8>().unwrap_or(hitsound))
                            .collect();
                        let edge_samplings: Vec<Sampling> = params
                            .get(4)
                            .map(|sets| sets.split('|').map(Sampling::from_str).collect())
                            .unwrap_or_default();

                        (Some(edge_hitsounds), Some(edge_samplings), HitSamples::from_str(params.get(5).copied()))
                    }
                };

                Ok(Self::Slider(SliderDef {
                    x, y, time,
                    new_combo,
                    hitsound,
                    path,
                    edge_hitsounds,
                    edge_samplings,
                    hitsamples,
                }))
            }

            SPINNER => {
                // endTime,hitSample
                let end_time = params.first().ok_or("missing spinner end time")?;
                let end_time = parse_time(end_time).ok_or_else(|| format!("bad spinner end time '{end_time}'"))?;

                Ok(Self::Spinner(SpinnerDef {
                    x, y, time,
                    end_time,
                    new_combo,
                    hitsound,
                    hitsamples: HitSamples::from_str(params.get(1).copied()),
                }))
            }

            _ => Err(HitObjectError::UnknownType(read_type)),
        }
    }
}

fn parse_coord(s: &str) -> Result<i32, String> {
    parse_time(s).ok_or_else(|| format!("bad coordinate '{s}'"))
}

fn parse_point(s: &str) -> Result<Vector2, String> {
    let (x, y) = s.split_once(':').ok_or_else(|| format!("bad curve point '{s}'"))?;
    match (x.trim().parse::<f32>(), y.trim().parse::<f32>()) {
        (Ok(x), Ok(y)) if x.is_finite() && y.is_finite() => Ok(Vector2::new(x, y)),
        _ => Err(format!("bad curve point '{s}'")),
    }
}


#[allow(unused)]
mod hitobject_tests {
    use crate::prelude::*;

    fn decode(line: &str) -> Result<HitObject, HitObjectError> {
        HitObject::decode(line, SLIDER_DETAIL_LEVEL)
    }

    #[test]
    fn circle() {
        let Ok(HitObject::Circle(c)) = decode("256,192,1000,5,2,1:2:3:70:clap.wav") else { panic!("expected a circle") };
        assert_eq!((c.x, c.y, c.time), (256, 192, 1000));
        assert!(c.new_combo);
        assert_eq!(c.hitsound, 2);
        assert_eq!(c.hitsamples.sampling(), Sampling { sample_set: 1, sample_set_addition: 2 });
        assert_eq!(c.hitsamples.volume, 70);
        assert_eq!(c.hitsamples.filename.as_deref(), Some("clap.wav"));
    }

    #[test]
    fn circle_without_samples() {
        let Ok(HitObject::Circle(c)) = decode("10,20,30,1,0") else { panic!("expected a circle") };
        assert_eq!(c.hitsamples, HitSamples::default());
    }

    #[test]
    fn only_the_six_type_codes_load() {
        let kinds = [1, 5, 2, 6, 8, 12].map(|code| {
            let line = match code {
                2 | 6 => format!("0,0,0,{code},0,L|100:0,1,100"),
                8 | 12 => format!("0,0,0,{code},0,500"),
                _ => format!("0,0,0,{code},0"),
            };
            decode(&line).map(|o| (o.is_slider(), o.is_spinner(), o.new_combo()))
        });
        assert_eq!(kinds, [
            Ok((false, false, false)),
            Ok((false, false, true)),
            Ok((true, false, false)),
            Ok((true, false, true)),
            Ok((false, true, false)),
            Ok((false, true, true)),
        ]);

        // colour skip bits, and more than one kind bit
        for code in [21, 37, 70, 3, 9, 13, 15] {
            assert_eq!(decode(&format!("0,0,0,{code},0,500")).err(), Some(HitObjectError::UnknownType(code)));
        }
    }

    #[test]
    fn short_form_slider() {
        let Ok(HitObject::Slider(s)) = decode("100,100,500,2,0,L|200:100,1,100") else { panic!("expected a slider") };
        assert_eq!(s.repeat_count(), 1);
        assert_eq!(s.pixel_length(), 100.0);
        assert!(s.edge_hitsounds.is_none());
        assert!(s.edge_samplings.is_none());
        assert_eq!(s.hitsamples, HitSamples::default());
        assert!(s.path.end_point().distance(Vector2::new(200.0, 100.0)) < 0.01);
    }

    #[test]
    fn long_form_slider() {
        let line = "100,100,500,6,0,B|150:150|200:100,2,140,2|0|8,1:2|0:0|2:0,1:0:0:0:";
        let Ok(HitObject::Slider(s)) = decode(line) else { panic!("expected a slider") };
        assert!(s.new_combo);
        assert_eq!(s.repeat_count(), 2);
        assert_eq!(s.edge_hitsounds, Some(vec![2, 0, 8]));
        assert_eq!(s.edge_samplings.as_ref().map(|e| e.len()), Some(3));
        assert_eq!(s.edge_samplings.as_ref().unwrap()[0], Sampling { sample_set: 1, sample_set_addition: 2 });
        assert_eq!(s.hitsamples.normal_set, 1);
    }

    #[test]
    fn spinner() {
        let Ok(HitObject::Spinner(s)) = decode("256,192,1000,12,0,3000,0:0:0:0:") else { panic!("expected a spinner") };
        assert_eq!(s.end_time, 3000);
        assert!(s.new_combo);
    }

    #[test]
    fn bad_lines() {
        assert!(matches!(decode("256,192,1000"), Err(HitObjectError::Malformed(_))));
        assert!(matches!(decode("a,192,1000,1,0"), Err(HitObjectError::Malformed(_))));
        assert!(matches!(decode("256,192,1000,8,0"), Err(HitObjectError::Malformed(_))));
        assert!(matches!(decode("256,192,1000,2,0,B|x:y,1,100"), Err(HitObjectError::Malformed(_))));
        assert!(matches!(decode("256,192,1000,2,0,B,1,100"), Err(HitObjectError::Malformed(_))));
        assert!(matches!(decode("256,192,1000,2,0,X|300:192,1,100"), Err(HitObjectError::Malformed(_))));
        assert_eq!(decode("256,192,1000,128,0,2000:0:0:0:0:").err(), Some(HitObjectError::UnknownType(128)));
        assert_eq!(decode("256,192,1000,0,0").err(), Some(HitObjectError::UnknownType(0)));
    }
}
