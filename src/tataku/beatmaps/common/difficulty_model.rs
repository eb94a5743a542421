use crate::prelude::*;

/// base circle diameter in osu pixels at cs 5
pub const CIRCLE_DIAMETER_BASE:f32 = 64.0;

/// scored accuracy category for a single hit
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Judgement {
    Miss,
    X50,
    X100,
    X300,
}
impl Judgement {
    /// windows are checked in this order, tightest first
    pub const HIT_ORDER: [Judgement; 3] = [Judgement::X300, Judgement::X100, Judgement::X50];

    pub fn score(&self) -> u16 {
        match self {
            Self::X300 => 300,
            Self::X100 => 100,
            Self::X50 => 50,
            Self::Miss => 0,
        }
    }
}
impl TryFrom<u16> for Judgement {
    type Error = DifficultyError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            300 => Ok(Self::X300),
            100 => Ok(Self::X100),
            50 => Ok(Self::X50),
            0 => Ok(Self::Miss),
            other => Err(DifficultyError::InvalidJudgement(other)),
        }
    }
}


/// the authored difficulty knobs of a map, and everything derived from them.
///
/// every derived value exists both as an associated fn taking the raw value
/// (for mods, previews, editors) and as a method reading the stored value.
/// the method always defers to the associated fn so both agree exactly.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyModel {
    pub stack_leniency: f32,
    /// `SliderMultiplier`, in hundreds of osu pixels per beat
    pub slider_velocity: f32,
    pub slider_tick_rate: f32,
    pub approach_rate: f32,
    pub hp_drain: f32,
    pub overall_difficulty: f32,
    pub circle_size: f32,
}
impl Default for DifficultyModel {
    fn default() -> Self {
        Self {
            stack_leniency: 0.5,
            slider_velocity: 1.4,
            slider_tick_rate: 1.0,
            approach_rate: 5.0,
            hp_drain: 5.0,
            overall_difficulty: 5.0,
            circle_size: 5.0,
        }
    }
}

// value-parameterized forms
impl DifficultyModel {
    /// how long before its hit time an object starts fading in.
    /// the slope changes at ar 5, this is intentional
    pub fn approach_time_ms(ar: f32) -> f32 {
        if ar <= 5.0 {
            1800.0 - 120.0 * ar
        } else {
            1950.0 - 150.0 * ar
        }
    }

    pub fn circle_pixel_diameter(cs: f32) -> f32 {
        CIRCLE_DIAMETER_BASE * (1.0 - 0.7 * (cs - 5.0) / 5.0)
    }

    /// half-width of the timing window for `judgement` (300, 100 or 50)
    pub fn hit_window_ms(od: f32, judgement: u16) -> Result<f32, DifficultyError> {
        match judgement {
            300 => Ok((79.5 - 6.0 * od).ceil()),
            100 => Ok((139.5 - 8.0 * od).ceil()),
            50 => Ok((199.5 - 10.0 * od).ceil()),
            other => Err(DifficultyError::InvalidJudgement(other)),
        }
    }

    /// best judgement whose window contains `abs_delta_ms`. window edges count as inside
    pub fn judgement_for_delta(od: f32, abs_delta_ms: f32) -> Judgement {
        let abs_delta_ms = abs_delta_ms.abs();

        for judgement in Judgement::HIT_ORDER {
            match Self::hit_window_ms(od, judgement.score()) {
                Ok(window) if window >= abs_delta_ms => return judgement,
                _ => {}
            }
        }

        Judgement::Miss
    }
}

// instance forms
impl DifficultyModel {
    pub fn approach_time(&self) -> f32 {
        Self::approach_time_ms(self.approach_rate)
    }

    pub fn circle_diameter(&self) -> f32 {
        Self::circle_pixel_diameter(self.circle_size)
    }

    pub fn circle_radius(&self) -> f32 {
        self.circle_diameter() / 2.0
    }

    pub fn hit_window(&self, judgement: u16) -> Result<f32, DifficultyError> {
        Self::hit_window_ms(self.overall_difficulty, judgement)
    }

    pub fn judgement_for(&self, abs_delta_ms: f32) -> Judgement {
        Self::judgement_for_delta(self.overall_difficulty, abs_delta_ms)
    }

    /// objects closer in time than this (and close in space) get stacked
    pub fn stack_threshold(&self) -> f32 {
        self.approach_time() * self.stack_leniency
    }
}


#[allow(unused)]
mod difficulty_tests {
    use crate::prelude::*;

    fn steps(from: f32, to: f32, step: f32) -> impl Iterator<Item = f32> {
        let count = ((to - from) / step).round() as usize;
        (0..=count).map(move |i| from + i as f32 * step)
    }

    #[test]
    fn approach_time_breakpoint() {
        assert_eq!(DifficultyModel::approach_time_ms(0.0), 1800.0);
        assert_eq!(DifficultyModel::approach_time_ms(5.0), 1200.0);
        assert_eq!(DifficultyModel::approach_time_ms(9.0), 600.0);
        assert_eq!(DifficultyModel::approach_time_ms(10.0), 450.0);

        // just past the breakpoint uses the steeper slope
        assert_eq!(DifficultyModel::approach_time_ms(6.0), 1050.0);
    }

    #[test]
    fn approach_time_strictly_decreasing() {
        let mut last = f32::INFINITY;
        for ar in steps(0.0, 10.0, 0.1) {
            let time = DifficultyModel::approach_time_ms(ar);
            assert!(time < last, "ar {ar} gave {time}, previous was {last}");
            last = time;
        }
    }

    #[test]
    fn out_of_range_values_still_compute() {
        assert_eq!(DifficultyModel::approach_time_ms(11.0), 300.0);
        assert_eq!(DifficultyModel::approach_time_ms(-1.0), 1920.0);
        assert_eq!(DifficultyModel::circle_pixel_diameter(5.0), 64.0);
        assert!(DifficultyModel::circle_pixel_diameter(13.0) < 0.0);
    }

    #[test]
    fn hit_windows() {
        assert_eq!(DifficultyModel::hit_window_ms(5.0, 300), Ok(50.0));
        assert_eq!(DifficultyModel::hit_window_ms(5.0, 100), Ok(100.0));
        assert_eq!(DifficultyModel::hit_window_ms(5.0, 50), Ok(150.0));
        assert_eq!(DifficultyModel::hit_window_ms(10.0, 300), Ok(20.0));
        assert_eq!(DifficultyModel::hit_window_ms(5.0, 200), Err(DifficultyError::InvalidJudgement(200)));
        assert_eq!(DifficultyModel::hit_window_ms(5.0, 0), Err(DifficultyError::InvalidJudgement(0)));
    }

    #[test]
    fn hit_windows_nest() {
        for od in steps(0.0, 10.0, 0.25) {
            let w300 = DifficultyModel::hit_window_ms(od, 300).unwrap();
            let w100 = DifficultyModel::hit_window_ms(od, 100).unwrap();
            let w50 = DifficultyModel::hit_window_ms(od, 50).unwrap();
            assert!(w300 < w100 && w100 < w50, "od {od}: {w300} {w100} {w50}");
        }
    }

    #[test]
    fn judgement_boundary_is_inclusive() {
        for od in steps(0.0, 10.0, 0.5) {
            let w300 = DifficultyModel::hit_window_ms(od, 300).unwrap();
            let w100 = DifficultyModel::hit_window_ms(od, 100).unwrap();
            let w50 = DifficultyModel::hit_window_ms(od, 50).unwrap();

            assert_eq!(DifficultyModel::judgement_for_delta(od, w300), Judgement::X300);
            assert_eq!(DifficultyModel::judgement_for_delta(od, w300 + 1.0), Judgement::X100);
            assert_eq!(DifficultyModel::judgement_for_delta(od, w100), Judgement::X100);
            assert_eq!(DifficultyModel::judgement_for_delta(od, w50), Judgement::X50);
            assert_eq!(DifficultyModel::judgement_for_delta(od, w50 + 0.5), Judgement::Miss);
        }

        // early hits are judged the same as late ones
        assert_eq!(DifficultyModel::judgement_for_delta(5.0, -50.0), Judgement::X300);
    }

    #[test]
    fn instance_and_static_forms_agree() {
        for value in steps(-2.0, 12.0, 0.35) {
            let diff = DifficultyModel {
                approach_rate: value,
                circle_size: value,
                overall_difficulty: value,
                ..Default::default()
            };

            assert_eq!(diff.approach_time().to_bits(), DifficultyModel::approach_time_ms(value).to_bits());
            assert_eq!(diff.circle_diameter().to_bits(), DifficultyModel::circle_pixel_diameter(value).to_bits());
            for judgement in [300, 100, 50] {
                assert_eq!(
                    diff.hit_window(judgement).unwrap().to_bits(),
                    DifficultyModel::hit_window_ms(value, judgement).unwrap().to_bits()
                );
            }
            for delta in [0.0, 25.0, 79.0, 140.0, 500.0] {
                assert_eq!(diff.judgement_for(delta), DifficultyModel::judgement_for_delta(value, delta));
            }
        }
    }

    #[test]
    fn stack_threshold_scales_with_leniency() {
        let mut diff = DifficultyModel::default();
        diff.approach_rate = 9.0;
        diff.stack_leniency = 0.5;
        assert_eq!(diff.stack_threshold(), 300.0);
    }

    #[test]
    fn judgement_scores() {
        assert_eq!(Judgement::try_from(300), Ok(Judgement::X300));
        assert_eq!(Judgement::try_from(0), Ok(Judgement::Miss));
        assert!(Judgement::try_from(150).is_err());
        assert_eq!(Judgement::X50.score(), 50);
    }
}
