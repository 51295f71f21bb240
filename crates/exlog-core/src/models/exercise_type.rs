//! Exercise type model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of exercise categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
    #[default]
    OtherWorkout,
    Badminton,
    Baseball,
    Basketball,
    Biking,
    BikingStationary,
    BootCamp,
    Boxing,
    Calisthenics,
    Dancing,
    Elliptical,
    ExerciseClass,
    Golf,
    HighIntensityIntervalTraining,
    Hiking,
    MartialArts,
    Pilates,
    RockClimbing,
    Rowing,
    RowingMachine,
    Running,
    RunningTreadmill,
    Skiing,
    Soccer,
    StairClimbing,
    StrengthTraining,
    Stretching,
    SwimmingOpenWater,
    SwimmingPool,
    TableTennis,
    Tennis,
    Volleyball,
    Walking,
    Weightlifting,
    Yoga,
}

impl ExerciseType {
    /// Every variant, in display order
    pub const ALL: [Self; 35] = [
        Self::OtherWorkout,
        Self::Badminton,
        Self::Baseball,
        Self::Basketball,
        Self::Biking,
        Self::BikingStationary,
        Self::BootCamp,
        Self::Boxing,
        Self::Calisthenics,
        Self::Dancing,
        Self::Elliptical,
        Self::ExerciseClass,
        Self::Golf,
        Self::HighIntensityIntervalTraining,
        Self::Hiking,
        Self::MartialArts,
        Self::Pilates,
        Self::RockClimbing,
        Self::Rowing,
        Self::RowingMachine,
        Self::Running,
        Self::RunningTreadmill,
        Self::Skiing,
        Self::Soccer,
        Self::StairClimbing,
        Self::StrengthTraining,
        Self::Stretching,
        Self::SwimmingOpenWater,
        Self::SwimmingPool,
        Self::TableTennis,
        Self::Tennis,
        Self::Volleyball,
        Self::Walking,
        Self::Weightlifting,
        Self::Yoga,
    ];

    /// Map a health platform exercise-type code to a variant.
    ///
    /// Unknown codes fall back to [`ExerciseType::OtherWorkout`].
    #[must_use]
    pub const fn from_platform_code(code: i32) -> Self {
        match code {
            2 => Self::Badminton,
            4 => Self::Baseball,
            5 => Self::Basketball,
            8 => Self::Biking,
            9 => Self::BikingStationary,
            10 => Self::BootCamp,
            11 => Self::Boxing,
            13 => Self::Calisthenics,
            16 => Self::Dancing,
            25 => Self::Elliptical,
            26 => Self::ExerciseClass,
            32 => Self::Golf,
            36 => Self::HighIntensityIntervalTraining,
            37 => Self::Hiking,
            44 => Self::MartialArts,
            48 => Self::Pilates,
            51 => Self::RockClimbing,
            53 => Self::Rowing,
            54 => Self::RowingMachine,
            56 => Self::Running,
            57 => Self::RunningTreadmill,
            61 => Self::Skiing,
            64 => Self::Soccer,
            68 => Self::StairClimbing,
            70 => Self::StrengthTraining,
            71 => Self::Stretching,
            73 => Self::SwimmingOpenWater,
            74 => Self::SwimmingPool,
            75 => Self::TableTennis,
            76 => Self::Tennis,
            78 => Self::Volleyball,
            79 => Self::Walking,
            81 => Self::Weightlifting,
            83 => Self::Yoga,
            _ => Self::OtherWorkout,
        }
    }

    /// Inverse of [`ExerciseType::from_platform_code`]
    #[must_use]
    pub const fn platform_code(self) -> i32 {
        match self {
            Self::OtherWorkout => 0,
            Self::Badminton => 2,
            Self::Baseball => 4,
            Self::Basketball => 5,
            Self::Biking => 8,
            Self::BikingStationary => 9,
            Self::BootCamp => 10,
            Self::Boxing => 11,
            Self::Calisthenics => 13,
            Self::Dancing => 16,
            Self::Elliptical => 25,
            Self::ExerciseClass => 26,
            Self::Golf => 32,
            Self::HighIntensityIntervalTraining => 36,
            Self::Hiking => 37,
            Self::MartialArts => 44,
            Self::Pilates => 48,
            Self::RockClimbing => 51,
            Self::Rowing => 53,
            Self::RowingMachine => 54,
            Self::Running => 56,
            Self::RunningTreadmill => 57,
            Self::Skiing => 61,
            Self::Soccer => 64,
            Self::StairClimbing => 68,
            Self::StrengthTraining => 70,
            Self::Stretching => 71,
            Self::SwimmingOpenWater => 73,
            Self::SwimmingPool => 74,
            Self::TableTennis => 75,
            Self::Tennis => 76,
            Self::Volleyball => 78,
            Self::Walking => 79,
            Self::Weightlifting => 81,
            Self::Yoga => 83,
        }
    }

    /// Storage name, e.g. `RUNNING`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OtherWorkout => "OTHER_WORKOUT",
            Self::Badminton => "BADMINTON",
            Self::Baseball => "BASEBALL",
            Self::Basketball => "BASKETBALL",
            Self::Biking => "BIKING",
            Self::BikingStationary => "BIKING_STATIONARY",
            Self::BootCamp => "BOOT_CAMP",
            Self::Boxing => "BOXING",
            Self::Calisthenics => "CALISTHENICS",
            Self::Dancing => "DANCING",
            Self::Elliptical => "ELLIPTICAL",
            Self::ExerciseClass => "EXERCISE_CLASS",
            Self::Golf => "GOLF",
            Self::HighIntensityIntervalTraining => "HIGH_INTENSITY_INTERVAL_TRAINING",
            Self::Hiking => "HIKING",
            Self::MartialArts => "MARTIAL_ARTS",
            Self::Pilates => "PILATES",
            Self::RockClimbing => "ROCK_CLIMBING",
            Self::Rowing => "ROWING",
            Self::RowingMachine => "ROWING_MACHINE",
            Self::Running => "RUNNING",
            Self::RunningTreadmill => "RUNNING_TREADMILL",
            Self::Skiing => "SKIING",
            Self::Soccer => "SOCCER",
            Self::StairClimbing => "STAIR_CLIMBING",
            Self::StrengthTraining => "STRENGTH_TRAINING",
            Self::Stretching => "STRETCHING",
            Self::SwimmingOpenWater => "SWIMMING_OPEN_WATER",
            Self::SwimmingPool => "SWIMMING_POOL",
            Self::TableTennis => "TABLE_TENNIS",
            Self::Tennis => "TENNIS",
            Self::Volleyball => "VOLLEYBALL",
            Self::Walking => "WALKING",
            Self::Weightlifting => "WEIGHTLIFTING",
            Self::Yoga => "YOGA",
        }
    }

    /// Human-readable label, e.g. `Strength training`
    #[must_use]
    pub fn label(self) -> String {
        let lower = self.as_str().replace('_', " ").to_lowercase();
        let mut chars = lower.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    /// Accepts storage names case-insensitively, with `-` or spaces for `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown exercise type: {s}"))
    }
}
