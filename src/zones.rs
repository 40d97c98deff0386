use serde::{Deserialize, Serialize};

use crate::models::AthleteProfile;

/// Lower and upper fractions of heart rate reserve for each of the five zones
const KARVONEN_FRACTIONS: [(f64, f64); 5] = [
    (0.50, 0.60),
    (0.60, 0.70),
    (0.70, 0.80),
    (0.80, 0.90),
    (0.90, 1.00),
];

/// Five-zone heart rate model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrZone {
    Recovery,
    Aerobic,
    Tempo,
    Threshold,
    Maximum,
}

impl HrZone {
    pub const ALL: [HrZone; 5] = [
        HrZone::Recovery,
        HrZone::Aerobic,
        HrZone::Tempo,
        HrZone::Threshold,
        HrZone::Maximum,
    ];

    /// 1-based zone number
    pub fn number(&self) -> u8 {
        match self {
            HrZone::Recovery => 1,
            HrZone::Aerobic => 2,
            HrZone::Tempo => 3,
            HrZone::Threshold => 4,
            HrZone::Maximum => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HrZone::Recovery => "Recovery",
            HrZone::Aerobic => "Aerobic",
            HrZone::Tempo => "Tempo",
            HrZone::Threshold => "Threshold",
            HrZone::Maximum => "Maximum",
        }
    }

    /// What training in this zone develops
    pub fn training_effect(&self) -> &'static str {
        match self {
            HrZone::Recovery => "Active recovery and warm-up",
            HrZone::Aerobic => "Builds aerobic base and fat metabolism",
            HrZone::Tempo => "Improves aerobic capacity and efficiency",
            HrZone::Threshold => "Raises lactate threshold",
            HrZone::Maximum => "Develops VO2 max and top-end speed",
        }
    }

    fn index(&self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl std::fmt::Display for HrZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z{} {}", self.number(), self.name())
    }
}

/// Inclusive bpm range of one zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrZoneRange {
    pub zone: HrZone,
    pub min_hr: f64,
    pub max_hr: f64,
}

impl HrZoneRange {
    pub fn contains(&self, hr: f64) -> bool {
        hr >= self.min_hr && hr <= self.max_hr
    }
}

/// Karvonen heart rate zones for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZones {
    pub ranges: [HrZoneRange; 5],
}

impl HeartRateZones {
    /// Determine which zone a heart rate falls into.
    ///
    /// Never fails: anything above zone 5 is zone 5, anything else that
    /// matches no range (including below zone 1) is zone 1.
    pub fn zone_for(&self, hr: f64) -> HrZone {
        if let Some(range) = self.ranges.iter().find(|range| range.contains(hr)) {
            return range.zone;
        }
        if hr > self.ranges[4].max_hr {
            HrZone::Maximum
        } else {
            HrZone::Recovery
        }
    }

    pub fn range(&self, zone: HrZone) -> &HrZoneRange {
        &self.ranges[zone.index()]
    }
}

/// Zone calculation utilities
pub struct ZoneCalculator;

impl ZoneCalculator {
    /// Calculate heart rate zones with the Karvonen (heart rate reserve) method
    ///
    /// Boundaries are `round(resting + HRR * fraction)`:
    /// - Z1: 50-60% HRR (Recovery)
    /// - Z2: 60-70% HRR (Aerobic)
    /// - Z3: 70-80% HRR (Tempo)
    /// - Z4: 80-90% HRR (Threshold)
    /// - Z5: 90-100% HRR (Maximum)
    pub fn karvonen_zones(max_hr: f64, resting_hr: f64) -> HeartRateZones {
        let hr_reserve = max_hr - resting_hr;
        let boundary = |fraction: f64| (resting_hr + hr_reserve * fraction).round();

        let ranges = HrZone::ALL.map(|zone| {
            let (low, high) = KARVONEN_FRACTIONS[zone.index()];
            HrZoneRange {
                zone,
                min_hr: boundary(low),
                max_hr: boundary(high),
            }
        });

        HeartRateZones { ranges }
    }

    /// Karvonen zones for a resolved athlete profile
    pub fn heart_rate_zones(profile: &AthleteProfile) -> HeartRateZones {
        Self::karvonen_zones(profile.max_hr, profile.resting_hr)
    }
}
