/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

///! stateless occupational heat/freeze classification tables

use crate::models::HeatGuidance;

pub const LIGHTNING_NOTE: &str = "Cease outdoor work when thunder is heard; resume 30 min after last lightning.";

pub struct HeatBand {
    pub name: &'static str,
    pub threshold_f: f64,
    pub guidance: HeatGuidance,
}

/// descending threshold order, first hit wins
pub static HEAT_BANDS: [HeatBand; 4] = [
    HeatBand {
        name: "Extreme Danger",
        threshold_f: 125.0,
        guidance: HeatGuidance {
            continuous_heavy_work_min: "0",
            hydration_cups_per_min: "≥1/10",
            work_rest_min: "10/20/10",
            supervisor_assessments_per_hr: "4",
            radio_checkins: "q15m",
        },
    },
    HeatBand {
        name: "Danger",
        threshold_f: 100.0,
        guidance: HeatGuidance {
            continuous_heavy_work_min: "10",
            hydration_cups_per_min: "1/10–15",
            work_rest_min: "20/30/10",
            supervisor_assessments_per_hr: "2",
            radio_checkins: "q30m",
        },
    },
    HeatBand {
        name: "Extreme Caution",
        threshold_f: 90.0,
        guidance: HeatGuidance {
            continuous_heavy_work_min: "15",
            hydration_cups_per_min: "1/15–20",
            work_rest_min: "30/40/10",
            supervisor_assessments_per_hr: "1",
            radio_checkins: "start+q1h",
        },
    },
    HeatBand {
        name: "Caution",
        threshold_f: 80.0,
        guidance: HeatGuidance {
            continuous_heavy_work_min: "30",
            hydration_cups_per_min: "1/20",
            work_rest_min: "Normal",
            supervisor_assessments_per_hr: "0 (periodic)",
            radio_checkins: "start+q2h",
        },
    },
];

pub static DEFAULT_HEAT_GUIDANCE: HeatGuidance = HeatGuidance {
    continuous_heavy_work_min: "Normal",
    hydration_cups_per_min: "Baseline",
    work_rest_min: "Normal",
    supervisor_assessments_per_hr: "0",
    radio_checkins: "start",
};

pub fn classify_heat (high_f: Option<f64>)->(Option<&'static str>, HeatGuidance) {
    if let Some(high) = high_f {
        for band in &HEAT_BANDS {
            if high >= band.threshold_f {
                return (Some(band.name), band.guidance.clone())
            }
        }
    }
    (None, DEFAULT_HEAT_GUIDANCE.clone())
}

const FROST_GUIDANCE: &str = "Cover exposed sensors; monitor slick surfaces; plan extra footing checks.";
const FREEZE_GUIDANCE: &str = "Limit time on elevated surfaces; stage warm shelters; confirm cold-weather PPE/buddy checks.";
const HARD_FREEZE_GUIDANCE: &str = "Pause non-essential outdoor handling; enforce short outdoor rotations; keep warming shelter within reach.";
const WIND_CHILL_SUFFIX: &str = " Wind-chill risk: add face/hand protection.";

pub fn classify_freeze (low_f: Option<f64>, breezy: bool)->(Option<&'static str>, Option<String>) {
    let low = match low_f {
        Some(low) => low,
        None => return (None, None)
    };

    let (badge, guidance) = if low <= 28.0 {
        ("Hard Freeze", HARD_FREEZE_GUIDANCE)
    } else if low <= 32.0 {
        ("Freeze", FREEZE_GUIDANCE)
    } else if low <= 36.0 {
        ("Frost", FROST_GUIDANCE)
    } else {
        return (None, None)
    };

    let mut guidance = guidance.to_string();
    if breezy && low <= 32.0 {
        guidance.push_str(WIND_CHILL_SUFFIX);
    }
    (Some(badge), Some(guidance))
}
