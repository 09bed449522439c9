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

#![allow(unused)]

/// classifier table tests
/// run with "cargo test --test test_ehs -- --nocapture"

use wxfuse::ehs::{classify_freeze, classify_heat};

#[test]
fn test_classify_heat_bands() {
    let (cat, guide) = classify_heat( Some(130.0));
    assert_eq!( cat, Some("Extreme Danger"));
    assert_eq!( guide.continuous_heavy_work_min, "0");

    let (cat, guide) = classify_heat( Some(95.0));
    assert_eq!( cat, Some("Extreme Caution"));
    assert_eq!( guide.work_rest_min, "30/40/10");

    let (cat, guide) = classify_heat( Some(85.0));
    assert_eq!( cat, Some("Caution"));
    assert_eq!( guide.work_rest_min, "Normal");

    let (cat, guide) = classify_heat( Some(70.0));
    assert_eq!( cat, None);
    assert_eq!( guide.radio_checkins, "start");

    let (cat, guide) = classify_heat(None);
    assert_eq!( cat, None);
    assert_eq!( guide.hydration_cups_per_min, "Baseline");
}

#[test]
fn test_band_thresholds_are_inclusive() {
    assert_eq!( classify_heat( Some(125.0)).0, Some("Extreme Danger"));
    assert_eq!( classify_heat( Some(100.0)).0, Some("Danger"));
    assert_eq!( classify_heat( Some(90.0)).0, Some("Extreme Caution"));
    assert_eq!( classify_heat( Some(80.0)).0, Some("Caution"));
    assert_eq!( classify_heat( Some(79.9)).0, None);
}

#[test]
fn test_classify_freeze_with_wind() {
    let (badge, note) = classify_freeze( Some(27.0), true);
    assert_eq!( badge, Some("Hard Freeze"));
    assert!( note.unwrap().to_lowercase().contains("wind-chill"));

    let (badge, note) = classify_freeze( Some(40.0), false);
    assert!( badge.is_none() && note.is_none());
}

#[test]
fn test_freeze_badges() {
    assert_eq!( classify_freeze( Some(28.0), false).0, Some("Hard Freeze"));
    assert_eq!( classify_freeze( Some(32.0), false).0, Some("Freeze"));
    assert_eq!( classify_freeze( Some(36.0), false).0, Some("Frost"));
    assert_eq!( classify_freeze( Some(36.1), false).0, None);
    assert_eq!( classify_freeze( None, true).0, None);
}

#[test]
fn test_wind_suffix_only_at_or_below_freezing() {
    // frost band with wind keeps the base guidance
    let (badge, note) = classify_freeze( Some(35.0), true);
    assert_eq!( badge, Some("Frost"));
    assert!( !note.unwrap().contains("Wind-chill"));
}
