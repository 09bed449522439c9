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

///! the cross-source reducer: one DailyEnsemble per (site, day) from any number of
///! per-source daily records. All merges are commutative so record arrival order does
///! not change numeric output

use std::collections::BTreeMap;
use chrono::NaiveDate;

use crate::ehs::{classify_freeze, classify_heat, LIGHTNING_NOTE};
use crate::models::{DailyEnsemble, SourceDailyRecord};

const HIGH_LIMITS: (f64,f64) = (-40.0, 130.0);
const LOW_LIMITS: (f64,f64) = (-60.0, 95.0);

/// fixed dominance order, most hazardous first
pub const PRECIP_PRIORITY: [&str; 8] = [
    "Freezing Rain",
    "Ice Pellets",
    "Snow",
    "Sleet",
    "Rain",
    "Showers",
    "Drizzle",
    "Thunderstorms",
];

const WIND_TOKENS: [&str; 3] = ["breezy", "wind", "gust"];

fn sanitize (value: Option<f64>, limits: (f64,f64))->Option<f64> {
    value.filter( |v| *v >= limits.0 && *v <= limits.1)
}

fn round1 (v: f64)->f64 { (v * 10.0).round() / 10.0 }

fn mean (values: &[Option<f64>])->Option<f64> {
    let filtered: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if filtered.is_empty() {
        None
    } else {
        Some( round1( filtered.iter().sum::<f64>() / filtered.len() as f64))
    }
}

/// the highest-priority label present, otherwise the most frequent one
/// (ties broken by first occurrence)
fn dominant_precip (types: &[Option<&str>])->Option<String> {
    let present: Vec<&str> = types.iter().filter_map(|t| *t).filter(|t| !t.is_empty()).collect();
    if present.is_empty() { return None }

    for label in PRECIP_PRIORITY {
        if present.contains(&label) {
            return Some(label.to_string())
        }
    }

    // only a strictly better count replaces, so the first occurrence wins ties
    let mut best: Option<(&str,usize)> = None;
    for (i, t) in present.iter().enumerate() {
        if present[..i].contains(t) { continue }
        let n = present.iter().filter( |o| *o == t).count();
        if best.map_or( true, |(_,bn)| n > bn) { best = Some((*t, n)) }
    }
    best.map( |(t,_)| t.to_string())
}

fn contains_wind_token (text: &str)->bool {
    let lowered = text.to_lowercase();
    WIND_TOKENS.iter().any( |t| lowered.contains(t))
}

fn join_unique<'a> (fragments: impl Iterator<Item=&'a str>, sep: &str)->String {
    let mut seen: Vec<&str> = Vec::new();
    for f in fragments {
        if !f.is_empty() && !seen.contains(&f) {
            seen.push(f);
        }
    }
    seen.join(sep)
}

/// reduce all source records of one site into at most `days` daily ensembles, ascending by day.
/// Takes ownership of the records, they are not needed downstream
pub fn build_site_ensembles (site_name: &str, records: Vec<SourceDailyRecord>, days: usize)->Vec<DailyEnsemble> {
    let mut grouped: BTreeMap<NaiveDate, Vec<SourceDailyRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.date).or_default().push(record);
    }

    let mut output: Vec<DailyEnsemble> = Vec::new();

    for (day, bucket) in grouped {
        let highs: Vec<Option<f64>> = bucket.iter().map( |r| sanitize(r.high_f, HIGH_LIMITS)).collect();
        let lows: Vec<Option<f64>> = bucket.iter().map( |r| sanitize(r.low_f, LOW_LIMITS)).collect();

        let high = mean(&highs);
        let mut low = mean(&lows);

        // a low above the high is poisoned and gets dropped
        if let (Some(h), Some(l)) = (high, low) {
            if l > h { low = None }
        }
        if high.is_none() && low.is_none() {
            continue
        }

        let pop_pct = bucket.iter()
            .filter_map( |r| r.pop_pct)
            .fold( None, |acc: Option<f64>, v| Some( acc.map_or( v, |a| a.max(v))))
            .map(round1);

        let types: Vec<Option<&str>> = bucket.iter().map( |r| r.precip_type.as_deref()).collect();
        let precip_type = dominant_precip(&types);
        let precip_notes = join_unique( bucket.iter().map(|r| r.precip_notes.as_str()), " | ");

        let breezy = bucket.iter().any( |r| {
            r.wind_phrase.as_deref().map( contains_wind_token).unwrap_or(false)
                || contains_wind_token(&r.notes)
        });

        let (heat_category, heat_guidance) = classify_heat(high);
        let (freeze_risk_badge, freeze_guidance) = classify_freeze(low, breezy);

        let mut sources: Vec<&'static str> = bucket.iter().map( |r| r.source).collect();
        sources.sort();
        sources.dedup();
        let sources_count = sources.len();

        let label = if bucket[0].label.is_empty() {
            wxfuse_common::datetime::day_label(day)
        } else {
            bucket[0].label.clone()
        };

        output.push( DailyEnsemble {
            site_name: site_name.to_string(),
            date: day,
            label,
            high_f: high,
            low_f: low,
            pop_pct,
            qpf_inches: None,
            snow_inches: None,
            ice_inches: None,
            precip_type,
            precip_notes,
            heat_category,
            heat_guidance,
            freeze_risk_badge,
            freeze_guidance,
            sources,
            sources_count,
            low_confidence: sources_count < 2,
            lightning_note: LIGHTNING_NOTE,
        });

        if output.len() >= days {
            break
        }
    }

    output
}
