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

///! api.weather.gov point-forecast ingestor: resolve the grid through the points endpoint,
///! then bucket the gridded {validTime, value} series into local days

use std::collections::BTreeMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use wxfuse_common::cache::FileCache;
use wxfuse_common::datetime::{parse_iso, secs};
use wxfuse_common::net;

use crate::ingest::Ingestor;
use crate::models::{Site, SourceDailyRecord, SRC_GRIDPOINT};
use crate::{parse_error, Result};

pub const POINTS_URL: &str = "https://api.weather.gov/points";

lazy_static! {
    // ISO-8601 duration restricted to days/hours/minutes, the shapes this feed emits
    static ref DURATION_RE: Regex = Regex::new( r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?)?$").unwrap();
}

fn c_to_f (value: f64)->f64 { value * 9.0 / 5.0 + 32.0 }
fn mm_to_inches (value: f64)->f64 { value * 0.0393701 }

fn round1 (v: f64)->f64 { (v * 10.0).round() / 10.0 }
fn round2 (v: f64)->f64 { (v * 100.0).round() / 100.0 }

/// ISO duration → Duration, defaulting to one hour for anything unparsable
pub fn parse_duration_hint (value: &str)->Duration {
    if let Some(caps) = DURATION_RE.captures(value) {
        let num = |i: usize| caps.get(i).and_then( |m| m.as_str().parse::<i64>().ok()).unwrap_or(0);
        Duration::days( num(1)) + Duration::hours( num(2)) + Duration::minutes( num(3))
    } else {
        Duration::hours(1)
    }
}

/// parse a `validTime` that is either an ISO instant or `instant/duration`
pub fn parse_period (value: &str, tz: Tz)->Option<(DateTime<Tz>, DateTime<Tz>)> {
    if let Some((start_raw, duration_raw)) = value.split_once('/') {
        let start = parse_iso( start_raw, tz)?;
        Some( (start, start + parse_duration_hint(duration_raw)))
    } else {
        let start = parse_iso( value, tz)?;
        Some( (start, start + Duration::hours(1)))
    }
}

fn coverage_word (coverage: &str)->Option<&'static str> {
    match coverage {
        "chance" => Some("Chance"),
        "slight_chance" => Some("Slight chance"),
        "likely" => Some("Likely"),
        "definite" => Some("Definite"),
        "occasional" => Some("Occasional"),
        "periods" => Some("Periods of"),
        "areas" => Some("Areas of"),
        "patchy" => Some("Patchy"),
        _ => None
    }
}

fn title_case (s: &str)->String {
    s.split_whitespace()
        .map( |word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new()
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// render one weather entry as `"[Coverage] [Intensity] Type [+Attr1+Attr2]"`
pub fn weather_phrase (entry: &Value)->Option<String> {
    let weather = entry.get("weather").and_then( |w| w.as_str()).filter( |w| !w.is_empty())?;

    let mut parts: Vec<String> = Vec::new();
    if let Some(coverage) = entry.get("coverage").and_then( |c| c.as_str()) {
        if let Some(word) = coverage_word(coverage) {
            parts.push( word.to_string());
        }
    }
    if let Some(intensity) = entry.get("intensity").and_then( |i| i.as_str()) {
        if intensity != "none" {
            parts.push( title_case(intensity));
        }
    }
    parts.push( title_case( &weather.replace('_'," ")));

    if let Some(attrs) = entry.get("attributes").and_then( |a| a.as_array()) {
        if !attrs.is_empty() {
            let joined: Vec<String> = attrs.iter()
                .filter_map( |a| a.as_str())
                .map( title_case)
                .collect();
            if !joined.is_empty() { parts.push( joined.join("+")) }
        }
    }

    Some( parts.join(" "))
}

fn series<'a> (props: &'a Value, field: &str)->&'a [Value] {
    props.get(field)
        .and_then( |f| f.get("values"))
        .and_then( |v| v.as_array())
        .map( |v| v.as_slice())
        .unwrap_or(&[])
}

enum Agg { Max, Sum }

fn bucket_numeric (values: &[Value], tz: Tz, agg: Agg, transform: Option<fn(f64)->f64>)->BTreeMap<NaiveDate, f64> {
    let mut bucket: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();

    for item in values {
        let valid = match item.get("validTime").and_then( |v| v.as_str()) { Some(valid) => valid, None => continue };
        let raw = match item.get("value").and_then( |v| v.as_f64()) { Some(raw) => raw, None => continue };
        let (start, _end) = match parse_period( valid, tz) { Some(p) => p, None => continue };

        let val = transform.map_or( raw, |f| f(raw));
        bucket.entry( start.date_naive()).or_default().push(val);
    }

    bucket.into_iter()
        .map( |(day, items)| {
            let v = match agg {
                Agg::Sum => round2( items.iter().sum()),
                Agg::Max => round1( items.iter().cloned().fold( f64::MIN, f64::max))
            };
            (day, v)
        })
        .collect()
}

fn bucket_weather (values: &[Value], tz: Tz)->BTreeMap<NaiveDate, (String, String)> {
    let mut phrases: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();

    for item in values {
        let valid = match item.get("validTime").and_then( |v| v.as_str()) { Some(valid) => valid, None => continue };
        let (start, _end) = match parse_period( valid, tz) { Some(p) => p, None => continue };
        let entries = match item.get("value").and_then( |v| v.as_array()) { Some(entries) => entries, None => continue };

        for entry in entries {
            if let Some(phrase) = weather_phrase(entry) {
                phrases.entry( start.date_naive()).or_default().push(phrase);
            }
        }
    }

    phrases.into_iter()
        .map( |(day, items)| {
            let mut unique: Vec<String> = Vec::new();
            for p in items {
                if !unique.contains(&p) { unique.push(p) }
            }
            let joined = unique.join(", ");
            (day, (unique[0].clone(), joined))
        })
        .collect()
}

/// bucket a grid-data `properties` object into per-day records
pub fn parse_gridpoint (props: &Value, site: &Site, days: usize, tz: Tz)->Vec<SourceDailyRecord> {
    let highs = bucket_numeric( series(props, "maxTemperature"), tz, Agg::Max, Some(c_to_f));
    let lows = bucket_numeric( series(props, "minTemperature"), tz, Agg::Max, Some(c_to_f));
    let pops = bucket_numeric( series(props, "probabilityOfPrecipitation"), tz, Agg::Max, None);
    let qpf = bucket_numeric( series(props, "quantitativePrecipitation"), tz, Agg::Sum, Some(mm_to_inches));
    let weather = bucket_weather( series(props, "weather"), tz);

    let mut day_set: Vec<NaiveDate> = highs.keys()
        .chain( lows.keys()).chain( pops.keys()).chain( qpf.keys()).chain( weather.keys())
        .cloned()
        .collect();
    day_set.sort();
    day_set.dedup();

    let mut records: Vec<SourceDailyRecord> = Vec::new();
    for day in day_set.into_iter().take(days) {
        let mut record = SourceDailyRecord::new( site, day, SRC_GRIDPOINT);

        if let Some(high) = highs.get(&day) { record.high_f = Some(*high) }
        if let Some(low) = lows.get(&day) { record.low_f = Some(*low) }
        if let Some(pop) = pops.get(&day) { record.pop_pct = Some(*pop) }

        if let Some(amount) = qpf.get(&day) {
            if *amount > 0.0 {
                record.qpf_inches = Some(*amount);
                let note = format!("NWS QPF {:.2}\"", amount);
                record.precip_notes = if record.precip_notes.is_empty() {
                    note
                } else {
                    format!("{} | {}", record.precip_notes, note)
                };
            }
        }

        if let Some((primary, notes)) = weather.get(&day) {
            record.precip_type = Some( primary.clone());
            if !notes.is_empty() {
                record.precip_notes = if record.precip_notes.is_empty() {
                    notes.clone()
                } else {
                    format!("{} | {}", record.precip_notes, notes)
                };
            }
        }

        records.push(record);
    }
    records
}

pub struct GridpointIngestor {
    client: Client,
    cache: Arc<FileCache>,
    days: usize,
    tz: Tz,
}

impl GridpointIngestor {
    pub fn new (client: Client, cache: Arc<FileCache>, days: usize, tz: Tz)->Self {
        GridpointIngestor { client, cache, days, tz }
    }
}

#[async_trait]
impl Ingestor for GridpointIngestor {
    fn source_name (&self)->&'static str { SRC_GRIDPOINT }

    async fn fetch (&self, site: &Site)->Result<Vec<SourceDailyRecord>> {
        let name = format!("{}.json", site.coord_slug());

        let client = &self.client;
        let points_url = format!("{}/{},{}", POINTS_URL, site.latitude, site.longitude);
        let meta_text = self.cache.read_text( "gridpoint/meta", &name, async move {
            net::get_ok_bytes( client, &points_url, Some(secs(60))).await
        }).await?;

        let meta: Value = serde_json::from_str(&meta_text)
            .map_err( |e| parse_error( format!("malformed points response: {e}")))?;
        let grid_url = meta.get("properties")
            .and_then( |p| p.get("forecastGridData"))
            .and_then( |u| u.as_str())
            .ok_or_else( || parse_error("points response without forecastGridData"))?
            .to_string();

        let client = &self.client;
        let data_text = self.cache.read_text( "gridpoint/data", &name, async move {
            net::get_ok_bytes( client, &grid_url, Some(secs(60))).await
        }).await?;

        let data: Value = serde_json::from_str(&data_text)
            .map_err( |e| parse_error( format!("malformed grid response: {e}")))?;
        let props = data.get("properties").cloned().unwrap_or( Value::Object(Default::default()));

        debug!("gridpoint data retrieved for {}", site.name);
        Ok( parse_gridpoint( &props, site, self.days, self.tz))
    }
}
