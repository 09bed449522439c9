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

///! NBM ingestor: select one recent model cycle shared by both sites, slice the CONUS
///! archive record-wise through its .idx sidecars and extract point values per forecast hour

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use wxfuse_common::cache::FileCache;
use wxfuse_common::datetime::{secs, six_hour_floor, utc_now, ymd_compact};
use wxfuse_common::fs::file_contents;
use wxfuse_common::net;

use crate::ingest::decode::{DecodedField, GribDecode};
use crate::ingest::Ingestor;
use crate::models::{Site, SourceDailyRecord, SRC_NBM};
use crate::{op_failed, Result};

pub const BASE_URL: &str = "https://noaa-nbm-grib2-pds.s3.amazonaws.com";
pub const DOMAIN: &str = "co";

const PROBE_DEPTH_HOURS: u32 = 42;
const PROBE_FHOUR: u32 = 24;
const POP_WINDOW_HOURS: u32 = 12;

/// one NBM model run: its UTC instant plus the path components derived from it
#[derive(Debug,Clone)]
pub struct CycleInfo {
    pub when: DateTime<Utc>,
    pub ymd: String,
    pub hour: String,
}

impl CycleInfo {
    pub fn new (when: DateTime<Utc>)->Self {
        let ymd = ymd_compact(&when);
        let hour = format!("{:02}", when.hour());
        CycleInfo { when, ymd, hour }
    }
}

/// one line of a .idx sidecar: `number:offset:...:key components...`
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct GribIndexEntry {
    pub number: u32,
    pub offset: u64,
    pub key: String,
}

pub fn parse_index (text: &str)->Vec<GribIndexEntry> {
    let mut entries: Vec<GribIndexEntry> = Vec::new();

    for line in text.lines().filter( |l| !l.is_empty()) {
        let mut cols = line.splitn(3, ':');
        let number = cols.next().and_then( |c| c.parse::<u32>().ok());
        let offset = cols.next().and_then( |c| c.parse::<u64>().ok());
        let key = cols.next().unwrap_or("");

        if let (Some(number), Some(offset)) = (number, offset) {
            entries.push( GribIndexEntry { number, offset, key: key.to_string() });
        }
    }
    entries
}

/// byte range of the first non-"std dev" record whose key contains the delimited token.
/// The range ends one byte before the next record, the last record is open ended
pub fn find_entry (entries: &[GribIndexEntry], token: &str)->Option<(u64, Option<u64>)> {
    for (i, entry) in entries.iter().enumerate() {
        if !entry.key.contains(token) || entry.key.contains("std dev") { continue }
        let end = entries.get(i+1).map( |next| next.offset - 1);
        return Some( (entry.offset, end))
    }
    None
}

pub fn kelvin_to_f (value: f64)->f64 {
    (value - 273.15) * 9.0 / 5.0 + 32.0
}

/// field-specific normalization into the record units (°F, inches, percent)
pub fn convert_units (short_name: &str, raw: f64)->f64 {
    match short_name {
        "TMP" | "TMAX" | "TMIN" | "MAXT" | "MINT" => kelvin_to_f(raw),
        "APCP" => raw * 0.0393701,  // mm -> in
        "ASNOW" => raw * 39.3701,   // m -> in
        _ => raw                    // POP12 is already a percentage
    }
}

fn idx_url (ymd: &str, hour: &str, fhour: u32)->String {
    format!("{BASE_URL}/blend.{ymd}/{hour}/core/blend.t{hour}z.core.f{fhour:03}.{DOMAIN}.grib2.idx")
}

fn grib_url (ymd: &str, hour: &str, fhour: u32)->String {
    format!("{BASE_URL}/blend.{ymd}/{hour}/core/blend.t{hour}z.core.f{fhour:03}.{DOMAIN}.grib2")
}

fn round2 (v: f64)->f64 { (v * 100.0).round() / 100.0 }

pub struct NbmIngestor {
    client: Client,
    cache: Arc<FileCache>,
    days: usize,
    tz: Tz,
    decoder: Arc<dyn GribDecode>,

    // single-run caches, never persisted and never shared across instances
    cycle: Mutex<Option<CycleInfo>>,
    fields: Mutex<HashMap<(String,u32), Option<Arc<DecodedField>>>>,
}

impl NbmIngestor {
    pub fn new (client: Client, cache: Arc<FileCache>, days: usize, tz: Tz, decoder: Arc<dyn GribDecode>)->Self {
        NbmIngestor {
            client, cache, days, tz, decoder,
            cycle: Mutex::new(None),
            fields: Mutex::new( HashMap::new()),
        }
    }

    fn cache_namespace (cycle: &CycleInfo)->String {
        format!("nbm/{}/{}", cycle.ymd, cycle.hour)
    }

    /// probe 6 hour cycle candidates back to the probe depth, accepting the first whose
    /// f024 index answers a HEAD with 200. The accepted cycle is latched for the run
    async fn select_cycle (&self)->Result<CycleInfo> {
        {
            let latched = self.cycle.lock().unwrap();
            if let Some(cycle) = latched.as_ref() {
                return Ok( cycle.clone())
            }
        }

        let base = six_hour_floor(&utc_now());
        let mut back = 0;
        while back <= PROBE_DEPTH_HOURS {
            let candidate = CycleInfo::new( base - Duration::hours(back as i64));
            let probe_url = idx_url( &candidate.ymd, &candidate.hour, PROBE_FHOUR);

            if net::head_status( &self.client, &probe_url).await? == StatusCode::OK {
                info!("selected NBM cycle {} {}z", candidate.ymd, candidate.hour);
                *self.cycle.lock().unwrap() = Some( candidate.clone());
                return Ok(candidate)
            }
            back += 6;
        }

        Err( op_failed( format!("no NBM cycle with CONUS data within the last {} hours", PROBE_DEPTH_HOURS)))
    }

    async fn load_index (&self, cycle: &CycleInfo, fhour: u32)->Result<Vec<GribIndexEntry>> {
        let client = &self.client;
        let url = idx_url( &cycle.ymd, &cycle.hour, fhour);

        let text = self.cache.read_text( &Self::cache_namespace(cycle), &format!("f{fhour:03}.idx"), async move {
            net::get_ok_bytes( client, &url, Some(secs(60))).await
        }).await?;

        Ok( parse_index(&text))
    }

    async fn load_slice (&self, cycle: &CycleInfo, fhour: u32, start: u64, end: Option<u64>, short_name: &str)->Result<Vec<u8>> {
        let client = &self.client;
        let url = grib_url( &cycle.ymd, &cycle.hour, fhour);
        let name = format!("f{fhour:03}_{}.grib2", short_name.to_lowercase());

        let cached = self.cache.fetch( &Self::cache_namespace(cycle), &name, async move {
            net::get_ranged_bytes( client, &url, start, end, Some(secs(120))).await
        }).await?;

        Ok( file_contents(&cached.path)?)
    }

    async fn try_load_field (&self, cycle: &CycleInfo, fhour: u32, short_name: &str)->Result<DecodedField> {
        let entries = self.load_index( cycle, fhour).await?;
        let token = format!(":{}:", short_name);
        let (start, end) = find_entry( &entries, &token)
            .ok_or_else( || op_failed( format!("field {} not present in GRIB index f{:03}", short_name, fhour)))?;

        let bytes = self.load_slice( cycle, fhour, start, end, short_name).await?;
        self.decoder.decode_field( &bytes, short_name)
    }

    /// memoized field load. A load failure (including field-missing) is cached as None so
    /// each (field, hour) is attempted once per run
    async fn load_field (&self, cycle: &CycleInfo, fhour: u32, short_name: &str)->Option<Arc<DecodedField>> {
        let key = (short_name.to_string(), fhour);
        {
            let fields = self.fields.lock().unwrap();
            if let Some(cached) = fields.get(&key) {
                return cached.clone()
            }
        }

        let entry = match self.try_load_field( cycle, fhour, short_name).await {
            Ok(field) => Some( Arc::new(field)),
            Err(e) => {
                warn!("unable to load NBM field {} f{:03}: {}", short_name, fhour, e);
                None
            }
        };

        self.fields.lock().unwrap().insert( key, entry.clone());
        entry
    }

    async fn sample (&self, cycle: &CycleInfo, fhour: u32, short_name: &str, site: &Site)->Option<f64> {
        let field = self.load_field( cycle, fhour, short_name).await?;
        field.nearest_value( site.latitude, site.longitude)
            .map( |raw| convert_units( short_name, raw))
    }

    /// try a fallback chain of short names at one forecast hour
    async fn sample_chain (&self, cycle: &CycleInfo, fhour: u32, names: &[&str], site: &Site)->Option<f64> {
        for name in names {
            if let Some(value) = self.sample( cycle, fhour, name, site).await {
                return Some(value)
            }
        }
        None
    }

    /// the 3-hourly TMP sample grid within day k's 24 hour window (hour 0 included only for day 0)
    fn day_sample_hours (day_idx: u32)->Vec<u32> {
        let start = if day_idx == 0 { 0 } else { day_idx * 24 + 3 };
        (start ..= (day_idx + 1) * 24).step_by(3).collect()
    }

    /// last-resort extreme derived from instantaneous TMP samples
    async fn derived_extreme (&self, cycle: &CycleInfo, day_idx: u32, site: &Site, maximum: bool)->Option<f64> {
        let mut acc: Option<f64> = None;
        for fhour in Self::day_sample_hours(day_idx) {
            if let Some(value) = self.sample( cycle, fhour, "TMP", site).await {
                acc = Some( match acc {
                    Some(a) => if maximum { a.max(value) } else { a.min(value) },
                    None => value
                });
            }
        }
        acc
    }
}

#[async_trait]
impl Ingestor for NbmIngestor {
    fn source_name (&self)->&'static str { SRC_NBM }

    async fn fetch (&self, site: &Site)->Result<Vec<SourceDailyRecord>> {
        let cycle = self.select_cycle().await?;
        info!("fetching NBM slices for {}", site.name);

        let base_day = cycle.when.with_timezone(&self.tz).date_naive();
        let mut records: Vec<SourceDailyRecord> = Vec::with_capacity(self.days);

        for k in 0 .. self.days as u32 {
            let target_day = base_day + Duration::days(k as i64);
            let mut rec = SourceDailyRecord::new( site, target_day, SRC_NBM);

            let high_hour = (k + 1) * 24;
            let low_hour = k * 24 + POP_WINDOW_HOURS;

            rec.high_f = match self.sample_chain( &cycle, high_hour, &["TMAX","MAXT"], site).await {
                Some(v) => Some(v),
                None => self.derived_extreme( &cycle, k, site, true).await
            };
            rec.low_f = match self.sample_chain( &cycle, low_hour, &["TMIN","MINT"], site).await {
                Some(v) => Some(v),
                None => self.derived_extreme( &cycle, k, site, false).await
            };

            let h1 = (k * 24 + POP_WINDOW_HOURS).max(POP_WINDOW_HOURS);
            let h2 = (k + 1) * 24;

            let mut pop: Option<f64> = None;
            let mut qpf: Option<f64> = None;
            let mut snow: Option<f64> = None;
            for fhour in [h1, h2] {
                if let Some(v) = self.sample( &cycle, fhour, "POP12", site).await {
                    pop = Some( pop.map_or( v, |p| p.max(v)));
                }
                if let Some(v) = self.sample( &cycle, fhour, "APCP", site).await {
                    qpf = Some( qpf.unwrap_or(0.0) + v);
                }
                if let Some(v) = self.sample( &cycle, fhour, "ASNOW", site).await {
                    snow = Some( snow.unwrap_or(0.0) + v);
                }
            }
            rec.pop_pct = pop;
            rec.qpf_inches = qpf.map(round2);
            rec.snow_inches = snow.map(round2);

            debug!("NBM day {} for {}: high {:?} low {:?} pop {:?}", k, site.name, rec.high_f, rec.low_f, rec.pop_pct);
            records.push(rec);
        }

        Ok(records)
    }
}
