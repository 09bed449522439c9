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

///! the record types flowing through the pipeline: per-source daily records produced by the
///! ingestors and the per-day ensembles produced by the reducer

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wxfuse_common::datetime::day_label;

/// the stable source identifiers carried in record provenance
pub const SRC_NBM: &str = "nbm_grib";
pub const SRC_GRIDPOINT: &str = "nws_gridpoint";
pub const SRC_NDFD: &str = "nws_ndfd";
pub const SRC_RSS: &str = "nws_rss";

/// a forecast site, fixed for the whole run. Two exist per run ("home" and "work")
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct Site {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl Site {
    pub fn new (name: impl ToString, latitude: f64, longitude: f64)->Self {
        Site { name: name.to_string(), latitude, longitude, address: None }
    }

    /// cache-key safe coordinate slug, e.g. "39d3381_m77d7925"
    pub fn coord_slug (&self)->String {
        format!("{:.4}_{:.4}", self.latitude, self.longitude).replace('-',"m").replace('.',"d")
    }
}

/// one calendar day as seen by one source. Numerics are already normalized to °F / inches / percent,
/// dates are calendar days in the configured local zone
#[derive(Debug,Clone,Serialize)]
pub struct SourceDailyRecord {
    pub site_name: String,
    pub date: NaiveDate,
    pub label: String,
    pub source: &'static str,

    pub high_f: Option<f64>,
    pub low_f: Option<f64>,
    pub pop_pct: Option<f64>,
    pub qpf_inches: Option<f64>,
    pub snow_inches: Option<f64>,
    pub ice_inches: Option<f64>,

    pub precip_type: Option<String>,
    pub precip_notes: String,
    pub wind_phrase: Option<String>,
    pub notes: String,
}

impl SourceDailyRecord {
    pub fn new (site: &Site, date: NaiveDate, source: &'static str)->Self {
        SourceDailyRecord {
            site_name: site.name.clone(),
            date,
            label: day_label(date),
            source,
            high_f: None, low_f: None, pop_pct: None,
            qpf_inches: None, snow_inches: None, ice_inches: None,
            precip_type: None,
            precip_notes: String::new(),
            wind_phrase: None,
            notes: String::new(),
        }
    }
}

/// the five prescriptive heat guidance fields, always populated (defaults when no band applies)
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct HeatGuidance {
    pub continuous_heavy_work_min: &'static str,
    pub hydration_cups_per_min: &'static str,
    pub work_rest_min: &'static str,
    pub supervisor_assessments_per_hr: &'static str,
    pub radio_checkins: &'static str,
}

/// the blended per-day forecast for one site, annotated with EHS classification and provenance
#[derive(Debug,Clone,Serialize)]
pub struct DailyEnsemble {
    pub site_name: String,
    pub date: NaiveDate,
    pub label: String,

    pub high_f: Option<f64>,
    pub low_f: Option<f64>,
    pub pop_pct: Option<f64>,
    pub qpf_inches: Option<f64>,
    pub snow_inches: Option<f64>,
    pub ice_inches: Option<f64>,

    pub precip_type: Option<String>,
    pub precip_notes: String,

    pub heat_category: Option<&'static str>,
    pub heat_guidance: HeatGuidance,
    pub freeze_risk_badge: Option<&'static str>,
    pub freeze_guidance: Option<String>,

    pub sources: Vec<&'static str>,
    pub sources_count: usize,
    pub low_confidence: bool,
    pub lightning_note: &'static str,
}

/// an active advisory for a site, best-effort companion data for the report
#[derive(Debug,Clone)]
pub struct AlertSummary {
    pub headline: String,
    pub severity: String,
    pub expires: Option<DateTime<Utc>>,
    pub instruction: Option<String>,
}
