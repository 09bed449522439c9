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

///! tabular export of the per-site ensembles. The work sheet carries the freeze columns
///! on top of the shared column set

use std::path::Path;
use csv::Writer;

use crate::models::DailyEnsemble;
use crate::Result;

const COMMON_COLUMNS: [&str; 14] = [
    "date",
    "label",
    "high_f",
    "low_f",
    "pop_pct",
    "precip_type",
    "precip_notes",
    "heat_category",
    "continuous_heavy_work_min",
    "hydration_cups_per_min",
    "work_rest_min",
    "supervisor_assessments_per_hr",
    "radio_checkins",
    "sources_count",
];

fn fmt_opt (value: Option<f64>)->String {
    value.map( |v| v.to_string()).unwrap_or_default()
}

fn common_fields (row: &DailyEnsemble)->Vec<String> {
    vec![
        row.date.format("%Y-%m-%d").to_string(),
        row.label.clone(),
        fmt_opt(row.high_f),
        fmt_opt(row.low_f),
        fmt_opt(row.pop_pct),
        row.precip_type.clone().unwrap_or_default(),
        row.precip_notes.clone(),
        row.heat_category.unwrap_or("").to_string(),
        row.heat_guidance.continuous_heavy_work_min.to_string(),
        row.heat_guidance.hydration_cups_per_min.to_string(),
        row.heat_guidance.work_rest_min.to_string(),
        row.heat_guidance.supervisor_assessments_per_hr.to_string(),
        row.heat_guidance.radio_checkins.to_string(),
        row.sources_count.to_string(),
    ]
}

pub fn write_home_csv (rows: &[DailyEnsemble], path: &Path)->Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(COMMON_COLUMNS)?;

    for row in rows {
        writer.write_record( common_fields(row))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_work_csv (rows: &[DailyEnsemble], path: &Path)->Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header: Vec<&str> = COMMON_COLUMNS.to_vec();
    header.push("freeze_risk_badge");
    header.push("freeze_guidance");
    writer.write_record(header)?;

    for row in rows {
        let mut fields = common_fields(row);
        fields.push( row.freeze_risk_badge.unwrap_or("").to_string());
        fields.push( row.freeze_guidance.clone().unwrap_or_default());
        writer.write_record(fields)?;
    }
    writer.flush()?;
    Ok(())
}
