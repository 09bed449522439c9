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

///! self-contained HTML report. Our document is simple enough that we just write into a
///! String buffer, there is no need for another intermediate doc model

use std::fmt::Write as FmtWrite;
use chrono::DateTime;
use chrono_tz::Tz;

use crate::models::DailyEnsemble;
use crate::pipeline::SiteForecast;

const SPARK_WIDTH: f64 = 240.0;
const SPARK_HEIGHT: f64 = 56.0;

#[derive(Debug,Clone,PartialEq)]
pub struct Sparkline {
    pub d: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

fn round1 (v: f64)->f64 { (v * 10.0).round() / 10.0 }

/// SVG path commands for a temperature series, skipping missing points
pub fn sparkline (values: &[Option<f64>])->Sparkline {
    let points: Vec<f64> = values.iter().filter_map( |v| *v).collect();
    if points.len() < 2 {
        return Sparkline { d: String::new(), min_value: None, max_value: None }
    }

    let min_v = points.iter().cloned().fold( f64::MAX, f64::min);
    let max_v = points.iter().cloned().fold( f64::MIN, f64::max);
    let span = (max_v - min_v).max(1e-3);
    let step = SPARK_WIDTH / (values.len() - 1) as f64;

    let mut cmds: Vec<String> = Vec::new();
    for (idx, value) in values.iter().enumerate() {
        let value = match value { Some(value) => *value, None => continue };
        let x = round1( idx as f64 * step);
        let y = round1( SPARK_HEIGHT - ((value - min_v) / span) * SPARK_HEIGHT);
        let cmd = if cmds.is_empty() { "M" } else { "L" };
        cmds.push( format!("{}{},{}", cmd, x, y));
    }

    Sparkline { d: cmds.join(" "), min_value: Some( round1(min_v)), max_value: Some( round1(max_v)) }
}

fn fmt_temp (value: Option<f64>)->String {
    value.map( |v| format!("{:.0}°", v)).unwrap_or_else( || "—".to_string())
}

fn fmt_pop (value: Option<f64>)->String {
    value.map( |v| format!("{:.0}%", v)).unwrap_or_else( || "—".to_string())
}

fn esc (s: &str)->String {
    s.replace('&',"&amp;").replace('<',"&lt;").replace('>',"&gt;")
}

fn append_sparkline (buf: &mut String, label: &str, spark: &Sparkline, color: &str) {
    if spark.d.is_empty() { return }
    write!( buf, "<div class=\"spark\"><span>{label} {:.0}–{:.0}</span>",
        spark.min_value.unwrap_or(0.0), spark.max_value.unwrap_or(0.0));
    write!( buf, "<svg width=\"{SPARK_WIDTH}\" height=\"{SPARK_HEIGHT}\" viewBox=\"0 0 {SPARK_WIDTH} {SPARK_HEIGHT}\">");
    write!( buf, "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/></svg></div>\n", spark.d);
}

fn append_row (buf: &mut String, row: &DailyEnsemble, with_freeze: bool) {
    write!( buf, "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
        esc(&row.label), fmt_temp(row.high_f), fmt_temp(row.low_f), fmt_pop(row.pop_pct));
    write!( buf, "<td>{}</td>", esc( row.precip_type.as_deref().unwrap_or("—")));
    write!( buf, "<td>{}</td>", esc( row.heat_category.unwrap_or("—")));
    write!( buf, "<td>{}</td><td>{}</td><td>{}</td>",
        row.heat_guidance.work_rest_min, row.heat_guidance.hydration_cups_per_min, row.heat_guidance.radio_checkins);
    if with_freeze {
        write!( buf, "<td>{}</td>", row.freeze_risk_badge.unwrap_or("—"));
    }
    let confidence = if row.low_confidence { " ⚠" } else { "" };
    write!( buf, "<td>{}{}</td></tr>\n", row.sources_count, confidence);
}

fn append_site_section (buf: &mut String, forecast: &SiteForecast, with_freeze: bool) {
    write!( buf, "<section>\n<h2>{}</h2>\n", esc(&forecast.site.name));

    append_sparkline( buf, "high", &sparkline( &forecast.days.iter().map(|r| r.high_f).collect::<Vec<_>>()), "#ff6961");
    append_sparkline( buf, "low", &sparkline( &forecast.days.iter().map(|r| r.low_f).collect::<Vec<_>>()), "#4193ff");

    write!( buf, "<p class=\"sources\">ok: {} | failed: {}</p>\n",
        esc( &join_or_dash(&forecast.sources_ok, ", ")), esc( &join_or_dash(&forecast.sources_failed, "; ")));

    if !forecast.alerts.is_empty() {
        write!( buf, "<ul class=\"alerts\">\n");
        for alert in &forecast.alerts {
            write!( buf, "<li><b>{}</b> ({})</li>\n", esc(&alert.headline), esc(&alert.severity));
        }
        write!( buf, "</ul>\n");
    }

    write!( buf, "<table>\n<tr><th>Day</th><th>High</th><th>Low</th><th>PoP</th><th>Precip</th>\
<th>Heat</th><th>Work/Rest</th><th>Hydration</th><th>Check-ins</th>");
    if with_freeze {
        write!( buf, "<th>Freeze</th>");
    }
    write!( buf, "<th>Sources</th></tr>\n");

    for row in &forecast.days {
        append_row( buf, row, with_freeze);
    }
    write!( buf, "</table>\n</section>\n");
}

fn join_or_dash (items: &[String], sep: &str)->String {
    if items.is_empty() { "—".to_string() } else { items.join(sep) }
}

pub fn render_report (generated_at: &DateTime<Tz>, home: &SiteForecast, work: &SiteForecast)->String {
    let mut buf = String::with_capacity(16384);

    write!( buf, "<!DOCTYPE html>\n<html>\n<head>\n");
    write!( buf, "<meta charset=\"utf-8\">\n<title>EHS Forecast</title>\n");
    write!( buf, "<style>\n\
body {{ font-family: system-ui, sans-serif; margin: 1.5rem; color: #222; }}\n\
table {{ border-collapse: collapse; margin-top: .5rem; }}\n\
th, td {{ border: 1px solid #ccc; padding: .3rem .6rem; text-align: left; }}\n\
.sources {{ color: #666; font-size: .85rem; }}\n\
.spark span {{ font-size: .8rem; color: #666; margin-right: .5rem; }}\n\
.alerts li {{ color: #a40000; }}\n\
footer {{ margin-top: 1rem; font-size: .85rem; color: #666; }}\n\
</style>\n</head>\n<body>\n");

    write!( buf, "<h1>EHS 10-Day Forecast</h1>\n");
    write!( buf, "<p>generated {}</p>\n", generated_at.format("%Y-%m-%d %H:%M %Z"));

    append_site_section( &mut buf, home, false);
    append_site_section( &mut buf, work, true);

    let lightning = home.days.first().or( work.days.first())
        .map( |r| r.lightning_note)
        .unwrap_or( crate::ehs::LIGHTNING_NOTE);
    write!( buf, "<footer>{}</footer>\n", esc(lightning));

    write!( buf, "</body>\n</html>\n");
    buf
}
