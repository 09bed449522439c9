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

///! run configuration: an immutable value merged CLI-over-environment-over-defaults and
///! validated before the pipeline starts. Missing work coordinates are resolved once
///! through the NWS zipcity search and cached next to the run artifacts

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use chrono_tz::Tz;
use clap::{ArgAction, Parser, ValueEnum};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use wxfuse_common::fs::{ensure_writable_dir, file_contents_as_string, set_filepath_contents};
use wxfuse_common::net;

use crate::models::Site;
use crate::{config_error, Result};

pub const DEFAULT_USER_AGENT: &str = "wxfuse/1.0 (contact: ops@example.com)";
pub const ZIPCITY_URL: &str = "https://forecast.weather.gov/zipcity.php";

const DEFAULT_HOME_LAT: f64 = 39.3381;
const DEFAULT_HOME_LON: f64 = -77.7925;
const DEFAULT_WORK_ADDRESS: &str = "1042 Development Drive, Inwood, WV";
const DEFAULT_TZ: &str = "America/New_York";
const DEFAULT_DAYS: usize = 10;
const DEFAULT_CACHE_TTL_HOURS: u64 = 3;

lazy_static! {
    // MapClick anchors of the zipcity result page carry the resolved point in their query
    static ref MAPCLICK_RE: Regex = Regex::new( r#"MapClick\.php[^"'\s]*lat=(-?[0-9.]+)[^"'\s]*lon=(-?[0-9.]+)"#).unwrap();
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,ValueEnum)]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryIngest {
    PublicFiles,
    Rss,
}

impl FromStr for PrimaryIngest {
    type Err = crate::WxFuseError;

    fn from_str (s: &str)->Result<Self> {
        match s.to_uppercase().as_str() {
            "PUBLIC_FILES" => Ok(PrimaryIngest::PublicFiles),
            "RSS" => Ok(PrimaryIngest::Rss),
            other => Err( config_error( format!("unknown primary ingest path {other:?}")))
        }
    }
}

/// the command line surface. Every option falls back to its environment variable
#[derive(Parser,Debug,Default)]
#[command(name="wxfuse", version, about="dual-site EHS forecast pipeline")]
pub struct CliArgs {
    #[arg(long, help="home latitude override")]
    pub home_lat: Option<f64>,

    #[arg(long, help="home longitude override")]
    pub home_lon: Option<f64>,

    #[arg(long, help="work latitude override")]
    pub work_lat: Option<f64>,

    #[arg(long, help="work longitude override")]
    pub work_lon: Option<f64>,

    #[arg(long, help="work address override")]
    pub work_address: Option<String>,

    #[arg(long, help="forecast horizon days")]
    pub days: Option<usize>,

    #[arg(long, value_enum, help="primary ingest path")]
    pub primary: Option<PrimaryIngest>,

    #[arg(long, action=ArgAction::SetTrue, overrides_with="no_rss_fallback", help="enable RSS fallback")]
    pub rss_fallback: bool,

    #[arg(long, action=ArgAction::SetTrue, help="disable RSS fallback")]
    pub no_rss_fallback: bool,

    #[arg(long="out", help="artifact directory")]
    pub out_dir: Option<PathBuf>,

    #[arg(long, help="log directory")]
    pub logs_dir: Option<PathBuf>,

    #[arg(long, help="custom user agent")]
    pub user_agent: Option<String>,

    #[arg(long, action=ArgAction::SetTrue, help="force re-download of data")]
    pub no_cache: bool,

    #[arg(long, action=ArgAction::SetTrue, help="skip email even if credentials exist")]
    pub html_only: bool,
}

impl CliArgs {
    /// None when neither flag was given so the env/default can decide
    fn rss_fallback_override (&self)->Option<bool> {
        if self.no_rss_fallback { Some(false) }
        else if self.rss_fallback { Some(true) }
        else { None }
    }
}

/// SMTP settings, env-only. Delivery is enabled iff all credential parts are present
#[derive(Debug,Clone)]
pub struct EmailConfig {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl EmailConfig {
    pub fn enabled (&self)->bool {
        self.sender.is_some() && self.recipient.is_some() && self.host.is_some()
            && self.username.is_some() && self.password.is_some()
    }

    fn from_env ()->Result<Self> {
        Ok( EmailConfig {
            sender: env_str("MAIL_FROM"),
            recipient: env_str("MAIL_TO"),
            host: env_str("SMTP_HOST"),
            port: env_parse::<u16>("SMTP_PORT")?.unwrap_or(587),
            username: env_str("SMTP_USER"),
            password: env_str("SMTP_PASS"),
        })
    }
}

#[derive(Debug,Clone)]
pub struct AppConfig {
    pub days: usize,
    pub primary_ingest: PrimaryIngest,
    pub rss_fallback: bool,
    pub cache_ttl_hours: u64,
    pub user_agent: String,
    pub tz: Tz,
    pub out_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub no_cache: bool,
    pub html_only: bool,
    pub home: Site,
    pub work: Site,
    pub email: EmailConfig,
}

fn env_str (key: &str)->Option<String> {
    env::var(key).ok().filter( |v| !v.trim().is_empty())
}

fn env_parse<T: FromStr> (key: &str)->Result<Option<T>> {
    match env_str(key) {
        Some(raw) => raw.trim().parse::<T>()
            .map( Some)
            .map_err( |_| config_error( format!("malformed value for {key}: {raw:?}"))),
        None => Ok(None)
    }
}

fn env_bool (key: &str)->Result<Option<bool>> {
    match env_str(key) {
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok( Some(true)),
            "0" | "false" | "no" | "off" => Ok( Some(false)),
            other => Err( config_error( format!("malformed boolean for {key}: {other:?}")))
        },
        None => Ok(None)
    }
}

fn check_coords (what: &str, lat: f64, lon: f64)->Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        Err( config_error( format!("{} coordinates out of range: {}, {}", what, lat, lon)))
    } else {
        Ok(())
    }
}

fn query_escape (s: &str)->String {
    let mut out = String::with_capacity( s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            other => out.push_str( &format!("%{:02X}", other))
        }
    }
    out
}

fn read_cached_coords (path: &Path)->Option<(f64,f64)> {
    let text = file_contents_as_string(path).ok()?;
    let payload: Value = serde_json::from_str(&text).ok()?;
    Some( (payload.get("lat")?.as_f64()?, payload.get("lon")?.as_f64()?))
}

fn write_cached_coords (path: &Path, lat: f64, lon: f64)->Result<()> {
    let payload = serde_json::to_string_pretty( &json!({ "lat": lat, "lon": lon }))
        .map_err( |e| config_error(e))?;
    set_filepath_contents( path, payload.as_bytes())?;
    Ok(())
}

/// resolve a street address to a forecast point via the NWS zipcity search, reusing a
/// previously resolved pair from `out/work_coords.json` when present
async fn resolve_work_coords (client: &Client, address: &str, out_dir: &Path)->Result<(f64,f64)> {
    let cache_path = out_dir.join("work_coords.json");
    if let Some(coords) = read_cached_coords(&cache_path) {
        return Ok(coords)
    }

    let url = format!("{}?inputstring={}", ZIPCITY_URL, query_escape(address));
    let response = net::get_with_retry( client, &url).await
        .map_err( |e| config_error( format!("zipcity search failed: {e}")))?;
    let text = response.error_for_status()
        .map_err( |e| config_error( format!("zipcity search failed: {e}")))?
        .text().await
        .map_err( |e| config_error( format!("zipcity search failed: {e}")))?;

    for caps in MAPCLICK_RE.captures_iter(&text) {
        if let (Ok(lat), Ok(lon)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
            info!("resolved work address to {}, {}", lat, lon);
            write_cached_coords( &cache_path, lat, lon)?;
            return Ok( (lat, lon))
        }
    }

    Err( config_error( format!("unable to resolve work coordinates for {address:?}")))
}

/// the log dir is resolvable from CLI/env alone. The binary needs it before
/// `load_config` runs so that site resolution is already logged
pub fn resolve_logs_dir (args: &CliArgs)->PathBuf {
    args.logs_dir.clone()
        .or_else( || env_str("LOGS_DIR").map(PathBuf::from))
        .unwrap_or_else( || PathBuf::from("logs"))
}

pub async fn load_config (args: &CliArgs)->Result<AppConfig> {
    let out_dir = args.out_dir.clone()
        .or_else( || env_str("OUT_DIR").map(PathBuf::from))
        .unwrap_or_else( || PathBuf::from("out"));
    let logs_dir = resolve_logs_dir(args);
    ensure_writable_dir(&out_dir)?;
    ensure_writable_dir(&logs_dir)?;

    let user_agent = args.user_agent.clone()
        .or_else( || env_str("USER_AGENT"))
        .unwrap_or_else( || DEFAULT_USER_AGENT.to_string());

    let tz_name = env_str("TZ").unwrap_or_else( || DEFAULT_TZ.to_string());
    let tz: Tz = tz_name.parse()
        .map_err( |_| config_error( format!("unknown time zone {tz_name:?}")))?;

    let home = Site {
        name: env_str("PLACE_HOME").unwrap_or_else( || "Home".to_string()),
        latitude: match args.home_lat { Some(v) => v, None => env_parse("HOME_LAT")?.unwrap_or(DEFAULT_HOME_LAT) },
        longitude: match args.home_lon { Some(v) => v, None => env_parse("HOME_LON")?.unwrap_or(DEFAULT_HOME_LON) },
        address: None,
    };
    check_coords( "home", home.latitude, home.longitude)?;

    let work_address = args.work_address.clone()
        .or_else( || env_str("WORK_ADDRESS"))
        .unwrap_or_else( || DEFAULT_WORK_ADDRESS.to_string());

    let work_lat = match args.work_lat { Some(v) => Some(v), None => env_parse("WORK_LAT")? };
    let work_lon = match args.work_lon { Some(v) => Some(v), None => env_parse("WORK_LON")? };

    let (work_lat, work_lon) = match (work_lat, work_lon) {
        (Some(lat), Some(lon)) => {
            write_cached_coords( &out_dir.join("work_coords.json"), lat, lon)?;
            (lat, lon)
        }
        _ => {
            let client = net::new_client(&user_agent)?;
            resolve_work_coords( &client, &work_address, &out_dir).await?
        }
    };

    let work = Site {
        name: env_str("PLACE_WORK").unwrap_or_else( || work_address.clone()),
        latitude: work_lat,
        longitude: work_lon,
        address: Some(work_address),
    };
    check_coords( "work", work.latitude, work.longitude)?;

    let days = match args.days { Some(v) => v, None => env_parse("DAYS")?.unwrap_or(DEFAULT_DAYS) };
    if days == 0 {
        return Err( config_error("forecast horizon has to cover at least one day"))
    }

    let primary_ingest = match args.primary {
        Some(primary) => primary,
        None => match env_str("PRIMARY_INGEST") {
            Some(raw) => raw.parse()?,
            None => PrimaryIngest::PublicFiles
        }
    };

    let rss_fallback = match args.rss_fallback_override() {
        Some(v) => v,
        None => env_bool("RSS_FALLBACK")?.unwrap_or(true)
    };

    Ok( AppConfig {
        days,
        primary_ingest,
        rss_fallback,
        cache_ttl_hours: env_parse("CACHE_TTL_HOURS")?.unwrap_or(DEFAULT_CACHE_TTL_HOURS),
        user_agent,
        tz,
        out_dir,
        logs_dir,
        no_cache: args.no_cache,
        html_only: args.html_only,
        home,
        work,
        email: EmailConfig::from_env()?,
    })
}
