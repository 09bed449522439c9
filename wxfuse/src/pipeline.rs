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

///! the pipeline driver: run every configured ingestor over both sites, reduce per site,
///! attach advisory alerts and fan the result out to the report/email collaborators.
///! No single ingestor failure aborts a run

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{error, info, warn};

use wxfuse_common::cache::FileCache;
use wxfuse_common::datetime::{hours, utc_now};
use wxfuse_common::fs::{ensure_writable_dir, set_filepath_contents};
use wxfuse_common::net;

use crate::config::AppConfig;
use crate::ensemble::build_site_ensembles;
use crate::ingest::alerts::AlertsClient;
use crate::ingest::decode::{GribCrateDecoder, GribDecode};
use crate::ingest::gridpoint::GridpointIngestor;
use crate::ingest::nbm::NbmIngestor;
use crate::ingest::ndfd::NdfdIngestor;
use crate::ingest::rss::RssIngestor;
use crate::ingest::{ingestor_order, Ingestor};
use crate::models::{AlertSummary, DailyEnsemble, Site, SourceDailyRecord};
use crate::report;
use crate::smtp::Mailer;
use crate::Result;

pub const CACHE_ROOT: &str = ".cache";
const EMAIL_SUBJECT: &str = "EHS 10-Day Forecast — Home & Work";

/// everything the run produced for one site
#[derive(Debug)]
pub struct SiteForecast {
    pub site: Site,
    pub days: Vec<DailyEnsemble>,
    pub sources_ok: Vec<String>,
    pub sources_failed: Vec<String>,
    pub alerts: Vec<AlertSummary>,
}

#[derive(Debug)]
pub struct RunOutput {
    pub generated_at: DateTime<Tz>,
    pub html_report: PathBuf,
    pub home_csv: PathBuf,
    pub work_csv: PathBuf,
    pub png_report: Option<PathBuf>,
    pub email_sent: bool,
    pub home: SiteForecast,
    pub work: SiteForecast,
}

pub async fn run_pipeline (config: &AppConfig)->Result<RunOutput> {
    let client = net::new_client(&config.user_agent)?;
    let ttl = if config.no_cache { Duration::ZERO } else { hours(config.cache_ttl_hours) };
    let cache = Arc::new( FileCache::new( CACHE_ROOT, ttl)?);
    let decoder: Arc<dyn GribDecode> = Arc::new( GribCrateDecoder::new());

    let nbm = NbmIngestor::new( client.clone(), cache.clone(), config.days, config.tz, decoder);
    let gridpoint = GridpointIngestor::new( client.clone(), cache.clone(), config.days, config.tz);
    let ndfd = NdfdIngestor::new( client.clone(), cache.clone(), config.days, config.tz);
    let rss = RssIngestor::new( client.clone(), cache.clone(), config.days, config.tz);

    let public_files: [&dyn Ingestor; 3] = [&nbm, &gridpoint, &ndfd];
    let order = ingestor_order( config.primary_ingest, config.rss_fallback, public_files, &rss);

    let sites = [&config.home, &config.work];
    let mut records: [Vec<SourceDailyRecord>; 2] = [Vec::new(), Vec::new()];
    let mut ok: [Vec<String>; 2] = Default::default();
    let mut failed: [Vec<String>; 2] = Default::default();

    // ingestors outermost so a source that fails for one site still runs for the other
    for ingestor in &order {
        for (i, site) in sites.iter().enumerate() {
            let source = ingestor.source_name();
            match ingestor.fetch(site).await {
                Ok(recs) if !recs.is_empty() => {
                    info!("{} contributed {} daily records for {}", source, recs.len(), site.name);
                    records[i].extend(recs);
                    if !ok[i].iter().any( |s| s == source) {
                        ok[i].push( source.to_string());
                    }
                }
                Ok(_) => {
                    warn!("{} returned no data for {}", source, site.name);
                    failed[i].push( format!("{}: no data", source));
                }
                Err(e) => {
                    error!("{} ingest failed for {}: {}", source, site.name, e);
                    failed[i].push( format!("{}: {}", source, e));
                }
            }
        }
    }

    let [home_records, work_records] = records;
    let home_days = build_site_ensembles( &config.home.name, home_records, config.days);
    let work_days = build_site_ensembles( &config.work.name, work_records, config.days);

    // advisory alerts are best effort, a failure only costs the report annotation
    let alerts_client = AlertsClient::new( client.clone());
    let mut alerts: [Vec<AlertSummary>; 2] = Default::default();
    for (i, site) in sites.iter().enumerate() {
        match alerts_client.fetch(site).await {
            Ok(list) => alerts[i] = list,
            Err(e) => warn!("alerts lookup failed for {}: {}", site.name, e)
        }
    }
    let [home_alerts, work_alerts] = alerts;

    let [ok_home, ok_work] = ok;
    let [failed_home, failed_work] = failed;

    let home = SiteForecast {
        site: config.home.clone(),
        days: home_days,
        sources_ok: ok_home,
        sources_failed: failed_home,
        alerts: home_alerts,
    };
    let work = SiteForecast {
        site: config.work.clone(),
        days: work_days,
        sources_ok: ok_work,
        sources_failed: failed_work,
        alerts: work_alerts,
    };

    let generated_at = utc_now().with_timezone(&config.tz);
    let stamp = generated_at.format("%Y%m%d").to_string();

    ensure_writable_dir(&config.out_dir)?;
    let html_report = config.out_dir.join( format!("report_{stamp}.html"));
    let home_csv = config.out_dir.join( format!("home_best_{stamp}.csv"));
    let work_csv = config.out_dir.join( format!("work_best_{stamp}.csv"));

    let html = report::html::render_report( &generated_at, &home, &work);
    set_filepath_contents( &html_report, html.as_bytes())?;
    report::csv::write_home_csv( &home.days, &home_csv)?;
    report::csv::write_work_csv( &work.days, &work_csv)?;
    info!("report written to {:?}", html_report);

    let mut email_sent = false;
    if config.email.enabled() && !config.html_only {
        let mailer = Mailer::new( config.email.clone());
        let attachments = vec![
            ("home".to_string(), home_csv.clone()),
            ("work".to_string(), work_csv.clone()),
        ];
        match mailer.send( EMAIL_SUBJECT, &html, &attachments).await {
            Ok(()) => email_sent = true,
            Err(e) => error!("email delivery failed: {}", e)
        }
    }

    Ok( RunOutput {
        generated_at,
        html_report,
        home_csv,
        work_csv,
        png_report: None,
        email_sent,
        home,
        work,
    })
}
