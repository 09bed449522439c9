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

use clap::Parser;
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use wxfuse_common::fs::ensure_writable_dir;
use wxfuse::config::{load_config, resolve_logs_dir, CliArgs};
use wxfuse::pipeline::run_pipeline;
use wxfuse::Result;

#[tokio::main]
async fn main ()->Result<()> {
    let args = CliArgs::parse();

    // console plus rolling file, installed before config resolution so that
    // work-site geocoding is already captured
    let logs_dir = resolve_logs_dir(&args);
    ensure_writable_dir(&logs_dir)?;
    let file_appender = tracing_appender::rolling::daily( &logs_dir, "app.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with( tracing_subscriber::filter::LevelFilter::INFO)
        .with( tracing_subscriber::fmt::layer())
        .with( tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    let config = load_config(&args).await?;
    let output = run_pipeline(&config).await?;

    let summary = json!({
        "html_report": output.html_report,
        "csv_paths": {
            "home": output.home_csv,
            "work": output.work_csv,
        },
        "email_sent": output.email_sent,
    });
    println!("{}", serde_json::to_string_pretty(&summary).expect("summary is always serializable"));

    Ok(())
}
