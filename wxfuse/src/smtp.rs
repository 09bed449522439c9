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

///! SMTP delivery of the rendered report with the CSV sheets attached

use std::fs;
use std::path::PathBuf;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart, header::ContentType};
use tracing::info;

use crate::config::EmailConfig;
use crate::{Result, WxFuseError};

fn smtp_error (msg: impl ToString)->WxFuseError {
    WxFuseError::SmtpError( msg.to_string())
}

pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    pub fn new (config: EmailConfig)->Self {
        Mailer { config }
    }

    pub async fn send (&self, subject: &str, html_body: &str, attachments: &[(String, PathBuf)])->Result<()> {
        let config = &self.config;
        if !config.enabled() {
            return Err( smtp_error("email settings incomplete"))
        }

        // enabled() guarantees all credential parts are present
        let host = config.host.as_deref().unwrap();
        let sender: Mailbox = config.sender.as_deref().unwrap().parse()
            .map_err( |e| smtp_error( format!("invalid sender address: {e}")))?;
        let recipient: Mailbox = config.recipient.as_deref().unwrap().parse()
            .map_err( |e| smtp_error( format!("invalid recipient address: {e}")))?;

        let creds = Credentials::new(
            config.username.clone().unwrap(),
            config.password.clone().unwrap()
        );
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err( |e| smtp_error( format!("could not connect to SMTP: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        let mut parts = MultiPart::mixed().multipart(
            MultiPart::alternative()
                .singlepart( SinglePart::plain( "This email requires an HTML-capable client.".to_string()))
                .singlepart( SinglePart::html( html_body.to_string()))
        );

        let csv_type: ContentType = "text/csv".parse().unwrap(); // known valid
        for (label, path) in attachments {
            let data = fs::read(path)?;
            let filename = path.file_name()
                .map( |n| n.to_string_lossy().to_string())
                .unwrap_or_else( || format!("{label}.csv"));
            parts = parts.singlepart( Attachment::new(filename).body( Body::new(data), csv_type.clone()));
        }

        let message = Message::builder()
            .from(sender)
            .to( recipient.clone())
            .subject(subject)
            .multipart(parts)
            .map_err( |e| smtp_error( format!("failed to construct email: {e:?}")))?;

        let response = mailer.send(message).await
            .map_err( |e| smtp_error( format!("send failed: {e}")))?;
        if response.is_positive() {
            info!("email delivered to {}", recipient);
            Ok(())
        } else {
            Err( smtp_error( format!("{response:?}")))
        }
    }
}
