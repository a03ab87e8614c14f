//! Email service for the product sync summary.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and text templates.

use askama::Template;
use chrono::{DateTime, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use uuid::Uuid;

use woo_holded_core::SyncFailure;

use crate::config::EmailConfig;

/// Summary of a finished sync epoch.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub epoch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: u64,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Subject line of the summary email.
    #[must_use]
    pub fn subject(&self) -> String {
        if self.failures.is_empty() {
            format!("Product sync finished: {} products", self.total)
        } else {
            format!(
                "Product sync finished: {} products, {} failed",
                self.total,
                self.failures.len()
            )
        }
    }
}

/// HTML template for the sync summary.
#[derive(Template)]
#[template(path = "email/sync_report.html")]
struct SyncReportHtml<'a> {
    epoch_id: String,
    started_at: String,
    finished_at: String,
    total: u64,
    failed: usize,
    failures: &'a [SyncFailure],
}

/// Plain text template for the sync summary.
#[derive(Template)]
#[template(path = "email/sync_report.txt")]
struct SyncReportText<'a> {
    epoch_id: String,
    started_at: String,
    finished_at: String,
    total: u64,
    failed: usize,
    failures: &'a [SyncFailure],
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for the sync summary.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    report_to: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("from_address", &self.from_address)
            .field("report_to", &self.report_to)
            .finish_non_exhaustive()
    }
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            report_to: config.report_to.clone(),
        })
    }

    /// Send the summary of a finished epoch to the report recipient.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_sync_report(&self, report: &SyncReport) -> Result<(), EmailError> {
        let (text, html) = render_report(report)?;
        self.send_multipart_email(&self.report_to, &report.subject(), &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Render the text and HTML bodies of a report.
fn render_report(report: &SyncReport) -> Result<(String, String), askama::Error> {
    let fmt = |t: &DateTime<Utc>| t.format("%Y-%m-%d %H:%M UTC").to_string();

    let text = SyncReportText {
        epoch_id: report.epoch_id.to_string(),
        started_at: fmt(&report.started_at),
        finished_at: fmt(&report.finished_at),
        total: report.total,
        failed: report.failures.len(),
        failures: &report.failures,
    }
    .render()?;

    let html = SyncReportHtml {
        epoch_id: report.epoch_id.to_string(),
        started_at: fmt(&report.started_at),
        finished_at: fmt(&report.finished_at),
        total: report.total,
        failed: report.failures.len(),
        failures: &report.failures,
    }
    .render()?;

    Ok((text, html))
}
