use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;

/// Delivers a generated report by email with the PDF and chart attached.
///
/// Delivery is deliberately non-throwing: every failure mode (missing
/// credentials, missing attachment files, SMTP rejection) comes back as
/// `(false, message)` so a failed send never invalidates the report that
/// was already rendered.
pub fn send_report(
    config: &Config,
    report_text: &str,
    chart_path: Option<&Path>,
    pdf_path: &Path,
) -> (bool, String) {
    match try_send(config, report_text, chart_path, pdf_path) {
        Ok(message) => (true, message),
        Err(message) => (false, message),
    }
}

fn try_send(
    config: &Config,
    report_text: &str,
    chart_path: Option<&Path>,
    pdf_path: &Path,
) -> Result<String, String> {
    let smtp = config.smtp.as_ref().ok_or_else(|| {
        "Email is not configured; set SMTP_HOST, SMTP_USER, SMTP_PASS, MAIL_FROM and MAIL_TO"
            .to_string()
    })?;

    if !pdf_path.exists() {
        return Err(format!("PDF report file not found: {}", pdf_path.display()));
    }
    if let Some(chart) = chart_path {
        if !chart.exists() {
            return Err(format!("Chart image file not found: {}", chart.display()));
        }
    }

    let pdf_data =
        std::fs::read(pdf_path).map_err(|e| format!("Failed to read PDF attachment: {}", e))?;

    let from: Mailbox = smtp
        .from
        .parse()
        .map_err(|e| format!("Invalid MAIL_FROM address: {}", e))?;

    let mut builder = Message::builder().from(from).subject("Daily Sales Report");
    for recipient in &smtp.recipients {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| format!("Invalid recipient {}: {}", recipient, e))?;
        builder = builder.to(to);
    }

    let pdf_type =
        ContentType::parse("application/pdf").map_err(|e| format!("Invalid media type: {}", e))?;
    let mut parts = MultiPart::mixed()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(report_text.to_string()),
        )
        .singlepart(Attachment::new(file_name(pdf_path)).body(pdf_data, pdf_type));

    if let Some(chart) = chart_path {
        let chart_data =
            std::fs::read(chart).map_err(|e| format!("Failed to read chart attachment: {}", e))?;
        let png_type =
            ContentType::parse("image/png").map_err(|e| format!("Invalid media type: {}", e))?;
        parts = parts.singlepart(Attachment::new(file_name(chart)).body(chart_data, png_type));
    }

    let email = builder
        .multipart(parts)
        .map_err(|e| format!("Failed to build email: {}", e))?;

    let creds = Credentials::new(smtp.user.clone(), smtp.pass.clone());
    let tls = TlsParameters::new(smtp.host.clone())
        .map_err(|e| format!("Failed to configure TLS: {}", e))?;
    let transport = SmtpTransport::relay(&smtp.host)
        .map_err(|e| format!("Failed to configure SMTP relay: {}", e))?
        .credentials(creds)
        .port(465)
        .tls(Tls::Wrapper(tls))
        .build();

    transport
        .send(&email)
        .map(|_| "Email sent successfully!".to_string())
        .map_err(|e| format!("Failed to send email: {}", e))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;
    use std::path::PathBuf;

    fn config_with_smtp() -> Config {
        Config {
            addr: "127.0.0.1:0".to_string(),
            sheet_source: "sales.csv".to_string(),
            data_dir: PathBuf::from("database"),
            reports_dir: PathBuf::from("reports"),
            admin_user: "admin".to_string(),
            admin_password_hash: "$argon2id$stub".to_string(),
            smtp: Some(SmtpConfig {
                host: "smtp.example.com".to_string(),
                user: "reports@example.com".to_string(),
                pass: "secret".to_string(),
                from: "Salesboard <reports@example.com>".to_string(),
                recipients: vec!["team@example.com".to_string()],
            }),
        }
    }

    #[test]
    fn missing_pdf_reports_failure_without_raising() {
        let config = config_with_smtp();
        let missing = PathBuf::from("/definitely/not/here/report.pdf");

        let (success, message) = send_report(&config, "text", None, &missing);

        assert!(!success);
        assert!(message.contains("report.pdf"), "message was: {message}");
    }

    #[test]
    fn missing_chart_reports_failure() {
        let config = config_with_smtp();
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        std::fs::write(&pdf, b"%PDF-").unwrap();
        let missing_chart = dir.path().join("chart.png");

        let (success, message) = send_report(&config, "text", Some(&missing_chart), &pdf);

        assert!(!success);
        assert!(message.contains("chart.png"));
    }

    #[test]
    fn absent_credentials_report_failure() {
        let mut config = config_with_smtp();
        config.smtp = None;
        let (success, message) = send_report(&config, "text", None, Path::new("report.pdf"));

        assert!(!success);
        assert!(message.contains("not configured"));
    }
}
