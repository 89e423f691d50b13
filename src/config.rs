use std::env;
use std::path::PathBuf;

use log::warn;

/// Immutable process configuration, loaded once at startup.
///
/// Credentials and recipients are never hardcoded; they come from the
/// environment (a `.env` file is honoured via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the web server binds to.
    pub addr: String,

    /// Spreadsheet source: an `http(s)://` published-CSV URL or a local
    /// CSV file path.
    pub sheet_source: String,

    /// Directory for persisted dataset snapshots.
    pub data_dir: PathBuf,

    /// Directory for generated charts and PDFs.
    pub reports_dir: PathBuf,

    /// Username of the single dashboard account.
    pub admin_user: String,

    /// Argon2 PHC hash of the account password.
    pub admin_password_hash: String,

    /// SMTP delivery settings. Absent settings degrade the send-report
    /// action to a reported failure, never a panic.
    pub smtp: Option<SmtpConfig>,
}

/// SMTP settings for report delivery.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub recipients: Vec<String>,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// Required: `SHEET_SOURCE`, `ADMIN_USER`, `ADMIN_PASSWORD_HASH`.
    /// Optional with defaults: `SALESBOARD_ADDR` (127.0.0.1:3000),
    /// `DATA_DIR` (database), `REPORTS_DIR` (reports).
    /// Optional: `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`, `MAIL_FROM`,
    /// `MAIL_TO` (comma-separated recipient list).
    pub fn from_env() -> Result<Self, String> {
        let sheet_source = required("SHEET_SOURCE")?;
        let admin_user = required("ADMIN_USER")?;
        let admin_password_hash = required("ADMIN_PASSWORD_HASH")?;

        let addr = env::var("SALESBOARD_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "database".to_string()));
        let reports_dir =
            PathBuf::from(env::var("REPORTS_DIR").unwrap_or_else(|_| "reports".to_string()));

        let smtp = match (
            env::var("SMTP_HOST"),
            env::var("SMTP_USER"),
            env::var("SMTP_PASS"),
            env::var("MAIL_FROM"),
            env::var("MAIL_TO"),
        ) {
            (Ok(host), Ok(user), Ok(pass), Ok(from), Ok(to)) => {
                let recipients: Vec<String> = to
                    .split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect();
                if recipients.is_empty() {
                    warn!("MAIL_TO contains no recipients; report delivery disabled");
                    None
                } else {
                    Some(SmtpConfig {
                        host,
                        user,
                        pass,
                        from,
                        recipients,
                    })
                }
            }
            _ => {
                warn!("SMTP settings incomplete; report delivery disabled");
                None
            }
        };

        Ok(Config {
            addr,
            sheet_source,
            data_dir,
            reports_dir,
            admin_user,
            admin_password_hash,
            smtp,
        })
    }
}

fn required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required environment variable {}", key))
}
