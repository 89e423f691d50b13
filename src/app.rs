use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Form, Path as AxumPath, State},
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::auth::{self, SESSION_COOKIE};
use crate::config::Config;
use crate::error::ReportError;
use crate::{ingest, mailer, pdf, report, store};

pub struct AppState {
    pub config: Config,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RangeForm {
    start_date: String,
    end_date: String,
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.reports_dir)?;
    std::fs::create_dir_all(&config.data_dir)?;

    let addr = config.addr.clone();
    let state = Arc::new(AppState { config });

    // Every functional route sits behind the session middleware; only the
    // login page is reachable anonymously.
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/generate", post(generate))
        .route("/send-mail", post(send_mail))
        .route("/history", get(history))
        .route("/download/:filename", get(download))
        .route("/logout", get(logout))
        .route_layer(middleware::from_fn(auth::require_auth));

    let app = Router::new()
        .merge(protected)
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(serve_login).post(handle_login))
        .with_state(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Injects page data as a script tag so the static templates can render it.
fn page(template: &'static str, data: serde_json::Value) -> Html<String> {
    let payload = serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string());
    let html = template.replace(
        "</head>",
        &format!("    <script>const PAGE_DATA = {};</script>\n</head>", payload),
    );
    Html(html)
}

fn dashboard_page(data: serde_json::Value) -> Response {
    page(include_str!("./static/index.html"), data).into_response()
}

async fn serve_login() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(credentials): Form<LoginForm>,
) -> Response {
    match auth::verify_login(&state.config, &credentials.username, &credentials.password) {
        Ok(true) => {
            let session_id = auth::create_session(&credentials.username);
            let cookie = Cookie::new(SESSION_COOKIE, session_id);
            (jar.add(cookie), Redirect::to("/dashboard")).into_response()
        }
        Ok(false) => Redirect::to("/login?error=Invalid+username+or+password").into_response(),
        Err(e) => {
            error!("authentication error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error").into_response()
        }
    }
}

async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        auth::end_session(cookie.value());
    }
    (jar.add(Cookie::new(SESSION_COOKIE, "")), Redirect::to("/login"))
}

async fn dashboard() -> Response {
    dashboard_page(json!({}))
}

#[derive(Debug)]
struct PipelineOutcome {
    report: report::Report,
    pdf_path: PathBuf,
}

/// The per-request report pipeline: ingest, persist, aggregate, render.
///
/// Terminal on the first failure; nothing is retried and earlier steps are
/// not rolled back (a persisted snapshot from a failed aggregation stays
/// persisted).
async fn run_pipeline(config: &Config, form: &RangeForm) -> Result<PipelineOutcome, ReportError> {
    let (start, end) = report::parse_range(&form.start_date, &form.end_date)?;

    let dataset = ingest::read_sheet(config).await?;
    if dataset.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    store::save_snapshot(&dataset, &config.data_dir).map_err(ReportError::Snapshot)?;

    let report = report::aggregate(&dataset, start, end, &config.reports_dir)?;
    if report.text.trim().is_empty() {
        return Err(ReportError::EmptyReport);
    }

    let pdf_path = pdf::render_with_chart(
        &report.text,
        report.chart_path.as_deref(),
        &report.label,
        &config.reports_dir,
    )?;

    Ok(PipelineOutcome { report, pdf_path })
}

async fn generate(State(state): State<Arc<AppState>>, Form(form): Form<RangeForm>) -> Response {
    match run_pipeline(&state.config, &form).await {
        Ok(outcome) => {
            let saved_as = outcome
                .pdf_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("report.pdf")
                .to_string();
            info!("generated report {}", saved_as);
            dashboard_page(json!({
                "flash": { "kind": "success", "message": format!("Report generated successfully! Saved as {}", saved_as) },
                "report": outcome.report.text,
                "start_date": form.start_date,
                "end_date": form.end_date,
            }))
        }
        Err(err) => {
            error!("report generation failed: {}", err);
            dashboard_page(json!({
                "flash": { "kind": "error", "message": err.to_string() },
                "start_date": form.start_date,
                "end_date": form.end_date,
            }))
        }
    }
}

async fn send_mail(State(state): State<Arc<AppState>>, Form(form): Form<RangeForm>) -> Response {
    let outcome = match run_pipeline(&state.config, &form).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("report generation failed: {}", err);
            return dashboard_page(json!({
                "flash": { "kind": "error", "message": err.to_string() },
                "start_date": form.start_date,
                "end_date": form.end_date,
            }));
        }
    };

    // Delivery failure is reported but never invalidates the report that
    // was already rendered.
    let (success, message) = mailer::send_report(
        &state.config,
        &outcome.report.text,
        outcome.report.chart_path.as_deref(),
        &outcome.pdf_path,
    );
    if !success {
        error!("report delivery failed: {}", message);
    }
    let kind = if success { "success" } else { "error" };

    dashboard_page(json!({
        "flash": { "kind": kind, "message": message },
        "report": outcome.report.text,
        "start_date": form.start_date,
        "end_date": form.end_date,
    }))
}

async fn history(State(state): State<Arc<AppState>>) -> Response {
    let files = store::list_reports(&state.config.reports_dir);
    page(include_str!("./static/history.html"), json!({ "files": files })).into_response()
}

async fn download(
    State(state): State<Arc<AppState>>,
    AxumPath(filename): AxumPath<String>,
) -> Response {
    if !store::is_safe_report_name(&filename) {
        return (StatusCode::BAD_REQUEST, "Invalid file name").into_response();
    }

    let path = state.config.reports_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = if filename.ends_with(".pdf") {
                "application/pdf"
            } else {
                "image/png"
            };
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Report not found").into_response(),
    }
}
