use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    ComparisonSummary, SimulationConfig, SimulationResult, YearlyRecord, net_growth_rate, project,
    projection_horizon, summarize,
};

mod render;

pub use render::{format_currency, format_percent, render_summary, render_table};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Rejected user input. Messages name the CLI flag at fault.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{flag} must be a finite number")]
    NonFinite { flag: &'static str },
    #[error("{flag} must be >= {min} (got {value})")]
    BelowMinimum {
        flag: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{flag} must be > {min} (got {value})")]
    NotAbove {
        flag: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{flag} must be between {min} and {max} (got {value})")]
    OutOfRange {
        flag: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    #[serde(alias = "age")]
    current_age: Option<i32>,
    #[serde(alias = "retireAge")]
    retirement_age: Option<i32>,
    #[serde(alias = "salary")]
    gross_salary: Option<f64>,
    #[serde(alias = "salaryGrowth")]
    salary_growth_rate: Option<f64>,
    #[serde(alias = "growth")]
    investment_growth_rate: Option<f64>,
    #[serde(alias = "fees")]
    fee_rate: Option<f64>,
    #[serde(alias = "aeStartPot")]
    statutory_start_balance: Option<f64>,
    #[serde(alias = "ppStartPot")]
    private_start_balance: Option<f64>,
    #[serde(alias = "aePhase")]
    phase_in: Option<bool>,
    #[serde(alias = "aeEmpRate")]
    statutory_fixed_employee_rate: Option<f64>,
    #[serde(alias = "ppEmpRate")]
    private_employee_rate: Option<f64>,
    #[serde(alias = "ppErRate")]
    private_employer_rate: Option<f64>,
    private_tax_relief_rate: Option<f64>,
    /// Short-form tax relief, given as a fraction (0.4) rather than a percent.
    #[serde(rename = "ppTaxRelief", skip_serializing_if = "Option::is_none")]
    tax_relief_fraction: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pension-compare",
    about = "Projects an auto-enrolment pot against a private pension pot year by year"
)]
pub struct Cli {
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    current_age: i32,
    #[arg(long, default_value_t = 66, allow_negative_numbers = true)]
    retirement_age: i32,
    #[arg(long, default_value_t = 60000.0, help = "Gross annual salary in year one")]
    gross_salary: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        allow_negative_numbers = true,
        help = "Annual salary growth in percent"
    )]
    salary_growth_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Expected annual investment return in percent"
    )]
    investment_growth_rate: f64,
    #[arg(
        long,
        default_value_t = 0.8,
        help = "Annual fees in percent, applied to both schemes"
    )]
    fee_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Current auto-enrolment pot")]
    statutory_start_balance: f64,
    #[arg(long, default_value_t = 0.0, help = "Current private pension pot")]
    private_start_balance: f64,
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        help = "Use the statutory phase-in (1.5%, 3%, 4.5%, then 6% from year 10)"
    )]
    phase_in: bool,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Auto-enrolment employee rate in percent when phase-in is off; the employer mirrors it"
    )]
    statutory_fixed_employee_rate: f64,
    #[arg(long, default_value_t = 10.0, help = "Private employee contribution in percent")]
    private_employee_rate: f64,
    #[arg(long, default_value_t = 6.0, help = "Private employer contribution in percent")]
    private_employer_rate: f64,
    #[arg(
        long,
        default_value_t = 40.0,
        help = "Income tax relief on private employee contributions in percent"
    )]
    private_tax_relief_rate: f64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long, help = "Print the year-by-year breakdown after the summary")]
    table: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    horizon_years: u32,
    net_growth_rate: f64,
    rows: Vec<YearlyRecord>,
    statutory_pot_balance: f64,
    private_pot_balance: f64,
    summary: ComparisonSummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn ensure_at_least(flag: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::BelowMinimum { flag, min, value });
    }
    Ok(())
}

fn ensure_above(flag: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if value <= min {
        return Err(ConfigError::NotAbove { flag, min, value });
    }
    Ok(())
}

fn ensure_within(flag: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            flag,
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<SimulationConfig, ConfigError> {
    for (flag, value) in [
        ("--gross-salary", cli.gross_salary),
        ("--salary-growth-rate", cli.salary_growth_rate),
        ("--investment-growth-rate", cli.investment_growth_rate),
        ("--fee-rate", cli.fee_rate),
        ("--statutory-start-balance", cli.statutory_start_balance),
        ("--private-start-balance", cli.private_start_balance),
        (
            "--statutory-fixed-employee-rate",
            cli.statutory_fixed_employee_rate,
        ),
        ("--private-employee-rate", cli.private_employee_rate),
        ("--private-employer-rate", cli.private_employer_rate),
        ("--private-tax-relief-rate", cli.private_tax_relief_rate),
    ] {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { flag });
        }
    }

    ensure_at_least("--gross-salary", cli.gross_salary, 0.0)?;
    ensure_at_least("--statutory-start-balance", cli.statutory_start_balance, 0.0)?;
    ensure_at_least("--private-start-balance", cli.private_start_balance, 0.0)?;
    ensure_above("--salary-growth-rate", cli.salary_growth_rate, -100.0)?;
    ensure_above("--investment-growth-rate", cli.investment_growth_rate, -100.0)?;
    ensure_at_least("--fee-rate", cli.fee_rate, 0.0)?;

    for (flag, rate) in [
        (
            "--statutory-fixed-employee-rate",
            cli.statutory_fixed_employee_rate,
        ),
        ("--private-employee-rate", cli.private_employee_rate),
        ("--private-employer-rate", cli.private_employer_rate),
        ("--private-tax-relief-rate", cli.private_tax_relief_rate),
    ] {
        ensure_within(flag, rate, 0.0, 100.0)?;
    }

    Ok(SimulationConfig {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        gross_salary: cli.gross_salary,
        salary_growth_rate: cli.salary_growth_rate,
        investment_growth_rate: cli.investment_growth_rate,
        fee_rate: cli.fee_rate,
        statutory_scheme_start_balance: cli.statutory_start_balance,
        private_scheme_start_balance: cli.private_start_balance,
        use_phased_statutory_rate: cli.phase_in,
        statutory_fixed_employee_rate: cli.statutory_fixed_employee_rate,
        private_employee_rate: cli.private_employee_rate,
        private_employer_rate: cli.private_employer_rate,
        private_tax_relief_rate: cli.private_tax_relief_rate / 100.0,
    })
}

fn build_project_response(config: &SimulationConfig) -> ProjectResponse {
    let result = project(config);
    let summary = summarize(&result);
    let SimulationResult {
        rows,
        statutory_pot_balance,
        private_pot_balance,
    } = result;

    ProjectResponse {
        horizon_years: projection_horizon(config),
        net_growth_rate: net_growth_rate(config),
        rows,
        statutory_pot_balance,
        private_pot_balance,
        summary,
    }
}

/// Runs one projection from parsed CLI flags and renders it in the requested format.
pub fn render_cli_output(cli: Cli) -> Result<String, CliError> {
    let config = build_config(&cli)?;
    let response = build_project_response(&config);

    match cli.output {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&response)?)),
        OutputFormat::Table => {
            let mut out = render_summary(&response.summary, response.horizon_years);
            if cli.table {
                out.push('\n');
                out.push_str(&render_table(&response.rows));
            }
            Ok(out)
        }
    }
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/defaults", get(defaults_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    log::info!("pension comparison HTTP API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, payload_from_cli(&default_cli_for_api()))
}

async fn project_get_handler(query: Result<Query<ProjectPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => project_handler_impl(payload).await,
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

async fn project_post_handler(body: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => project_handler_impl(payload).await,
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

fn rejected_payload_response(msg: &str) -> Response {
    log::warn!("rejected projection request: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let config = match config_from_payload(payload) {
        Ok(config) => config,
        Err(err) => return rejected_payload_response(&err.to_string()),
    };

    log::debug!(
        "projecting {} years from age {}",
        projection_horizon(&config),
        config.current_age
    );
    json_response(StatusCode::OK, build_project_response(&config))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn config_from_json(json: &str) -> Result<SimulationConfig, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    config_from_payload(payload).map_err(|e| e.to_string())
}

fn config_from_payload(payload: ProjectPayload) -> Result<SimulationConfig, ConfigError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.gross_salary {
        cli.gross_salary = v;
    }
    if let Some(v) = payload.salary_growth_rate {
        cli.salary_growth_rate = v;
    }
    if let Some(v) = payload.investment_growth_rate {
        cli.investment_growth_rate = v;
    }
    if let Some(v) = payload.fee_rate {
        cli.fee_rate = v;
    }
    if let Some(v) = payload.statutory_start_balance {
        cli.statutory_start_balance = v;
    }
    if let Some(v) = payload.private_start_balance {
        cli.private_start_balance = v;
    }
    if let Some(v) = payload.phase_in {
        cli.phase_in = v;
    }
    if let Some(v) = payload.statutory_fixed_employee_rate {
        cli.statutory_fixed_employee_rate = v;
    }
    if let Some(v) = payload.private_employee_rate {
        cli.private_employee_rate = v;
    }
    if let Some(v) = payload.private_employer_rate {
        cli.private_employer_rate = v;
    }
    if let Some(v) = payload.tax_relief_fraction {
        cli.private_tax_relief_rate = v * 100.0;
    }
    if let Some(v) = payload.private_tax_relief_rate {
        cli.private_tax_relief_rate = v;
    }

    build_config(&cli)
}

fn payload_from_cli(cli: &Cli) -> ProjectPayload {
    ProjectPayload {
        current_age: Some(cli.current_age),
        retirement_age: Some(cli.retirement_age),
        gross_salary: Some(cli.gross_salary),
        salary_growth_rate: Some(cli.salary_growth_rate),
        investment_growth_rate: Some(cli.investment_growth_rate),
        fee_rate: Some(cli.fee_rate),
        statutory_start_balance: Some(cli.statutory_start_balance),
        private_start_balance: Some(cli.private_start_balance),
        phase_in: Some(cli.phase_in),
        statutory_fixed_employee_rate: Some(cli.statutory_fixed_employee_rate),
        private_employee_rate: Some(cli.private_employee_rate),
        private_employer_rate: Some(cli.private_employer_rate),
        private_tax_relief_rate: Some(cli.private_tax_relief_rate),
        tax_relief_fraction: None,
    }
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 30,
        retirement_age: 66,
        gross_salary: 60_000.0,
        salary_growth_rate: 3.0,
        investment_growth_rate: 5.0,
        fee_rate: 0.8,
        statutory_start_balance: 0.0,
        private_start_balance: 0.0,
        phase_in: true,
        statutory_fixed_employee_rate: 6.0,
        private_employee_rate: 10.0,
        private_employer_rate: 6.0,
        private_tax_relief_rate: 40.0,
        output: OutputFormat::Json,
        table: false,
    }
}
