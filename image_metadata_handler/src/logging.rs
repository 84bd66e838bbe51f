//! Process level logging setup for the lambda

use tracing_subscriber::EnvFilter;

/// Set by the Lambda runtime in every function container
const LAMBDA_FUNCTION_VAR: &str = "AWS_LAMBDA_FUNCTION_NAME";
/// Forces a format regardless of where the binary runs
const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// flattened JSON lines for CloudWatch
    Json,
    /// human readable, coloured output for running against localstack
    Pretty,
}

impl LogFormat {
    /// An explicit `LOG_FORMAT` of `json` or `pretty` wins. Otherwise JSON inside a
    /// Lambda container and pretty everywhere else.
    pub fn detect(lambda_function: Option<&str>, log_format: Option<&str>) -> Self {
        match log_format.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => return LogFormat::Json,
            Some(f) if f.eq_ignore_ascii_case("pretty") => return LogFormat::Pretty,
            _ => (),
        }

        match lambda_function {
            Some(name) if !name.is_empty() => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::detect(
            std::env::var(LAMBDA_FUNCTION_VAR).ok().as_deref(),
            std::env::var(LOG_FORMAT_VAR).ok().as_deref(),
        )
    }
}

/// Loads `.env`, routes panics through tracing and installs the global subscriber.
/// Must run once, before the first log line.
pub fn init() -> LogFormat {
    dotenv::dotenv().ok();
    std::panic::set_hook(Box::new(tracing_panic::panic_hook));

    let format = LogFormat::from_env();

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_ansi(true)
                .with_env_filter(EnvFilter::from_default_env())
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .init();
        }
        LogFormat::Json => {
            // CloudWatch stamps ingestion time on every line
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_env_filter(EnvFilter::from_default_env())
                .with_file(true)
                .with_line_number(true)
                .without_time()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .init();
        }
    }

    format
}
