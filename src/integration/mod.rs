use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use log::{LevelFilter, warn};
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};

pub mod api;

type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Any non-success response. The message is the response body, or the
    /// canonical status reason when the body is empty.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    _ParseUrl(#[from] url::ParseError),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::_Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Env {
    Local,
    Dev,
    Stage,
    Production,
}

impl Env {
    pub fn default_level(&self) -> LevelFilter {
        match self {
            Env::Local | Env::Dev => LevelFilter::Debug,
            Env::Stage | Env::Production => LevelFilter::Info,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub env: Env,
    pub api: api::Config,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        let env = env::var("ENV")
            .map(|env| match env.as_str() {
                "local" => Env::Local,
                "dev" => Env::Dev,
                "stg" => Env::Stage,
                "prod" => Env::Production,
                _ => panic!("Invalid environment: {env}"),
            })
            .unwrap_or(Env::Local);

        init_logger(&env);

        let poll_interval = env::var("CHAT_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let api = api::Config::env().unwrap_or_else(|| {
            warn!("API env is not configured, falling back to defaults");
            api::Config::default()
        });

        Self {
            env,
            api,
            poll_interval,
        }
    }
}

fn init_logger(env: &Env) {
    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|l| LevelFilter::from_str(&l).ok())
        .unwrap_or_else(|| env.default_level());
    let log_file = env::var("SERVICE_NAME")
        .map(|pkg| format!("{pkg}.log"))
        .unwrap_or("ymm_messenger.log".into());

    let file = match std::fs::File::create(&log_file) {
        Ok(file) => file,
        Err(e) => panic!("Failed to create log file {log_file}: {e}"),
    };

    if let Err(e) = CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(level, simplelog::Config::default(), file),
    ]) {
        // a logger can only be installed once per process
        eprintln!("Logger already initialized: {e}");
    }
}

pub fn init_http_client(config: &api::Config) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(Error::from)
}
