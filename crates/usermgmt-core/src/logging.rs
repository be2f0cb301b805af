//! tracing 기반 로깅 초기화.
//!
//! 출력 형식은 `[logging] format`으로 고릅니다:
//! - **pretty**: 개발용, 여러 줄
//! - **json**: 로그 수집기용
//! - **compact**: 한 줄

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// `init_logging`에 넘기는 해석된 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "usermgmt_api=debug,tower_http=info")
    pub level: String,
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함
    pub with_file: bool,
    /// 모듈 경로 포함
    pub with_target: bool,
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            // 알 수 없는 형식은 pretty
            format: config.format.parse().unwrap_or_default(),
            with_file: config.file_line,
            with_target: config.target,
        }
    }
}

/// 전역 tracing subscriber 설치.
///
/// `RUST_LOG`가 있으면 `config.level`보다 우선합니다. 두 번째 호출은 에러를 반환합니다.
///
/// ```no_run
/// use usermgmt_core::{init_logging, LogConfig, LoggingConfig};
///
/// init_logging(LogConfig::from(&LoggingConfig::default())).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let layer = fmt::layer()
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target);

    let layer = match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    tracing::info!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}
