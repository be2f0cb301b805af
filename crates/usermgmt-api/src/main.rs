//! 사용자/역할 관리 API 서버.
//!
//! 설정을 로드하고 저장소(PostgreSQL 또는 메모리)를 준비한 뒤
//! Axum 기반 REST API 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use usermgmt_api::auth::TokenIssuer;
use usermgmt_api::metrics::setup_metrics_recorder;
use usermgmt_api::middleware::metrics_layer;
use usermgmt_api::openapi::swagger_ui_router;
use usermgmt_api::repository::{MemoryCredentialStore, PgCredentialStore};
use usermgmt_api::routes::create_api_router;
use usermgmt_api::state::AppState;
use usermgmt_core::{init_logging, AppConfig, LogConfig, UserMgmtError};

/// 설정 파일 경로 환경 변수.
const CONFIG_PATH_ENV: &str = "USERMGMT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 설정에 따라 저장소를 선택하고 AppState를 생성합니다.
///
/// `database.url`이 없으면 메모리 저장소로 실행합니다.
async fn create_app_state(config: &AppConfig) -> Result<AppState, UserMgmtError> {
    let tokens = TokenIssuer::from_config(&config.auth);

    let Some(url) = config.database.url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory credential store (data is not persisted)");
        return Ok(AppState::new(Arc::new(MemoryCredentialStore::new()), tokens));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to database");
            UserMgmtError::Database(e.to_string())
        })?;
    info!(
        max_connections = config.database.max_connections,
        "Database connection pool created"
    );

    let store = PgCredentialStore::new(pool.clone());
    if config.database.run_migrations {
        store.migrate().await?;
    }

    Ok(AppState::new(Arc::new(store), tokens).with_db_pool(pool))
}

/// CORS 레이어 생성.
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://admin.example.com,https://app.example.com`
fn cors_layer() -> CorsLayer {
    let origins_env = std::env::var("CORS_ORIGINS").ok().filter(|o| !o.is_empty());

    let allow_origin = match &origins_env {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 자격 증명 포함 허용 (origin 목록 지정 시에만)
        .allow_credentials(origins_env.is_some())
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    // 메트릭 라우터 (별도 상태)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use usermgmt_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    // 설정 로드
    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)?;

    // tracing 초기화
    init_logging(LogConfig::from(&config.logging))?;
    info!(config_path = %config_path, "Starting User Management API server...");

    if config.auth.uses_default_secret() {
        warn!("JWT secret not configured, using default (INSECURE for development only)");
    }

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| {
        error!(
            address = %config.bind_address(),
            error = %e,
            "Invalid bind address. Check server.host and server.port."
        );
        e
    })?;

    let state = Arc::new(create_app_state(&config).await?);
    info!(
        version = %state.version,
        store = state.store.backend_name(),
        has_db = state.db_pool.is_some(),
        access_ttl_secs = state.tokens.access_ttl_secs(),
        "Application state initialized"
    );

    // 기본 역할 및 초기 사용자
    if config.bootstrap.seed_defaults {
        state.users.seed_defaults(&config.bootstrap).await?;
        info!("Default roles and bootstrap user ensured");
    }

    let app = create_router(
        state,
        metrics_handle,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
