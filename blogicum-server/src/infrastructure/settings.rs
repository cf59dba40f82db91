use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::domain::pagination::DEFAULT_PAGE_SIZE;

/// Where posts, comments and users live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    /// Process-local store, optionally seeded with categories and locations.
    Memory { fixtures: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub storage: StorageBackend,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub posts_per_page: u32,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let storage = storage_from_env()?;
        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        let jwt_ttl_seconds = parse_i64_env("JWT_TTL_SECONDS", 3600)?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8000,http://127.0.0.1:8000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let posts_per_page = parse_u32_env("POSTS_PER_PAGE", DEFAULT_PAGE_SIZE)?;
        let database_max_connections = parse_u32_env("DATABASE_MAX_CONNECTIONS", 5)?;
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 10)?;

        Ok(Self {
            storage,
            database_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            posts_per_page,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }
}

fn storage_from_env() -> Result<StorageBackend> {
    let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".to_string());
    let fixtures = std::env::var("MEMORY_FIXTURES").ok();
    let database_url = || get_required("DATABASE_URL").context("DATABASE_URL is required");
    parse_storage_backend(&backend, fixtures, database_url)
}

fn parse_storage_backend(
    backend: &str,
    fixtures: Option<String>,
    database_url: impl FnOnce() -> Result<String>,
) -> Result<StorageBackend> {
    match backend.trim().to_ascii_lowercase().as_str() {
        "postgres" => Ok(StorageBackend::Postgres {
            database_url: database_url()?,
        }),
        "memory" => Ok(StorageBackend::Memory {
            fixtures: fixtures
                .map(|path| path.trim().to_string())
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        }),
        other => Err(anyhow!(
            "STORAGE_BACKEND must be `postgres` or `memory`, got `{other}`"
        )),
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_i64_env(key: &str, default: i64) -> Result<i64> {
    parse_positive_i64(key, std::env::var(key).ok(), default)
}

fn parse_positive_i64(key: &str, raw: Option<String>, default: i64) -> Result<i64> {
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?,
        None => default,
    };

    if value <= 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
