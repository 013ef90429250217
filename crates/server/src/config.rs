use shared_types::AppConfig;
use std::path::PathBuf;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Default config location, relative to the working directory.
const CONFIG_PATH: &str = "config.toml";

/// Path of the config file: `JURISDICT_CONFIG` if set, else `config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("JURISDICT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_PATH))
}

/// Read the config file, apply environment overrides, and store the result
/// in the global `OnceLock`. Only the first call has effect.
///
/// A missing or unparseable file falls back to defaults. Runs before the
/// tracing subscriber exists, so problems are reported on stderr.
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        let _ = dotenvy::dotenv();
        let path = config_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("[config] Failed to parse {}: {e}, using defaults", path.display());
                AppConfig::default()
            }),
            Err(e) => {
                eprintln!("[config] {} not found ({e}), using defaults", path.display());
                AppConfig::default()
            }
        };
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        config
    })
}

/// Overlay secrets and endpoints from the environment. Empty values are ignored.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var("DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(secret) = var("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    if let Some(url) = var("AI_SERVICE_URL") {
        config.ai.base_url = url;
    }
    if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
        config.server.port = port;
    }
    if let Some(env) = var("DEPLOY_ENV") {
        config.server.environment = env;
    }
    if let Some(origin) = var("CORS_ORIGIN") {
        config.server.cors_origin = Some(origin);
    }
    if let Some(format) = var("LOG_FORMAT") {
        config.logging.format = format;
    }
}
