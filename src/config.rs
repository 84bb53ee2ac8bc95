use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub stripe: StripeConfig,
    pub email: EmailConfig,
    pub app: AppConfig,
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_json_limit")]
    pub json_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    #[serde(default)]
    pub publishable_key: String,
    pub webhook_secret: String,
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    /// 为空时使用 username
    #[serde(default)]
    pub from_address: String,
    #[serde(default = "default_true")]
    pub verify_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 对外访问的根地址，例如 https://example.com
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentConfig {
    pub lookup_attempts: u32,
    pub lookup_interval_ms: u64,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            lookup_attempts: 5,
            lookup_interval_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// 为空时管理接口全部拒绝
    #[serde(default)]
    pub api_key: String,
}

fn default_json_limit() -> usize {
    50 * 1024 * 1024
}

fn default_webhook_tolerance() -> i64 {
    300
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

impl EmailConfig {
    pub fn sender(&self) -> &str {
        if self.from_address.is_empty() {
            &self.username
        } else {
            &self.from_address
        }
    }
}

impl AppConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();

        Ok(config)
    }

    fn from_env_defaults() -> Result<Self, Box<dyn std::error::Error>> {
        let database_url = get_env("DATABASE_URL")
            .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("PORT", get_env_parse("SERVER_PORT", 3000u16)),
                json_limit_bytes: get_env_parse("JSON_LIMIT_BYTES", default_json_limit()),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            stripe: StripeConfig {
                secret_key: get_env("STRIPE_SECRET_KEY").unwrap_or_default(),
                publishable_key: get_env("STRIPE_PUBLISHABLE_KEY").unwrap_or_default(),
                webhook_secret: get_env("STRIPE_WEBHOOK_SECRET")
                    .or_else(|| get_env("STRIPE_ENDPOINT_SECRET"))
                    .unwrap_or_default(),
                webhook_tolerance_secs: get_env_parse(
                    "STRIPE_WEBHOOK_TOLERANCE_SECS",
                    default_webhook_tolerance(),
                ),
            },
            email: EmailConfig {
                smtp_host: get_env("SMTP_HOST").unwrap_or_else(default_smtp_host),
                smtp_port: get_env_parse("SMTP_PORT", default_smtp_port()),
                username: get_env("EMAIL_USER").unwrap_or_default(),
                password: get_env("EMAIL_PASS").unwrap_or_default(),
                from_address: get_env("EMAIL_FROM").unwrap_or_default(),
                verify_on_startup: get_env_parse("EMAIL_VERIFY_ON_STARTUP", true),
            },
            app: AppConfig {
                base_url: get_env("BASE_URL")
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
            },
            fulfillment: FulfillmentConfig {
                lookup_attempts: get_env_parse("FULFILLMENT_LOOKUP_ATTEMPTS", 5u32),
                lookup_interval_ms: get_env_parse("FULFILLMENT_LOOKUP_INTERVAL_MS", 2000u64),
            },
            admin: AdminConfig {
                api_key: get_env("ADMIN_API_KEY").unwrap_or_default(),
            },
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("JSON_LIMIT_BYTES")
            && let Ok(n) = v.parse()
        {
            self.server.json_limit_bytes = n;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_PUBLISHABLE_KEY") {
            self.stripe.publishable_key = v;
        }
        if let Ok(v) = env::var("STRIPE_ENDPOINT_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_TOLERANCE_SECS")
            && let Ok(n) = v.parse()
        {
            self.stripe.webhook_tolerance_secs = n;
        }
        if let Ok(v) = env::var("SMTP_HOST") {
            self.email.smtp_host = v;
        }
        if let Ok(v) = env::var("SMTP_PORT")
            && let Ok(p) = v.parse()
        {
            self.email.smtp_port = p;
        }
        if let Ok(v) = env::var("EMAIL_USER") {
            self.email.username = v;
        }
        if let Ok(v) = env::var("EMAIL_PASS") {
            self.email.password = v;
        }
        if let Ok(v) = env::var("EMAIL_FROM") {
            self.email.from_address = v;
        }
        if let Ok(v) = env::var("EMAIL_VERIFY_ON_STARTUP")
            && let Ok(b) = v.parse()
        {
            self.email.verify_on_startup = b;
        }
        if let Ok(v) = env::var("BASE_URL") {
            self.app.base_url = v;
        }
        if let Ok(v) = env::var("FULFILLMENT_LOOKUP_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            self.fulfillment.lookup_attempts = n;
        }
        if let Ok(v) = env::var("FULFILLMENT_LOOKUP_INTERVAL_MS")
            && let Ok(n) = v.parse()
        {
            self.fulfillment.lookup_interval_ms = n;
        }
        if let Ok(v) = env::var("ADMIN_API_KEY") {
            self.admin.api_key = v;
        }
    }

    /// 启动前检查必需的凭据，缺失时直接失败
    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.database.url.is_empty() {
            missing.push("DATABASE_URL");
        }
        if self.stripe.secret_key.is_empty() {
            missing.push("STRIPE_SECRET_KEY");
        }
        if self.stripe.webhook_secret.is_empty() {
            missing.push("STRIPE_WEBHOOK_SECRET");
        }
        if self.email.username.is_empty() {
            missing.push("EMAIL_USER");
        }
        if self.email.password.is_empty() {
            missing.push("EMAIL_PASS");
        }
        if self.app.base_url.is_empty() {
            missing.push("BASE_URL");
        }
        if self.fulfillment.lookup_attempts == 0 {
            return Err("fulfillment.lookup_attempts must be at least 1".to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required configuration: {}", missing.join(", ")))
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [database]
        url = "postgres://localhost/lovepage"
        max_connections = 5

        [stripe]
        secret_key = "sk_test_123"
        webhook_secret = "whsec_123"

        [email]
        username = "pages@example.com"
        password = "app-password"

        [app]
        base_url = "https://pages.example.com/"
    "#;

    #[test]
    fn test_toml_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.json_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(config.stripe.webhook_tolerance_secs, 300);
        assert_eq!(config.email.smtp_host, "smtp.gmail.com");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.email.sender(), "pages@example.com");
        assert_eq!(config.fulfillment.lookup_attempts, 5);
        assert_eq!(config.fulfillment.lookup_interval_ms, 2000);
        assert!(config.admin.api_key.is_empty());
        assert_eq!(config.app.base_url(), "https://pages.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_credentials() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.stripe.webhook_secret.clear();
        config.email.password.clear();
        let err = config.validate().unwrap_err();
        assert!(err.contains("STRIPE_WEBHOOK_SECRET"));
        assert!(err.contains("EMAIL_PASS"));
    }

    #[test]
    fn test_validate_rejects_zero_lookup_attempts() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.fulfillment.lookup_attempts = 0;
        assert!(config.validate().is_err());
    }
}
