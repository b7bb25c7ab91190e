//! 配置管理模块
//!
//! 支持多层配置文件加载，环境变量覆盖，以及类型安全的配置访问。
//! 各服务的业务配置段（如积分规则、等级表）由服务自行定义结构体，
//! 通过 [`load_layered`] 从同一组配置源反序列化。

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 环境变量前缀（LOYALTY_OBSERVABILITY__LOG_LEVEL -> observability.log_level）
pub const ENV_PREFIX: &str = "LOYALTY";

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "loyalty-engine".to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（LOYALTY_ 前缀，层级用 `__` 分隔）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let mut config: Self = load_layered(service_name)?;
        config.observability = config.observability.with_service_name(&config.service_name);
        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// 按标准分层顺序加载任意配置结构
///
/// `.env` 文件存在时先载入进程环境；`LOYALTY_ENV` 决定环境名（默认 development），
/// `CONFIG_DIR` 决定配置目录（默认 `config`）。
pub fn load_layered<T: DeserializeOwned>(service_name: &str) -> Result<T, ConfigError> {
    // .env 不存在属于正常情况
    let _ = dotenvy::dotenv();

    let env = std::env::var("LOYALTY_ENV").unwrap_or_else(|_| "development".to_string());
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    load_from_dir(service_name, &env, Path::new(&config_dir))
}

/// 从指定目录加载配置（不读取 `.env`，便于测试）
pub fn load_from_dir<T: DeserializeOwned>(
    service_name: &str,
    env: &str,
    config_dir: &Path,
) -> Result<T, ConfigError> {
    builder(service_name, env, config_dir)?
        .build()?
        .try_deserialize()
}

fn builder(
    service_name: &str,
    env: &str,
    config_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("service_name", service_name)?
        .set_default("environment", env)?
        .add_source(File::from(config_dir.join("default.toml")).required(false))
        .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
        .add_source(File::from(config_dir.join(format!("{}.toml", service_name))).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service_name, "loyalty-engine");
        assert_eq!(config.observability.metrics_port, 9090);
        assert!(!config.is_production());
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = temp_config_dir("loyalty-empty");
        let config: AppConfig = load_from_dir("loyalty-engine", "test", &dir).unwrap();

        assert_eq!(config.service_name, "loyalty-engine");
        assert_eq!(config.environment, "test");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_service_file_overrides_default_file() {
        let dir = temp_config_dir("loyalty-layered");
        fs::write(
            dir.join("default.toml"),
            "[observability]\nlog_level = \"warn\"\nmetrics_port = 9100\n",
        )
        .unwrap();
        fs::write(
            dir.join("loyalty-engine.toml"),
            "[observability]\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config: AppConfig = load_from_dir("loyalty-engine", "test", &dir).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.metrics_port, 9100);
    }

    #[test]
    fn test_production_flag() {
        let config = AppConfig {
            environment: "production".to_string(),
            ..Default::default()
        };
        assert!(config.is_production());
    }
}
