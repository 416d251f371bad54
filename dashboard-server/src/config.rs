//! 配置管理
//!
//! 加载顺序：内置默认值、配置文件（可选）、`DASHBOARD__` 前缀的环境变量、命令行参数。

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use config::{Config, Environment, File};
use dashboard_data::{generate_dataset, DEFAULT_SEED};
use dashboard_session::SessionSettings;
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const ENV_PREFIX: &str = "DASHBOARD";
const ENV_SEPARATOR: &str = "__";

/// 看板服务完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 数据生成配置
    pub data: DataConfig,
    /// 会话配置
    pub session: SessionConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 数据生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// 随机种子
    pub seed: u64,
    /// 检查日期基准，缺省为会话创建当天
    pub reference_date: Option<NaiveDate>,
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 会话Cookie名
    pub cookie_name: String,
    /// 最大会话数
    pub max_sessions: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤指令
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            reference_date: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "dashboard_session".to_string(),
            max_sessions: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed: Option<u64>,
    pub reference_date: Option<NaiveDate>,
    pub log_level: Option<String>,
}

impl DashboardConfig {
    /// 从默认值、配置文件和进程环境变量加载
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let defaults = Config::try_from(&DashboardConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(env)
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// 应用命令行覆盖
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(seed) = overrides.seed {
            self.data.seed = seed;
        }
        if let Some(date) = overrides.reference_date {
            self.data.reference_date = Some(date);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// 监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve host: {}", self.server.host))?
            .next()
            .with_context(|| format!("No address found for host: {}", self.server.host))
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            seed: self.data.seed,
            reference_date: self.data.reference_date,
            max_sessions: self.session.max_sessions,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&DashboardConfig) -> Result<()>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "server.host",
                validator: |config| {
                    if config.server.host.trim().is_empty() {
                        Err(anyhow::anyhow!("Server host cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "server.port",
                validator: |config| {
                    if config.server.port == 0 {
                        Err(anyhow::anyhow!("Server port cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "data.reference_date",
                validator: |config| {
                    let date = config
                        .data
                        .reference_date
                        .unwrap_or_else(|| Local::now().date_naive());
                    generate_dataset(config.data.seed, date)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("Cannot generate data for {}: {}", date, e))
                },
            },
            ValidationRule {
                field_path: "session.cookie_name",
                validator: |config| {
                    let name = &config.session.cookie_name;
                    if name.is_empty() {
                        Err(anyhow::anyhow!("Cookie name cannot be empty"))
                    } else if name
                        .chars()
                        .any(|c| c.is_whitespace() || c.is_control() || ";=,\"".contains(c))
                    {
                        Err(anyhow::anyhow!("Cookie name contains invalid characters: {}", name))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "session.max_sessions",
                validator: |config| {
                    if config.session.max_sessions == 0 {
                        Err(anyhow::anyhow!("Max sessions cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("Invalid log filter: {}", e))
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &DashboardConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid {}: {}", rule.field_path, e));
            }
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
