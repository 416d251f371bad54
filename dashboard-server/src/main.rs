//! 放射科AI工作流看板服务主程序

mod config;

use crate::config::{ConfigOverrides, ConfigValidator, DashboardConfig};
use chrono::NaiveDate;
use clap::Parser;
use dashboard_session::InMemorySessionStore;
use dashboard_web::{AppState, WebServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// 看板服务命令行参数
#[derive(Parser, Debug)]
#[command(name = "dashboard-server")]
#[command(about = "Radiology AI Workflow Dashboard 服务器")]
struct Args {
    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 合成数据随机种子
    #[arg(short, long)]
    seed: Option<u64>,

    /// 检查日期基准 (YYYY-MM-DD)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            seed: self.seed,
            reference_date: self.reference_date,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.overrides());

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .init();

    match args.config.as_deref() {
        Some(path) => info!("配置文件: {}", path.display()),
        None => info!("未指定配置文件，使用默认值与环境变量"),
    }

    ConfigValidator::new().validate(&config)?;

    info!("启动看板服务器...");
    info!("看板服务器配置:");
    info!("  数据种子: {}", config.data.seed);
    match config.data.reference_date {
        Some(date) => info!("  日期基准: {}", date),
        None => info!("  日期基准: 会话创建当天"),
    }
    info!("  最大会话数: {}", config.session.max_sessions);

    let store = InMemorySessionStore::new(config.session_settings())?;
    let state = AppState::new(Arc::new(store), config.session.cookie_name.clone());
    let server = WebServer::new(config.socket_addr()?, state);
    info!("  监听地址: {}", server.addr());

    // 启动服务器
    if let Err(e) = server.run().await {
        error!("服务器启动失败: {}", e);
        return Err(e.into());
    }

    Ok(())
}
