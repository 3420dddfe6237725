// apps/fc_cli/src/main.rs

//! FoamCore 命令行界面
//!
//! 读取 JSON 算例配置，生成块网格、构造字典驱动的场并报告。
//!
//! ```text
//! fc_cli info --config cases/channel.json
//! fc_cli --log-level debug validate --config cases/channel.json --strict
//! ```

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// FoamCore 算例工具
#[derive(Debug, Parser)]
#[command(name = "fc_cli", version, about = "FoamCore case inspection and validation")]
struct Cli {
    /// 日志级别
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 显示运行时类型表与算例概要
    Info(commands::info::InfoArgs),
    /// 校验算例：配置、网格与全部场字典
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_after_subcommand() {
        let cli = Cli::try_parse_from(["fc_cli", "info", "--log-level", "warn"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert!(matches!(cli.command, Commands::Info(_)));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(Cli::try_parse_from(["fc_cli", "--log-level", "loud", "info"]).is_err());
    }
}
