use clap::Parser;
use colored::Colorize;

use viewstats::cli::{Cli, Commands};
use viewstats::config::{get_config, init_config_with_path};
use viewstats::runtime::modes;
use viewstats::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_with_path(&cli.config);

    let command = cli.command_or_default();

    // config-gen 不需要日志和数据库
    if let Commands::ConfigGen { .. } = command {
        if let Err(e) = modes::run_cli_command(command).await {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
        return Ok(());
    }

    let config = get_config();
    // guard 必须存活到进程结束，保证日志刷盘
    let _log_guard = init_logging(&config.logging)?;

    match command {
        Commands::Serve => {
            if let Err(e) = modes::run_server().await {
                eprintln!("{} {:#}", "Server error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        cmd => {
            if let Err(e) = modes::run_cli_command(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
