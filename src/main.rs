use anyhow::Context;
use bookstore::utils::logger;
use bookstore::{Bookstore, CliConfig, FlatFileStore, Shell, StoreSettings};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 合併設定並驗證
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger();
    } else {
        logger::init_with_level(config.log_level());
    }
    tracing::debug!("Resolved config: {:?}", config);

    let settings = StoreSettings::from_provider(&config);
    let mut shop = Bookstore::new(FlatFileStore::new(), settings);

    // 找不到資料庫時以空的書架開店
    if let Err(e) = shop.open_default() {
        tracing::warn!(
            "Could not load {}: {} (Category: {:?})",
            shop.settings().catalog_path.display(),
            e,
            e.category()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
    }

    if !cli.json {
        println!("📚 Welcome to {}! Type 'help' for commands.", config.display_name());
    }

    let stdout = io::stdout();
    let mut shell = Shell::new(shop, stdout.lock(), config.display_name()).with_json(cli.json);

    let result = match &cli.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening script {}", path))?;
            shell.run(BufReader::new(file))
        }
        None => shell.run(io::stdin().lock()),
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Session ended with an error: {} (Severity: {:?})",
            e,
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        let code = e.exit_code();
        if code > 0 {
            std::process::exit(code);
        }
    }

    tracing::info!("👋 Store closed");
    Ok(())
}
