use anyhow::Context;
use chrono::{Datelike, Local};
use clap::Parser;
use ganzhi_archive::adapters::astronomical_provider::SUPPORTED_YEARS;
use ganzhi_archive::core::LunarConversionProvider;
use ganzhi_archive::utils::error::ErrorSeverity;
use ganzhi_archive::utils::{logger, validation::Validate};
use ganzhi_archive::{
    ArchivePipeline, ArchiveRunner, AstronomicalProvider, CivilMoment, CliConfig, Command,
    GanzhiEngine, GanzhiError, LocalStorage, TableProvider, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting ganzhi-archive CLI");
    tracing::debug!("CLI config: {:?}", cli);

    match execute(cli).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<GanzhiError>() {
            Some(err) => {
                tracing::error!(
                    "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", err.recovery_suggestion());

                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 建議: {}", err.recovery_suggestion());

                // 根據錯誤嚴重程度決定退出碼
                let exit_code = match err.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                };
                if exit_code > 0 {
                    std::process::exit(exit_code);
                }
                Ok(())
            }
            None => Err(e),
        },
    }
}

async fn execute(cli: CliConfig) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };
    if let Some(table) = &cli.table {
        config.calendar.table = Some(table.clone());
    }

    let provider: Box<dyn LunarConversionProvider> = match config.table_path() {
        Some(path) => {
            let table = TableProvider::from_path(path)?;
            if let Some((first, last)) = table.coverage() {
                tracing::info!("📅 Calendar table {} covers {} to {}", path, first, last);
            }
            Box::new(table)
        }
        None => {
            tracing::debug!(
                "Using the computed calendar for {}-{}",
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            );
            Box::new(AstronomicalProvider::new())
        }
    };
    let engine = GanzhiEngine::new(provider);

    match cli.command {
        Command::Pillars {
            date,
            hour,
            minute,
            json,
        } => {
            let result = engine.compute_pillars(date.year(), date.month(), date.day(), hour, minute);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.coordinate());
            }
            if !result.is_success() {
                eprintln!("❌ {}", result.message.unwrap_or_default());
                std::process::exit(2);
            }
        }
        Command::Archive(args) => {
            args.apply(&mut config.archive);
            config.validate()?;
            tracing::info!("✅ Configuration loaded and validated successfully");

            let storage = LocalStorage::new(".".to_string());
            let mut pipeline = ArchivePipeline::new(storage, config.archive, engine);
            if let Some(at) = args.at {
                tracing::info!("🕰️ Archiving at fixed moment {}", at);
                pipeline = pipeline.with_moment(at);
            }

            let output_path = ArchiveRunner::new(pipeline).run().await?;
            tracing::info!("✅ Archive run completed successfully!");
            println!("✅ Archive run completed successfully!");
            println!("📁 History saved to: {}", output_path);
        }
        Command::Verify => verify(&engine)?,
    }

    Ok(())
}

/// Start-of-Spring check on 2024-02-05 (after the term, before Lunar New Year),
/// followed by the current moment.
fn verify<P: LunarConversionProvider>(engine: &GanzhiEngine<P>) -> anyhow::Result<()> {
    let boundary = engine.compute_pillars(2024, 2, 5, 10, 0);
    println!("測試點: 2024-02-05 10:00 (預期甲辰年)");
    println!("結果: {}", boundary.coordinate());

    anyhow::ensure!(
        boundary.is_success(),
        "boundary conversion failed: {}",
        boundary.message.as_deref().unwrap_or_default()
    );
    let anchor = engine
        .provider()
        .lookup(2024, 7, 1)
        .context("calendar does not cover the 2024-07-01 anchor")?;
    anyhow::ensure!(
        boundary.year == anchor.year.to_string(),
        "year pillar {} does not match the anchor year {}",
        boundary.year,
        anchor.year
    );

    let now = CivilMoment::from_datetime(Local::now().naive_local());
    let current = engine.compute_at(&now);
    println!("實時點: {}", now);
    println!("結果: {}", current.coordinate());
    if !current.is_success() {
        tracing::warn!(
            "Current moment not covered: {}",
            current.message.as_deref().unwrap_or_default()
        );
    }

    Ok(())
}
