use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{debug, info};

use prenatal_migrate::cli::Cli;
use prenatal_migrate::config::Config;
use prenatal_migrate::{DatabaseUrl, MigrationEvent, Migrator, MySqlStore};

/// Level priority: `--log-level` > config file > `RUST_LOG` > warn
fn setup_logging(level: Option<&str>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(level) = level {
        let filter = match level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" | "warning" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            other => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", other);
                log::LevelFilter::Warn
            }
        };
        builder.filter_level(filter);
    }

    builder.try_init()?;
    Ok(())
}

fn report(event: MigrationEvent) {
    match event {
        MigrationEvent::LegacyPatientsRead(n) => {
            println!("{} Mapeamento: {} gestantes", "✓".green(), n);
        }
        MigrationEvent::PatientsFound(n) => {
            println!("{} Encontradas {} gestantes no banco", "✓".green(), n);
        }
        MigrationEvent::VisitsCleared(n) => {
            println!("{} {} consultas removidas", "✓".green(), n);
            println!("\nImportando consultas...\n");
        }
        MigrationEvent::Progress(n) => {
            println!("{} {} consultas importadas...", "✓".green(), n);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref().or(config.log_level.as_deref())).context("Failed to setup logging")?;
    debug!(
        "Config: patients={} visits={}",
        config.patients_csv.display(),
        config.visits_csv.display()
    );

    let url = match DatabaseUrl::from_env(&config.database_url_env) {
        Ok(url) => url,
        Err(e) if e.is_configuration() => {
            eprintln!("{} {}", "❌".red(), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to read database URL"),
    };

    let mut options = config.migration_options(cli.dry_run);
    if let Some(patients) = cli.patients {
        options.patients_csv = patients;
    }
    if let Some(visits) = cli.visits {
        options.visits_csv = visits;
    }

    let mut store = MySqlStore::connect(&url).context("Failed to connect to database")?;

    info!("pm starting");
    if options.dry_run {
        println!("{} Dry run: consultasPrenatal will not be modified", "⚠".yellow());
    }
    println!("Lendo {}...", options.patients_csv.display());

    let summary = Migrator::new(options)
        .run(&mut store, report)
        .context("Migration failed")?;

    println!("\n{}", "Resumo:".bold());
    println!("   {} Importadas: {}", "✓".green(), summary.imported);
    println!("   {} Sem gestante: {}", "⚠".yellow(), summary.unmatched);
    println!("   {} Incompletas: {}", "⚠".yellow(), summary.incomplete);
    println!("{}", summary);
    println!("\n{} Concluído!", "✓".green());

    Ok(())
}
