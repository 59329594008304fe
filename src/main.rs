use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use surf_verdict::config::MAX_HOURS_AHEAD;
use surf_verdict::db::PgStore;
use surf_verdict::models::{DaySummary, SpotGeo};
use surf_verdict::score::{classify, height_label, Rating};
use surf_verdict::store::ForecastService;
use surf_verdict::{input, report, Engine, EngineConfig, Forecast, ScoringModel};

#[derive(Parser)]
#[command(name = "surf-verdict")]
#[command(about = "Surf verdicts, confidence and best/avoid windows from forecast timelines", long_about = None)]
struct Cli {
    /// TOML file overriding engine thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Day verdicts for a stored spot
    Forecast {
        #[arg(long)]
        spot: Uuid,
        #[arg(long, default_value_t = 168, value_parser = clap::value_parser!(i64).range(1..=MAX_HOURS_AHEAD))]
        hours: i64,
        #[arg(long, value_enum, default_value_t = ScoringModel::Euro)]
        model: ScoringModel,
        /// Print the full forecast as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report for a stored spot
    Report {
        #[arg(long)]
        spot: Uuid,
        #[arg(long, default_value_t = 168, value_parser = clap::value_parser!(i64).range(1..=MAX_HOURS_AHEAD))]
        hours: i64,
        #[arg(long, value_enum, default_value_t = ScoringModel::Euro)]
        model: ScoringModel,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Run the engine over a timeline file without the database
    Analyze {
        /// Timeline as .csv or .json
        #[arg(long)]
        timeline: PathBuf,
        /// Latest buoy reading as JSON
        #[arg(long)]
        buoy: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        utc_offset_minutes: i32,
        #[arg(long, value_enum, default_value_t = ScoringModel::Euro)]
        model: ScoringModel,
        /// Evaluate as of this instant instead of now (RFC 3339)
        #[arg(long)]
        as_of: Option<DateTime<Utc>>,
        #[arg(long)]
        json: bool,
    },
    /// Classify a single score and height
    Classify {
        #[arg(long)]
        score: f64,
        #[arg(long)]
        height: Option<f64>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_days(days: &[DaySummary]) {
    if days.is_empty() {
        println!("No forecast hours found for this window.");
        return;
    }

    for day in days {
        let avg = day
            .avg_score
            .map(|s| format!("{s:.0}"))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "- {} {} ({}, avg {}) confidence {}%{}",
            day.day_key,
            day.verdict_label,
            day.display_height,
            avg,
            day.confidence_percentage,
            if day.extended_forecast { " [extended]" } else { "" }
        );
        for window in &day.best_windows {
            println!("    best  {} avg {:.0}", window.time_label, window.avg_score);
        }
        for window in &day.avoid_windows {
            println!(
                "    avoid {} {}",
                window.time_label,
                window.reason.as_deref().unwrap_or_default()
            );
        }
    }
}

fn emit(forecast: &Forecast, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(forecast)?);
    } else {
        print_days(&forecast.days);
    }
    Ok(())
}

async fn connect_service(engine: Engine) -> anyhow::Result<ForecastService<PgStore>> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to the forecast ingest Postgres instance")?;
    let store = PgStore::connect(&database_url).await?;
    Ok(ForecastService::new(store, engine))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config);

    match cli.command {
        Commands::Forecast {
            spot,
            hours,
            model,
            json,
        } => {
            let service = connect_service(engine).await?;
            let forecast = service.forecast(spot, hours, model, Utc::now()).await?;
            emit(&forecast, json)?;
        }
        Commands::Report {
            spot,
            hours,
            model,
            out,
        } => {
            let service = connect_service(engine).await?;
            let spot_record = service.spot(spot).await?;
            let forecast = service.forecast(spot, hours, model, Utc::now()).await?;
            std::fs::write(&out, report::build_report(&spot_record.name, &forecast))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Analyze {
            timeline,
            buoy,
            lat,
            lon,
            utc_offset_minutes,
            model,
            as_of,
            json,
        } => {
            let raw = input::load_timeline(&timeline)?;
            let buoy = buoy.as_deref().map(input::load_buoy).transpose()?;
            let geo = SpotGeo::new(lat, lon, utc_offset_minutes);
            let as_of = as_of.unwrap_or_else(Utc::now);
            let forecast = engine.run(raw, buoy.as_ref(), &geo, model, as_of);
            emit(&forecast, json)?;
        }
        Commands::Classify { score, height } => {
            let label = height_label(height);
            let rating: Rating = classify(score, &label);
            println!("{} ({label}) badge {:?}", rating, rating.badge());
        }
    }

    Ok(())
}
