use anyhow::{Context, Result};
use behavior_metrics::config::Settings;
use behavior_metrics::heatmap::{HeatmapCanvas, SvgSurface};
use behavior_metrics::stats::{format_duration, summarize, AggregateStatistics};
use behavior_metrics::transport::StoredMetrics;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "behavior-heatmap", version, about = "Cursor heatmaps from behavior metrics")]
struct Cli {
    /// Settings file (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a statistics summary (JSON) as an SVG heatmap
    Render {
        /// Statistics summary file
        #[arg(short, long)]
        input: PathBuf,
        /// Output SVG; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 1200.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
    /// Build a statistics summary from exported records (JSON array)
    Summarize {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download every stored record from the backend and summarize it locally
    #[cfg(feature = "http")]
    Pull {
        /// Overrides the configured base URL
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long, default_value_t = behavior_metrics::transport::DEFAULT_PAGE_SIZE)]
        page_size: u32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch the statistics summary from the backend
    #[cfg(feature = "http")]
    Fetch {
        /// Overrides the configured base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Also render the heatmap to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
        #[arg(long, default_value_t = 1200.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    behavior_metrics::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            input,
            output,
            width,
            height,
        } => {
            let stats: AggregateStatistics = read_json(&input)?;
            let svg = render_svg(&settings, &stats, width, height);
            write_output(output.as_deref(), &svg)?;
        }
        Commands::Summarize { input, output } => {
            let records: Vec<StoredMetrics> = read_json(&input)?;
            let stats = summarize(&records, chrono::Utc::now());
            tracing::info!(
                "Summarized {} records ({} cursor samples)",
                records.len(),
                stats.all_cursor_positions.len()
            );
            let json = serde_json::to_string_pretty(&stats)?;
            write_output(output.as_deref(), &json)?;
        }
        #[cfg(feature = "http")]
        Commands::Pull {
            base_url,
            page_size,
            output,
        } => {
            let transport = http_transport(&settings, base_url)?;
            let records = transport
                .fetch_all_records(page_size)
                .await
                .context("Failed to list behavior metrics records")?;
            let stats = summarize(&records, chrono::Utc::now());
            tracing::info!(
                "Summarized {} remote records ({} cursor samples)",
                records.len(),
                stats.all_cursor_positions.len()
            );
            let json = serde_json::to_string_pretty(&stats)?;
            write_output(output.as_deref(), &json)?;
        }
        #[cfg(feature = "http")]
        Commands::Fetch {
            base_url,
            svg,
            width,
            height,
        } => {
            let transport = http_transport(&settings, base_url)?;
            let stats = transport
                .fetch_summary()
                .await
                .context("Failed to fetch statistics summary")?;

            println!("Average time on page");
            println!("  day:   {}", format_duration(stats.avg_time_day));
            println!("  week:  {}", format_duration(stats.avg_time_week));
            println!("  month: {}", format_duration(stats.avg_time_month));
            println!("Cursor samples: {}", stats.all_cursor_positions.len());

            if let Some(path) = svg {
                let document = render_svg(&settings, &stats, width, height);
                write_output(Some(&path), &document)?;
            }
        }
    }

    Ok(())
}

#[cfg(feature = "http")]
fn http_transport(
    settings: &Settings,
    base_url: Option<String>,
) -> Result<behavior_metrics::transport::HttpTransport> {
    let mut transport_config = settings.transport.clone();
    if let Some(base_url) = base_url {
        transport_config.base_url = base_url;
    }
    Ok(behavior_metrics::transport::HttpTransport::new(transport_config)?)
}

fn render_svg(settings: &Settings, stats: &AggregateStatistics, width: f64, height: f64) -> String {
    let mut canvas = HeatmapCanvas::new(SvgSurface::new(width, height), settings.heatmap.clone());
    let report = canvas.render(&stats.all_cursor_positions);
    tracing::info!(
        "Rendered {} cells from {} samples ({} on canvas)",
        report.cells_drawn,
        report.samples_accepted,
        report.points_in_bounds
    );
    canvas.into_surface().finish()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", contents),
    }
    Ok(())
}
