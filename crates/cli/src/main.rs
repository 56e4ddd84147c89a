//! geoscope CLI - hosted Earth-observation analyses from the terminal

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geoscope_cloud::{Backend, HttpBackend, MockBackend, RenderedMap};
use geoscope_map::LonLat;
use geoscope_pipelines::{
    ClassificationReport, NdviChange, No2Comparison, SupervisedClassification,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "geoscope")]
#[command(author, version, about = "Hosted Earth-observation analyses", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Analysis service root URL
    #[arg(long, global = true, conflicts_with = "offline")]
    endpoint: Option<String>,

    /// Evaluate against the built-in offline fixtures instead of a service
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare monthly pollutant concentration between two years
    No2Compare {
        /// Country boundary to clip to (exact name match)
        #[arg(long, default_value = "Thailand")]
        country: String,
        /// Map zoom level
        #[arg(long, default_value = "5")]
        zoom: u8,
    },
    /// Classify land cover on the least-cloudy scene over a point
    Classify {
        /// Point of interest longitude
        #[arg(long, default_value = "88.9414")]
        lon: f64,
        /// Point of interest latitude
        #[arg(long, default_value = "25.8483")]
        lat: f64,
        /// Random-forest tree count
        #[arg(long, default_value = "10")]
        trees: u32,
        /// Pixels per sample draw
        #[arg(long, default_value = "5000")]
        sample_size: u32,
        /// Cloud-score cutoff; cloudier pixels are masked out
        #[arg(long, default_value = "50")]
        cloud_threshold: f64,
    },
    /// NDVI change between July 2014 and July 2017 over a point
    NdviChange {
        /// Point of interest longitude
        #[arg(long, default_value = "98.5265")]
        lon: f64,
        /// Point of interest latitude
        #[arg(long, default_value = "20.4715")]
        lat: f64,
    },
}

// ─── Entry point ────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    if cli.offline {
        info!("using offline fixtures");
        run_command(&rt, MockBackend::demo(), &cli.command)
    } else if let Some(endpoint) = &cli.endpoint {
        let backend = HttpBackend::new(endpoint).context("Failed to build service client")?;
        run_command(&rt, backend, &cli.command)
    } else {
        bail!("provide a service with --endpoint <URL>, or pass --offline");
    }
}

fn run_command<B: Backend>(
    rt: &tokio::runtime::Runtime,
    backend: B,
    command: &Commands,
) -> Result<()> {
    match command {
        Commands::No2Compare { country, zoom } => {
            let pipeline = No2Comparison {
                country: country.clone(),
                zoom: *zoom,
                ..Default::default()
            };
            let rendered = evaluate(rt, pipeline.run(&backend))
                .context("Failed to render concentration comparison")?;
            println!("{}", pipeline.title);
            print_layers(&rendered);
        }

        Commands::Classify {
            lon,
            lat,
            trees,
            sample_size,
            cloud_threshold,
        } => {
            let pipeline = SupervisedClassification {
                roi: LonLat::new(*lon, *lat),
                trees: *trees,
                sample_size: *sample_size,
                cloud_score_threshold: *cloud_threshold,
                ..Default::default()
            };
            let report = evaluate(rt, pipeline.run(&backend))
                .context("Failed to run supervised classification")?;
            print_classification(&report);
        }

        Commands::NdviChange { lon, lat } => {
            let pipeline = NdviChange {
                roi: LonLat::new(*lon, *lat),
                ..Default::default()
            };
            let rendered =
                evaluate(rt, pipeline.run(&backend)).context("Failed to render NDVI change")?;
            print_layers(&rendered);
        }
    }

    Ok(())
}

/// Drive a pipeline future to completion behind a spinner.
fn evaluate<T, E>(
    rt: &tokio::runtime::Runtime,
    fut: impl std::future::Future<Output = std::result::Result<T, E>>,
) -> std::result::Result<T, E> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static spinner template"),
    );
    spinner.set_message("evaluating on service...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = rt.block_on(fut);
    spinner.finish_and_clear();
    result
}

fn print_layers(rendered: &RenderedMap) {
    for layer in &rendered.layers {
        println!("  {:<32} {}", layer.name, layer.url);
    }
}

fn print_classification(report: &ClassificationReport) {
    println!(
        "Scene: {} (cloud cover {})",
        report.scene.id,
        report
            .scene
            .cloud_cover
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".into())
    );
    println!();
    println!("Resubstitution error matrix:");
    println!("{}", report.training_matrix);
    println!("Training overall accuracy: {:.4}", report.training_accuracy);
    println!();
    println!("Validation error matrix:");
    println!("{}", report.validation_matrix);
    println!(
        "Validation overall accuracy: {:.4}",
        report.validation_accuracy
    );
    println!();
    print_layers(&report.map);
}
