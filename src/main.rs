//! Service entry point — CLI wiring, training, and server startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pv_advisor::api::{self, AppState};
use pv_advisor::config::AppConfig;
use pv_advisor::features::FeatureEngineer;
use pv_advisor::io::export::export_csv;
use pv_advisor::model::ModelArtifact;
use pv_advisor::predict::PredictionService;
use pv_advisor::train::{Trainer, dataset};
use pv_advisor::weather::gateway::OpenMeteoGateway;
use pv_advisor::weather::timezone::OpenMeteoTimezoneResolver;

/// Artifact location when `--model` is not given.
const DEFAULT_MODEL_PATH: &str = "model.json";

/// Parsed CLI arguments.
struct CliArgs {
    train_csv: Option<String>,
    model_path: String,
    serve: bool,
    port_override: Option<u16>,
    config_path: Option<String>,
    seed_override: Option<u64>,
    report_out: Option<String>,
}

fn print_help() {
    eprintln!("pv-advisor — Photovoltaic output prediction and advisory service");
    eprintln!();
    eprintln!("Usage: pv-advisor [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --train <csv>       Train a model from a historical weather CSV");
    eprintln!("  --model <path>      Artifact to save (train) or load (serve) [default: model.json]");
    eprintln!("  --serve             Start the prediction API server");
    eprintln!("  --port <u16>        Server port (overrides config)");
    eprintln!("  --config <path>     Load configuration from TOML file");
    eprintln!("  --seed <u64>        Override training seed");
    eprintln!("  --report-out <csv>  Export training diagnostics to CSV");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("With both --train and --serve, training runs first and the fresh artifact serves.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        train_csv: None,
        model_path: DEFAULT_MODEL_PATH.to_string(),
        serve: false,
        port_override: None,
        config_path: None,
        seed_override: None,
        report_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--train" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --train requires a CSV path argument");
                    process::exit(1);
                }
                cli.train_csv = Some(args[i].clone());
            }
            "--model" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --model requires a path argument");
                    process::exit(1);
                }
                cli.model_path = args[i].clone();
            }
            "--serve" => {
                cli.serve = true;
            }
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port_override = Some(p);
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--report-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --report-out requires a path argument");
                    process::exit(1);
                }
                cli.report_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Trains from the CSV, prints the report, and saves the artifact.
fn train_and_save(
    config: &AppConfig,
    csv_path: &Path,
    model_path: &Path,
    report_out: Option<&str>,
) {
    let rows = match dataset::load_csv(csv_path) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: failed to read \"{}\": {e}", csv_path.display());
            process::exit(1);
        }
    };

    let engineer = FeatureEngineer::new(config.panel.angle_of_incidence_deg);
    let trainer = Trainer::new(
        engineer,
        config.training.holdout_fraction,
        config.training.n_trees,
        config.training.min_rows,
        config.training.seed,
    );
    let (artifact, report) = match trainer.train(rows) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: training failed: {e}");
            process::exit(1);
        }
    };

    println!("{report}");

    if let Err(e) = artifact.save(model_path) {
        eprintln!("error: failed to save artifact: {e}");
        process::exit(1);
    }
    eprintln!("Model written to {}", model_path.display());

    if let Some(path) = report_out {
        if let Err(e) = export_csv(&report, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {path}");
    }
}

/// Loads the artifact, wires the collaborators, and serves until shutdown.
fn serve_blocking(config: &AppConfig, model_path: &Path) {
    let artifact = match ModelArtifact::load(model_path) {
        Ok(artifact) => artifact,
        Err(e) => {
            eprintln!(
                "error: failed to load artifact from \"{}\": {e}",
                model_path.display()
            );
            process::exit(1);
        }
    };
    eprintln!(
        "Loaded model from {} (trained {})",
        model_path.display(),
        artifact.trained_at().format("%Y-%m-%d %H:%M UTC")
    );
    let service = PredictionService::new(Arc::new(artifact));

    let gateway = match OpenMeteoGateway::new(
        config.gateway.forecast_url.as_str(),
        config.gateway.geocoding_url.as_str(),
        config.gateway.timeout(),
    ) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("error: failed to build weather client: {e}");
            process::exit(1);
        }
    };
    let resolver = match OpenMeteoTimezoneResolver::new(
        config.gateway.forecast_url.as_str(),
        config.gateway.timeout(),
    ) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: failed to build timezone client: {e}");
            process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        service,
        gateway: Arc::new(gateway),
        resolver: Arc::new(resolver),
        static_dir: PathBuf::from(&config.server.static_dir),
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(api::serve(state, addr)) {
        eprintln!("error: server failed: {e}");
        process::exit(1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pv_advisor=info")),
        )
        .init();

    let cli = parse_args();

    // Load config: --config takes priority, then built-in defaults
    let mut config = if let Some(ref path) = cli.config_path {
        match AppConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        AppConfig::default()
    };

    // Apply CLI overrides
    if let Some(seed) = cli.seed_override {
        config.training.seed = seed;
    }
    if let Some(port) = cli.port_override {
        config.server.port = port;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    if cli.train_csv.is_none() && !cli.serve {
        eprintln!("error: nothing to do (pass --train and/or --serve)");
        print_help();
        process::exit(1);
    }

    let model_path = PathBuf::from(&cli.model_path);

    if let Some(ref csv_path) = cli.train_csv {
        train_and_save(
            &config,
            Path::new(csv_path),
            &model_path,
            cli.report_out.as_deref(),
        );
    }

    if cli.serve {
        serve_blocking(&config, &model_path);
    }
}
