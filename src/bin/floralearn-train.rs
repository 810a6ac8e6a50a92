//! Developer utility to train, evaluate, and export the iris classifier.

use std::path::PathBuf;

use floralearn::config::{self, PipelineConfig};
use floralearn::logging;
use floralearn::session::Session;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    logging::init().map_err(|err| err.to_string())?;

    let mut config = match &options.config {
        Some(path) => config::load_config(path).map_err(|err| err.to_string())?,
        None => PipelineConfig::default(),
    };
    if let Some(path) = options.dataset {
        config.dataset_path = path;
    }
    if let Some(path) = options.model_out {
        config.artifact_path = path;
    }
    if let Some(fraction) = options.test_fraction {
        config.test_fraction = fraction;
    }
    if let Some(seed) = options.seed {
        config.seed = seed;
    }

    let session = Session::new(config);
    let status = session.status();
    if !status.dataset_present {
        return Err(format!(
            "dataset not found at {}",
            session.config().dataset_path.display()
        ));
    }

    let report = session.train().map_err(|err| err.to_string())?;
    println!("training time: {:.2}s", report.elapsed_seconds);
    println!("iterations: {}", report.iterations);
    println!("macro accuracy: {:.4}", report.metrics.macro_accuracy);
    println!("log loss: {:.4}", report.metrics.log_loss);
    for (idx, entry) in report.metrics.per_class.iter().enumerate() {
        if entry.log_loss.is_nan() {
            println!(
                "class {idx} {:<16}  log loss: n/a (no test samples)",
                entry.label
            );
        } else {
            println!(
                "class {idx} {:<16}  log loss: {:.4}  support: {}",
                entry.label, entry.log_loss, entry.support
            );
        }
    }
    println!(
        "model saved to {}",
        session.config().artifact_path.display()
    );
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    dataset: Option<PathBuf>,
    model_out: Option<PathBuf>,
    test_fraction: Option<f32>,
    seed: Option<u64>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => options.config = Some(PathBuf::from(next_value(&mut iter, &arg)?)),
            "--dataset" => options.dataset = Some(PathBuf::from(next_value(&mut iter, &arg)?)),
            "--model-out" => {
                options.model_out = Some(PathBuf::from(next_value(&mut iter, &arg)?));
            }
            "--test-fraction" => {
                let value = next_value(&mut iter, &arg)?;
                options.test_fraction = Some(
                    value
                        .parse::<f32>()
                        .map_err(|_| format!("invalid --test-fraction: {value}"))?,
                );
            }
            "--seed" => {
                let value = next_value(&mut iter, &arg)?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid --seed: {value}"))?,
                );
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next().ok_or_else(|| format!("{flag} needs a value"))
}

fn print_usage() {
    println!(
        "usage: floralearn-train [--config FILE] [--dataset FILE] [--model-out FILE] \
         [--test-fraction F] [--seed N]"
    );
}
