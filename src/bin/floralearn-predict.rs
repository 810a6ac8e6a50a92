//! Developer utility to load a persisted model and classify one sample.

use std::path::PathBuf;

use floralearn::engine::PredictionEngine;
use floralearn::logging;
use floralearn::model_store;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    logging::init().map_err(|err| err.to_string())?;

    let model = model_store::load_model(&options.model).map_err(|err| err.to_string())?;
    let engine = PredictionEngine::new();
    engine.install(model);

    let result = engine
        .predict(&options.measurements)
        .map_err(|err| err.to_string())?;
    let model = engine
        .current()
        .ok_or_else(|| "no model installed".to_string())?;
    for (label, probability) in model.labels.labels().iter().zip(&result.probabilities) {
        println!("{label:<16}  {probability:.4}");
    }
    println!("predicted: {}", result.label);
    Ok(())
}

#[derive(Debug)]
struct CliOptions {
    model: PathBuf,
    measurements: Vec<f32>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut model = PathBuf::from("model.json");
    let mut measurements = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--model" => {
                model = PathBuf::from(
                    iter.next().ok_or_else(|| "--model needs a value".to_string())?,
                );
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            value => {
                let parsed = value
                    .parse::<f32>()
                    .map_err(|_| format!("not a number: {value}"))?;
                measurements.push(parsed);
            }
        }
    }
    if measurements.is_empty() {
        print_usage();
        return Err("expected four measurement values".to_string());
    }
    Ok(CliOptions {
        model,
        measurements,
    })
}

fn print_usage() {
    println!(
        "usage: floralearn-predict [--model FILE] SEPAL_LENGTH SEPAL_WIDTH PETAL_LENGTH PETAL_WIDTH"
    );
}
