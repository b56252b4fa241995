use clap::{Parser, ValueEnum};
use scansort_core::infer_measurement;
use std::io::{self, BufRead};
use std::process;

/// CLI tool for mapping acquisition description labels to measurement types
#[derive(Parser, Debug)]
#[command(name = "scanlabel")]
#[command(about = "Infer acquisition measurement types from description labels")]
#[command(version)]
struct Cli {
    /// Labels to classify; read from stdin (one per line) when omitted
    #[arg(value_name = "LABEL")]
    labels: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Tab-separated `label<TAB>measurement` lines
    Text,
    /// JSON object mapping each label to its measurement
    Json,
}

fn main() {
    let cli = Cli::parse();

    let labels = if cli.labels.is_empty() {
        match read_stdin_labels() {
            Ok(labels) => labels,
            Err(e) => {
                eprintln!("Error: failed to read labels from stdin: {}", e);
                process::exit(1);
            }
        }
    } else {
        cli.labels
    };

    match cli.format {
        OutputFormat::Text => {
            for label in &labels {
                println!("{}\t{}", label, infer_measurement(label));
            }
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match to_json(&labels) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

fn read_stdin_labels() -> io::Result<Vec<String>> {
    let mut labels = Vec::new();
    for line in io::stdin().lock().lines() {
        labels.push(line?);
    }
    Ok(labels)
}

#[cfg(feature = "json")]
fn to_json(labels: &[String]) -> Result<String, serde_json::Error> {
    use std::collections::BTreeMap;

    let measurements: BTreeMap<&str, &str> = labels
        .iter()
        .map(|label| (label.as_str(), infer_measurement(label).as_str()))
        .collect();
    serde_json::to_string_pretty(&measurements)
}
