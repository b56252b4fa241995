use clap::Parser;
use log::{debug, error};
use scansort_core::cli::Cli;
use scansort_core::Conversion;
use std::process;
use std::str::FromStr;

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.loglevel);
    debug!("{:?}", cli);

    let conversion = Conversion {
        archive: cli.archive,
        output: cli.output,
        dbtype: cli.dbtype,
        group: cli.group,
        project: cli.project,
        subject: cli.subject,
        subject_id_field: cli.subject_id_field,
        prune: cli.prune,
    };

    match conversion.run() {
        Ok(run_dir) => {
            // The resolved output directory is the one machine-readable
            // result; everything else goes to the log
            println!("{}", run_dir.display());
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(loglevel: &str) {
    let level = log::LevelFilter::from_str(loglevel).unwrap_or_else(|_| {
        eprintln!("Unknown log level '{}', using info", loglevel);
        log::LevelFilter::Info
    });
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
