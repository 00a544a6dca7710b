use env_logger::{Builder, Env};
use log::{error, info};

use ppg_heart_monitor::config::{load_config, save_config, Config, ConfigError};
use ppg_heart_monitor::local::{process_file, server};

const USAGE: &str = "Usage:
  main server [config.yaml]
  main replay <samples.csv> [config.yaml]
  main init-config <path>";

fn read_config(path: Option<&String>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &Config) {
    let default_level = if config.monitor.enable_debug_logging {
        "debug"
    } else {
        "info"
    };
    Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    std::process::exit(1);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("{}", USAGE);
        return;
    }

    match args[1].as_str() {
        "server" => {
            let config = read_config(args.get(2)).unwrap_or_else(|e| {
                init_logging(&Config::default());
                fail(e)
            });
            init_logging(&config);
            if let Err(e) = server::run(config) {
                fail(e);
            }
        }
        "replay" => {
            let csv_path = match args.get(2) {
                Some(path) => path,
                None => {
                    println!("{}", USAGE);
                    std::process::exit(2);
                }
            };
            let config = read_config(args.get(3)).unwrap_or_else(|e| {
                init_logging(&Config::default());
                fail(e)
            });
            init_logging(&config);
            match process_file::run(csv_path, &config) {
                Ok(summary) => info!(
                    "{} measurements, final average {:.2} BPM",
                    summary.measurements, summary.final_average_bpm
                ),
                Err(e) => fail(e),
            }
        }
        "init-config" => {
            init_logging(&Config::default());
            let path = match args.get(2) {
                Some(path) => path,
                None => {
                    println!("{}", USAGE);
                    std::process::exit(2);
                }
            };
            match save_config(&Config::default(), path) {
                Ok(()) => info!("Wrote default configuration to {}", path),
                Err(e) => fail(e),
            }
        }
        _ => {
            println!("Invalid argument.\n{}", USAGE);
            std::process::exit(2);
        }
    }
}
