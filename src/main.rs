//! printquest - chat-driven interactive fiction session driver
//!
//! Wires the command producers, the spooler, the interpreter session
//! controller, and the display sink together, and runs the crash-recovery
//! loop until interrupted.

use std::path::PathBuf;
use std::process;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use printquest::config::loader::ConfigLoader;
use printquest::config::Config;
use printquest::error::Result;
use printquest::producers::stdin_producer;
use printquest::session::{RunnerConfig, SessionController, SessionRunner};
use printquest::sink::ConsoleSink;
use printquest::spool;

/// Command-line arguments
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Story file override
    game_file: Option<PathBuf>,
    /// Save file override
    save_file: Option<PathBuf>,
    /// Display width override
    width: Option<u16>,
    /// Enable debug logging
    debug: bool,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut app_args = AppArgs::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        app_args.config_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        return Err("Missing config file path".into());
                    }
                }
                "--game" | "-g" => {
                    if i + 1 < args.len() {
                        app_args.game_file = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        return Err("Missing game file path".into());
                    }
                }
                "--save" | "-s" => {
                    if i + 1 < args.len() {
                        app_args.save_file = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    } else {
                        return Err("Missing save file path".into());
                    }
                }
                "--width" | "-w" => {
                    if i + 1 < args.len() {
                        app_args.width = args[i + 1].parse().ok();
                        i += 1;
                    } else {
                        return Err("Missing width value".into());
                    }
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--help" | "-h" => {
                    print_usage();
                    process::exit(0);
                }
                other => {
                    return Err(format!("Unknown argument: {}", other).into());
                }
            }
            i += 1;
        }

        Ok(app_args)
    }

    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(game) = &self.game_file {
            config.interpreter.game_file = game.clone();
        }
        if let Some(save) = &self.save_file {
            config.interpreter.save_file = save.clone();
        }
        if let Some(width) = self.width {
            config.interpreter.text_width = width;
        }
    }
}

fn print_usage() {
    println!("printquest - chat-driven interactive fiction session driver");
    println!();
    println!("USAGE:");
    println!("    printquest [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>   Configuration file path");
    println!("    -g, --game <FILE>     Story file to load");
    println!("    -s, --save <FILE>     Save file path");
    println!("    -w, --width <COLS>    Display width in columns");
    println!("    -d, --debug           Enable debug logging");
    println!("    -h, --help            Print this help message");
}

#[tokio::main]
async fn main() {
    let args = match AppArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let filter = if args.debug {
        EnvFilter::new("printquest=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("printquest=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(args).await {
        error!("fatal: {}", e);
        process::exit(1);
    }
}

async fn run(args: AppArgs) -> Result<()> {
    let mut config = match &args.config_path {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    args.apply(&mut config);
    config.validate()?;

    info!(
        "playing {} (save: {}, width: {})",
        config.interpreter.game_file.display(),
        config.interpreter.save_file.display(),
        config.interpreter.text_width
    );

    let shutdown = CancellationToken::new();
    let (sender, spooler) = spool::channel(config.spool.lookback);

    // Producers run independently of the consumer
    tokio::spawn(stdin_producer(sender, shutdown.clone()));

    // Ctrl-C cancels everything cooperatively
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            ctrlc_token.cancel();
        }
    });

    let controller = SessionController::new(
        config.interpreter.clone(),
        config.timing.clone(),
        config.vocabulary.clone(),
    );
    let runner = SessionRunner::new(
        controller,
        spooler,
        ConsoleSink::new(),
        RunnerConfig::from_config(&config),
        shutdown,
    );

    runner.run().await
}
