use anyhow::Result;
use clap::{CommandFactory, Parser};
use corpus_lm::app::{TrainOptions, run_train_lm};
use corpus_lm::cli::{Cli, Commands};
use corpus_lm::config::Config;
use corpus_lm::diagnostics::print_toolchain_report;
use corpus_lm::stage::Toolchain;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    log::debug!("corpus-lm {}", corpus_lm::version_string());

    match cli.command {
        Commands::Train {
            input_path,
            output_model_path,
            temp_directory,
            ngram_order,
            bin_dir,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let options = TrainOptions::from_config(
                &config,
                input_path,
                output_model_path,
                temp_directory,
                ngram_order,
                bin_dir,
            )?;
            let report = run_train_lm(&options)?;
            if !cli.quiet {
                println!("{}", report.model_path.display());
            }
        }
        Commands::Check { bin_dir } => {
            let config = load_config(cli.config.as_deref())?;
            let toolchain = Toolchain::new(bin_dir.or(config.toolchain.bin_dir));
            if !print_toolchain_report(&toolchain) {
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "corpus-lm",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// `-q` → warn, default → info, `-v` → debug, `-vv` → trace. `RUST_LOG` wins when set.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/corpus-lm/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = match (custom_path, Config::default_path()) {
        (Some(path), _) => Config::load(path)?,
        (None, Some(default_path)) => Config::load_or_default(&default_path)?,
        (None, None) => Config::default(),
    };

    Ok(config.with_env_overrides())
}
