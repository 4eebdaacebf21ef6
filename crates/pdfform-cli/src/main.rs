mod cli;
mod fields_cmd;
mod fill_cmd;
mod metadata_cmd;
mod shared;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Fields { ref file, ref format } => fields_cmd::run(file, format),
        cli::Commands::Metadata { ref file } => metadata_cmd::run(file),
        cli::Commands::Fill {
            ref file,
            ref output,
            ref values,
            ref assignments,
            dry_run,
        } => fill_cmd::run(fill_cmd::FillArgs {
            file,
            output: output.as_deref(),
            values: values.as_deref(),
            assignments,
            dry_run,
        }),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Log to stderr at INFO, or DEBUG with `--verbose`. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
