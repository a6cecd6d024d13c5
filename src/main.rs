use clap::Parser;
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;
use unreal_utils::cli::{self, Cli};
use unreal_utils::error::{ExitCode, ExtractError};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(ExitCode::GeneralFailure.code());
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = cli::run_cli(cli) {
        eprintln!("Error: {}", e);

        // Print the error chain
        for cause in e.chain().skip(1) {
            eprintln!("Caused by: {}", cause);
        }

        let code = e
            .downcast_ref::<ExtractError>()
            .map(ExtractError::exit_code)
            .unwrap_or(ExitCode::GeneralFailure);
        std::process::exit(code.code());
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();
}
