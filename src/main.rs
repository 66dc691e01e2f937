use clap::Parser;
use templatte::cli::{Cli, Commands};
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so they never mix with command output.
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Genelatte {
            ref config_type,
            with_mappings,
        } => templatte::cli::commands::genelatte::execute(&cli, config_type, with_mappings),
        Commands::Press => templatte::cli::commands::press::execute(&cli),
        Commands::Pour => templatte::cli::commands::pour::execute(&cli),
        Commands::Grind { force } => templatte::cli::commands::grind::execute(&cli, force),
        Commands::Deploy { print } => templatte::cli::commands::deploy::execute(&cli, print),
        Commands::Completions { shell } => templatte::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        templatte::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
