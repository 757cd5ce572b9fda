use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use pictoforge::config::Config;
use pictoforge::error::PfResult;
use std::process;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config; flags given on the command line override it
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Generate(cmd::generate::GenerateArgs),
    Evaluate(cmd::evaluate::EvaluateArgs),
    Search(cmd::search::SearchArgs),
    Similarity(cmd::similarity::SimilarityArgs),
}

fn resolve_config(path: Option<&str>, cli_config: &Config, sub_matches: &ArgMatches) -> PfResult<Config> {
    let config = match path {
        Some(p) => {
            info!("Loading config from: {}", p);
            let mut file_config = Config::load_from_file(p)?;
            file_config.merge_from_cli(cli_config, sub_matches);
            file_config
        }
        None => cli_config.clone(),
    };
    config.validate()?;
    Ok(config)
}

fn main() {
    tracing_subscriber::fmt::init();

    // 1. Raw matches distinguish typed flags from defaults
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    // 2. Subcommand flags live in the subcommand's matches
    let cli_config = match &cli.command {
        Commands::Generate(args) => &args.config,
        Commands::Evaluate(args) => &args.config,
        Commands::Search(args) => &args.config,
        Commands::Similarity(args) => &args.config,
    };
    let Some((_, sub_matches)) = matches.subcommand() else {
        error!("No subcommand given");
        process::exit(1);
    };

    let config = resolve_config(cli.config.as_deref(), cli_config, sub_matches).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    // 3. Execute
    let outcome = match cli.command {
        Commands::Generate(args) => cmd::generate::run(args, config, cli.debug),
        Commands::Evaluate(args) => cmd::evaluate::run(args, config),
        Commands::Search(args) => cmd::search::run(args, config, cli.debug),
        Commands::Similarity(args) => cmd::similarity::run(args),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}
