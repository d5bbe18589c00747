use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use vocab_review::cli::{Cli, Commands, commands};
use vocab_review::{Result, StructuredError, VocabError, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, cli.json);
            exit_code_for(&err)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let overrides = cli.overrides();
    let json = cli.json;
    debug!(command = ?cli.command, "Dispatching command");

    match &cli.command {
        Commands::Init(args) => commands::init::execute(args, json, &overrides),
        Commands::Add(args) => commands::add::execute(args, json, &overrides),
        Commands::Due(args) => commands::due::execute(args, json, &overrides),
        Commands::Review(args) => commands::review::execute(args, json, &overrides),
        Commands::Archive(args) => commands::archive::execute(args, json, &overrides),
        Commands::Show(args) => commands::show::execute(args, json, &overrides),
        Commands::List(args) => commands::list::execute(args, json, &overrides),
        Commands::History(args) => commands::history::execute(args, json, &overrides),
        Commands::Stats => commands::stats::execute(json, &overrides),
        Commands::Import(args) => commands::import::execute(args, json, &overrides),
        Commands::Export(args) => commands::export::execute(args, json, &overrides),
        Commands::Config { command } => commands::config::execute(command, json, &overrides),
    }
}

fn report_error(err: &VocabError, json: bool) {
    if json {
        let structured = StructuredError::from(err);
        match serde_json::to_string_pretty(&serde_json::json!({ "error": structured })) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("Error: {err}"),
        }
        return;
    }

    eprintln!("Error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("Hint: {hint}");
    }
}

fn exit_code_for(err: &VocabError) -> ExitCode {
    u8::try_from(err.code().exit_code()).map_or(ExitCode::FAILURE, ExitCode::from)
}
