//! berth CLI - build configurations and their environment

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use berth::util::diagnostic::emit;
use berth::util::{Session, Shell};
use berth::{ConfigError, CredentialError};

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
}

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);
    let color = shell.use_color();

    if let Err(e) = run(cli, GlobalOptions { shell }) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, global_opts: GlobalOptions) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else if cli.quiet {
        EnvFilter::new("berth=error")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't need a session
    let command = match cli.command {
        Commands::Schema => return commands::schema::execute(),
        Commands::Completions(args) => return commands::completions::execute(args),
        command => command,
    };

    let mut session = Session::from_env()?;
    session.set_quiet(cli.quiet);
    session.set_color(global_opts.shell.use_color());
    session.set_validation_override(cli.validation);

    match command {
        Commands::Init(args) => commands::init::execute(args, &mut session, &global_opts),
        Commands::Use(args) => commands::use_config::execute(args, &mut session, &global_opts),
        Commands::Show(args) => commands::show::execute(args, &session),
        Commands::List(args) => commands::list::execute(args, &session, &global_opts),
        Commands::Remove(args) => commands::remove::execute(args, &session, &global_opts),
        Commands::Sanitize(args) => commands::sanitize::execute(args, &session, &global_opts),
        Commands::Env(args) => commands::env::execute(args, &session),
        Commands::Auth(args) => commands::auth::execute(args, &session, &global_opts),
        Commands::Schema | Commands::Completions(_) => unreachable!("handled above"),
    }
}

/// Render typed errors as diagnostics; anything else as a plain error chain.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        emit(&e.to_diagnostic(), color);
    } else if let Some(e) = err.downcast_ref::<CredentialError>() {
        emit(&e.to_diagnostic(), color);
    } else {
        eprintln!("error: {:#}", err);
    }
}
