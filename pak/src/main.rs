mod cli;
mod commands;
mod util;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pak=debug,pak_format=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::from_iter(wild::args_os());
    init_tracing(cli.verbose);

    tracing::debug!(command = ?cli.command, "dispatching");

    let result = match cli.command {
        Commands::Pack(args) => commands::pack::run(args),
        Commands::Unpack(args) => commands::unpack::run(args),
        Commands::Add(args) => commands::add::run(args),
        Commands::Delete(args) => commands::delete::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Verify(args) => commands::verify::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}
