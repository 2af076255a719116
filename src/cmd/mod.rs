//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`check`], or [`health`]. Each handler
//! lives in its own submodule.

pub mod check;
pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::BridgeError;

pub async fn dispatch(cli: Cli) -> Result<(), BridgeError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Check(ref args)) => check::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  tv-bridge v{version} \u{2014} allow-listed HTTP forwarding bridge\n\n  \
         No command provided. To get started:\n\n    \
         tv-bridge run --allow-hosts example.com   Start the bridge on :8080\n    \
         tv-bridge check <url>                     Test a URL against the allow-list\n    \
         tv-bridge --help                          See all commands and options\n"
    );
}
