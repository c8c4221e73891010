use crate::prelude::*;
use clap::Parser;

mod cli;
mod error;
mod prelude;
mod server;
mod storage;

#[cfg(test)]
mod test_pdf;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Locate text on PDF pages and replace it in place"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "PDFEDIT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Find every occurrence of a string on a page
    Find(crate::cli::FindOptions),

    /// Replace one occurrence of a string on a page
    Replace(crate::cli::ReplaceOptions),

    /// Serve the HTTP API
    Serve(crate::server::ServeOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    let default_level = if app.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    color_eyre::install()?;

    match app.command {
        SubCommands::Find(options) => crate::cli::run_find(options, app.global).await,
        SubCommands::Replace(options) => crate::cli::run_replace(options, app.global).await,
        SubCommands::Serve(options) => crate::server::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
