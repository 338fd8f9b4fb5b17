use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "urlaction",
    version,
    about = "Discover MVC areas, controllers and actions for URL helper generation",
    after_help = r#"Examples:
  urlaction scan --path src/WebApp
  urlaction scan --path . --output areas.json
  urlaction discover --graph symbols.json --include-abstract
  RUST_LOG=urlaction=debug urlaction scan --path .
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Discover from a symbol graph JSON document.
    Discover {
        #[arg(long)]
        graph: PathBuf,
        #[command(flatten)]
        discovery: DiscoveryArgs,
        /// Write the model here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Parse C# sources under a directory and discover from them.
    Scan {
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
        #[command(flatten)]
        discovery: DiscoveryArgs,
        /// Write the model here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the built symbol graph instead of the discovered model.
        #[arg(long)]
        emit_graph: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct DiscoveryArgs {
    /// Treat abstract classes deriving from a controller base as controllers.
    #[arg(long)]
    pub include_abstract: bool,
    /// Suffix stripped from controller type names.
    #[arg(long)]
    pub controller_suffix: Option<String>,
    /// Abort discovery after this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Extra fully qualified controller base types.
    #[arg(long = "controller-base", value_delimiter = ',')]
    pub controller_bases: Vec<String>,
}
