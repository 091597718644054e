//! CLI surface. Grounded on the teacher's subcommand-enum pattern as seen
//! across the pack's CLI tools (e.g. letusinfra's `main.rs`): one `clap`
//! derive enum, one variant per subcommand.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "starfig", version, about = "Programmatic configuration generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Evaluate one or more `//pkg:target` build targets and print their values.
    Build {
        /// Targets to build, e.g. `//fruit:apple` or `//fruit/...`.
        #[arg(required = true)]
        targets: Vec<String>,

        /// Keep evaluating remaining targets after a failure instead of stopping at the first one.
        #[arg(long)]
        keep_going: bool,
    },
    /// Print the starfig version.
    Version,
}
