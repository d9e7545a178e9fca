use clap::Subcommand;
use model::resource::ResourceKind;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every resource and upload it to the stage
    Run {
        #[arg(long, help = "Path to a .env file whose values override the environment")]
        env_file: Option<PathBuf>,

        #[arg(
            long,
            help = "If specified, writes the JSON run report to this file instead of stdout"
        )]
        report: Option<PathBuf>,
    },
    /// Print the watermark read from the destination table
    Watermark {
        #[arg(long, help = "Path to a .env file whose values override the environment")]
        env_file: Option<PathBuf>,
    },
    /// Fetch and normalize one resource into a local CSV, without uploading
    Preview {
        #[arg(long, help = "tickets, ticket-fields or agent-groups")]
        resource: ResourceKind,

        #[arg(long, help = "Path to a .env file whose values override the environment")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "If specified, writes the CSV to this file instead of stdout")]
        output: Option<PathBuf>,

        #[arg(long, help = "Bound tickets by the warehouse watermark")]
        incremental: bool,
    },
}
