use clap::Subcommand;
use engine::settings::DEFAULT_BATCH_SIZE;

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the destination table with the current source rows
    Sync {
        #[arg(
            long,
            default_value_t = DEFAULT_BATCH_SIZE,
            help = "Records per multi-row insert statement"
        )]
        batch_size: usize,

        #[arg(
            long,
            help = "Continue past failed batches instead of stopping at the first one"
        )]
        keep_going: bool,

        #[arg(long, default_value_t = 1, help = "Concurrent batch writes")]
        parallelism: usize,

        #[arg(long, help = "Overall operation timeout in seconds")]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Fetch and transform only; skip the delete and all writes")]
        dry_run: bool,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        report: Option<String>,
    },
    /// Print the source table's column schema and row statistics
    Inspect {
        #[arg(long, help = "Table to inspect; defaults to the configured source table")]
        table: Option<String>,
    },
    /// List user tables in the source database with row counts
    Tables,
    /// Test a store connection
    TestConn {
        /// Which store to ping: "source" or "destination"
        #[arg(long)]
        target: String,
    },
    /// Compare source and destination row counts after a sync
    Verify,
}
