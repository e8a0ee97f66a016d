use crate::ops::tap_generate;
use clap::Parser;
use std::path::PathBuf;
use tap_lib::defaults;

/// Generate a random query or mutation from an introspection result.
#[derive(Debug, Parser)]
pub struct Command {
    /// Path to an introspection result (JSON).
    #[clap(long, help = "Path to an introspection result (JSON).")]
    pub schema: PathBuf,

    /// Generate a mutation instead of a query.
    #[clap(long, help = "Generate a mutation instead of a query.")]
    pub mutation: bool,

    /// Maximum selection-set nesting below the operation.
    #[clap(long, default_value_t = defaults::GENERATOR_MAX_DEPTH, help = "Maximum selection-set nesting below the operation.")]
    pub max_depth: usize,

    /// Maximum fields selected per selection set.
    #[clap(long, default_value_t = defaults::GENERATOR_MAX_FIELDS, help = "Maximum fields selected per selection set.")]
    pub max_fields: usize,

    /// Seed for reproducible output.
    #[clap(long, help = "Seed for reproducible output.")]
    pub seed: Option<u64>,

    /// Prefix variable names with their field path so they never collide.
    #[clap(long, help = "Prefix variable names with their field path so they never collide.")]
    pub namespace_variables: bool,

    /// Enable verbose output.
    #[clap(short, long, help = "Enable verbose output.")]
    pub verbose: bool,
}

pub fn exec(command: Command) -> anyhow::Result<()> {
    tap_generate::init(command)
}
