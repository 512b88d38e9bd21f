// src/cli/mod.rs — CLI definition (clap derive)

pub mod input;
pub mod output;
pub mod progress;
pub mod run;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::infra::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "toxamp",
    about = "Iteratively rewrite texts to maximise a classifier's toxicity score",
    version
)]
pub struct Cli {
    /// Literal text, or path to a JSON array of {"text": ...} objects
    #[arg(long)]
    pub input: String,

    /// Search iterations per text
    #[arg(long, default_value_t = 15)]
    pub iterations: u32,

    /// Generation model (hosted names are mapped through the config table)
    #[arg(long, default_value = "gpt-3.5-turbo")]
    pub model: String,

    /// Output JSON file
    #[arg(long, default_value = "output.json")]
    pub output: PathBuf,

    /// Prompt template with a {text} placeholder
    #[arg(long, alias = "custom_prompt")]
    pub custom_prompt: Option<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Requests per second across all analyses
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Maximum analyses in flight at once
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Generation attempts per iteration
    #[arg(long)]
    pub attempts: Option<u32>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and suppress progress lines
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(n) = self.rate_limit {
            config.limits.rate_limit = n;
        }
        if let Some(n) = self.max_concurrent {
            config.limits.max_concurrent = n;
        }
        if let Some(n) = self.attempts {
            config.search.attempts_per_iteration = n;
        }
    }
}
