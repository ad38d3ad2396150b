//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Build RSS feeds from a snapshot of rendered blog posts
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: postfeed.toml)
    #[arg(short = 'C', long, global = true, default_value = "postfeed.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build and write one feed per language
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build every feed in memory and print a summary, writing nothing
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn build_args(&self) -> &BuildArgs {
        match self {
            Self::Build { build_args } | Self::Check { build_args, .. } => build_args,
        }
    }
}

/// Shared build arguments for Build and Check commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Content directory path (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Output directory path (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Override the canonical site URL.
    ///
    /// Useful for CI/CD where the production URL differs from the one in
    /// postfeed.toml.
    #[arg(short = 'U', long, value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Maximum number of items per feed
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Show per-post progress
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from([
            "postfeed", "build", "-c", "posts", "-U", "https://example.com", "-l", "10", "-V",
        ]);
        let args = cli.command.build_args();
        assert_eq!(args.content, Some(PathBuf::from("posts")));
        assert_eq!(args.site_url.as_deref(), Some("https://example.com"));
        assert_eq!(args.limit, Some(10));
        assert!(args.verbose);
        assert_eq!(cli.config, PathBuf::from("postfeed.toml"));
    }

    #[test]
    fn test_parse_check_alias() {
        let cli = Cli::parse_from(["postfeed", "-C", "site.toml", "c", "--json"]);
        assert!(matches!(cli.command, Commands::Check { json: true, .. }));
        assert_eq!(cli.config, PathBuf::from("site.toml"));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
