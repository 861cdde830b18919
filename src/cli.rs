use clap::{ArgAction, Parser, Subcommand};
use sharehub_library::Filter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sharehub", version)]
#[command(about = "Keep files as data URLs, then browse, download and share them")]
pub struct Cli {
    /// Configuration file layered over the defaults (TOML, YAML or JSON).
    #[arg(long, global = true, env = "SHAREHUB_CONFIG")]
    pub config: Option<PathBuf>,
    /// Read stored files but never write them back.
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// Log more; `RUST_LOG` overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload files, one after the other.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Use this MIME type instead of detecting one.
        #[arg(long)]
        mime: Option<String>,
    },
    /// List stored files, newest first.
    List {
        #[command(flatten)]
        query: Query,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Delete stored files by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Save a stored file under its original name.
    Download {
        id: String,
        /// Directory to write into.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Write the gallery as a self-contained HTML page.
    Render {
        /// Write to a file instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        query: Query,
        /// Page title.
        #[arg(long)]
        title: Option<String>,
    },
    /// Show the type filters that match stored files.
    Filters,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Query {
    /// Only files whose name contains this, ignoring case.
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// Only files of this type: all, image, pdf, zip or other.
    #[arg(short, long, default_value = "all")]
    pub filter: Filter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sharehub_media::FilterBucket;

    #[test]
    fn test_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["sharehub", "list"], "", Filter::All)]
    #[case(&["sharehub", "list", "--search", "cat", "--filter", "image"], "cat", Filter::Bucket(FilterBucket::Image))]
    #[case(&["sharehub", "list", "-f", "ZIP"], "", Filter::Bucket(FilterBucket::Zip))]
    fn test_list_query(#[case] args: &[&str], #[case] search: &str, #[case] filter: Filter) {
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::List { query, json } = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(query.search, search);
        assert_eq!(query.filter, filter);
        assert!(!json);
    }

    #[test]
    fn test_unknown_filter_is_refused() {
        assert!(Cli::try_parse_from(["sharehub", "list", "--filter", "video"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sharehub", "upload", "a.png", "b.pdf", "--dry-run", "-vv", "--mime", "image/png"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        let Command::Upload { files, mime } = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(files, [PathBuf::from("a.png"), PathBuf::from("b.pdf")]);
        assert_eq!(mime.as_deref(), Some("image/png"));
    }

    #[rstest]
    #[case(&["sharehub", "upload"])]
    #[case(&["sharehub", "delete"])]
    #[case(&["sharehub", "download"])]
    fn test_missing_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
