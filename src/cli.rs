use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search subtitle candidates for a video filename or keyword
    Search {
        /// Video filename, or a plain keyword with --raw
        keyword: String,

        /// Use the keyword as-is instead of guessing from a filename
        #[arg(long)]
        raw: bool,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the subtitle archive of a search candidate
    Download {
        /// Subtitle id as listed by `search`
        id: u64,

        /// Output file; the archive extension is appended unless the name already ends in one
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search by video filename and save the chosen archive next to the video
    Fetch {
        /// Video file
        video: PathBuf,

        /// Index of the candidate to download
        #[arg(long, default_value = "0")]
        pick: usize,

        /// Output directory instead of the video's directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "subhd.toml")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let args = Args::parse_from(["subhd", "-v", "search", "--raw", "权力的游戏"]);
        assert!(args.verbose);
        match args.command {
            Commands::Search { keyword, raw, json } => {
                assert_eq!(keyword, "权力的游戏");
                assert!(raw);
                assert!(!json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_fetch_defaults() {
        let args = Args::parse_from(["subhd", "--config", "my.toml", "fetch", "Show.S01E02.mkv"]);
        assert_eq!(args.config, Some(PathBuf::from("my.toml")));
        match args.command {
            Commands::Fetch { video, pick, output_dir } => {
                assert_eq!(video, PathBuf::from("Show.S01E02.mkv"));
                assert_eq!(pick, 0);
                assert_eq!(output_dir, None);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_download_requires_numeric_id() {
        assert!(Args::try_parse_from(["subhd", "download", "abc"]).is_err());
        let args = Args::try_parse_from(["subhd", "download", "12345", "-o", "out"]).unwrap();
        assert!(matches!(args.command, Commands::Download { id: 12345, .. }));
    }
}
