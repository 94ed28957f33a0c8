// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the flags and positional definition files accepted by kompoze

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DEFINITION: &str = "definition.toml";

#[derive(Parser, Debug)]
#[command(name = "kompoze")]
#[command(about = "Render Docker Compose / Stack files from templates and layered variables")]
#[command(version)]
pub struct Args {
    #[arg(help = "Definition files to render", default_value = DEFAULT_DEFINITION)]
    pub definitions: Vec<PathBuf>,

    #[arg(short, long, help = "Base path used to resolve relative paths")]
    pub base_path: Option<PathBuf>,

    #[arg(short, long, help = "Do not overwrite destination files that already exist")]
    pub no_overwrite: bool,

    #[arg(short, long, help = "Force output to be written to stdout")]
    pub stdout: bool,

    #[arg(short = 'D', long, help = "Template tag delimiters as left:right [default: {{:}}]")]
    pub delims: Option<String>,

    #[arg(short, long, help = "Print debugging messages")]
    pub debug: bool,

    #[arg(short, long, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, help = "Keep rendering other definitions after a failure")]
    pub keep_going: bool,

    #[arg(long, help = "Maximum number of definitions rendered at once")]
    pub max_concurrent: Option<usize>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["kompoze"]).unwrap();
        assert_eq!(args.definitions, vec![PathBuf::from(DEFAULT_DEFINITION)]);
        assert!(!args.no_overwrite);
        assert!(!args.stdout);
        assert!(args.delims.is_none());
        assert!(args.base_path.is_none());
    }

    #[test]
    fn test_short_flags_combine() {
        let args =
            Args::try_parse_from(["kompoze", "-ns", "-D", "<%:%>", "-b", "/srv", "a.toml", "b.toml"])
                .unwrap();
        assert!(args.no_overwrite);
        assert!(args.stdout);
        assert_eq!(args.delims.as_deref(), Some("<%:%>"));
        assert_eq!(args.base_path, Some(PathBuf::from("/srv")));
        assert_eq!(
            args.definitions,
            vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]
        );
    }

    #[test]
    fn test_long_flags() {
        let args = Args::try_parse_from([
            "kompoze",
            "--debug",
            "--keep-going",
            "--max-concurrent",
            "2",
            "--no-color",
        ])
        .unwrap();
        assert!(args.debug);
        assert!(args.keep_going);
        assert!(args.no_color);
        assert_eq!(args.max_concurrent, Some(2));
    }
}
