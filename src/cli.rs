use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "entry-finder")]
#[command(about = "List every class on a Java classpath that declares public static main(String[])")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Also write log records to this file.
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Scan(ScanArgs),
    /// Print the parsed header of a single class file.
    Inspect {
        class_file: PathBuf,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Classpath locations: directories, jars or single class files.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Platform path-list of classpath locations, appended after PATH.
    #[arg(long, value_name = "PATHS")]
    pub classpath: Option<String>,

    /// Include pattern over dotted class names, `glob:` (default) or `regex:`.
    /// Every `.` stands for a package separator, in regex patterns too (`\.`
    /// and `.*` included); match the dot of `.class` with `\W`.
    #[arg(short = 'i', long, value_name = "PATTERN")]
    pub include: Option<String>,

    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Fail when a candidate's super type is missing from the classpath.
    #[arg(long)]
    pub strict_dependencies: bool,

    /// Walk classpath locations concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Record failing classpath locations and continue.
    #[arg(long)]
    pub keep_going: bool,

    #[arg(long, value_name = "N")]
    pub max_archive_depth: Option<usize>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}
