use clap::{Args, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::cli::enums::*;
use crate::cli::validation::parse_define;

/// Available nut subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project
    ///
    /// Builds one output per variant of the feature matrix, minus the
    /// variants listed in build.excludeFeatures. With --watch, a single
    /// variant is rebuilt continuously instead.
    Build(BuildArgs),

    /// Start the development server
    ///
    /// Serves one variant with a reverse proxy for API prefixes and restarts
    /// automatically when the settings file changes.
    Dev(DevArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Project root. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Build mode
    #[arg(long, value_enum, default_value = "production")]
    pub mode: BuildMode,

    /// Settings file to use instead of nut.toml / package.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The single variant to watch or analyze
    ///
    /// Required by --analyze. With --watch, defaults to "dev".
    #[arg(long, value_name = "FEATURE")]
    pub build_target: Option<String>,

    /// Build only this variant of the feature matrix
    #[arg(long, value_name = "FEATURE")]
    pub feature_only: Option<String>,

    /// Produce a bundle analysis report for --build-target
    #[arg(long)]
    pub analyze: bool,

    /// Rebuild continuously instead of building once
    #[arg(short, long)]
    pub watch: bool,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Build only these entries
    ///
    /// Examples:
    ///   --entries-only main --entries-only admin
    ///   --entries-only main,admin
    #[arg(long, value_name = "ENTRY", value_delimiter = ',')]
    pub entries_only: Vec<String>,

    /// Source directory, relative to the project root
    #[arg(long, value_name = "DIR", default_value = "src")]
    pub src_dir: PathBuf,

    /// Entry directory, relative to the source directory
    #[arg(long, value_name = "DIR", default_value = "entries")]
    pub entries_dir: PathBuf,

    /// Override a flag value for every variant
    ///
    /// Values are parsed as JSON when possible, otherwise taken as strings.
    ///
    /// Example: --define batchSize=50 --define apiHost=staging.example.com
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    pub define: Vec<(String, Value)>,

    /// Override build.publicPath
    #[arg(long, value_name = "PATH")]
    pub public_path: Option<String>,

    /// Override build.outDir
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Disable source maps regardless of build.sourceMaps
    #[arg(long)]
    pub no_source_maps: bool,
}

/// Arguments for the dev command (development server)
#[derive(Args, Debug, Clone)]
pub struct DevArgs {
    /// Project root. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Build mode
    #[arg(long, value_enum, default_value = "development")]
    pub mode: BuildMode,

    /// Entry to serve
    #[arg(short, long, value_name = "ENTRY", default_value = "index")]
    pub entry: String,

    /// Settings file to use instead of nut.toml / package.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port for the development server. Overrides devServer.port.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Host to bind. Overrides devServer.host.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Variant to serve. Defaults to devServer.defaultFeature.
    #[arg(long, value_name = "FEATURE")]
    pub build_target: Option<String>,

    /// Source directory, relative to the project root
    #[arg(long, value_name = "DIR", default_value = "src")]
    pub src_dir: PathBuf,

    /// Entry directory, relative to the source directory
    #[arg(long, value_name = "DIR", default_value = "entries")]
    pub entries_dir: PathBuf,
}
