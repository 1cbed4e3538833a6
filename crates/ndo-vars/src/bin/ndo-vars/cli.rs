//! ndo-vars cli interface

use clap::{Parser, Subcommand, ValueEnum};
use ndo_vars::entity::Kind;
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; ndo-vars ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert tables into a schema document
    ///
    /// Reads the tables from the work directory unless any other source is provided
    /// (via --input-dir or a table file option)
    #[command(alias = "build")]
    Convert(ConvertCommand),

    /// Validate tables and print a summary
    Check(CheckCommand),

    /// Turn a schema document back into tables
    Flatten(FlattenCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct ConvertCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct CheckCommand {
    #[clap(flatten)]
    pub input: InputArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load tables from given directory
    ///
    /// Looks for vrfs.csv, bridge_domains.csv, bd_subnets.csv,
    /// anps.csv, epgs.csv and epg_domains.csv
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,

    /// VRFs table
    #[clap(long = "vrfs")]
    pub vrfs: Option<PathBuf>,

    /// Bridge domains table
    #[clap(long = "bds")]
    pub bridge_domains: Option<PathBuf>,

    /// Bridge domain subnets table (optional)
    #[clap(long = "subnets")]
    pub subnets: Option<PathBuf>,

    /// Application profiles table
    #[clap(long = "anps")]
    pub application_profiles: Option<PathBuf>,

    /// Endpoint groups table
    #[clap(long = "epgs")]
    pub endpoint_groups: Option<PathBuf>,

    /// Endpoint group domain associations table (optional)
    #[clap(long = "domains")]
    pub domain_associations: Option<PathBuf>,
}

impl InputArgs {
    /// Table files given one by one
    pub fn files(&self) -> impl Iterator<Item = (Kind, &PathBuf)> {
        [
            (Kind::Vrf, &self.vrfs),
            (Kind::BridgeDomain, &self.bridge_domains),
            (Kind::Subnet, &self.subnets),
            (Kind::ApplicationProfile, &self.application_profiles),
            (Kind::EndpointGroup, &self.endpoint_groups),
            (Kind::DomainAssociation, &self.domain_associations),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.as_ref().map(|path| (kind, path)))
    }
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    #[arg(short = 'L', long = "layout", default_value_t)]
    pub layout: Layout,

    /// Write to file instead of stdout
    #[clap(short = 'o', long = "output")]
    pub file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum Layout {
    /// schema → template → entities
    #[default]
    Tree,
    /// flat `ndo_schema_data` lists
    Ndo,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Tree => f.write_str("tree"),
            Layout::Ndo => f.write_str("ndo"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct FlattenCommand {
    /// Schema document in tree layout (yaml or json), read from stdin when omitted
    #[clap(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Directory to write the tables to
    #[clap(short = 'o', long = "output-dir")]
    pub output_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    Tables,
    Records,
    Links,
}
