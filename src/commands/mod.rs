//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod reproject_command;
pub mod reverse_command;
pub mod detect_command;

pub use command_traits::{Command, CommandFactory};
pub use reproject_command::ReprojectCommand;
pub use reverse_command::ReverseCommand;
pub use detect_command::DetectCommand;

use std::sync::Arc;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use log::info;

use crate::api::ReprojKit;
use crate::crs::{CrsDefinitions, CrsResolver, EpsgIoResolver, OfflineResolver};
use crate::crs::resolver::{DEFAULT_EPSG_IO_URL, DEFAULT_TIMEOUT};
use crate::document::errors::{ReprojError, ReprojResult};

/// Build the command-line interface definition
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("ReprojKit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Reproject GeoJSON between coordinate reference systems")
        .arg(
            Arg::new("input")
                .help("Input GeoJSON file (stdin when omitted)")
                .required(false)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file (stdout when omitted)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .help("Source CRS name (detected from the document's crs member when omitted)")
                .value_name("CRS")
                .required(false),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .help("Target CRS name")
                .value_name("CRS")
                .required(false),
        )
        .arg(
            Arg::new("wgs84")
                .long("wgs84")
                .help("Reproject to WGS 84 longitude/latitude")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("reverse")
                .long("reverse")
                .help("Swap the axis order of every coordinate")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["from", "to", "wgs84", "detect"]),
        )
        .arg(
            Arg::new("detect")
                .long("detect")
                .help("Print the definition of the CRS the document declares")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["from", "to", "wgs84"]),
        )
        .arg(
            Arg::new("crs-defs")
                .long("crs-defs")
                .help("JSON or TOML file mapping CRS names to proj4 definitions")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("use-epsg-io")
                .long("use-epsg-io")
                .help("Look up unknown EPSG codes over the network")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("epsg-io-url")
                .long("epsg-io-url")
                .help("Base URL for EPSG lookups")
                .value_name("URL")
                .default_value(DEFAULT_EPSG_IO_URL),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Network lookup timeout in milliseconds")
                .value_name("MS")
                .required(false),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Write compact JSON instead of pretty-printed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Also write log records to this file")
                .value_name("FILE")
                .required(false),
        )
}

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct ReprojkitCommandFactory;

impl ReprojkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        ReprojkitCommandFactory
    }

    /// Configure the library from CLI arguments
    ///
    /// Loads `--crs-defs` and picks the resolver: network lookups only with
    /// `--use-epsg-io`, otherwise unknown names fail.
    pub fn build_kit(&self, args: &ArgMatches) -> ReprojResult<ReprojKit> {
        let definitions = match args.get_one::<String>("crs-defs") {
            Some(path) => {
                info!("Loading CRS definitions from {}", path);
                CrsDefinitions::from_file(path)?
            },
            None => CrsDefinitions::new(),
        };

        let resolver: Arc<dyn CrsResolver> = if args.get_flag("use-epsg-io") {
            let timeout = match args.get_one::<String>("timeout") {
                Some(ms) => Duration::from_millis(ms.parse::<u64>().map_err(|_| {
                    ReprojError::Config(format!("Invalid timeout: {}", ms))
                })?),
                None => DEFAULT_TIMEOUT,
            };
            let base_url = args
                .get_one::<String>("epsg-io-url")
                .map(String::as_str)
                .unwrap_or(DEFAULT_EPSG_IO_URL);
            info!("Network CRS lookup enabled via {} (timeout {} ms)", base_url, timeout.as_millis());
            Arc::new(EpsgIoResolver::new(base_url, timeout))
        } else {
            Arc::new(OfflineResolver)
        };

        ReprojKit::with_definitions(&definitions, resolver)
    }
}

impl Default for ReprojkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for ReprojkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> ReprojResult<Box<dyn Command>> {
        let kit = self.build_kit(args)?;

        // Determine which command to run based on args
        if args.get_flag("reverse") {
            Ok(Box::new(ReverseCommand::new(args, kit)?))
        } else if args.get_flag("detect") {
            Ok(Box::new(DetectCommand::new(args, kit)?))
        } else {
            // Default to reproject command
            Ok(Box::new(ReprojectCommand::new(args, kit)?))
        }
    }
}
