//! Reprojection command
//!
//! This module implements the command for reprojecting a GeoJSON
//! document from one CRS to another, or to WGS 84.

use async_trait::async_trait;
use clap::ArgMatches;
use log::info;

use crate::api::ReprojKit;
use crate::commands::command_traits::Command;
use crate::document::errors::{ReprojError, ReprojResult};
use crate::utils::io_utils::{read_input, write_output};

/// Command for reprojecting a document
pub struct ReprojectCommand {
    /// Input file, stdin when absent
    input_file: Option<String>,
    /// Output file, stdout when absent
    output_file: Option<String>,
    /// Source CRS name, detected from the document when absent
    from: Option<String>,
    /// Target CRS name; `None` means WGS 84
    to: Option<String>,
    /// Pretty-print the result
    pretty: bool,
    /// Library entry point
    kit: ReprojKit,
}

impl ReprojectCommand {
    /// Create a new reproject command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `kit` - Configured library entry point
    ///
    /// # Returns
    /// A new ReprojectCommand instance or an error
    pub fn new(args: &ArgMatches, kit: ReprojKit) -> ReprojResult<Self> {
        let wgs84 = args.get_flag("wgs84");
        let to = args.get_one::<String>("to").cloned();

        if wgs84 && to.is_some() {
            return Err(ReprojError::Config("--wgs84 and --to cannot be combined".to_string()));
        }
        if !wgs84 && to.is_none() {
            return Err(ReprojError::Config(
                "Missing target CRS. Use --to <CRS> or --wgs84".to_string(),
            ));
        }

        Ok(ReprojectCommand {
            input_file: args.get_one::<String>("input").cloned(),
            output_file: args.get_one::<String>("output").cloned(),
            from: args.get_one::<String>("from").cloned(),
            to,
            pretty: !args.get_flag("compact"),
            kit,
        })
    }
}

#[async_trait]
impl Command for ReprojectCommand {
    async fn execute(&self) -> ReprojResult<()> {
        let source = self.from.as_deref().unwrap_or("<detected>");
        let target = self.to.as_deref().unwrap_or("WGS84");
        info!("Reprojecting {} from {} to {}",
              self.input_file.as_deref().unwrap_or("<stdin>"), source, target);

        let input = read_input(self.input_file.as_deref()).await?;
        let output = match &self.to {
            Some(to) => self.kit.reproject_json(&input, self.from.as_deref(), to, self.pretty).await?,
            None => self.kit.to_wgs84_json(&input, self.from.as_deref(), self.pretty).await?,
        };
        write_output(self.output_file.as_deref(), &output).await?;

        info!("Reprojection successful");
        Ok(())
    }
}
