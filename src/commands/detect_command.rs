//! CRS detection command
//!
//! Prints the proj4 definition of the CRS a document declares,
//! without transforming anything.

use async_trait::async_trait;
use clap::ArgMatches;
use log::info;

use crate::api::ReprojKit;
use crate::commands::command_traits::Command;
use crate::document::errors::ReprojResult;
use crate::utils::io_utils::{read_input, write_output};

/// Command for reporting a document's embedded CRS
pub struct DetectCommand {
    input_file: Option<String>,
    output_file: Option<String>,
    kit: ReprojKit,
}

impl DetectCommand {
    /// Create a new detect command
    pub fn new(args: &ArgMatches, kit: ReprojKit) -> ReprojResult<Self> {
        Ok(DetectCommand {
            input_file: args.get_one::<String>("input").cloned(),
            output_file: args.get_one::<String>("output").cloned(),
            kit,
        })
    }
}

#[async_trait]
impl Command for DetectCommand {
    async fn execute(&self) -> ReprojResult<()> {
        let input = read_input(self.input_file.as_deref()).await?;
        let crs = self.kit.detect_crs_json(&input)?;
        info!("Detected CRS: {}", crs.definition());
        write_output(self.output_file.as_deref(), crs.definition()).await
    }
}
