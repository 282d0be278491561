//! Axis-order reversal command

use async_trait::async_trait;
use clap::ArgMatches;
use log::info;

use crate::api::ReprojKit;
use crate::commands::command_traits::Command;
use crate::document::errors::ReprojResult;
use crate::utils::io_utils::{read_input, write_output};

/// Command for swapping X and Y of every position
pub struct ReverseCommand {
    input_file: Option<String>,
    output_file: Option<String>,
    pretty: bool,
    kit: ReprojKit,
}

impl ReverseCommand {
    /// Create a new reverse command
    pub fn new(args: &ArgMatches, kit: ReprojKit) -> ReprojResult<Self> {
        Ok(ReverseCommand {
            input_file: args.get_one::<String>("input").cloned(),
            output_file: args.get_one::<String>("output").cloned(),
            pretty: !args.get_flag("compact"),
            kit,
        })
    }
}

#[async_trait]
impl Command for ReverseCommand {
    async fn execute(&self) -> ReprojResult<()> {
        info!("Reversing axis order of {}", self.input_file.as_deref().unwrap_or("<stdin>"));
        let input = read_input(self.input_file.as_deref()).await?;
        let output = self.kit.reverse_json(&input, self.pretty)?;
        write_output(self.output_file.as_deref(), &output).await
    }
}
