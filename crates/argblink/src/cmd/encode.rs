use argblink_proto::Command;

use crate::cmd::EncodeCommand;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_command, OutputFormat};

pub fn run(command: EncodeCommand, format: OutputFormat) -> CliResult<i32> {
    let command = match command {
        EncodeCommand::Read => Command::Read,
        EncodeCommand::Fill(frame) => frame.command()?,
    };
    print_command(&command, format);
    Ok(SUCCESS)
}
