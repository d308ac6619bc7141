use std::sync::Arc;

use argblink_device::DEFAULT_PULL_INTERVAL;
use argblink_proto::Message;
use tokio::time::Instant;
use tracing::info;

use crate::cmd::{parse_duration, print_messages, runtime, FillArgs};
use crate::exit::{device_error, CliError, CliResult, FAILURE, SUCCESS, TIMEOUT};
use crate::output::OutputFormat;

pub fn run(args: FillArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&args.wait)?;
    let command = args.frame.command()?;
    let runtime = runtime()?;
    let device = Arc::new(args.link.open()?);

    let result = runtime.block_on(async {
        let messages = device.subscribe();
        let pull = device.spawn_pull_loop(DEFAULT_PULL_INTERVAL);

        info!(
            port = %device.name(),
            leds = args.frame.leds,
            frames = args.frame.frames,
            "sending fill"
        );
        if let Err(err) = device.send_command(&command).await {
            let _ = pull.shutdown().await;
            return Err(device_error("send failed", err));
        }

        let deadline = Instant::now() + wait;
        let printed = print_messages(&device, messages, &pull, Some(deadline), format, |message, _| {
            message.is_terminal()
        })
        .await;
        pull.shutdown()
            .await
            .map_err(|err| device_error("receive failed", err))?;

        match printed.last {
            Some(Message::Done) => Ok(SUCCESS),
            Some(Message::Error { text }) => Err(CliError::new(
                FAILURE,
                format!("device reported error: {text}"),
            )),
            _ => Err(CliError::new(
                TIMEOUT,
                format!("no DONE from {} within {}", device.name(), args.wait),
            )),
        }
    });

    device
        .dispose()
        .map_err(|err| device_error("close failed", err))?;
    result
}
