use std::sync::Arc;

use argblink_device::DEFAULT_PULL_INTERVAL;
use argblink_proto::Command;
use tokio::time::Instant;

use crate::cmd::{parse_duration, print_messages, runtime, ReadArgs};
use crate::exit::{device_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::OutputFormat;

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&args.wait)?;
    let runtime = runtime()?;
    let device = Arc::new(args.link.open()?);

    let result = runtime.block_on(async {
        let messages = device.subscribe();
        let pull = device.spawn_pull_loop(DEFAULT_PULL_INTERVAL);

        if let Err(err) = device.send_command(&Command::Read).await {
            let _ = pull.shutdown().await;
            return Err(device_error("send failed", err));
        }

        let deadline = Instant::now() + wait;
        let printed = print_messages(&device, messages, &pull, Some(deadline), format, |_, _| false)
            .await;
        pull.shutdown()
            .await
            .map_err(|err| device_error("receive failed", err))?;

        if printed.count == 0 {
            return Err(CliError::new(
                TIMEOUT,
                format!("no reply from {} within {}", device.name(), args.wait),
            ));
        }
        Ok(SUCCESS)
    });

    device
        .dispose()
        .map_err(|err| device_error("close failed", err))?;
    result
}
