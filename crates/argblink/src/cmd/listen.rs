use std::sync::Arc;

use argblink_device::DEFAULT_PULL_INTERVAL;
use tokio_util::sync::CancellationToken;

use crate::cmd::{print_messages, runtime, ListenArgs};
use crate::exit::{device_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let runtime = runtime()?;
    let device = Arc::new(args.link.open()?);

    let result = runtime.block_on(async {
        let messages = device.subscribe();
        let pull = device.spawn_pull_loop(DEFAULT_PULL_INTERVAL);
        if let Err(err) = install_ctrlc_handler(pull.cancellation_token()) {
            let _ = pull.shutdown().await;
            return Err(err);
        }

        let count = args.count;
        print_messages(&device, messages, &pull, None, format, |_, printed| {
            count.is_some_and(|count| printed >= count)
        })
        .await;

        pull.shutdown()
            .await
            .map_err(|err| device_error("receive failed", err))?;
        Ok(SUCCESS)
    });

    device
        .dispose()
        .map_err(|err| device_error("close failed", err))?;
    result
}

fn install_ctrlc_handler(token: CancellationToken) -> CliResult<()> {
    ctrlc::set_handler(move || token.cancel()).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}
