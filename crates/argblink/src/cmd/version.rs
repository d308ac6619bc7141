use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("argblink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: argblink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("ARGBLINK_BUILD_TARGET"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "defaults: baud={} word_delay={}ms read_timeout={}ms",
        argblink_transport::DEFAULT_BAUD_RATE,
        argblink_transport::DEFAULT_WORD_DELAY.as_millis(),
        argblink_transport::DEFAULT_READ_TIMEOUT.as_millis()
    );

    Ok(SUCCESS)
}
