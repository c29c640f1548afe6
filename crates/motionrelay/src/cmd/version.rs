use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("motionrelay {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: motionrelay");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("MOTIONRELAY_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("MOTIONRELAY_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "ports: device={} source={}",
        motionrelay_transport::DEVICE_LISTEN_PORT,
        motionrelay_transport::SOURCE_LISTEN_PORT
    );
    println!("flush_rate_hz: {}", motionrelay_relay::DEFAULT_FLUSH_RATE_HZ);

    Ok(SUCCESS)
}
