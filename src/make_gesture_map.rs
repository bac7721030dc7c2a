use clap::Parser;
use log::{error, info, warn};
use std::process::ExitCode;

use pose2gesture::{make_gesture_map, ClassTable, MapArgs};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = MapArgs::parse();

    if !args.input.is_file() {
        error!(
            "The gesture list file does not exist: {}",
            args.input.display()
        );
        return ExitCode::FAILURE;
    }

    let classes = match ClassTable::load_or_default(args.classes.as_deref()) {
        Ok(classes) => classes,
        Err(e) => {
            error!("Failed to load class table: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match make_gesture_map(&args.input, &args.output, &classes) {
        Ok(stats) => {
            info!("Converted lines: {}", stats.converted);
            if stats.failed > 0 {
                warn!("Lines without a matching gesture id: {}", stats.failed);
            }
            info!("Gesture map saved to {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to build gesture map: {}", e);
            ExitCode::FAILURE
        }
    }
}
