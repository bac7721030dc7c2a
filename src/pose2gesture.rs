use clap::Parser;

use log::{error, info, warn};
use std::process::ExitCode;

use pose2gesture::{
    create_dataset_yaml, load_gesture_map, process_dataset, render_verification, Args,
    ClassTable, GestureError, LocalStore,
};

fn run(args: &Args) -> Result<(), GestureError> {
    let gesture_map = load_gesture_map(&args.map_file)?;
    let classes = ClassTable::load_or_default(args.classes.as_deref())?;

    if !args.pose_dir.exists() {
        warn!(
            "The specified pose_dir does not exist: {}",
            args.pose_dir.display()
        );
    }

    let yaml_path = create_dataset_yaml(&args.output_dir, &classes, &gesture_map)?;
    info!("Created {}", yaml_path.display());

    let stats = process_dataset(&LocalStore, &args.pose_dir, &args.output_dir, &gesture_map)?;
    stats.print_summary();
    info!("Gesture dataset saved to {}", args.output_dir.display());

    if args.verify_count > 0 {
        info!("Rendering verification images...");
        render_verification(
            &args.output_dir,
            &args.verify_dir,
            args.verify_count,
            args.seed,
            &classes,
        )?;
    }

    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting the conversion process...");

    match run(&args) {
        Ok(()) => {
            info!("Conversion process completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
