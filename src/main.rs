//! kiln's main application entry point.
//! Parses arguments, loads the site and runs the build.

use std::time::Instant;

use kiln::{
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    logger::init_logger,
    site::Site,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads and validates the site configuration
/// 2. Applies the output directory override
/// 3. Renders pages and copies passthrough files
fn run(args: Args) -> Result<()> {
    let started = Instant::now();

    let mut site = Site::load(&args.project_dir)?;
    if let Some(output_dir) = args.output_dir {
        site.set_output_dir(output_dir);
    }

    let report = site.build()?;

    println!(
        "Wrote {} pages and copied {} files to {} in {:.2?}.",
        report.pages.len(),
        report.copied.len(),
        site.output_dir().display(),
        started.elapsed()
    );
    Ok(())
}
