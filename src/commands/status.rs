//! Show lock status

use std::process::ExitCode;

use bglock::{LockController, LockState, Settings};

pub fn status(settings: Settings, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let controller = LockController::from_settings(settings)?;
    let status = controller.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(ExitCode::SUCCESS);
    }

    let symbol = match status.state {
        LockState::Locked => "●",
        LockState::Unlocked => "○",
        LockState::Partial => "◐",
    };
    println!("{} {}", symbol, status.state.as_str());

    if let Some(image) = &status.image {
        let note = if status.image_present { "" } else { " (missing)" };
        println!("      Image: {}{}", image.display(), note);
    }

    let paths = &controller.settings().paths;
    for (label, path) in [
        ("Defaults", paths.default_file.clone()),
        ("Lock", paths.lock_file()),
    ] {
        let state = if path.exists() { "present" } else { "absent" };
        println!("   {:>8}: {} ({})", label, path.display(), state);
    }

    if status.state == LockState::Partial {
        println!("\nOnly some override files exist; run `bglock unlock` or lock again.");
    }

    Ok(ExitCode::SUCCESS)
}
