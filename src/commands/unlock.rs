//! Remove the background lock

use std::process::ExitCode;

use bglock::{LockController, Settings};

pub fn unlock(settings: Settings, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let controller = LockController::from_settings(settings)?;
    super::report(&controller.unlock(), json)
}
