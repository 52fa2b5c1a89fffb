mod lock;
mod status;
mod unlock;

pub use lock::lock;
pub use status::status;
pub use unlock::unlock;

use std::process::ExitCode;

use bglock::Outcome;

const RESTART_HINT: &str = "Restart the session (or reboot) for the change to take effect.";

/// Print a pipeline outcome and pick the exit code for it
fn report(outcome: &Outcome, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if outcome.success {
        println!("● Background {}", outcome.message);
        if outcome.changed {
            println!("  {}", RESTART_HINT);
        }
    } else {
        let kind = outcome.kind.map(|k| k.as_str()).unwrap_or("error");
        eprintln!("× {} ({})", outcome.message, kind);
        if let Some(detail) = &outcome.detail {
            for line in detail.lines() {
                eprintln!("  {}", line);
            }
        }
    }

    Ok(match outcome.kind {
        Some(kind) => ExitCode::from(kind.exit_code()),
        None => ExitCode::SUCCESS,
    })
}
