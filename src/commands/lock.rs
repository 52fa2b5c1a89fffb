//! Lock the background to an image

use std::path::Path;
use std::process::ExitCode;

use bglock::{LockController, Outcome, Settings};

pub fn lock(
    settings: Settings,
    image: &Path,
    dry_run: bool,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let controller = LockController::from_settings(settings)?;

    if !dry_run {
        return super::report(&controller.lock(image), json);
    }

    let plan = match controller.plan(image) {
        Ok(plan) => plan,
        Err(e) => return super::report(&Outcome::failed("lock failed", &e, false), json),
    };

    if json {
        let files: Vec<_> = plan
            .files
            .iter()
            .map(|(path, content)| {
                serde_json::json!({
                    "path": path.display().to_string(),
                    "content": content,
                })
            })
            .collect();
        let value = serde_json::json!({
            "source": plan.source.display().to_string(),
            "destination": plan.destination.display().to_string(),
            "copy": plan.copy,
            "files": files,
            "reload": controller.settings().reload_command,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(ExitCode::SUCCESS);
    }

    if plan.copy {
        println!(
            "Would copy {} -> {}",
            plan.source.display(),
            plan.destination.display()
        );
    } else {
        println!("{} is already in place", plan.destination.display());
    }

    for (path, content) in &plan.files {
        println!("\nWould write {}:", path.display());
        for line in content.lines() {
            println!("  {}", line);
        }
    }

    println!(
        "\nWould run: {}",
        controller.settings().reload_command.join(" ")
    );

    Ok(ExitCode::SUCCESS)
}
