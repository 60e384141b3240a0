use anyhow::{Result, bail};

use personalfit_core::service::TrackerService;

pub(crate) fn cmd_reset(svc: &TrackerService, yes: bool, json: bool) -> Result<()> {
    if !yes {
        bail!("This removes your profile and every logged meal. Re-run with --yes to confirm");
    }

    let removed = svc.reset()?;
    if json {
        println!("{}", serde_json::json!({ "reset": removed }));
    } else if removed {
        println!("Profile and meal log cleared.");
    } else {
        println!("Nothing to clear.");
    }
    Ok(())
}
