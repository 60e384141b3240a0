use anyhow::Result;

use personalfit_core::models::{ActivityLevel, PhysicalStats, Sex};
use personalfit_core::profile::Profile;
use personalfit_core::service::TrackerService;

use super::helpers::exit_not_found;

pub(crate) fn cmd_profile_set(
    svc: &TrackerService,
    sex: &str,
    age: u32,
    weight_kg: f64,
    height_cm: f64,
    activity: &str,
    json: bool,
) -> Result<()> {
    let stats = PhysicalStats {
        sex: Sex::parse_lenient(sex),
        age,
        weight_kg,
        height_cm,
        activity_level: ActivityLevel::parse_lenient(activity),
    };
    let profile = svc.save_profile(stats)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Profile saved.");
        print_profile(&profile);
    }
    Ok(())
}

pub(crate) fn cmd_profile_show(svc: &TrackerService, json: bool) -> Result<()> {
    let Some(profile) = svc.load_profile()? else {
        exit_not_found("No profile yet. Set one with `personalfit profile set`", json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    let stats = profile.stats();
    let sex = match stats.sex {
        Sex::Male => "male",
        Sex::Female => "female",
        Sex::Unspecified => "unspecified",
    };
    let age = stats.age;
    let weight = stats.weight_kg;
    let height = stats.height_cm;
    let activity = stats.activity_level.as_str();
    println!("  Sex:      {sex}");
    println!("  Age:      {age}");
    println!("  Weight:   {weight} kg");
    println!("  Height:   {height} cm");
    println!("  Activity: {activity}");

    match profile.goal() {
        Some(goal) => {
            let (basal, maintenance, target) = (goal.basal, goal.maintenance, goal.target);
            println!();
            println!("  BASAL:       {basal} kcal");
            println!("  MAINTENANCE: {maintenance} kcal");
            println!("  TARGET:      {target} kcal");
        }
        None => println!("\n  No calorie goal: set sex to M or F to compute one."),
    }
}
