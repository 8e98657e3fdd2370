use crate::output::print_json;
use anyhow::Context;
use handover_core::schedule::{launch_agent_plist, Schedule, SchedulePreset};
use handover_core::{io, paths};
use std::path::{Path, PathBuf};

pub fn run(
    root: &Path,
    preset: SchedulePreset,
    hour: Option<u8>,
    minute: Option<u8>,
    output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let target = match output {
        Some(p) => p,
        None => paths::launch_agent_path()?,
    };

    let Some(schedule) = Schedule::resolve(preset, hour, minute)? else {
        let removed = io::remove_if_exists(&target)?;
        if json {
            return print_json(&serde_json::json!({
                "preset": preset.as_str(),
                "path": target,
                "removed": removed,
            }));
        }
        if removed {
            println!("Removed {}", target.display());
            println!("Run `launchctl unload {}` if it was loaded.", target.display());
        } else {
            println!("No schedule installed at {}", target.display());
        }
        return Ok(());
    };

    let program = std::env::current_exe().context("failed to locate the handover binary")?;
    let root_arg = root.display().to_string();
    let plist = launch_agent_plist(&program, &["--root", &root_arg, "post"], root, schedule);
    io::atomic_write(&target, plist.as_bytes())
        .with_context(|| format!("failed to write {}", target.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "preset": preset.as_str(),
            "path": target,
            "hour": schedule.hour,
            "minute": schedule.minute,
        }));
    }
    println!(
        "Scheduled daily post at {:02}:{:02} ({})",
        schedule.hour,
        schedule.minute,
        preset.as_str()
    );
    println!("Wrote {}", target.display());
    println!("Run `launchctl load {}` to activate.", target.display());
    Ok(())
}
