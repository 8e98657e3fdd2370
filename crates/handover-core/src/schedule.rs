//! Daily posting schedule rendered as a macOS launch agent.

use crate::error::{HandoverError, Result};
use crate::paths::LAUNCH_AGENT_LABEL;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePreset {
    Off,
    Day,
    Night,
    Custom,
}

impl SchedulePreset {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulePreset::Off => "off",
            SchedulePreset::Day => "day",
            SchedulePreset::Night => "night",
            SchedulePreset::Custom => "custom",
        }
    }

    fn default_time(self) -> Option<(u8, u8)> {
        match self {
            SchedulePreset::Day => Some((17, 16)),
            SchedulePreset::Night => Some((23, 46)),
            _ => None,
        }
    }
}

impl std::str::FromStr for SchedulePreset {
    type Err = HandoverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(SchedulePreset::Off),
            "day" => Ok(SchedulePreset::Day),
            "night" => Ok(SchedulePreset::Night),
            "custom" => Ok(SchedulePreset::Custom),
            other => Err(HandoverError::InvalidSchedule(format!(
                "unknown preset '{other}'; valid values: off, day, night, custom"
            ))),
        }
    }
}

/// A time of day at which the handover is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub hour: u8,
    pub minute: u8,
}

impl Schedule {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 {
            return Err(HandoverError::InvalidSchedule(format!(
                "hour must be 0-23, got {hour}"
            )));
        }
        if minute > 59 {
            return Err(HandoverError::InvalidSchedule(format!(
                "minute must be 0-59, got {minute}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Resolve a preset plus optional overrides. `Off` yields `None`.
    /// Explicit hour/minute override a named preset's defaults.
    pub fn resolve(
        preset: SchedulePreset,
        hour: Option<u8>,
        minute: Option<u8>,
    ) -> Result<Option<Self>> {
        if preset == SchedulePreset::Off {
            return Ok(None);
        }
        let (h, m) = match (preset.default_time(), hour, minute) {
            (_, Some(h), Some(m)) => (h, m),
            (Some((dh, dm)), h, m) => (h.unwrap_or(dh), m.unwrap_or(dm)),
            (None, _, _) => {
                return Err(HandoverError::InvalidSchedule(
                    "custom schedule needs both --hour and --minute".to_string(),
                ))
            }
        };
        Self::new(h, m).map(Some)
    }
}

/// Render the launch-agent plist that runs `program` with `args` daily at
/// `schedule`, from `working_dir`.
pub fn launch_agent_plist(
    program: &Path,
    args: &[&str],
    working_dir: &Path,
    schedule: Schedule,
) -> String {
    let mut arguments = format!("    <string>{}</string>\n", xml_escape(&program.display().to_string()));
    for arg in args {
        arguments.push_str(&format!("    <string>{}</string>\n", xml_escape(arg)));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>Label</key>
  <string>{label}</string>
  <key>ProgramArguments</key>
  <array>
{arguments}  </array>
  <key>WorkingDirectory</key>
  <string>{dir}</string>
  <key>StartCalendarInterval</key>
  <dict>
    <key>Hour</key>
    <integer>{hour}</integer>
    <key>Minute</key>
    <integer>{minute}</integer>
  </dict>
  <key>StandardOutPath</key>
  <string>/tmp/{label}.log</string>
  <key>StandardErrorPath</key>
  <string>/tmp/{label}.err</string>
</dict>
</plist>
"#,
        label = LAUNCH_AGENT_LABEL,
        dir = xml_escape(&working_dir.display().to_string()),
        hour = schedule.hour,
        minute = schedule.minute,
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_to_default_times() {
        assert_eq!(
            Schedule::resolve(SchedulePreset::Day, None, None).unwrap(),
            Some(Schedule { hour: 17, minute: 16 })
        );
        assert_eq!(
            Schedule::resolve(SchedulePreset::Night, None, None).unwrap(),
            Some(Schedule { hour: 23, minute: 46 })
        );
        assert_eq!(Schedule::resolve(SchedulePreset::Off, Some(1), Some(2)).unwrap(), None);
    }

    #[test]
    fn custom_requires_both_fields() {
        assert!(Schedule::resolve(SchedulePreset::Custom, Some(9), None).is_err());
        assert_eq!(
            Schedule::resolve(SchedulePreset::Custom, Some(9), Some(30)).unwrap(),
            Some(Schedule { hour: 9, minute: 30 })
        );
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(Schedule::new(24, 0).is_err());
        assert!(Schedule::new(0, 60).is_err());
        assert!(Schedule::new(23, 59).is_ok());
    }

    #[test]
    fn preset_parse() {
        assert_eq!("night".parse::<SchedulePreset>().unwrap(), SchedulePreset::Night);
        assert!("weekly".parse::<SchedulePreset>().is_err());
    }

    #[test]
    fn plist_contains_interval_and_arguments() {
        let plist = launch_agent_plist(
            Path::new("/usr/local/bin/handover"),
            &["--root", "/Users/dana/handover & co", "post"],
            Path::new("/Users/dana"),
            Schedule { hour: 7, minute: 5 },
        );
        assert!(plist.contains("<string>com.handover.lazyhand</string>"));
        assert!(plist.contains("<string>/usr/local/bin/handover</string>"));
        assert!(plist.contains("<string>/Users/dana/handover &amp; co</string>"));
        assert!(plist.contains("<key>Hour</key>\n    <integer>7</integer>"));
        assert!(plist.contains("<key>Minute</key>\n    <integer>5</integer>"));
    }
}
