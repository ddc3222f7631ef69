//! ST-007: Build journal — timestamped events, appendable as JSONL.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Something that happened while building or tearing down a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StackEvent {
    BuildStarted {
        resources: usize,
        outputs: usize,
    },
    ResourceCreated {
        resource: String,
        resource_type: String,
        duration_seconds: f64,
    },
    ResourceFailed {
        resource: String,
        error: String,
    },
    OutputEvaluated {
        output: String,
    },
    BuildCompleted {
        resources_created: usize,
        outputs: usize,
    },
    BuildFailed {
        error: String,
    },
    ResourceDestroyed {
        resource: String,
    },
}

/// Event with its wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: StackEvent,
}

impl TimestampedEvent {
    pub fn now(event: StackEvent) -> Self {
        Self {
            ts: now_iso8601(),
            event,
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn now_iso8601() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_iso8601(secs)
}

/// Format seconds since the Unix epoch.
pub fn format_iso8601(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (y, m, d) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y,
        m,
        d,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

// Proleptic Gregorian date from days since 1970-01-01 (era-based).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}

/// Append events to a JSONL file, creating parent directories.
pub fn append_events(path: &Path, events: &[TimestampedEvent]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create {}: {}", parent.display(), e))?;
        }
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("cannot open event log {}: {}", path.display(), e))?;

    for event in events {
        let json =
            serde_json::to_string(event).map_err(|e| format!("JSON serialize error: {}", e))?;
        writeln!(file, "{}", json).map_err(|e| format!("write error: {}", e))?;
    }
    Ok(())
}
