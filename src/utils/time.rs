/// Formats whole seconds as `M:SS` for the score/time HUDs.
pub fn format_time(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins}:{secs:02}")
}

/// Whole seconds in `ms`, rounded down.
pub fn whole_seconds(ms: u64) -> u64 {
    ms / 1000
}
