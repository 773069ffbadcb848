use std::fs;

/// Resident set size of this process in KB, read from procfs.
/// Yields 0 on platforms without /proc/self/statm.
pub fn rss_kb() -> u64 {
    fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|statm| {
            statm
                .split_whitespace()
                .nth(1)
                .and_then(|pages| pages.parse::<u64>().ok())
        })
        .map(|pages| pages * 4096 / 1024)
        .unwrap_or(0)
}
