//! Default parallelism probe.
//!
//! Determines how many jobs `-j/--jobs` should default to. The sources are
//! tried in order and the first positive count wins; every failure along
//! the chain only weakens the default, it is never surfaced as an error.

use std::process::Command;

use log::debug;

/// Upper bound for the default job count.
pub const MAX_JOBS: usize = 1024;

/// Returns the default amount of parallel jobs, always in `[1, MAX_JOBS]`.
///
/// Sources, first hit wins: the `JOBS` environment variable, the
/// Windows-style `NUMBER_OF_PROCESSORS` variable, the OS processor count,
/// and finally a one-shot `sysctl -n hw.ncpu` probe.
pub fn default_jobs() -> usize {
    let count = env_count("JOBS")
        .or_else(|| env_count("NUMBER_OF_PROCESSORS"))
        .or_else(online_cpus)
        .or_else(sysctl_cpus)
        .unwrap_or(1);
    count.clamp(1, MAX_JOBS)
}

fn env_count(var: &str) -> Option<usize> {
    std::env::var(var).ok().and_then(|value| parse_count(&value))
}

fn parse_count(text: &str) -> Option<usize> {
    text.trim().parse::<usize>().ok().filter(|&count| count > 0)
}

fn online_cpus() -> Option<usize> {
    std::thread::available_parallelism()
        .ok()
        .map(|count| count.get())
}

/// Last-resort probe for platforms where the processor count is not
/// exposed otherwise. Any failure is swallowed as "no result".
fn sysctl_cpus() -> Option<usize> {
    if cfg!(windows) {
        return None;
    }
    let output = match Command::new("sysctl").args(["-n", "hw.ncpu"]).output() {
        Ok(output) => output,
        Err(error) => {
            debug!("sysctl probe did not run: {error}");
            return None;
        }
    };
    if !output.status.success() {
        debug!("sysctl probe exited with {}", output.status);
        return None;
    }
    std::str::from_utf8(&output.stdout)
        .ok()
        .and_then(parse_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_jobs_stays_in_range() {
        let jobs = default_jobs();
        assert!(jobs >= 1);
        assert!(jobs <= MAX_JOBS);
    }

    #[test]
    fn test_parse_count_accepts_positive_integers() {
        assert_eq!(parse_count("8"), Some(8));
        assert_eq!(parse_count(" 16\n"), Some(16));
    }

    #[test]
    fn test_parse_count_rejects_junk() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("-2"), None);
        assert_eq!(parse_count("eight"), None);
        assert_eq!(parse_count("4 cores"), None);
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(0usize.clamp(1, MAX_JOBS), 1);
        assert_eq!(4096usize.clamp(1, MAX_JOBS), MAX_JOBS);
        assert_eq!(8usize.clamp(1, MAX_JOBS), 8);
    }
}
