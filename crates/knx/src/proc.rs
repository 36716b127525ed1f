// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Kernel process inspection helpers (`/proc` and null signals).

use std::io;

/// Check if a process with the given PID exists (null signal probe).
pub fn process_exists(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Kernel process name from `/proc/<pid>/comm`.
pub fn process_comm(pid: u32) -> io::Result<String> {
    let comm = std::fs::read_to_string(format!("/proc/{}/comm", pid))?;
    Ok(comm.trim().to_string())
}

/// Process state character from `/proc/<pid>/stat`.
pub fn process_state(pid: u32) -> io::Result<char> {
    let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid))?;
    parse_stat_state(&stat).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unparseable stat line for pid {}", pid),
        )
    })
}

/// Extract the state character (third field) from a stat line.
///
/// The second field is the executable name in parentheses and may itself
/// contain spaces and parentheses, so the state is found after the last
/// closing parenthesis.
pub fn parse_stat_state(stat: &str) -> Option<char> {
    let after_name = &stat[stat.rfind(')')? + 1..];
    after_name.split_whitespace().next()?.chars().next()
}

#[cfg(test)]
#[path = "proc_tests.rs"]
mod tests;
