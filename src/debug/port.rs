//! Debug port discovery from the OS socket tables.
//!
//! Windows lists sockets with `netstat` and resolves the owning pid with
//! `tasklist`; everywhere else `lsof` filters by command name directly. The
//! tables can change between the scan and the attach, nothing is retried.

use std::{collections::HashMap, process::Stdio, sync::LazyLock};

use regex::Regex;

pub const UNITY_PROCESS: &str = "Unity";

/// Lowest port a debugger agent can listen on without privileges.
const FIRST_UNPRIVILEGED: u16 = 1024;

static LSOF_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TCP \*:(\d+)").expect("lsof port pattern is valid"));

/// Listening port of the first process named `process`, if any.
pub fn find_debug_port(process: &str) -> Option<u16> {
    let port = if cfg!(target_os = "windows") {
        capture("netstat", &["-a", "-n", "-o", "-p", "TCP"])
            .and_then(|output| parse_netstat(&output, process, process_name))
    } else {
        let filter = format!("/^{process}$/");
        capture("lsof", &["-c", &filter, "-i", "4tcp", "-a"])
            .and_then(|output| parse_lsof(&output, process))
    };

    log::debug!("[port] {process}: {port:?}");
    port
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    match std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        // lsof exits non-zero when nothing matched, the output is still usable
        Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        Err(err) => {
            log::warn!("[port] failed to run {program}: {err}");
            None
        }
    }
}

/// Parses `lsof -i 4tcp` output.
///
/// ```text
/// COMMAND   PID USER   FD   TYPE  DEVICE SIZE/OFF NODE NAME
/// Unity   51234 dev    57u  IPv4  0x9f1c      0t0  TCP *:56161 (LISTEN)
/// ```
pub fn parse_lsof(output: &str, process: &str) -> Option<u16> {
    output
        .lines()
        .filter(|line| line.split_whitespace().next() == Some(process))
        .find_map(|line| {
            LSOF_PORT
                .captures(line)
                .and_then(|captures| captures[1].parse().ok())
        })
}

/// Parses `netstat -a -n -o -p TCP` output, resolving each owning pid with
/// `resolve`.
///
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:56161          0.0.0.0:0              LISTENING       51234
/// ```
pub fn parse_netstat(
    output: &str,
    process: &str,
    mut resolve: impl FnMut(u32) -> Option<String>,
) -> Option<u16> {
    let mut names = HashMap::new();

    for line in output.lines() {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        let [proto, local, _foreign, state, pid] = tokens.as_slice() else {
            continue;
        };
        if !proto.eq_ignore_ascii_case("TCP") || !state.eq_ignore_ascii_case("LISTENING") {
            continue;
        }

        let Some(port) = local
            .rsplit_once(':')
            .and_then(|(_, port)| port.parse::<u16>().ok())
        else {
            continue;
        };
        if port < FIRST_UNPRIVILEGED {
            continue;
        }
        let Ok(pid) = pid.parse::<u32>() else {
            continue;
        };

        let name = names.entry(pid).or_insert_with(|| resolve(pid));
        if name
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(process))
        {
            return Some(port);
        }
    }

    None
}

fn process_name(pid: u32) -> Option<String> {
    let filter = format!("PID eq {pid}");
    capture("tasklist", &["/FI", &filter, "/FO", "CSV", "/NH"])
        .and_then(|output| parse_tasklist(&output))
}

/// Image name from `tasklist /FO CSV /NH` output, without the `.exe` suffix.
pub fn parse_tasklist(output: &str) -> Option<String> {
    let line = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    if !line.starts_with('"') {
        // "INFO: No tasks are running which match the specified criteria."
        return None;
    }

    let image = line.split(',').next()?.trim_matches('"');
    let name = match image.len().checked_sub(4) {
        Some(split)
            if image
                .get(split..)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(".exe")) =>
        {
            &image[..split]
        }
        _ => image,
    };
    Some(name.to_string())
}
