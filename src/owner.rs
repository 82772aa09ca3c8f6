//! Ownership lookups backed by the `id` utility.
use std::process::Command;

/// Resolve a uid to a user name, falling back to `uid:<n>`.
pub fn user_name(uid: u32) -> String {
    run_id("-un", uid).unwrap_or_else(|| format!("uid:{uid}"))
}

/// Resolve a gid to a group name, falling back to `gid:<n>`.
pub fn group_name(gid: u32) -> String {
    run_id("-gn", gid).unwrap_or_else(|| format!("gid:{gid}"))
}

fn run_id(flag: &str, id: u32) -> Option<String> {
    let output = Command::new("id").arg(flag).arg(id.to_string()).output().ok()?;
    if !output.status.success() {
        tracing::debug!(flag, id, "id lookup failed");
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

pub fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Root-owned files need elevation for anyone but root.
pub fn requires_sudo(owner_uid: u32, current_uid: u32) -> bool {
    owner_uid == 0 && current_uid != 0
}
