//! Process supervision: one running monitor per user, started at login.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

pub const LAUNCH_AGENT_LABEL: &str = "com.audiocastguard.daemon";

/// Exclusive `flock` on a lock file, held for the life of the daemon.
/// The kernel drops the lock when the process exits, however it exits.
#[derive(Debug)]
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock, or `None` if another process holds it.
    pub fn acquire(path: &Path) -> Result<Option<Self>> {
        let Some(mut file) = try_lock(path)? else {
            debug!("Instance lock {} is held elsewhere", path.display());
            return Ok(None);
        };

        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;

        debug!("Acquired instance lock {}", path.display());
        Ok(Some(Self {
            _file: file,
            path: path.to_path_buf(),
        }))
    }

    /// Whether some process currently holds the lock. Leaves the recorded
    /// PID untouched.
    pub fn is_held(path: &Path) -> Result<bool> {
        Ok(try_lock(path)?.is_none())
    }

    /// PID recorded by the current holder, if readable
    pub fn holder_pid(path: &Path) -> Option<u32> {
        let mut file = File::open(path).ok()?;
        let mut content = String::new();
        file.rewind().ok()?;
        file.read_to_string(&mut content).ok()?;
        content.trim().parse().ok()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_path() -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Failed to get cache directory"))?;
        Ok(cache_dir.join("audio-cast-guard/daemon.lock"))
    }
}

/// Open `path` and take a non-blocking exclusive `flock`, without writing.
fn try_lock(path: &Path) -> Result<Option<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create lock directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock {
            return Ok(None);
        }
        return Err(err).with_context(|| format!("Failed to lock {}", path.display()));
    }

    Ok(Some(file))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    AlreadyRunning,
    Launched(u32),
}

/// Start `program daemon_args..` detached unless a monitor already holds
/// the instance lock.
pub fn launch_detached(
    lock_path: &Path,
    program: &Path,
    daemon_args: &[String],
) -> Result<LaunchOutcome> {
    if InstanceLock::is_held(lock_path)? {
        match InstanceLock::holder_pid(lock_path) {
            Some(pid) => warn!("Monitor is already running (pid {}), not launching", pid),
            None => warn!("Monitor is already running, not launching"),
        }
        return Ok(LaunchOutcome::AlreadyRunning);
    }

    let child = Command::new(program)
        .args(daemon_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch {}", program.display()))?;

    info!("Launched monitor process {}", child.id());
    Ok(LaunchOutcome::Launched(child.id()))
}

/// Per-user LaunchAgent that starts the daemon at login and keeps it alive
pub struct LaunchAgent {
    plist_path: PathBuf,
}

impl LaunchAgent {
    pub fn new(plist_path: PathBuf) -> Self {
        Self { plist_path }
    }

    pub fn at_default_path() -> Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
        Ok(Self::new(home_dir.join(format!(
            "Library/LaunchAgents/{}.plist",
            LAUNCH_AGENT_LABEL
        ))))
    }

    pub fn plist_path(&self) -> &Path {
        &self.plist_path
    }

    pub fn install(&self, exe_path: &Path, config_path: Option<&Path>) -> Result<()> {
        info!("Installing macOS LaunchAgent");

        if let Some(parent) = self.plist_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.plist_path, render_plist(exe_path, config_path))
            .with_context(|| format!("Failed to write {}", self.plist_path.display()))?;

        info!("LaunchAgent installed to: {}", self.plist_path.display());
        info!(
            "To load the service, run: launchctl load {}",
            self.plist_path.display()
        );
        Ok(())
    }

    /// Returns whether a plist was removed
    pub fn uninstall(&self) -> Result<bool> {
        info!("Uninstalling macOS LaunchAgent");

        if !self.plist_path.exists() {
            warn!("LaunchAgent plist not found at: {}", self.plist_path.display());
            return Ok(false);
        }

        std::fs::remove_file(&self.plist_path)?;
        info!("LaunchAgent removed from: {}", self.plist_path.display());
        info!(
            "To unload the service, run: launchctl unload {}",
            self.plist_path.display()
        );
        Ok(true)
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_plist(exe_path: &Path, config_path: Option<&Path>) -> String {
    let mut arguments = vec![exe_path.to_string_lossy().into_owned()];
    if let Some(config_path) = config_path {
        arguments.push("--config".to_string());
        arguments.push(config_path.to_string_lossy().into_owned());
    }
    arguments.push("daemon".to_string());

    let arguments: String = arguments
        .iter()
        .map(|arg| format!("        <string>{}</string>\n", xml_escape(arg)))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{LAUNCH_AGENT_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
{arguments}    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <dict>
        <key>SuccessfulExit</key>
        <false/>
    </dict>
    <key>ProcessType</key>
    <string>Background</string>
    <key>StandardErrorPath</key>
    <string>/tmp/audio-cast-guard.err</string>
</dict>
</plist>
"#
    )
}
