use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Hand the saved image to the desktop's default viewer without waiting for it.
/// Failure only logs: the file is already on disk.
pub fn show_image(path: &Path) {
    match spawn_viewer(path) {
        Ok(()) => debug!(path = %path.display(), "viewer launched"),
        Err(err) => warn!(path = %path.display(), %err, "could not open image viewer"),
    }
}

fn spawn_viewer(path: &Path) -> io::Result<()> {
    let mut cmd = viewer_command(path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}
