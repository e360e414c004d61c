use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::domain::opener::DocumentOpener;

/// OS標準のランチャー（xdg-open / open / start）で文書を開く。
pub struct SystemOpener;

impl SystemOpener {
    fn launcher() -> io::Result<Command> {
        Self::launcher_in(std::env::var_os("PATH"))
    }

    /// `search_path`（PATHと同じ形式）からランチャーを探す。
    fn launcher_in(search_path: Option<OsString>) -> io::Result<Command> {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            // startの第1引数はウィンドウタイトル
            cmd.args(["/C", "start", ""]);
            return Ok(cmd);
        }

        let candidates: &[&str] = if cfg!(target_os = "macos") {
            &["open"]
        } else {
            &["xdg-open", "gio"]
        };
        let cwd = std::env::current_dir()?;
        for exe in candidates {
            if let Ok(path) = which::which_in(exe, search_path.as_ref(), &cwd) {
                tracing::trace!(launcher = %path.display(), "Discovered document launcher");
                let mut cmd = Command::new(path);
                if *exe == "gio" {
                    cmd.arg("open");
                }
                return Ok(cmd);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no document launcher found in PATH",
        ))
    }
}

impl DocumentOpener for SystemOpener {
    fn open(&self, path: &Path) -> io::Result<()> {
        let mut cmd = Self::launcher()?;
        // stdoutはMCPプロトコルが使うため子プロセスには渡さない
        cmd.arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}
