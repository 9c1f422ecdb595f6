//! Preview helper for the sea background.
//!
//! `cargo run` bundles the crate with wasm-pack into `static/pkg` and serves
//! `static/` on `SEA_PORT` (default 8000). Pass `serve` to skip the bundle
//! step or `bundle` to only build it.

use std::env;
use std::io;
use std::process::{Command, ExitCode, Stdio};
use std::thread;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const SITE_DIR: &str = "static";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Bundle,
    Serve,
    Both,
}

fn main() -> ExitCode {
    let step = match env::args().nth(1).as_deref() {
        None => Step::Both,
        Some("bundle") => Step::Bundle,
        Some("serve") => Step::Serve,
        Some(other) => {
            eprintln!("unknown step `{other}`; expected `bundle` or `serve`");
            return ExitCode::FAILURE;
        }
    };

    if matches!(step, Step::Bundle | Step::Both) {
        match bundle() {
            Ok(true) => {}
            Ok(false) => {
                eprintln!("wasm-pack reported errors; see the output above");
                return ExitCode::FAILURE;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                eprintln!("wasm-pack is not installed; serving the existing {SITE_DIR}/pkg");
            }
            Err(err) => {
                eprintln!("could not run wasm-pack: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if matches!(step, Step::Serve | Step::Both) {
        if let Err(err) = serve(port()) {
            eprintln!("preview server failed: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn port() -> u16 {
    env::var("SEA_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Returns whether wasm-pack succeeded.
fn bundle() -> io::Result<bool> {
    println!("bundling sea_wasm into {SITE_DIR}/pkg");
    let out_dir = format!("{SITE_DIR}/pkg");
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", &out_dir])
        .status()?;
    Ok(status.success())
}

fn serve(port: u16) -> io::Result<()> {
    println!("sea preview on http://127.0.0.1:{port}/");
    let mut server = Command::new("python3")
        .args(["-m", "http.server", &port.to_string(), "--directory", SITE_DIR])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()?;

    loop {
        if let Some(status) = server.try_wait()? {
            println!("preview server stopped: {status}");
            return Ok(());
        }
        thread::sleep(Duration::from_millis(500));
    }
}
