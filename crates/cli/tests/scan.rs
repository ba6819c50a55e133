#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn dirsentry(base: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dirsentry"));
    command
        .arg("-o")
        .arg(base.join("out"))
        .arg("-s")
        .arg(base.join("isolation"))
        .env("DIRSENTRY_LOG", "info")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

fn locked(path: &Path) -> io::Result<()> {
    fs::write(path, b"payload")?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o000))
}

#[test]
fn missing_directory_fails_run_but_others_are_scanned() -> io::Result<()> {
    let dir = tempdir()?;
    let base = dir.path();
    let data = base.join("data");
    fs::create_dir(&data)?;
    fs::write(data.join("a"), b"hello")?;
    locked(&data.join("b"))?;

    let output = dirsentry(base)
        .arg("--analyzer")
        .arg("false")
        .arg(base.join("missing"))
        .arg(&data)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(data.join("a").exists());
    assert!(!data.join("b").exists());
    assert!(base.join("isolation/b").exists());

    let artifacts: Vec<_> = fs::read_dir(base.join("out"))?.collect::<Result<_, _>>()?;
    assert_eq!(artifacts.len(), 1);
    let name = artifacts[0].file_name();
    assert!(name.to_string_lossy().starts_with("data_Snapshot_"));

    let combined = combined(&output);
    assert!(combined.contains("directory summary"));
    Ok(())
}

#[test]
fn repeated_run_succeeds_and_keeps_one_snapshot() -> io::Result<()> {
    let dir = tempdir()?;
    let base = dir.path();
    let data = base.join("data");
    fs::create_dir(&data)?;
    fs::write(data.join("a"), b"hello")?;

    for _ in 0..2 {
        let output = dirsentry(base).arg("--analyzer").arg("true").arg(&data).output()?;
        assert!(output.status.success(), "{}", combined(&output));
    }

    assert_eq!(fs::read_dir(base.join("out"))?.count(), 1);
    Ok(())
}

#[test]
fn no_directories_is_an_error() -> io::Result<()> {
    let dir = tempdir()?;
    let config = dir.path().join("config.toml");
    fs::write(&config, "[scan]\nmonitored = []\n")?;

    let output = dirsentry(dir.path()).arg("-c").arg(&config).output()?;

    assert!(!output.status.success());
    Ok(())
}

#[cfg(unix)]
#[test]
fn sigint_stops_a_hanging_analysis() -> io::Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let dir = tempdir()?;
    let base = dir.path();
    let data = base.join("data");
    fs::create_dir(&data)?;
    locked(&data.join("stuck"))?;
    let config = base.join("config.toml");
    fs::write(
        &config,
        "[analysis]\nprogram = \"sh\"\nargs = [\"-c\", \"sleep 30\", \"sh\"]\ntimeout = 600\n",
    )?;

    let child = dirsentry(base).arg("-c").arg(&config).arg(&data).spawn()?;
    sleep(Duration::from_millis(500));
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).ok();
    let output = wait_for_output(child)?;

    assert_eq!(output.status.code(), Some(1));
    let mode = fs::metadata(data.join("stuck"))?.permissions().mode() & 0o777;
    assert_eq!(mode, 0);
    assert!(combined(&output).contains("SIGINT received"));
    Ok(())
}

fn combined(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn wait_for_output(mut child: Child) -> io::Result<Output> {
    let start = Instant::now();
    loop {
        if child.try_wait()?.is_some() {
            break;
        }
        if start.elapsed() > Duration::from_secs(10) {
            let _ = child.kill();
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "dirsentry process did not exit",
            ));
        }
        sleep(Duration::from_millis(50));
    }
    child.wait_with_output()
}
