//! Integration tests for the daemon entry point

use logsweep_daemon::{run, Cli};
use std::fs::{self, File, FileTimes};
use std::time::{Duration, SystemTime};

fn cli_for(config: std::path::PathBuf) -> Cli {
    Cli {
        config,
        once: true,
        log_level: "info".to_string(),
        args: Vec::new(),
    }
}

#[tokio::test]
async fn test_once_runs_a_single_pass() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("logs");
    fs::create_dir_all(&root).unwrap();

    let stale = root.join("u_ex230101.log");
    fs::write(&stale, b"old").unwrap();
    let when = SystemTime::now() - Duration::from_secs(40 * 86400);
    File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_times(FileTimes::new().set_modified(when).set_accessed(when))
        .unwrap();

    let fresh = root.join("u_ex991231.log");
    fs::write(&fresh, b"new").unwrap();

    let config = dir.path().join("logsweep.toml");
    fs::write(
        &config,
        format!(
            "RootLogSearchDirectory = {:?}\nDaysToKeep = 30\nLowDiskThresholdMB = 0\n",
            root.display().to_string()
        ),
    )
    .unwrap();

    run(cli_for(config)).await.unwrap();

    assert!(!stale.exists());
    assert!(fresh.exists());
}

#[tokio::test]
async fn test_once_with_missing_root_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("logsweep.toml");
    fs::write(
        &config,
        format!(
            "RootLogSearchDirectory = {:?}\n",
            dir.path().join("nowhere").display().to_string()
        ),
    )
    .unwrap();

    assert!(run(cli_for(config)).await.is_ok());
}
