use std::time::Duration;
use tport_logger::{LevelFilter, Logger};

#[test]
fn json_file_logging_writes_structured_lines() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");

    let logger = Logger::builder()
        .name("tport-file")
        .console(false)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .max_files(2)
        .json()
        .init()?;
    assert!(logger.writes_files());

    tracing::info!(tracking_id = "TRANSXYZ", status = "in-transit", "status changed");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = std::fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|ext| ext == "log"))
        .expect("a log file should exist");

    let contents = std::fs::read_to_string(log_file)?;
    let line = contents.lines().find(|l| l.contains("TRANSXYZ")).expect("event should be logged");
    let value: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(value["fields"]["status"], "in-transit");
    Ok(())
}
