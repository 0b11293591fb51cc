use tport_logger::{LevelFilter, Logger};

#[test]
fn console_logger_has_no_file_worker() {
    let logger = Logger::builder()
        .name("tport-console")
        .level(LevelFilter::INFO)
        .init()
        .expect("console logger should initialize");

    assert!(!logger.writes_files());
    tracing::info!(tracking_id = "TRANSABC123", "console output");
}
