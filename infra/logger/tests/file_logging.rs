use harbor_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn json_file_logging_writes_structured_lines() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("harbor-file-logging")
        .console(false)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .max_files(2)
        .json()
        .init()?;

    tracing::info!(extension = "sample", "Extension loaded");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let line = contents.lines().find(|l| l.contains("Extension loaded")).expect("event line");
    assert!(line.starts_with('{'), "file output should be JSON: {line}");
    assert!(line.contains("\"extension\":\"sample\""));

    Ok(())
}
