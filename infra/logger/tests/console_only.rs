use harbor_logger::{LevelFilter, Logger};

#[test]
fn console_only_logger_writes_no_files() {
    let logger = Logger::builder()
        .name("harbor-console-only")
        .console(true)
        .level(LevelFilter::DEBUG)
        .init()
        .expect("logger should initialize");

    assert!(!logger.writes_files());
    tracing::debug!(command = "/xlhelp", "console output goes to stderr");
}
