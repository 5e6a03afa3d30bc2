use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::errors::ConfigError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Starts the log4rs backend for the log facade
///
/// # Arguments
///
/// * 'log_path' - file to append log lines to
/// * 'log_to_stdout' - whether to also echo log lines to stdout
pub fn setup_logger(log_path: &str, log_to_stdout: bool) -> Result<(), ConfigError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_path)?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = builder.build(root.build(LevelFilter::Info))?;
    log4rs::init_config(config)?;

    Ok(())
}
