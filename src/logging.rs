use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

const LOG_FILE_NAME: &str = "pipeline.log";
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} | {({l}):5.5} | {m}{n}";
const CONSOLE_LOG_PATTERN: &str = "{d(%H:%M:%S)} | {h({l}):5.5} | {m}{n}";
const LOG_FILE_SIZE_LIMIT_MB: u64 = 10;
const LOG_FILE_BACKUP_COUNT: u32 = 5;

/// Initializes a rolling-file + console logger. Call once at process start, before running the
/// pipeline.
pub fn setup_logging(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
        eprintln!("[logging] created log directory: {}", log_dir.display());
    }

    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let size_trigger = SizeTrigger::new(LOG_FILE_SIZE_LIMIT_MB * 1024 * 1024);
    let roller_pattern = log_dir.join(format!("{}.{{}}", LOG_FILE_NAME));
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(roller_pattern.to_str().unwrap(), LOG_FILE_BACKUP_COUNT)?;
    let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

    let file_appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_file_path, Box::new(compound_policy))?;

    let console_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .target(Target::Stdout)
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build("stdout", Box::new(console_appender)))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(LevelFilter::Debug),
        )?;

    log4rs::init_config(config)?;
    log::info!("logging initialized, log directory: {}", log_dir.display());
    Ok(())
}
