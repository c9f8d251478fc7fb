use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// A formatted log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// A `log` backend that forwards records over a channel instead of printing them.
pub struct ChannelLogger {
    level: LevelFilter,
    sender: Sender<LogMessage>,
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A dropped receiver just means nobody is listening any more.
            let _ = self.sender.try_send(LogMessage {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

impl ChannelLogger {
    pub fn new(level: LevelFilter, sender: Sender<LogMessage>) -> Self {
        Self { level, sender }
    }

    pub fn with_receiver(level: LevelFilter) -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::new(level, sender), receiver)
    }
}

/// Install a [`ChannelLogger`] as the global logger and return the receiving end.
pub fn init(level: LevelFilter) -> Result<Receiver<LogMessage>, SetLoggerError> {
    let (logger, receiver) = ChannelLogger::with_receiver(level);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use log::Log;

    use super::*;

    #[test]
    fn forwards_enabled_records() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Info);

        // When
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("cadence")
                .args(format_args!("loop started"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("too chatty"))
                .build(),
        );

        // Then
        let messages: Vec<_> = receiver.try_iter().collect();
        assert_eq!(
            messages,
            vec![LogMessage {
                level: Level::Info,
                target: "cadence".to_string(),
                message: "loop started".to_string(),
            }]
        );
    }

    #[test]
    fn dropped_receiver_is_harmless() {
        // Given
        let (logger, receiver) = ChannelLogger::with_receiver(LevelFilter::Trace);
        drop(receiver);

        // Then
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("nobody listening"))
                .build(),
        );
    }
}
