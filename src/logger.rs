use std::fmt;

/// The level at which a [Store](crate::Store) reports what happens
/// during a [dispatch()](crate::StoreRef::dispatch()), using the
/// [log] facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    Info,
    Warn,
}

impl LogLevel {
    pub fn log(&self, message: fmt::Arguments<'_>) {
        match self {
            LogLevel::Off => {}
            LogLevel::Trace => log::trace!("{}", message),
            LogLevel::Debug => log::debug!("{}", message),
            LogLevel::Info => log::info!("{}", message),
            LogLevel::Warn => log::warn!("{}", message),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}
