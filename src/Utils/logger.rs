use simplelog::*;

/// Map a log level string to a filter. "off" and "none" disable logging; unknown strings give `None`.
pub fn level_filter(loglevel: &str) -> Option<LevelFilter> {
    match loglevel {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" | "none" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Install a terminal logger for the fits. `None` means "info".
/// Returns `false` if logging is disabled or a logger is already installed, in which case
/// messages keep going to the existing one.
pub fn init_logger(loglevel: Option<&str>) -> bool {
    let log_option = match loglevel {
        Some(level) => level_filter(level).unwrap_or(LevelFilter::Info),
        None => LevelFilter::Info,
    };
    if log_option == LevelFilter::Off {
        return false;
    }
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    logger_instance.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strings() {
        assert_eq!(level_filter("debug"), Some(LevelFilter::Debug));
        assert_eq!(level_filter("warn"), Some(LevelFilter::Warn));
        assert_eq!(level_filter("none"), Some(LevelFilter::Off));
        assert_eq!(level_filter("loud"), None);
    }

    #[test]
    fn disabled_logger_is_not_installed() {
        assert!(!init_logger(Some("off")));
        // a second installation never panics
        let _ = init_logger(Some("error"));
        assert!(!init_logger(Some("error")));
    }
}
