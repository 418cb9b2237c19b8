use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

pub fn level_for(verbosity: u8, debug: bool) -> LevelFilter {
    match verbosity {
        _ if debug && verbosity < 2 => LevelFilter::Debug,
        0 => LevelFilter::Error, // default: only errors
        1 => LevelFilter::Info,  // -v
        2 => LevelFilter::Debug, // -vv
        _ => LevelFilter::Trace, // -vvv
    }
}

/// Install the stderr logger. `RUST_LOG` still overrides per module.
pub fn init_logger(verbosity: u8, debug: bool) {
    let level = level_for(verbosity, debug);

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();

    builder.format(move |buf, record| {
        let level_label = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        if level >= LevelFilter::Debug {
            writeln!(
                buf,
                "{} {} {}",
                level_label,
                record.target().bright_black(),
                record.args()
            )
        } else {
            writeln!(buf, "{} {}", level_label, record.args())
        }
    });

    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0, false), LevelFilter::Error);
        assert_eq!(level_for(1, false), LevelFilter::Info);
        assert_eq!(level_for(2, false), LevelFilter::Debug);
        assert_eq!(level_for(7, false), LevelFilter::Trace);
    }

    #[test]
    fn debug_flag_raises_to_debug() {
        assert_eq!(level_for(0, true), LevelFilter::Debug);
        assert_eq!(level_for(1, true), LevelFilter::Debug);
        assert_eq!(level_for(3, true), LevelFilter::Trace);
    }
}
