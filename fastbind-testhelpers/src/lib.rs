#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use color_eyre::eyre;
pub use fastbind_testhelpers_macros::test;
pub use log::{Level, LevelFilter};

use log::{Log, Metadata, Record};
use owo_colors::{OwoColorize, Style};
use std::cell::RefCell;
use std::io::Write;
use std::sync::Once;

/// A log record kept by the test logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLog {
    /// Level of the record
    pub level: Level,
    /// Module that logged it
    pub target: String,
    /// The formatted message
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Vec<CapturedLog>> = const { RefCell::new(Vec::new()) };
}

/// Takes the records logged on this thread since the last call
pub fn take_logs() -> Vec<CapturedLog> {
    CAPTURED.with(|captured| std::mem::take(&mut *captured.borrow_mut()))
}

/// Takes the records logged on this thread, keeping those at `level`
pub fn take_logs_at(level: Level) -> Vec<CapturedLog> {
    take_logs()
        .into_iter()
        .filter(|log| log.level == level)
        .collect()
}

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        let level_style = match record.level() {
            Level::Error => Style::new().fg_rgb::<243, 139, 168>(), // Catppuccin red (Maroon)
            Level::Warn => Style::new().fg_rgb::<249, 226, 175>(),  // Catppuccin yellow (Peach)
            Level::Info => Style::new().fg_rgb::<166, 227, 161>(),  // Catppuccin green (Green)
            Level::Debug => Style::new().fg_rgb::<137, 180, 250>(), // Catppuccin blue (Blue)
            Level::Trace => Style::new().fg_rgb::<148, 226, 213>(), // Catppuccin teal (Teal)
        };

        eprintln!(
            "{} - {}: {}",
            record.level().style(level_style),
            record
                .target()
                .style(Style::new().fg_rgb::<137, 180, 250>()),
            record.args()
        );

        CAPTURED.with(|captured| {
            captured.borrow_mut().push(CapturedLog {
                level: record.level(),
                target: record.target().to_owned(),
                message: record.args().to_string(),
            })
        });
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Installs color-backtrace (except on miri) and the test logger, at the
/// `trace` level.
///
/// Every test calls this; only the first call in a process installs anything.
pub fn setup() {
    setup_with_level(LevelFilter::Trace);
}

/// Like [`setup`], with a cap on the log level.
///
/// The level is global to the test process: the last caller wins.
pub fn setup_with_level(level: LevelFilter) {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        #[cfg(not(miri))]
        install_hooks();

        if log::set_boxed_logger(Box::new(SimpleLogger)).is_err() {
            eprintln!("a logger was already installed, fastbind test logs will not be captured");
        }
    });
    log::set_max_level(level);
}

#[cfg(not(miri))]
fn install_hooks() {
    use color_eyre::config::HookBuilder;
    use regex::Regex;
    use std::sync::LazyLock;

    /// Filters panic plumbing, test runner and threading frames out of backtraces.
    static IGNORE_FRAMES: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(concat!(
            r"^(std::panic|core::panic|test::run_test|__pthread_cond_wait",
            r"|std::sys::(pal|backtrace)|std::thread::Builder|core::ops::function",
            r"|test::__rust_begin_short_backtrace|<core::panic::",
            r"|<alloc::boxed::Box<F,A> as core::ops::function::FnOnce<Args>>::call_once)",
        ))
            .expect("frame filter regex is valid")
    });

    let eyre_filter = move |frames: &mut Vec<&color_eyre::config::Frame>| {
        frames.retain(|frame| {
            frame
                .name
                .as_ref()
                .is_none_or(|name| !IGNORE_FRAMES.is_match(&name.to_string()))
        });
    };
    if let Err(error) = HookBuilder::default()
        .add_frame_filter(Box::new(eyre_filter))
        .install()
    {
        eprintln!("color-eyre was not installed: {error}");
    }

    {
        use color_backtrace::{BacktracePrinter, Frame};

        let filter = move |frames: &mut Vec<&Frame>| {
            frames.retain(|frame| {
                frame
                    .name
                    .as_ref()
                    .is_none_or(|name| !IGNORE_FRAMES.is_match(name))
            });
        };

        let stderr = color_backtrace::termcolor::StandardStream::stderr(
            color_backtrace::termcolor::ColorChoice::Auto,
        );
        let printer = BacktracePrinter::new().add_frame_filter(Box::new(filter));
        printer.install(Box::new(stderr));
    }
}
