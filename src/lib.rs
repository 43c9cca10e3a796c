//! Named log channels.
//!
//! A channel is a name with one handler behind it. Register a handler under a
//! name, then log to that name; logging to a name nobody registered fails
//! with [`DispatchError::NotRegistered`] and prints nothing, which makes it
//! cheap to leave debug channels in code and switch them on by registering.
//!
//! ```no_run
//! use cl_chanlog::{log_to, logf_to};
//!
//! cl_chanlog::register_default("net");
//! log_to!("net", "connected to ", "10.0.0.7").unwrap();
//! logf_to!("net", "%d bytes in %.1fms", 512, 0.8).unwrap();
//!
//! // Never registered: nothing is printed.
//! assert!(log_to!("trace", "skipped").is_err());
//! ```

use once_cell::sync::OnceCell;

#[macro_use]
pub (crate) mod logging;

mod data;

pub mod dispatch;
pub mod format;
pub mod handler;
pub mod registry;

pub use data::LogData;
pub use data::Rendered;
pub use dispatch::Dispatch;
pub use dispatch::DispatchError;
pub use dispatch::DispatchResult;
pub use handler::ConsoleHandler;
pub use handler::Handler;
pub use handler::HandlerError;
pub use handler::HandlerRef;
pub use handler::HandlerResult;
pub use handler::default_handler;
pub use handler::default_sync_handler;
pub use handler::handler_fn;
pub use handler::write_event;
pub use registry::Lookup;
pub use registry::Registry;
pub use registry::SharedRegistry;

static REGISTRY: OnceCell<SharedRegistry> = OnceCell::new();

// The process-wide registry behind the free functions of this crate.
pub fn registry() -> &'static SharedRegistry {
    REGISTRY.get_or_init(SharedRegistry::new)
}

// Routes `name` to `handler`, replacing any previous handler.
pub fn register<H>(name: impl Into<String>, handler: H)
where
    H: Handler + 'static
{ registry().register(name, handler) }

// Routes `name` to the default console handler.
pub fn register_default(name: impl Into<String>) { registry().register_default(name) }

// Stops routing `name`. Does nothing if it was not registered.
pub fn deregister(name: &str) { registry().deregister(name) }

// Sends `data` to the handler registered for `name`.
pub fn log(name: &str, data: &[LogData]) -> DispatchResult<()> {
    registry().log(name, data)
}

// Like `log`, with `data[0]` as a printf-style template for `data[1..]`.
pub fn logf(name: &str, data: &[LogData]) -> DispatchResult<()> {
    registry().logf(name, data)
}

/// Logs each argument, converted with [`LogData::from`], to a channel of the
/// process-wide registry.
#[macro_export]
macro_rules! log_to {
    ($name:expr $(, $item:expr)* $(,)?) => {
        $crate::log($name, &[$($crate::LogData::from($item)),*])
    };
}

/// Formats the arguments into the template and logs the result to a channel
/// of the process-wide registry.
#[macro_export]
macro_rules! logf_to {
    ($name:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::logf($name, &[$crate::LogData::from($template) $(, $crate::LogData::from($arg))*])
    };
}

#[cfg(test)]
mod tests {
    use std::{fmt, sync::Arc, thread};

    use parking_lot::Mutex;

    use super::*;
    use crate::handler::tests::{strip_timestamp, Capture};

    #[derive(Debug)]
    struct EventTest {
        data: i32,
        desc: &'static str,
    }

    impl fmt::Display for EventTest {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} {}", self.desc, self.data)
        }
    }

    fn capture_channel(name: &str) -> Capture {
        let capture = Capture::default();
        let sink = capture.clone();
        register(name, ConsoleHandler::new(move || sink.clone()));
        capture
    }

    // Stdout is not captured; `handler::tests::test_default_line` checks the
    // line the default handler writes.
    #[test]
    fn test_default_logger() {
        register_default("defaultTest");
        assert!(log_to!("defaultTest", "This is a test of: ", "Hello World!").is_ok());
        deregister("defaultTest");
    }

    #[test]
    fn test_no_logger() {
        register_default("lib.present");
        let err = log_to!("NOT_THERE", "This is a test of: ", "Hello World!").unwrap_err();
        assert!(matches!(err, DispatchError::NotRegistered(_)));
        deregister("lib.present");
    }

    #[test]
    fn test_logged_line() {
        let capture = capture_channel("lib.line");
        log_to!("lib.line", "This is a test of: ", "Hello World!").unwrap();
        deregister("lib.line");

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(strip_timestamp(&lines[0]), "lib.line: This is a test of: Hello World!");
    }

    #[test]
    fn test_event_logger() {
        let capture = capture_channel("lib.EVENT");
        let event = EventTest { data: 42, desc: "The answer is" };
        log("lib.EVENT", &[LogData::text(event)]).unwrap();
        log("lib.EVENT", &[LogData::opaque(EventTest { data: 7, desc: "raw" })]).unwrap();
        deregister("lib.EVENT");

        let lines = capture.lines();
        assert_eq!(strip_timestamp(&lines[0]), "lib.EVENT: The answer is 42");
        assert_eq!(
            strip_timestamp(&lines[1]),
            "lib.EVENT: <unknown log data type EventTest { data: 7, desc: \"raw\" }>"
        );
    }

    #[test]
    fn test_register_replaces_handler() {
        let first = capture_channel("lib.replace");
        let second = capture_channel("lib.replace");
        log_to!("lib.replace", "only once").unwrap();
        deregister("lib.replace");

        assert!(first.lines().is_empty());
        assert_eq!(second.lines().len(), 1);
    }

    #[test]
    fn test_deregister_disables_channel() {
        let capture = capture_channel("lib.gone");
        deregister("lib.gone");

        let result = log_to!("lib.gone", "dropped");
        assert!(matches!(result, Err(DispatchError::NotRegistered(_))));
        assert!(capture.lines().is_empty());
    }

    #[test]
    fn test_logf() {
        let capture = capture_channel("lib.fmt");
        logf_to!("lib.fmt", "%d apples", 5).unwrap();
        let err = logf("lib.fmt", &[LogData::from(5)]).unwrap_err();
        deregister("lib.fmt");

        assert!(matches!(err, DispatchError::BadFormatArgument));
        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(strip_timestamp(&lines[0]), "lib.fmt: 5 apples");
    }

    // Line integrity under contention is checked in
    // `handler::tests::test_default_sync_lines_do_not_interleave`.
    #[test]
    fn test_default_sync_logger() {
        register("SYNC", default_sync_handler);
        thread::scope(|s| {
            for i in 0..42 {
                s.spawn(move || {
                    let message = format!("This is a synchronized test number {i}!");
                    log_to!("SYNC", message).unwrap();
                });
            }
        });
        deregister("SYNC");
    }

    #[test]
    fn test_handler_sees_channel_name() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&names);
        register("lib.named", handler_fn(move |name, _| {
            record.lock().push(name.to_owned());
            Ok(())
        }));
        log_to!("lib.named").unwrap();
        deregister("lib.named");

        assert_eq!(*names.lock(), vec![String::from("lib.named")]);
    }
}
