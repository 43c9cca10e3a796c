use std::{
    io::{
        self,
        Write
    },
    sync::Arc
};

use chrono::Local;
use parking_lot::{
    const_mutex,
    Mutex
};

use crate::LogData;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

// Wall-clock prefix of every console line, e.g. `14:03:27.519`.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Processes the events of the channels it is registered under.
///
/// Any `Fn(&str, &[LogData]) -> HandlerResult` is a handler; see
/// [`handler_fn`] for building one from a closure.
pub trait Handler: Send + Sync {
    fn handle(&self, name: &str, data: &[LogData]) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&str, &[LogData]) -> HandlerResult + Send + Sync
{
    fn handle(&self, name: &str, data: &[LogData]) -> HandlerResult {
        self(name, data)
    }
}

pub type HandlerRef = Arc<dyn Handler>;

// Pins a closure to the handler signature so its argument types are inferred.
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&str, &[LogData]) -> HandlerResult + Send + Sync
{ f }

// Shared by every synchronized console handler, whatever the channel.
static HANDLER_LOCK: Mutex<()> = const_mutex(());

/// Writes one event line: `HH:MM:SS.mmm <name>: <items>\n`.
///
/// The line is produced by several writes (prefix, one per item, newline),
/// so two unsynchronized calls sharing a stream may interleave.
pub fn write_event<W>(out: &mut W, name: &str, data: &[LogData]) -> io::Result<()>
where
    W: Write + ?Sized
{
    write!(out, "{} {}: ", Local::now().format(TIMESTAMP_FORMAT), name)?;
    for item in data {
        write!(out, "{}", item.rendered())?;
    }
    out.write_all(b"\n")
}

/// Console handler writing to whatever stream `make_writer` returns.
///
/// Unlike [`default_handler`], write failures are returned to the caller.
pub struct ConsoleHandler<M> {
    make_writer: M,
    synchronized: bool,
}

impl<M, W> ConsoleHandler<M>
where
    M: Fn() -> W,
    W: Write
{
    pub fn new(make_writer: M) -> Self {
        Self {
            make_writer,
            synchronized: false,
        }
    }

    /// Serializes whole lines through the process-wide handler lock.
    pub fn synchronized(mut self) -> Self {
        self.synchronized = true;
        self
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    pub fn write(&self, name: &str, data: &[LogData]) -> io::Result<()> {
        let _guard = self.synchronized.then(|| HANDLER_LOCK.lock());
        write_event(&mut (self.make_writer)(), name, data)
    }
}

impl<M, W> Handler for ConsoleHandler<M>
where
    M: Fn() -> W + Send + Sync,
    W: Write
{
    fn handle(&self, name: &str, data: &[LogData]) -> HandlerResult {
        Ok(self.write(name, data)?)
    }
}

/// Prints the event to stdout. Always succeeds.
///
/// Not safe for concurrent use: lines from simultaneous calls can be mixed
/// together. Use [`default_sync_handler`] for channels logged from several
/// threads.
pub fn default_handler(name: &str, data: &[LogData]) -> HandlerResult {
    write_default(&ConsoleHandler::new(io::stdout), name, data)
}

/// [`default_handler`] behind the process-wide handler lock.
pub fn default_sync_handler(name: &str, data: &[LogData]) -> HandlerResult {
    write_default(&ConsoleHandler::new(io::stdout).synchronized(), name, data)
}

// Shared body of the default handlers: write failures are dropped.
pub(crate) fn write_default<M, W>(
    console: &ConsoleHandler<M>,
    name: &str,
    data: &[LogData]
) -> HandlerResult
where
    M: Fn() -> W,
    W: Write
{
    let _ = console.write(name, data);
    Ok(())
}
