use thiserror::Error;

use crate::{
    format::sprintf,
    handler::{
        Handler,
        HandlerError
    },
    registry::Lookup,
    LogData
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No log handler found for {0}")]
    NotRegistered(String),

    #[error("A format string was not passed as the first data item")]
    BadFormatArgument,

    #[error(transparent)]
    Handler(HandlerError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Sending events to registered channels.
///
/// Implemented for every [`Lookup`], so every registry can dispatch.
pub trait Dispatch: Lookup {

    /// Hands `data` to the handler registered for `name`.
    ///
    /// Whatever the handler returns is passed back unchanged; an error it
    /// produces comes back as [`DispatchError::Handler`].
    fn log(&self, name: &str, data: &[LogData]) -> DispatchResult<()> {
        let handler = self.lookup(name)
            .ok_or_else(|| DispatchError::NotRegistered(name.to_owned()))?;

        debug!("Dispatching {} item(s) to log channel {}", data.len(), name);
        handler.handle(name, data).map_err(DispatchError::Handler)
    }

    /// Renders `data[1..]` into the template `data[0]` and logs the result
    /// as a single string item.
    fn logf(&self, name: &str, data: &[LogData]) -> DispatchResult<()> {
        let handler = self.lookup(name)
            .ok_or_else(|| DispatchError::NotRegistered(name.to_owned()))?;

        let Some((LogData::Str(template), args)) = data.split_first() else {
            return Err(DispatchError::BadFormatArgument);
        };

        let rendered = [LogData::Str(sprintf(template, args))];
        debug!("Dispatching formatted message to log channel {}", name);
        handler.handle(name, &rendered).map_err(DispatchError::Handler)
    }
}

impl<T: Lookup + ?Sized> Dispatch for T {}
