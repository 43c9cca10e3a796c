
#[cfg(feature = "log-info")]
macro_rules! info {
    ($($arg:tt)+) => (::log::info!(target: "cl_chanlog", $($arg)+))
}

#[cfg(not(feature = "log-info"))]
macro_rules! info {
    ($($arg:tt)+) => {{
        if false {
            let _ = format_args!($($arg)+);
        }
    }};
}

#[cfg(feature = "log-debug")]
macro_rules! debug {
    ($($arg:tt)+) => (::log::debug!(target: "cl_chanlog", $($arg)+))
}

#[cfg(not(feature = "log-debug"))]
macro_rules! debug {
    ($($arg:tt)+) => {{
        if false {
            let _ = format_args!($($arg)+);
        }
    }};
}
