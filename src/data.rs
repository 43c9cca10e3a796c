use std::{
    borrow::Cow,
    fmt,
    sync::Arc
};

/// A single item of a log event's payload.
///
/// `Str` is rendered verbatim by the console handlers and `Text` through its
/// `Display` implementation. Every other variant is only rendered as an
/// `<unknown log data type ...>` placeholder, although all of them can be
/// used as template arguments.
#[derive(Clone)]
pub enum LogData {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Text(Arc<dyn fmt::Display + Send + Sync>),
    Opaque(Arc<dyn fmt::Debug + Send + Sync>),
}

impl LogData {

    // Wraps a value that knows how to describe itself.
    pub fn text<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static
    { Self::Text(Arc::new(value)) }

    // Wraps a value with no textual representation of its own.
    pub fn opaque<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static
    { Self::Opaque(Arc::new(value)) }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float64",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Text(_) => "stringer",
            Self::Opaque(_) => "opaque",
        }
    }

    /// How the console handlers print this item.
    pub fn rendered(&self) -> Rendered<'_> {
        Rendered(self)
    }
}

/// The default (`%v`) representation.
impl fmt::Display for LogData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&crate::format::float_default(*v)),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Opaque(v) => write!(f, "{v:?}"),
        }
    }
}

impl fmt::Debug for LogData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Self::Text(v) => f.debug_tuple("Text").field(&v.to_string()).finish(),
            Self::Opaque(v) => f.debug_tuple("Opaque").field(v).finish(),
        }
    }
}

pub struct Rendered<'a>(&'a LogData);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            LogData::Str(s) => f.write_str(s),
            LogData::Text(v) => write!(f, "{v}"),
            other => write!(f, "<unknown log data type {other}>"),
        }
    }
}

impl From<&str> for LogData {
    fn from(value: &str) -> Self { Self::Str(value.to_owned()) }
}

impl From<String> for LogData {
    fn from(value: String) -> Self { Self::Str(value) }
}

impl From<&String> for LogData {
    fn from(value: &String) -> Self { Self::Str(value.clone()) }
}

impl From<Cow<'_, str>> for LogData {
    fn from(value: Cow<'_, str>) -> Self { Self::Str(value.into_owned()) }
}

macro_rules! from_int {
    ($variant:ident, $target:ty: $($source:ty),+) => {$(
        impl From<$source> for LogData {
            fn from(value: $source) -> Self { Self::$variant(value as $target) }
        }
    )+};
}

from_int!(Int, i64: i8, i16, i32, i64, isize);
from_int!(Uint, u64: u8, u16, u32, u64, usize);

impl From<f32> for LogData {
    fn from(value: f32) -> Self { Self::Float(value as f64) }
}

impl From<f64> for LogData {
    fn from(value: f64) -> Self { Self::Float(value) }
}

impl From<bool> for LogData {
    fn from(value: bool) -> Self { Self::Bool(value) }
}

impl From<char> for LogData {
    fn from(value: char) -> Self { Self::Char(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Temperature(i32);

    impl fmt::Display for Temperature {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}C", self.0)
        }
    }

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_strings_render_verbatim() {
        let data = LogData::from("plain <text>");
        assert_eq!(data.rendered().to_string(), "plain <text>");
    }

    #[test]
    fn test_text_renders_through_display() {
        let data = LogData::text(Temperature(21));
        assert_eq!(data.rendered().to_string(), "21C");
    }

    #[test]
    fn test_other_items_render_placeholder() {
        assert_eq!(
            LogData::opaque(Point { x: 1, y: 2 }).rendered().to_string(),
            "<unknown log data type Point { x: 1, y: 2 }>"
        );
        assert_eq!(
            LogData::from(5).rendered().to_string(),
            "<unknown log data type 5>"
        );
        assert_eq!(
            LogData::from(true).rendered().to_string(),
            "<unknown log data type true>"
        );
        assert_eq!(
            LogData::from(2.5f64).rendered().to_string(),
            "<unknown log data type 2.5>"
        );
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(LogData::from(-3i8), LogData::Int(-3)));
        assert!(matches!(LogData::from(7usize), LogData::Uint(7)));
        assert!(matches!(LogData::from('x'), LogData::Char('x')));
        assert_eq!(LogData::from(String::from("owned")).as_str(), Some("owned"));
        assert_eq!(LogData::from(1).as_str(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(LogData::from("s").kind(), "string");
        assert_eq!(LogData::from(1u8).kind(), "uint");
        assert_eq!(LogData::text(Temperature(0)).kind(), "stringer");
        assert_eq!(LogData::opaque(()).kind(), "opaque");
    }
}
