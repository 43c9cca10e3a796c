//! printf-style template rendering for `logf`.
//!
//! Supported verbs are `%v %s %q %d %b %o %x %X %c %U %t %f %F %e %E %g %G %T`
//! with the `- + # 0 space` flags, a width and a precision. Width and
//! precision are either literal or `*`, which takes them from the next
//! integer argument, and are limited to 1000000.
//!
//! Errors in the template are rendered inline: a missing argument renders as
//! `%!d(MISSING)`, a verb that does not apply to its argument as
//! `%!d(string=hi)`, an unusable width or precision as `%!(BADWIDTH)` or
//! `%!(BADPREC)`, a dangling `%` as `%!(NOVERB)` and unused arguments are
//! listed at the end as `%!(EXTRA int=1, string=x)`.

use std::{
    fmt::Write,
    iter::Peekable,
    str::Chars
};

use bitflags::bitflags;

use crate::LogData;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Flags: u8 {
        const MINUS = 1 << 0;
        const PLUS  = 1 << 1;
        const SHARP = 1 << 2;
        const SPACE = 1 << 3;
        const ZERO  = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Directive {
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
}

// Widths and precisions beyond this render as `%!(BADWIDTH)` / `%!(BADPREC)`.
const MAX_SIZE: u64 = 1_000_000;

enum Size {
    Absent,
    Given(i64),
    Bad,
}

enum Fill {
    Spaces,
    Zeros,
    ZerosAfterSign,
}

// Renders `template` against `args`.
pub fn sprintf(template: &str, args: &[LogData]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let directive = parse_directive(&mut chars, args, &mut next_arg, &mut out);
        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        let Some(arg) = args.get(next_arg) else {
            let _ = write!(out, "%!{verb}(MISSING)");
            continue;
        };
        next_arg += 1;

        let body = match verb {
            'T' => Some(String::from(arg.kind())),
            _ => format_arg(verb, &directive, arg),
        };
        match body {
            Some(body) => pad(&mut out, &body, &directive, fill_for(&directive, arg)),
            None => { let _ = write!(out, "%!{verb}({}={arg})", arg.kind()); }
        }
    }

    if next_arg < args.len() {
        out.push_str("%!(EXTRA ");
        for (i, arg) in args[next_arg..].iter().enumerate() {
            if i > 0 { out.push_str(", "); }
            let _ = write!(out, "{}={arg}", arg.kind());
        }
        out.push(')');
    }

    out
}

fn parse_directive(
    chars: &mut Peekable<Chars<'_>>,
    args: &[LogData],
    next_arg: &mut usize,
    out: &mut String
) -> Directive {
    let mut directive = Directive::default();

    while let Some(&c) = chars.peek() {
        let flag = match c {
            '-' => Flags::MINUS,
            '+' => Flags::PLUS,
            '#' => Flags::SHARP,
            ' ' => Flags::SPACE,
            '0' => Flags::ZERO,
            _ => break,
        };
        directive.flags |= flag;
        chars.next();
    }

    match parse_size(chars, args, next_arg) {
        Size::Absent => {}
        Size::Given(w) => {
            // A negative width taken from an argument pads on the right.
            if w < 0 { directive.flags |= Flags::MINUS; }
            directive.width = Some(w.unsigned_abs() as usize);
        }
        Size::Bad => out.push_str("%!(BADWIDTH)"),
    }

    if chars.peek() == Some(&'.') {
        chars.next();
        match parse_size(chars, args, next_arg) {
            Size::Absent => directive.precision = Some(0),
            Size::Given(p) if p >= 0 => directive.precision = Some(p as usize),
            _ => out.push_str("%!(BADPREC)"),
        }
    }

    directive
}

// Reads a literal number or, for `*`, takes the next argument.
fn parse_size(
    chars: &mut Peekable<Chars<'_>>,
    args: &[LogData],
    next_arg: &mut usize
) -> Size {
    if chars.peek() == Some(&'*') {
        chars.next();
        let Some(arg) = args.get(*next_arg) else {
            return Size::Bad;
        };
        *next_arg += 1;

        let value = match arg {
            LogData::Int(v) => Some(*v),
            LogData::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        };
        return match value {
            Some(v) if v.unsigned_abs() <= MAX_SIZE => Size::Given(v),
            _ => Size::Bad,
        };
    }

    let mut value: Option<u64> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        let next = value.unwrap_or(0).saturating_mul(10).saturating_add(digit as u64);
        value = Some(next.min(MAX_SIZE + 1));
    }

    match value {
        None => Size::Absent,
        Some(v) if v > MAX_SIZE => Size::Bad,
        Some(v) => Size::Given(v as i64),
    }
}

fn fill_for(directive: &Directive, arg: &LogData) -> Fill {
    if !directive.flags.contains(Flags::ZERO) || directive.flags.contains(Flags::MINUS) {
        return Fill::Spaces;
    }
    match arg {
        LogData::Int(_) | LogData::Uint(_) | LogData::Char(_)
            if directive.precision.is_some() => Fill::Spaces,
        LogData::Int(_) | LogData::Uint(_) | LogData::Char(_) => Fill::ZerosAfterSign,
        LogData::Float(v) if v.is_finite() => Fill::ZerosAfterSign,
        LogData::Float(_) => Fill::Spaces,
        _ => Fill::Zeros,
    }
}

// None means the verb does not apply to the argument.
fn format_arg(verb: char, directive: &Directive, arg: &LogData) -> Option<String> {
    match arg {
        LogData::Int(v) => format_integer(verb, directive, *v < 0, v.unsigned_abs()),
        LogData::Uint(v) => format_integer(verb, directive, false, *v),
        LogData::Float(v) => format_float(verb, directive, *v),
        LogData::Bool(v) => match verb {
            't' | 'v' => Some(v.to_string()),
            _ => None,
        },
        LogData::Char(c) => match verb {
            'c' | 'v' => Some(c.to_string()),
            'q' => Some(format!("{c:?}")),
            'U' => Some(format!("U+{:04X}", *c as u32)),
            _ => format_integer(verb, directive, false, *c as u64),
        },
        LogData::Str(s) => format_text(verb, directive, s),
        LogData::Text(v) => format_text(verb, directive, &v.to_string()),
        LogData::Opaque(v) => match verb {
            'v' | 's' if directive.flags.contains(Flags::SHARP) => Some(format!("{v:#?}")),
            'v' | 's' => Some(format!("{v:?}")),
            _ => None,
        },
    }
}

fn format_text(verb: char, directive: &Directive, s: &str) -> Option<String> {
    let s = match directive.precision {
        Some(p) => s.chars().take(p).collect::<String>(),
        None => s.to_owned(),
    };

    match verb {
        'v' | 's' => Some(s),
        'q' => Some(format!("{s:?}")),
        'x' => Some(hex_bytes(&s, false)),
        'X' => Some(hex_bytes(&s, true)),
        _ => None,
    }
}

fn hex_bytes(s: &str, upper: bool) -> String {
    s.bytes().fold(String::with_capacity(s.len() * 2), |mut out, b| {
        let _ = if upper { write!(out, "{b:02X}") } else { write!(out, "{b:02x}") };
        out
    })
}

fn format_integer(
    verb: char,
    directive: &Directive,
    negative: bool,
    magnitude: u64
) -> Option<String> {
    let (digits, prefix) = match verb {
        'd' | 'v' => (magnitude.to_string(), ""),
        'b' => (format!("{magnitude:b}"), "0b"),
        'o' => (format!("{magnitude:o}"), "0"),
        'x' => (format!("{magnitude:x}"), "0x"),
        'X' => (format!("{magnitude:X}"), "0X"),
        'c' => return char::from_u32(u32::try_from(magnitude).ok()?)
            .filter(|_| !negative)
            .map(String::from),
        'U' if !negative => return Some(format!("U+{magnitude:04X}")),
        _ => return None,
    };

    let mut body = String::new();
    push_sign(&mut body, directive.flags, negative);
    if directive.flags.contains(Flags::SHARP) {
        body.push_str(prefix);
    }
    if let Some(p) = directive.precision {
        for _ in digits.len()..p { body.push('0'); }
    }
    body.push_str(&digits);
    Some(body)
}

fn format_float(verb: char, directive: &Directive, v: f64) -> Option<String> {
    if !matches!(verb, 'v' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G') {
        return None;
    }

    if v.is_nan() {
        return Some(String::from("NaN"));
    }

    let mut body = String::new();
    push_sign(&mut body, directive.flags, v.is_sign_negative());
    let v = v.abs();

    if v.is_infinite() {
        if body.is_empty() { body.push('+'); }
        body.push_str("Inf");
        return Some(body);
    }

    match (verb, directive.precision) {
        ('f' | 'F', p) => { let _ = write!(body, "{:.*}", p.unwrap_or(6), v); }
        ('e', p) => body.push_str(&exponent_form(v, p.unwrap_or(6), 'e')),
        ('E', p) => body.push_str(&exponent_form(v, p.unwrap_or(6), 'E')),
        ('G', Some(p)) => body.push_str(&general_form(v, p.max(1), 'E')),
        ('G', None) => body.push_str(&shortest_form(v, 'E')),
        (_, Some(p)) => body.push_str(&general_form(v, p.max(1), 'e')),
        (_, None) => body.push_str(&shortest_form(v, 'e')),
    }
    Some(body)
}

fn push_sign(body: &mut String, flags: Flags, negative: bool) {
    if negative {
        body.push('-');
    } else if flags.contains(Flags::PLUS) {
        body.push('+');
    } else if flags.contains(Flags::SPACE) {
        body.push(' ');
    }
}

// Exponents always carry a sign and at least two digits: `e+05`.
fn exponent_form(v: f64, precision: usize, marker: char) -> String {
    fix_exponent(&format!("{v:.precision$e}"), marker)
}

fn fix_exponent(raw: &str, marker: char) -> String {
    let Some((mantissa, exp)) = raw.split_once('e') else {
        return raw.to_owned();
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{mantissa}{marker}{sign}{digits:0>2}")
}

fn decimal_exponent(v: f64) -> i32 {
    format!("{v:e}")
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0)
}

// `%g` with an explicit number of significant digits.
fn general_form(v: f64, significant: usize, marker: char) -> String {
    let rounded = format!("{:.*e}", significant - 1, v);
    let exp = rounded
        .split_once('e')
        .and_then(|(_, e)| e.parse::<i32>().ok())
        .unwrap_or(0);

    if exp < -4 || exp >= significant as i32 {
        let (mantissa, _) = rounded.split_once('e').unwrap_or((rounded.as_str(), ""));
        let mantissa = trim_fraction(mantissa);
        fix_exponent(&format!("{mantissa}e{exp}"), marker)
    } else {
        let decimals = (significant as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}")).to_owned()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

// Shortest round-trip digits, in exponent form when the decimal exponent is
// below -4 or at least 6. `v` must be finite and non-negative.
fn shortest_form(v: f64, marker: char) -> String {
    if v == 0.0 {
        return String::from("0");
    }

    let exp = decimal_exponent(v);
    if exp < -4 || exp >= 6 {
        fix_exponent(&format!("{v:e}"), marker)
    } else {
        v.to_string()
    }
}

/// The `%v` representation of a float, e.g. `2.5`, `1e+06`, `+Inf`.
pub fn float_default(v: f64) -> String {
    if v.is_nan() {
        return String::from("NaN");
    }
    if v.is_infinite() {
        return String::from(if v > 0.0 { "+Inf" } else { "-Inf" });
    }

    let sign = if v.is_sign_negative() { "-" } else { "" };
    format!("{sign}{}", shortest_form(v.abs(), 'e'))
}

fn pad(out: &mut String, body: &str, directive: &Directive, fill: Fill) {
    let len = body.chars().count();
    let Some(width) = directive.width.filter(|w| *w > len) else {
        out.push_str(body);
        return;
    };
    let count = width - len;

    if directive.flags.contains(Flags::MINUS) {
        out.push_str(body);
        out.extend(std::iter::repeat_n(' ', count));
        return;
    }

    match fill {
        Fill::ZerosAfterSign if is_numeric(body) => {
            let split = sign_prefix_len(body);
            out.push_str(&body[..split]);
            out.extend(std::iter::repeat_n('0', count));
            out.push_str(&body[split..]);
        }
        Fill::Zeros | Fill::ZerosAfterSign => {
            out.extend(std::iter::repeat_n('0', count));
            out.push_str(body);
        }
        Fill::Spaces => {
            out.extend(std::iter::repeat_n(' ', count));
            out.push_str(body);
        }
    }
}

fn is_numeric(body: &str) -> bool {
    body.trim_start_matches(['+', '-', ' '])
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

fn sign_prefix_len(body: &str) -> usize {
    let mut len = 0;
    if body.starts_with(['+', '-', ' ']) {
        len += 1;
    }
    let rest = &body[len..];
    if rest.starts_with("0x") || rest.starts_with("0X") || rest.starts_with("0b") {
        len += 2;
    }
    len
}
