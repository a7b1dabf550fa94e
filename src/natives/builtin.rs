#![forbid(unsafe_code)]

//! Built-in native predicates
//!
//! Format checks (`hex`, `base64`, the date/time family), string case checks,
//! the numeric-coercion check `tonumber`, regular-expression matching, and the
//! relational operators used by comparison refinements.

use crate::natives::{NativePredicate, NativeRegistry};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

/// Registers the whole built-in catalog into `registry`
pub fn install(registry: &mut NativeRegistry) {
    registry.register("hex", Hex);
    registry.register("lowercase", CaseCheck { upper: false });
    registry.register("uppercase", CaseCheck { upper: true });
    registry.register("base64", Base64 { url: false });
    registry.register("base64url", Base64 { url: true });
    registry.register("datetime", DateTime::new("YYYY-MM-DDThh:mm:ssZ"));
    registry.register("date", DateTime::new("YYYY-MM-DD"));
    registry.register("time", DateTime::new("hh:mm:ss"));
    registry.register("timez", DateTime::new("hh:mm:ssZ"));
    registry.register("tonumber", ToNumber);
    registry.register("match", RegexMatch);
    registry.register(">", Relation(CompareKind::Gt));
    registry.register("<", Relation(CompareKind::Lt));
    registry.register(">=", Relation(CompareKind::Ge));
    registry.register("<=", Relation(CompareKind::Le));
}

fn subject_str(subject: Option<&Value>) -> Option<&str> {
    subject.and_then(Value::as_str)
}

/// Non-empty string of ASCII hex digits
struct Hex;

impl NativePredicate for Hex {
    fn accept(&self, subject: Option<&Value>, _args: &[Value]) -> bool {
        subject_str(subject)
            .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

/// `lowercase` / `uppercase`: the string contains no letter of the other case
struct CaseCheck {
    upper: bool,
}

impl NativePredicate for CaseCheck {
    fn accept(&self, subject: Option<&Value>, _args: &[Value]) -> bool {
        subject_str(subject).is_some_and(|s| {
            if self.upper {
                !s.chars().any(|c| c.is_lowercase())
            } else {
                !s.chars().any(|c| c.is_uppercase())
            }
        })
    }
}

/// Base64 text, standard or URL-safe alphabet
///
/// Standard form requires the padded length to be a multiple of four; the
/// URL-safe form also allows the unpadded encoding, which can never leave a
/// remainder of one.
struct Base64 {
    url: bool,
}

impl Base64 {
    fn in_alphabet(&self, c: char) -> bool {
        c.is_ascii_alphanumeric()
            || if self.url {
                c == '-' || c == '_'
            } else {
                c == '+' || c == '/'
            }
    }
}

impl NativePredicate for Base64 {
    fn accept(&self, subject: Option<&Value>, _args: &[Value]) -> bool {
        let Some(s) = subject_str(subject) else {
            return false;
        };
        let pad = s.chars().rev().take_while(|&c| c == '=').count();
        if pad > 2 {
            return false;
        }
        let body = &s[..s.len() - pad];
        if !body.chars().all(|c| self.in_alphabet(c)) {
            return false;
        }
        if pad > 0 {
            s.len() % 4 == 0
        } else {
            // Unpadded is only valid for the URL-safe form.
            s.len() % 4 == 0 || (self.url && s.len() % 4 != 1)
        }
    }
}

/// Date/time text in a picture format
///
/// Field letters consume exactly as many digits as they repeat (`YYYY` four,
/// `M` one); every other format character must match literally and the whole
/// subject must be consumed. Parsed fields are range-checked: months 1..=12,
/// days against the real calendar (leap years included), hours below 24,
/// minutes and seconds below 60. The first predicate argument overrides the
/// default format.
struct DateTime {
    default_format: &'static str,
}

impl DateTime {
    fn new(default_format: &'static str) -> Self {
        DateTime { default_format }
    }

    fn check(&self, text: &str, format: &str) -> bool {
        let mut year: Option<u32> = None;
        let mut month: Option<u32> = None;
        let mut day: Option<u32> = None;
        let mut hour: Option<u32> = None;
        let mut minute: Option<u32> = None;
        let mut second: Option<u32> = None;

        let mut input = text.chars().peekable();
        let mut picture = format.chars().peekable();
        while let Some(&letter) = picture.peek() {
            if matches!(letter, 'Y' | 'M' | 'D' | 'h' | 'm' | 's') {
                let mut width = 0;
                while picture.peek() == Some(&letter) {
                    picture.next();
                    width += 1;
                }
                let mut field = 0u32;
                for _ in 0..width {
                    match input.next().and_then(|c| c.to_digit(10)) {
                        Some(d) => field = field * 10 + d,
                        None => return false,
                    }
                }
                let slot = match letter {
                    'Y' => &mut year,
                    'M' => &mut month,
                    'D' => &mut day,
                    'h' => &mut hour,
                    'm' => &mut minute,
                    's' => &mut second,
                    _ => unreachable!(),
                };
                *slot = Some(field);
            } else {
                picture.next();
                if input.next() != Some(letter) {
                    return false;
                }
            }
        }
        if input.next().is_some() {
            return false;
        }

        if let Some(mo) = month {
            if !(1..=12).contains(&mo) {
                return false;
            }
            if let Some(d) = day {
                // Absent year defaults to a leap year, permitting Feb 29.
                let y = year.unwrap_or(2000) as i32;
                if NaiveDate::from_ymd_opt(y, mo, d).is_none() {
                    return false;
                }
            }
        } else if let Some(d) = day {
            if !(1..=31).contains(&d) {
                return false;
            }
        }
        hour.is_none_or(|h| h < 24) && minute.is_none_or(|m| m < 60) && second.is_none_or(|s| s < 60)
    }
}

impl NativePredicate for DateTime {
    fn accept(&self, subject: Option<&Value>, args: &[Value]) -> bool {
        let Some(text) = subject_str(subject) else {
            return false;
        };
        let format = args
            .first()
            .and_then(Value::as_str)
            .unwrap_or(self.default_format);
        self.check(text, format)
    }
}

/// The string parses as a number; optional comparison refinements apply to the
/// parsed value
///
/// Each argument is an array of alternating operator/bound pairs, e.g.
/// `[">", 100, "<", 200]`. All pairs must hold.
struct ToNumber;

impl NativePredicate for ToNumber {
    fn accept(&self, subject: Option<&Value>, args: &[Value]) -> bool {
        let Some(parsed) = subject_str(subject).and_then(|s| s.parse::<f64>().ok()) else {
            return false;
        };
        let parsed = Value::from(parsed);
        for arg in args {
            let Some(pairs) = arg.as_array() else {
                return false;
            };
            for pair in pairs.chunks(2) {
                let (Some(op), Some(bound)) = (pair.first().and_then(Value::as_str), pair.get(1))
                else {
                    return false;
                };
                let Some(kind) = CompareKind::from_symbol(op) else {
                    return false;
                };
                if !kind.holds(&parsed, bound) {
                    return false;
                }
            }
        }
        true
    }
}

/// Whole-string regular-expression match against the first argument
struct RegexMatch;

impl NativePredicate for RegexMatch {
    fn accept(&self, subject: Option<&Value>, args: &[Value]) -> bool {
        let (Some(text), Some(pattern)) = (subject_str(subject), args.first().and_then(Value::as_str))
        else {
            return false;
        };
        match Regex::new(&format!("^(?:{})$", pattern)) {
            Ok(re) => re.is_match(text),
            Err(_) => false,
        }
    }
}

#[derive(Clone, Copy)]
enum CompareKind {
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareKind {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(CompareKind::Gt),
            "<" => Some(CompareKind::Lt),
            ">=" => Some(CompareKind::Ge),
            "<=" => Some(CompareKind::Le),
            _ => None,
        }
    }

    fn holds(self, subject: &Value, bound: &Value) -> bool {
        let Some(ordering) = compare_scalars(subject, bound) else {
            return false;
        };
        match self {
            CompareKind::Gt => ordering == Ordering::Greater,
            CompareKind::Lt => ordering == Ordering::Less,
            CompareKind::Ge => ordering != Ordering::Less,
            CompareKind::Le => ordering != Ordering::Greater,
        }
    }
}

/// Orders two scalars of the same kind; mixed kinds do not compare
fn compare_scalars(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_str(), right.as_str()) {
        return Some(a.cmp(b));
    }
    None
}

/// Relational refinement: compares the subject against the first argument
///
/// Implemented on the reject side; relations constrain an already accepted
/// shape rather than select one.
struct Relation(CompareKind);

impl NativePredicate for Relation {
    fn reject(&self, subject: Option<&Value>, args: &[Value]) -> bool {
        let (Some(subject), Some(bound)) = (subject, args.first()) else {
            return false;
        };
        self.0.holds(subject, bound)
    }
}
