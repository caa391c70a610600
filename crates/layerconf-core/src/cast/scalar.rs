//! Scalar casts

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use super::traits::Cast;

/// No conversion: the raw string is the value
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Cast for Raw {
    type Output = String;

    fn type_name(&self) -> &str {
        "str"
    }

    fn convert(&self, raw: &str) -> Result<String, String> {
        Ok(raw.to_string())
    }
}

/// Boolean from a fixed, case-insensitive token table
///
/// `true`, `yes`, `on`, `1` are true; `false`, `no`, `off`, `0` are false.
/// Anything else is an error, never a silent `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Cast for Bool {
    type Output = bool;

    fn type_name(&self) -> &str {
        "bool"
    }

    fn convert(&self, raw: &str) -> Result<bool, String> {
        match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err("expected one of true/yes/on/1 or false/no/off/0".to_string()),
        }
    }
}

/// Any `FromStr` type
///
/// ```
/// use layerconf_core::cast::{apply, Parse};
///
/// let port: u16 = apply(&Parse::<u16>::new(), "PORT", "8080").unwrap();
/// assert_eq!(port, 8080);
/// ```
pub struct Parse<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Parse<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Parse<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Parse<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for Parse<T> {}

impl<T> std::fmt::Debug for Parse<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse<{}>", std::any::type_name::<T>())
    }
}

impl<T> Cast for Parse<T>
where
    T: FromStr + Serialize,
    T::Err: Display,
{
    type Output = T;

    fn type_name(&self) -> &str {
        std::any::type_name::<T>()
    }

    fn convert(&self, raw: &str) -> Result<T, String> {
        raw.trim().parse::<T>().map_err(|e| e.to_string())
    }
}

/// Signed integer cast
pub type Integer = Parse<i64>;

/// Floating point cast
pub type Float = Parse<f64>;

/// Durations such as `90`, `45s`, `1h30m`, `2d` or `1w 2d`
///
/// A bare number is seconds. Units: `w`, `d`, `h`, `m`, `s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationCast;

impl DurationCast {
    fn unit_seconds(unit: char) -> Option<u64> {
        match unit {
            'w' => Some(7 * 24 * 3600),
            'd' => Some(24 * 3600),
            'h' => Some(3600),
            'm' => Some(60),
            's' => Some(1),
            _ => None,
        }
    }
}

impl Cast for DurationCast {
    type Output = Duration;

    fn type_name(&self) -> &str {
        "duration"
    }

    fn convert(&self, raw: &str) -> Result<Duration, String> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return Err("empty duration".to_string());
        }
        if let Ok(seconds) = text.parse::<u64>() {
            return Ok(Duration::from_secs(seconds));
        }

        let mut total: u64 = 0;
        let mut digits = String::new();
        for ch in text.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else if ch.is_whitespace() {
                continue;
            } else {
                let unit = Self::unit_seconds(ch).ok_or_else(|| format!("unknown unit '{ch}'"))?;
                if digits.is_empty() {
                    return Err(format!("missing number before '{ch}'"));
                }
                let amount: u64 = digits.parse().map_err(|_| "number too large".to_string())?;
                total = amount
                    .checked_mul(unit)
                    .and_then(|part| total.checked_add(part))
                    .ok_or_else(|| "duration too large".to_string())?;
                digits.clear();
            }
        }
        if !digits.is_empty() {
            return Err(format!("missing unit after '{digits}'"));
        }
        Ok(Duration::from_secs(total))
    }
}

/// A named closure as a cast
///
/// ```
/// use layerconf_core::cast::{apply, FnCast};
///
/// let upper = FnCast::new("upper", |raw: &str| Ok::<_, String>(raw.to_uppercase()));
/// assert_eq!(apply(&upper, "NAME", "abc").unwrap(), "ABC");
/// ```
pub struct FnCast<F> {
    name: String,
    func: F,
}

impl<F> FnCast<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F, T, E> Cast for FnCast<F>
where
    F: Fn(&str) -> Result<T, E>,
    T: Serialize,
    E: Display,
{
    type Output = T;

    fn type_name(&self) -> &str {
        &self.name
    }

    fn convert(&self, raw: &str) -> Result<T, String> {
        (self.func)(raw).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::apply;

    #[test]
    fn test_bool_tokens() {
        for token in ["true", "yes", "1", "TRUE", "On"] {
            assert!(apply(&Bool, "FLAG", token).unwrap(), "{token}");
        }
        for token in ["false", "no", "0", "OFF"] {
            assert!(!apply(&Bool, "FLAG", token).unwrap(), "{token}");
        }
    }

    #[test]
    fn test_bool_rejects_unknown() {
        let err = apply(&Bool, "FEATURE_X", "maybe").unwrap_err();
        assert_eq!(err.key, "FEATURE_X");
        assert_eq!(err.value, "maybe");
        assert_eq!(err.type_name, "bool");
        let message = err.to_string();
        assert!(message.contains("FEATURE_X"));
        assert!(message.contains("maybe"));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(apply(&Integer::new(), "PORT", " 8080 ").unwrap(), 8080);
        let err = apply(&Integer::new(), "PORT", "eighty").unwrap_err();
        assert_eq!(err.type_name, "i64");
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(apply(&Float::new(), "RATIO", "0.25").unwrap(), 0.25);
    }

    #[test]
    fn test_raw_is_identity() {
        assert_eq!(apply(&Raw, "K", "  spaced  ").unwrap(), "  spaced  ");
    }

    #[test]
    fn test_durations() {
        let cases = [
            ("90", 90),
            ("45s", 45),
            ("1h30m", 5400),
            ("2d", 172_800),
            ("1w 2d", 777_600),
            ("1H", 3600),
        ];
        for (text, seconds) in cases {
            assert_eq!(
                apply(&DurationCast, "TIMEOUT", text).unwrap(),
                Duration::from_secs(seconds),
                "{text}"
            );
        }
    }

    #[test]
    fn test_duration_errors() {
        for text in ["", "h", "10x", "5m3", "-5"] {
            assert!(apply(&DurationCast, "TIMEOUT", text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn test_fn_cast_errors_are_wrapped() {
        let even = FnCast::new("even", |raw: &str| {
            let n: i64 = raw.parse().map_err(|_| "not a number".to_string())?;
            if n % 2 == 0 { Ok(n) } else { Err(format!("{n} is odd")) }
        });
        assert_eq!(apply(&even, "N", "4").unwrap(), 4);
        let err = apply(&even, "N", "3").unwrap_err();
        assert_eq!(err.type_name, "even");
        assert_eq!(err.reason, "3 is odd");
    }

    #[test]
    fn test_redacted() {
        let err = apply(&Integer::new(), "SECRET_PIN", "hunter2").unwrap_err().redacted();
        assert!(!err.to_string().contains("hunter2"));
    }
}
