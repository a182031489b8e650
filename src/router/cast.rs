//! Strict conversion of path captures into typed values.
//!
//! Every rule here rejects input instead of coercing it: `007`, `-0`,
//! `1e3`, `5.` and numerals outside the `i64` range are all
//! [`RouterError::InvalidParameter`], which the boundary reports as 400.

use super::captures::Captures;
use super::pattern::{CastKind, CastMap};
use crate::error::RouterError;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Path parameters of a matched route, in pattern order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    buf: SmallVec<[(String, ParamValue); 4]>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.buf
            .iter()
            .find_map(|(n, v)| if n == name { Some(v) } else { None })
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParamValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.str(name).map(T::from_str)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.buf.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.buf.push((name.into(), value))
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = smallvec::IntoIter<[(String, ParamValue); 4]>;
    fn into_iter(self) -> Self::IntoIter {
        self.buf.into_iter()
    }
}

/// Casts every capture that has an entry in `casts`; the rest stay strings.
pub fn cast_params(captures: &Captures<'_>, casts: &CastMap) -> Result<Params, RouterError> {
    let mut params = Params::new();
    for &(name, value) in captures.iter() {
        let value = match casts.get(name) {
            Some(&kind) => cast(name, value, kind)?,
            None => ParamValue::Str(value.to_owned()),
        };
        params.insert(name, value);
    }
    Ok(params)
}

pub fn cast(name: &str, value: &str, kind: CastKind) -> Result<ParamValue, RouterError> {
    match kind {
        CastKind::Int => cast_int(name, value).map(ParamValue::Int),
        CastKind::Float => cast_float(name, value).map(ParamValue::Float),
        CastKind::Bool => cast_bool(name, value).map(ParamValue::Bool),
    }
}

pub fn cast_int(name: &str, value: &str) -> Result<i64, RouterError> {
    if !is_canonical_int(value) {
        return Err(invalid(name, value, CastKind::Int));
    }
    let n: i64 = value
        .parse()
        .map_err(|_| invalid(name, value, CastKind::Int))?;
    // round-trip rejects `-0`
    if n.to_string() != value {
        return Err(invalid(name, value, CastKind::Int));
    }
    Ok(n)
}

pub fn cast_float(name: &str, value: &str) -> Result<f64, RouterError> {
    if !is_plain_decimal(value) {
        return Err(invalid(name, value, CastKind::Float));
    }
    match value.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(invalid(name, value, CastKind::Float)),
    }
}

pub fn cast_bool(name: &str, value: &str) -> Result<bool, RouterError> {
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(invalid(name, value, CastKind::Bool))
    }
}

fn invalid(name: &str, value: &str, kind: CastKind) -> RouterError {
    RouterError::InvalidParameter {
        name: name.to_owned(),
        value: value.to_owned(),
        expected: kind.as_str(),
    }
}

/// `-?(0|[1-9][0-9]*)`
fn is_canonical_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [first, rest @ ..] => (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit),
    }
}

/// `-?[0-9]+(\.[0-9]+)?`
fn is_plain_decimal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    match s.split_once('.') {
        Some((int, frac)) => all_digits(int) && all_digits(frac),
        None => all_digits(s),
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
