use std::ops::Deref;

use regex::Regex;
use smallvec::SmallVec;

/// Raw `(name, value)` captures of a dynamic match, borrowed from the
/// route table and the request path. Kept in placeholder order.
#[derive(Debug, Clone, Default)]
pub struct Captures<'a> {
    buf: SmallVec<[(&'a str, &'a str); 8]>,
}

impl<'a> Captures<'a> {
    pub(super) fn empty() -> Self {
        Self::default()
    }

    /// Runs `regex` against `path`; `None` when it does not match.
    /// Groups that took part in the match but captured nothing are kept
    /// as empty strings.
    pub(super) fn from_regex(regex: &'a Regex, path: &'a str) -> Option<Self> {
        let caps = regex.captures(path)?;
        let buf = regex
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name, m.as_str())))
            .collect();
        Some(Self { buf })
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.buf
            .iter()
            .find_map(|&(k, v)| if name == k { Some(v) } else { None })
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.buf.iter().map(|&(k, _)| k)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Captures<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            buf: iter.into_iter().collect(),
        }
    }
}

impl<'a> Deref for Captures<'a> {
    type Target = [(&'a str, &'a str)];
    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}
