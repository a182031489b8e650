use crate::config::{RouterConfig, TrailingSlash};
use crate::error::RouterError;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

const OPEN: char = '{';
const CLOSE: char = '}';
const SLASH: char = '/';

const DEFAULT_FRAGMENT: &str = "[^/]+";

const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("int", "-?[0-9]+"),
    ("float", r"-?[0-9]+(?:\.[0-9]+)?"),
    ("bool", "(?i:true|false|1|0)"),
    ("alpha", "[a-zA-Z]+"),
    ("alphanum", "[a-zA-Z0-9]+"),
    ("slug", "[a-z0-9]+(?:-[a-z0-9]+)*"),
    (
        "uuid",
        "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    ),
    ("ulid", "[0-7][0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{25}"),
    ("any", ".*"),
];

/// The conversions applied to captures after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastKind {
    Int,
    Float,
    Bool,
}

pub type CastMap = BTreeMap<String, CastKind>;

impl CastKind {
    fn from_type(ty: &str) -> Option<Self> {
        match ty {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Static(String),
    Dynamic { regex: Regex, casts: CastMap },
}

impl CompiledPattern {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// Turns `{name}` / `{name:type}` patterns into literals or anchored regexes.
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    trailing_slash: TrailingSlash,
    custom: BTreeMap<String, String>,
}

impl PatternCompiler {
    pub fn new(config: &RouterConfig) -> Result<Self, RouterError> {
        for (name, fragment) in &config.types {
            let pattern = format!("{{{}:{}}}", name, fragment);
            if !is_identifier(name) {
                return Err(RouterError::invalid_pattern(
                    &pattern,
                    "custom type name must be an identifier",
                ));
            }
            if builtin_fragment(name).is_some() {
                return Err(RouterError::invalid_pattern(
                    &pattern,
                    "custom type can not replace a built-in type",
                ));
            }
            if let Err(e) = Regex::new(&format!("^(?:{})$", fragment)) {
                return Err(RouterError::invalid_pattern(&pattern, e.to_string()));
            }
        }
        Ok(Self {
            trailing_slash: config.trailing_slash,
            custom: config.types.clone(),
        })
    }

    pub fn trailing_slash(&self) -> TrailingSlash {
        self.trailing_slash
    }

    /// Adds the leading slash and applies the trailing-slash mode.
    pub fn normalize(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 1);
        if !pattern.starts_with(SLASH) {
            out.push(SLASH);
        }
        out.push_str(pattern);
        if self.trailing_slash == TrailingSlash::Ignore {
            while out.len() > 1 && out.ends_with(SLASH) {
                out.pop();
            }
        }
        out
    }

    pub fn normalize_path<'p>(&self, path: &'p str) -> Cow<'p, str> {
        match self.trailing_slash {
            TrailingSlash::Strict if path.starts_with(SLASH) => Cow::Borrowed(path),
            TrailingSlash::Ignore if path.starts_with(SLASH) && !has_trailing_slash(path) => {
                Cow::Borrowed(path)
            }
            _ => Cow::Owned(self.normalize(path)),
        }
    }

    pub fn compile(&self, pattern: &str) -> Result<CompiledPattern, RouterError> {
        if !pattern.contains(OPEN) {
            if pattern.contains(CLOSE) {
                return Err(RouterError::invalid_pattern(pattern, "unmatched '}'"));
            }
            return Ok(CompiledPattern::Static(pattern.to_owned()));
        }

        let mut source = String::with_capacity(pattern.len() * 2);
        let mut casts = CastMap::new();
        let mut seen: SmallVec<[&str; 8]> = SmallVec::new();

        source.push('^');
        let mut rest = pattern;
        while let Some(start) = rest.find(OPEN) {
            let (literal, tail) = rest.split_at(start);
            if literal.contains(CLOSE) {
                return Err(RouterError::invalid_pattern(pattern, "unmatched '}'"));
            }
            source.push_str(&regex::escape(literal));

            let end = match tail.find(CLOSE) {
                Some(end) => end,
                None => return Err(RouterError::invalid_pattern(pattern, "unclosed '{'")),
            };
            let body = &tail[1..end];
            if body.contains(OPEN) {
                return Err(RouterError::invalid_pattern(pattern, "nested '{'"));
            }

            let (name, ty) = match body.split_once(':') {
                Some((name, ty)) => (name, Some(ty)),
                None => (body, None),
            };
            if !is_identifier(name) {
                return Err(RouterError::invalid_pattern(
                    pattern,
                    format!("invalid parameter name {:?}", name),
                ));
            }
            if seen.contains(&name) {
                return Err(RouterError::invalid_pattern(
                    pattern,
                    format!("duplicate parameter name {:?}", name),
                ));
            }
            seen.push(name);

            let fragment = match ty {
                None => DEFAULT_FRAGMENT,
                Some(ty) => self.fragment(ty).ok_or_else(|| {
                    RouterError::invalid_pattern(pattern, format!("unknown parameter type {:?}", ty))
                })?,
            };
            if let Some(cast) = ty.and_then(CastKind::from_type) {
                casts.insert(name.to_owned(), cast);
            }
            let _ = write!(source, "(?P<{}>{})", name, fragment);

            rest = &tail[end + 1..];
        }
        if rest.contains(CLOSE) {
            return Err(RouterError::invalid_pattern(pattern, "unmatched '}'"));
        }
        source.push_str(&regex::escape(rest));
        source.push('$');

        let regex =
            Regex::new(&source).map_err(|e| RouterError::invalid_pattern(pattern, e.to_string()))?;
        Ok(CompiledPattern::Dynamic { regex, casts })
    }

    fn fragment(&self, ty: &str) -> Option<&str> {
        builtin_fragment(ty).or_else(|| self.custom.get(ty).map(String::as_str))
    }
}

/// Joins a group prefix and a pattern with exactly one slash between them.
pub(crate) fn join_paths(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches(SLASH);
    let pattern = pattern.trim_start_matches(SLASH);
    let mut out = String::with_capacity(prefix.len() + pattern.len() + 1);
    out.push_str(prefix);
    out.push(SLASH);
    out.push_str(pattern);
    out
}

fn builtin_fragment(ty: &str) -> Option<&'static str> {
    BUILTIN_TYPES
        .iter()
        .find_map(|&(name, fragment)| if name == ty { Some(fragment) } else { None })
}

fn has_trailing_slash(path: &str) -> bool {
    path.len() > 1 && path.ends_with(SLASH)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler() -> PatternCompiler {
        PatternCompiler::new(&RouterConfig::default()).unwrap()
    }

    fn regex_of(p: CompiledPattern) -> (Regex, CastMap) {
        match p {
            CompiledPattern::Dynamic { regex, casts } => (regex, casts),
            CompiledPattern::Static(s) => panic!("expected dynamic pattern, got {:?}", s),
        }
    }

    #[test]
    fn static_patterns() {
        let c = compiler();
        match c.compile("/about/team").unwrap() {
            CompiledPattern::Static(s) => assert_eq!(s, "/about/team"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dynamic_patterns() {
        let c = compiler();
        let (regex, casts) = regex_of(c.compile("/users/{id:int}/posts/{slug}").unwrap());
        assert_eq!(regex.as_str(), r"^/users/(?P<id>-?[0-9]+)/posts/(?P<slug>[^/]+)$");
        assert_eq!(casts.len(), 1);
        assert_eq!(casts["id"], CastKind::Int);

        let caps = regex.captures("/users/42/posts/hello-world").unwrap();
        assert_eq!(&caps["id"], "42");
        assert_eq!(&caps["slug"], "hello-world");
        assert!(!regex.is_match("/users/abc/posts/x"));
    }

    #[test]
    fn only_numeric_and_bool_types_cast() {
        let c = compiler();
        let (_, casts) = regex_of(
            c.compile("/{a:int}/{b:float}/{c:bool}/{d:uuid}/{e:slug}/{f}")
                .unwrap(),
        );
        let kinds: Vec<(&str, CastKind)> = casts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            kinds,
            [
                ("a", CastKind::Int),
                ("b", CastKind::Float),
                ("c", CastKind::Bool)
            ]
        );
    }

    #[test]
    fn literal_text_is_escaped() {
        let c = compiler();
        let (regex, _) = regex_of(c.compile("/files/{name}.json").unwrap());
        assert!(regex.is_match("/files/report.json"));
        assert!(!regex.is_match("/files/reportxjson"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let c = compiler();
        let err = c.compile("/users/{id:integer}").unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert!(err.to_string().contains("unknown parameter type"));
    }

    #[test]
    fn malformed_patterns() {
        let c = compiler();
        for p in [
            "/u/{id}/p/{id}",
            "/u/{id",
            "/u/id}",
            "/u/{}",
            "/u/{1a}",
            "/u/{a{b}}",
            "/u/{a}}",
        ] {
            assert!(
                matches!(c.compile(p), Err(RouterError::InvalidPattern { .. })),
                "{:?} should be rejected",
                p
            );
        }
    }

    #[test]
    fn custom_types() {
        let config = RouterConfig::default().with_type("year", r"\d{4}");
        let c = PatternCompiler::new(&config).unwrap();
        let (regex, casts) = regex_of(c.compile("/archive/{y:year}").unwrap());
        assert!(casts.is_empty());
        assert!(regex.is_match("/archive/2024"));
        assert!(!regex.is_match("/archive/24"));

        let config = RouterConfig::default().with_type("int", r"\d+");
        assert!(PatternCompiler::new(&config).is_err());

        let config = RouterConfig::default().with_type("broken", r"(\d+");
        assert!(PatternCompiler::new(&config).is_err());
    }

    #[test]
    fn normalization() {
        let ignore = compiler();
        assert_eq!(ignore.normalize("users/"), "/users");
        assert_eq!(ignore.normalize("/"), "/");
        assert_eq!(ignore.normalize(""), "/");
        assert_eq!(ignore.normalize_path("/users/"), "/users");
        assert!(matches!(ignore.normalize_path("/users"), Cow::Borrowed(_)));

        let strict = PatternCompiler::new(
            &RouterConfig::default().with_trailing_slash(TrailingSlash::Strict),
        )
        .unwrap();
        assert_eq!(strict.normalize("/users/"), "/users/");
        assert_eq!(strict.normalize_path("/users/"), "/users/");
    }

    #[test]
    fn joining() {
        assert_eq!(join_paths("", "/"), "/");
        assert_eq!(join_paths("/api/", "/users"), "/api/users");
        assert_eq!(join_paths("/api", "users/"), "/api/users/");
        assert_eq!(join_paths("/api", ""), "/api/");
    }
}
