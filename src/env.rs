use std::{
    collections::BTreeMap,
    iter::FromIterator,
};

/// The request environment handed to a CGI script by its invoker.
///
/// A script never reads `std::env` directly; `cgi_demos::main` takes one
/// snapshot at startup and passes it down. Tests build one from pairs.
/// Missing variables are normal, so every accessor is either `Option` or
/// takes a default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Environment { Environment::default() }

    /// Snapshots the current process environment. Names or values that are
    /// not valid Unicode are converted lossily rather than dropped.
    pub fn from_process() -> Environment {
        std::env::vars_os()
            .map(|(k, v)| (k.to_string_lossy().into_owned(),
                           v.to_string_lossy().into_owned()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn method(&self) -> Option<&str> {
        self.get("REQUEST_METHOD")
    }

    pub fn query_string(&self) -> &str {
        self.get_or("QUERY_STRING", "")
    }

    /// `CONTENT_LENGTH`, if it is present and a plain decimal number.
    pub fn content_length(&self) -> Option<u64> {
        self.get("CONTENT_LENGTH")
            .and_then(|x| x.trim().parse().ok())
    }

    /// All variables, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.vars.len() }

    pub fn is_empty(&self) -> bool { self.vars.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Environment {
        Environment {
            vars: iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
