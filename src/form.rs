//! `application/x-www-form-urlencoded` decoding, for both `QUERY_STRING`
//! and POST bodies.
//!
//! The rules follow what CGI scripts have traditionally gotten from their
//! language's standard library: pairs are split on `&`, a pair without `=` is
//! skipped, `+` means space, and a pair whose value decodes to nothing is
//! dropped. A name may repeat; its values are kept in order.

use std::borrow::Cow;

/// Decoded parameters. Names are kept in the order they first appeared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams {
    entries: Vec<(String, Vec<String>)>,
}

impl FormParams {
    pub fn new() -> FormParams { FormParams::default() }

    /// Appends `value` to the values of `name`, adding `name` if it is new.
    pub fn push(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Every name with its values, in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every `(name, value)` pair, grouped by name.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(k, vs)| {
            vs.iter().map(move |v| (k.as_str(), v.as_str()))
        })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// What came of trying to decode some form data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormDecode {
    /// At least one parameter was found.
    Parsed(FormParams),
    /// Well-formed, but nothing survived (empty input, only bare names,
    /// only empty values...).
    Empty,
    /// The input, or something percent-decoded out of it, is not UTF-8.
    Malformed,
}

impl FormDecode {
    /// The parameters, if there were any. `Empty` and `Malformed` both mean
    /// "nothing to show".
    pub fn params(&self) -> Option<&FormParams> {
        match self {
            FormDecode::Parsed(params) => Some(params),
            _ => None,
        }
    }
}

/// Decodes raw bytes, such as a request body.
pub fn parse_bytes(input: &[u8]) -> FormDecode {
    match std::str::from_utf8(input) {
        Ok(input) => parse(input),
        Err(_) => FormDecode::Malformed,
    }
}

pub fn parse(input: &str) -> FormDecode {
    let mut params = FormParams::new();
    for segment in input.split('&') {
        if segment.is_empty() { continue }
        let (name, value) = match segment.find('=') {
            Some(i) => (&segment[..i], &segment[i+1..]),
            None => continue,
        };
        let value = match decode_component(value) {
            Some(value) => value,
            None => return FormDecode::Malformed,
        };
        if value.is_empty() { continue }
        let name = match decode_component(name) {
            Some(name) => name,
            None => return FormDecode::Malformed,
        };
        params.push(name, value);
    }
    if params.is_empty() { FormDecode::Empty }
    else { FormDecode::Parsed(params) }
}

fn decode_component(raw: &str) -> Option<String> {
    let raw: Cow<str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    // Stray '%' signs that don't start an escape are passed through as-is.
    urlencoding::decode(&raw).ok().map(Cow::into_owned)
}
