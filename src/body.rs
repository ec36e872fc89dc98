use std::io::Read;

use log::{debug, warn};

use crate::{env::Environment, Result};

/// Reads the request body, if this request has one.
///
/// Only `POST` requests with a positive `CONTENT_LENGTH` have a body. Exactly
/// that many bytes are taken from `input` and nothing past them. If the
/// stream ends early, whatever did arrive is returned.
pub fn read_body<R: Read + ?Sized>(env: &Environment, input: &mut R)
                                   -> Result<Vec<u8>> {
    if env.method() != Some("POST") {
        return Ok(Vec::new())
    }
    let length = match env.content_length() {
        Some(length) if length > 0 => length,
        Some(_) => return Ok(Vec::new()),
        None => {
            if let Some(raw) = env.get("CONTENT_LENGTH") {
                warn!("ignoring unparseable CONTENT_LENGTH {:?}", raw);
            }
            return Ok(Vec::new())
        },
    };
    let mut body = Vec::new();
    input.take(length).read_to_end(&mut body)?;
    if (body.len() as u64) < length {
        debug!("request body ended after {} of {} bytes", body.len(),
               length);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn post(length: &str) -> Environment {
        vec![("REQUEST_METHOD", "POST"), ("CONTENT_LENGTH", length)]
            .into_iter().collect()
    }

    #[test]
    fn reads_exactly_content_length_bytes() {
        let mut input = Cursor::new(b"title=Hi&x=1;trailing-garbage".to_vec());
        let body = read_body(&post("12"), &mut input).unwrap();
        assert_eq!(body, b"title=Hi&x=1");
        assert_eq!(input.position(), 12);

        let mut input = Cursor::new(b"title=Hi&x=1;trailing-garbage".to_vec());
        let body = read_body(&post("13"), &mut input).unwrap();
        assert_eq!(body, b"title=Hi&x=1;");
        let mut rest = String::new();
        input.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "trailing-garbage");
    }

    #[test]
    fn short_stream_returns_what_arrived() {
        let mut input = Cursor::new(b"a=1".to_vec());
        let body = read_body(&post("100"), &mut input).unwrap();
        assert_eq!(body, b"a=1");
    }

    #[test]
    fn no_body_without_post_or_length() {
        let get: Environment = vec![("REQUEST_METHOD", "GET"),
                                    ("CONTENT_LENGTH", "3")]
            .into_iter().collect();
        for env in &[get, post("0"), post(""), post("lots"),
                     Environment::new()] {
            let mut input = Cursor::new(b"a=1".to_vec());
            assert!(read_body(env, &mut input).unwrap().is_empty());
            assert_eq!(input.position(), 0);
        }
    }
}
