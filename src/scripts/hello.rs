//! Lists every environment variable, sorted, and the current time.

use std::io::Write;

use chrono::{Local, NaiveDateTime};

use crate::{html::escape, Environment, Response, Result, IO};

use super::format_time;

pub fn handler(io: &mut dyn IO, env: Environment) -> anyhow::Result<i32> {
    render(io, &env, &Local::now().naive_local())?;
    Ok(0)
}

pub fn render<W: Write>(out: W, env: &Environment, now: &NaiveDateTime)
                        -> Result<W> {
    let mut response = Response::new(out);
    response.content_type("text/html")?;
    let mut body = response.start_body()?;
    writeln!(body, "<html><head><title>Hello CGI</title></head>")?;
    writeln!(body, "<body>")?;
    writeln!(body, "<h1>Hello, CGI World!</h1>")?;
    writeln!(body, "<p>This is a simple CGI script.</p>")?;
    writeln!(body, "<h2>Environment Variables:</h2>")?;
    writeln!(body, "<ul>")?;
    for (key, value) in env.iter() {
        writeln!(body, "<li><strong>{}</strong>: {}</li>",
                 escape(key), escape(value))?;
    }
    writeln!(body, "</ul>")?;
    writeln!(body, "<p>Current time: {}</p>", format_time(now))?;
    writeln!(body, "</body></html>")?;
    body.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::fixed_time;

    fn page(env: &Environment) -> String {
        let out = render(Vec::new(), env, &fixed_time()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_every_variable_once_in_sorted_order() {
        let env: Environment = vec![
            ("SERVER_PORT", "8080"),
            ("HTTP_HOST", "localhost:8080"),
            ("REQUEST_METHOD", "GET"),
            ("CONTENT_LENGTH", ""),
        ].into_iter().collect();
        let page = page(&env);
        let items: Vec<&str> = page.lines()
            .filter(|x| x.starts_with("<li>"))
            .collect();
        assert_eq!(items, [
            "<li><strong>CONTENT_LENGTH</strong>: </li>",
            "<li><strong>HTTP_HOST</strong>: localhost:8080</li>",
            "<li><strong>REQUEST_METHOD</strong>: GET</li>",
            "<li><strong>SERVER_PORT</strong>: 8080</li>",
        ]);
    }

    #[test]
    fn header_comes_first_and_time_is_shown() {
        let page = page(&Environment::new());
        assert!(page.starts_with("Content-Type: text/html\r\n\r\n<html>"));
        assert_eq!(page.matches("\r\n\r\n").count(), 1);
        assert!(page.contains(
            "<p>Current time: 2026-10-16 12:34:56.000789</p>"));
        assert!(page.ends_with("</body></html>\n"));
    }

    #[test]
    fn values_are_escaped() {
        let env: Environment = vec![("HTTP_USER_AGENT", "<b>bold</b>")]
            .into_iter().collect();
        assert!(page(&env).contains(
            "<li><strong>HTTP_USER_AGENT</strong>: &lt;b&gt;bold&lt;/b&gt;</li>"));
    }
}
