//! Echoes a GET or POST request back as HTML, with forms for sending more.
//!
//! The page has four parts: request information (including any GET
//! parameters, the raw POST body, and the POST parameters decoded from it),
//! the two test forms, and a table of the usual CGI variables.

use std::io::Write;

use chrono::{Local, NaiveDateTime};
use log::debug;

use crate::{
    form::{self, FormDecode, FormParams},
    html::escape,
    read_body, Environment, Response, Result, IO,
};

use super::format_time;

/// The variables shown in the table at the bottom of the page, in order.
/// Missing ones get an empty cell.
pub const CGI_VARS: [&str; 14] = [
    "REQUEST_METHOD", "SCRIPT_NAME", "SCRIPT_FILENAME", "QUERY_STRING",
    "CONTENT_TYPE", "CONTENT_LENGTH", "SERVER_NAME", "SERVER_PORT",
    "SERVER_PROTOCOL", "GATEWAY_INTERFACE", "HTTP_HOST", "HTTP_USER_AGENT",
    "REMOTE_ADDR", "REMOTE_HOST",
];

const DEFAULT_ACTION: &str = "/test_cgi";

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>CGI Test - GET and POST</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .section { margin: 20px 0; padding: 20px; border: 1px solid #ccc; }
        .method { background-color: #f0f8ff; }
        .env { background-color: #f5f5f5; }
        input, textarea { margin: 5px; padding: 5px; }
        button { padding: 10px 20px; margin: 5px; }
    </style>
</head>
<body>
    <h1>CGI Test Script</h1>
"#;

pub fn handler(io: &mut dyn IO, env: Environment) -> anyhow::Result<i32> {
    let body = read_body(&env, io)?;
    render(io, &env, &body, &Local::now().naive_local())?;
    Ok(0)
}

/// Writes the whole page. `post_data` is the request body as already read
/// by [`read_body`]; it may be anything, including non-UTF-8.
pub fn render<W: Write>(out: W, env: &Environment, post_data: &[u8],
                        now: &NaiveDateTime) -> Result<W> {
    let mut response = Response::new(out);
    response.content_type("text/html")?;
    let mut body = response.start_body()?;
    body.write_all(HEAD.as_bytes())?;
    writeln!(body, "    <p><strong>Current time:</strong> {}</p>",
             format_time(now))?;

    let query_string = env.query_string();
    writeln!(body, r#"
    <div class="section method">
        <h2>Request Information</h2>
        <p><strong>Method:</strong> {}</p>
        <p><strong>Query String:</strong> {}</p>
        <p><strong>Content Length:</strong> {}</p>"#,
             escape(env.method().unwrap_or("Unknown")),
             escape(query_string),
             escape(env.get_or("CONTENT_LENGTH", "0")))?;

    match form::parse(query_string) {
        FormDecode::Parsed(params) => {
            write_params(&mut body, "GET Parameters", &params)?;
        },
        FormDecode::Empty => (),
        FormDecode::Malformed => debug!("query string is not valid form data"),
    }

    if !post_data.is_empty() {
        writeln!(body, "<h3>POST Data:</h3><pre>{}</pre>",
                 escape(&String::from_utf8_lossy(post_data)))?;
        match form::parse_bytes(post_data) {
            FormDecode::Parsed(params) => {
                write_params(&mut body, "Parsed POST Parameters", &params)?;
            },
            FormDecode::Empty => (),
            FormDecode::Malformed => debug!("POST body is not valid form data"),
        }
    }
    writeln!(body, "</div>")?;

    let action = escape(env.get_or("SCRIPT_NAME", DEFAULT_ACTION));
    writeln!(body, r#"
    <div class="section">
        <h2>Test Forms</h2>

        <h3>GET Test</h3>
        <form method="GET" action="{action}">
            <input type="text" name="name" placeholder="Your name" value="Mehdi">
            <input type="text" name="age" placeholder="Your age" value="25">
            <button type="submit">Submit GET</button>
        </form>

        <h3>POST Test</h3>
        <form method="POST" action="{action}">
            <input type="text" name="title" placeholder="Title" value="GHANSEFT CHI HAJA">
            <textarea name="message" placeholder="Your message">Hello from POST!</textarea>
            <button type="submit">Submit POST</button>
        </form>
    </div>"#, action = action)?;

    writeln!(body, r#"
    <div class="section env">
        <h2>Environment Variables</h2>
        <table border="1" style="border-collapse: collapse;">
            <tr><th>Variable</th><th>Value</th></tr>"#)?;
    for var in CGI_VARS.iter() {
        writeln!(body, "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
                 var, escape(env.get_or(var, "")))?;
    }
    writeln!(body, r#"
        </table>
    </div>
</body>
</html>"#)?;
    body.finish()
}

fn write_params<W: Write>(out: &mut W, title: &str, params: &FormParams)
                          -> Result<()> {
    writeln!(out, "<h3>{}:</h3><ul>", title)?;
    for (name, value) in params.pairs() {
        writeln!(out, "<li><strong>{}:</strong> {}</li>",
                 escape(name), escape(value))?;
    }
    writeln!(out, "</ul>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scripts::fixed_time, DualIO};
    use std::io::Cursor;

    fn env(vars: &[(&str, &str)]) -> Environment {
        vars.iter().cloned().collect()
    }

    fn page(env: &Environment, post_data: &[u8]) -> String {
        let out = render(Vec::new(), env, post_data, &fixed_time()).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn table_rows(page: &str) -> Vec<&str> {
        page.lines().filter(|x| x.starts_with("<tr><td>")).collect()
    }

    #[test]
    fn table_has_every_curated_variable_in_order() {
        let page = page(&env(&[("REQUEST_METHOD", "GET"),
                               ("PATH", "/usr/bin")]), b"");
        let rows = table_rows(&page);
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[0],
            "<tr><td><strong>REQUEST_METHOD</strong></td><td>GET</td></tr>");
        for (row, var) in rows.iter().zip(CGI_VARS.iter()).skip(1) {
            assert_eq!(*row, format!(
                "<tr><td><strong>{}</strong></td><td></td></tr>", var));
        }
        assert!(!page.contains("PATH"));
    }

    #[test]
    fn repeated_query_parameters_are_all_listed() {
        let page = page(&env(&[("REQUEST_METHOD", "GET"),
                               ("QUERY_STRING", "name=Ana&age=30&name=Bob")]),
                        b"");
        assert!(page.contains("<h3>GET Parameters:</h3><ul>\n\
                               <li><strong>name:</strong> Ana</li>\n\
                               <li><strong>name:</strong> Bob</li>\n\
                               <li><strong>age:</strong> 30</li>\n\
                               </ul>\n"));
        assert!(!page.contains("POST Data"));
    }

    #[test]
    fn post_body_is_shown_raw_and_parsed() {
        let page = page(&env(&[("REQUEST_METHOD", "POST"),
                               ("CONTENT_LENGTH", "40")]),
                        b"title=Hi+there&message=Hello%20from%20POST");
        assert!(page.contains(
            "<h3>POST Data:</h3><pre>title=Hi+there&amp;message=Hello%20from%20POST</pre>"));
        assert!(page.contains("<h3>Parsed POST Parameters:</h3><ul>\n\
                               <li><strong>title:</strong> Hi there</li>\n\
                               <li><strong>message:</strong> Hello from POST</li>\n"));
        assert!(page.contains("<p><strong>Content Length:</strong> 40</p>"));
    }

    #[test]
    fn malformed_body_skips_only_the_parsed_section() {
        let page = page(&env(&[("REQUEST_METHOD", "POST"),
                               ("CONTENT_LENGTH", "9")]),
                        b"x=%FF&y=\xfe");
        assert!(page.contains("<h3>POST Data:</h3>"));
        assert!(!page.contains("Parsed POST Parameters"));
        assert!(page.contains("<h2>Test Forms</h2>"));
        assert_eq!(table_rows(&page).len(), 14);
        assert!(page.ends_with("</html>\n"));
    }

    #[test]
    fn malformed_query_string_skips_only_the_parameter_list() {
        let page = page(&env(&[("REQUEST_METHOD", "GET"),
                               ("QUERY_STRING", "a=%FF")]), b"");
        assert!(!page.contains("GET Parameters"));
        assert!(page.contains("<p><strong>Query String:</strong> a=%FF</p>"));
        assert!(page.contains(
            "<tr><td><strong>QUERY_STRING</strong></td><td>a=%FF</td></tr>"));
        assert_eq!(table_rows(&page).len(), 14);
        assert!(page.ends_with("</html>\n"));
    }

    #[test]
    fn missing_request_information_uses_defaults() {
        let page = page(&Environment::new(), b"");
        assert!(page.starts_with("Content-Type: text/html\r\n\r\n<!DOCTYPE html>"));
        assert_eq!(page.matches("\r\n\r\n").count(), 1);
        assert!(page.contains("<p><strong>Method:</strong> Unknown</p>"));
        assert!(page.contains("<p><strong>Query String:</strong> </p>"));
        assert!(page.contains("<p><strong>Content Length:</strong> 0</p>"));
        assert!(page.contains(r#"<form method="GET" action="/test_cgi">"#));
        assert!(page.contains(
            "<p><strong>Current time:</strong> 2026-10-16 12:34:56.000789</p>"));
        assert!(!page.contains("GET Parameters"));
    }

    #[test]
    fn forms_post_back_to_the_script() {
        let page = page(&env(&[("SCRIPT_NAME", "/cgi-bin/test_cgi")]), b"");
        assert!(page.contains(
            r#"<form method="GET" action="/cgi-bin/test_cgi">"#));
        assert!(page.contains(
            r#"<form method="POST" action="/cgi-bin/test_cgi">"#));
    }

    #[test]
    fn handler_reads_only_the_declared_body() {
        let env = env(&[("REQUEST_METHOD", "POST"),
                        ("CONTENT_LENGTH", "12")]);
        let mut io = DualIO::new(
            Cursor::new(b"title=Hi&x=1;trailing-garbage".to_vec()),
            Vec::new());
        assert_eq!(handler(&mut io, env).unwrap(), 0);
        assert_eq!(io.i.position(), 12);
        let page = String::from_utf8(io.o).unwrap();
        assert!(page.contains("<pre>title=Hi&amp;x=1</pre>"));
        assert!(page.contains("<li><strong>x:</strong> 1</li>"));
        assert!(!page.contains("trailing"));
    }
}
