//! A script that takes longer than an invoker is willing to wait.
//!
//! The opening of the page is flushed before the pause, so an invoker that
//! gives up partway sees a truncated but well-formed start of the page. The
//! last paragraph is written after the pause and should never reach a
//! client when the pause outlasts the invoker's timeout.

use std::{
    io::Write,
    thread,
    time::Duration,
};

use log::debug;

use crate::{Environment, Response, Result, IO};

/// Twice the reference invoker's default timeout.
pub const PAUSE: Duration = Duration::from_secs(10);

pub const NEVER_SEEN: &str = "<p>This should never be seen due to timeout!</p>";

pub fn handler(io: &mut dyn IO, _env: Environment) -> anyhow::Result<i32> {
    run(io, PAUSE)?;
    Ok(0)
}

pub fn run<W: Write>(out: W, pause: Duration) -> Result<W> {
    let mut response = Response::new(out);
    response.content_type("text/html")?;
    let mut body = response.start_body()?;
    writeln!(body, "<html><body>")?;
    writeln!(body, "<h1>Slow CGI Script Test</h1>")?;
    writeln!(body, "<p>Starting long operation...</p>")?;
    body.flush()?;
    writeln!(body, "<p>Sleeping for {}...</p>", describe(pause))?;
    body.flush()?;
    debug!("sleeping for {:?}", pause);
    thread::sleep(pause);
    writeln!(body, "{}", NEVER_SEEN)?;
    writeln!(body, "</body></html>")?;
    body.finish()
}

fn describe(pause: Duration) -> String {
    if pause.subsec_nanos() == 0 {
        format!("{} seconds", pause.as_secs())
    }
    else {
        format!("{} milliseconds", pause.as_millis())
    }
}
