//! This crate holds three small CGI scripts and the request/response contract
//! they share. Each script is invoked once per request by a web server (or a
//! test harness), reads its request from the environment and standard input,
//! writes a response to standard output, and exits.
//!
//! This is *not* a web framework. There is no templating, no form
//! validation, no sessions or cookies, and no FastCGI. What the library does
//! provide:
//!
//! - An [`Environment`] snapshot, taken once, so request handling never
//! touches global state and can be tested with synthetic environments.
//! - [`read_body`], which reads exactly `CONTENT_LENGTH` bytes and no more.
//! - [`form::parse`], which decodes `application/x-www-form-urlencoded` data
//! into an explicit outcome instead of failing.
//! - [`Response`], which makes it impossible to write body bytes before the
//! header section is closed, and whose flushes never split a character.
//! - A reference invoker in [`invoke`], with a timeout, for tests.
//!
//! A script's `main` hands its handler to [`main`]:
//!
//! ```rust,no_run
//! use cgi_demos::{Environment, IO, Response};
//! use std::io::Write;
//!
//! fn handler(io: &mut dyn IO, env: Environment) -> anyhow::Result<i32> {
//!     let mut response = Response::new(io);
//!     response.content_type("text/plain; charset=utf-8")?;
//!     let mut body = response.start_body()?;
//!     writeln!(body, "Hello World! Your request method was {:?}!",
//!              env.method().unwrap_or("unknown"))?;
//!     body.finish()?;
//!     Ok(0)
//! }
//!
//! pub fn main() {
//!     cgi_demos::main(handler)
//! }
//! ```
//!
//! See the [Common Gateway Interface][1] specification for more information.
//!
//! [1]: https://tools.ietf.org/html/rfc3875

use std::{
    io,
    io::{Read, BufRead, Write, BufWriter},
};

use log::{debug, error, warn};

mod body;
mod env;
mod error;
pub mod form;
pub mod html;
pub mod invoke;
pub mod logging;
mod response;
pub mod scripts;

pub use body::read_body;
pub use env::Environment;
pub use error::{Error, Result};
pub use response::{BodyWriter, Response};

/// Wraps the stdin and stdout streams of a standard CGI invocation.
///
/// See the [Common Gateway Interface][1] specification for more information.
///
/// [1]: https://tools.ietf.org/html/rfc3875
pub trait IO : BufRead + Write {
}

/// Joins an input stream and an output stream into one `IO`. This is what
/// [`main`] gives to handlers, and is handy for calling handlers in tests.
pub struct DualIO<R: BufRead, W: Write> {
    pub i: R,
    pub o: W,
}

impl<R: BufRead, W: Write> DualIO<R, W> {
    pub fn new(i: R, o: W) -> DualIO<R, W> { DualIO { i, o } }
}

impl<R: BufRead, W: Write> Read for DualIO<R, W> {
    fn read(&mut self, buf: &mut[u8]) -> io::Result<usize> {
        self.i.read(buf)
    }
}

impl<R: BufRead, W: Write> BufRead for DualIO<R, W> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.i.fill_buf()
    }
    fn consume(&mut self, amount: usize) {
        self.i.consume(amount)
    }
}

impl<R: BufRead, W: Write> Write for DualIO<R, W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.o.write(bytes)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.o.flush()
    }
}

impl<R: BufRead, W: Write> IO for DualIO<R, W> {
}

/// The only function a script's `main` should call. Sets up logging,
/// snapshots the environment, and calls `handler` with the process's
/// standard streams. Does not return: the process exits with the status the
/// handler returned, or 1 if it returned an error.
///
/// The handler must use the streams and environment it is given rather than
/// `std::io::stdout` or `std::env`. Anything it logs goes to stderr, which
/// the web server usually sends to its error log.
pub fn main<H>(handler: H) -> !
where H: FnOnce(&mut dyn IO, Environment) -> anyhow::Result<i32> {
    use std::process::exit;
    logging::init();
    match sub_main(handler) {
        Ok(i) => exit(i),
        Err(e) => {
            error!("Unexpected error: {:#}", e);
            exit(1)
        }
    }
}

fn sub_main<H>(handler: H) -> anyhow::Result<i32>
where H: FnOnce(&mut dyn IO, Environment) -> anyhow::Result<i32> {
    let env = Environment::from_process();
    if !env.contains("GATEWAY_INTERFACE") {
        debug!("No GATEWAY_INTERFACE, assuming we were run by hand");
    }
    else if !env.get_or("GATEWAY_INTERFACE", "").starts_with("CGI/") {
        warn!("Unknown GATEWAY_INTERFACE type {:?}, carrying on",
              env.get_or("GATEWAY_INTERFACE", ""));
    }
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut io = DualIO {
        i: stdin.lock(),
        o: BufWriter::new(stdout.lock()),
    };
    let status = handler(&mut io, env)?;
    io.flush()?;
    Ok(status)
}
