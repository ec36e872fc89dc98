//! A minimal CGI invoker, for exercising scripts the way a web server would.
//!
//! It runs one script per `Invocation`: a cleared environment plus the
//! variables you give it, the request body on stdin, stdout collected. If the
//! script runs past the timeout it is killed with SIGKILL, and only what it
//! wrote before the deadline is kept. Output is not parsed until you ask for
//! it with [`CgiOutput::parse`].

use std::{
    ffi::OsString,
    io::{Read, Write},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel as cc;
use log::{debug, warn};

use crate::{Error, Result};

/// How long a script gets before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const CHUNK_SIZE: usize = 4096;

/// What became of a script run.
#[derive(Debug)]
pub enum Outcome {
    /// Standard output reached EOF within the time budget.
    Completed { status: ExitStatus, output: Vec<u8> },
    /// The budget ran out. The script was killed; `partial` is everything it
    /// wrote before the deadline.
    TimedOut { partial: Vec<u8> },
}

impl Outcome {
    pub fn output(&self) -> &[u8] {
        match self {
            Outcome::Completed { output, .. } => output,
            Outcome::TimedOut { partial } => partial,
        }
    }

    pub fn timed_out(&self) -> bool {
        match self {
            Outcome::TimedOut { .. } => true,
            Outcome::Completed { .. } => false,
        }
    }
}

/// One request to one script.
pub struct Invocation {
    program: OsString,
    env: Vec<(String, String)>,
    body: Vec<u8>,
    timeout: Duration,
}

impl Invocation {
    pub fn new<P: Into<OsString>>(program: P) -> Invocation {
        Invocation {
            program: program.into(),
            env: Vec::new(),
            body: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Invocation {
        self.env.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Sets the request body. This doesn't touch `CONTENT_LENGTH`; set that
    /// yourself, which also lets you lie about it.
    pub fn body<B: Into<Vec<u8>>>(mut self, body: B) -> Invocation {
        self.body = body.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Invocation {
        self.timeout = timeout;
        self
    }

    pub fn run(self) -> Result<Outcome> {
        let mut command = Command::new(&self.program);
        command.env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if !self.env.iter().any(|(k, _)| k == "GATEWAY_INTERFACE") {
            command.env("GATEWAY_INTERFACE", "CGI/1.1");
        }
        for (k, v) in self.env.iter() {
            command.env(k, v);
        }
        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })?;
        let deadline = Instant::now() + self.timeout;
        let chunks = drain_stdout(&mut child)?;
        if let Err(e) = feed_stdin(&mut child, self.body) {
            warn!("unable to start feeding the request body: {}", e);
            kill(&mut child);
            return Err(e)
        }
        let mut output = Vec::new();
        loop {
            match chunks.recv_deadline(deadline) {
                Ok(Ok(chunk)) => output.extend_from_slice(&chunk),
                Ok(Err(e)) => {
                    kill(&mut child);
                    return Err(e.into())
                },
                // EOF: the reader thread is done.
                Err(cc::RecvTimeoutError::Disconnected) => break,
                Err(cc::RecvTimeoutError::Timeout) => {
                    debug!("CGI program timed out after {:?}", self.timeout);
                    kill(&mut child);
                    // Dropping the receiver discards anything still in
                    // flight.
                    return Ok(Outcome::TimedOut { partial: output })
                },
            }
        }
        let status = child.wait()?;
        Ok(Outcome::Completed { status, output })
    }
}

/// Starts a thread that forwards the child's stdout as chunks. The channel
/// disconnects at EOF.
fn drain_stdout(child: &mut Child)
                -> Result<cc::Receiver<std::io::Result<Vec<u8>>>> {
    let mut stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other, "child has no stdout pipe"))),
    };
    let (tx, rx) = cc::unbounded();
    thread::Builder::new()
        .name("cgi stdout".to_string())
        .spawn(move || {
            let mut buf = [0u8; CHUNK_SIZE];
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(Ok(buf[..n].to_vec())).is_err() { break }
                    },
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted
                        => continue,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break
                    },
                }
            }
        })?;
    Ok(rx)
}

/// Writes the body and closes stdin. A script that exits without reading
/// its body is not an error.
fn feed_stdin(child: &mut Child, body: Vec<u8>) -> Result<()> {
    let mut stdin = match child.stdin.take() {
        Some(stdin) => stdin,
        None => return Ok(()),
    };
    if body.is_empty() { return Ok(()) }
    // On its own thread, so a script that never reads can't wedge us past
    // the deadline.
    thread::Builder::new()
        .name("cgi stdin".to_string())
        .spawn(move || {
            if let Err(e) = stdin.write_all(&body) {
                debug!("CGI program did not take its whole body: {}", e);
            }
        })?;
    Ok(())
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("unable to kill CGI program: {}", e);
    }
    if let Err(e) = child.wait() {
        warn!("unable to reap CGI program: {}", e);
    }
}

/// Script output split into headers and body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CgiOutput {
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CgiOutput {
    /// Splits at the first blank line. `\r\n\r\n` is preferred; a bare
    /// `\n\n` is accepted from scripts that don't bother with CRs.
    pub fn parse(raw: &[u8]) -> Result<CgiOutput> {
        let (head, body) = match find(raw, b"\r\n\r\n") {
            Some(i) => (&raw[..i], &raw[i+4..]),
            None => match find(raw, b"\n\n") {
                Some(i) => (&raw[..i], &raw[i+2..]),
                None => return Err(Error::MissingSeparator),
            },
        };
        let headers = String::from_utf8_lossy(head)
            .lines()
            .filter_map(|line| {
                let line = line.trim_end_matches('\r');
                let colon = line.find(':')?;
                Some((line[..colon].to_owned(),
                      line[colon+1..].trim_start_matches(&[' ', '\t'][..])
                      .to_owned()))
            })
            .collect();
        Ok(CgiOutput { headers, body: body.to_vec() })
    }

    /// The first header with this name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Status` header's code, or 200 if there isn't one.
    pub fn status(&self) -> u16 {
        self.header("Status")
            .and_then(|x| x.split_whitespace().next())
            .and_then(|x| x.parse().ok())
            .unwrap_or(200)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
