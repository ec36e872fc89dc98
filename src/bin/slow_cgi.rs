//! Starts a page, then sleeps past a typical CGI timeout before finishing it.

pub fn main() {
    cgi_demos::main(cgi_demos::scripts::slow::handler)
}
