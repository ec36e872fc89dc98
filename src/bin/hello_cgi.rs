//! Lists the request environment, sorted, and the current time.

pub fn main() {
    cgi_demos::main(cgi_demos::scripts::hello::handler)
}
