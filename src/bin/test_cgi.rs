//! Echoes GET and POST parameters back, with forms for sending more.

pub fn main() {
    cgi_demos::main(cgi_demos::scripts::test_form::handler)
}
