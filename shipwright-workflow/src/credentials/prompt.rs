use std::io::{self, BufRead, Write};

/// Interactive source of credentials
pub trait Prompter: Send + Sync {
    fn prompt_username(&self, url: &str) -> io::Result<String>;

    /// Reads a password without echoing it
    fn prompt_password(&self, url: &str) -> io::Result<String>;
}

/// [`Prompter`] reading usernames from stdin and passwords from the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyPrompter;

impl Prompter for TtyPrompter {
    fn prompt_username(&self, _url: &str) -> io::Result<String> {
        eprint!("Username: ");
        io::stderr().flush()?;
        read_line()
    }

    fn prompt_password(&self, _url: &str) -> io::Result<String> {
        rpassword::prompt_password("Password: ")
    }
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no input while reading credentials",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
