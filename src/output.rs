use owo_colors::OwoColorize;
use std::env;

pub struct Output {
    color: bool,
}

impl Output {
    pub fn new() -> Self {
        let is_tty = atty::is(atty::Stream::Stderr);
        let color = is_tty && env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    pub fn println_always(&self, message: &str) {
        println!("{message}");
    }

    pub fn print_error(&self, message: &str) {
        if self.color {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {message}");
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
