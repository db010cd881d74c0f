//! Subcommand implementations.

pub mod login;
pub mod migrate;
pub mod password;
pub mod wishlist;

use std::io::BufRead;

/// Read a password from the first line of stdin.
///
/// The line ending is stripped; other whitespace is kept.
fn read_password_from_stdin() -> std::io::Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(strip_line_ending(&line).to_owned())
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map_or(line, |l| l.strip_suffix('\r').unwrap_or(l))
}
