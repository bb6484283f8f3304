pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read the command input from `--input`, falling back to piped stdin.
/// Returns None when neither is available.
pub fn read_optional<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(file::read_input(p)?)),
        None => stdin::read_stdin(),
    }
}

/// Like `read_optional`, but a missing input is an error.
pub fn read_required<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    read_optional(path)?
        .ok_or_else(|| format!("--input <file.json|file.yaml> or stdin required for {what}").into())
}
