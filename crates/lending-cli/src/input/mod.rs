pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed payload from `--input` or piped stdin, in that order.
pub fn read_required<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => Err(format!("--input <file.json> or stdin required for {what}").into()),
    }
}
