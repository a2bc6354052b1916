use serde_json::Value;
use std::io::{self, Write};

/// Write a command result to stdout as indented JSON.
///
/// A closed pipe (`lend recompute ... | head`) ends output quietly.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(&mut stdout.lock(), value) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("failed to write JSON output: {e}");
        }
    }
}

/// Indented JSON plus a trailing newline, so results concatenate cleanly.
pub(crate) fn write_json<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::from)?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amounts_keep_their_string_form() {
        let result = json!({ "result": { "balance_after": "700000", "transaction_type": "SETTLEMENT" } });
        let mut buf = Vec::new();
        write_json(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"balance_after\": \"700000\""));
    }
}
