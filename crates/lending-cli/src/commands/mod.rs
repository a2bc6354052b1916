pub mod amortization;
pub mod ledger;
pub mod lending;
pub mod redirection;
pub mod treasury;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a flag into one of the core's SCREAMING_SNAKE_CASE enums
/// (`monthly`, `MONTHLY` and `Monthly` all work).
pub(crate) fn parse_variant<T: DeserializeOwned>(
    flag: &str,
    raw: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let normalized = raw.trim().to_uppercase().replace('-', "_");
    serde_json::from_value(Value::String(normalized))
        .map_err(|_| format!("--{flag}: unrecognised value '{raw}'").into())
}
