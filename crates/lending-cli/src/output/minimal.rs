use serde_json::Value;

use super::scalar;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, then falls back to
/// the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "quota",
        "next_due_date",
        "remaining_wait_days",
        "balance_after",
        "outstanding_balance",
        "total_outstanding",
        "balance",
        "state",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar(val));
                    return;
                }
            }
        }

        // Nested records: the ledger entry, then the account
        for nested in ["transaction", "account"] {
            if let Some(inner) = map.get(nested).filter(|v| v.is_object()) {
                print_minimal(inner);
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(result_obj));
}
