use serde_json::Value;

/// Pretty-print the output envelope as JSON on stdout.
pub fn print_json(value: &Value) {
    let rendered = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\":\"failed to serialise output: {}\"}}", e));
    println!("{}", rendered);
}
