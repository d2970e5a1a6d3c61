use serde_json::Value;

/// Parse a `--define KEY=VALUE` flag.
///
/// The value is read as JSON when it parses as JSON (`true`, `20`,
/// `"quoted"`, `[1, 2]`), otherwise it is kept as a plain string.
///
/// # Examples
///
/// `batchSize=20` gives the number 20, `apiHost=example.com` the string
/// `"example.com"`.
///
/// # Errors
///
/// Returns an error message if there is no `=` or the key is empty.
pub fn parse_define(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{s}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Define key cannot be empty: '{s}'"));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
