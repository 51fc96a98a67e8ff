//! Minimal RFC 4180 CSV rendering for analytics exports.

/// Leading characters that spreadsheets evaluate as a formula.
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Quotes a field when it contains a delimiter, quote, or line break.
///
/// A field starting with a formula trigger gets a leading `'` so that
/// client-supplied values (referrers, user agents) open as plain text.
pub fn escape_field(field: &str) -> String {
    let field = if field.starts_with(FORMULA_TRIGGERS) {
        format!("'{field}")
    } else {
        field.to_string()
    };

    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Appends one CSV record terminated by CRLF.
pub fn write_record<I, S>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        out.push_str(&escape_field(field.as_ref()));
        first = false;
    }
    out.push_str("\r\n");
}
