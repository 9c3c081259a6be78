//! CSV export of the history log.

use modsum_types::HistoryEntry;
use std::borrow::Cow;

/// Suggested filename for exported history.
pub const CSV_FILENAME: &str = "error-detection-history.csv";

/// Header row of the export.
pub const CSV_HEADER: &str =
    "time,sentData,keyModulus,receivedData,senderChecksum,receiverChecksum,ok,source";

/// Render entries as CSV, header first, rows in log order, `\n` separated.
pub fn to_csv(entries: &[HistoryEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    for entry in entries {
        out.push('\n');
        let row = [
            escape(&entry.time),
            Cow::Owned(entry.sent_data.to_string()),
            Cow::Owned(entry.key.to_string()),
            Cow::Owned(entry.received_data.to_string()),
            Cow::Owned(entry.sender_checksum.to_string()),
            Cow::Owned(entry.receiver_checksum.to_string()),
            Cow::Borrowed(if entry.ok { "true" } else { "false" }),
            escape(&entry.source),
        ];
        out.push_str(&row.join(","));
    }
    out
}

/// Quote a field if it contains a delimiter, quote or line break.
pub fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
