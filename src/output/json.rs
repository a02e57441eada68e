use super::Formatter;
use crate::processing::SampleRow;

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, row: &SampleRow) -> String {
        // Non-finite floats serialise as null
        serde_json::to_string(row)
            .unwrap_or_else(|e| format!(r#"{{"index":{},"error":"{}"}}"#, row.index, e))
    }
}
