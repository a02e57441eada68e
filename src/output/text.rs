use super::Formatter;
use crate::processing::SampleRow;

pub struct TextFormatter {
    adaptive: bool,
}

impl TextFormatter {
    pub fn new(adaptive: bool) -> Self {
        Self { adaptive }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, row: &SampleRow) -> String {
        if self.adaptive {
            format!(
                "#{:<8} in: {:>10.5} ref: {:>10.5} out: {:>10.5} err: {:>10.5}",
                row.index,
                row.input,
                row.reference.unwrap_or(0.0),
                row.output,
                row.error.unwrap_or(0.0)
            )
        } else {
            format!(
                "#{:<8} in: {:>10.5} out: {:>10.5}",
                row.index, row.input, row.output
            )
        }
    }
}
