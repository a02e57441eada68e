use super::Formatter;
use crate::processing::SampleRow;

pub struct CsvFormatter {
    adaptive: bool,
}

impl CsvFormatter {
    pub fn new(adaptive: bool) -> Self {
        Self { adaptive }
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, row: &SampleRow) -> String {
        if self.adaptive {
            let reference = row.reference.map_or(String::new(), |r| format!("{:.6}", r));
            let error = row.error.map_or(String::new(), |e| format!("{:.6}", e));
            format!(
                "{},{:.6},{:.6},{},{}",
                row.index, row.input, row.output, reference, error
            )
        } else {
            format!("{},{:.6},{:.6}", row.index, row.input, row.output)
        }
    }

    fn header(&self) -> Option<&'static str> {
        if self.adaptive {
            Some("sample,input,output,reference,error")
        } else {
            Some("sample,input,output")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> SampleRow {
        SampleRow {
            index: 3,
            input: 0.5,
            reference: Some(1.0),
            output: 0.25,
            error: Some(0.75),
        }
    }

    #[test]
    fn test_csv_fixed_layout() {
        let f = CsvFormatter::new(false);
        assert_eq!(f.header(), Some("sample,input,output"));
        assert_eq!(f.format(&row()), "3,0.500000,0.250000");
    }

    #[test]
    fn test_csv_adaptive_layout() {
        let f = CsvFormatter::new(true);
        assert_eq!(f.header(), Some("sample,input,output,reference,error"));
        assert_eq!(f.format(&row()), "3,0.500000,0.250000,1.000000,0.750000");
    }
}
