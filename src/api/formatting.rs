//! Reading output formatting
//!
//! Speed and heading updates are flattened into a [`FormattedReading`]
//! snapshot, which a [`ReadingFormatter`] renders as text, JSON or CSV.

use crate::api::types::{SpeedReading, SpeedSource};
use serde::{Deserialize, Serialize};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Formatter with default settings for this format
    pub fn formatter(self) -> Box<dyn ReadingFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter::new()),
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Csv => Box::new(CsvFormatter::new()),
        }
    }
}

/// One printable line of tracker output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormattedReading {
    /// Sample timestamp (milliseconds), when the sample carried one
    pub timestamp_ms: Option<u64>,
    pub speed_knots: f64,
    /// Device heading at the time of the update (degrees)
    pub heading_deg: f64,
    /// Course over ground (degrees)
    pub course_deg: Option<f64>,
    pub source: SpeedSource,
}

impl FormattedReading {
    pub fn new(reading: &SpeedReading, heading_deg: f64) -> Self {
        Self {
            timestamp_ms: reading.timestamp_ms,
            speed_knots: reading.speed_knots,
            heading_deg,
            course_deg: reading.course_deg,
            source: reading.source,
        }
    }
}

/// Renders readings for output
pub trait ReadingFormatter {
    /// Line printed once before the first reading
    fn header(&self) -> Option<String> {
        None
    }

    fn format(&self, reading: &FormattedReading) -> Result<String, serde_json::Error>;
}

/// Human-readable text formatter
pub struct TextFormatter {
    /// Append heading and course
    pub show_heading: bool,
    /// Decimal places for speed
    pub precision: usize,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            show_heading: true,
            precision: 2,
        }
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Speed only, e.g. `12.34 kn`
    pub fn speed_only() -> Self {
        Self {
            show_heading: false,
            ..Self::default()
        }
    }
}

impl ReadingFormatter for TextFormatter {
    fn format(&self, reading: &FormattedReading) -> Result<String, serde_json::Error> {
        let mut output = format!("{:.*} kn", self.precision, reading.speed_knots);
        if self.show_heading {
            output.push_str(&format!(" | hdg {:.1}°", reading.heading_deg));
            if let Some(course) = reading.course_deg {
                output.push_str(&format!(" | cog {:.1}°", course));
            }
        }
        Ok(output)
    }
}

/// JSON formatter for structured output
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: false }
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ReadingFormatter for JsonFormatter {
    fn format(&self, reading: &FormattedReading) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(reading)
        } else {
            serde_json::to_string(reading)
        }
    }
}

/// CSV formatter for data logging
pub struct CsvFormatter {
    /// Include header row
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadingFormatter for CsvFormatter {
    fn header(&self) -> Option<String> {
        if self.include_header {
            Some("timestamp_ms,speed_knots,heading_deg,course_deg,source".to_string())
        } else {
            None
        }
    }

    fn format(&self, reading: &FormattedReading) -> Result<String, serde_json::Error> {
        let source = match reading.source {
            SpeedSource::PositionFix => "position_fix",
            SpeedSource::Inertial => "inertial",
        };
        Ok(format!(
            "{},{:.4},{:.1},{},{}",
            reading.timestamp_ms.map(|t| t.to_string()).unwrap_or_default(),
            reading.speed_knots,
            reading.heading_deg,
            reading.course_deg.map(|c| format!("{:.1}", c)).unwrap_or_default(),
            source
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading() -> FormattedReading {
        FormattedReading {
            timestamp_ms: Some(2_000),
            speed_knots: 12.3456,
            heading_deg: 270.0,
            course_deg: Some(90.0),
            source: SpeedSource::PositionFix,
        }
    }

    #[test]
    fn test_text_formatting() {
        let reading = sample_reading();
        assert_eq!(
            TextFormatter::new().format(&reading).unwrap(),
            "12.35 kn | hdg 270.0° | cog 90.0°"
        );
        assert_eq!(TextFormatter::speed_only().format(&reading).unwrap(), "12.35 kn");
    }

    #[test]
    fn test_text_without_course() {
        let reading = FormattedReading {
            course_deg: None,
            ..sample_reading()
        };
        assert_eq!(TextFormatter::new().format(&reading).unwrap(), "12.35 kn | hdg 270.0°");
    }

    #[test]
    fn test_json_formatting() {
        let json = JsonFormatter::new().format(&sample_reading()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["timestamp_ms"], 2_000);
        assert_eq!(value["source"], "position_fix");
        assert!(!json.contains('\n'));
        assert!(JsonFormatter::pretty().format(&sample_reading()).unwrap().contains('\n'));
    }

    #[test]
    fn test_csv_formatting() {
        let formatter = CsvFormatter::new();
        let header = formatter.header().unwrap();
        let row = formatter.format(&sample_reading()).unwrap();

        assert_eq!(header.split(',').count(), row.split(',').count());
        assert_eq!(row, "2000,12.3456,270.0,90.0,position_fix");

        let inertial = FormattedReading {
            timestamp_ms: None,
            course_deg: None,
            source: SpeedSource::Inertial,
            ..sample_reading()
        };
        assert_eq!(formatter.format(&inertial).unwrap(), ",12.3456,270.0,,inertial");
    }

    #[test]
    fn test_csv_without_header() {
        let formatter = CsvFormatter { include_header: false };
        assert!(formatter.header().is_none());
    }

    #[test]
    fn test_reading_snapshot() {
        let reading = SpeedReading {
            speed_knots: 3.0,
            course_deg: None,
            timestamp_ms: None,
            source: SpeedSource::Inertial,
        };
        let formatted = FormattedReading::new(&reading, 45.0);
        assert_eq!(formatted.heading_deg, 45.0);
        assert_eq!(formatted.speed_knots, 3.0);
    }

    #[test]
    fn test_output_format_selects_formatter() {
        assert!(OutputFormat::Csv.formatter().header().is_some());
        assert!(OutputFormat::Text.formatter().header().is_none());
    }
}
