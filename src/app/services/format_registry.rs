//! Format registry mapping file names to capable parsers
//!
//! The registry is the seam the ingestion pipeline uses to pick a parser for
//! an upload. Formats are probed in registration order and the first one that
//! answers for the file name wins; a file name no format answers for is an
//! unsupported-format error carrying the offending extension.

use crate::app::models::MeasurementRow;
use crate::app::services::csv_parser::CsvMeasurementParser;
use crate::config::ProcessingConfig;
use crate::{Error, Result};

/// A parser capable of handling some class of uploaded files
pub trait FileFormat: Send + Sync {
    /// Whether this format answers for the given file name
    fn can_parse(&self, file_name: &str) -> bool;

    /// Parse and validate an entire upload, fail-fast
    fn parse(&self, data: &[u8]) -> Result<Vec<MeasurementRow>>;
}

/// Ordered collection of registered file formats
pub struct FormatRegistry {
    formats: Vec<Box<dyn FileFormat>>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Registry with the default format set: the CSV measurement parser
    /// configured with the supported extension list
    pub fn with_default_formats(config: &ProcessingConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CsvMeasurementParser::new(
            config.supported_extensions.clone(),
        )));
        registry
    }

    /// Add a format; probed after all previously registered formats
    pub fn register(&mut self, format: Box<dyn FileFormat>) {
        self.formats.push(format);
    }

    /// Find the first registered format that answers for the file name
    pub fn resolve(&self, file_name: &str) -> Result<&dyn FileFormat> {
        self.formats
            .iter()
            .map(|format| format.as_ref())
            .find(|format| format.can_parse(file_name))
            .ok_or_else(|| Error::unsupported_format(file_extension(file_name)))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension of a file name including the leading dot, lowercased.
/// A name without a dot has the empty extension.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rfind('.')
        .map(|index| file_name[index..].to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Format that answers for a fixed extension and parses nothing
    struct FakeFormat {
        extension: &'static str,
    }

    impl FileFormat for FakeFormat {
        fn can_parse(&self, file_name: &str) -> bool {
            file_extension(file_name) == self.extension
        }

        fn parse(&self, _data: &[u8]) -> Result<Vec<MeasurementRow>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_resolve_picks_first_capable_format() {
        let mut registry = FormatRegistry::new();
        registry.register(Box::new(FakeFormat { extension: ".tsv" }));
        registry.register(Box::new(FakeFormat { extension: ".csv" }));

        assert!(registry.resolve("data.csv").is_ok());
        assert!(registry.resolve("data.tsv").is_ok());
    }

    #[test]
    fn test_resolve_unknown_extension_fails() {
        let registry = FormatRegistry::with_default_formats(&ProcessingConfig::default());

        let err = registry.resolve("archive.zip").err().unwrap();
        assert_eq!(err.to_string(), "unsupported file format: '.zip'");
    }

    #[test]
    fn test_resolve_name_without_extension_fails() {
        let registry = FormatRegistry::with_default_formats(&ProcessingConfig::default());
        assert!(registry.resolve("no-extension").is_err());
    }

    #[test]
    fn test_default_formats_accept_csv() {
        let registry = FormatRegistry::with_default_formats(&ProcessingConfig::default());
        assert!(registry.resolve("upload.csv").is_ok());
        assert!(registry.resolve("UPLOAD.CSV").is_ok());
    }

    #[test]
    fn test_file_extension_extraction() {
        assert_eq!(file_extension("data.csv"), ".csv");
        assert_eq!(file_extension("data.backup.CSV"), ".csv");
        assert_eq!(file_extension("data"), "");
        assert_eq!(file_extension(".csv"), ".csv");
    }
}
