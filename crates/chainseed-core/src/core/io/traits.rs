use crate::core::models::configuration::Configuration;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing configuration file formats.
pub trait ConfigurationFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a configuration from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Configuration, Self::Error>;

    /// Writes a configuration to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(configuration: &Configuration, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a configuration from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Configuration, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a configuration to a file path, creating or truncating the file.
    fn write_to_path<P: AsRef<Path>>(
        configuration: &Configuration,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(configuration, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
