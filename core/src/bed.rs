//! Fragment lengths from BED records.

use std::{fmt, io};

use flate2::bufread::MultiGzDecoder;

/// Reads fragment lengths from BED records, transparently decompressing
/// gzipped streams.
///
/// Each record contributes one length, the absolute difference of its start
/// and end coordinates. Header lines starting with `track` or `browser` are
/// skipped.
///
/// # Errors
///
/// If reading fails, or if any record is malformed; ingestion does not skip
/// bad records.
pub fn read_lengths<R>(mut reader: R) -> Result<Vec<u64>, ReadError>
where
    R: io::BufRead,
{
    if is_gzipped(&mut reader)? {
        parse_lengths(io::BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        parse_lengths(reader)
    }
}

fn is_gzipped<R>(reader: &mut R) -> io::Result<bool>
where
    R: io::BufRead,
{
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;

    Ok(src.get(..GZIP_MAGIC_NUMBER.len()) == Some(&GZIP_MAGIC_NUMBER))
}

fn parse_lengths<R>(reader: R) -> Result<Vec<u64>, ReadError>
where
    R: io::BufRead,
{
    let mut lengths = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;

        if line.starts_with("track") || line.starts_with("browser") {
            continue;
        }

        let line_number = index + 1;
        let start = coordinate(&line, 1, line_number)?;
        let end = coordinate(&line, 2, line_number)?;

        lengths.push(start.abs_diff(end));
    }

    log::debug!("Read {} fragment lengths.", lengths.len());

    Ok(lengths)
}

/// Parses the 0-based `field` of a record as a coordinate.
fn coordinate(line: &str, field: usize, line_number: usize) -> Result<u64, MalformedRecordError> {
    let raw = line
        .split_whitespace()
        .nth(field)
        .ok_or(MalformedRecordError::MissingField {
            line: line_number,
            field,
        })?;

    raw.parse()
        .map_err(|_| MalformedRecordError::InvalidCoordinate {
            line: line_number,
            field,
        })
}

/// An error associated with reading BED records.
#[derive(Debug)]
pub enum ReadError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A record that does not parse.
    MalformedRecord(MalformedRecordError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Io(e) => write!(f, "{e}"),
            ReadError::MalformedRecord(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io(e) => Some(e),
            ReadError::MalformedRecord(e) => Some(e),
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<MalformedRecordError> for ReadError {
    fn from(e: MalformedRecordError) -> Self {
        Self::MalformedRecord(e)
    }
}

/// An error associated with a single BED record.
///
/// Lines and fields are numbered as in the input, lines from one and fields
/// from zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MalformedRecordError {
    /// Fewer fields than a coordinate pair requires.
    MissingField {
        /// 1-based line number.
        line: usize,
        /// 0-based field index.
        field: usize,
    },
    /// A coordinate that is not a non-negative integer.
    InvalidCoordinate {
        /// 1-based line number.
        line: usize,
        /// 0-based field index.
        field: usize,
    },
}

impl fmt::Display for MalformedRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRecordError::MissingField { line, field } => {
                write!(f, "line {line} has no field {field}")
            }
            MalformedRecordError::InvalidCoordinate { line, field } => {
                write!(
                    f,
                    "field {field} of line {line} is not a non-negative integer"
                )
            }
        }
    }
}

impl std::error::Error for MalformedRecordError {}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    const BED: &str = "\
track name=\"fragments\"
browser position chr1:1-2000
chr1\t100\t247
chr1\t500\t637
chr2 1000 1147
";

    #[test]
    fn test_read_lengths() {
        let lengths = read_lengths(BED.as_bytes()).unwrap();

        assert_eq!(lengths, [147, 137, 147]);
    }

    #[test]
    fn test_read_lengths_reversed_coordinates() {
        let lengths = read_lengths("chr1\t247\t100\n".as_bytes()).unwrap();

        assert_eq!(lengths, [147]);
    }

    #[test]
    fn test_read_lengths_gzipped() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(BED.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let lengths = read_lengths(&compressed[..]).unwrap();

        assert_eq!(lengths, read_lengths(BED.as_bytes()).unwrap());
    }

    #[test]
    fn test_read_lengths_invalid_coordinate() {
        let bed = "chr1\t100\t247\nchr1\t500\tx37\n";

        let result = read_lengths(bed.as_bytes());

        assert!(matches!(
            result,
            Err(ReadError::MalformedRecord(
                MalformedRecordError::InvalidCoordinate { line: 2, field: 2 }
            ))
        ));
    }

    #[test]
    fn test_read_lengths_short_line() {
        let bed = "chr1\t100\t247\nchr1\n";

        let result = read_lengths(bed.as_bytes());

        assert!(matches!(
            result,
            Err(ReadError::MalformedRecord(
                MalformedRecordError::MissingField { line: 2, field: 1 }
            ))
        ));
    }

    #[test]
    fn test_read_lengths_empty_is_ok() {
        // Emptiness is the pipeline's error to raise, not ingestion's
        let lengths = read_lengths("".as_bytes()).unwrap();

        assert!(lengths.is_empty());
    }
}
