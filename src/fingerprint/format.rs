//! Plain-text fingerprint format.
//!
//! One line per chunk: the timestamp with two decimals, then the chunk's
//! frequencies in magnitude order with six decimals, space separated.
//! Magnitudes are not stored.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::model::{Fingerprint, FingerprintSequence, FrequencyMagnitude};
use crate::error::{Error, Result};

pub fn write_sequence<W: Write>(writer: &mut W, sequence: &FingerprintSequence) -> Result<()> {
    for entry in sequence {
        write!(writer, "{:.2} ", entry.timestamp)?;
        for freq in &entry.fingerprint.frequencies {
            write!(writer, "{:.6} ", freq.frequency)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Human-readable listing including magnitudes.
pub fn write_report<W: Write>(writer: &mut W, sequence: &FingerprintSequence) -> Result<()> {
    for entry in sequence {
        writeln!(writer, "Fingerprint@{:.2}:", entry.timestamp)?;
        for freq in &entry.fingerprint.frequencies {
            writeln!(writer, "\t{:.1}Hz\t ({:.3})", freq.frequency, freq.magnitude)?;
        }
    }
    Ok(())
}

/// Parse a fingerprint listing. `source_name` is used in error messages.
pub fn read_sequence<R: BufRead>(reader: R, source_name: &str) -> Result<FingerprintSequence> {
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let parse_err = |message: String| Error::Parse {
            source_name: source_name.to_string(),
            line: idx + 1,
            message,
        };

        let mut tokens = line.split_whitespace();
        let ts_token = tokens
            .next()
            .ok_or_else(|| parse_err(format!("incorrectly formatted fingerprint line: '{}'", line)))?;
        let timestamp: f64 = ts_token.parse().map_err(|_| {
            parse_err(format!("incorrectly formatted fingerprint timestamp: '{}'", ts_token))
        })?;

        let frequencies = tokens
            .map(|token| {
                token.parse::<f64>().map(FrequencyMagnitude::unweighted).map_err(|_| {
                    parse_err(format!("incorrectly formatted fingerprint frequency: '{}'", token))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        entries.push(Fingerprint::new(frequencies).at(timestamp));
    }

    Ok(FingerprintSequence::from(entries))
}

pub fn load_sequence(path: &Path) -> Result<FingerprintSequence> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("could not open file '{}': {}", path.display(), e),
        ))
    })?;
    let sequence = read_sequence(BufReader::new(file), &path.display().to_string())?;
    log::debug!("Loaded {} fingerprints from {}", sequence.len(), path.display());
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sequence() -> FingerprintSequence {
        FingerprintSequence::from(vec![
            Fingerprint::new(vec![
                FrequencyMagnitude::new(440.0, 12.5),
                FrequencyMagnitude::new(880.123456789, 3.25),
            ])
            .at(0.0),
            Fingerprint::new(vec![
                FrequencyMagnitude::new(1000.0, 7.0),
                FrequencyMagnitude::new(3.3333333, 1.0),
            ])
            .at(0.3),
        ])
    }

    #[test]
    fn writes_fixed_precision_lines() {
        let mut out = Vec::new();
        write_sequence(&mut out, &sample_sequence()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "0.00 440.000000 880.123457 \n0.30 1000.000000 3.333333 \n"
        );
    }

    #[test]
    fn report_includes_magnitudes() {
        let mut out = Vec::new();
        write_report(&mut out, &sample_sequence()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Fingerprint@0.00:\n\t440.0Hz\t (12.500)\n"));
        assert!(text.contains("Fingerprint@0.30:"));
    }

    #[test]
    fn reads_back_written_sequence() {
        let original = sample_sequence();
        let mut out = Vec::new();
        write_sequence(&mut out, &original).unwrap();

        let parsed = read_sequence(out.as_slice(), "mem").unwrap();
        assert_eq!(parsed.len(), original.len());
        for (a, b) in parsed.iter().zip(original.iter()) {
            assert!((a.timestamp - b.timestamp).abs() < 0.005);
            for (fa, fb) in a.fingerprint.frequencies.iter().zip(&b.fingerprint.frequencies) {
                assert!((fa.frequency - fb.frequency).abs() < 1e-6);
                assert_eq!(fa.magnitude, 0.0);
            }
        }
    }

    #[test]
    fn blank_line_is_an_error() {
        let err = read_sequence("0.00 1.0 2.0\n\n0.30 1.0 2.0\n".as_bytes(), "a.fp").unwrap_err();
        match err {
            Error::Parse { source_name, line, .. } => {
                assert_eq!(source_name, "a.fp");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_timestamp_names_the_token() {
        let err = read_sequence("abc 1.0\n".as_bytes(), "a.fp").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("timestamp"), "{msg}");
        assert!(msg.contains("'abc'"), "{msg}");
    }

    #[test]
    fn bad_frequency_names_the_token() {
        let err = read_sequence("0.00 1.0 x2\n".as_bytes(), "b.fp").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("b.fp:1:"), "{msg}");
        assert!(msg.contains("frequency: 'x2'"), "{msg}");
    }

    #[test]
    fn timestamp_only_line_has_no_frequencies() {
        let seq = read_sequence("1.50\n".as_bytes(), "c.fp").unwrap();
        assert_eq!(seq.len(), 1);
        assert!(seq.entries()[0].fingerprint.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_sequence(Path::new("/nonexistent/definitely/missing.fp")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing.fp"));
    }
}
