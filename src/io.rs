//! Point file reading and writing.
//!
//! The format is a point count on the first line followed by that many lines
//! of three whitespace-separated coordinates:
//!
//! ```text
//! 3
//! 0.0 0.0 0.0
//! 1.0 0.5 -2.0
//! 4.25 1.0 0.0
//! ```
//!
//! Lines after the announced count are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::types::{Point, PointSequence};

/// Decimals written per coordinate by [`save_points`].
pub const DEFAULT_PRECISION: usize = 4;

#[derive(Debug, Error)]
pub enum PointFileError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("point file is empty")]
    MissingHeader,

    #[error("line {line}: expected a point count")]
    InvalidHeader { line: usize },

    #[error("expected {expected} points, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("line {line}: expected three coordinates")]
    MalformedLine { line: usize },
}

/// Parse points from a reader.
pub fn read_points<R: BufRead>(reader: R) -> Result<PointSequence, PointFileError> {
    let mut lines = reader.lines().enumerate();

    let count = loop {
        let Some((idx, line)) = lines.next() else {
            return Err(PointFileError::MissingHeader);
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        break trimmed
            .parse::<usize>()
            .map_err(|_| PointFileError::InvalidHeader { line: idx + 1 })?;
    };

    let mut points = Vec::with_capacity(count);
    while points.len() < count {
        let Some((idx, line)) = lines.next() else {
            return Err(PointFileError::Truncated {
                expected: count,
                found: points.len(),
            });
        };
        let line = line?;
        points.push(parse_point(&line).ok_or(PointFileError::MalformedLine { line: idx + 1 })?);
    }

    Ok(points)
}

fn parse_point(line: &str) -> Option<Point> {
    let mut coords = line.split_whitespace().map(|s| s.parse::<f64>());
    let x = coords.next()?.ok()?;
    let y = coords.next()?.ok()?;
    let z = coords.next()?.ok()?;
    if coords.next().is_some() || !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return None;
    }
    Some(Point::new(x, y, z))
}

/// Load points from a file.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<PointSequence, PointFileError> {
    let file = File::open(path)?;
    read_points(BufReader::new(file))
}

/// Write points with `precision` decimals per coordinate.
pub fn write_points<W: Write>(
    mut writer: W,
    points: &[Point],
    precision: usize,
) -> Result<(), PointFileError> {
    writeln!(writer, "{}", points.len())?;
    for p in points {
        writeln!(
            writer,
            "{:.prec$} {:.prec$} {:.prec$}",
            p.x,
            p.y,
            p.z,
            prec = precision
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Save points to a file with [`DEFAULT_PRECISION`] decimals.
pub fn save_points<P: AsRef<Path>>(path: P, points: &[Point]) -> Result<(), PointFileError> {
    let file = File::create(path)?;
    write_points(BufWriter::new(file), points, DEFAULT_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_count_and_points() {
        let text = "3\n0 0 0\n1.5  -2 3\n\t4 5 6.25 \nextra line\n";
        let points = read_points(Cursor::new(text)).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.5, -2.0, 3.0),
                Point::new(4.0, 5.0, 6.25),
            ]
        );
    }

    #[test]
    fn reports_truncated_file() {
        let err = read_points(Cursor::new("4\n0 0 0\n1 1 1\n")).unwrap_err();
        assert!(matches!(
            err,
            PointFileError::Truncated {
                expected: 4,
                found: 2
            }
        ));
    }

    #[test]
    fn reports_malformed_line_number() {
        let err = read_points(Cursor::new("2\n0 0 0\n1 x 1\n")).unwrap_err();
        assert!(matches!(err, PointFileError::MalformedLine { line: 3 }));

        let err = read_points(Cursor::new("1\n1 2\n")).unwrap_err();
        assert!(matches!(err, PointFileError::MalformedLine { line: 2 }));
    }

    #[test]
    fn reports_bad_or_missing_header() {
        assert!(matches!(
            read_points(Cursor::new("")).unwrap_err(),
            PointFileError::MissingHeader
        ));
        assert!(matches!(
            read_points(Cursor::new("three\n")).unwrap_err(),
            PointFileError::InvalidHeader { line: 1 }
        ));
    }

    #[test]
    fn writes_fixed_precision() {
        let mut buf = Vec::new();
        write_points(&mut buf, &[Point::new(1.0, -0.5, 2.123456)], 2).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1\n1.00 -0.50 2.12\n");
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        let points = vec![Point::new(0.1234, 5.0, -6.5), Point::new(7.0, 8.0, 9.0)];

        save_points(&path, &points).unwrap();
        assert_eq!(load_points(&path).unwrap(), points);
    }
}
