use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use nalgebra::Point2;
use tracing::info;

use crate::{
    datatypes::{BendingElement, Spring, ValveModel, Vertex},
    error::{Result, ValveError},
    profiles::Severity,
};

pub const VERTEX_EXTENSION: &str = "vertex";
pub const SPRING_EXTENSION: &str = "spring";
pub const BEAM_EXTENSION: &str = "beam";

/// Formats a float like C's `%e`: six mantissa digits and a signed,
/// at least two digit exponent (`5.000000e+02`).
pub fn format_sci(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }

    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Paths of the three interchange files sharing a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub vertex: PathBuf,
    pub spring: PathBuf,
    pub beam: PathBuf,
}

impl ModelFiles {
    pub fn from_prefix(prefix: impl AsRef<Path>) -> ModelFiles {
        let prefix = prefix.as_ref().as_os_str();
        let with_extension = |ext: &str| {
            let mut path = prefix.to_owned();
            path.push(".");
            path.push(ext);
            PathBuf::from(path)
        };
        ModelFiles {
            vertex: with_extension(VERTEX_EXTENSION),
            spring: with_extension(SPRING_EXTENSION),
            beam: with_extension(BEAM_EXTENSION),
        }
    }
}

/// Builds the conventional `<base>_<severity>_<resolution>` prefix
pub fn output_prefix(base: &str, severity: Severity, points_per_leaflet: usize) -> String {
    format!("{base}_{severity}_{points_per_leaflet}")
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| ValveError::io(path, err))
}

/// Writes every record then flushes, attributing failures to `path`
fn write_records<T>(
    path: &Path,
    records: &[T],
    mut render: impl FnMut(&mut BufWriter<File>, &T) -> std::io::Result<()>,
) -> Result<()> {
    let mut file = create(path)?;
    let result = (|| -> std::io::Result<()> {
        writeln!(file, "{}", records.len())?;
        for record in records {
            render(&mut file, record)?;
        }
        file.flush()
    })();
    result.map_err(|err| ValveError::io(path, err))
}

/// Writes vertices to a `.vertex` file
///
/// # Arguments
/// * `path` - The output file
/// * `vertices` - Vertices in index order
pub fn write_vertices(path: impl AsRef<Path>, vertices: &[Vertex]) -> Result<()> {
    let path = path.as_ref();
    write_records(path, vertices, |f, v| {
        writeln!(
            f,
            "{}\t{}",
            format_sci(v.position.x),
            format_sci(v.position.y)
        )
    })?;
    info!(count = vertices.len(), path = %path.display(), "wrote vertices");
    Ok(())
}

/// Writes springs to a `.spring` file
pub fn write_springs(path: impl AsRef<Path>, springs: &[Spring]) -> Result<()> {
    let path = path.as_ref();
    write_records(path, springs, |f, s| {
        writeln!(
            f,
            "{:6} {:6} {} {}",
            s.nodes[0],
            s.nodes[1],
            format_sci(s.stiffness),
            format_sci(s.damping)
        )
    })?;
    info!(count = springs.len(), path = %path.display(), "wrote springs");
    Ok(())
}

/// Writes bending elements to a `.beam` file
pub fn write_beams(path: impl AsRef<Path>, beams: &[BendingElement]) -> Result<()> {
    let path = path.as_ref();
    write_records(path, beams, |f, b| {
        writeln!(
            f,
            "{:6} {:6} {:6} {}",
            b.nodes[0],
            b.nodes[1],
            b.nodes[2],
            format_sci(b.rigidity)
        )
    })?;
    info!(count = beams.len(), path = %path.display(), "wrote beams");
    Ok(())
}

/// Writes all three files of a model next to each other
///
/// # Returns
/// The paths that were written
pub fn write_model(prefix: impl AsRef<Path>, model: &ValveModel) -> Result<ModelFiles> {
    let files = ModelFiles::from_prefix(prefix);
    write_vertices(&files.vertex, model.vertices())?;
    write_springs(&files.spring, model.springs())?;
    write_beams(&files.beam, model.beams())?;
    Ok(files)
}

/// Line cursor over an interchange file that reports 1-based line numbers
struct RecordReader<'a> {
    path: &'a Path,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> RecordReader<'a> {
    fn new(path: &'a Path, contents: &'a str) -> RecordReader<'a> {
        RecordReader {
            path,
            lines: contents.lines().enumerate(),
        }
    }

    fn error(&self, line: usize, message: impl Into<String>) -> ValveError {
        ValveError::Parse {
            path: self.path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    /// Next non-blank line split into fields, with its line number
    fn next_fields(&mut self, what: &str) -> Result<(usize, Vec<&'a str>)> {
        for (i, line) in self.lines.by_ref() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if !fields.is_empty() {
                return Ok((i + 1, fields));
            }
        }
        Err(ValveError::Parse {
            path: self.path.to_path_buf(),
            line: 0,
            message: format!("unexpected end of file, expected {what}"),
        })
    }

    fn count(&mut self) -> Result<usize> {
        let (line, fields) = self.next_fields("record count")?;
        if fields.len() != 1 {
            return Err(self.error(line, "expected a single record count"));
        }
        self.field(line, fields[0], "record count")
    }

    /// Vector capacity for `count` records, bounded by the lines left in the file
    fn capacity(&self, count: usize) -> usize {
        count.min(self.lines.clone().count())
    }

    fn record(&mut self, expected: usize, what: &str) -> Result<(usize, Vec<&'a str>)> {
        let (line, fields) = self.next_fields(what)?;
        if fields.len() != expected {
            return Err(self.error(
                line,
                format!("expected {expected} fields in {what}, found {}", fields.len()),
            ));
        }
        Ok((line, fields))
    }

    fn field<T: FromStr>(&self, line: usize, raw: &str, what: &str) -> Result<T> {
        raw.parse()
            .map_err(|_| self.error(line, format!("invalid {what} '{raw}'")))
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| ValveError::io(path, err))
}

/// Reads a `.vertex` file back into indexed vertices
pub fn read_vertices(path: impl AsRef<Path>) -> Result<Vec<Vertex>> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    let mut reader = RecordReader::new(path, &contents);

    let count = reader.count()?;
    let mut vertices = Vec::with_capacity(reader.capacity(count));
    for index in 0..count {
        let (line, fields) = reader.record(2, "vertex")?;
        let x: f64 = reader.field(line, fields[0], "coordinate")?;
        let y: f64 = reader.field(line, fields[1], "coordinate")?;
        vertices.push(Vertex {
            index,
            position: Point2::new(x, y),
        });
    }
    Ok(vertices)
}

/// Reads a `.spring` file
pub fn read_springs(path: impl AsRef<Path>) -> Result<Vec<Spring>> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    let mut reader = RecordReader::new(path, &contents);

    let count = reader.count()?;
    let mut springs = Vec::with_capacity(reader.capacity(count));
    for _ in 0..count {
        let (line, fields) = reader.record(4, "spring")?;
        springs.push(Spring {
            nodes: [
                reader.field(line, fields[0], "index")?,
                reader.field(line, fields[1], "index")?,
            ],
            stiffness: reader.field(line, fields[2], "stiffness")?,
            damping: reader.field(line, fields[3], "damping")?,
        });
    }
    Ok(springs)
}

/// Reads a `.beam` file
pub fn read_beams(path: impl AsRef<Path>) -> Result<Vec<BendingElement>> {
    let path = path.as_ref();
    let contents = read_file(path)?;
    let mut reader = RecordReader::new(path, &contents);

    let count = reader.count()?;
    let mut beams = Vec::with_capacity(reader.capacity(count));
    for _ in 0..count {
        let (line, fields) = reader.record(4, "beam")?;
        beams.push(BendingElement {
            nodes: [
                reader.field(line, fields[0], "index")?,
                reader.field(line, fields[1], "index")?,
                reader.field(line, fields[2], "index")?,
            ],
            rigidity: reader.field(line, fields[3], "rigidity")?,
        });
    }
    Ok(beams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_matches_printf() {
        assert_eq!(format_sci(500.0), "5.000000e+02");
        assert_eq!(format_sci(250.0), "2.500000e+02");
        assert_eq!(format_sci(1.0e-2), "1.000000e-02");
        assert_eq!(format_sci(0.0), "0.000000e+00");
        assert_eq!(format_sci(-1.23456e-3), "-1.234560e-03");
        assert_eq!(format_sci(1.0e120), "1.000000e+120");
        assert_eq!(format_sci(2.2), "2.200000e+00");
        assert_eq!(format_sci(f64::NAN), "nan");
        assert_eq!(format_sci(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn sci_rounds_mantissa() {
        assert_eq!(format_sci(0.9999999), "1.000000e+00");
        assert_eq!(format_sci(1.2345675e5), "1.234568e+05");
    }

    #[test]
    fn prefix_naming() {
        assert_eq!(output_prefix("valve2d", Severity::Mild, 64), "valve2d_mild_64");
        let files = ModelFiles::from_prefix("out/valve2d_mild_64");
        assert_eq!(files.vertex, PathBuf::from("out/valve2d_mild_64.vertex"));
        assert_eq!(files.spring, PathBuf::from("out/valve2d_mild_64.spring"));
        assert_eq!(files.beam, PathBuf::from("out/valve2d_mild_64.beam"));
    }

    #[test]
    fn spring_and_beam_lines_use_fixed_width_indices() {
        let dir = tempfile::tempdir().unwrap();
        let spring_path = dir.path().join("a.spring");
        let beam_path = dir.path().join("a.beam");

        write_springs(
            &spring_path,
            &[Spring {
                nodes: [3, 12],
                stiffness: 800.0,
                damping: 0.0,
            }],
        )
        .unwrap();
        write_beams(
            &beam_path,
            &[BendingElement {
                nodes: [0, 1, 2],
                rigidity: 0.05,
            }],
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&spring_path).unwrap(),
            "1\n     3     12 8.000000e+02 0.000000e+00\n"
        );
        assert_eq!(
            std::fs::read_to_string(&beam_path).unwrap(),
            "1\n     0      1      2 5.000000e-02\n"
        );
    }

    #[test]
    fn vertex_lines_are_tab_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vertex");
        write_vertices(
            &path,
            &[Vertex {
                index: 0,
                position: Point2::new(1.0, -0.5),
            }],
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1\n1.000000e+00\t-5.000000e-01\n"
        );
    }

    #[test]
    fn unwritable_target_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.vertex");
        match write_vertices(&path, &[]) {
            Err(ValveError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn short_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.spring");
        std::fs::write(&path, "2\n     0      1 5.000000e+02 0.000000e+00\n").unwrap();
        assert!(matches!(
            read_springs(&path),
            Err(ValveError::Parse { line: 0, .. })
        ));
    }

    #[test]
    fn oversized_record_count_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let huge = "1152921504606846976";

        let vertex = dir.path().join("a.vertex");
        std::fs::write(&vertex, format!("{huge}\n1.0\t2.0\n")).unwrap();
        assert!(matches!(
            read_vertices(&vertex),
            Err(ValveError::Parse { line: 0, .. })
        ));

        let spring = dir.path().join("a.spring");
        std::fs::write(&spring, format!("{huge}\n 0 1 5e2 0\n")).unwrap();
        assert!(matches!(
            read_springs(&spring),
            Err(ValveError::Parse { line: 0, .. })
        ));

        let beam = dir.path().join("a.beam");
        std::fs::write(&beam, format!("{}\n 0 1 2 1e-2\n", usize::MAX)).unwrap();
        assert!(matches!(
            read_beams(&beam),
            Err(ValveError::Parse { line: 0, .. })
        ));
    }

    #[test]
    fn bad_field_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.beam");
        std::fs::write(&path, "2\n 0 1 2 1e-2\n 1 two 3 1e-2\n").unwrap();
        match read_beams(&path) {
            Err(ValveError::Parse { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("two"));
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vertex");
        std::fs::write(&path, "1\n1.0 2.0 3.0\n").unwrap();
        assert!(matches!(
            read_vertices(&path),
            Err(ValveError::Parse { line: 2, .. })
        ));
    }
}
