//! Plain-text export of feature sets.
//!
//! ```text
//! Features of image<ID>
//! Line1 Points:
//! [10, 10]
//! [10, 100]
//! Line2 Points:
//! ...
//! ```

use log::info;
use nalgebra::Point2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::features::{FeatureGroup, FeatureKind, FeaturePoint, FeatureSet};

const HEADER_PREFIX: &str = "Features of image";
const LABEL_SUFFIX: &str = " Points:";

/// Write `features` of image `id` to `out` in the export format.
pub fn write_features<W: Write>(out: &mut W, features: &FeatureSet, id: &str) -> Result<()> {
    out.write_all(features_to_string(features, id).as_bytes())?;
    Ok(())
}

/// Label line and point lines of the group at zero-based `index`.
fn group_block(kind: FeatureKind, index: usize, group: &FeatureGroup) -> String {
    let mut block = format!("{}{}{}\n", kind, index + 1, LABEL_SUFFIX);
    for p in group.points() {
        block.push_str(&format!("[{}, {}]\n", p.x, p.y));
    }
    block
}

pub fn features_to_string(features: &FeatureSet, id: &str) -> String {
    let mut text = format!("{}{}\n", HEADER_PREFIX, id);
    for (i, group) in features.iter().enumerate() {
        text.push_str(&group_block(features.kind(), i, group));
    }
    text
}

/// Export `features` to `<dir>/<Kind><id>.txt`, returning the path written.
pub fn write_features_file(dir: impl AsRef<Path>, features: &FeatureSet, id: &str) -> Result<PathBuf> {
    let path = dir.as_ref().join(format!("{}{}.txt", features.kind(), id));
    let mut out = BufWriter::new(File::create(&path)?);
    write_features(&mut out, features, id)?;
    out.flush()?;
    info!("wrote {} {} groups to {}", features.len(), features.kind(), path.display());
    Ok(path)
}

/// Parsed contents of an export.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureExport {
    pub id: String,
    /// `None` when the export holds no groups, since the kind only shows in group labels.
    pub kind: Option<FeatureKind>,
    pub groups: Vec<FeatureGroup>,
}

impl FeatureExport {
    /// Rebuild the feature set, using `fallback` as the kind of an empty export.
    pub fn into_feature_set(self, fallback: FeatureKind) -> FeatureSet {
        FeatureSet::new(self.kind.unwrap_or(fallback), self.groups)
    }
}

/// Parse an export produced by [`write_features`].
///
/// Group labels must be numbered consecutively from 1 and share one kind, and every group
/// must have a valid number of points for that kind.
pub fn parse_features(text: &str) -> Result<FeatureExport> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim_end()));

    let id = match lines.next() {
        Some((n, header)) => header
            .strip_prefix(HEADER_PREFIX)
            .ok_or_else(|| parse_error(n, format!("expected header \"{}<ID>\"", HEADER_PREFIX)))?
            .to_string(),
        None => return Err(parse_error(1, "empty input")),
    };

    let mut kind: Option<FeatureKind> = None;
    let mut groups: Vec<FeatureGroup> = Vec::new();
    let mut current: Option<(usize, Vec<FeaturePoint>)> = None;

    let finish = |group: Option<(usize, Vec<FeaturePoint>)>,
                  kind: Option<FeatureKind>,
                  groups: &mut Vec<FeatureGroup>|
     -> Result<()> {
        if let (Some((line, points)), Some(kind)) = (group, kind) {
            if !kind.accepts_group_len(points.len()) {
                return Err(parse_error(
                    line,
                    format!("{} group with {} points", kind, points.len()),
                ));
            }
            groups.push(FeatureGroup::from_points(points));
        }
        Ok(())
    };

    for (n, line) in lines {
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') {
            let point = parse_point(line).ok_or_else(|| parse_error(n, format!("bad point \"{}\"", line)))?;
            match current.as_mut() {
                Some((_, points)) => points.push(point),
                None => return Err(parse_error(n, "point before any group label")),
            }
            continue;
        }

        let (label_kind, index) = parse_label(line).ok_or_else(|| parse_error(n, format!("bad label \"{}\"", line)))?;
        if *kind.get_or_insert(label_kind) != label_kind {
            return Err(parse_error(n, format!("mixed feature kinds, found {}", label_kind)));
        }
        if index != groups.len() + usize::from(current.is_some()) + 1 {
            return Err(parse_error(n, format!("group {} out of order", index)));
        }
        finish(current.take(), kind, &mut groups)?;
        current = Some((n, Vec::new()));
    }
    finish(current.take(), kind, &mut groups)?;

    Ok(FeatureExport { id, kind, groups })
}

fn parse_error(line: usize, reason: impl Into<String>) -> Error {
    Error::Parse {
        line,
        reason: reason.into(),
    }
}

/// `"Corner12 Points:"` -> `(Corner, 12)`
fn parse_label(line: &str) -> Option<(FeatureKind, usize)> {
    let head = line.strip_suffix(LABEL_SUFFIX)?;
    let split = head.find(|c: char| c.is_ascii_digit())?;
    let kind = FeatureKind::from_label(&head[..split])?;
    let index = head[split..].parse().ok()?;
    Some((kind, index))
}

/// `"[x, y]"` -> point
fn parse_point(line: &str) -> Option<FeaturePoint> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let mut parts = inner.split(',').map(str::trim);
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> FeatureSet {
        FeatureSet::new(
            FeatureKind::Line,
            vec![
                FeatureGroup::line(Point2::new(10, 10), Point2::new(10, 100)),
                FeatureGroup::line(Point2::new(-3, 4), Point2::new(50, 7)),
            ],
        )
    }

    #[test]
    fn export_format() {
        let text = features_to_string(&lines(), "line_obj1");
        assert_eq!(
            text,
            "Features of imageline_obj1\n\
             Line1 Points:\n[10, 10]\n[10, 100]\n\
             Line2 Points:\n[-3, 4]\n[50, 7]\n"
        );
    }

    #[test]
    fn stream_and_string_exports_agree() {
        let mut buf = Vec::new();
        write_features(&mut buf, &lines(), "s").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), features_to_string(&lines(), "s"));
    }

    #[test]
    fn failing_sink_reports_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "sink closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        assert!(matches!(write_features(&mut Broken, &lines(), "s"), Err(Error::Io(_))));
    }

    #[test]
    fn empty_set_is_header_only() {
        let text = features_to_string(&FeatureSet::empty(FeatureKind::Corner), "7");
        assert_eq!(text, "Features of image7\n");
        let parsed = parse_features(&text).unwrap();
        assert_eq!(parsed.id, "7");
        assert_eq!(parsed.kind, None);
        assert!(parsed.groups.is_empty());
    }

    #[test]
    fn parse_restores_groups_in_order() {
        let set = lines();
        let parsed = parse_features(&features_to_string(&set, "a")).unwrap();
        assert_eq!(parsed.kind, Some(FeatureKind::Line));
        assert_eq!(parsed.into_feature_set(FeatureKind::Corner), set);
    }

    #[test]
    fn rejects_malformed_input() {
        let cases = [
            ("", 1),
            ("Featues of image1\n", 1),
            ("Features of image1\n[1, 2]\n", 2),
            ("Features of image1\nCorner1 Points:\n[1; 2]\n", 3),
            ("Features of image1\nCorner2 Points:\n[1, 2]\n", 2),
            ("Features of image1\nCorner1 Points:\n[1, 2]\n[3, 4]\n", 2),
            ("Features of image1\nLine1 Points:\n[1, 2]\n", 2),
            ("Features of image1\nCorner1 Points:\n[1, 2]\nLine2 Points:\n", 4),
            ("Features of image1\nEdge1 Points:\n", 2),
        ];
        for (text, line) in cases.iter() {
            match parse_features(text) {
                Err(Error::Parse { line: at, .. }) => assert_eq!(at, *line, "{:?}", text),
                other => panic!("{:?} parsed as {:?}", text, other),
            }
        }
    }

    #[test]
    fn writes_kind_and_id_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_features_file(dir.path(), &lines(), "line_obj1").unwrap();
        assert_eq!(path.file_name().unwrap(), "Lineline_obj1.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(parse_features(&text).unwrap().groups.len(), 2);
    }
}
