//! The shared data model for every detector: a [`FeatureSet`] is an ordered list of
//! [`FeatureGroup`]s, where a group is a single point (a corner) or a start/end pair
//! (a line segment).

use nalgebra::Point2;
use std::fmt;
use std::slice::Iter;

/// Pixel coordinate of a feature, `(column, row)`.
pub type FeaturePoint = Point2<i32>;

/// Which kind of geometry a [`FeatureSet`] holds. Decides how it is drawn and labelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Corner,
    Line,
}

impl FeatureKind {
    /// Label used in exports and window titles.
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Corner => "Corner",
            FeatureKind::Line => "Line",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Corner" => Some(FeatureKind::Corner),
            "Line" => Some(FeatureKind::Line),
            _ => None,
        }
    }

    /// Whether `len` points form a valid group of this kind.
    pub fn accepts_group_len(self, len: usize) -> bool {
        match self {
            FeatureKind::Corner => len == 1,
            FeatureKind::Line => len > 0 && len % 2 == 0,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Point data of one detected entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureGroup {
    points: Vec<FeaturePoint>,
}

impl FeatureGroup {
    pub fn corner(at: FeaturePoint) -> Self {
        Self { points: vec![at] }
    }

    pub fn line(start: FeaturePoint, end: FeaturePoint) -> Self {
        Self {
            points: vec![start, end],
        }
    }

    pub fn from_points(points: Vec<FeaturePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[FeaturePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive `(start, end)` pairs. A trailing unpaired point is skipped.
    pub fn segments(&self) -> impl Iterator<Item = (FeaturePoint, FeaturePoint)> + '_ {
        self.points.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Ordered collection of feature groups produced by one detection run.
///
/// Insertion order is detection order. A set is replaced wholesale by each run, never
/// appended to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSet {
    kind: FeatureKind,
    groups: Vec<FeatureGroup>,
}

impl FeatureSet {
    pub fn empty(kind: FeatureKind) -> Self {
        Self {
            kind,
            groups: Vec::new(),
        }
    }

    /// Build a set from already-validated groups.
    ///
    /// # Panics
    ///
    /// In debug builds, when a group's length is not valid for `kind`.
    pub fn new(kind: FeatureKind, groups: Vec<FeatureGroup>) -> Self {
        debug_assert!(groups.iter().all(|g| kind.accepts_group_len(g.len())));
        Self { kind, groups }
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }

    pub fn iter(&self) -> Iter<'_, FeatureGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a FeatureGroup;
    type IntoIter = Iter<'a, FeatureGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Euclidean distance between two feature points, in pixels.
pub fn distance(p1: &FeaturePoint, p2: &FeaturePoint) -> f64 {
    nalgebra::distance(&p1.cast::<f64>(), &p2.cast::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (Point2::new(0, 0), Point2::new(3, 4)),
            (Point2::new(-7, 2), Point2::new(11, -5)),
            (Point2::new(10, 10), Point2::new(10, 100)),
        ];
        for (a, b) in pairs.iter() {
            assert_relative_eq!(distance(a, b), distance(b, a));
        }
        assert_relative_eq!(distance(&pairs[0].0, &pairs[0].1), 5.0);
        assert_relative_eq!(distance(&pairs[2].0, &pairs[2].1), 90.0);
    }

    #[test]
    fn group_lengths_per_kind() {
        assert!(FeatureKind::Corner.accepts_group_len(1));
        assert!(!FeatureKind::Corner.accepts_group_len(2));
        assert!(FeatureKind::Line.accepts_group_len(2));
        assert!(FeatureKind::Line.accepts_group_len(4));
        assert!(!FeatureKind::Line.accepts_group_len(3));
        assert!(!FeatureKind::Line.accepts_group_len(0));
    }

    #[test]
    fn segments_pair_up_points() {
        let group = FeatureGroup::from_points(vec![
            Point2::new(0, 0),
            Point2::new(1, 1),
            Point2::new(2, 2),
            Point2::new(3, 3),
        ]);
        let segs: Vec<_> = group.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1], (Point2::new(2, 2), Point2::new(3, 3)));
        assert_eq!(FeatureGroup::corner(Point2::new(5, 5)).segments().count(), 0);
    }

    #[test]
    fn labels_round_trip() {
        for kind in [FeatureKind::Corner, FeatureKind::Line].iter() {
            assert_eq!(FeatureKind::from_label(kind.label()), Some(*kind));
        }
        assert_eq!(FeatureKind::from_label("Edge"), None);
    }
}
