//! Obstacle sources: the single capability the swept resolver needs from the world.
//!
//! A source answers "which solid boxes are near this region". It may return boxes that do not
//! actually touch the region (callers clip exactly), but must not omit boxes that do.
//!
//! Mesh-derived boxes, voxels and native collider worlds all implement the same trait, so the
//! resolver never needs to know where geometry came from. Sources are read-only during a tick;
//! implement `Sync` sources to integrate actors on several threads.

use super::types::Aabb;

/// Region query over solid world geometry.
pub trait ObstacleSource {
    /// Append every obstacle that may intersect `region` to `out`.
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>);

    /// Convenience wrapper around [`ObstacleSource::collect`].
    fn query(&self, region: &Aabb) -> Vec<Aabb> {
        let mut out = Vec::new();
        self.collect(region, &mut out);
        out
    }
}

/// An empty world.
impl ObstacleSource for () {
    fn collect(&self, _region: &Aabb, _out: &mut Vec<Aabb>) {}
}

/// A plain list of boxes, scanned linearly.
impl ObstacleSource for [Aabb] {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        out.extend(self.iter().filter(|b| overlaps_closed(b, region)).copied());
    }
}

impl ObstacleSource for Vec<Aabb> {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        self.as_slice().collect(region, out);
    }
}

impl<T: ObstacleSource + ?Sized> ObstacleSource for &T {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        (**self).collect(region, out);
    }
}

/// A missing source is treated as open space; movement is never blocked by an unavailable world.
impl<T: ObstacleSource> ObstacleSource for Option<T> {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        if let Some(source) = self {
            source.collect(region, out);
        }
    }
}

/// Immutable set of static boxes with a cached enclosing bound.
///
/// Queries far from the set return immediately without scanning.
#[derive(Clone, Debug, Default)]
pub struct StaticBoxes {
    boxes: Vec<Aabb>,
    bounds: Option<Aabb>,
}

impl StaticBoxes {
    pub fn new(boxes: Vec<Aabb>) -> Self {
        let bounds = boxes.iter().copied().reduce(|acc, b| acc.union(&b));
        Self { boxes, bounds }
    }

    #[inline]
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// Union of all boxes, `None` when empty.
    #[inline]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl FromIterator<Aabb> for StaticBoxes {
    fn from_iter<I: IntoIterator<Item = Aabb>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ObstacleSource for StaticBoxes {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        match &self.bounds {
            Some(bounds) if overlaps_closed(bounds, region) => self.boxes.collect(region, out),
            _ => {}
        }
    }
}

/// Two sources queried as one (e.g. decomposed mesh boxes on top of world voxels).
#[derive(Clone, Debug, Default)]
pub struct Layered<A, B> {
    pub base: A,
    pub overlay: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(base: A, overlay: B) -> Self {
        Self { base, overlay }
    }
}

impl<A: ObstacleSource, B: ObstacleSource> ObstacleSource for Layered<A, B> {
    fn collect(&self, region: &Aabb, out: &mut Vec<Aabb>) {
        self.base.collect(region, out);
        self.overlay.collect(region, out);
    }
}

/// Closed-interval overlap, used for candidate filtering (touching boxes are still candidates).
#[inline]
pub fn overlaps_closed(a: &Aabb, b: &Aabb) -> bool {
    (0..3).all(|i| a.min[i] <= b.max[i] && a.max[i] >= b.min[i])
}
