//! Per-cell records of the raster searches, with their bit-packed tags.

/// Predecessor and state bits of a [`PathNode`].
///
/// Layout: bits 0..=2 predecessor neighbour index (into
/// [`crate::grid::NEIGHBORS`]), bit 3 has-predecessor, bit 4 finalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeTag(u8);

impl NodeTag {
    const PRED_MASK: u8 = 0b0000_0111;
    const HAS_PRED: u8 = 1 << 3;
    const FINALIZED: u8 = 1 << 4;

    #[inline]
    pub fn predecessor(self) -> Option<usize> {
        (self.0 & Self::HAS_PRED != 0).then_some((self.0 & Self::PRED_MASK) as usize)
    }

    #[inline]
    pub fn set_predecessor(&mut self, neighbor: usize) {
        debug_assert!(neighbor < 8);
        self.0 = (self.0 & !Self::PRED_MASK) | Self::HAS_PRED | neighbor as u8;
    }

    #[inline]
    pub fn is_finalized(self) -> bool {
        self.0 & Self::FINALIZED != 0
    }

    #[inline]
    pub fn set_finalized(&mut self) {
        self.0 |= Self::FINALIZED;
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

/// Node of the gradient-path search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathNode {
    /// Directional derivative normalized to `[-1, 1]`.
    pub deriv: f32,
    /// Best known path cost; `f32::MAX` until relaxed.
    pub cost: f32,
    /// Position in the priority queue or [`PathNode::NOT_QUEUED`].
    pub heap_idx: u32,
    pub tag: NodeTag,
}

impl PathNode {
    pub const NOT_QUEUED: u32 = u32::MAX;

    pub fn new(deriv: f32) -> Self {
        Self {
            deriv,
            cost: f32::MAX,
            heap_idx: Self::NOT_QUEUED,
            tag: NodeTag::default(),
        }
    }

    /// Border node that the search never enters.
    pub fn border() -> Self {
        let mut node = Self::new(0.0);
        node.tag.set_finalized();
        node
    }

    #[inline]
    pub fn is_queued(&self) -> bool {
        self.heap_idx != Self::NOT_QUEUED
    }
}

/// Cell of the region-growing search packed into one word.
///
/// Layout: bits 0..=22 region label (0 = unlabeled), bit 23 finalized,
/// bits 24..=31 gray level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionCell(u32);

impl RegionCell {
    const LABEL_MASK: u32 = (1 << 23) - 1;
    const FINALIZED: u32 = 1 << 23;
    const GRAY_SHIFT: u32 = 24;

    /// Largest label that fits the layout.
    pub const MAX_LABEL: u32 = Self::LABEL_MASK;

    pub fn new(gray: u8) -> Self {
        Self((gray as u32) << Self::GRAY_SHIFT)
    }

    /// Border cell: finalized, unlabeled, gray 0.
    pub fn border() -> Self {
        Self(Self::FINALIZED)
    }

    #[inline]
    pub fn label(self) -> u32 {
        self.0 & Self::LABEL_MASK
    }

    #[inline]
    pub fn set_label(&mut self, label: u32) {
        debug_assert!(label <= Self::MAX_LABEL);
        self.0 = (self.0 & !Self::LABEL_MASK) | (label & Self::LABEL_MASK);
    }

    #[inline]
    pub fn is_finalized(self) -> bool {
        self.0 & Self::FINALIZED != 0
    }

    #[inline]
    pub fn set_finalized(&mut self) {
        self.0 |= Self::FINALIZED;
    }

    #[inline]
    pub fn gray(self) -> u8 {
        (self.0 >> Self::GRAY_SHIFT) as u8
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_tag_layout() {
        let mut tag = NodeTag::default();
        assert_eq!(tag.predecessor(), None);
        tag.set_predecessor(5);
        assert_eq!(tag.bits(), 0b0000_1101);
        tag.set_finalized();
        tag.set_predecessor(2);
        assert_eq!(tag.predecessor(), Some(2));
        assert_eq!(tag.bits(), 0b0001_1010);
        assert!(tag.is_finalized());
    }

    #[test]
    fn region_cell_layout() {
        let mut cell = RegionCell::new(0xAB);
        cell.set_label(RegionCell::MAX_LABEL);
        cell.set_finalized();
        assert_eq!(cell.raw(), 0xABFF_FFFF);
        cell.set_label(3);
        assert_eq!(cell.label(), 3);
        assert_eq!(cell.gray(), 0xAB);
        assert!(cell.is_finalized());
        assert_eq!(RegionCell::border().raw(), 1 << 23);
    }
}
