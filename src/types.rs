use core::ops::Range;

/// Scroll direction along the list axis.
///
/// `Forward` moves toward index 0 (the offset decreases), `Backward` toward higher indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    #[default]
    Backward,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// An observed region: either a list item (by key) or one of the fixed slots around the list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Region<K> {
    /// The scroll container itself; its size is the viewport size.
    Client,
    Header,
    Footer,
    StickyHeader,
    StickyFooter,
    Item(K),
}

/// Position of an item along the scroll axis, including the header slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemPosition {
    pub top: f64,
    pub current: f64,
    pub bottom: f64,
}

/// What the renderer must materialize.
///
/// `render_begin..=render_end` is the index slice to render (empty when `item_count == 0`),
/// `virtual_size` the leading spacer and `total_size` the scrollable extent of the list
/// (slots excluded).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderDirective {
    pub render_begin: usize,
    pub render_end: usize,
    pub virtual_size: f64,
    pub total_size: f64,
    pub item_count: usize,
}

impl RenderDirective {
    /// The half-open index range to render.
    pub fn indices(&self) -> Range<usize> {
        if self.item_count == 0 {
            return 0..0;
        }
        let end = self.render_end.min(self.item_count - 1) + 1;
        self.render_begin.min(end)..end
    }

    pub fn is_empty(&self) -> bool {
        self.indices().is_empty()
    }
}

/// Progress of a best-effort scroll convergence loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeekStatus {
    #[default]
    Idle,
    Seeking,
    Converged,
    GaveUp,
}

/// Outbound notifications.
#[derive(Clone, Debug, PartialEq)]
pub enum VirtListEvent<K> {
    /// The render window or its geometry changed (or a refresh was forced).
    Render(RenderDirective),
    /// The strictly visible range was recomputed.
    RangeUpdate { begin: usize, end: usize },
    /// The offset came within the threshold of the top while scrolling toward it.
    ReachedTop(K),
    /// The offset came within the threshold of the bottom while scrolling toward it.
    ReachedBottom(K),
    ItemResize { key: K, size: f64 },
    /// Raw scroll passthrough (every scroll event reported by the host).
    Scroll { offset: f64 },
    /// The engine asks the host to move its scroll container to `offset`.
    ScrollTo { offset: f64 },
}
