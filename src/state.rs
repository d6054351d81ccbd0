/// The engine's visible state for one list instance.
///
/// Invariants, restored before every render publish (for a non-empty list):
/// - `render_begin <= in_view_begin <= in_view_end <= render_end < len` (unless a render
///   override widened or narrowed the window)
/// - `virtual_size` is the exact size of items `[0, render_begin)`
/// - `list_total_size` is the exact size of all items
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactiveState {
    /// Items that fit in the viewport without buffer.
    pub views: usize,
    pub offset: f64,
    /// Sum of all item sizes; header/footer/sticky slots are excluded.
    pub list_total_size: f64,
    /// Size of everything before `render_begin`.
    pub virtual_size: f64,
    pub in_view_begin: usize,
    pub in_view_end: usize,
    pub render_begin: usize,
    pub render_end: usize,
    pub buffer_top: usize,
    pub buffer_bottom: usize,
}

/// Sizes of the viewport and the non-list regions around the list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotSizes {
    pub client_size: f64,
    pub header_size: f64,
    pub footer_size: f64,
    pub sticky_header_size: f64,
    pub sticky_footer_size: f64,
}

impl SlotSizes {
    /// Header + footer + sticky header + sticky footer (the viewport is not a slot).
    pub fn total(&self) -> f64 {
        self.header_size + self.footer_size + self.sticky_header_size + self.sticky_footer_size
    }
}
