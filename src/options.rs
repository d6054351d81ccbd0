use std::sync::Arc;

use crate::{Axis, ConfigError, VirtListEvent};

/// Extracts the stable identity of an item. The engine never looks at anything else.
pub type ItemKeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Replaces the buffer-derived render window.
///
/// Receives the visible range `(in_view_begin, in_view_end)` (no buffer) and returns absolute
/// `(render_begin, render_end)` indices. The result is clamped to the list bounds.
pub type RenderControl = Arc<dyn Fn(usize, usize) -> (usize, usize) + Send + Sync>;

/// A callback receiving every outbound notification.
pub type EventCallback<K> = Arc<dyn Fn(&VirtListEvent<K>) + Send + Sync>;

/// Configuration for [`crate::VirtList`].
///
/// Cheap to clone: closures live in `Arc`s. Everything is resolved and validated once by
/// [`crate::VirtList::new`]; nothing falls back to defaults at read time.
pub struct VirtListOptions<T, K> {
    /// Required. Construction fails with [`ConfigError::MissingItemKey`] without it.
    pub item_key: Option<ItemKeyFn<T, K>>,
    /// Size assumed for items that have not been measured yet.
    pub min_size: f64,
    /// Fixed spacing added to the assumed size of unmeasured items.
    pub item_gap: f64,
    /// Every item is exactly `min_size + item_gap`; measurements are ignored.
    pub fixed: bool,

    /// Symmetric buffer (in items) around the visible range.
    pub buffer: usize,
    /// Items rendered above the visible range. A non-zero value wins over `buffer`.
    pub buffer_top: Option<usize>,
    /// Items rendered below the visible range. A non-zero value wins over `buffer`.
    pub buffer_bottom: Option<usize>,
    pub render_control: Option<RenderControl>,

    pub horizontal: bool,
    /// Distance from either end under which reached-top/bottom fires (at least 2).
    pub scroll_distance: f64,

    /// Scrolls to this index on construction when non-zero.
    pub initial_index: usize,
    /// Scrolls to this offset on construction when non-zero and `initial_index` is zero.
    pub initial_offset: f64,
    /// Viewport size used until the host reports a `Client` observation.
    pub client_size: f64,

    pub on_event: Option<EventCallback<K>>,

    /// Upper bound on items visited by one range walk. A walk that hits the cap keeps its
    /// progress and resumes on the next frame.
    pub max_walk_steps: usize,
    /// Offset jitter (in size units) ignored by the range walk.
    pub walk_tolerance: f64,

    /// Frame interval used to coalesce scroll events.
    pub frame_ms: u64,
    /// Debounce window for size observations.
    pub resize_debounce_ms: u64,
    /// Quiet period after the last scroll event before `is_scrolling` resets.
    pub is_scrolling_reset_delay_ms: u64,
    pub edge_retry_delay_ms: u64,
    pub max_edge_attempts: u32,
    pub max_index_seek_attempts: u32,
}

impl<T, K> Clone for VirtListOptions<T, K> {
    fn clone(&self) -> Self {
        Self {
            item_key: self.item_key.clone(),
            min_size: self.min_size,
            item_gap: self.item_gap,
            fixed: self.fixed,
            buffer: self.buffer,
            buffer_top: self.buffer_top,
            buffer_bottom: self.buffer_bottom,
            render_control: self.render_control.clone(),
            horizontal: self.horizontal,
            scroll_distance: self.scroll_distance,
            initial_index: self.initial_index,
            initial_offset: self.initial_offset,
            client_size: self.client_size,
            on_event: self.on_event.clone(),
            max_walk_steps: self.max_walk_steps,
            walk_tolerance: self.walk_tolerance,
            frame_ms: self.frame_ms,
            resize_debounce_ms: self.resize_debounce_ms,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            edge_retry_delay_ms: self.edge_retry_delay_ms,
            max_edge_attempts: self.max_edge_attempts,
            max_index_seek_attempts: self.max_index_seek_attempts,
        }
    }
}

impl<T, K> VirtListOptions<T, K> {
    /// Creates options without an item key accessor; set one with
    /// [`Self::with_item_key`] before constructing the list.
    pub fn new(min_size: f64) -> Self {
        Self {
            item_key: None,
            min_size,
            item_gap: 0.0,
            fixed: false,
            buffer: 0,
            buffer_top: None,
            buffer_bottom: None,
            render_control: None,
            horizontal: false,
            scroll_distance: 0.0,
            initial_index: 0,
            initial_offset: 0.0,
            client_size: 0.0,
            on_event: None,
            max_walk_steps: 50,
            walk_tolerance: 2.0,
            frame_ms: 16,
            resize_debounce_ms: 16,
            is_scrolling_reset_delay_ms: 150,
            edge_retry_delay_ms: 3,
            max_edge_attempts: 10,
            max_index_seek_attempts: 10,
        }
    }

    pub fn new_with_key(
        min_size: f64,
        item_key: impl Fn(&T) -> K + Send + Sync + 'static,
    ) -> Self {
        Self::new(min_size).with_item_key(item_key)
    }

    pub fn with_item_key(mut self, item_key: impl Fn(&T) -> K + Send + Sync + 'static) -> Self {
        self.item_key = Some(Arc::new(item_key));
        self
    }

    pub fn with_item_gap(mut self, item_gap: f64) -> Self {
        self.item_gap = item_gap;
        self
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_buffer_top(mut self, buffer_top: usize) -> Self {
        self.buffer_top = Some(buffer_top);
        self
    }

    pub fn with_buffer_bottom(mut self, buffer_bottom: usize) -> Self {
        self.buffer_bottom = Some(buffer_bottom);
        self
    }

    pub fn with_render_control(
        mut self,
        render_control: Option<impl Fn(usize, usize) -> (usize, usize) + Send + Sync + 'static>,
    ) -> Self {
        self.render_control = render_control.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_scroll_distance(mut self, scroll_distance: f64) -> Self {
        self.scroll_distance = scroll_distance;
        self
    }

    pub fn with_initial_index(mut self, index: usize) -> Self {
        self.initial_index = index;
        self
    }

    pub fn with_initial_offset(mut self, offset: f64) -> Self {
        self.initial_offset = offset;
        self
    }

    pub fn with_client_size(mut self, client_size: f64) -> Self {
        self.client_size = client_size;
        self
    }

    pub fn with_on_event(
        mut self,
        on_event: Option<impl Fn(&VirtListEvent<K>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_event = on_event.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_max_walk_steps(mut self, steps: usize) -> Self {
        self.max_walk_steps = steps;
        self
    }

    pub fn with_walk_tolerance(mut self, tolerance: f64) -> Self {
        self.walk_tolerance = tolerance;
        self
    }

    pub fn with_frame_ms(mut self, frame_ms: u64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    pub fn with_resize_debounce_ms(mut self, delay_ms: u64) -> Self {
        self.resize_debounce_ms = delay_ms;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_edge_retry(mut self, delay_ms: u64, max_attempts: u32) -> Self {
        self.edge_retry_delay_ms = delay_ms;
        self.max_edge_attempts = max_attempts;
        self
    }

    pub fn with_max_index_seek_attempts(mut self, max_attempts: u32) -> Self {
        self.max_index_seek_attempts = max_attempts;
        self
    }

    pub(crate) fn resolve(self) -> Result<VirtListConfig<T, K>, ConfigError> {
        let item_key = self.item_key.ok_or(ConfigError::MissingItemKey)?;
        if !(self.min_size.is_finite() && self.min_size > 0.0) {
            return Err(ConfigError::InvalidMinSize(self.min_size));
        }
        if !(self.item_gap.is_finite() && self.item_gap >= 0.0) {
            return Err(ConfigError::InvalidItemGap(self.item_gap));
        }
        if !(self.scroll_distance.is_finite() && self.scroll_distance >= 0.0) {
            return Err(ConfigError::InvalidScrollDistance(self.scroll_distance));
        }
        if !(self.client_size.is_finite() && self.client_size >= 0.0) {
            return Err(ConfigError::InvalidClientSize(self.client_size));
        }
        if !(self.walk_tolerance.is_finite() && self.walk_tolerance >= 0.0) {
            return Err(ConfigError::InvalidWalkTolerance(self.walk_tolerance));
        }
        if self.max_walk_steps == 0 {
            return Err(ConfigError::ZeroWalkSteps);
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }

        let buffer_top = self.buffer_top.filter(|&n| n > 0).unwrap_or(self.buffer);
        let buffer_bottom = self.buffer_bottom.filter(|&n| n > 0).unwrap_or(self.buffer);

        Ok(VirtListConfig {
            item_key,
            min_size: self.min_size,
            item_gap: self.item_gap,
            fixed: self.fixed,
            buffer_top,
            buffer_bottom,
            render_control: self.render_control,
            axis: if self.horizontal {
                Axis::Horizontal
            } else {
                Axis::Vertical
            },
            // Anything under 2 units is treated as float noise.
            edge_threshold: self.scroll_distance.max(2.0),
            initial_index: self.initial_index,
            initial_offset: self.initial_offset.max(0.0),
            client_size: self.client_size,
            on_event: self.on_event,
            max_walk_steps: self.max_walk_steps,
            walk_tolerance: self.walk_tolerance,
            frame_ms: self.frame_ms,
            resize_debounce_ms: self.resize_debounce_ms,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            edge_retry_delay_ms: self.edge_retry_delay_ms,
            max_edge_attempts: self.max_edge_attempts.max(1),
            max_index_seek_attempts: self.max_index_seek_attempts.max(1),
        })
    }
}

impl<T, K> core::fmt::Debug for VirtListOptions<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtListOptions")
            .field("has_item_key", &self.item_key.is_some())
            .field("min_size", &self.min_size)
            .field("item_gap", &self.item_gap)
            .field("fixed", &self.fixed)
            .field("buffer", &self.buffer)
            .field("buffer_top", &self.buffer_top)
            .field("buffer_bottom", &self.buffer_bottom)
            .field("horizontal", &self.horizontal)
            .field("scroll_distance", &self.scroll_distance)
            .field("initial_index", &self.initial_index)
            .field("initial_offset", &self.initial_offset)
            .field("client_size", &self.client_size)
            .field("max_walk_steps", &self.max_walk_steps)
            .finish_non_exhaustive()
    }
}

/// Fully resolved configuration of a live [`crate::VirtList`].
pub struct VirtListConfig<T, K> {
    pub(crate) item_key: ItemKeyFn<T, K>,
    pub(crate) min_size: f64,
    pub(crate) item_gap: f64,
    pub(crate) fixed: bool,
    pub(crate) buffer_top: usize,
    pub(crate) buffer_bottom: usize,
    pub(crate) render_control: Option<RenderControl>,
    pub(crate) axis: Axis,
    pub(crate) edge_threshold: f64,
    pub(crate) initial_index: usize,
    pub(crate) initial_offset: f64,
    pub(crate) client_size: f64,
    pub(crate) on_event: Option<EventCallback<K>>,
    pub(crate) max_walk_steps: usize,
    pub(crate) walk_tolerance: f64,
    pub(crate) frame_ms: u64,
    pub(crate) resize_debounce_ms: u64,
    pub(crate) is_scrolling_reset_delay_ms: u64,
    pub(crate) edge_retry_delay_ms: u64,
    pub(crate) max_edge_attempts: u32,
    pub(crate) max_index_seek_attempts: u32,
}

impl<T, K> VirtListConfig<T, K> {
    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn item_gap(&self) -> f64 {
        self.item_gap
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn buffer_top(&self) -> usize {
        self.buffer_top
    }

    pub fn buffer_bottom(&self) -> usize {
        self.buffer_bottom
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The effective reached-top/bottom threshold.
    pub fn edge_threshold(&self) -> f64 {
        self.edge_threshold
    }

    pub fn max_walk_steps(&self) -> usize {
        self.max_walk_steps
    }
}

impl<T, K> Clone for VirtListConfig<T, K> {
    fn clone(&self) -> Self {
        Self {
            item_key: Arc::clone(&self.item_key),
            min_size: self.min_size,
            item_gap: self.item_gap,
            fixed: self.fixed,
            buffer_top: self.buffer_top,
            buffer_bottom: self.buffer_bottom,
            render_control: self.render_control.clone(),
            axis: self.axis,
            edge_threshold: self.edge_threshold,
            initial_index: self.initial_index,
            initial_offset: self.initial_offset,
            client_size: self.client_size,
            on_event: self.on_event.clone(),
            max_walk_steps: self.max_walk_steps,
            walk_tolerance: self.walk_tolerance,
            frame_ms: self.frame_ms,
            resize_debounce_ms: self.resize_debounce_ms,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            edge_retry_delay_ms: self.edge_retry_delay_ms,
            max_edge_attempts: self.max_edge_attempts,
            max_index_seek_attempts: self.max_index_seek_attempts,
        }
    }
}

impl<T, K> core::fmt::Debug for VirtListConfig<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtListConfig")
            .field("min_size", &self.min_size)
            .field("item_gap", &self.item_gap)
            .field("fixed", &self.fixed)
            .field("buffer_top", &self.buffer_top)
            .field("buffer_bottom", &self.buffer_bottom)
            .field("has_render_control", &self.render_control.is_some())
            .field("axis", &self.axis)
            .field("edge_threshold", &self.edge_threshold)
            .field("max_walk_steps", &self.max_walk_steps)
            .field("walk_tolerance", &self.walk_tolerance)
            .field("frame_ms", &self.frame_ms)
            .field("resize_debounce_ms", &self.resize_debounce_ms)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .finish_non_exhaustive()
    }
}
