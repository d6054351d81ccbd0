use crate::buffer;
use crate::key::{self, KeyCacheKey, KeyIndexMap};
use crate::options::VirtListConfig;
use crate::range::{self, RangeCalculator, RangeInput};
use crate::scheduler::{Scheduler, Task};
use crate::scroll::{EdgeSeek, IndexSeek};
use crate::size_store::SizeStore;
use crate::{
    ConfigError, ReactiveState, Region, RenderDirective, ScrollDirection, SeekStatus, SlotSizes,
    VirtListEvent, VirtListOptions,
};

/// Flags gating the automatic top correction applied after a size batch.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Correction {
    /// The visible begin moved toward index 0 since the last correction.
    pub(crate) fix_offset: bool,
    /// A prefix insert asked for the next batch to be corrected.
    pub(crate) force_fix_offset: bool,
    /// A programmatic scroll vetoes the next correction; cleared after every batch.
    pub(crate) abort: bool,
}

/// A headless virtual list.
///
/// One instance owns all of its state: the size store, the visible/render window, the slot
/// sizes and the pending deferred work. The host drives it with:
/// - scroll offsets ([`VirtList::on_scroll`])
/// - size observations ([`VirtList::observe`])
/// - list mutations ([`VirtList::set_list`], [`VirtList::added_list_to_top`], ...)
/// - the clock ([`VirtList::advance`])
///
/// and receives [`VirtListEvent`]s through the configured callback. Every render directive is
/// published only after the offset, the visible range and the render window agree.
pub struct VirtList<T, K> {
    pub(crate) config: VirtListConfig<T, K>,
    pub(crate) state: ReactiveState,
    pub(crate) slots: SlotSizes,
    pub(crate) keys: Vec<K>,
    pub(crate) positions: KeyIndexMap<K>,
    pub(crate) sizes: SizeStore<K>,
    pub(crate) range: RangeCalculator,
    pub(crate) scheduler: Scheduler,
    pub(crate) direction: ScrollDirection,
    pub(crate) is_scrolling: bool,
    pub(crate) correction: Correction,
    pub(crate) index_seek: IndexSeek,
    pub(crate) edge_seek: EdgeSeek,
    pub(crate) pending: Vec<(Region<K>, f64)>,
    published: Option<RenderDirective>,
}

impl<T, K: KeyCacheKey> VirtList<T, K> {
    /// Validates `options` and builds a list over `items`.
    ///
    /// The initial range and render directive are published before this returns, followed by
    /// the initial index/offset navigation if one was configured.
    pub fn new(options: VirtListOptions<T, K>, items: &[T]) -> Result<Self, ConfigError> {
        let config = options.resolve()?;
        let keys: Vec<K> = items.iter().map(|item| (config.item_key)(item)).collect();
        let sizes = SizeStore::new(config.min_size, config.item_gap, config.fixed);

        let mut state = ReactiveState {
            buffer_top: config.buffer_top,
            buffer_bottom: config.buffer_bottom,
            views: range::calc_views(config.client_size, config.min_size, config.item_gap),
            ..ReactiveState::default()
        };
        state.list_total_size = sizes.total_size(&keys);
        let slots = SlotSizes {
            client_size: config.client_size,
            ..SlotSizes::default()
        };

        vdebug!(
            len = keys.len(),
            min_size = config.min_size,
            views = state.views,
            buffer_top = config.buffer_top,
            buffer_bottom = config.buffer_bottom,
            "VirtList::new"
        );

        let mut list = Self {
            config,
            state,
            slots,
            positions: key::index_keys(&keys),
            keys,
            sizes,
            range: RangeCalculator::default(),
            scheduler: Scheduler::default(),
            direction: ScrollDirection::default(),
            is_scrolling: false,
            correction: Correction::default(),
            index_seek: IndexSeek::default(),
            edge_seek: EdgeSeek::default(),
            pending: Vec::new(),
            published: None,
        };
        list.update_range(0);
        list.rebuild_window();

        if list.config.initial_index > 0 {
            list.scroll_to_index(list.config.initial_index);
        } else if list.config.initial_offset > 0.0 {
            list.scroll_to_offset(list.config.initial_offset);
        }
        Ok(list)
    }

    pub fn config(&self) -> &VirtListConfig<T, K> {
        &self.config
    }

    pub fn state(&self) -> &ReactiveState {
        &self.state
    }

    pub fn slot_sizes(&self) -> &SlotSizes {
        &self.slots
    }

    pub fn size_store(&self) -> &SizeStore<K> {
        &self.sizes
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current scroll offset along the list axis.
    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    /// Header + footer + sticky header + sticky footer.
    pub fn get_slot_size(&self) -> f64 {
        self.slots.total()
    }

    /// Scrollable extent: every item plus every slot.
    pub fn total_size(&self) -> f64 {
        self.state.list_total_size + self.slots.total()
    }

    /// Largest offset a scroll container of the current viewport size can reach.
    pub fn max_offset(&self) -> f64 {
        (self.total_size() - self.slots.client_size).max(0.0)
    }

    /// The stored size for `key`, or `min_size + item_gap` if it was never measured.
    pub fn get_item_size(&self, key: &K) -> f64 {
        self.sizes.get(key)
    }

    pub fn render_directive(&self) -> RenderDirective {
        RenderDirective {
            render_begin: self.state.render_begin,
            render_end: self.state.render_end,
            virtual_size: self.state.virtual_size,
            total_size: self.state.list_total_size,
            item_count: self.keys.len(),
        }
    }

    pub fn index_seek_status(&self) -> SeekStatus {
        self.index_seek.status()
    }

    pub fn edge_seek_status(&self) -> SeekStatus {
        self.edge_seek.status()
    }

    /// The engine's clock, as last advanced by the host.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    /// When the next deferred task is due, if any. Hosts call [`Self::advance`] at or after it.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Runs every deferred task due at or before `now_ms`, in due order.
    pub fn advance(&mut self, now_ms: u64) {
        while let Some(task) = self.scheduler.pop_due(now_ms) {
            self.run_task(task);
        }
        self.scheduler.set_now(now_ms);
    }

    /// Reports a scroll position from the viewport.
    ///
    /// The range recompute is deferred to the next frame so that bursts of scroll events
    /// collapse into one pass. The scrolling flag stays set until the events go quiet.
    pub fn on_scroll(&mut self, offset: f64, now_ms: u64) {
        self.advance(now_ms);
        self.emit(VirtListEvent::Scroll { offset });
        if offset == self.state.offset || !offset.is_finite() {
            return;
        }

        self.is_scrolling = true;
        self.direction = if offset < self.state.offset {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Backward
        };
        self.state.offset = offset;
        vtrace!(offset, direction = ?self.direction, "VirtList::on_scroll");

        self.scheduler.throttle(Task::Frame, self.config.frame_ms);
        self.scheduler
            .debounce(Task::ScrollSettle, self.config.is_scrolling_reset_delay_ms);
    }

    /// Republishes the render directive even if nothing changed.
    pub fn force_refresh(&mut self) {
        self.range.invalidate();
        self.replan(true);
    }

    /// Renders `[begin, end]` directly, bypassing buffer planning until the next range change.
    pub fn manual_render(&mut self, begin: usize, end: usize) {
        if self.keys.is_empty() {
            self.force_refresh();
            return;
        }
        let last = self.keys.len() - 1;
        let begin = begin.min(last);
        let end = end.min(last).max(begin);
        self.state.render_begin = begin;
        self.state.render_end = end;
        buffer::resync_virtual_size(&mut self.state, &self.keys, &self.sizes);
        self.publish(true);
    }

    /// Re-enters after the host kept the list alive while hidden.
    ///
    /// Drops the range cache and recomputes the window for the current offset.
    pub fn reactivate(&mut self) {
        vdebug!(offset = self.state.offset, "VirtList::reactivate");
        self.range.invalidate();
        if self.state.offset > 0.0 {
            self.refresh_walk(usize::MAX);
        } else {
            self.update_range(0);
        }
        self.replan(true);
    }

    /// Releases everything tied to the host view: pending work, measurements and slot sizes.
    ///
    /// The list itself and the last published window are kept.
    pub fn teardown(&mut self) {
        vdebug!("VirtList::teardown");
        self.scheduler.clear();
        self.pending.clear();
        self.sizes.clear();
        self.state.list_total_size = self.sizes.total_size(&self.keys);
        buffer::resync_virtual_size(&mut self.state, &self.keys, &self.sizes);
        self.slots = SlotSizes::default();
        self.range.invalidate();
        self.index_seek.cancel();
        self.edge_seek.cancel();
        self.is_scrolling = false;
        self.correction = Correction::default();
    }

    pub(crate) fn emit(&self, event: VirtListEvent<K>) {
        if let Some(on_event) = &self.config.on_event {
            on_event(&event);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Frame => self.refresh(),
            Task::FlushSizes => self.flush_observations(),
            Task::ScrollSettle => {
                vtrace!("scrolling settled");
                self.is_scrolling = false;
            }
            Task::EdgeRetry => self.retry_edge(),
        }
    }

    /// Offset → visible range → render window → publish, for the current offset.
    ///
    /// Scroll events walk at most `max_walk_steps` items per frame.
    pub(crate) fn refresh(&mut self) {
        self.refresh_walk(self.config.max_walk_steps);
    }

    /// [`Self::refresh`] with an explicit walk cap. Programmatic moves pass `usize::MAX` so the
    /// window lands on the target in one call.
    pub(crate) fn refresh_walk(&mut self, max_steps: usize) {
        let step = self.range.calc(
            &self.state,
            &RangeInput {
                offset: self.state.offset,
                header_size: self.slots.header_size,
                direction: self.direction,
                keys: &self.keys,
                sizes: &self.sizes,
                tolerance: self.config.walk_tolerance,
                max_steps,
            },
        );
        if step.clear_fix_offset {
            self.correction.fix_offset = false;
        }
        if let Some(begin) = step.begin {
            self.update_range(begin);
        }
        self.replan(false);
        self.judge_position();
        if step.exhausted {
            self.scheduler.throttle(Task::Frame, self.config.frame_ms);
        }
    }

    /// Sets the visible begin, deriving the end from `views`.
    pub(crate) fn update_range(&mut self, start: usize) {
        if range::update_range(&mut self.state, self.keys.len(), start) {
            self.correction.fix_offset = true;
        }
        self.emit(VirtListEvent::RangeUpdate {
            begin: self.state.in_view_begin,
            end: self.state.in_view_end,
        });
    }

    /// Re-plans the render window incrementally and publishes it if anything moved.
    pub(crate) fn replan(&mut self, force: bool) {
        if self.keys.is_empty() {
            self.clear_window();
        } else {
            let (begin, end) = buffer::plan(
                &self.state,
                self.keys.len(),
                self.config.render_control.as_ref(),
            );
            buffer::apply_window(&mut self.state, &self.keys, &self.sizes, begin, end);
        }
        self.publish(force);
    }

    /// Re-plans the render window after a structural change and always publishes.
    pub(crate) fn rebuild_window(&mut self) {
        if self.keys.is_empty() {
            self.clear_window();
        } else {
            let (begin, end) = buffer::plan(
                &self.state,
                self.keys.len(),
                self.config.render_control.as_ref(),
            );
            self.state.render_begin = begin;
            self.state.render_end = end;
            buffer::resync_virtual_size(&mut self.state, &self.keys, &self.sizes);
        }
        self.publish(true);
    }

    fn clear_window(&mut self) {
        self.state.render_begin = 0;
        self.state.render_end = 0;
        self.state.virtual_size = 0.0;
    }

    fn publish(&mut self, force: bool) {
        let directive = self.render_directive();
        if !force && self.published == Some(directive) {
            return;
        }
        self.published = Some(directive);
        vtrace!(
            render_begin = directive.render_begin,
            render_end = directive.render_end,
            virtual_size = directive.virtual_size,
            total_size = directive.total_size,
            force,
            "publish render"
        );
        self.emit(VirtListEvent::Render(directive));
    }

    /// Emits reached-top/bottom for the current offset and direction.
    fn judge_position(&self) {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return;
        };
        let threshold = self.config.edge_threshold;
        match self.direction {
            ScrollDirection::Forward => {
                if self.state.offset - threshold <= 0.0 {
                    self.emit(VirtListEvent::ReachedTop(first.clone()));
                }
            }
            ScrollDirection::Backward => {
                let scrolled = (self.state.offset + self.slots.client_size).round();
                let distance = (self.total_size() - scrolled).round();
                if distance <= threshold {
                    self.emit(VirtListEvent::ReachedBottom(last.clone()));
                }
            }
        }
    }
}

impl<T, K: core::fmt::Debug> core::fmt::Debug for VirtList<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtList")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("slots", &self.slots)
            .field("len", &self.keys.len())
            .field("direction", &self.direction)
            .field("is_scrolling", &self.is_scrolling)
            .field("index_seek", &self.index_seek)
            .field("edge_seek", &self.edge_seek)
            .finish_non_exhaustive()
    }
}
