//! Imperative navigation.
//!
//! Item positions past the measured region are estimates, so navigation converges instead of
//! jumping once:
//! - [`IndexSeek`] re-scrolls to the target item after every size batch until its top stops
//!   moving.
//! - [`EdgeSeek`] re-checks the offset a few milliseconds after each scroll to the top or
//!   bottom and retries until it sticks.
//!
//! Both give up silently after a bounded number of attempts.

use crate::key::KeyCacheKey;
use crate::scheduler::Task;
use crate::{ItemPosition, ScrollDirection, SeekStatus, VirtList};

/// Positions closer than this are considered stable.
const SEEK_EPSILON: f64 = 0.5;
/// Rounding slack accepted when checking that the bottom was reached.
const BOTTOM_SLACK: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct IndexSeek {
    target: usize,
    last_top: f64,
    attempts: u32,
    status: SeekStatus,
}

impl IndexSeek {
    pub(crate) fn status(&self) -> SeekStatus {
        self.status
    }

    pub(crate) fn is_seeking(&self) -> bool {
        self.status == SeekStatus::Seeking
    }

    pub(crate) fn cancel(&mut self) {
        if self.is_seeking() {
            self.status = SeekStatus::Idle;
        }
    }

    fn start(target: usize, top: f64) -> Self {
        Self {
            target,
            last_top: top,
            attempts: 1,
            status: SeekStatus::Seeking,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Edge {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EdgeSeek {
    edge: Option<Edge>,
    attempts: u32,
    status: SeekStatus,
}

impl EdgeSeek {
    pub(crate) fn status(&self) -> SeekStatus {
        self.status
    }

    pub(crate) fn is_seeking(&self) -> bool {
        self.status == SeekStatus::Seeking
    }

    pub(crate) fn cancel(&mut self) {
        if self.is_seeking() {
            self.status = SeekStatus::Idle;
        }
    }
}

impl<T, K: KeyCacheKey> VirtList<T, K> {
    /// Position of item `index`, header included. Indices past the end are measured as if the
    /// list continued with unmeasured items.
    pub fn get_item_pos_by_index(&self, index: usize) -> ItemPosition {
        let top = self.slots.header_size + self.sizes.range_size(&self.keys, 0, index);
        let current = match self.keys.get(index) {
            Some(key) => self.sizes.get(key),
            None => self.sizes.default_size(),
        };
        ItemPosition {
            top,
            current,
            bottom: top + current,
        }
    }

    /// Scrolls to `offset`, clamped to `[0, max_offset()]`.
    ///
    /// Cancels any pending index/edge seek and vetoes the next automatic top correction.
    pub fn scroll_to_offset(&mut self, offset: f64) {
        self.index_seek.cancel();
        self.cancel_edge_seek();
        self.scroll_vetoing_correction(offset);
    }

    /// Scrolls so that item `index` sits at the top of the viewport.
    ///
    /// The target is re-computed and re-scrolled after every size batch until its position
    /// is stable. The last item (or anything past it) routes to [`Self::scroll_to_bottom`].
    pub fn scroll_to_index(&mut self, index: usize) {
        let len = self.keys.len();
        if len == 0 {
            return;
        }
        if index >= len - 1 {
            self.scroll_to_bottom();
            return;
        }
        self.cancel_edge_seek();
        let top = self.get_item_pos_by_index(index).top;
        vdebug!(index, top, "VirtList::scroll_to_index");
        self.index_seek = IndexSeek::start(index, top);
        self.scroll_to_item_top(index, top);
    }

    /// Scrolls the minimal amount needed to reveal item `index`.
    ///
    /// A partially visible item is nudged into view; an item entirely outside the viewport is
    /// delegated to [`Self::scroll_to_index`]; a fully visible item is left alone.
    pub fn scroll_into_view(&mut self, index: usize) {
        if index >= self.keys.len() {
            self.scroll_to_index(index);
            return;
        }
        let pos = self.get_item_pos_by_index(index);
        let client = self.slots.client_size;
        let sticky = self.slots.sticky_header_size;
        let view_min = self.state.offset;
        let view_max = view_min + client;

        if pos.top < view_min && view_min < pos.bottom && pos.current < client {
            // Top edge hidden above the viewport.
            self.scroll_to_offset(pos.top);
        } else if pos.top + sticky < view_max
            && view_max < pos.bottom + sticky
            && pos.current < client
        {
            // Bottom edge hidden below the viewport.
            self.scroll_to_offset(pos.bottom - client + sticky);
        } else if pos.top + sticky >= view_max || pos.bottom <= view_min {
            self.scroll_to_index(index);
        }
    }

    /// Scrolls to offset 0, re-checking until it sticks.
    pub fn scroll_to_top(&mut self) {
        self.start_edge_seek(Edge::Top);
    }

    /// Scrolls to the end of the list, re-checking until the offset stays at the bottom while
    /// late measurements grow the list.
    pub fn scroll_to_bottom(&mut self) {
        self.start_edge_seek(Edge::Bottom);
    }

    fn start_edge_seek(&mut self, edge: Edge) {
        self.index_seek.cancel();
        vdebug!(edge = ?edge, "edge seek started");
        self.edge_seek = EdgeSeek {
            edge: Some(edge),
            attempts: 0,
            status: SeekStatus::Seeking,
        };
        self.edge_attempt();
    }

    fn edge_attempt(&mut self) {
        let Some(edge) = self.edge_seek.edge else {
            return;
        };
        self.edge_seek.attempts += 1;
        let target = match edge {
            Edge::Top => 0.0,
            Edge::Bottom => self.total_size(),
        };
        self.scroll_vetoing_correction(target);
        self.scheduler
            .debounce(Task::EdgeRetry, self.config.edge_retry_delay_ms);
    }

    pub(crate) fn retry_edge(&mut self) {
        if !self.edge_seek.is_seeking() {
            return;
        }
        let Some(edge) = self.edge_seek.edge else {
            return;
        };
        let settled = match edge {
            Edge::Top => self.state.offset <= 0.0,
            Edge::Bottom => {
                let reached = (self.state.offset + self.slots.client_size).round();
                (reached - self.total_size().round()).abs() <= BOTTOM_SLACK
                    || (self.state.offset - self.max_offset()).abs() <= BOTTOM_SLACK
            }
        };
        if settled {
            vdebug!(edge = ?edge, attempts = self.edge_seek.attempts, "edge seek converged");
            self.edge_seek.status = SeekStatus::Converged;
        } else if self.edge_seek.attempts >= self.config.max_edge_attempts {
            vwarn!(
                edge = ?edge,
                offset = self.state.offset,
                attempts = self.edge_seek.attempts,
                "edge seek gave up"
            );
            self.edge_seek.status = SeekStatus::GaveUp;
        } else {
            self.edge_attempt();
        }
    }

    fn cancel_edge_seek(&mut self) {
        if self.edge_seek.is_seeking() {
            self.edge_seek.cancel();
            self.scheduler.cancel(Task::EdgeRetry);
        }
    }

    /// Runs after each size batch: re-scrolls to the seek target and checks for convergence.
    pub(crate) fn settle_index_seek(&mut self) {
        if !self.index_seek.is_seeking() {
            return;
        }
        let target = self.index_seek.target;
        if target >= self.keys.len() {
            vwarn!(target, len = self.keys.len(), "index seek target left the list");
            self.index_seek.status = SeekStatus::GaveUp;
            return;
        }
        let top = self.get_item_pos_by_index(target).top;
        self.scroll_to_item_top(target, top);

        let seek = &mut self.index_seek;
        if (top - seek.last_top).abs() < SEEK_EPSILON {
            vdebug!(target, top, attempts = seek.attempts, "index seek converged");
            seek.status = SeekStatus::Converged;
        } else if seek.attempts >= self.config.max_index_seek_attempts {
            vwarn!(target, top, attempts = seek.attempts, "index seek gave up");
            seek.status = SeekStatus::GaveUp;
        } else {
            seek.attempts += 1;
            seek.last_top = top;
        }
    }

    /// Scrolls to `top`, the position of item `index`, starting the range lookup at `index`
    /// instead of walking there from the current begin.
    fn scroll_to_item_top(&mut self, index: usize, top: f64) {
        self.correction.abort = true;
        // Past the scrollable end the offset is clamped and `index` is no longer the begin.
        if top <= self.max_offset() && index != self.state.in_view_begin {
            self.update_range(index);
        }
        self.move_offset(top);
        self.replan(false);
    }

    fn scroll_vetoing_correction(&mut self, offset: f64) {
        self.correction.abort = true;
        self.move_offset(offset);
    }

    /// Moves to `offset` (clamped) and recomputes synchronously, with no walk cap. Does not
    /// touch the correction veto.
    pub(crate) fn move_offset(&mut self, offset: f64) {
        let target = if offset.is_finite() {
            offset.clamp(0.0, self.max_offset())
        } else {
            0.0
        };
        self.emit(crate::VirtListEvent::ScrollTo { offset: target });
        if target == self.state.offset {
            return;
        }
        self.direction = if target < self.state.offset {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Backward
        };
        self.state.offset = target;
        self.scheduler.cancel(Task::Frame);
        self.refresh_walk(usize::MAX);
    }
}
