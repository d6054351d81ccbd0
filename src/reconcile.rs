//! Keeping the bookkeeping exact under list mutation and size observations.

use crate::key::{self, KeyCacheKey};
use crate::range;
use crate::scheduler::Task;
use crate::virt_list::Correction;
use crate::{Region, VirtList, VirtListEvent};

/// Viewport changes at or below this are ignored.
const CLIENT_THRESHOLD: f64 = 1.0;
/// Slot changes at or below this are ignored.
const SLOT_THRESHOLD: f64 = 0.5;
/// Item changes at or below this are ignored.
const ITEM_THRESHOLD: f64 = 1.0;
/// Aggregate correction deltas at or below this are not applied.
const CORRECTION_EPSILON: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default)]
struct BatchOutcome {
    /// Signed size change of items in the current list.
    diff: f64,
    /// Signed size change of items above the visible begin.
    above: f64,
    significant: bool,
    client_changed: bool,
}

impl<T, K: KeyCacheKey> VirtList<T, K> {
    /// Replaces the list.
    ///
    /// Measurements of keys no longer present are dropped. The visible begin is kept (clamped
    /// to the new length) and a render is always published, even if the window is unchanged.
    pub fn set_list(&mut self, items: &[T]) {
        let keys = self.collect_keys(items);
        vdebug!(from = self.keys.len(), to = keys.len(), "VirtList::set_list");
        self.replace_keys(keys);
        if self.keys.is_empty() {
            self.clear_state();
            self.rebuild_window();
            return;
        }
        let positions = &self.positions;
        self.sizes.retain(|key| positions.contains_key(key));
        self.state.list_total_size = self.sizes.total_size(&self.keys);
        self.range.invalidate();
        self.update_range(self.state.in_view_begin);
        self.rebuild_window();
    }

    /// Replaces the list with `items`, whose first entries are the newly prepended `added`.
    ///
    /// The offset moves down by the size of the prefix so that the content on screen stays
    /// put, and the next size batch is allowed to correct the offset again once the prefix
    /// gets measured.
    pub fn added_list_to_top(&mut self, items: &[T], added: &[T]) {
        let added_size: f64 = added
            .iter()
            .map(|item| self.sizes.get(&(self.config.item_key)(item)))
            .sum();
        let keys = self.collect_keys(items);
        if keys.is_empty() || self.keys.is_empty() {
            self.set_list(items);
            return;
        }
        vdebug!(
            added = added.len(),
            added_size,
            offset = self.state.offset,
            "VirtList::added_list_to_top"
        );
        self.replace_keys(keys);
        self.state.list_total_size = self.sizes.total_size(&self.keys);
        self.range.invalidate();
        self.update_range(self.state.in_view_begin + added.len());
        self.rebuild_window();

        self.move_offset(self.state.offset + added_size);
        self.correction.force_fix_offset = true;
        self.correction.abort = false;
    }

    /// Replaces the list with `items` after `removed` were taken off its front.
    ///
    /// The offset moves up by the size the removed items had, keeping the remaining content
    /// anchored.
    pub fn deleted_list_to_top(&mut self, items: &[T], removed: &[T]) {
        let removed_keys = self.collect_keys(removed);
        let removed_size: f64 = removed_keys.iter().map(|key| self.sizes.get(key)).sum();
        let keys = self.collect_keys(items);
        if keys.is_empty() {
            self.set_list(items);
            return;
        }
        vdebug!(
            removed = removed_keys.len(),
            removed_size,
            offset = self.state.offset,
            "VirtList::deleted_list_to_top"
        );
        for key in &removed_keys {
            self.sizes.delete(key);
        }
        self.replace_keys(keys);
        self.state.list_total_size = self.sizes.total_size(&self.keys);
        self.range.invalidate();
        self.update_range(
            self.state
                .in_view_begin
                .saturating_sub(removed_keys.len()),
        );
        self.rebuild_window();

        self.move_offset(self.state.offset - removed_size);
    }

    /// Records a size observation for `region`. Observations are batched: the batch is applied
    /// once no new observation arrived for the debounce window, and only the last size
    /// observed per region counts.
    pub fn observe(&mut self, region: Region<K>, size: f64, now_ms: u64) {
        self.advance(now_ms);
        self.push_observation(region, size);
        self.scheduler
            .debounce(Task::FlushSizes, self.config.resize_debounce_ms);
    }

    pub fn observe_many(
        &mut self,
        observations: impl IntoIterator<Item = (Region<K>, f64)>,
        now_ms: u64,
    ) {
        self.advance(now_ms);
        for (region, size) in observations {
            self.push_observation(region, size);
        }
        self.scheduler
            .debounce(Task::FlushSizes, self.config.resize_debounce_ms);
    }

    /// Applies the pending observations now instead of waiting for the debounce window.
    pub fn flush_observations(&mut self) {
        self.scheduler.cancel(Task::FlushSizes);
        let batch = std::mem::take(&mut self.pending);
        let mut outcome = BatchOutcome::default();
        for (region, size) in batch {
            self.apply_observation(region, size, &mut outcome);
        }

        self.state.list_total_size += outcome.diff;
        if outcome.client_changed {
            self.state.views = range::calc_views(
                self.slots.client_size,
                self.config.min_size,
                self.config.item_gap,
            );
            self.update_range(self.state.in_view_begin);
        }
        if outcome.significant {
            self.range.invalidate();
        }
        vdebug!(
            diff = outcome.diff,
            above = outcome.above,
            significant = outcome.significant,
            "size batch applied"
        );

        self.settle_index_seek();

        let Correction {
            fix_offset,
            force_fix_offset,
            abort,
        } = self.correction;
        if (fix_offset || force_fix_offset)
            && outcome.above.abs() > CORRECTION_EPSILON
            && !abort
            && !self.is_scrolling
            && outcome.significant
        {
            vdebug!(delta = outcome.above, "top correction");
            self.correction.fix_offset = false;
            self.correction.force_fix_offset = false;
            self.move_offset(self.state.offset + outcome.above);
        }
        self.correction.abort = false;

        self.replan(false);
    }

    /// Overwrites the size of `key`, keeping the totals exact. Ignored in fixed mode.
    pub fn set_item_size(&mut self, key: K, size: f64) {
        if self.sizes.is_fixed() || !(size.is_finite() && size >= 0.0) {
            return;
        }
        let old = self.sizes.set(key.clone(), size);
        self.resize_item(&key, size - old);
    }

    /// Forgets the measurement of `key`; it reverts to `min_size + item_gap`.
    pub fn delete_item_size(&mut self, key: &K) {
        let Some(old) = self.sizes.delete(key) else {
            return;
        };
        let size = self.sizes.get(key);
        self.resize_item(key, size - old);
    }

    fn resize_item(&mut self, key: &K, delta: f64) {
        if let Some(index) = self.index_of(key) {
            self.apply_item_delta(index, delta);
            self.state.list_total_size += delta;
        }
        self.range.invalidate();
        self.replan(false);
    }

    /// Clears every measurement and derived value and scrolls back to the top.
    pub fn reset(&mut self) {
        vdebug!(len = self.keys.len(), "VirtList::reset");
        self.clear_state();
        self.emit(VirtListEvent::ScrollTo { offset: 0.0 });
        if !self.keys.is_empty() {
            self.state.list_total_size = self.sizes.total_size(&self.keys);
            self.update_range(0);
        }
        self.rebuild_window();
    }

    fn collect_keys(&self, items: &[T]) -> Vec<K> {
        items.iter().map(|item| (self.config.item_key)(item)).collect()
    }

    fn push_observation(&mut self, region: Region<K>, size: f64) {
        if !(size.is_finite() && size >= 0.0) {
            vwarn!(size, "ignoring invalid size observation");
            return;
        }
        match self.pending.iter_mut().find(|(r, _)| *r == region) {
            Some(entry) => entry.1 = size,
            None => self.pending.push((region, size)),
        }
    }

    fn apply_observation(&mut self, region: Region<K>, size: f64, outcome: &mut BatchOutcome) {
        let slot = match region {
            Region::Client => {
                if (self.slots.client_size - size).abs() > CLIENT_THRESHOLD {
                    self.slots.client_size = size;
                    outcome.client_changed = true;
                    outcome.significant = true;
                }
                return;
            }
            Region::Header => &mut self.slots.header_size,
            Region::Footer => &mut self.slots.footer_size,
            Region::StickyHeader => &mut self.slots.sticky_header_size,
            Region::StickyFooter => &mut self.slots.sticky_footer_size,
            Region::Item(key) => {
                if self.sizes.is_fixed() {
                    return;
                }
                // Rows removed since they were measured.
                let Some(index) = self.index_of(&key) else {
                    return;
                };
                let old = self.sizes.get(&key);
                if (old - size).abs() <= ITEM_THRESHOLD {
                    return;
                }
                self.sizes.set(key.clone(), size);
                outcome.significant = true;
                self.apply_item_delta(index, size - old);
                outcome.diff += size - old;
                if index < self.state.in_view_begin {
                    outcome.above += size - old;
                }
                self.emit(VirtListEvent::ItemResize { key, size });
                return;
            }
        };
        if (*slot - size).abs() > SLOT_THRESHOLD {
            *slot = size;
            outcome.significant = true;
        }
    }

    /// Keeps `virtual_size` exact for a size change of the item at `index`.
    ///
    /// `list_total_size` is left to the caller so that a batch applies it once.
    fn apply_item_delta(&mut self, index: usize, delta: f64) {
        if index < self.state.render_begin {
            self.state.virtual_size += delta;
        }
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    fn replace_keys(&mut self, keys: Vec<K>) {
        self.positions = key::index_keys(&keys);
        self.keys = keys;
    }

    /// Returns derived state and caches to their initial values. The list is kept.
    fn clear_state(&mut self) {
        let views = self.state.views;
        self.state = crate::ReactiveState {
            views,
            buffer_top: self.config.buffer_top,
            buffer_bottom: self.config.buffer_bottom,
            ..crate::ReactiveState::default()
        };
        self.sizes.clear();
        self.pending.clear();
        self.range.invalidate();
        self.index_seek.cancel();
        self.edge_seek.cancel();
        self.scheduler.cancel(Task::Frame);
        self.scheduler.cancel(Task::FlushSizes);
        self.scheduler.cancel(Task::EdgeRetry);
        self.correction = Correction::default();
    }
}
