//! Offset → visible range.
//!
//! The visible begin is found by walking from the previous begin in the scroll direction,
//! accumulating item sizes until the offset falls inside an item's span. The walk is capped;
//! when the cap is hit the furthest index reached is published and the caller schedules
//! another pass, so large jumps converge over a few frames instead of one long scan.
//! Fixed-size lists skip the walk and divide.

use crate::key::KeyCacheKey;
use crate::size_store::SizeStore;
use crate::{ReactiveState, ScrollDirection};

/// Number of items that fit in `client_size` at the minimum item size, plus one for the
/// partially visible item.
pub(crate) fn calc_views(client_size: f64, min_size: f64, item_gap: f64) -> usize {
    let unit = min_size + item_gap;
    (client_size / unit).ceil().max(0.0) as usize + 1
}

/// Clamps `start` into the list and derives the visible end from `views`.
///
/// Returns `true` when the begin moved toward index 0, which is when measurements of the
/// newly revealed items may need an offset correction.
pub(crate) fn update_range(state: &mut ReactiveState, len: usize, start: usize) -> bool {
    if len == 0 {
        state.in_view_begin = 0;
        state.in_view_end = 0;
        return false;
    }
    let last = len - 1;
    let begin = start.min(last);
    let moved_up = begin < state.in_view_begin;
    state.in_view_begin = begin;
    state.in_view_end = begin
        .saturating_add(state.views.saturating_sub(1))
        .min(last);
    moved_up
}

pub(crate) struct RangeInput<'a, K> {
    pub(crate) offset: f64,
    pub(crate) header_size: f64,
    pub(crate) direction: ScrollDirection,
    pub(crate) keys: &'a [K],
    pub(crate) sizes: &'a SizeStore<K>,
    pub(crate) tolerance: f64,
    pub(crate) max_steps: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RangeStep {
    /// New visible begin to publish, if any.
    pub(crate) begin: Option<usize>,
    /// A backward walk ran; pending top corrections no longer apply.
    pub(crate) clear_fix_offset: bool,
    /// The walk hit its step cap before locating the offset.
    pub(crate) exhausted: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RangeCalculator {
    last: Option<(f64, usize)>,
}

impl RangeCalculator {
    /// Forgets the last computed parameters so the next call always walks.
    pub(crate) fn invalidate(&mut self) {
        self.last = None;
    }

    pub(crate) fn calc<K: KeyCacheKey>(
        &mut self,
        state: &ReactiveState,
        input: &RangeInput<'_, K>,
    ) -> RangeStep {
        let len = input.keys.len();
        if len == 0 {
            return RangeStep {
                begin: Some(0),
                ..RangeStep::default()
            };
        }

        let offset = input.offset - input.header_size;
        // Scrolled into the header: the first item is at the top.
        if offset < 0.0 {
            return RangeStep {
                begin: Some(0),
                ..RangeStep::default()
            };
        }

        if let Some((last_offset, last_begin)) = self.last {
            if (last_offset - input.offset).abs() < 1.0 && last_begin == state.in_view_begin {
                return RangeStep::default();
            }
        }
        self.last = Some((input.offset, state.in_view_begin));

        let sizes = input.sizes;
        let keys = input.keys;
        let tolerance = input.tolerance;
        let mut start = state.in_view_begin.min(len - 1);
        // A render override may start the window below the visible begin.
        let mut reduce = if state.render_begin <= start {
            state.virtual_size + sizes.range_size(keys, state.render_begin, start)
        } else {
            state.virtual_size - sizes.range_size(keys, start, state.render_begin)
        };
        let mut step = RangeStep::default();

        match input.direction {
            ScrollDirection::Forward => {
                if offset >= reduce - tolerance {
                    return step;
                }
                if sizes.is_fixed() {
                    start = fixed_index(offset, sizes.default_size(), len);
                    return finish(state, start, step);
                }
                let steps = start.min(input.max_steps);
                let mut found = false;
                for i in (start - steps..start).rev() {
                    let size = sizes.get(&keys[i]);
                    reduce -= size;
                    if reduce <= offset && offset < reduce + size {
                        start = i;
                        found = true;
                        break;
                    }
                }
                if !found {
                    let furthest = start - steps;
                    step.exhausted = steps == input.max_steps && furthest > 0;
                    start = furthest;
                }
            }
            ScrollDirection::Backward => {
                if offset <= reduce + tolerance {
                    return step;
                }
                step.clear_fix_offset = true;
                if sizes.is_fixed() {
                    start = fixed_index(offset, sizes.default_size(), len);
                    return finish(state, start, step);
                }
                let steps = (len - start).min(input.max_steps);
                let mut found = false;
                for i in start..start + steps {
                    let size = sizes.get(&keys[i]);
                    if reduce <= offset && offset < reduce + size {
                        start = i;
                        found = true;
                        break;
                    }
                    reduce += size;
                }
                if !found {
                    let next = start + steps;
                    step.exhausted = steps == input.max_steps && next < len;
                    start = next.min(len - 1);
                }
            }
        }

        if step.exhausted {
            vwarn!(
                offset = input.offset,
                begin = start,
                max_steps = input.max_steps,
                "range walk hit its step cap; resuming next frame"
            );
        }

        finish(state, start, step)
    }
}

/// Index of the item spanning `offset` when every item is `unit` long.
fn fixed_index(offset: f64, unit: f64, len: usize) -> usize {
    if unit <= 0.0 {
        return 0;
    }
    ((offset / unit).floor() as usize).min(len - 1)
}

fn finish(state: &ReactiveState, start: usize, mut step: RangeStep) -> RangeStep {
    if start != state.in_view_begin {
        vtrace!(from = state.in_view_begin, to = start, "range walk moved begin");
        step.begin = Some(start);
    }
    step
}
