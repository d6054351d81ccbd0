use crate::key::KeyCacheKey;
use crate::options::RenderControl;
use crate::size_store::SizeStore;
use crate::ReactiveState;

/// Expands the visible range by the resolved buffers, or asks the render override.
///
/// The result is clamped to `[0, len - 1]` with `begin <= end`.
pub(crate) fn plan(
    state: &ReactiveState,
    len: usize,
    control: Option<&RenderControl>,
) -> (usize, usize) {
    let last = len.saturating_sub(1);
    let (begin, end) = match control {
        Some(control) => {
            let (begin, end) = control(state.in_view_begin, state.in_view_end);
            if len > 0 && (begin > last || end > last || begin > end) {
                vwarn!(
                    begin,
                    end,
                    len,
                    "render control returned a range outside the list; clamping"
                );
            }
            (begin, end)
        }
        None => (
            state.in_view_begin.saturating_sub(state.buffer_top),
            state.in_view_end.saturating_add(state.buffer_bottom),
        ),
    };
    let begin = begin.min(last);
    let end = end.min(last).max(begin);
    (begin, end)
}

/// Moves the render window, keeping `virtual_size` in step by the size of the index delta
/// between the old and new `render_begin`.
pub(crate) fn apply_window<K: KeyCacheKey>(
    state: &mut ReactiveState,
    keys: &[K],
    sizes: &SizeStore<K>,
    begin: usize,
    end: usize,
) {
    let old = state.render_begin;
    let delta = sizes.range_size(keys, begin, old);
    if begin > old {
        state.virtual_size += delta;
    } else {
        state.virtual_size -= delta;
    }
    state.render_begin = begin;
    state.render_end = end;
}

/// Recomputes `virtual_size` from scratch; used after structural changes.
pub(crate) fn resync_virtual_size<K: KeyCacheKey>(
    state: &mut ReactiveState,
    keys: &[K],
    sizes: &SizeStore<K>,
) {
    state.virtual_size = sizes.range_size(keys, 0, state.render_begin);
}
