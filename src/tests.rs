use crate::scheduler::{Scheduler, Task};
use crate::*;

use std::sync::{Arc, Mutex};

type Recorded = Arc<Mutex<Vec<VirtListEvent<u32>>>>;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 16
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

fn opts(min_size: f64) -> VirtListOptions<u32, u32> {
    VirtListOptions::new_with_key(min_size, |item: &u32| *item)
}

fn items(range: core::ops::Range<u32>) -> Vec<u32> {
    range.collect()
}

fn recorded(options: VirtListOptions<u32, u32>, list: &[u32]) -> (VirtList<u32, u32>, Recorded) {
    let events: Recorded = Arc::default();
    let sink = Arc::clone(&events);
    let options = options.with_on_event(Some(move |event: &VirtListEvent<u32>| {
        sink.lock().unwrap().push(event.clone());
    }));
    let list = VirtList::new(options, list).unwrap();
    (list, events)
}

fn take(events: &Recorded) -> Vec<VirtListEvent<u32>> {
    core::mem::take(&mut *events.lock().unwrap())
}

fn renders(events: &[VirtListEvent<u32>]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, VirtListEvent::Render(_)))
        .count()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn assert_window_invariants(list: &VirtList<u32, u32>) {
    let s = list.state();
    let len = list.len();
    if len == 0 {
        assert_eq!((s.in_view_begin, s.in_view_end), (0, 0));
        assert!(list.render_directive().is_empty());
        assert_close(s.virtual_size, 0.0);
        assert_close(s.list_total_size, 0.0);
        return;
    }
    assert!(s.render_begin <= s.in_view_begin, "{s:?}");
    assert!(s.in_view_begin <= s.in_view_end, "{s:?}");
    assert!(s.in_view_end <= s.render_end, "{s:?}");
    assert!(s.render_end < len, "{s:?}");

    let keys = list.keys();
    let before: f64 = keys[..s.render_begin]
        .iter()
        .map(|k| list.get_item_size(k))
        .sum();
    let total: f64 = keys.iter().map(|k| list.get_item_size(k)).sum();
    assert_close(s.virtual_size, before);
    assert_close(s.list_total_size, total);
}

#[test]
fn fixed_list_initial_range() {
    let list = VirtList::new(
        opts(20.0).with_fixed(true).with_client_size(200.0),
        &items(0..100),
    )
    .unwrap();
    let s = list.state();
    assert_eq!(s.views, 11);
    assert_eq!((s.in_view_begin, s.in_view_end), (0, 10));
    assert_eq!((s.render_begin, s.render_end), (0, 10));
    assert_close(s.list_total_size, 2000.0);
    assert_close(list.total_size(), 2000.0);
    assert_window_invariants(&list);
}

#[test]
fn empty_list_resets_and_forces_render() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..10));
    list.set_item_size(3, 40.0);
    take(&events);

    list.set_list(&[]);
    let s = list.state();
    assert_eq!((s.in_view_begin, s.in_view_end), (0, 0));
    assert!(list.render_directive().is_empty());
    assert_close(s.list_total_size, 0.0);
    assert!(list.size_store().is_empty());
    assert_eq!(renders(&take(&events)), 1);

    // The window did not change, the render still goes out.
    list.set_list(&[]);
    assert_eq!(renders(&take(&events)), 1);
    assert_window_invariants(&list);
}

#[test]
fn scroll_to_index_converges_as_sizes_arrive() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();

    list.scroll_to_index(50);
    assert_close(list.offset(), 1000.0);
    assert_eq!(list.index_seek_status(), SeekStatus::Seeking);

    // Everything above the target turns out to be 30 tall.
    list.observe_many((0..50).map(|k| (Region::Item(k), 30.0)), 0);
    list.advance(16);
    assert_close(list.get_item_pos_by_index(50).top, 1500.0);
    assert_close(list.offset(), 1500.0);
    assert_eq!(list.index_seek_status(), SeekStatus::Seeking);
    assert_window_invariants(&list);

    // The items now on screen get measured; the target no longer moves.
    list.observe_many((50..61).map(|k| (Region::Item(k), 30.0)), 20);
    list.advance(36);
    assert_eq!(list.index_seek_status(), SeekStatus::Converged);
    assert_close(list.offset(), 1500.0);
    assert_eq!(list.state().in_view_begin, 50);
    assert_window_invariants(&list);
}

#[test]
fn scroll_to_index_gives_up_after_attempt_cap() {
    let mut list = VirtList::new(
        opts(20.0)
            .with_client_size(200.0)
            .with_max_index_seek_attempts(3),
        &items(0..200),
    )
    .unwrap();
    list.scroll_to_index(100);

    // Each batch grows one item above the target, so its top never settles.
    for (i, now) in (0..5u32).zip((0..).step_by(20)) {
        list.observe(Region::Item(i), 60.0, now);
        list.advance(now + 16);
    }
    assert_eq!(list.index_seek_status(), SeekStatus::GaveUp);
    assert_window_invariants(&list);
}

#[test]
fn prepend_keeps_visible_content_anchored() {
    let (mut list, events) = recorded(opts(50.0).with_client_size(500.0), &items(100..200));
    list.scroll_to_offset(1000.0);
    assert_eq!(list.state().in_view_begin, 20);
    assert_eq!(list.keys()[20], 120);
    take(&events);

    list.added_list_to_top(&items(95..200), &items(95..100));
    assert_close(list.offset(), 1250.0);
    assert_eq!(list.state().in_view_begin, 25);
    assert_eq!(list.keys()[25], 120);
    assert_close(list.state().virtual_size, 1250.0);
    assert!(take(&events).contains(&VirtListEvent::ScrollTo { offset: 1250.0 }));
    assert_window_invariants(&list);
}

#[test]
fn prepend_enables_correction_once_prefix_is_measured() {
    let mut list = VirtList::new(
        opts(50.0).with_client_size(500.0).with_buffer(30),
        &items(100..200),
    )
    .unwrap();
    list.scroll_to_offset(1000.0);
    list.flush_observations();

    list.added_list_to_top(&items(95..200), &items(95..100));
    assert_close(list.offset(), 1250.0);
    assert_eq!(list.state().render_begin, 0);

    // The prepended items render inside the top buffer and turn out taller.
    list.observe_many((95..100).map(|k| (Region::Item(k), 70.0)), 0);
    list.advance(16);
    assert_close(list.offset(), 1350.0);
    assert_window_invariants(&list);
}

#[test]
fn remove_from_top_keeps_visible_content_anchored() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.set_item_size(2, 30.0);
    list.scroll_to_offset(1010.0);
    assert_eq!(list.state().in_view_begin, 50);

    list.deleted_list_to_top(&items(5..100), &items(0..5));
    assert_close(list.offset(), 900.0);
    assert_eq!(list.state().in_view_begin, 45);
    assert_eq!(list.keys()[45], 50);
    assert!(!list.size_store().contains(&2));
    assert_close(list.state().list_total_size, 1900.0);
    assert_window_invariants(&list);
}

#[test]
fn viewport_resize_recomputes_views() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.scroll_to_offset(400.0);
    assert_eq!(
        (list.state().in_view_begin, list.state().in_view_end),
        (20, 30)
    );

    list.observe(Region::Client, 400.0, 0);
    list.advance(16);
    let s = list.state();
    assert_eq!(s.views, 21);
    assert_eq!((s.in_view_begin, s.in_view_end), (20, 40));
    assert_close(list.slot_sizes().client_size, 400.0);
    assert_window_invariants(&list);
}

#[test]
fn invalid_options_are_rejected() {
    let missing = VirtList::new(VirtListOptions::<u32, u32>::new(20.0), &[]);
    assert_eq!(missing.unwrap_err(), ConfigError::MissingItemKey);

    let err = VirtList::new(opts(0.0), &[]).unwrap_err();
    assert_eq!(err, ConfigError::InvalidMinSize(0.0));
    let err = VirtList::new(opts(f64::NAN), &[]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMinSize(v) if v.is_nan()));
    let err = VirtList::new(opts(20.0).with_item_gap(-1.0), &[]).unwrap_err();
    assert_eq!(err, ConfigError::InvalidItemGap(-1.0));
    let err = VirtList::new(opts(20.0).with_scroll_distance(-3.0), &[]).unwrap_err();
    assert_eq!(err, ConfigError::InvalidScrollDistance(-3.0));
    let err = VirtList::new(opts(20.0).with_client_size(f64::INFINITY), &[]).unwrap_err();
    assert_eq!(err, ConfigError::InvalidClientSize(f64::INFINITY));
    let err = VirtList::new(opts(20.0).with_max_walk_steps(0), &[]).unwrap_err();
    assert_eq!(err, ConfigError::ZeroWalkSteps);
    let err = VirtList::new(opts(20.0).with_frame_ms(0), &[]).unwrap_err();
    assert_eq!(err, ConfigError::ZeroFrameInterval);
}

#[test]
fn explicit_buffers_win_over_symmetric_buffer() {
    let list = VirtList::new(opts(20.0).with_buffer(3).with_buffer_top(5), &items(0..10)).unwrap();
    assert_eq!(list.config().buffer_top(), 5);
    assert_eq!(list.config().buffer_bottom(), 3);
    assert_eq!(list.state().buffer_top, 5);

    let list = VirtList::new(opts(20.0).with_buffer(3).with_buffer_top(0), &items(0..10)).unwrap();
    assert_eq!(list.config().buffer_top(), 3);
}

#[test]
fn effective_edge_threshold_is_at_least_two() {
    let list = VirtList::new(opts(20.0), &[]).unwrap();
    assert_close(list.config().edge_threshold(), 2.0);
    let list = VirtList::new(opts(20.0).with_scroll_distance(40.0), &[]).unwrap();
    assert_close(list.config().edge_threshold(), 40.0);
    let list = VirtList::new(opts(20.0).with_horizontal(true), &[]).unwrap();
    assert_eq!(list.config().axis(), Axis::Horizontal);
}

#[test]
fn scheduler_throttle_keeps_and_debounce_resets_due_time() {
    let mut s = Scheduler::default();
    s.throttle(Task::Frame, 16);
    s.set_now(10);
    s.throttle(Task::Frame, 16);
    assert_eq!(s.next_due(), Some(16));

    s.debounce(Task::ScrollSettle, 150);
    s.set_now(100);
    s.debounce(Task::ScrollSettle, 150);
    assert!(s.is_pending(Task::ScrollSettle));

    assert_eq!(s.pop_due(200), Some(Task::Frame));
    assert_eq!(s.pop_due(200), None);
    assert_eq!(s.pop_due(250), Some(Task::ScrollSettle));
    assert_eq!(s.now(), 250);
    assert_eq!(s.next_due(), None);
}

#[test]
fn scheduler_runs_in_due_order_and_clock_never_goes_back() {
    let mut s = Scheduler::default();
    s.debounce(Task::FlushSizes, 16);
    s.debounce(Task::EdgeRetry, 3);
    s.throttle(Task::Frame, 16);
    assert_eq!(s.pop_due(100), Some(Task::EdgeRetry));
    assert_eq!(s.now(), 3);
    assert_eq!(s.pop_due(100), Some(Task::FlushSizes));
    assert_eq!(s.pop_due(100), Some(Task::Frame));
    s.set_now(1);
    assert_eq!(s.now(), 16);

    s.throttle(Task::Frame, 16);
    s.cancel(Task::Frame);
    assert!(!s.is_pending(Task::Frame));
}

#[test]
fn scroll_events_within_a_frame_collapse_into_one_recompute() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    take(&events);

    list.on_scroll(100.0, 0);
    list.on_scroll(200.0, 5);
    list.on_scroll(300.0, 10);
    assert!(list.is_scrolling());
    assert_eq!(list.direction(), ScrollDirection::Backward);
    let before = take(&events);
    assert_eq!(before.len(), 3);
    assert!(
        before
            .iter()
            .all(|e| matches!(e, VirtListEvent::Scroll { .. }))
    );

    list.advance(16);
    let after = take(&events);
    let ranges: Vec<_> = after
        .iter()
        .filter(|e| matches!(e, VirtListEvent::RangeUpdate { .. }))
        .collect();
    assert_eq!(ranges, [&VirtListEvent::RangeUpdate { begin: 15, end: 25 }]);
    assert_eq!(renders(&after), 1);

    list.advance(159);
    assert!(list.is_scrolling());
    list.advance(160);
    assert!(!list.is_scrolling());
    assert_window_invariants(&list);
}

#[test]
fn repeated_offset_is_only_passed_through() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.on_scroll(0.0, 0);
    assert!(!list.is_scrolling());
    assert_eq!(list.next_deadline(), None);
    assert_eq!(
        take(&events).last(),
        Some(&VirtListEvent::Scroll { offset: 0.0 })
    );
}

#[test]
fn capped_walk_resumes_on_following_frames() {
    let mut list = VirtList::new(
        opts(10.0).with_client_size(100.0).with_max_walk_steps(5),
        &items(0..100),
    )
    .unwrap();
    list.on_scroll(300.0, 0);
    list.advance(16);
    assert_eq!(list.state().in_view_begin, 5);
    assert!(list.next_deadline().is_some());
    assert_window_invariants(&list);

    list.advance(1_000);
    assert_eq!(list.state().in_view_begin, 30);
    assert_eq!(list.next_deadline(), None);
    assert_window_invariants(&list);
}

#[test]
fn recompute_is_idempotent() {
    let mut list = VirtList::new(
        opts(20.0).with_client_size(200.0).with_buffer(2),
        &items(0..100),
    )
    .unwrap();
    list.on_scroll(333.0, 0);
    list.advance(16);
    let first = *list.state();
    list.force_refresh();
    list.force_refresh();
    assert_eq!(*list.state(), first);
}

/// Scrolls up from the middle of the list so that the visible begin moves toward index 0,
/// then lets the gesture settle.
fn scrolled_up_list() -> VirtList<u32, u32> {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.on_scroll(1000.0, 0);
    list.advance(32);
    assert_eq!(list.state().in_view_begin, 50);
    list.on_scroll(900.0, 40);
    list.advance(56);
    assert_eq!(list.state().in_view_begin, 45);
    list
}

#[test]
fn growth_above_viewport_shifts_offset() {
    let mut list = scrolled_up_list();
    list.advance(300);
    assert!(!list.is_scrolling());

    list.observe(Region::Item(44), 40.0, 300);
    list.advance(316);
    assert_close(list.offset(), 920.0);
    assert_close(list.state().list_total_size, 2020.0);
    assert_close(list.state().virtual_size, 920.0);
    assert_eq!(list.state().in_view_begin, 45);
    assert_window_invariants(&list);
}

#[test]
fn no_correction_while_scrolling() {
    let mut list = scrolled_up_list();
    assert!(list.is_scrolling());
    list.observe(Region::Item(44), 40.0, 60);
    list.advance(76);
    assert!(list.is_scrolling());
    assert_close(list.offset(), 900.0);
    assert_window_invariants(&list);
}

#[test]
fn programmatic_scroll_vetoes_one_correction() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.on_scroll(1000.0, 0);
    list.advance(300);
    list.scroll_to_offset(900.0);
    assert_eq!(list.state().in_view_begin, 45);
    assert!(!list.is_scrolling());

    list.observe(Region::Item(44), 40.0, 300);
    list.advance(316);
    assert_close(list.offset(), 900.0);

    // The veto was spent by the previous batch.
    list.observe(Region::Item(43), 40.0, 320);
    list.advance(336);
    assert_close(list.offset(), 920.0);
    assert_window_invariants(&list);
}

#[test]
fn scroll_to_bottom_converges() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.scroll_to_bottom();
    assert_close(list.offset(), 1800.0);
    assert_eq!(list.edge_seek_status(), SeekStatus::Seeking);
    list.advance(3);
    assert_eq!(list.edge_seek_status(), SeekStatus::Converged);
    assert_window_invariants(&list);
}

#[test]
fn scroll_to_bottom_follows_late_growth() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.scroll_to_bottom();
    list.set_item_size(99, 100.0);
    assert_close(list.state().list_total_size, 2080.0);

    list.advance(3);
    assert_eq!(list.edge_seek_status(), SeekStatus::Seeking);
    assert_close(list.offset(), 1880.0);
    list.advance(6);
    assert_eq!(list.edge_seek_status(), SeekStatus::Converged);
    assert_window_invariants(&list);
}

#[test]
fn scroll_to_top_gives_up_when_host_never_gets_there() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.scroll_to_offset(500.0);
    list.scroll_to_top();
    assert_close(list.offset(), 0.0);

    for i in 0..20u64 {
        list.on_scroll(5.0, i * 3 + 1);
    }
    list.advance(1_000);
    assert_eq!(list.edge_seek_status(), SeekStatus::GaveUp);
}

#[test]
fn last_index_routes_to_bottom() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.scroll_to_index(99);
    assert_eq!(list.edge_seek_status(), SeekStatus::Seeking);
    assert_eq!(list.index_seek_status(), SeekStatus::Idle);
    assert_close(list.offset(), 1800.0);

    list.scroll_to_index(10);
    assert_eq!(list.edge_seek_status(), SeekStatus::Idle);
    assert_eq!(list.index_seek_status(), SeekStatus::Seeking);
    assert_close(list.offset(), 200.0);
}

#[test]
fn reached_top_and_bottom_are_reported() {
    let (mut list, events) = recorded(
        opts(20.0).with_client_size(200.0).with_scroll_distance(10.0),
        &items(0..100),
    );
    list.on_scroll(1795.0, 0);
    list.advance(16);
    assert!(take(&events).contains(&VirtListEvent::ReachedBottom(99)));

    list.on_scroll(5.0, 20);
    list.advance(36);
    let events = take(&events);
    assert!(events.contains(&VirtListEvent::ReachedTop(0)));
    assert!(!events.contains(&VirtListEvent::ReachedBottom(99)));
}

#[test]
fn render_control_replaces_buffers() {
    let mut list = VirtList::new(
        opts(20.0)
            .with_client_size(100.0)
            .with_buffer(50)
            .with_render_control(Some(|begin: usize, end: usize| {
                (begin.saturating_sub(2), end + 100)
            })),
        &items(0..20),
    )
    .unwrap();
    let s = list.state();
    assert_eq!((s.in_view_begin, s.in_view_end), (0, 5));
    assert_eq!((s.render_begin, s.render_end), (0, 19));

    list.scroll_to_offset(200.0);
    let s = list.state();
    assert_eq!((s.in_view_begin, s.in_view_end), (10, 15));
    assert_eq!((s.render_begin, s.render_end), (8, 19));
    assert_close(s.virtual_size, 160.0);
}

#[test]
fn render_control_trimming_the_top_keeps_walk_exact() {
    let mut list = VirtList::new(
        opts(20.0)
            .with_client_size(200.0)
            .with_render_control(Some(|begin: usize, end: usize| (begin + 3, end))),
        &items(0..100),
    )
    .unwrap();
    assert_eq!(list.state().render_begin, 3);
    assert_close(list.state().virtual_size, 60.0);

    list.on_scroll(500.0, 0);
    list.advance(16);
    let s = list.state();
    assert_eq!(s.in_view_begin, 25);
    assert_eq!(s.render_begin, 28);
    assert_close(s.virtual_size, 560.0);

    list.on_scroll(100.0, 40);
    list.advance(60);
    let s = list.state();
    assert_eq!(s.in_view_begin, 5);
    assert_eq!(s.render_begin, 8);
    assert_close(s.virtual_size, 160.0);
}

#[test]
fn buffers_expand_render_window() {
    let mut list = VirtList::new(
        opts(20.0).with_client_size(200.0).with_buffer(2),
        &items(0..100),
    )
    .unwrap();
    list.scroll_to_offset(400.0);
    let s = list.state();
    assert_eq!((s.render_begin, s.render_end), (18, 32));
    assert_close(s.virtual_size, 360.0);
    let d = list.render_directive();
    assert_eq!(d.indices(), 18..33);
    assert_eq!(d.item_count, 100);
}

#[test]
fn fixed_list_jumps_straight_to_target() {
    let items: Vec<u32> = (0..1_000_000).collect();
    let mut list = VirtList::new(
        opts(20.0).with_fixed(true).with_client_size(200.0).with_buffer(2),
        &items,
    )
    .unwrap();
    list.scroll_to_index(500_000);
    assert_close(list.offset(), 10_000_000.0);
    let s = list.state();
    assert_eq!((s.in_view_begin, s.in_view_end), (500_000, 500_010));
    assert_eq!(s.render_begin, 499_998);
    assert_close(s.virtual_size, 499_998.0 * 20.0);

    // Scroll events divide instead of walking.
    list.on_scroll(4_000_010.0, 10);
    list.advance(26);
    assert_eq!(list.state().in_view_begin, 200_000);
    assert_close(list.state().virtual_size, 199_998.0 * 20.0);
}

#[test]
fn programmatic_jumps_land_in_one_call() {
    let items: Vec<u32> = (0..100_000).collect();
    let mut list = VirtList::new(
        opts(20.0).with_client_size(200.0).with_buffer(2),
        &items,
    )
    .unwrap();
    list.set_item_size(0, 50.0);

    list.scroll_to_offset(1_000_000.0);
    assert_eq!(list.state().in_view_begin, 49_998);
    assert_eq!(list.next_deadline(), None);
    assert_window_invariants(&list);

    list.scroll_to_index(70_000);
    assert_close(list.offset(), 1_400_030.0);
    assert_eq!(list.state().in_view_begin, 70_000);
    assert_window_invariants(&list);

    list.scroll_to_index(10);
    assert_close(list.offset(), 230.0);
    assert_eq!(list.state().in_view_begin, 10);
    assert_eq!(list.state().render_begin, 8);

    list.scroll_to_bottom();
    assert_close(list.offset(), 1_999_830.0);
    assert_eq!(list.state().in_view_begin, 99_990);
    assert_window_invariants(&list);
}

#[test]
fn clamped_index_jump_keeps_walked_begin() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.scroll_to_offset(10_000.0);
    assert_close(list.offset(), 1800.0);
    assert_eq!(list.state().in_view_begin, 90);

    // Item 95 cannot reach the top; the offset stays clamped at the bottom.
    list.scroll_to_index(95);
    assert_close(list.offset(), 1800.0);
    assert_eq!(list.state().in_view_begin, 90);
    assert_window_invariants(&list);
}

#[test]
fn fixed_mode_ignores_measurements() {
    let (mut list, events) = recorded(
        opts(20.0).with_fixed(true).with_client_size(200.0),
        &items(0..100),
    );
    list.observe(Region::Item(3), 100.0, 0);
    list.advance(16);
    list.set_item_size(4, 100.0);
    assert_close(list.get_item_size(&3), 20.0);
    assert_close(list.get_item_size(&4), 20.0);
    assert_close(list.state().list_total_size, 2000.0);
    assert!(list.size_store().is_empty());
    assert!(
        !take(&events)
            .iter()
            .any(|e| matches!(e, VirtListEvent::ItemResize { .. }))
    );
}

#[test]
fn observations_of_removed_rows_are_dropped() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.observe(Region::Item(500), 80.0, 0);
    list.observe(Region::Item(3), 80.0, 5);
    list.deleted_list_to_top(&items(5..100), &items(0..5));
    take(&events);
    list.advance(100);

    assert!(!list.size_store().contains(&500));
    assert!(!list.size_store().contains(&3));
    assert!(list.size_store().is_empty());
    assert!(
        !take(&events)
            .iter()
            .any(|e| matches!(e, VirtListEvent::ItemResize { .. }))
    );
    assert_close(list.state().list_total_size, 1900.0);
    assert_window_invariants(&list);
}

#[test]
fn small_changes_are_ignored() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.observe(Region::Header, 50.0, 0);
    list.advance(16);
    assert_close(list.get_slot_size(), 50.0);
    assert_close(list.total_size(), 2050.0);

    take(&events);
    list.observe(Region::Header, 50.3, 20);
    list.observe(Region::Item(1), 21.0, 20);
    list.observe(Region::Client, 200.8, 20);
    list.advance(36);
    assert_close(list.slot_sizes().header_size, 50.0);
    assert_close(list.slot_sizes().client_size, 200.0);
    assert!(!list.size_store().contains(&1));
    assert!(
        !take(&events)
            .iter()
            .any(|e| matches!(e, VirtListEvent::ItemResize { .. }))
    );
}

#[test]
fn observations_are_last_write_wins_per_region() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    take(&events);
    list.observe(Region::Item(1), 50.0, 0);
    list.observe(Region::Item(1), 30.0, 5);
    list.advance(20);
    assert_eq!(list.now_ms(), 20);
    assert_close(list.get_item_size(&1), 20.0);

    // Debounced from the last observation at t=5.
    list.advance(21);
    assert_close(list.get_item_size(&1), 30.0);
    let resized: Vec<_> = take(&events)
        .into_iter()
        .filter(|e| matches!(e, VirtListEvent::ItemResize { .. }))
        .collect();
    assert_eq!(resized, [VirtListEvent::ItemResize { key: 1, size: 30.0 }]);
    assert_close(list.state().list_total_size, 2010.0);
}

#[test]
fn slots_shift_item_positions() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.observe_many(
        [
            (Region::Header, 30.0),
            (Region::Footer, 10.0),
            (Region::StickyHeader, 5.0),
            (Region::StickyFooter, 5.0),
        ],
        0,
    );
    list.flush_observations();
    assert_eq!(list.next_deadline(), None);
    assert_close(list.get_slot_size(), 50.0);

    let pos = list.get_item_pos_by_index(2);
    assert_close(pos.top, 70.0);
    assert_close(pos.current, 20.0);
    assert_close(pos.bottom, 90.0);

    // Past the end, positions extrapolate with the default size.
    let pos = list.get_item_pos_by_index(101);
    assert_close(pos.top, 30.0 + 2020.0);
}

#[test]
fn scrolled_into_header_pins_first_item() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.observe(Region::Header, 100.0, 0);
    list.advance(16);
    list.on_scroll(400.0, 20);
    list.advance(36);
    assert_eq!(list.state().in_view_begin, 15);
    list.on_scroll(50.0, 40);
    list.advance(56);
    assert_eq!(list.state().in_view_begin, 0);
}

#[test]
fn scroll_into_view_nudges_or_delegates() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();

    list.scroll_to_offset(110.0);
    list.scroll_into_view(8);
    assert_close(list.offset(), 110.0);

    list.scroll_into_view(5);
    assert_close(list.offset(), 100.0);

    list.scroll_to_offset(110.0);
    list.scroll_into_view(15);
    assert_close(list.offset(), 120.0);

    list.scroll_into_view(60);
    assert_close(list.offset(), 1200.0);
    assert_eq!(list.index_seek_status(), SeekStatus::Seeking);

    list.scroll_into_view(4);
    assert_close(list.offset(), 80.0);
}

#[test]
fn scroll_to_offset_round_trips_and_clamps() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.scroll_to_offset(733.5);
    assert_close(list.offset(), 733.5);
    assert!(take(&events).contains(&VirtListEvent::ScrollTo { offset: 733.5 }));

    list.scroll_to_offset(10_000.0);
    assert_close(list.offset(), 1800.0);
    list.scroll_to_offset(-5.0);
    assert_close(list.offset(), 0.0);
    assert_window_invariants(&list);
}

#[test]
fn set_list_keeps_begin_and_prunes_sizes() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.set_item_size(3, 50.0);
    list.set_item_size(80, 50.0);
    list.scroll_to_offset(400.0);
    take(&events);

    list.set_list(&items(0..60));
    assert!(list.size_store().contains(&3));
    assert!(!list.size_store().contains(&80));
    assert_close(list.state().list_total_size, 1230.0);
    assert_eq!(renders(&take(&events)), 1);
    assert_window_invariants(&list);

    list.set_list(&items(0..12));
    let s = list.state();
    assert_eq!((s.in_view_begin, s.in_view_end), (11, 11));
    assert_window_invariants(&list);
}

#[test]
fn set_list_forces_render_for_same_window() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    take(&events);
    list.set_list(&items(1000..1100));
    assert_eq!(renders(&take(&events)), 1);
    assert_window_invariants(&list);
}

#[test]
fn manual_render_sets_window_exactly() {
    let mut list = VirtList::new(opts(20.0).with_client_size(200.0), &items(0..100)).unwrap();
    list.set_item_size(0, 40.0);
    list.manual_render(10, 200);
    let s = list.state();
    assert_eq!((s.render_begin, s.render_end), (10, 99));
    assert_close(s.virtual_size, 220.0);
}

#[test]
fn item_size_passthroughs_keep_totals() {
    let mut list = VirtList::new(
        opts(20.0).with_client_size(200.0).with_item_gap(4.0),
        &items(0..10),
    )
    .unwrap();
    assert_close(list.size_store().default_size(), 24.0);
    assert_close(list.state().list_total_size, 240.0);

    list.set_item_size(2, 50.0);
    assert_close(list.get_item_size(&2), 50.0);
    assert_close(list.state().list_total_size, 266.0);

    list.delete_item_size(&2);
    assert_close(list.get_item_size(&2), 24.0);
    assert_close(list.state().list_total_size, 240.0);

    // Unknown keys are stored but do not count toward the list.
    list.set_item_size(77, 50.0);
    assert_close(list.state().list_total_size, 240.0);
    assert_window_invariants(&list);
}

#[test]
fn reset_clears_measurements_and_scrolls_home() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.set_item_size(5, 80.0);
    list.scroll_to_index(40);
    take(&events);

    list.reset();
    let s = list.state();
    assert_close(s.offset, 0.0);
    assert_eq!((s.in_view_begin, s.in_view_end), (0, 10));
    assert!(list.size_store().is_empty());
    assert_close(s.list_total_size, 2000.0);
    assert_eq!(list.index_seek_status(), SeekStatus::Idle);
    let events = take(&events);
    assert!(events.contains(&VirtListEvent::ScrollTo { offset: 0.0 }));
    assert_eq!(renders(&events), 1);
}

#[test]
fn initial_index_and_offset_apply_on_construction() {
    let list = VirtList::new(
        opts(20.0).with_client_size(200.0).with_initial_index(30),
        &items(0..100),
    )
    .unwrap();
    assert_close(list.offset(), 600.0);
    assert_eq!(list.index_seek_status(), SeekStatus::Seeking);

    let list = VirtList::new(
        opts(20.0).with_client_size(200.0).with_initial_offset(300.0),
        &items(0..100),
    )
    .unwrap();
    assert_close(list.offset(), 300.0);
    assert_eq!(list.state().in_view_begin, 15);
}

#[test]
fn reactivate_republishes_and_teardown_drops_pending_work() {
    let (mut list, events) = recorded(opts(20.0).with_client_size(200.0), &items(0..100));
    list.on_scroll(400.0, 0);
    list.advance(16);
    take(&events);

    list.reactivate();
    assert_eq!(renders(&take(&events)), 1);
    assert_eq!(list.state().in_view_begin, 20);

    list.observe(Region::Item(20), 40.0, 20);
    list.teardown();
    assert_eq!(list.next_deadline(), None);
    assert!(!list.is_scrolling());
    assert!(list.size_store().is_empty());
    assert_close(list.slot_sizes().client_size, 0.0);
}

#[test]
fn render_directive_indices() {
    let empty = RenderDirective::default();
    assert!(empty.is_empty());
    let d = RenderDirective {
        render_begin: 3,
        render_end: 7,
        virtual_size: 60.0,
        total_size: 200.0,
        item_count: 10,
    };
    assert_eq!(d.indices(), 3..8);
    assert!(!d.is_empty());
}

#[test]
fn random_operations_keep_bookkeeping_exact() {
    let mut rng = Lcg::new(0x5eed);
    let mut list = VirtList::new(
        opts(20.0).with_client_size(300.0).with_buffer(3),
        &items(0..300),
    )
    .unwrap();
    let mut now = 0u64;
    let mut next_key = 1_000u32;

    for _ in 0..400 {
        now += rng.gen_range_u64(1, 40);
        match rng.gen_range_u32(0, 6) {
            0 | 1 => {
                let offset = rng.gen_range_u64(0, 8_000) as f64;
                list.on_scroll(offset, now);
            }
            2 => {
                let d = list.render_directive();
                for i in d.indices() {
                    let key = list.keys()[i];
                    let size = rng.gen_range_u32(10, 60) as f64;
                    list.observe(Region::Item(key), size, now);
                }
            }
            3 => {
                let n = rng.gen_range_u32(1, 5);
                let added: Vec<u32> = (next_key..next_key + n).collect();
                next_key += n;
                let mut all = added.clone();
                all.extend_from_slice(list.keys());
                list.added_list_to_top(&all, &added);
            }
            4 if list.len() > 10 => {
                let n = rng.gen_range_u32(1, 5) as usize;
                let keys = list.keys().to_vec();
                list.deleted_list_to_top(&keys[n..], &keys[..n]);
            }
            _ => {
                let index = rng.gen_range_u32(0, list.len() as u32) as usize;
                list.scroll_to_index(index);
            }
        }
        assert_window_invariants(&list);
    }
    list.advance(now + 1_000);
    assert_window_invariants(&list);
}
