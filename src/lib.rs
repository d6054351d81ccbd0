//! A headless windowing engine for long lists with variable item sizes.
//!
//! Only the slice of the list that intersects the viewport (plus a buffer) is rendered; the
//! skipped prefix is replaced by a spacer of `virtual_size`. This crate owns the bookkeeping
//! behind that:
//! - a key → size store with a `min_size + item_gap` fallback for unmeasured items
//! - offset → visible range, by a bounded walk from the previous range
//! - buffer expansion (or a caller-provided override) into a render window
//! - exact cumulative sizes under list mutation and live measurements
//! - scroll-to-index/top/bottom that converge as real sizes come in
//!
//! It is UI-agnostic. The host provides scroll offsets, size observations and the clock, and
//! renders whatever [`VirtListEvent::Render`] asks for.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod buffer;
mod error;
mod key;
mod options;
mod range;
mod reconcile;
mod scheduler;
mod scroll;
mod size_store;
mod state;
mod types;
mod virt_list;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use options::{EventCallback, ItemKeyFn, RenderControl, VirtListConfig, VirtListOptions};
pub use size_store::SizeStore;
pub use state::{ReactiveState, SlotSizes};
pub use types::{
    Axis, ItemPosition, Region, RenderDirective, ScrollDirection, SeekStatus, VirtListEvent,
};
pub use virt_list::VirtList;

#[doc(hidden)]
pub use key::KeyCacheKey;
