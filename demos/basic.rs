use virtlist::{VirtList, VirtListOptions};

fn main() {
    let items: Vec<u64> = (0..1_000_000).collect();
    let opts = VirtListOptions::new_with_key(20.0, |item: &u64| *item)
        .with_client_size(400.0)
        .with_buffer(5)
        .with_fixed(true);
    let mut list = match VirtList::new(opts, &items) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("invalid options: {err}");
            return;
        }
    };

    println!("views={} total_size={}", list.state().views, list.total_size());

    // A host scroll event. The range walk is capped per frame, so a long jump takes a few
    // frames to land.
    list.on_scroll(123_456.0, 0);
    list.advance(16);
    println!("after one frame: begin={}", list.state().in_view_begin);
    list.advance(4_000);
    let s = list.state();
    println!("visible={}..={}", s.in_view_begin, s.in_view_end);
    let d = list.render_directive();
    println!("render {:?} spacer={}", d.indices(), d.virtual_size);

    list.scroll_to_index(999_999);
    list.advance(32);
    println!("after scroll_to_index: offset={}", list.offset());
}
