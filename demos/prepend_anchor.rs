use virtlist::{VirtList, VirtListEvent, VirtListOptions};

fn main() {
    let messages: Vec<u32> = (100..200).collect();
    let opts = VirtListOptions::new_with_key(50.0, |id: &u32| *id)
        .with_client_size(500.0)
        .with_on_event(Some(|event: &VirtListEvent<u32>| {
            // The host moves its scroll container here.
            if let VirtListEvent::ScrollTo { offset } = event {
                println!("host scroll -> {offset}");
            }
        }));
    let mut list = match VirtList::new(opts, &messages) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("invalid options: {err}");
            return;
        }
    };

    list.scroll_to_offset(1_000.0);
    let anchor = list.keys()[list.state().in_view_begin];
    println!("offset={} top item={anchor}", list.offset());

    // Older history arrives above the current content.
    let older: Vec<u32> = (95..100).collect();
    let mut all = older.clone();
    all.extend_from_slice(&messages);
    list.added_list_to_top(&all, &older);

    let anchor = list.keys()[list.state().in_view_begin];
    println!("offset={} top item={anchor}", list.offset());
}
