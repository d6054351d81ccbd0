use virtlist::{Region, SeekStatus, VirtList, VirtListOptions};

/// Pretend layout: every item is 20 + (key % 5) * 8 tall.
fn measured_size(key: u32) -> f64 {
    20.0 + f64::from(key % 5) * 8.0
}

fn main() {
    let items: Vec<u32> = (0..10_000).collect();
    let opts = VirtListOptions::new_with_key(20.0, |item: &u32| *item)
        .with_client_size(600.0)
        .with_buffer(3);
    let mut list = match VirtList::new(opts, &items) {
        Ok(list) => list,
        Err(err) => {
            eprintln!("invalid options: {err}");
            return;
        }
    };

    let mut now = 0;
    list.scroll_to_index(2_500);
    println!("first estimate: offset={}", list.offset());

    // Measure whatever is rendered until the seek settles.
    while list.index_seek_status() == SeekStatus::Seeking && now < 1_000 {
        let d = list.render_directive();
        let observations: Vec<_> = d
            .indices()
            .map(|i| {
                let key = list.keys()[i];
                (Region::Item(key), measured_size(key))
            })
            .collect();
        list.observe_many(observations, now);
        now += 16;
        list.advance(now);
        println!(
            "t={now} offset={} begin={} status={:?}",
            list.offset(),
            list.state().in_view_begin,
            list.index_seek_status()
        );
    }
}
