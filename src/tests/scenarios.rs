//! End-to-end scenarios through the container.

use crate::adapter::QueuedElementFactory;
use crate::config::ListConfig;
use crate::container::{LayoutOutput, ListContainer};
use crate::model::{DiffResult, ListType, Orientation, Size};
use crate::{BoundElement, PipelineOptions};

type List = ListContainer<QueuedElementFactory>;

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("item-{i}")).collect()
}

fn complete(list: &mut List) {
    loop {
        let pending = list.factory_mut().take_pending();
        if pending.is_empty() {
            return;
        }
        for request in pending {
            let element = BoundElement::new(list.factory_mut().create_element());
            list.on_finish_bind(element, &PipelineOptions::single(request.operation_id));
        }
    }
}

fn render(output: &LayoutOutput) -> String {
    let mut lines = vec![format!(
        "offset {} size {}",
        output.content_offset, output.content_size
    )];
    for child in &output.children {
        lines.push(format!(
            "{} [{}] {}..{} x{}+{}{}",
            child.item_key,
            child.index,
            child.main_start,
            child.main_end,
            child.cross_start,
            child.cross_size,
            if child.sticky { " sticky" } else { "" }
        ));
    }
    lines.join("\n")
}

fn single_list(count: usize, config: ListConfig, viewport: Size) -> List {
    let mut list = ListContainer::new(1, &config, QueuedElementFactory::new());
    list.update_viewport(viewport);
    list.update_data_source(&DiffResult::insert_all(keys(count)).with_estimated_sizes(vec![100.0; count]))
        .expect("valid diff");
    complete(&mut list);
    list
}

#[test]
fn waterfall_with_full_span_rows_scrolls_across_the_boundary() {
    let config = ListConfig {
        list_type: ListType::Waterfall,
        span_count: 2,
        ..ListConfig::default()
    };
    let mut list = ListContainer::new(7, &config, QueuedElementFactory::new());
    list.update_viewport(Size::new(300.0, 250.0));
    let sizes = vec![100.0, 150.0, 80.0, 120.0, 60.0, 100.0, 90.0, 50.0, 200.0, 70.0];
    let diff = DiffResult::insert_all(keys(10))
        .with_estimated_sizes(sizes)
        .with_full_spans(vec![2, 8]);
    list.update_data_source(&diff).expect("valid diff");
    complete(&mut list);

    insta::assert_snapshot!(render(&list.take_output()), @r"
    offset 0 size 710
    item-0 [0] 0..100 x0+150
    item-1 [1] 0..150 x150+150
    item-2 [2] 150..230 x0+300
    item-3 [3] 230..350 x0+150
    item-4 [4] 230..290 x150+150
    ");

    list.scroll_by(300.0);
    complete(&mut list);
    let output = list.take_output();
    assert_eq!(output.recycled, vec!["item-0", "item-1", "item-2", "item-4"]);
    assert_eq!(output.inserted, vec!["item-5", "item-6", "item-7", "item-8"]);
    insta::assert_snapshot!(render(&output), @r"
    offset 300 size 710
    item-3 [3] 230..350 x0+150
    item-5 [5] 290..390 x150+150
    item-6 [6] 350..440 x0+150
    item-7 [7] 390..440 x150+150
    item-8 [8] 440..640 x0+300
    ");
}

#[test]
fn removing_the_anchor_item_anchors_on_the_next_one() {
    let mut list = single_list(20, ListConfig::default(), Size::new(300.0, 250.0));
    list.scroll_by(450.0);
    complete(&mut list);

    let mut remaining = keys(20);
    remaining.remove(4);
    let diff = DiffResult {
        item_keys: remaining,
        removals: vec![4],
        ..DiffResult::default()
    }
    .with_estimated_sizes(vec![100.0; 19]);
    list.update_data_source(&diff).expect("valid diff");

    assert_eq!(list.content_offset(), 350.0);
    let top = list.adapter().item_holder("item-5").map(|h| h.top());
    assert_eq!(top, Some(400.0));
    assert!(list.adapter().item_holder("item-4").is_none());
}

#[test]
fn updated_item_rebinds_while_neighbours_keep_their_element() {
    let mut list = single_list(10, ListConfig::default(), Size::new(300.0, 250.0));
    let before: Vec<_> = (0..3)
        .map(|i| list.adapter().item_holder_for_index(i).and_then(|h| h.element()))
        .collect();

    let diff = DiffResult {
        item_keys: keys(10),
        update_from: vec![1],
        update_to: vec![1],
        ..DiffResult::default()
    }
    .with_estimated_sizes(vec![100.0; 10]);
    list.update_data_source(&diff).expect("valid diff");
    let pending: Vec<usize> = list.factory().pending().iter().map(|r| r.index).collect();
    assert_eq!(pending, vec![1], "Only the updated row is rebound");
    complete(&mut list);

    let after: Vec<_> = (0..3)
        .map(|i| list.adapter().item_holder_for_index(i).and_then(|h| h.element()))
        .collect();
    assert_eq!(after[0], before[0]);
    assert_ne!(after[1], before[1]);
    assert_eq!(after[2], before[2]);
    assert_eq!(list.take_output().children.len(), 3);
}

#[test]
fn horizontal_list_lays_out_along_x() {
    let config = ListConfig {
        orientation: Orientation::Horizontal,
        ..ListConfig::default()
    };
    let mut list = single_list(10, config, Size::new(250.0, 80.0));
    list.take_output();
    list.scroll_by(150.0);
    complete(&mut list);

    insta::assert_snapshot!(render(&list.take_output()), @r"
    offset 150 size 1000
    item-1 [1] 100..200 x0+80
    item-2 [2] 200..300 x0+80
    item-3 [3] 300..400 x0+80
    ");
}

#[test]
fn preload_buffer_binds_beyond_the_viewport() {
    let config = ListConfig {
        preload_buffer_count: 2,
        ..ListConfig::default()
    };
    let mut list = single_list(20, config, Size::new(300.0, 250.0));
    list.scroll_by(500.0);
    let mut pending: Vec<usize> = list.factory().pending().iter().map(|r| r.index).collect();
    pending.sort_unstable();
    assert_eq!(pending, vec![5, 6, 7, 8, 9], "Rows 3 and 4 stay bound from the first screen");
    complete(&mut list);
    let indexes: Vec<usize> = list.take_output().children.iter().map(|c| c.index).collect();
    assert_eq!(indexes, vec![3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn shrinking_the_viewport_keeps_the_anchor() {
    let mut list = single_list(20, ListConfig::default(), Size::new(300.0, 250.0));
    list.scroll_by(430.0);
    complete(&mut list);
    list.update_viewport(Size::new(300.0, 120.0));
    assert_eq!(list.content_offset(), 430.0);
    let indexes: Vec<usize> = list
        .children()
        .on_screen_children()
        .iter()
        .map(|entry| entry.index)
        .collect();
    assert_eq!(indexes, vec![4, 5]);
}
