use super::{plain, rect, shaped, value};
use crate::{BindError, Component, ComponentConfig, GridError, OverlapPolicy, SlotGrid};
use std::collections::BTreeSet;

fn sparse_grid() -> SlotGrid {
    SlotGrid::rows([
        vec![false, true],
        vec![false, true],
        vec![true, false, true],
        vec![],
        vec![false, false, true, false, true],
        vec![true, true, true, true],
    ])
    .unwrap()
}

#[test]
fn lock_marks_a_component_in_use() {
    let child = plain(1, 1);
    let other = plain(1, 1);
    let holder = plain(1, 1);
    holder.lock().unwrap();

    assert!(child.parent().is_none());
    assert!(holder.parent().is_none());

    holder.bind(&child, 0, OverlapPolicy::Reject).unwrap();

    assert_eq!(
        other.bind(&child, 0, OverlapPolicy::Reject),
        Err(BindError::AlreadyInUse)
    );
    assert_eq!(child.lock(), Err(BindError::AlreadyInUse));
    assert_eq!(
        other.bind(&holder, 0, OverlapPolicy::Reject),
        Err(BindError::AlreadyInUse)
    );
}

#[test]
fn unbind_releases_the_hook_for_reuse() {
    let first = plain(1, 1);
    let second = plain(1, 1);
    let child_a = plain(1, 1);
    let child_b = plain(1, 1);

    first.bind(&child_a, 0, OverlapPolicy::Reject).unwrap();
    first.unbind(&child_a);
    second.bind(&child_a, 0, OverlapPolicy::Reject).unwrap();
    assert_eq!(
        first.bind(&child_a, 0, OverlapPolicy::Reject),
        Err(BindError::AlreadyInUse)
    );
    first.bind(&child_b, 0, OverlapPolicy::Reject).unwrap();
    second.unbind(&child_a);
    first.unbind(&child_b);
    first.bind(&child_a, 0, OverlapPolicy::Reject).unwrap();
    second.bind(&child_b, 0, OverlapPolicy::Reject).unwrap();
}

#[test]
fn unbind_of_unbound_child_is_a_noop() {
    let parent = plain(2, 2);
    let stranger = plain(1, 1);
    parent.unbind(&stranger);
    assert!(!stranger.is_locked());
    assert!(parent.children().is_empty());
}

#[test]
fn bind_then_unbind_restores_prebind_state() {
    let parent = plain(2, 2);
    let child = plain(1, 1);

    parent.bind(&child, 3, OverlapPolicy::Reject).unwrap();
    assert!(child.is_locked());
    assert_eq!(parent.child_at(3), Some(child.clone()));

    parent.unbind(&child);
    assert!(!child.is_locked());
    assert!(child.parent().is_none());
    assert_eq!(parent.child_at(3), None);
    assert!(parent.children().is_empty());
}

#[test]
fn binding_a_component_into_itself_fails() {
    let node = plain(1, 1);
    assert_eq!(
        node.bind(&node.clone(), 0, OverlapPolicy::Reject),
        Err(BindError::Cycle)
    );
}

#[test]
fn deep_cycles_are_rejected() {
    let top = plain(1, 1);
    let mid = plain(1, 1);
    let low = plain(1, 1);
    let leaf = plain(1, 1);

    top.bind(&mid, 0, OverlapPolicy::Reject).unwrap();
    mid.bind(&low, 0, OverlapPolicy::Reject).unwrap();
    low.bind(&leaf, 0, OverlapPolicy::Reject).unwrap();

    assert_eq!(
        leaf.bind(&top, 0, OverlapPolicy::Reject),
        Err(BindError::Cycle)
    );

    let fresh = plain(1, 1);
    leaf.bind(&fresh, 0, OverlapPolicy::Reject).unwrap();
}

#[test]
fn rectangular_binding_checks_fit_and_overlap() {
    let parent = plain(4, 4);
    let upper = plain(2, 4);

    parent.bind(&upper, 0, OverlapPolicy::Reject).unwrap();

    // Same child again: in-use wins over overlap.
    assert_eq!(
        parent.bind(&upper, 8, OverlapPolicy::Reject),
        Err(BindError::AlreadyInUse)
    );

    // Start slot 9 puts a 4-wide child one column too far right.
    assert!(matches!(
        parent.bind(&plain(2, 4), 9, OverlapPolicy::Reject),
        Err(BindError::Grid(GridError::PositionOutOfRange { .. }))
    ));

    // Rows 1-2 are partly occupied by `upper`.
    assert!(matches!(
        parent.bind(&plain(2, 3), 5, OverlapPolicy::Reject),
        Err(BindError::Overlap { .. })
    ));

    parent.bind(&plain(2, 4), 8, OverlapPolicy::Reject).unwrap();

    assert!(matches!(
        parent.bind(&plain(1, 3), 17, OverlapPolicy::Reject),
        Err(BindError::Grid(GridError::IndexOutOfRange { .. }))
    ));
}

#[test]
fn sparse_shapes_validate_against_sparse_parents() {
    let sparse = shaped(sparse_grid());

    // A 2x1 child starting at the lone slot of row 0 would need (1, 1),
    // which exists in the sparse grid but is unreserved.
    assert!(matches!(
        sparse.bind(&plain(2, 1), 1, OverlapPolicy::Reject),
        Err(BindError::Grid(GridError::SlotNotReserved { .. }))
    ));

    let parent = plain(10, 10);
    parent.bind(&sparse, 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&plain(1, 1), 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&plain(1, 1), 2, OverlapPolicy::Reject).unwrap();

    // Slot 1 displays the sparse child's first cell.
    assert!(matches!(
        parent.bind(&plain(1, 1), 1, OverlapPolicy::Reject),
        Err(BindError::Overlap { .. })
    ));
    parent.bind(&plain(1, 1), 10, OverlapPolicy::Reject).unwrap();
    assert!(matches!(
        parent.bind(&plain(1, 1), 11, OverlapPolicy::Reject),
        Err(BindError::Overlap { .. })
    ));
    parent.bind(&plain(1, 8), 12, OverlapPolicy::Reject).unwrap();
    parent.bind(&plain(1, 10), 30, OverlapPolicy::Reject).unwrap();
}

#[test]
fn evict_policy_displaces_the_previous_occupant() {
    let parent = plain(2, 2);
    let first = plain(1, 2);
    let second = plain(1, 1);

    parent.bind(&first, 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&second, 0, OverlapPolicy::Evict).unwrap();

    assert!(!first.is_locked());
    assert!(first.parent().is_none());
    assert_eq!(parent.child_at(0), Some(second));
    // Eviction removes every slot of the displaced child, not just the
    // contested one.
    assert_eq!(parent.child_at(1), None);
}

#[test]
fn children_are_distinct_and_filterable() {
    let parent = plain(4, 4);
    let wide_a = plain(1, 2);
    let small_a = plain(1, 1);
    let wide_b = plain(1, 2);
    let small_b = plain(1, 1);

    parent.bind(&wide_a, 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&small_a, 2, OverlapPolicy::Reject).unwrap();
    parent.bind(&wide_b, 4, OverlapPolicy::Reject).unwrap();
    parent.bind(&small_b, 6, OverlapPolicy::Reject).unwrap();

    let children = parent.children();
    assert_eq!(children.len(), 4);

    let wide = parent.children_where(|child| child.grid().total_reserved() == 2);
    assert_eq!(wide, vec![wide_a.clone(), wide_b.clone()]);

    let small = parent.children_where(|child| child.grid().total_reserved() == 1);
    assert_eq!(small, vec![small_a, small_b]);
}

#[test]
fn child_at_covers_every_occupied_slot() {
    let parent = shaped(sparse_grid());
    let tall = plain(2, 1);
    let row = plain(1, 4);

    parent.bind(&tall, 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&row, 6, OverlapPolicy::Reject).unwrap();

    assert_eq!(parent.child_at(0), Some(tall.clone()));
    assert_eq!(parent.child_at(1), Some(tall));
    assert_eq!(parent.child_at(6), Some(row.clone()));
    assert_eq!(parent.child_at(9), Some(row));
}

#[test]
fn index_maps_between_parent_and_child() {
    let l_piece = shaped(SlotGrid::rows([vec![true], vec![false, true]]).unwrap());
    let j_piece = shaped(SlotGrid::rows([vec![false, true], vec![true]]).unwrap());
    let parent = plain(2, 2);

    parent.bind(&l_piece, 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&j_piece, 0, OverlapPolicy::Reject).unwrap();

    let l_map = parent.child_index_map(&l_piece);
    assert_eq!(l_map.len(), 2);
    assert_eq!(l_map[&0], BTreeSet::from([0]));
    assert_eq!(l_map[&1], BTreeSet::from([3]));

    let j_map = parent.child_index_map(&j_piece);
    assert_eq!(j_map[&0], BTreeSet::from([1]));
    assert_eq!(j_map[&1], BTreeSet::from([2]));

    assert_eq!(
        parent.slot_index_map(&l_piece),
        [(0, 0), (3, 1)].into_iter().collect()
    );
    assert_eq!(
        parent.slot_index_map(&j_piece),
        [(1, 0), (2, 1)].into_iter().collect()
    );

    assert_eq!(parent.slots_showing(&l_piece, 0), BTreeSet::from([0]));
    assert_eq!(parent.slots_showing(&l_piece, 1), BTreeSet::from([3]));
    assert_eq!(parent.slots_showing(&j_piece, 0), BTreeSet::from([1]));
    assert_eq!(parent.slots_showing(&j_piece, 1), BTreeSet::from([2]));
    assert!(parent.slots_showing(&l_piece, 2).is_empty());
}

#[test]
fn unbind_all_clears_every_binding() {
    let parent = plain(2, 2);
    let a = plain(1, 2);
    let b = plain(1, 2);
    parent.bind(&a, 0, OverlapPolicy::Reject).unwrap();
    parent.bind(&b, 2, OverlapPolicy::Reject).unwrap();

    parent.unbind_all();

    assert!(parent.children().is_empty());
    assert!(!a.is_locked());
    assert!(!b.is_locked());
    for slot in 0..4 {
        assert_eq!(parent.child_at(slot), None);
    }
}

#[test]
fn rerender_requests_bubble_and_keep_the_smallest_delay() {
    let root = plain(2, 2);
    root.lock().unwrap();
    let mid = plain(1, 2);
    let leaf = plain(1, 1);
    root.bind(&mid, 0, OverlapPolicy::Reject).unwrap();
    mid.bind(&leaf, 0, OverlapPolicy::Reject).unwrap();

    // Binding with auto-render on already queued a request at the root.
    assert!(root.take_render_request().is_some());

    leaf.request_rerender_within(7);
    assert_eq!(root.pending_render_request(), Some(7));
    mid.request_rerender_within(3);
    leaf.request_rerender_within(9);
    assert_eq!(root.pending_render_request(), Some(3));
    assert_eq!(root.take_render_request(), Some(3));
    assert_eq!(root.pending_render_request(), None);
}

#[test]
fn static_nodes_swallow_rerender_requests() {
    let root = plain(2, 2);
    root.lock().unwrap();
    let frozen = Component::new(
        rect(1, 2),
        ComponentConfig::new().static_render(true).auto_render(false),
    );
    let leaf = plain(1, 1);
    root.bind(&frozen, 0, OverlapPolicy::Reject).unwrap();
    frozen.bind(&leaf, 0, OverlapPolicy::Reject).unwrap();
    root.take_render_request();

    leaf.request_rerender();
    assert_eq!(root.pending_render_request(), None);
}

#[test]
fn auto_render_speed_is_carried_by_the_changed_node() {
    let root = plain(3, 3);
    root.lock().unwrap();
    let slow = Component::<u32, String>::new(
        rect(1, 2),
        ComponentConfig::new().auto_render_speed(5),
    );
    root.bind(&slow, 0, OverlapPolicy::Reject).unwrap();
    root.take_render_request();

    // A structural change inside `slow` defers up to its own speed.
    slow.bind(&value(9), 0, OverlapPolicy::Reject).unwrap();
    assert_eq!(root.pending_render_request(), Some(5));

    // A faster change elsewhere tightens the pending delay.
    root.bind(&value(1), 8, OverlapPolicy::Reject).unwrap();
    assert_eq!(root.pending_render_request(), Some(1));
}
