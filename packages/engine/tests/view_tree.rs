//! Integration tests for the view tree: observers, events and rendering

use quire_engine::dev_utils::{get_view_data, set_view_data};
use quire_engine::{
    DataTransfer, DomEvent, DomMutation, DomPosition, DomSelection, KeyData, MemorySurface,
    ObserverKind, Priority, ViewEvent, ViewFragment, ViewMutation, ViewNode, ViewTree,
    INLINE_FILLER, INLINE_FILLER_LENGTH,
};
use std::cell::RefCell;
use std::rc::Rc;

const FILLER_CASE: &str = "<container:p><attribute:strong>foo</attribute:strong>[]<attribute:strong>bar</attribute:strong></container:p>";

fn tree_with(notation: &str) -> (ViewTree, MemorySurface) {
    let mut tree = ViewTree::with_default_observers();
    let surface = MemorySurface::default();
    tree.create_root(surface.clone(), "main").unwrap();
    set_view_data(tree.state_mut(), "main", notation).unwrap();
    tree.render().unwrap();
    (tree, surface)
}

fn key_down(key: &str) -> DomEvent {
    DomEvent::KeyDown {
        root: "main".to_string(),
        key: KeyData::new(key),
    }
}

#[test]
fn test_inline_filler_is_rendered_between_attribute_elements() {
    let (_, surface) = tree_with(FILLER_CASE);

    assert_eq!(
        surface.to_html(),
        format!("<p><strong>foo</strong>{}<strong>bar</strong></p>", INLINE_FILLER)
    );
    assert_eq!(
        surface.selection(),
        Some(DomSelection::collapsed(DomPosition::new(
            vec![0, 1],
            INLINE_FILLER_LENGTH
        )))
    );
}

#[test]
fn test_typing_into_the_filler() {
    let (mut tree, surface) = tree_with(FILLER_CASE);

    tree.on("mutations", Priority::NORMAL, |_, state, event| {
        if let ViewEvent::Mutations { mutations, .. } = event {
            for mutation in mutations.iter() {
                if let ViewMutation::FillerText { text, .. } = mutation {
                    let fragment = ViewFragment::from_children(vec![ViewNode::text(text.clone())]);
                    state.insert_fragment_at_selection(fragment).unwrap();
                }
            }
        }
    });

    let fired = tree
        .dispatch(DomEvent::Mutations {
            root: "main".to_string(),
            mutations: vec![DomMutation::Text {
                path: vec![0, 1],
                data: format!("{}x", INLINE_FILLER),
            }],
        })
        .unwrap();

    assert_eq!(fired.len(), 1);
    assert_eq!(surface.to_html(), "<p><strong>foo</strong>x<strong>bar</strong></p>");
    assert_eq!(
        get_view_data(tree.state(), "main", false).unwrap(),
        "<p><strong>foo</strong>x[]<strong>bar</strong></p>"
    );
}

#[test]
fn test_unhandled_text_mutation_is_reverted() {
    let (mut tree, surface) = tree_with("<p>foo</p>");

    surface.set_text(&[0, 0], "fox");
    let fired = tree
        .dispatch(DomEvent::Mutations {
            root: "main".to_string(),
            mutations: vec![DomMutation::Text {
                path: vec![0, 0],
                data: "fox".to_string(),
            }],
        })
        .unwrap();

    match &fired[0] {
        ViewEvent::Mutations { mutations, .. } => {
            assert!(matches!(
                &mutations[0],
                ViewMutation::Text { old_text, new_text, .. } if old_text == "foo" && new_text == "fox"
            ));
        }
        other => panic!("Unexpected event {:?}", other),
    }
    assert_eq!(surface.to_html(), "<p>foo</p>");
}

#[test]
fn test_mutation_of_unknown_node_is_skipped() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    let fired = tree
        .dispatch(DomEvent::Mutations {
            root: "main".to_string(),
            mutations: vec![DomMutation::Children { path: vec![7] }],
        })
        .unwrap();
    assert!(fired.is_empty());
}

#[test]
fn test_selection_change_from_surface() {
    let (mut tree, surface) = tree_with("<p>foo</p><p>bar</p>");
    let selection = DomSelection::collapsed(DomPosition::new(vec![1, 0], 2));

    let fired = tree
        .dispatch(DomEvent::SelectionChange {
            root: "main".to_string(),
            selection: Some(selection.clone()),
        })
        .unwrap();

    assert!(matches!(
        &fired[0],
        ViewEvent::SelectionChange { old_selection, .. } if old_selection.is_empty()
    ));
    assert_eq!(
        get_view_data(tree.state(), "main", false).unwrap(),
        "<p>foo</p><p>ba{}r</p>"
    );
    assert_eq!(surface.selection(), Some(selection.clone()));

    // Reporting the same selection again is not a change
    let fired = tree
        .dispatch(DomEvent::SelectionChange {
            root: "main".to_string(),
            selection: Some(selection),
        })
        .unwrap();
    assert!(fired.is_empty());
}

#[test]
fn test_stopped_selection_change_keeps_selection() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    tree.on("selectionChange", Priority::HIGH, |info, _, _| info.stop());

    tree.dispatch(DomEvent::SelectionChange {
        root: "main".to_string(),
        selection: Some(DomSelection::collapsed(DomPosition::new(vec![0, 0], 1))),
    })
    .unwrap();

    assert!(tree.selection().is_empty());
}

#[test]
fn test_render_twice_is_a_noop() {
    let (mut tree, _) = tree_with(FILLER_CASE);
    let stats = tree.render().unwrap();
    assert!(stats.is_noop());
}

#[test]
fn test_observer_attachment_order_does_not_matter() {
    let run = |kinds: Vec<ObserverKind>| {
        let mut tree = ViewTree::new();
        for kind in kinds {
            tree.add_observer(kind);
        }
        let surface = MemorySurface::default();
        tree.create_root(surface.clone(), "main").unwrap();
        set_view_data(tree.state_mut(), "main", "<p>foo</p><p>bar</p>").unwrap();
        tree.render().unwrap();

        tree.dispatch(DomEvent::Focus {
            root: "main".to_string(),
        })
        .unwrap();
        tree.dispatch(DomEvent::SelectionChange {
            root: "main".to_string(),
            selection: Some(DomSelection::collapsed(DomPosition::new(vec![0, 0], 3))),
        })
        .unwrap();
        tree.dispatch(key_down("a")).unwrap();

        (surface.to_html(), surface.selection(), *tree.selection())
    };

    let forward = ObserverKind::ALL.to_vec();
    let mut backward = forward.clone();
    backward.reverse();

    let (html_a, dom_a, selection_a) = run(forward);
    let (html_b, dom_b, _) = run(backward);
    assert_eq!(html_a, html_b);
    assert_eq!(dom_a, dom_b);
    assert!(selection_a.is_collapsed());
}

#[test]
fn test_observer_added_after_root_observes_it() {
    let mut tree = ViewTree::new();
    tree.create_root(MemorySurface::default(), "main").unwrap();
    assert!(tree.dispatch(key_down("a")).unwrap().is_empty());

    tree.add_observer(ObserverKind::Key);
    assert_eq!(tree.dispatch(key_down("a")).unwrap().len(), 1);
}

#[test]
fn test_disabled_observer_ignores_events() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    tree.observer_mut(ObserverKind::Key).unwrap().disable();
    assert!(tree.dispatch(key_down("a")).unwrap().is_empty());

    tree.observer_mut(ObserverKind::Key).unwrap().enable();
    assert_eq!(tree.dispatch(key_down("a")).unwrap().len(), 1);
}

#[test]
fn test_listeners_run_by_priority_and_stop() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    let calls = Rc::new(RefCell::new(Vec::new()));

    let log = calls.clone();
    tree.on("keydown", Priority::LOW, move |_, _, _| log.borrow_mut().push("low"));
    let log = calls.clone();
    tree.on("keydown", Priority::HIGH, move |_, _, _| log.borrow_mut().push("high"));
    let log = calls.clone();
    tree.on("keydown", Priority::NORMAL, move |info, _, _| {
        log.borrow_mut().push("normal");
        info.stop();
    });

    tree.dispatch(key_down("Enter")).unwrap();
    assert_eq!(*calls.borrow(), vec!["high", "normal"]);
}

#[test]
fn test_off_removes_listener() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    let calls = Rc::new(RefCell::new(0));

    let count = calls.clone();
    let id = tree.on("keyup", Priority::NORMAL, move |_, _, _| *count.borrow_mut() += 1);
    tree.dispatch(DomEvent::KeyUp {
        root: "main".to_string(),
        key: KeyData::new("a"),
    })
    .unwrap();

    assert!(tree.off(id));
    tree.dispatch(DomEvent::KeyUp {
        root: "main".to_string(),
        key: KeyData::new("a"),
    })
    .unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn test_paste_raises_clipboard_input() {
    let (mut tree, _) = tree_with("<p>[]</p>");
    let data_transfer = DataTransfer::new().with_data("text/html", "<b>x</b>");

    let fired = tree
        .dispatch(DomEvent::Paste {
            root: "main".to_string(),
            data_transfer: data_transfer.clone(),
        })
        .unwrap();

    assert_eq!(
        fired,
        vec![ViewEvent::ClipboardInput {
            root: "main".to_string(),
            data_transfer,
        }]
    );
}

#[test]
fn test_focus_and_blur_track_focused_root() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    let focus = DomEvent::Focus {
        root: "main".to_string(),
    };

    assert_eq!(tree.dispatch(focus.clone()).unwrap().len(), 1);
    assert_eq!(tree.state().focused_root(), Some("main"));

    // Already focused
    assert!(tree.dispatch(focus).unwrap().is_empty());

    tree.dispatch(DomEvent::Blur {
        root: "main".to_string(),
    })
    .unwrap();
    assert_eq!(tree.state().focused_root(), None);
}

#[test]
fn test_custom_event_reaches_listeners() {
    let (mut tree, _) = tree_with("<p>foo</p>");
    tree.on("ping", Priority::NORMAL, |_, _, event| {
        if let ViewEvent::Custom { payload, .. } = event {
            payload.push_str("-pong");
        }
    });

    let event = tree
        .fire(ViewEvent::Custom {
            name: "ping".to_string(),
            payload: "ping".to_string(),
        })
        .unwrap();
    assert!(matches!(event, ViewEvent::Custom { ref payload, .. } if payload == "ping-pong"));
}
