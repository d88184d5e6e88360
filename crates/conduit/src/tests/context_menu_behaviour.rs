//! Behaviour of `ContextMenu.OpenContextMenu` requests.

use rstest::{fixture, rstest};
use serde_json::json;

use conduit_types::ContextMenuData;

use crate::registry::Bindings;

use super::support::{Harness, Push};

#[fixture]
fn harness() -> Harness {
    Harness::new(Bindings::default())
}

#[rstest]
fn opens_menu_on_issuing_window(harness: Harness) {
    let ack = harness.send(
        "ContextMenu.OpenContextMenu",
        &json!({ "id": "files", "x": 120, "y": 48, "data": { "path": "/tmp/a.txt" } }),
        &[],
    );

    assert_eq!(ack.status(), 200);
    assert_eq!(
        harness.window.pushes(),
        vec![Push::ContextMenu(ContextMenuData {
            id: "files".to_owned(),
            x: 120,
            y: 48,
            data: json!({ "path": "/tmp/a.txt" }),
        })]
    );
}

#[rstest]
fn missing_fields_default(harness: Harness) {
    harness.send("ContextMenu.OpenContextMenu", &json!({ "id": "bare" }), &[]);

    match harness.window.pushes().as_slice() {
        [Push::ContextMenu(data)] => {
            assert_eq!(data.id, "bare");
            assert_eq!((data.x, data.y), (0, 0));
            assert!(data.data.is_null());
        }
        other => panic!("unexpected pushes: {other:?}"),
    }
}

#[rstest]
fn malformed_payload_fails_on_transport(harness: Harness) {
    let ack = harness.send(
        "ContextMenu.OpenContextMenu",
        &json!({ "id": "files", "x": "left" }),
        &[],
    );

    assert_eq!(ack.status(), 400);
    assert!(ack.body().starts_with("error parsing contextmenu options: "));
    assert!(harness.settle().is_empty());
}

#[rstest]
#[case::wrong_case("ContextMenu.openContextMenu")]
#[case::unknown("ContextMenu.Close")]
fn unknown_methods_are_rejected(harness: Harness, #[case] method: &str) {
    let ack = harness.send(method, &json!({ "id": "files" }), &[]);

    assert_eq!(ack.status(), 400);
    assert!(ack.body().starts_with("unknown ContextMenu method: "));
    assert!(harness.window.pushes().is_empty());
}
