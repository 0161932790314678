use proptest::prelude::*;
use seabattle::{Message, Orientation, ProtocolError, ShipPlacement, BOARD_SIZE};

fn placement() -> impl Strategy<Value = ShipPlacement> {
    (
        1..=BOARD_SIZE,
        0..BOARD_SIZE,
        0..BOARD_SIZE,
        prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)],
    )
        .prop_map(|(size, x, y, o)| ShipPlacement::new(size, x, y, o))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ship_layout_survives_the_wire(layout in prop::collection::vec(placement(), 1..12)) {
        let msg = Message::Ships(layout);
        let parsed = Message::parse(&msg.encode()).unwrap();
        prop_assert_eq!(parsed, Some(msg));
    }

    #[test]
    fn attack_survives_the_wire(x in 0..BOARD_SIZE, y in 0..BOARD_SIZE) {
        let msg = Message::Attack { x, y };
        prop_assert_eq!(Message::parse(&msg.encode()).unwrap(), Some(msg));
    }

    #[test]
    fn arbitrary_text_never_panics(s in "\\PC{0,40}") {
        let _ = Message::parse(&s);
    }
}

#[test]
fn wire_forms() {
    let layout = vec![
        ShipPlacement::new(4, 0, 0, Orientation::Horizontal),
        ShipPlacement::new(1, 9, 9, Orientation::Vertical),
    ];
    assert_eq!(
        Message::Ships(layout).encode(),
        "SHIP 4 0 0 H SHIP 1 9 9 V"
    );
    assert_eq!(Message::Attack { x: 3, y: 7 }.encode(), "ATTACK 3 7");
    assert_eq!(Message::verdict(true).encode(), "HIT");
    assert_eq!(Message::verdict(false).encode(), "MISS");
    assert_eq!(Message::Win.encode(), "WIN");
}

#[test]
fn unknown_commands_are_ignored() {
    assert_eq!(Message::parse("HELLO there"), Ok(None));
    assert_eq!(Message::parse("hit"), Ok(None));
}

#[test]
fn malformed_frames_are_errors() {
    assert_eq!(Message::parse(""), Err(ProtocolError::Empty));
    assert_eq!(Message::parse("   "), Err(ProtocolError::Empty));
    assert!(matches!(
        Message::parse("ATTACK 3"),
        Err(ProtocolError::MissingField { field: "y", .. })
    ));
    assert!(matches!(
        Message::parse("ATTACK x 3"),
        Err(ProtocolError::InvalidNumber { field: "x", .. })
    ));
    assert!(matches!(
        Message::parse("ATTACK 3 10"),
        Err(ProtocolError::OutOfBounds { field: "y", value: 10, .. })
    ));
    assert!(matches!(
        Message::parse("ATTACK -1 2"),
        Err(ProtocolError::InvalidNumber { .. })
    ));
    assert!(matches!(
        Message::parse("ATTACK 1 2 3"),
        Err(ProtocolError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        Message::parse("MISS now"),
        Err(ProtocolError::UnexpectedToken { .. })
    ));
    assert_eq!(
        Message::parse("SHIP 4 0 0 D"),
        Err(ProtocolError::InvalidOrientation("D".into()))
    );
    assert!(matches!(
        Message::parse("SHIP 4 0 0 H 3 1 1 V"),
        Err(ProtocolError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        Message::parse("SHIP 0 0 0 H"),
        Err(ProtocolError::OutOfBounds { field: "size", .. })
    ));
    assert!(matches!(
        Message::parse("SHIP 4 0 0"),
        Err(ProtocolError::MissingField { field: "orientation", .. })
    ));
}
