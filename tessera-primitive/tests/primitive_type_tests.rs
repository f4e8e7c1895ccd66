use tessera_primitive::{Ordering, PrimitiveType};

const TREE: PrimitiveType = PrimitiveType::new("document-tree");

#[test]
fn canonical_type_is_unordered() {
    assert!(!TREE.is_ordered());
    assert_eq!(TREE.ordering(), None);
    assert_eq!(TREE.to_string(), "document-tree");
}

#[test]
fn ordered_variant_keeps_base_identity() {
    for ordering in [Ordering::Natural, Ordering::Insertion] {
        let ordered = TREE.ordered(ordering);
        assert_eq!(ordered.name(), TREE.name());
        assert_eq!(ordered.ordering(), Some(ordering));
        assert!(ordered.is_same_kind(&TREE));
        assert_ne!(ordered, TREE);
    }
}

#[test]
fn unordered_resets_only_the_ordering() {
    let ordered = TREE.ordered(Ordering::Natural);
    assert_eq!(ordered.unordered(), TREE);
}

#[test]
fn ordered_is_pure() {
    assert_eq!(TREE.ordered(Ordering::Natural), TREE.ordered(Ordering::Natural));
    assert_ne!(TREE.ordered(Ordering::Natural), TREE.ordered(Ordering::Insertion));
}

#[test]
fn ordered_display() {
    assert_eq!(TREE.ordered(Ordering::Natural).to_string(), "document-tree[natural]");
    assert_eq!(TREE.ordered(Ordering::Insertion).to_string(), "document-tree[insertion]");
}

#[test]
fn named_matches_const() {
    assert_eq!(PrimitiveType::named("document-tree"), TREE);
}

#[test]
fn serde_roundtrip_preserves_ordering() {
    let ordered = TREE.ordered(Ordering::Insertion);
    let json = serde_json::to_string(&ordered).unwrap();
    assert!(json.contains("insertion"));
    let parsed: PrimitiveType = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ordered);

    let canonical = serde_json::to_string(&TREE).unwrap();
    assert!(!canonical.contains("ordering"));
}
