use movie_queue_core::{CategoryFilter, Item, ItemEntry, ItemValidationError, ALL_CATEGORIES};

#[test]
fn item_serializes_with_flat_fields() {
    let item = Item {
        id: 12,
        category: "comedy".to_string(),
        title: "Airplane".to_string(),
    };

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], 12);
    assert_eq!(json["category"], "comedy");
    assert_eq!(json["title"], "Airplane");

    let decoded: Item = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, item);
}

#[test]
fn entry_drops_category() {
    let entry = ItemEntry {
        id: 3,
        title: "Heat".to_string(),
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert!(json.get("category").is_none());
}

#[test]
fn validation_errors_have_readable_messages() {
    assert_eq!(
        ItemValidationError::BlankTitle.to_string(),
        "title cannot be blank"
    );
    assert_eq!(
        ItemValidationError::InvalidId(-1).to_string(),
        "invalid item id `-1`"
    );
}

#[test]
fn all_sentinel_parses_to_all_filter() {
    assert_eq!(CategoryFilter::parse(ALL_CATEGORIES), CategoryFilter::All);
}
