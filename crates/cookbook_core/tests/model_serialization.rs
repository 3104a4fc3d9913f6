use cookbook_core::{Category, Ingredient, NewIngredient};

#[test]
fn category_rename_keeps_name_when_absent() {
    let mut category = Category::new(1, "Dairy");

    assert!(!category.rename(None));
    assert_eq!(category.name, "Dairy");

    assert!(category.rename(Some("Dairy2".to_string())));
    assert_eq!(category.name, "Dairy2");
}

#[test]
fn ingredient_serialization_uses_expected_wire_fields() {
    let ingredient = NewIngredient::new(3, "Milk", "cold").into_ingredient(7);

    let json = serde_json::to_value(&ingredient).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["name"], "Milk");
    assert_eq!(json["notes"], "cold");
    assert_eq!(json["category_id"], 3);

    let decoded: Ingredient = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, ingredient);
}

#[test]
fn name_length_is_counted_in_characters() {
    let name = "é".repeat(cookbook_core::NAME_MAX_CHARS);
    assert!(Category::new(1, name.clone()).validate().is_ok());
    assert!(NewIngredient::new(1, name, "").validate().is_ok());
}
