//! Unit alias resolution - maps authored unit strings to canonical unit ids

use std::collections::HashMap;
use std::sync::LazyLock;

static ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let table: &[(&str, &[&str])] = &[
        // Volume
        ("ml", &["milliliter", "milliliters", "millilitre", "millilitres", "mls"]),
        ("l", &["liter", "liters", "litre", "litres", "ltr"]),
        ("tsp", &["teaspoon", "teaspoons", "tsps", "tsp.", "t"]),
        ("tbsp", &["tablespoon", "tablespoons", "tbsps", "tbsp.", "tbs", "tbl"]),
        ("floz", &["fl oz", "fl. oz.", "fl.oz", "fluid ounce", "fluid ounces"]),
        ("cup", &["cups", "c", "c."]),
        ("pint", &["pints", "pt"]),
        ("quart", &["quarts", "qt"]),
        ("gallon", &["gallons", "gal"]),
        // Mass
        ("mg", &["milligram", "milligrams", "mgs"]),
        ("g", &["gram", "grams", "gs", "gr"]),
        ("kg", &["kilogram", "kilograms", "kgs", "kilo", "kilos"]),
        ("oz", &["ounce", "ounces", "oz."]),
        ("lb", &["pound", "pounds", "lbs", "lb."]),
        // Count
        ("each", &["ea", "ea."]),
        ("piece", &["pieces", "pc", "pcs"]),
        ("whole", &["wholes"]),
        ("clove", &["cloves"]),
        ("sprig", &["sprigs"]),
        ("slice", &["slices"]),
        ("can", &["cans", "tin", "tins"]),
        ("dozen", &["dozens", "doz"]),
    ];

    let mut map = HashMap::new();
    for (canonical, aliases) in table {
        for alias in *aliases {
            map.insert(*alias, *canonical);
        }
    }
    map
});

/// Normalize a raw unit string to its canonical id
///
/// Lowercases and trims before consulting the alias table. Unknown strings
/// pass through (lowercased) and simply fail to resolve to a unit group.
pub fn normalize_unit(raw: &str) -> String {
    let trimmed = raw.trim();
    // Capital T is tablespoon, lowercase t is teaspoon
    if trimmed == "T" {
        return "tbsp".to_string();
    }
    let lower = trimmed.to_lowercase();
    let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    match ALIASES.get(collapsed.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => collapsed,
    }
}
