use std::fs;
use tempfile::TempDir;

pub const BROWNIES: &str = r#"{
    "id": "brownies",
    "title": "Fudgy Brownies",
    "tokenOrder": ["flour", "cocoa", "sugar", "egg", "butter"],
    "ingredientSections": ["Dry", "Wet"],
    "choices": {"flour": {"label": "Flour", "defaultOption": "wheat"}},
    "ingredients": {
        "flour": {
            "isChoice": true,
            "section": "Dry",
            "options": [
                {"optionKey": "wheat", "display": "all-purpose flour", "ratio": "1/2", "unit": "cup", "ingredientId": "flour",
                 "dietary": {"glutenFree": false},
                 "nutrition": [{"servingQty": 1, "servingUnit": "cup", "kcal": 455, "proteinG": 13, "fatG": 1.2, "satFatG": 0.2, "carbsG": 95, "sugarsG": 0.3, "fiberG": 3.4, "sodiumMg": 3}]},
                {"optionKey": "almond", "display": "almond flour", "ratio": "1/2", "unit": "cup", "ingredientId": "almond-flour",
                 "dietary": {"glutenFree": true},
                 "nutrition": [{"servingQty": 1, "servingUnit": "cup", "kcal": 640, "proteinG": 24, "fatG": 56, "satFatG": 4.3, "carbsG": 24, "sugarsG": 4, "fiberG": 12, "sodiumMg": 0}]}
            ]
        },
        "cocoa": {"section": "Dry", "options": [{"display": "cocoa powder", "ratio": "1/3", "unit": "cup", "ingredientId": "cocoa",
                   "nutrition": [{"servingQty": 1, "servingUnit": "cup", "kcal": 196, "proteinG": 17, "fatG": 12, "satFatG": 7, "carbsG": 47, "sugarsG": 1.5, "fiberG": 29, "sodiumMg": 18}]}]},
        "sugar": {"section": "Dry", "options": [{"display": "sugar", "ratio": "1", "unit": "cup", "ingredientId": "sugar",
                   "nutrition": [{"servingQty": 1, "servingUnit": "cup", "kcal": 774, "proteinG": 0, "fatG": 0, "satFatG": 0, "carbsG": 200, "sugarsG": 200, "fiberG": 0, "sodiumMg": 2, "addedSugarG": 200}]}]},
        "egg": {"section": "Wet", "options": [{"display": "egg", "ratio": "2", "unit": "each", "ingredientId": "egg",
                 "dietary": {"eggFree": false},
                 "nutrition": [{"servingQty": 1, "servingUnit": "each", "kcal": 72, "proteinG": 6.3, "fatG": 4.8, "satFatG": 1.6, "carbsG": 0.4, "sugarsG": 0.2, "fiberG": 0, "sodiumMg": 71}]}]},
        "butter": {"section": "Wet", "options": [{"display": "melted butter", "ratio": "1/2", "unit": "cup", "ingredientId": "butter",
                    "dietary": {"dairyFree": false},
                    "nutrition": [{"servingQty": 1, "servingUnit": "tbsp", "kcal": 102, "proteinG": 0.1, "fatG": 11.5, "satFatG": 7.3, "carbsG": 0, "sugarsG": 0, "fiberG": 0, "sodiumMg": 91}]}]}
    },
    "steps": [
        {"text": "Whisk the {butter} with the {sugar} and {egg}.", "section": "Batter"},
        {"text": "Fold in the {flour} and {cocoa}.", "section": "Batter"},
        {"text": "Bake for 25 minutes.", "section": "Bake"}
    ],
    "stepSections": ["Batter", "Bake"]
}"#;

/// Workspace directory holding the brownie recipe
pub fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("brownies.json"), BROWNIES).unwrap();
    dir
}
