use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{coerce_number, first_present, first_truthy, is_truthy};

pub const MEAL_PROTEIN_ALIASES: &[&str] = &["P", "p", "protein", "proteins", "proteinGrams"];
pub const MEAL_CARBS_ALIASES: &[&str] = &["C", "c", "carbs", "carbohydrates", "carbohydrateGrams"];
pub const MEAL_FAT_ALIASES: &[&str] = &["F", "f", "fat", "fats", "fatGrams"];

pub const TOTAL_PROTEIN_ALIASES: &[&str] = &["protein", "proteins", "P", "p"];
pub const TOTAL_CARBS_ALIASES: &[&str] = &["carbs", "carbohydrates", "C", "c"];
pub const TOTAL_FAT_ALIASES: &[&str] = &["fat", "fats", "F", "f"];

/// Keys under which an overview may nest its macro totals.
pub const MACRO_CONTAINER_ALIASES: &[&str] = &[
    "macros",
    "macrosTotal",
    "macroTotals",
    "macro",
    "macronutrients",
    "nutrients",
];

/// Per-meal macros in the short `{P, C, F}` shape.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct MealMacros {
    #[serde(rename = "P")]
    pub protein: Option<f64>,
    #[serde(rename = "C")]
    pub carbs: Option<f64>,
    #[serde(rename = "F")]
    pub fat: Option<f64>,
}

/// Macro totals in the long `{protein, carbs, fat}` shape.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct MacroSet {
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl MealMacros {
    fn has_value(&self) -> bool {
        self.protein.is_some() || self.carbs.is_some() || self.fat.is_some()
    }
}

impl MacroSet {
    fn has_value(&self) -> bool {
        self.protein.is_some() || self.carbs.is_some() || self.fat.is_some()
    }
}

impl From<MealMacros> for MacroSet {
    fn from(m: MealMacros) -> Self {
        MacroSet {
            protein: m.protein,
            carbs: m.carbs,
            fat: m.fat,
        }
    }
}

/// Resolves `{P, C, F}` from a meal's macro object. `None` when nothing
/// resolves to a finite number.
pub fn normalize_macros(source: Option<&Value>) -> Option<MealMacros> {
    let source = source.filter(|v| is_truthy(v))?;
    let macros = MealMacros {
        protein: coerce_number(first_present(source, MEAL_PROTEIN_ALIASES)),
        carbs: coerce_number(first_present(source, MEAL_CARBS_ALIASES)),
        fat: coerce_number(first_present(source, MEAL_FAT_ALIASES)),
    };
    macros.has_value().then_some(macros)
}

/// Resolves macro totals from an overview-like object, looking through the
/// usual container keys first and falling back to the object itself.
pub fn normalize_macro_totals(source: &Value) -> Option<MacroSet> {
    let container = first_truthy(source, MACRO_CONTAINER_ALIASES).unwrap_or(source);
    if !container.is_object() {
        return None;
    }
    let macros = MacroSet {
        protein: coerce_number(first_present(container, TOTAL_PROTEIN_ALIASES)),
        carbs: coerce_number(first_present(container, TOTAL_CARBS_ALIASES)),
        fat: coerce_number(first_present(container, TOTAL_FAT_ALIASES)),
    };
    macros.has_value().then_some(macros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single_field(key: &str, value: Value) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), value);
        Value::Object(map)
    }

    #[test]
    fn any_alias_resolves_its_component() {
        for alias in MEAL_PROTEIN_ALIASES {
            let source = single_field(alias, json!("25"));
            let macros = normalize_macros(Some(&source)).unwrap();
            assert_eq!(macros.protein, Some(25.0));
            assert_eq!(macros.carbs, None);
            assert_eq!(macros.fat, None);
        }
        for alias in MEAL_FAT_ALIASES {
            let source = single_field(alias, json!(9));
            assert_eq!(normalize_macros(Some(&source)).unwrap().fat, Some(9.0));
        }
    }

    #[test]
    fn nothing_resolvable_means_no_macros() {
        assert_eq!(normalize_macros(None), None);
        assert_eq!(normalize_macros(Some(&json!({"P": "", "fiber": 4}))), None);
        assert_eq!(normalize_macros(Some(&json!("30g protein"))), None);
    }

    #[test]
    fn earlier_alias_wins() {
        let source = json!({"P": 30, "protein": 12});
        assert_eq!(normalize_macros(Some(&source)).unwrap().protein, Some(30.0));
    }

    #[test]
    fn totals_look_through_containers() {
        let nested = json!({"calories": 1800, "macroTotals": {"protein": 120, "C": 180, "fats": 60}});
        assert_eq!(
            normalize_macro_totals(&nested),
            Some(MacroSet {
                protein: Some(120.0),
                carbs: Some(180.0),
                fat: Some(60.0)
            })
        );

        let flat = json!({"calories": 1800, "protein": 90});
        assert_eq!(normalize_macro_totals(&flat).unwrap().protein, Some(90.0));
        assert_eq!(normalize_macro_totals(&json!({"calories": 1800})), None);
    }

    #[test]
    fn short_shape_serializes_with_letters() {
        let macros = MealMacros {
            protein: Some(20.0),
            carbs: None,
            fat: Some(5.0),
        };
        let value = serde_json::to_value(macros).unwrap();
        assert_eq!(value, json!({"P": 20.0, "C": null, "F": 5.0}));
    }
}
