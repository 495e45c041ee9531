use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{coerce_number, coerce_string, first_present, first_truthy};
use super::macros::{normalize_macros, MacroSet, MealMacros};
use super::text_list::{normalize_steps, normalize_text_list, parse_ingredient_list};
use crate::request::Goal;

pub const NAME_ALIASES: &[&str] = &["name", "title"];
pub const MEAL_TYPE_ALIASES: &[&str] = &["mealType", "type"];
pub const KCAL_ALIASES: &[&str] = &["kcal", "calories", "energy", "kilocalories"];
pub const MACRO_ALIASES: &[&str] = &["macro", "macros", "macronutrients", "nutrients"];
pub const INGREDIENT_ALIASES: &[&str] = &["ingredients", "ingredientList", "materials"];
pub const STEP_ALIASES: &[&str] = &["steps", "instructions", "method"];
pub const TIP_ALIASES: &[&str] = &["tips", "advice", "tipsList"];
pub const NOTE_ALIASES: &[&str] = &["notes", "note", "comment"];
pub const TAG_ALIASES: &[&str] = &["tags", "labels", "focus"];
pub const CUISINE_ALIASES: &[&str] = &["cuisine", "origin", "style"];

pub const DEFAULT_MEAL_NAME: &str = "未命名餐點";
pub const DEFAULT_MEAL_TYPE: &str = "餐點";
pub const BABY_MEAL_TYPE: &str = "寶寶餐";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub meal_type: String,
    pub kcal: Option<f64>,
    #[serde(rename = "macro")]
    pub macro_split: Option<MealMacros>,
    /// Long-form mirror of `macro`.
    pub macros: Option<MacroSet>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub instructions: String,
    pub tips: Vec<String>,
    pub notes: String,
    pub tags: Vec<String>,
    pub cuisine: String,
}

/// Canonicalizes one raw meal. Non-object input yields `None` and must be
/// dropped by the caller.
pub fn normalize_meal(meal: &Value, goal: Option<Goal>) -> Option<Meal> {
    if !meal.is_object() {
        return None;
    }

    let name = coerce_string(first_truthy(meal, NAME_ALIASES))
        .unwrap_or_else(|| DEFAULT_MEAL_NAME.to_string());
    let meal_type = coerce_string(first_truthy(meal, MEAL_TYPE_ALIASES)).unwrap_or_else(|| {
        match goal {
            Some(Goal::Baby) => BABY_MEAL_TYPE,
            _ => DEFAULT_MEAL_TYPE,
        }
        .to_string()
    });
    let macro_split = normalize_macros(first_truthy(meal, MACRO_ALIASES));
    let steps = normalize_steps(first_present(meal, STEP_ALIASES));

    Some(Meal {
        name,
        meal_type,
        kcal: coerce_number(first_present(meal, KCAL_ALIASES)),
        macro_split,
        macros: macro_split.map(MacroSet::from),
        ingredients: parse_ingredient_list(first_present(meal, INGREDIENT_ALIASES)),
        instructions: render_instructions(&steps),
        steps,
        tips: normalize_text_list(first_truthy(meal, TIP_ALIASES)),
        notes: normalize_text_list(first_truthy(meal, NOTE_ALIASES)).join("\n"),
        tags: normalize_text_list(first_truthy(meal, TAG_ALIASES)),
        cuisine: coerce_string(first_truthy(meal, CUISINE_ALIASES)).unwrap_or_default(),
    })
}

/// `"1. a\n2. b"` rendering of the steps, or `""` when there are none.
pub fn render_instructions(steps: &[String]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| format!("{}. {}", idx + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps [`normalize_meal`] over a raw array, dropping non-objects. Anything
/// other than an array gives an empty list.
pub fn normalize_meals(meals: Option<&Value>, goal: Option<Goal>) -> Vec<Meal> {
    meals
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|meal| normalize_meal(meal, goal))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_aliases_and_defaults() {
        let raw = json!({
            "title": "雞胸藜麥碗",
            "calories": "520",
            "macronutrients": {"protein": 42, "carbohydrates": 55, "fats": 14},
            "materials": "雞胸肉 150g、藜麥 60g、花椰菜",
            "method": "1. 雞胸肉水煮\n2. 藜麥煮熟\n3. 全部拌勻",
            "advice": ["少鹽", "少鹽"],
            "comment": ["可冷藏", "隔天食用"],
            "labels": "高蛋白, 低脂",
            "origin": "地中海"
        });
        let meal = normalize_meal(&raw, Some(Goal::Muscle)).unwrap();
        assert_eq!(meal.name, "雞胸藜麥碗");
        assert_eq!(meal.meal_type, DEFAULT_MEAL_TYPE);
        assert_eq!(meal.kcal, Some(520.0));
        assert_eq!(
            meal.macro_split,
            Some(MealMacros {
                protein: Some(42.0),
                carbs: Some(55.0),
                fat: Some(14.0)
            })
        );
        assert_eq!(meal.macros.unwrap().carbs, Some(55.0));
        assert_eq!(meal.ingredients, vec!["雞胸肉 150g", "藜麥 60g", "花椰菜"]);
        assert_eq!(meal.steps, vec!["雞胸肉水煮", "藜麥煮熟", "全部拌勻"]);
        assert_eq!(meal.instructions, "1. 雞胸肉水煮\n2. 藜麥煮熟\n3. 全部拌勻");
        assert_eq!(meal.tips, vec!["少鹽"]);
        assert_eq!(meal.notes, "可冷藏\n隔天食用");
        assert_eq!(meal.tags, vec!["高蛋白", "低脂"]);
        assert_eq!(meal.cuisine, "地中海");
    }

    #[test]
    fn baby_goal_changes_default_meal_type() {
        let meal = normalize_meal(&json!({}), Some(Goal::Baby)).unwrap();
        assert_eq!(meal.name, DEFAULT_MEAL_NAME);
        assert_eq!(meal.meal_type, BABY_MEAL_TYPE);
        assert_eq!(meal.kcal, None);
        assert_eq!(meal.macro_split, None);
        assert_eq!(meal.macros, None);
        assert_eq!(meal.instructions, "");
        assert_eq!(meal.cuisine, "");
    }

    #[test]
    fn non_objects_are_dropped_from_lists() {
        let raw = json!([{"name": "燕麥粥"}, "午餐", null, 3, {"name": "蔬菜湯"}]);
        let meals = normalize_meals(Some(&raw), None);
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[1].name, "蔬菜湯");
        assert!(normalize_meals(Some(&json!({"name": "x"})), None).is_empty());
    }
}
