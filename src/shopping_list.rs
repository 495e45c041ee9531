use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::PlannerError;
use crate::normalize::text_list::parse_ingredient_list;

lazy_static! {
    // ASCII and full-width parentheses, e.g. "雞胸肉(去皮)" or "豆腐（板豆腐）".
    static ref ANNOTATION: Regex = Regex::new(r"\(.*?\)|（.*?）").unwrap();
}

/// Aggregates the ingredients of every meal in a plan into `"- name ×count"`
/// lines, in order of first appearance.
///
/// Accepts anything plan-shaped: a non-empty `meals` array, or `days` whose
/// entries carry `meals`.
pub fn build_shopping_list(plan: &Value) -> Result<Vec<String>, PlannerError> {
    if !plan.is_object() {
        return Err(PlannerError::InvalidRequest(
            "購物清單請傳入有效的計畫資料。".to_string(),
        ));
    }
    let meals = collect_meals(plan);
    if meals.is_empty() {
        return Err(PlannerError::InvalidRequest(
            "尚未找到任何餐點，請先生成食譜。".to_string(),
        ));
    }

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for meal in meals {
        for ingredient in parse_ingredient_list(meal.get("ingredients")) {
            let key = strip_annotations(&ingredient);
            if key.is_empty() {
                continue;
            }
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }

    Ok(order
        .into_iter()
        .map(|name| {
            let count = counts[&name];
            format!("- {} ×{}", name, count)
        })
        .collect())
}

fn collect_meals(plan: &Value) -> Vec<&Value> {
    if let Some(meals) = plan.get("meals").and_then(Value::as_array) {
        if !meals.is_empty() {
            return meals.iter().collect();
        }
    }
    plan.get("days")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(|day| day.get("meals").and_then(Value::as_array))
                .flatten()
                .collect()
        })
        .unwrap_or_default()
}

fn strip_annotations(ingredient: &str) -> String {
    ANNOTATION.replace_all(ingredient, "").trim().to_string()
}
