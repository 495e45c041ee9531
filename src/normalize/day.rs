use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{coerce_string, first_truthy};
use super::meal::{normalize_meals, Meal};
use super::overview::{normalize_overview, Overview};
use super::text_list::normalize_text_list;
use crate::request::Goal;

pub const LABEL_ALIASES: &[&str] = &["label", "name"];
pub const OVERVIEW_ALIASES: &[&str] = &["overview", "meta"];
pub const SUMMARY_ALIASES: &[&str] = &["summary", "note"];

pub const BABY_DAY_TIP: &str = "觀察寶寶對新食材的反應，出現不適徵兆請暫停並諮詢醫師。";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayPlan {
    pub label: String,
    pub summary: String,
    pub overview: Option<Overview>,
    pub meals: Vec<Meal>,
    pub tips: Vec<String>,
}

impl DayPlan {
    fn placeholder(index: usize) -> Self {
        DayPlan {
            label: default_label(index),
            summary: String::new(),
            overview: None,
            meals: Vec::new(),
            tips: Vec::new(),
        }
    }
}

fn default_label(index: usize) -> String {
    format!("Day {}", index + 1)
}

/// Canonicalizes the `index`-th (0-based) day of a week plan. Unlike meals,
/// a non-object day still occupies its slot as an empty placeholder.
pub fn normalize_day(day: &Value, index: usize, goal: Option<Goal>) -> DayPlan {
    if !day.is_object() {
        return DayPlan::placeholder(index);
    }

    let mut tips = normalize_text_list(day.get("tips"));
    if tips.is_empty() && goal == Some(Goal::Baby) {
        tips.push(BABY_DAY_TIP.to_string());
    }

    DayPlan {
        label: coerce_string(first_truthy(day, LABEL_ALIASES)).unwrap_or_else(|| default_label(index)),
        summary: coerce_string(first_truthy(day, SUMMARY_ALIASES)).unwrap_or_default(),
        overview: normalize_overview(first_truthy(day, OVERVIEW_ALIASES)),
        meals: normalize_meals(day.get("meals"), goal),
        tips,
    }
}
