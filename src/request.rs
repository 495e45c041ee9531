//! Request canonicalization.
//!
//! Callers send the same concepts under several historical names: top-level
//! fields, `profile`, `preferences`, and the `profileSnapshot` /
//! `preferenceSnapshot` copies. Everything here collapses that into one
//! [`CanonicalRequest`], with list fields unioned and scalar fields taken from
//! the first location that has a value.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PlannerError;
use crate::normalize::coerce::{coerce_number, coerce_string, first_present_of, first_truthy_of};
use crate::normalize::text_list::unique_list;
use crate::plan::Timeframe;

static NULL: Value = Value::Null;

/// Below this age (in months) we refuse to build a solid-food day plan.
pub const MIN_BABY_MONTHS_FOR_DAY_PLAN: f64 = 6.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Loss,
    Muscle,
    Balanced,
    Vegan,
    Baby,
}

impl Goal {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "loss" => Some(Goal::Loss),
            "muscle" => Some(Goal::Muscle),
            "balanced" => Some(Goal::Balanced),
            "vegan" => Some(Goal::Vegan),
            "baby" => Some(Goal::Baby),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Loss => "loss",
            Goal::Muscle => "muscle",
            Goal::Balanced => "balanced",
            Goal::Vegan => "vegan",
            Goal::Baby => "baby",
        }
    }

    /// Display label used in profile summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Goal::Loss => "減脂",
            Goal::Muscle => "增肌",
            Goal::Balanced => "均衡營養",
            Goal::Vegan => "素食",
            Goal::Baby => "嬰幼兒輔食",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaloriePreference {
    Low,
    Mid,
    High,
}

impl CaloriePreference {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(CaloriePreference::Low),
            "mid" | "medium" => Some(CaloriePreference::Mid),
            "high" => Some(CaloriePreference::High),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaloriePreference::Low => "低熱量",
            CaloriePreference::Mid => "中等熱量",
            CaloriePreference::High => "高熱量",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub age: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub baby_months: Option<f64>,
    pub allergies: Vec<String>,
    pub avoid_foods: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub cuisine: Option<String>,
    pub calorie_preference: Option<CaloriePreference>,
    pub vegetarian: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Case-insensitive mapping of the role names callers have used.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "assistant" | "bot" | "ai" | "system" => Some(Role::Assistant),
            "user" | "human" | "client" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRequest {
    pub goal: Option<Goal>,
    /// Goal text that was supplied but matched no known goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrecognized_goal: Option<String>,
    pub goal_notes: Option<String>,
    pub profile: Profile,
    pub preferences: Preferences,
    pub summary: Option<String>,
    pub history: Vec<HistoryMessage>,
}

/// The nested sections a raw request may carry. Missing sections read as
/// `null`, so every lookup on them simply finds nothing.
struct RawSections<'a> {
    raw: &'a Value,
    profile: &'a Value,
    preferences: &'a Value,
    profile_snapshot: &'a Value,
    preference_snapshot: &'a Value,
}

impl<'a> RawSections<'a> {
    fn new(raw: &'a Value) -> Self {
        let section = |key: &str| raw.get(key).filter(|v| v.is_object()).unwrap_or(&NULL);
        RawSections {
            raw,
            profile: section("profile"),
            preferences: section("preferences"),
            profile_snapshot: section("profileSnapshot"),
            preference_snapshot: section("preferenceSnapshot"),
        }
    }
}

pub fn normalize_request(raw: &Value, history_limit: usize) -> CanonicalRequest {
    let s = RawSections::new(raw);

    let allergies = union_lists(&[
        (s.raw, "allergies"),
        (s.profile, "allergies"),
        (s.profile_snapshot, "allergies"),
    ]);
    let avoid_foods = union_lists(&[
        (s.raw, "avoidFoods"),
        (s.raw, "dietaryRestrictions"),
        (s.profile, "avoidFoods"),
        (s.profile, "dietaryRestrictions"),
        (s.profile_snapshot, "avoidFoods"),
    ]);

    let profile = Profile {
        age: coerce_number(first_present_of(&[
            (s.profile, "age"),
            (s.raw, "age"),
            (s.profile_snapshot, "age"),
            (s.raw, "rawAge"),
        ])),
        height_cm: coerce_number(first_present_of(&[
            (s.profile, "heightCm"),
            (s.profile, "height"),
            (s.raw, "height"),
            (s.profile_snapshot, "heightCm"),
            (s.profile_snapshot, "height"),
        ])),
        weight_kg: coerce_number(first_present_of(&[
            (s.profile, "weightKg"),
            (s.profile, "weight"),
            (s.raw, "weight"),
            (s.profile_snapshot, "weightKg"),
            (s.profile_snapshot, "weight"),
        ])),
        baby_months: coerce_number(first_present_of(&[
            (s.profile, "babyMonths"),
            (s.raw, "babyMonths"),
            (s.profile_snapshot, "babyMonths"),
            (s.profile, "ageInMonths"),
            (s.profile_snapshot, "ageInMonths"),
        ])),
        allergies,
        avoid_foods,
    };

    let preferences = Preferences {
        cuisine: coerce_string(first_present_of(&[
            (s.preferences, "cuisine"),
            (s.raw, "cuisine"),
            (s.profile, "cuisinePreference"),
            (s.preference_snapshot, "cuisine"),
            (s.profile_snapshot, "cuisinePreference"),
        ])),
        calorie_preference: first_present_of(&[
            (s.preferences, "caloriePreference"),
            (s.raw, "caloriePref"),
            (s.profile, "caloriePreference"),
            (s.preference_snapshot, "caloriePreference"),
            (s.profile_snapshot, "caloriePreference"),
        ])
        .and_then(Value::as_str)
        .and_then(CaloriePreference::parse),
        vegetarian: coerce_bool(first_present_of(&[
            (s.preferences, "vegetarian"),
            (s.raw, "vegetarian"),
            (s.profile, "vegetarian"),
            (s.preference_snapshot, "vegetarian"),
            (s.profile_snapshot, "vegetarian"),
        ])),
    };

    let raw_goal = first_present_of(&[
        (s.raw, "goal"),
        (s.profile, "goal"),
        (s.profile_snapshot, "goal"),
        (s.preference_snapshot, "goal"),
    ]);
    let goal = raw_goal.and_then(Value::as_str).and_then(Goal::parse);
    let unrecognized_goal = match goal {
        Some(_) => None,
        None => coerce_string(raw_goal),
    };
    if let Some(value) = &unrecognized_goal {
        warn!("Ignoring unrecognized goal value: {}", value);
    }

    CanonicalRequest {
        goal,
        unrecognized_goal,
        goal_notes: coerce_string(first_present_of(&[
            (s.raw, "goalNotes"),
            (s.raw, "goalDescription"),
            (s.profile, "goalNotes"),
            (s.preference_snapshot, "goalNotes"),
        ])),
        profile,
        preferences,
        summary: coerce_string(first_present_of(&[
            (s.raw, "preferenceSummary"),
            (s.raw, "summary"),
            (s.preferences, "summary"),
            (s.profile, "preferenceSummary"),
            (s.profile_snapshot, "preferenceSummary"),
        ])),
        history: normalize_history(
            first_truthy_of(&[
                (s.raw, "history"),
                (s.raw, "chatHistory"),
                (s.raw, "conversationHistory"),
            ]),
            history_limit,
        ),
    }
}

/// Keeps well-formed conversation turns, most recent `limit` of them.
pub fn normalize_history(value: Option<&Value>, limit: usize) -> Vec<HistoryMessage> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let sanitized: Vec<HistoryMessage> = entries.iter().filter_map(history_entry).collect();
    let skip = sanitized.len().saturating_sub(limit);
    sanitized.into_iter().skip(skip).collect()
}

fn history_entry(entry: &Value) -> Option<HistoryMessage> {
    match entry {
        Value::String(_) => Some(HistoryMessage {
            role: Role::User,
            content: coerce_string(Some(entry))?,
        }),
        Value::Object(_) => {
            let role = coerce_string(first_truthy_of(&[(entry, "role"), (entry, "speaker")]))
                .and_then(|r| Role::parse(&r))?;
            let content = coerce_string(first_truthy_of(&[
                (entry, "content"),
                (entry, "text"),
                (entry, "message"),
                (entry, "value"),
            ]))?;
            Some(HistoryMessage { role, content })
        }
        _ => None,
    }
}

/// Enforces the goal-specific preconditions for a plan of `timeframe`.
pub fn ensure_goal(request: &CanonicalRequest, timeframe: Timeframe) -> Result<(), PlannerError> {
    let Some(goal) = request.goal else {
        let message = match &request.unrecognized_goal {
            Some(raw) => format!(
                "不支援的目標設定：{}，請使用 loss、muscle、balanced、vegan 或 baby。",
                raw
            ),
            None => "缺少目標設定，請提供 goal 欄位。".to_string(),
        };
        return Err(PlannerError::InvalidRequest(message));
    };
    if goal == Goal::Baby {
        let Some(months) = request.profile.baby_months else {
            return Err(PlannerError::InvalidRequest(
                "嬰幼兒計畫需提供寶寶月齡（profile.babyMonths）。".to_string(),
            ));
        };
        if months < MIN_BABY_MONTHS_FOR_DAY_PLAN && timeframe == Timeframe::Day {
            return Err(PlannerError::InvalidRequest(
                "6 個月以下以奶為主，不建議建立固體輔食計畫。".to_string(),
            ));
        }
    }
    Ok(())
}

fn union_lists(locations: &[(&Value, &str)]) -> Vec<String> {
    let items = locations
        .iter()
        .filter_map(|(container, key)| container.get(*key))
        .filter_map(Value::as_array)
        .flatten()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    unique_list(items)
}

fn coerce_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_fields_take_first_location_with_a_value() {
        let raw = json!({
            "age": 35,
            "height": "172",
            "profile": {"age": null, "weight": 68},
            "profileSnapshot": {"age": 40, "heightCm": 180, "ageInMonths": 9}
        });
        let request = normalize_request(&raw, 12);
        assert_eq!(request.profile.age, Some(35.0));
        assert_eq!(request.profile.height_cm, Some(172.0));
        assert_eq!(request.profile.weight_kg, Some(68.0));
        assert_eq!(request.profile.baby_months, Some(9.0));
    }

    #[test]
    fn preferences_resolve_across_sections() {
        let raw = json!({
            "caloriePref": "LOW",
            "profile": {"cuisinePreference": "日式", "vegetarian": true},
            "preferenceSnapshot": {"cuisine": "中式"}
        });
        let request = normalize_request(&raw, 12);
        assert_eq!(request.preferences.cuisine.as_deref(), Some("日式"));
        assert_eq!(request.preferences.calorie_preference, Some(CaloriePreference::Low));
        assert_eq!(request.preferences.vegetarian, Some(true));
    }

    #[test]
    fn goal_and_text_fields() {
        let raw = json!({
            "profileSnapshot": {"goal": "muscle"},
            "goalDescription": "  準備半馬  ",
            "preferenceSummary": "",
            "summary": "不吃辣"
        });
        let request = normalize_request(&raw, 12);
        assert_eq!(request.goal, Some(Goal::Muscle));
        assert_eq!(request.goal_notes.as_deref(), Some("準備半馬"));
        // an empty string is still a present value and wins over `summary`
        assert_eq!(request.summary, None);
    }

    #[test]
    fn unknown_goal_is_rejected_with_its_own_message() {
        let request = normalize_request(&json!({"goal": "keto"}), 12);
        assert_eq!(request.goal, None);
        assert_eq!(request.unrecognized_goal.as_deref(), Some("keto"));
        let err = ensure_goal(&request, Timeframe::Day).unwrap_err();
        assert!(err.message().contains("keto"));

        let missing = normalize_request(&json!({"goal": "  "}), 12);
        assert_eq!(missing.unrecognized_goal, None);
        let err = ensure_goal(&missing, Timeframe::Day).unwrap_err();
        assert!(err.message().contains("缺少目標設定"));
    }

    #[test]
    fn avoid_foods_include_dietary_restrictions() {
        let raw = json!({
            "avoidFoods": ["香菜"],
            "dietaryRestrictions": ["香菜", "辣椒"],
            "profile": {"dietaryRestrictions": ["洋蔥"]}
        });
        let request = normalize_request(&raw, 12);
        assert_eq!(request.profile.avoid_foods, vec!["香菜", "辣椒", "洋蔥"]);
    }

    #[test]
    fn history_maps_roles_and_keeps_most_recent() {
        let raw = json!([
            "  第一句  ",
            {"speaker": "Bot", "text": "好的"},
            {"role": "HUMAN", "message": "我要減脂"},
            {"role": "narrator", "content": "ignored"},
            {"role": "user", "content": "   "},
            42,
            {"role": "ai", "value": "收到"}
        ]);
        let history = normalize_history(Some(&raw), 3);
        assert_eq!(
            history,
            vec![
                HistoryMessage { role: Role::Assistant, content: "好的".to_string() },
                HistoryMessage { role: Role::User, content: "我要減脂".to_string() },
                HistoryMessage { role: Role::Assistant, content: "收到".to_string() },
            ]
        );
        assert!(normalize_history(Some(&json!("hi")), 12).is_empty());
    }

    #[test]
    fn empty_history_array_wins_over_chat_history() {
        let raw = json!({"history": [], "chatHistory": ["早安"]});
        let request = normalize_request(&raw, 12);
        assert!(request.history.is_empty());
    }

    #[test]
    fn history_falls_back_to_chat_history() {
        for raw in [
            json!({"chatHistory": ["早安"]}),
            json!({"history": null, "chatHistory": ["早安"]}),
        ] {
            let request = normalize_request(&raw, 12);
            assert_eq!(request.history.len(), 1);
            assert_eq!(request.history[0].role, Role::User);
            assert_eq!(request.history[0].content, "早安");
        }
    }

    #[test]
    fn baby_goal_needs_months_and_a_floor_for_day_plans() {
        let mut request = CanonicalRequest {
            goal: Some(Goal::Baby),
            ..Default::default()
        };
        assert!(ensure_goal(&request, Timeframe::Week).is_err());

        request.profile.baby_months = Some(4.0);
        assert!(ensure_goal(&request, Timeframe::Day).is_err());
        assert!(ensure_goal(&request, Timeframe::Week).is_ok());

        request.profile.baby_months = Some(8.0);
        assert!(ensure_goal(&request, Timeframe::Day).is_ok());
    }

    #[test]
    fn missing_goal_is_a_client_fault() {
        let err = ensure_goal(&CanonicalRequest::default(), Timeframe::Day).unwrap_err();
        assert!(err.is_client_fault());
    }
}
