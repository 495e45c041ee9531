use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::PlannerError;
use crate::normalize::coerce::{coerce_string, first_truthy, first_truthy_of};
use crate::normalize::day::{normalize_day, DayPlan};
use crate::normalize::meal::{normalize_meals, Meal};
use crate::normalize::overview::{normalize_overview, Overview};
use crate::normalize::text_list::normalize_text_list;
use crate::request::{CanonicalRequest, Goal, Preferences, Profile};

pub const PROFILE_SUMMARY_ALIASES: &[&str] = &["profileSummary", "summary"];
pub const OVERVIEW_ALIASES: &[&str] = &["overview", "meta"];

pub const BABY_PLAN_TIPS: [&str; 2] = [
    "避免蜂蜜、過鹹與油炸食材，維持軟爛或泥糊質地。",
    "每次新增食材請遵循少量、單一、觀察 2-3 天的原則。",
];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical plan. Exactly one of `meals` / `days` is populated,
/// depending on `timeframe`; the other is always empty.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub timeframe: Timeframe,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub title: String,
    pub profile_summary: String,
    pub overview: Option<Overview>,
    pub tips: Vec<String>,
    /// Omitted entirely, rather than serialized as `[]`, when nothing
    /// resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
    pub meals: Vec<Meal>,
    pub days: Vec<DayPlan>,
    pub goal: Option<Goal>,
    pub goal_notes: Option<String>,
    pub profile: Profile,
    pub preferences: Preferences,
    pub summary: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Plan {
    /// Meals in plan order, flattening week plans day by day.
    pub fn all_meals(&self) -> impl Iterator<Item = &Meal> {
        self.meals
            .iter()
            .chain(self.days.iter().flat_map(|day| day.meals.iter()))
    }
}

pub fn canonicalize_plan(
    plan: &Value,
    timeframe: Timeframe,
    request: &CanonicalRequest,
) -> Result<Plan, PlannerError> {
    canonicalize_plan_at(plan, timeframe, request, Utc::now())
}

/// [`canonicalize_plan`] with an explicit timestamp.
pub fn canonicalize_plan_at(
    plan: &Value,
    timeframe: Timeframe,
    request: &CanonicalRequest,
    generated_at: DateTime<Utc>,
) -> Result<Plan, PlannerError> {
    if !plan.is_object() {
        return Err(PlannerError::MalformedResponse("DeepSeek 回傳格式不正確。".to_string()));
    }
    let goal = request.goal;

    let mut tips = normalize_text_list(plan.get("tips"));
    if tips.is_empty() && goal == Some(Goal::Baby) {
        tips = BABY_PLAN_TIPS.iter().map(|t| t.to_string()).collect();
    }

    let mut insights = normalize_text_list(plan.get("insights"));
    if insights.is_empty() {
        insights = normalize_text_list(first_truthy_of(&[
            (&plan["overview"], "notes"),
            (&plan["meta"], "notes"),
        ]));
    }

    let (meals, days) = match timeframe {
        Timeframe::Week => {
            let raw_days = plan
                .get("days")
                .and_then(Value::as_array)
                .filter(|days| !days.is_empty())
                .ok_or_else(|| {
                    PlannerError::MalformedResponse("DeepSeek 回傳缺少 days 陣列。".to_string())
                })?;
            let days = raw_days
                .iter()
                .enumerate()
                .map(|(idx, day)| normalize_day(day, idx, goal))
                .collect::<Vec<_>>();
            (Vec::new(), days)
        }
        Timeframe::Day => {
            let raw_meals = plan
                .get("meals")
                .filter(|meals| meals.as_array().is_some_and(|m| !m.is_empty()))
                .ok_or_else(|| {
                    PlannerError::MalformedResponse("DeepSeek 回傳缺少 meals 陣列。".to_string())
                })?;
            let meals = normalize_meals(Some(raw_meals), goal);
            if meals.is_empty() {
                return Err(PlannerError::MalformedResponse(
                    "DeepSeek 回傳的 meals 陣列沒有任何有效餐點。".to_string(),
                ));
            }
            (meals, Vec::new())
        }
    };

    info!(
        "Canonicalized {} plan with {} meals across {} days",
        timeframe,
        meals.len() + days.iter().map(|d| d.meals.len()).sum::<usize>(),
        days.len()
    );

    Ok(Plan {
        timeframe,
        plan_type: coerce_string(first_truthy(plan, &["type"]))
            .unwrap_or_else(|| infer_plan_type(goal, timeframe)),
        title: coerce_string(first_truthy(plan, &["title"]))
            .unwrap_or_else(|| default_title(goal, timeframe).to_string()),
        profile_summary: coerce_string(first_truthy(plan, PROFILE_SUMMARY_ALIASES))
            .or_else(|| build_profile_summary(request))
            .unwrap_or_default(),
        overview: normalize_overview(first_truthy(plan, OVERVIEW_ALIASES)),
        tips,
        insights: (!insights.is_empty()).then_some(insights),
        meals,
        days,
        goal,
        goal_notes: request.goal_notes.clone(),
        profile: request.profile.clone(),
        preferences: request.preferences.clone(),
        summary: request.summary.clone(),
        generated_at,
    })
}

/// `baby-day`, `adult-week` and so on.
pub fn infer_plan_type(goal: Option<Goal>, timeframe: Timeframe) -> String {
    let audience = if goal == Some(Goal::Baby) { "baby" } else { "adult" };
    format!("{}-{}", audience, timeframe)
}

pub fn default_title(goal: Option<Goal>, timeframe: Timeframe) -> &'static str {
    match (goal == Some(Goal::Baby), timeframe) {
        (true, Timeframe::Week) => "客製嬰幼兒一周餐飲計畫",
        (true, Timeframe::Day) => "客製嬰幼兒一日輔食建議",
        (false, Timeframe::Week) => "客製一周營養餐計畫",
        (false, Timeframe::Day) => "客製一日營養餐",
    }
}

/// Human summary of the request, or `None` if there is nothing to say.
pub fn build_profile_summary(request: &CanonicalRequest) -> Option<String> {
    let profile = &request.profile;
    let preferences = &request.preferences;
    let mut parts: Vec<String> = Vec::new();

    if let Some(goal) = request.goal {
        parts.push(format!("目標：{}", goal.label()));
    }
    if let Some(age) = profile.age {
        parts.push(format!("年齡 {} 歲", age));
    }
    if let Some(height) = profile.height_cm {
        parts.push(format!("身高 {} cm", height));
    }
    if let Some(weight) = profile.weight_kg {
        parts.push(format!("體重 {} kg", weight));
    }
    if let Some(months) = profile.baby_months {
        parts.push(format!("寶寶 {} 月齡", months));
    }
    if !profile.allergies.is_empty() {
        parts.push(format!("過敏：{}", profile.allergies.join("、")));
    }
    if !profile.avoid_foods.is_empty() {
        parts.push(format!("忌口：{}", profile.avoid_foods.join("、")));
    }
    if let Some(cuisine) = &preferences.cuisine {
        parts.push(format!("偏好菜系：{}", cuisine));
    }
    if let Some(calories) = preferences.calorie_preference {
        parts.push(calories.label().to_string());
    }
    if preferences.vegetarian == Some(true) {
        parts.push("素食偏好".to_string());
    }

    let summary = parts.join("；");
    match (&request.goal_notes, summary.is_empty()) {
        (Some(notes), false) => Some(format!("{}。目標補充：{}", summary, notes)),
        (Some(notes), true) => Some(format!("目標補充：{}", notes)),
        (None, false) => Some(summary),
        (None, true) => None,
    }
}
