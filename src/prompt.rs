use serde::Serialize;

use crate::plan::Timeframe;
use crate::request::{CanonicalRequest, Goal, Preferences, Profile};

pub const SYSTEM_PROMPT: &str = r#"你是一位專業的營養師兼料理顧問。你的任務是依照使用者的健康目標與基本資料，規劃「一日」或「一週」的個人化營養餐。

請嚴格遵循以下規範：
- 使用繁體中文。
- 回覆僅能包含有效的 JSON，禁止附加 Markdown、註解或多餘文字。
- JSON 結構須符合：
{
  "timeframe": "day" | "week",
  "title": "簡短標題",
  "profileSummary": "摘要使用者需求與限制",
  "overview": {
    "calories": number,
    "macros": { "protein": number, "carbs": number, "fat": number },
    "notes": [string]
  },
  "meals": [Meal]   // 僅 timeframe = "day" 時存在
  "days": [DayPlan] // 僅 timeframe = "week" 時存在
  "tips": [string]
}

Meal 需包含：
{
  "mealType": "早餐" | "午餐" | "晚餐" | "加餐" | "點心" | "寶寶餐",
  "name": "餐點名稱",
  "kcal": number,
  "macros": { "P": number, "C": number, "F": number },
  "ingredients": [string],
  "steps": [string],
  "tags": [string],
  "tips": [string]
}

DayPlan 需包含：
{
  "label": "Day 1" 等,
  "summary": "當日重點",
  "overview": { 同 overview 結構 },
  "meals": [Meal],
  "tips": [string]
}

請將使用者提供的過敏、忌口與目標納入規劃，若為嬰幼兒餐點務必注意安全與質地。"#;

pub fn goal_guidance(goal: Option<Goal>) -> &'static str {
    match goal {
        Some(Goal::Baby) => "著重嬰幼兒安全，避免蜂蜜、未全熟蛋、過鹹或過硬食材，描述軟爛或泥糊質地。",
        Some(Goal::Loss) => "以熱量控制、高纖維與高蛋白為主，提供實際份量與烹調技巧以利減脂。",
        Some(Goal::Muscle) => "確保足夠蛋白質與複合碳水，安排運動前後的加餐或恢復建議。",
        Some(Goal::Vegan) => "所有餐點採植物性食材，兼顧完整蛋白與微量營養素補充。",
        Some(Goal::Balanced) => "維持營養均衡與多樣性，兼顧實際可執行的烹調方式。",
        None => "提供易於實作的健康料理，兼顧熱量與營養素的平衡。",
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptPayload<'a> {
    timeframe: Timeframe,
    goal: Option<Goal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal_notes: Option<&'a str>,
    profile: &'a Profile,
    preferences: &'a Preferences,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    guidelines: &'static str,
}

/// User turn sent after the system prompt and history.
pub fn build_prompt(request: &CanonicalRequest, timeframe: Timeframe) -> Result<String, serde_json::Error> {
    let payload = PromptPayload {
        timeframe,
        goal: request.goal,
        goal_notes: request.goal_notes.as_deref(),
        profile: &request.profile,
        preferences: &request.preferences,
        summary: request.summary.as_deref(),
        guidelines: goal_guidance(request.goal),
    };
    let span = match timeframe {
        Timeframe::Week => "七天",
        Timeframe::Day => "單日",
    };
    Ok(format!(
        "請依據以下使用者資訊，生成符合系統要求的 {}餐飲計畫，並僅輸出 JSON：\n{}",
        span,
        serde_json::to_string_pretty(&payload)?
    ))
}
