use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{coerce_number, first_present};
use super::macros::{normalize_macro_totals, MacroSet};
use super::text_list::normalize_text_list;

pub const CALORIE_ALIASES: &[&str] = &["calories", "calorieTotal", "totalCalories", "kcal"];

/// Calorie and macro summary for a plan or a single day. Absent parts are
/// left out of the serialized form.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Overview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Overview {
    pub fn is_empty(&self) -> bool {
        self.calories.is_none() && self.macros.is_none() && self.notes.is_empty()
    }
}

/// Builds an [`Overview`] from a meta-like object. Never returns an empty
/// shell: if nothing resolves the result is `None`.
pub fn normalize_overview(meta: Option<&Value>) -> Option<Overview> {
    let meta = meta.filter(|v| v.is_object())?;
    let overview = Overview {
        calories: coerce_number(first_present(meta, CALORIE_ALIASES)),
        macros: normalize_macro_totals(meta),
        notes: normalize_text_list(meta.get("notes")),
    };
    (!overview.is_empty()).then_some(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_calorie_aliases_and_notes() {
        let meta = json!({"totalCalories": "1650", "notes": "多喝水、少油"});
        let overview = normalize_overview(Some(&meta)).unwrap();
        assert_eq!(overview.calories, Some(1650.0));
        assert_eq!(overview.macros, None);
        assert_eq!(overview.notes, vec!["多喝水", "少油"]);
    }

    #[test]
    fn empty_meta_is_omitted() {
        assert_eq!(normalize_overview(Some(&json!({}))), None);
        assert_eq!(normalize_overview(Some(&json!({"notes": []}))), None);
        assert_eq!(normalize_overview(Some(&json!("1800 kcal"))), None);
        assert_eq!(normalize_overview(None), None);
    }

    #[test]
    fn serializes_only_present_fields() {
        let overview = Overview {
            calories: Some(2000.0),
            macros: None,
            notes: Vec::new(),
        };
        assert_eq!(serde_json::to_value(&overview).unwrap(), json!({"calories": 2000.0}));
    }
}
