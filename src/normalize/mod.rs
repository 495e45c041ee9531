//! Tolerant canonicalization of generator output.
//!
//! Each submodule lists its field aliases as constants so precedence can be
//! audited and tested without going through a whole plan.

pub mod coerce;
pub mod day;
pub mod macros;
pub mod meal;
pub mod overview;
pub mod text_list;

pub use coerce::{coerce_number, coerce_string};
pub use day::{normalize_day, DayPlan};
pub use macros::{normalize_macro_totals, normalize_macros, MacroSet, MealMacros};
pub use meal::{normalize_meal, normalize_meals, Meal};
pub use overview::{normalize_overview, Overview};
pub use text_list::{normalize_steps, normalize_text_list, parse_ingredient_list, unique_list};
