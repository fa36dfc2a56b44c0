use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Serialize a serde-backed enum into its string name (e.g. "partial shade").
pub fn serde_enum_name<T: Serialize>(val: &T) -> Option<String> {
    serde_json::to_value(val).ok()?.as_str().map(|s| s.to_string())
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// "partial shade" -> "Partial Shade"
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display format used across the pages, e.g. "Mar 1, 2024".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
