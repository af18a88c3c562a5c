use serde_json::{Map, Value};

/// Free-form GeoJSON feature properties.
pub type Properties = Map<String, Value>;

/// Display-name candidates, highest priority first. Different boundary
/// sources spell the country name differently.
pub const NAME_KEYS: &[&str] = &["name", "ADMIN", "NAME"];
/// ISO 3166 alpha-3 candidates, highest priority first.
pub const ISO_KEYS: &[&str] = &["iso_a3", "ISO_A3", "id"];
pub const NATIVE_NAME_KEY: &str = "native_name";

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

/// Return the first candidate key holding a usable value.
///
/// Strings count when non-blank (trimmed); numbers count using their JSON
/// text. Null, booleans, arrays and objects are skipped.
pub fn first_present(props: &Properties, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| props.get(*key).and_then(value_text))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Name used for tooltips and hit labels.
pub fn display_name(props: &Properties) -> String {
    first_present(props, NAME_KEYS).unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Name used as the popup heading.
pub fn popup_name(props: &Properties) -> String {
    first_present(props, NAME_KEYS).unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
}

pub fn iso_code(props: &Properties) -> Option<String> {
    first_present(props, ISO_KEYS)
}

pub fn native_name(props: &Properties) -> Option<String> {
    first_present(props, &[NATIVE_NAME_KEY])
}
