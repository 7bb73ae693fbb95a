//! Number lists inside attribute values, such as `value="0.5, 0.5, 0.5"` or
//! a 16-entry `<matrix value="...">`.

/// Split an attribute value on commas and whitespace.
pub fn split_values(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

/// Parse every entry as a float. `None` if any entry is not a number.
pub fn parse_floats(text: &str) -> Option<Vec<f32>> {
    split_values(text).map(|s| s.parse().ok()).collect()
}

/// Parse exactly `N` floats.
pub fn parse_array<const N: usize>(text: &str) -> Option<[f32; N]> {
    parse_floats(text)?.try_into().ok()
}
