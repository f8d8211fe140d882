//! Templates for the detail popups opened by clicking overlay markers.

use std::fmt::Write;

use ortelius_types::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Formatting applied to a popup field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldFormat {
    /// The value is rendered as text.
    Text,
    /// The value is a distance in meters, rendered rounded to whole meters
    /// with an ` m` suffix: `120.4` becomes `120 m`.
    Meters,
}

/// One line of a popup: a logical field read from feature properties.
///
/// The same logical field may be spelled differently by different services,
/// so a field lists its candidate keys in priority order; the first present,
/// non-null property wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Label rendered before the value. `None` renders the bare value.
    pub label: Option<String>,
    /// Property keys that may carry the field, in priority order.
    pub keys: Vec<String>,
    /// Text substituted when no candidate key is present. `None` omits the
    /// whole line instead.
    pub placeholder: Option<String>,
    /// Formatting applied to the value.
    pub format: FieldFormat,
}

impl FieldSpec {
    /// Creates an unlabeled text field.
    pub fn text(keys: &[&str]) -> Self {
        Self {
            label: None,
            keys: keys.iter().map(|key| (*key).into()).collect(),
            placeholder: None,
            format: FieldFormat::Text,
        }
    }

    /// Sets the label rendered before the value.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the text substituted when the field is absent.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Marks the field as a distance in meters.
    pub fn meters(mut self) -> Self {
        self.format = FieldFormat::Meters;
        self
    }

    /// Renders the field value for the given feature, or `None` if the line
    /// should be omitted.
    fn render(&self, feature: &Feature) -> Option<String> {
        let keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        match feature.first_property(&keys) {
            Some(value) => self.format_value(value),
            None => self.placeholder.clone(),
        }
    }

    fn format_value(&self, value: &Value) -> Option<String> {
        match self.format {
            FieldFormat::Text => Some(render_text(value)),
            FieldFormat::Meters => match ortelius_types::coerce_finite(value) {
                Some(meters) => Some(format!("{meters:.0} m")),
                // A present but non-numeric distance is as good as absent.
                None => self.placeholder.clone(),
            },
        }
    }
}

fn render_text(value: &Value) -> String {
    match value {
        Value::String(string) => escape_html(string),
        other => escape_html(&other.to_string()),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for char in text.chars() {
        match char {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Template for the HTML content of a detail popup.
///
/// ```
/// use ortelius::popup::{FieldSpec, PopupTemplate};
/// use ortelius_types::{latlon, Feature};
/// use serde_json::{json, Map};
///
/// let template = PopupTemplate::new(
///     FieldSpec::text(&["name", "dba"]).with_placeholder("Restaurant"),
/// )
/// .with_field(FieldSpec::text(&["grade"]).with_label("Grade").with_placeholder("N/A"));
///
/// let mut properties = Map::new();
/// properties.insert("dba".into(), json!("Lucali"));
/// let feature = Feature::new(latlon!(40.7, -73.9), properties);
///
/// assert_eq!(
///     template.render(&feature),
///     "<strong>Lucali</strong><br/>Grade: N/A"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupTemplate {
    /// The title line, rendered in bold.
    pub title: FieldSpec,
    /// Detail lines rendered after the title.
    pub fields: Vec<FieldSpec>,
}

impl PopupTemplate {
    /// Creates a template with the given title field and no detail lines.
    pub fn new(title: FieldSpec) -> Self {
        Self {
            title,
            fields: Vec::new(),
        }
    }

    /// Appends a detail line to the template.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// The template used for restaurant inspection records: name, seating
    /// and distance, each read through its known key spellings.
    pub fn restaurant() -> Self {
        Self::new(FieldSpec::text(&["name", "RestaurantName", "dba"]).with_placeholder("Restaurant"))
            .with_field(
                FieldSpec::text(&["seating_choice", "SeatingChoice"])
                    .with_label("Seating")
                    .with_placeholder("N/A"),
            )
            .with_field(
                FieldSpec::text(&["dist_meters"])
                    .with_label("Distance")
                    .meters(),
            )
    }

    /// Renders the popup HTML for the given feature.
    pub fn render(&self, feature: &Feature) -> String {
        let mut html = String::new();
        if let Some(title) = self.title.render(feature) {
            let _ = write!(html, "<strong>{title}</strong>");
        }

        for field in &self.fields {
            let Some(value) = field.render(feature) else {
                continue;
            };

            if !html.is_empty() {
                html.push_str("<br/>");
            }
            match &field.label {
                Some(label) => {
                    let _ = write!(html, "{label}: {value}");
                }
                None => html.push_str(&value),
            }
        }

        html
    }
}

impl Default for PopupTemplate {
    fn default() -> Self {
        Self::restaurant()
    }
}

#[cfg(test)]
mod tests {
    use ortelius_types::latlon;
    use serde_json::{json, Map};

    use super::*;

    fn feature(properties: Value) -> Feature {
        let Value::Object(properties) = properties else {
            panic!("test properties must be an object");
        };
        Feature::new(latlon!(40.71, -73.95), properties)
    }

    #[test]
    fn renders_all_fields_when_present() {
        let html = PopupTemplate::restaurant().render(&feature(json!({
            "name": "Corner Slice",
            "seating_choice": "Outdoor",
            "dist_meters": 120.4,
        })));

        assert_eq!(
            html,
            "<strong>Corner Slice</strong><br/>Seating: Outdoor<br/>Distance: 120 m"
        );
    }

    #[test]
    fn title_falls_back_through_key_spellings() {
        let html = PopupTemplate::restaurant().render(&feature(json!({
            "RestaurantName": "Corner Slice",
        })));
        assert!(html.starts_with("<strong>Corner Slice</strong>"));

        let html = PopupTemplate::restaurant().render(&feature(json!({
            "dba": "Lucali",
        })));
        assert!(html.starts_with("<strong>Lucali</strong>"));
    }

    #[test]
    fn absent_fields_use_placeholder_or_are_omitted() {
        let html = PopupTemplate::restaurant().render(&feature(json!({})));

        // No distance line: the field has no placeholder.
        assert_eq!(html, "<strong>Restaurant</strong><br/>Seating: N/A");
    }

    #[test]
    fn meters_are_rounded_to_whole_numbers() {
        let template = PopupTemplate::new(FieldSpec::text(&["dist_meters"]).meters());

        assert_eq!(template.render(&feature(json!({"dist_meters": 120.4}))), "120 m");
        assert_eq!(template.render(&feature(json!({"dist_meters": "89.7"}))), "90 m");
    }

    #[test]
    fn non_numeric_distance_is_treated_as_absent() {
        let template = PopupTemplate::new(FieldSpec::text(&["dist_meters"]).meters());
        assert_eq!(template.render(&feature(json!({"dist_meters": "close"}))), "");
    }

    #[test]
    fn property_values_are_html_escaped() {
        let html = PopupTemplate::restaurant().render(&feature(json!({
            "name": "<script>alert('pwned')</script>",
        })));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
