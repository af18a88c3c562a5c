use crate::country::CountryFeature;
use crate::samples::CountrySample;

pub const DATA_DOWNLOAD_COMMAND: &str = "worldanthem data download";

/// Structured popup body. The client turns this into markup, so no HTML is
/// assembled from feature properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub class_name: &'static str,
    pub heading: String,
    pub lines: Vec<PopupLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupLine {
    /// `label: value` pair with a bold label.
    Field { label: &'static str, value: String },
    /// Small muted text.
    Muted(String),
    Divider,
    /// Italic placeholder for content that is not available yet.
    Placeholder(&'static str),
    /// Instruction embedding a shell command.
    Command {
        before: &'static str,
        command: &'static str,
        after: &'static str,
    },
}

impl PopupContent {
    /// Popup for a clicked boundary. Anthem details are not joined to
    /// boundaries yet, so the body carries a placeholder.
    pub fn for_country(feature: &CountryFeature) -> Self {
        let mut lines = Vec::new();
        if let Some(code) = feature.iso_code() {
            lines.push(PopupLine::Muted(format!("ISO Code: {code}")));
        }
        lines.push(PopupLine::Divider);
        lines.push(PopupLine::Placeholder("Anthem data coming soon!"));
        lines.push(PopupLine::Command {
            before: "Run",
            command: DATA_DOWNLOAD_COMMAND,
            after: "to populate",
        });
        Self {
            class_name: "country-popup",
            heading: feature.popup_name(),
            lines,
        }
    }

    /// Popup for a fallback marker.
    pub fn for_sample(sample: &CountrySample) -> Self {
        Self {
            class_name: "sample-popup",
            heading: sample.name.clone(),
            lines: vec![
                PopupLine::Field {
                    label: "National Anthem",
                    value: sample.anthem.clone(),
                },
                PopupLine::Field {
                    label: "Adopted",
                    value: sample.anthem_date.clone(),
                },
                PopupLine::Field {
                    label: "Founded",
                    value: sample.founded.clone(),
                },
                PopupLine::Placeholder("Audio playback coming soon"),
            ],
        }
    }

    /// Flattened text, one line per entry.
    pub fn plain_text(&self) -> String {
        let mut out = self.heading.clone();
        for line in &self.lines {
            let text = match line {
                PopupLine::Field { label, value } => format!("{label}: {value}"),
                PopupLine::Muted(text) => text.clone(),
                PopupLine::Divider => continue,
                PopupLine::Placeholder(text) => (*text).to_string(),
                PopupLine::Command {
                    before,
                    command,
                    after,
                } => format!("{before} {command} {after}"),
            };
            out.push('\n');
            out.push_str(&text);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipDirection {
    Top,
}

/// Hover label bound to a boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub secondary: Option<String>,
    pub direction: TooltipDirection,
    pub permanent: bool,
    pub class_name: &'static str,
}

impl Tooltip {
    pub fn for_feature(feature: &CountryFeature) -> Self {
        Self {
            text: feature.display_name(),
            secondary: feature.native_name(),
            direction: TooltipDirection::Top,
            permanent: false,
            class_name: "country-tooltip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Properties;
    use crate::samples::map_samples;
    use geo::MultiPolygon;
    use serde_json::json;

    fn feature(props: serde_json::Value) -> CountryFeature {
        let props: Properties = serde_json::from_value(props).unwrap();
        CountryFeature::new(MultiPolygon(Vec::new()), props)
    }

    #[test]
    fn country_popup_lists_name_code_and_placeholder() {
        let popup = PopupContent::for_country(&feature(json!({ "ADMIN": "Japan", "iso_a3": "JPN" })));
        assert_eq!(popup.heading, "Japan");
        assert_eq!(popup.lines[0], PopupLine::Muted("ISO Code: JPN".into()));
        let text = popup.plain_text();
        assert!(text.contains("Anthem data coming soon!"));
        assert!(text.contains("Run worldanthem data download to populate"));
    }

    #[test]
    fn country_popup_without_metadata_uses_sentinel_and_skips_code() {
        let popup = PopupContent::for_country(&feature(json!({})));
        assert_eq!(popup.heading, "Unknown Country");
        assert!(!popup.plain_text().contains("ISO Code"));
        assert_eq!(popup.lines[0], PopupLine::Divider);
    }

    #[test]
    fn sample_popup_lists_anthem_details() {
        let samples = map_samples();
        let japan = samples.iter().find(|s| s.name == "Japan").unwrap();
        let text = PopupContent::for_sample(japan).plain_text();
        assert!(text.starts_with("Japan"));
        assert!(text.contains("National Anthem: Kimigayo"));
        assert!(text.contains("Adopted: 1888"));
        assert!(text.contains("Founded: 660 BCE"));
        assert!(text.to_lowercase().contains("audio"));
    }

    #[test]
    fn tooltip_is_top_anchored_and_transient() {
        let tooltip = Tooltip::for_feature(&feature(json!({ "name": "Brazil", "native_name": "Brasil" })));
        assert_eq!(tooltip.text, "Brazil");
        assert_eq!(tooltip.secondary.as_deref(), Some("Brasil"));
        assert_eq!(tooltip.direction, TooltipDirection::Top);
        assert!(!tooltip.permanent);
    }
}
