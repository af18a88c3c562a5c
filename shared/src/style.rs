use crate::country::CountryFeature;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// Bootstrap primary blue.
    pub const PRIMARY: Rgb = Rgb(0x0d, 0x6e, 0xfd);

    pub fn css(self, alpha: f64) -> String {
        rgba_css(self.0, self.1, self.2, alpha)
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

pub const BASE_WEIGHT: f64 = 1.0;
pub const BASE_FILL_OPACITY: f64 = 0.3;
pub const HOVER_WEIGHT: f64 = 2.0;
pub const HOVER_FILL_OPACITY: f64 = 0.6;

/// Visual parameters of one boundary path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill_color: Rgb,
    /// Stroke color.
    pub color: Rgb,
    /// Stroke width in CSS pixels.
    pub weight: f64,
    /// Stroke opacity.
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl FeatureStyle {
    pub const BASE: FeatureStyle = FeatureStyle {
        fill_color: Rgb::PRIMARY,
        color: Rgb::WHITE,
        weight: BASE_WEIGHT,
        opacity: 1.0,
        fill_opacity: BASE_FILL_OPACITY,
    };

    pub fn fill_css(&self) -> String {
        self.fill_color.css(self.fill_opacity)
    }

    pub fn stroke_css(&self) -> String {
        self.color.css(self.opacity)
    }
}

/// Base style of a feature. Uniform today; takes the feature so per-country
/// styling only has to change this function.
pub fn style_for(_feature: &CountryFeature) -> FeatureStyle {
    FeatureStyle::BASE
}

/// Emphasis applied while the pointer is over a feature.
pub fn hover_enter(_feature: &CountryFeature, current: &FeatureStyle) -> FeatureStyle {
    FeatureStyle {
        weight: HOVER_WEIGHT,
        fill_opacity: HOVER_FILL_OPACITY,
        ..*current
    }
}

/// Restore the feature's own base style.
pub fn hover_exit(feature: &CountryFeature, _current: &FeatureStyle) -> FeatureStyle {
    style_for(feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Properties;

    fn feature() -> CountryFeature {
        CountryFeature::new(geo::MultiPolygon(Vec::new()), Properties::new())
    }

    #[test]
    fn base_style_values() {
        let style = style_for(&feature());
        assert_eq!(style.fill_color.hex(), "#0d6efd");
        assert_eq!(style.color, Rgb::WHITE);
        assert_eq!(style.weight, 1.0);
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.fill_opacity, 0.3);
    }

    #[test]
    fn hover_emphasizes_stroke_and_fill() {
        let f = feature();
        let base = style_for(&f);
        let hovered = hover_enter(&f, &base);
        assert!(hovered.weight > base.weight);
        assert!(hovered.fill_opacity > base.fill_opacity);
        assert_eq!(hovered.fill_color, base.fill_color);
        assert_eq!(hovered.color, base.color);
    }

    #[test]
    fn hover_exit_restores_pre_hover_style() {
        let f = feature();
        let before = style_for(&f);
        let after = hover_exit(&f, &hover_enter(&f, &before));
        assert_eq!(after, before);
    }

    #[test]
    fn css_strings() {
        assert_eq!(FeatureStyle::BASE.fill_css(), "rgba(13,110,253,0.3)");
        assert_eq!(FeatureStyle::BASE.stroke_css(), "rgba(255,255,255,1)");
    }
}
