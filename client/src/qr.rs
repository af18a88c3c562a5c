use qrcode::{Color, EcLevel, QrCode};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub const QR_SIZE_PX: u32 = 100;
const DARK: &str = "#000000";
const LIGHT: &str = "#ffffff";

/// Square grid of QR modules, row-major, `true` for dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    pub width: usize,
    pub modules: Vec<bool>,
}

impl QrMatrix {
    pub fn encode(text: &str) -> Result<Self, qrcode::types::QrError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)?;
        Ok(Self {
            width: code.width(),
            modules: code
                .to_colors()
                .into_iter()
                .map(|color| color == Color::Dark)
                .collect(),
        })
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules.get(y * self.width + x).copied().unwrap_or(false)
    }
}

/// Pixel span `[start, end)` of module `index` when `count` modules fill
/// `size` pixels. Rounded edges keep neighbouring modules gap-free.
pub fn module_span(index: usize, count: usize, size: u32) -> (f64, f64) {
    let step = f64::from(size) / count.max(1) as f64;
    ((index as f64 * step).round(), ((index + 1) as f64 * step).round())
}

/// Render the page URL as a QR code into `container_id` and mirror it as
/// text into `url_id`. Does nothing when the container is missing or the URL
/// cannot be encoded.
pub fn initialize(container_id: &str, url_id: &str) -> bool {
    let Some(container) = crate::find_container(container_id) else {
        return false;
    };
    let Some(href) = web_sys::window().and_then(|w| w.location().href().ok()) else {
        return false;
    };

    let matrix = match QrMatrix::encode(&href) {
        Ok(matrix) => matrix,
        Err(e) => {
            web_sys::console::warn_1(&format!("QR code generation failed: {e}").into());
            return false;
        }
    };

    let Some(canvas) = draw(&matrix) else {
        return false;
    };
    container.set_inner_html("");
    if container.append_child(&canvas).is_err() {
        return false;
    }

    if let Some(url_el) = crate::find_container(url_id) {
        url_el.set_text_content(Some(&href));
    }
    true
}

fn draw(matrix: &QrMatrix) -> Option<HtmlCanvasElement> {
    let document = web_sys::window()?.document()?;
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;
    canvas.set_width(QR_SIZE_PX);
    canvas.set_height(QR_SIZE_PX);

    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()?;

    let size = f64::from(QR_SIZE_PX);
    ctx.set_fill_style_str(LIGHT);
    ctx.fill_rect(0.0, 0.0, size, size);
    ctx.set_fill_style_str(DARK);
    for y in 0..matrix.width {
        let (top, bottom) = module_span(y, matrix.width, QR_SIZE_PX);
        for x in 0..matrix.width {
            if !matrix.is_dark(x, y) {
                continue;
            }
            let (left, right) = module_span(x, matrix.width, QR_SIZE_PX);
            ctx.fill_rect(left, top, right - left, bottom - top);
        }
    }
    Some(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_page_url_as_square_matrix() {
        let matrix = QrMatrix::encode("https://worldanthem.example/map.html").unwrap();
        assert!(matrix.width >= 21);
        assert_eq!(matrix.modules.len(), matrix.width * matrix.width);
        // Finder pattern corner is always dark
        assert!(matrix.is_dark(0, 0));
    }

    #[test]
    fn out_of_range_module_is_light() {
        let matrix = QrMatrix::encode("x").unwrap();
        assert!(!matrix.is_dark(matrix.width, matrix.width));
    }

    #[test]
    fn module_spans_tile_the_canvas() {
        let count = 25;
        let mut cursor = 0.0;
        for i in 0..count {
            let (start, end) = module_span(i, count, QR_SIZE_PX);
            assert_eq!(start, cursor);
            assert!(end > start);
            cursor = end;
        }
        assert_eq!(cursor, f64::from(QR_SIZE_PX));
    }

    #[test]
    fn oversized_input_is_an_error() {
        let long = "a".repeat(5000);
        assert!(QrMatrix::encode(&long).is_err());
    }
}
