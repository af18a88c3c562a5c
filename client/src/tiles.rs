#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use worldanthem_shared::{TileCoord, TileSource};

const ONLOAD_HANDLE_KEY: &str = "__worldanthemTileOnload";
const ONERROR_HANDLE_KEY: &str = "__worldanthemTileOnerror";

type SourceKey = (u8, i64, i64);

enum TileState {
    Loading(HtmlImageElement),
    Ready(HtmlImageElement),
    /// Failed tiles stay blank for the rest of the page load.
    Failed,
}

/// Base layer images keyed by source tile. Horizontal world repeats share
/// one image.
pub struct TileCache {
    layer: TileSource,
    tiles: Rc<RefCell<HashMap<SourceKey, TileState>>>,
    on_ready: Rc<dyn Fn()>,
}

impl TileCache {
    /// `on_ready` runs whenever a tile finishes loading.
    pub fn new(layer: TileSource, on_ready: Rc<dyn Fn()>) -> Self {
        Self {
            layer,
            tiles: Rc::new(RefCell::new(HashMap::new())),
            on_ready,
        }
    }

    pub fn layer(&self) -> &TileSource {
        &self.layer
    }

    /// The image for `tile` if it has loaded. Starts a request the first time
    /// a tile is asked for.
    pub fn get_or_request(&self, tile: TileCoord) -> Option<HtmlImageElement> {
        let key = tile.source_key();
        if let Some(state) = self.tiles.borrow().get(&key) {
            return match state {
                TileState::Ready(img) => Some(img.clone()),
                TileState::Loading(_) | TileState::Failed => None,
            };
        }
        self.request(key, tile);
        None
    }

    fn request(&self, key: SourceKey, tile: TileCoord) {
        let Ok(img) = HtmlImageElement::new() else {
            self.tiles.borrow_mut().insert(key, TileState::Failed);
            return;
        };
        img.set_cross_origin(Some("anonymous"));

        let tiles = self.tiles.clone();
        let img_for_load = img.clone();
        let on_ready = self.on_ready.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            clear_image_handlers(&img_for_load);
            // A tile pruned while in flight stays out of the cache
            let stored = match tiles.borrow_mut().get_mut(&key) {
                Some(state @ TileState::Loading(_)) => {
                    *state = TileState::Ready(img_for_load.clone());
                    true
                }
                _ => false,
            };
            if stored {
                on_ready();
            }
        });

        let tiles = self.tiles.clone();
        let img_for_error = img.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            clear_image_handlers(&img_for_error);
            tiles.borrow_mut().insert(key, TileState::Failed);
        });

        let onload_js = onload.into_js_value();
        let onerror_js = onerror.into_js_value();
        img.set_onload(Some(onload_js.unchecked_ref()));
        img.set_onerror(Some(onerror_js.unchecked_ref()));
        // Keep the closures reachable from the image until one of them fires.
        let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY), &onload_js);
        let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY), &onerror_js);

        img.set_src(&self.layer.url(tile));
        self.tiles.borrow_mut().insert(key, TileState::Loading(img));
    }

    /// Drop loaded and in-flight tiles outside `keep`. Failed entries stay so
    /// they are not requested again.
    pub fn retain(&self, keep: &HashSet<SourceKey>) {
        self.tiles.borrow_mut().retain(|key, state| match state {
            TileState::Failed => true,
            _ if keep.contains(key) => true,
            TileState::Loading(img) => {
                clear_image_handlers(img);
                img.set_src("");
                false
            }
            TileState::Ready(_) => false,
        });
    }
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}
