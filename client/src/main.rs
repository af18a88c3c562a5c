mod boundaries;
mod canvas;
mod map;
mod qr;
mod render_loop;
mod table;
mod tiles;

use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use worldanthem_shared::samples::table_rows;

const MAP_CONTAINER_ID: &str = "map";
const TABLE_CONTAINER_ID: &str = "countries-table";
const QR_CONTAINER_ID: &str = "qrcode-container";
const CURRENT_URL_ID: &str = "current-url";

thread_local! {
    static MOUNT_HANDLES: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Keep a widget mounted for the lifetime of the page.
pub(crate) fn keep_mounted(handle: impl Any) {
    MOUNT_HANDLES.with(|slot| slot.borrow_mut().push(Box::new(handle)));
}

pub(crate) fn find_container(id: &str) -> Option<web_sys::HtmlElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}

fn main() {
    console_error_panic_hook::set_once();

    MOUNT_HANDLES.with(|slot| {
        // Drop widgets from an earlier run so stale effects stop firing
        slot.borrow_mut().clear();
    });

    // Every page carries a subset of the containers; absent ones are skipped
    let _map = map::initialize(MAP_CONTAINER_ID);
    table::initialize(TABLE_CONTAINER_ID, table_rows());
    qr::initialize(QR_CONTAINER_ID, CURRENT_URL_ID);
}
