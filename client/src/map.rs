use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};

use worldanthem_shared::layer::OpenPopup;
use worldanthem_shared::popup::TooltipDirection;
use worldanthem_shared::samples::map_samples;
use worldanthem_shared::{MapLayer, MapView, PopupContent, PopupLine, TileSource, Tooltip};

use crate::boundaries;
use crate::canvas;
use crate::render_loop::FrameScheduler;
use crate::tiles::TileCache;

/// Pointer travel below which a press counts as a click, not a drag.
const CLICK_SLOP_PX: f64 = 5.0;
/// Accumulated wheel travel per zoom level.
const WHEEL_PX_PER_LEVEL: f64 = 60.0;
const WHEEL_LINE_PX: f64 = 40.0;
/// Gap between the pointer and a top-anchored tooltip.
const TOOLTIP_OFFSET_PX: f64 = 12.0;

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

/// Tooltip currently following the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverTip {
    pub tooltip: Tooltip,
    pub x: f64,
    pub y: f64,
}

/// Reactive state of one mounted map. Cheap to copy.
#[derive(Clone, Copy)]
pub struct MapHandle {
    pub view: RwSignal<MapView>,
    pub base_layer: RwSignal<Option<TileSource>>,
    pub layer: RwSignal<MapLayer>,
    pub popup: RwSignal<Option<OpenPopup>>,
    pub hover_tip: RwSignal<Option<HoverTip>>,
}

impl MapHandle {
    fn new() -> Self {
        Self {
            view: RwSignal::new(MapView::default()),
            base_layer: RwSignal::new(None),
            layer: RwSignal::new(MapLayer::Pending),
            popup: RwSignal::new(None),
            hover_tip: RwSignal::new(None),
        }
    }

    pub fn add_base_layer(&self, source: TileSource) {
        self.base_layer.set(Some(source));
    }

    /// Request the boundary collection and settle the interactive layer:
    /// boundaries on success, sample markers on any failure.
    pub fn load_boundaries(&self) {
        let layer = self.layer;
        spawn_local(async move {
            let outcome = boundaries::load_boundaries().await;
            boundaries::report(&outcome);
            layer.set(MapLayer::from_outcome(outcome, &map_samples()));
        });
    }
}

/// Mount the map into `container_id`. Returns `None` when the page has no
/// such element.
pub fn initialize(container_id: &str) -> Option<MapHandle> {
    let container = crate::find_container(container_id)?;
    let handle = MapHandle::new();
    handle.add_base_layer(TileSource::openstreetmap());

    let mount = mount_to(container, move || view! { <MapWidget handle=handle /> });
    crate::keep_mounted(mount);

    handle.load_boundaries();
    Some(handle)
}

#[component]
fn MapWidget(handle: MapHandle) -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let tiles_loaded = RwSignal::new(0u32);

    let tile_cache: Rc<RefCell<Option<TileCache>>> = Rc::new(RefCell::new(None));
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = Rc::new(FrameScheduler::new({
        let tile_cache = tile_cache.clone();
        move || {
            let Some(canvas_el) = canvas_ref.get_untracked() else {
                return;
            };
            let canvas_el: &HtmlCanvasElement = &canvas_el;

            let ctx = {
                let mut slot = cached_ctx.borrow_mut();
                if slot.is_none() {
                    *slot = canvas_el
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
                }
                let Some(ctx) = slot.clone() else {
                    return;
                };
                ctx
            };

            let Some((w, h)) = canvas::fit_to_parent(canvas_el, &ctx) else {
                return;
            };
            handle.view.maybe_update(|view| {
                let changed = view.width != w || view.height != h;
                if changed {
                    view.resize(w, h);
                }
                changed
            });

            {
                let mut cache = tile_cache.borrow_mut();
                let source = handle.base_layer.get_untracked();
                let stale = match (cache.as_ref(), source.as_ref()) {
                    (Some(existing), Some(source)) => existing.layer() != source,
                    (None, Some(_)) | (Some(_), None) => true,
                    (None, None) => false,
                };
                if stale {
                    *cache = source.map(|source| {
                        TileCache::new(
                            source,
                            Rc::new(move || tiles_loaded.update(|n| *n = n.wrapping_add(1))),
                        )
                    });
                }
            }

            let cache = tile_cache.borrow();
            handle.view.with_untracked(|view| {
                handle
                    .layer
                    .with_untracked(|layer| canvas::paint(&ctx, view, cache.as_ref(), layer));
            });
        }
    }));

    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            handle.view.track();
            handle.base_layer.track();
            handle.layer.track();
            tiles_loaded.track();
            scheduler.mark_dirty();
        }
    });

    bind_window_resize({
        let scheduler = scheduler.clone();
        move || scheduler.mark_dirty()
    });

    let is_dragging = Rc::new(Cell::new(false));
    let drag_start = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let last_pointer = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let wheel_travel = Rc::new(Cell::new(0.0f64));

    let local_point = move |client_x: i32, client_y: i32| -> Option<(f64, f64)> {
        let el = canvas_ref.get_untracked()?;
        let rect = el.get_bounding_client_rect();
        Some((f64::from(client_x) - rect.left(), f64::from(client_y) - rect.top()))
    };

    let update_hover = move |x: f64, y: f64| {
        let pick = handle
            .layer
            .with_untracked(|layer| handle.view.with_untracked(|view| layer.pick(view, x, y)));
        handle.layer.maybe_update(|layer| layer.hover(pick));

        let tip = pick.and_then(|pick| {
            handle.layer.with_untracked(|layer| {
                layer.tooltip(pick).map(|tooltip| HoverTip {
                    tooltip: tooltip.clone(),
                    x,
                    y,
                })
            })
        });
        if tip != handle.hover_tip.get_untracked() {
            handle.hover_tip.set(tip);
        }
        set_cursor(canvas_ref, if pick.is_some() { "pointer" } else { "grab" });
    };

    let clear_hover = move || {
        handle.layer.maybe_update(|layer| layer.hover(None));
        if handle.hover_tip.get_untracked().is_some() {
            handle.hover_tip.set(None);
        }
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start = drag_start.clone();
        let last_pointer = last_pointer.clone();
        move |e: PointerEvent| {
            let at = (f64::from(e.client_x()), f64::from(e.client_y()));
            is_dragging.set(true);
            drag_start.set(at);
            last_pointer.set(at);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_pointer = last_pointer.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let (lx, ly) = last_pointer.get();
                let (cx, cy) = (f64::from(e.client_x()), f64::from(e.client_y()));
                last_pointer.set((cx, cy));
                clear_hover();
                set_cursor(canvas_ref, "grabbing");
                handle.view.update(|view| view.pan(cx - lx, cy - ly));
                return;
            }
            if let Some((x, y)) = local_point(e.client_x(), e.client_y()) {
                update_hover(x, y);
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some((x, y)) = local_point(e.client_x(), e.client_y()) {
                update_hover(x, y);
            }
        }
    };

    let on_pointer_leave = {
        let is_dragging = is_dragging.clone();
        move |_: PointerEvent| {
            if !is_dragging.get() {
                clear_hover();
            }
        }
    };

    let on_click = {
        let drag_start = drag_start.clone();
        move |e: MouseEvent| {
            let (sx, sy) = drag_start.get();
            let dx = (f64::from(e.client_x()) - sx).abs();
            let dy = (f64::from(e.client_y()) - sy).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let Some((x, y)) = local_point(e.client_x(), e.client_y()) else {
                return;
            };

            let view = handle.view.get_untracked();
            let pick = handle.layer.with_untracked(|layer| layer.pick(&view, x, y));
            let opened = pick.and_then(|pick| {
                let at = view.screen_to_latlng(x, y);
                handle
                    .layer
                    .try_update_untracked(|layer| layer.click(pick, at))
                    .flatten()
            });
            handle.popup.set(opened);
        }
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let step = match e.delta_mode() {
            WheelEvent::DOM_DELTA_LINE => e.delta_y() * WHEEL_LINE_PX,
            WheelEvent::DOM_DELTA_PAGE => e.delta_y() * WHEEL_PX_PER_LEVEL,
            _ => e.delta_y(),
        };
        let travel = wheel_travel.get() + step;
        if travel.abs() < WHEEL_PX_PER_LEVEL {
            wheel_travel.set(travel);
            return;
        }
        wheel_travel.set(0.0);

        let Some((x, y)) = local_point(e.client_x(), e.client_y()) else {
            return;
        };
        let delta = if travel < 0.0 { 1 } else { -1 };
        clear_hover();
        handle.view.maybe_update(|view| view.zoom_at(delta, x, y));
    };

    view! {
        <div class="worldanthem-map" style="position: relative; width: 100%; height: 100%; overflow: hidden;">
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointerleave=on_pointer_leave
                on:click=on_click
                on:wheel=on_wheel
            />
            <ZoomControl map_view=handle.view />
            <Attribution base_layer=handle.base_layer />
            {move || handle.hover_tip.get().map(|tip| view! { <TooltipView tip=tip /> })}
            {move || {
                handle
                    .popup
                    .get()
                    .map(|popup| view! { <PopupView popup=popup map_view=handle.view on_close=handle.popup /> })
            }}
        </div>
    }
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
    if let Some(el) = canvas_ref.get_untracked() {
        let el: &HtmlCanvasElement = &el;
        web_sys::HtmlElement::style(el).set_property("cursor", cursor).ok();
    }
}

fn bind_window_resize(on_resize: impl Fn() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };

    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old._handler.as_ref().unchecked_ref());
        }
    });

    let handler = Closure::<dyn Fn()>::new(on_resize);
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                _handler: handler,
            });
        });
    }
}

#[component]
fn ZoomControl(map_view: RwSignal<MapView>) -> impl IntoView {
    let zoom_in = move |e: MouseEvent| {
        e.prevent_default();
        map_view.maybe_update(MapView::zoom_in);
    };
    let zoom_out = move |e: MouseEvent| {
        e.prevent_default();
        map_view.maybe_update(MapView::zoom_out);
    };

    view! {
        <div class="map-control map-control-zoom" style="position: absolute; top: 10px; left: 10px; z-index: 2;">
            <a
                href="#"
                role="button"
                title="Zoom in"
                class="map-control-zoom-in"
                class:disabled=move || !map_view.with(MapView::can_zoom_in)
                on:click=zoom_in
            >
                "+"
            </a>
            <a
                href="#"
                role="button"
                title="Zoom out"
                class="map-control-zoom-out"
                class:disabled=move || !map_view.with(MapView::can_zoom_out)
                on:click=zoom_out
            >
                "\u{2212}"
            </a>
        </div>
    }
}

#[component]
fn Attribution(base_layer: RwSignal<Option<TileSource>>) -> impl IntoView {
    move || {
        base_layer.get().map(|source| {
            view! {
                <div class="map-attribution" style="position: absolute; right: 0; bottom: 0; z-index: 2;">
                    "\u{a9} "
                    <a href=source.attribution_url target="_blank" rel="noopener">
                        {source.attribution_text}
                    </a>
                    " contributors"
                </div>
            }
        })
    }
}

#[component]
fn TooltipView(tip: HoverTip) -> impl IntoView {
    let HoverTip { tooltip, x, y } = tip;
    let transform = match tooltip.direction {
        TooltipDirection::Top => "translate(-50%, -100%)",
    };

    view! {
        <div
            class=format!("map-tooltip {}", tooltip.class_name)
            style="position: absolute; pointer-events: none; z-index: 3; white-space: nowrap;"
            style:left=format!("{x}px")
            style:top=format!("{}px", y - TOOLTIP_OFFSET_PX)
            style:transform=transform
        >
            <div>{tooltip.text}</div>
            {tooltip.secondary.map(|native| view! { <div class="native-name"><em>{native}</em></div> })}
        </div>
    }
}

#[component]
fn PopupView(popup: OpenPopup, map_view: RwSignal<MapView>, on_close: RwSignal<Option<OpenPopup>>) -> impl IntoView {
    let OpenPopup {
        content,
        anchor,
        offset_y,
    } = popup;
    let PopupContent {
        class_name,
        heading,
        lines,
    } = content;

    let position = move || map_view.with(|v| v.latlng_to_screen(anchor));
    let close = move |e: MouseEvent| {
        e.prevent_default();
        on_close.set(None);
    };

    view! {
        <div
            class=format!("map-popup {class_name}")
            style="position: absolute; z-index: 4; transform: translate(-50%, -100%); min-width: 200px;"
            style:left=move || format!("{}px", position().0)
            style:top=move || format!("{}px", position().1 - offset_y - 8.0)
        >
            <a href="#" role="button" class="map-popup-close" title="Close" on:click=close>
                "\u{d7}"
            </a>
            <div class="map-popup-content">
                <h5>{heading}</h5>
                {lines.into_iter().map(popup_line).collect_view()}
            </div>
        </div>
    }
}

fn popup_line(line: PopupLine) -> AnyView {
    match line {
        PopupLine::Field { label, value } => view! {
            <p class="mb-1"><strong>{label}":"</strong>" "{value}</p>
        }
        .into_any(),
        PopupLine::Muted(text) => view! { <p class="text-muted small mb-1">{text}</p> }.into_any(),
        PopupLine::Divider => view! { <hr class="my-2" /> }.into_any(),
        PopupLine::Placeholder(text) => view! { <p class="mb-1"><em>{text}</em></p> }.into_any(),
        PopupLine::Command {
            before,
            command,
            after,
        } => view! {
            <p class="small mb-0">{before}" "<code>{command}</code>" "{after}</p>
        }
        .into_any(),
    }
}
