use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use worldanthem_shared::popup::DATA_DOWNLOAD_COMMAND;
use worldanthem_shared::samples::parse_table_rows;
use worldanthem_shared::table::{self, COLUMN_TITLES, PAGE_SIZE_OPTIONS, PageSize, TableQuery};
use worldanthem_shared::{AudioRef, CountrySample};

/// Host pages may embed their own rows as JSON on the container.
const ROWS_ATTRIBUTE: &str = "data-rows";

/// Mount the countries table into `container_id`. Rows embedded on the
/// container take precedence over `rows`. A `<table>` container is replaced
/// by a sibling block. Returns `false` when the page has no such element.
pub fn initialize(container_id: &str, rows: Vec<CountrySample>) -> bool {
    let Some(container) = crate::find_container(container_id) else {
        return false;
    };

    let rows = match container.get_attribute(ROWS_ATTRIBUTE) {
        Some(raw) => match parse_table_rows(&raw) {
            Ok(embedded) => embedded,
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("Ignoring malformed {ROWS_ATTRIBUTE} on #{container_id}: {e}").into(),
                );
                rows
            }
        },
        None => rows,
    };

    let Some(target) = mount_target(container) else {
        return false;
    };
    let mount = mount_to(target, move || view! { <CountriesTable rows=rows /> });
    crate::keep_mounted(mount);
    true
}

/// Table markup cannot hold the widget's wrapper, so a `<table>` host is
/// hidden and the widget mounts into a block inserted right before it.
fn needs_wrapper(tag_name: &str) -> bool {
    tag_name.eq_ignore_ascii_case("table")
}

fn mount_target(container: web_sys::HtmlElement) -> Option<web_sys::HtmlElement> {
    if !needs_wrapper(&container.tag_name()) {
        return Some(container);
    }
    let wrapper = web_sys::window()?
        .document()?
        .create_element("div")
        .ok()?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()?;
    wrapper.set_class_name("countries-table-wrapper");
    container
        .insert_adjacent_element("beforebegin", &wrapper)
        .ok()?;
    container.set_hidden(true);
    Some(wrapper)
}

#[component]
fn CountriesTable(rows: Vec<CountrySample>) -> impl IntoView {
    let rows = StoredValue::new(rows);
    let query = RwSignal::new(TableQuery::default());
    let page = Memo::new(move |_| query.with(|q| rows.with_value(|r| table::run(r, q))));

    let on_search = move |e: web_sys::Event| {
        query.update(|q| q.set_search(event_target_value(&e)));
    };

    let on_page_size = move |e: web_sys::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(select) = target.dyn_into::<web_sys::HtmlSelectElement>() else {
            return;
        };
        if let Some(size) = PageSize::from_value(&select.value()) {
            query.update(|q| q.set_page_size(size));
        }
    };

    let headers = COLUMN_TITLES
        .iter()
        .enumerate()
        .map(|(column, title)| {
            let sort_class = move || {
                query.with(|q| {
                    if q.sort_column == column {
                        q.direction.class_name()
                    } else {
                        "sorting"
                    }
                })
            };
            view! {
                <th
                    class=sort_class
                    style="cursor: pointer; user-select: none;"
                    on:click=move |_| query.update(|q| q.sort_by(column))
                >
                    {*title}
                </th>
            }
        })
        .collect_view();

    let body = move || {
        let current = page.get();
        if current.is_empty() {
            return view! {
                <tr>
                    <td colspan=COLUMN_TITLES.len().to_string() class="dataTables_empty text-center">
                        "No countries found"
                    </td>
                </tr>
            }
            .into_any();
        }
        rows.with_value(|all| {
            current
                .rows
                .iter()
                .map(|&idx| table_row(&all[idx]))
                .collect_view()
        })
        .into_any()
    };

    let page_buttons = move || {
        let current = page.get();
        (0..current.page_count)
            .map(|n| {
                let active = n == current.page;
                view! {
                    <li class="paginate_button page-item" class:active=active>
                        <a href="#" class="page-link" on:click=move |e: web_sys::MouseEvent| {
                            e.prevent_default();
                            query.update(|q| q.go_to(n));
                        }>
                            {n + 1}
                        </a>
                    </li>
                }
            })
            .collect_view()
    };

    let go_previous = move |e: web_sys::MouseEvent| {
        e.prevent_default();
        let current = page.get_untracked().page;
        if current > 0 {
            query.update(|q| q.go_to(current - 1));
        }
    };

    let go_next = move |e: web_sys::MouseEvent| {
        e.prevent_default();
        let current = page.get_untracked();
        if current.page + 1 < current.page_count {
            query.update(|q| q.go_to(current.page + 1));
        }
    };

    view! {
        <div class="worldanthem-table">
            <div class="alert alert-info small" role="note">
                "These are sample rows. The full country list appears after running "
                <code>{DATA_DOWNLOAD_COMMAND}</code>
                "."
            </div>
            <div class="dataTables_wrapper">
                <div class="row mb-2">
                    <div class="col-sm-6 dataTables_length">
                        <label>
                            "Show "
                            <select class="form-select form-select-sm d-inline-block w-auto" on:change=on_page_size>
                                {PAGE_SIZE_OPTIONS
                                    .iter()
                                    .map(|&size| {
                                        view! {
                                            <option
                                                value=size.value().to_string()
                                                selected=move || query.with(|q| q.page_size == size)
                                            >
                                                {size.label()}
                                            </option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                            " countries per page"
                        </label>
                    </div>
                    <div class="col-sm-6 dataTables_filter text-end">
                        <label>
                            "Search countries:"
                            <input
                                type="search"
                                class="form-control form-control-sm d-inline-block w-auto ms-2"
                                prop:value=move || query.with(|q| q.search.clone())
                                on:input=on_search
                            />
                        </label>
                    </div>
                </div>
                <table class="table table-striped table-hover">
                    <thead>
                        <tr>{headers}</tr>
                    </thead>
                    <tbody>{body}</tbody>
                </table>
                <div class="row">
                    <div class="col-sm-5 dataTables_info" role="status">
                        {move || {
                            let current = page.get();
                            match current.filtered_note() {
                                Some(note) => format!("{} {note}", current.info()),
                                None => current.info(),
                            }
                        }}
                    </div>
                    <div class="col-sm-7 dataTables_paginate">
                        <ul class="pagination justify-content-end">
                            <li
                                class="paginate_button page-item previous"
                                class:disabled=move || page.with(|p| p.page == 0)
                            >
                                <a href="#" class="page-link" on:click=go_previous>
                                    "Previous"
                                </a>
                            </li>
                            {page_buttons}
                            <li
                                class="paginate_button page-item next"
                                class:disabled=move || page.with(|p| p.page + 1 >= p.page_count)
                            >
                                <a href="#" class="page-link" on:click=go_next>
                                    "Next"
                                </a>
                            </li>
                        </ul>
                    </div>
                </div>
            </div>
        </div>
    }
}

fn table_row(row: &CountrySample) -> AnyView {
    view! {
        <tr>
            <td>{row.name.clone()}</td>
            <td>{row.anthem.clone()}</td>
            <td>{row.anthem_date.clone()}</td>
            <td>{row.founded.clone()}</td>
            <td>{audio_cell(&row.audio)}</td>
        </tr>
    }
    .into_any()
}

fn audio_cell(audio: &AudioRef) -> AnyView {
    match audio {
        AudioRef::Available(url) => view! {
            <audio controls preload="none">
                <source src=url.clone() type="audio/mpeg" />
                "Your browser does not support audio playback."
            </audio>
        }
        .into_any(),
        AudioRef::ComingSoon => view! {
            <span class="badge bg-secondary">{AudioRef::ComingSoon.label().to_string()}</span>
        }
        .into_any(),
    }
}
