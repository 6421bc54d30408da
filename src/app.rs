use std::rc::Rc;

use dioxus::prelude::*;
use rfd::FileDialog;

use crate::domain::entities::product::{
    Category, Credentials, FieldErrors, LoginField, Product, ProductField, ProductId,
};
use crate::domain::entities::table::{ColumnId, FilterValue, SortDirection, ALL_OPTION_VALUE};
use crate::infra::export::csv::export_products_csv;
use crate::infra::image::preview::{load_image_preview, ACCEPTED_EXTENSIONS};
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::{AppState, Screen, Services, Startup};
use crate::usecase::cache::QueryKey;
use crate::usecase::ports::catalog_api::ApiError;
use crate::usecase::services::auth_service::AuthError;
use crate::usecase::workflow::{EditorMode, MutationError, ProductEditor};
use crate::{category_badge_style, format_price, table_container_style, table_header_cell_style};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DropdownId {
    CategoryFilter,
    ColumnVisibility,
    EditorCategory,
}

#[derive(Clone, Debug, PartialEq)]
struct DropdownOption {
    value: String,
    label: String,
}

fn dropdown_label(options: &[DropdownOption], selected: Option<&str>) -> String {
    selected
        .and_then(|value| options.iter().find(|opt| opt.value == value))
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| "Select a category".to_string())
}

fn category_options(include_all: bool) -> Vec<DropdownOption> {
    let all = include_all.then(|| DropdownOption {
        value: ALL_OPTION_VALUE.to_string(),
        label: "All categories".to_string(),
    });
    all.into_iter()
        .chain(Category::ALL.into_iter().map(|category| DropdownOption {
            value: category.as_str().to_string(),
            label: category.label().to_string(),
        }))
        .collect()
}

/// The input keeps the raw text; only the trimmed term reaches the table.
pub(crate) fn title_filter_value(text: &str) -> FilterValue {
    FilterValue::Text(text.trim().to_string())
}

fn parse_bound(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[component]
fn DropdownSelect(
    id: DropdownId,
    label: &'static str,
    options: Vec<DropdownOption>,
    selected: Option<String>,
    mut open_dropdown: Signal<Option<DropdownId>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_select: EventHandler<String>,
) -> Element {
    let is_open = open_dropdown() == Some(id);
    let selected_label = dropdown_label(&options, selected.as_deref());
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        div {
            style: "position: relative; display: inline-flex; align-items: center; gap: 6px;",
            if !label.is_empty() {
                span { "{label}" }
            }
            button {
                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                onclick: move |event| {
                    event.stop_propagation();
                    if open_dropdown() == Some(id) {
                        open_dropdown.set(None);
                        return;
                    }
                    let point = event.client_coordinates();
                    dropdown_pos.set(Some((point.x, point.y + 24.0)));
                    open_dropdown.set(Some(id));
                },
                "{selected_label}"
            }
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 200px; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                onclick: move |event| event.stop_propagation(),
                {options.iter().map(|opt| {
                    let value = opt.value.clone();
                    let label = opt.label.clone();
                    let is_selected = selected.as_deref() == Some(value.as_str());
                    let background = if is_selected { "#eef4ff" } else { "transparent" };
                    rsx!(
                        div {
                            style: "padding: 8px 10px; cursor: pointer; background: {background};",
                            onclick: move |_| {
                                on_select.call(value.clone());
                                open_dropdown.set(None);
                            },
                            "{label}"
                        }
                    )
                })}
            }
        }
    }
}

#[component]
fn ColumnVisibilityDropdown(
    id: DropdownId,
    columns: Vec<(ColumnId, bool)>,
    mut open_dropdown: Signal<Option<DropdownId>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_toggle: EventHandler<(ColumnId, bool)>,
) -> Element {
    let is_open = open_dropdown() == Some(id);
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        button {
            style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
            onclick: move |event| {
                event.stop_propagation();
                if open_dropdown() == Some(id) {
                    open_dropdown.set(None);
                    return;
                }
                let point = event.client_coordinates();
                dropdown_pos.set(Some((point.x - 160.0, point.y + 24.0)));
                open_dropdown.set(Some(id));
            },
            "Columns"
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 180px; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200; padding: 6px;",
                onclick: move |event| event.stop_propagation(),
                {columns.iter().map(|(column, checked)| {
                    let column = *column;
                    let checked = *checked;
                    rsx!(
                        label {
                            style: "display: flex; align-items: center; gap: 8px; padding: 6px 4px; cursor: pointer;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onclick: move |_| {
                                    on_toggle.call((column, !checked));
                                }
                            }
                            span { "{column.header()}" }
                        }
                    )
                })}
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let services = match use_context::<Startup>() {
        Startup::Ready(services) => services,
        Startup::Failed(err) => {
            return rsx! {
                div {
                    p { "Failed to start: {err}" }
                }
            };
        }
    };

    let state = AppState::new(services.config.page_size);
    use_context_provider(|| state);
    use_context_provider(|| services.clone());

    let AppState {
        mut screen,
        mut table,
        mut delete,
        mut editor,
        mut image_name,
        busy,
        mut status,
        ..
    } = state;

    let auth_for_init = services.auth.clone();
    use_hook(move || {
        spawn(async move {
            match run_blocking(move || auth_for_init.is_authenticated()).await {
                Ok(true) => screen.set(Screen::Products),
                Ok(false) => {}
                Err(err) => status.set(format!("Failed to read session: {err}")),
            }
        })
    });

    let auth_for_logout = services.auth.clone();
    let current_screen = screen();

    rsx! {
        div {
            style: "height: 100vh; display: flex; flex-direction: column; font-family: sans-serif; padding: 12px; box-sizing: border-box;",
            div {
                style: "display: flex; align-items: center; gap: 8px; margin-bottom: 12px;",
                h2 { style: "margin: 0; flex: 1;", "Catalog Admin" }
                if current_screen != Screen::Login {
                    button {
                        disabled: busy(),
                        onclick: move |_| screen.set(Screen::Products),
                        "Products"
                    }
                    button {
                        disabled: busy(),
                        onclick: move |_| {
                            editor.set(ProductEditor::create());
                            image_name.set(None);
                            screen.set(Screen::Create);
                        },
                        "Add product"
                    }
                    button {
                        disabled: busy(),
                        onclick: move |_| {
                            let auth = auth_for_logout.clone();
                            spawn(async move {
                                match run_blocking(move || auth.logout()).await {
                                    Ok(Ok(())) => status.set("Logged out".to_string()),
                                    Ok(Err(err)) => status.set(format!("Logout failed: {err}")),
                                    Err(err) => status.set(format!("Logout failed: {err}")),
                                }
                                table.write().replace_data(Vec::new());
                                delete.write().cancel_delete();
                                screen.set(Screen::Login);
                            });
                        },
                        "Log out"
                    }
                }
            }

            div {
                style: "flex: 1; min-height: 0; display: flex; flex-direction: column;",
                {match current_screen {
                    Screen::Login => rsx! { LoginForm {} },
                    Screen::Products => rsx! { Dashboard {} },
                    Screen::Details(id) => rsx! { ProductDetails { key: "{id}", id } },
                    Screen::Create | Screen::Edit(_) => rsx! { ProductEditorView {} },
                }}
            }

            div {
                style: "margin-top: 8px; padding: 6px 8px; border-top: 1px solid #ddd; color: #555; font-size: 13px;",
                if busy() { "Working... " }
                "{status}"
            }
        }
    }
}

#[component]
fn LoginForm() -> Element {
    let services = use_context::<Services>();
    let AppState {
        mut screen,
        mut username,
        mut password,
        mut login_errors,
        mut busy,
        mut status,
        ..
    } = use_context::<AppState>();

    let errors = login_errors();
    let username_error = errors.get(LoginField::Username).map(str::to_string);
    let password_error = errors.get(LoginField::Password).map(str::to_string);
    let auth = services.auth.clone();

    rsx! {
        div {
            style: "max-width: 360px; margin: 48px auto; display: flex; flex-direction: column; gap: 8px;",
            h3 { style: "margin: 0 0 8px 0;", "Sign in" }
            label { "Username" }
            input {
                value: username(),
                oninput: move |event| username.set(event.value()),
            }
            if let Some(message) = username_error {
                span { style: "color: #d24; font-size: 12px;", "{message}" }
            }
            label { "Password" }
            input {
                r#type: "password",
                value: password(),
                oninput: move |event| password.set(event.value()),
            }
            if let Some(message) = password_error {
                span { style: "color: #d24; font-size: 12px;", "{message}" }
            }
            button {
                disabled: busy(),
                onclick: move |_| {
                    let credentials = Credentials {
                        username: username(),
                        password: password(),
                    };
                    let auth = auth.clone();
                    spawn(async move {
                        *busy.write() = true;
                        match run_blocking(move || auth.login(&credentials)).await {
                            Ok(Ok(())) => {
                                login_errors.set(FieldErrors::new());
                                password.set(String::new());
                                status.set(format!("Signed in as {}", username()));
                                screen.set(Screen::Products);
                            }
                            Ok(Err(AuthError::Validation(errors))) => login_errors.set(errors),
                            Ok(Err(err)) => status.set(err.to_string()),
                            Err(err) => status.set(format!("Login failed: {err}")),
                        }
                        *busy.write() = false;
                    });
                },
                "Log in"
            }
        }
    }
}

#[component]
fn Dashboard() -> Element {
    let services = use_context::<Services>();
    let AppState {
        mut table,
        mut delete,
        mut busy,
        mut status,
        revision,
        ..
    } = use_context::<AppState>();
    let mut open_dropdown = use_signal(|| None::<DropdownId>);
    let dropdown_pos = use_signal(|| None::<(f64, f64)>);
    let mut title_text = use_signal(|| match table.peek().filter(ColumnId::Title) {
        Some(FilterValue::Text(text)) => text.clone(),
        _ => String::new(),
    });
    let mut min_price_text = use_signal(String::new);
    let mut max_price_text = use_signal(String::new);

    let products_for_observe = services.products.clone();
    let _observer = use_hook(move || Rc::new(products_for_observe.observe(QueryKey::Products)));

    let products_for_load = services.products.clone();
    use_effect(move || {
        let _ = revision();
        let products = products_for_load.clone();
        if table.peek().data().is_empty() {
            if let Some(cached) = products.cached_products() {
                table.write().replace_data(cached);
            }
        }
        spawn(async move {
            *busy.write() = true;
            match run_blocking(move || products.list_products()).await {
                Ok(Ok(list)) => {
                    let count = list.len();
                    table.write().replace_data(list);
                    status.set(format!("Loaded {count} product(s)"));
                }
                Ok(Err(err)) => status.set(format!("Failed to load products: {err}")),
                Err(err) => status.set(format!("Failed to load products: {err}")),
            }
            *busy.write() = false;
        });
    });

    let snapshot = table.read();
    let derived = snapshot.derive();
    let visible_columns = snapshot.visible_columns();
    let all_page_selected = snapshot.all_page_rows_selected();
    let has_data = !snapshot.data().is_empty();
    let can_previous = snapshot.can_previous_page();
    let can_next = snapshot.can_next_page();
    let headers: Vec<(ColumnId, &'static str)> = visible_columns
        .iter()
        .map(|column| (*column, SortDirection::indicator(snapshot.sort_direction(*column))))
        .collect();
    let column_toggles: Vec<(ColumnId, bool)> = ColumnId::ALL
        .into_iter()
        .filter(|column| column.hideable())
        .map(|column| (column, snapshot.is_column_visible(column)))
        .collect();
    let category_filter = match snapshot.filter(ColumnId::Category) {
        Some(FilterValue::Select(value)) => value.clone(),
        _ => ALL_OPTION_VALUE.to_string(),
    };
    drop(snapshot);

    let pending_delete = delete.read().pending().cloned();
    let is_deleting = delete.read().is_deleting();
    let selected_count = derived.selected_count;
    let filtered_count = derived.filtered_count;
    let page_label = format!("Page {} of {}", derived.page + 1, derived.page_count);
    let rows = derived.rows;

    let mut apply_price_filter = move || {
        let value = FilterValue::Range {
            min: parse_bound(&min_price_text()),
            max: parse_bound(&max_price_text()),
        };
        if let Err(err) = table.write().set_filter(ColumnId::Price, Some(value)) {
            status.set(err.to_string());
        }
    };

    let products_for_delete = services.products.clone();

    rsx! {
        div {
            style: "flex: 1; min-height: 0; display: flex; flex-direction: column; gap: 8px;",
            onclick: move |_| open_dropdown.set(None),

            div {
                style: "display: flex; flex-wrap: wrap; align-items: center; gap: 8px;",
                input {
                    placeholder: "Filter titles...",
                    value: title_text(),
                    oninput: move |event| {
                        let text = event.value();
                        let value = title_filter_value(&text);
                        title_text.set(text);
                        if let Err(err) = table.write().set_filter(ColumnId::Title, Some(value)) {
                            status.set(err.to_string());
                        }
                    }
                }
                DropdownSelect {
                    id: DropdownId::CategoryFilter,
                    label: "",
                    options: category_options(true),
                    selected: Some(category_filter),
                    open_dropdown,
                    dropdown_pos,
                    on_select: move |value: String| {
                        let result = table
                            .write()
                            .set_filter(ColumnId::Category, Some(FilterValue::Select(value)));
                        if let Err(err) = result {
                            status.set(err.to_string());
                        }
                    }
                }
                input {
                    r#type: "number",
                    style: "width: 90px;",
                    placeholder: "Min price",
                    value: min_price_text(),
                    oninput: move |event| {
                        min_price_text.set(event.value());
                        apply_price_filter();
                    }
                }
                input {
                    r#type: "number",
                    style: "width: 90px;",
                    placeholder: "Max price",
                    value: max_price_text(),
                    oninput: move |event| {
                        max_price_text.set(event.value());
                        apply_price_filter();
                    }
                }
                button {
                    onclick: move |_| {
                        table.write().clear_filters();
                        title_text.set(String::new());
                        min_price_text.set(String::new());
                        max_price_text.set(String::new());
                    },
                    "Reset"
                }
                div { style: "flex: 1;" }
                button {
                    disabled: busy() || selected_count == 0,
                    onclick: move |_| {
                        let selected = table.read().selected_products();
                        if selected.is_empty() {
                            return;
                        }
                        let Some(path) = FileDialog::new()
                            .add_filter("CSV", &["csv"])
                            .set_file_name("products.csv")
                            .save_file()
                        else {
                            return;
                        };
                        spawn(async move {
                            *busy.write() = true;
                            let display_path = path.display().to_string();
                            let result = run_blocking(move || export_products_csv(&path, &selected))
                                .await
                                .and_then(|inner| inner);
                            match result {
                                Ok(count) => {
                                    status.set(format!("Exported {count} product(s) to {display_path}"));
                                }
                                Err(err) => status.set(format!("Export failed: {err:#}")),
                            }
                            *busy.write() = false;
                        });
                    },
                    "Export selected"
                }
                ColumnVisibilityDropdown {
                    id: DropdownId::ColumnVisibility,
                    columns: column_toggles,
                    open_dropdown,
                    dropdown_pos,
                    on_toggle: move |(column, visible): (ColumnId, bool)| {
                        if let Err(err) = table.write().set_column_visible(column, visible) {
                            status.set(err.to_string());
                        }
                    }
                }
            }

            div {
                style: "{table_container_style()}",
                table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                    thead {
                        tr {
                            for (column, indicator) in headers.into_iter() {
                                th {
                                    style: "{table_header_cell_style(column.sortable())}",
                                    onclick: move |event| {
                                        if !column.sortable() {
                                            return;
                                        }
                                        let multi = event.modifiers().shift();
                                        if let Err(err) = table.write().toggle_sort(column, multi) {
                                            status.set(err.to_string());
                                        }
                                    },
                                    if column == ColumnId::Select {
                                        input {
                                            r#type: "checkbox",
                                            checked: all_page_selected,
                                            onclick: move |event| {
                                                event.stop_propagation();
                                                table.write().set_all_selected(!all_page_selected);
                                            }
                                        }
                                    } else {
                                        "{column.header()} {indicator}"
                                    }
                                }
                            }
                        }
                    }
                    tbody {
                        for product in rows.into_iter() {
                            ProductRow {
                                key: "{product.id}",
                                selected: table.read().is_selected(product.id),
                                columns: visible_columns.clone(),
                                product: product.clone(),
                            }
                        }
                    }
                }
                if filtered_count == 0 {
                    div { style: "padding: 16px; text-align: center; color: #777;",
                        if busy() && !has_data { "Loading..." } else { "No results." }
                    }
                }
            }

            div {
                style: "display: flex; align-items: center; gap: 8px;",
                span { style: "flex: 1; color: #555;",
                    "{selected_count} of {filtered_count} row(s) selected."
                }
                span { "{page_label}" }
                button {
                    disabled: !can_previous,
                    onclick: move |_| table.write().previous_page(),
                    "Previous"
                }
                button {
                    disabled: !can_next,
                    onclick: move |_| table.write().next_page(),
                    "Next"
                }
            }
        }

        if let Some(target) = pending_delete {
            div {
                style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1100;",
                div {
                    style: "background: #fff; padding: 16px; border: 1px solid #999; min-width: 320px; border-radius: 8px;",
                    div { style: "margin-bottom: 8px; font-weight: 600;", "Delete product?" }
                    p { "\"{target.title}\" will be permanently deleted." }
                    div { style: "display: flex; gap: 8px; justify-content: flex-end;",
                        button {
                            disabled: is_deleting,
                            onclick: move |_| {
                                delete.write().cancel_delete();
                            },
                            "Cancel"
                        }
                        button {
                            style: "background: #d24; color: #fff; border: none; padding: 4px 12px; border-radius: 4px;",
                            disabled: is_deleting,
                            onclick: move |_| {
                                let Some(target) = delete.write().confirm_delete() else {
                                    return;
                                };
                                let products = products_for_delete.clone();
                                let mut revision = revision;
                                spawn(async move {
                                    *busy.write() = true;
                                    let id = target.id;
                                    let result = run_blocking(move || products.delete_product(id)).await;
                                    delete.write().finish();
                                    match result {
                                        Ok(Ok(outcome)) => {
                                            status.set(format!("Deleted \"{}\"", target.title));
                                            if !outcome.refetch.is_empty() {
                                                *revision.write() += 1;
                                            }
                                        }
                                        Ok(Err(err)) => status.set(format!("Delete failed: {err}")),
                                        Err(err) => status.set(format!("Delete failed: {err}")),
                                    }
                                    *busy.write() = false;
                                });
                            },
                            "Delete"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ProductRow(product: Product, columns: Vec<ColumnId>, selected: bool) -> Element {
    let AppState {
        mut screen,
        mut table,
        mut delete,
        mut editor,
        mut image_name,
        busy,
        ..
    } = use_context::<AppState>();
    let id = product.id;
    let row_style = if selected { "background: #eef4ff;" } else { "" };
    let cell_style = "border: 1px solid #bbb; padding: 4px 6px;";

    rsx! {
        tr {
            style: "{row_style}",
            for column in columns.into_iter() {
                {match column {
                    ColumnId::Select => rsx! {
                        td { style: "{cell_style} text-align: center;",
                            input {
                                r#type: "checkbox",
                                checked: selected,
                                onclick: move |_| table.write().set_selected(id, !selected),
                            }
                        }
                    },
                    ColumnId::Image => rsx! {
                        td { style: "{cell_style}",
                            img {
                                src: "{product.image}",
                                alt: "{product.title}",
                                style: "width: 40px; height: 40px; object-fit: contain;",
                            }
                        }
                    },
                    ColumnId::Title => rsx! {
                        td { style: "{cell_style}", "{product.title}" }
                    },
                    ColumnId::Category => rsx! {
                        td { style: "{cell_style}",
                            span { style: "{category_badge_style()}", "{product.category.label()}" }
                        }
                    },
                    ColumnId::Price => rsx! {
                        td { style: "{cell_style} text-align: right;", "{format_price(product.price)}" }
                    },
                    ColumnId::Actions => {
                        let for_delete = product.clone();
                        rsx! {
                            td { style: "{cell_style} white-space: nowrap;",
                                button {
                                    onclick: move |_| screen.set(Screen::Details(id)),
                                    "View"
                                }
                                button {
                                    disabled: busy(),
                                    onclick: move |_| {
                                        editor.set(ProductEditor::edit(id));
                                        image_name.set(None);
                                        screen.set(Screen::Edit(id));
                                    },
                                    "Edit"
                                }
                                button {
                                    disabled: busy(),
                                    onclick: move |_| delete.write().request_delete(for_delete.clone()),
                                    "Delete"
                                }
                            }
                        }
                    }
                }}
            }
        }
    }
}

#[component]
fn ProductDetails(id: ProductId) -> Element {
    let services = use_context::<Services>();
    let AppState {
        mut screen,
        mut detail,
        mut editor,
        mut image_name,
        mut status,
        revision,
        ..
    } = use_context::<AppState>();

    let products_for_observe = services.products.clone();
    let _observer =
        use_hook(move || Rc::new(products_for_observe.observe(QueryKey::Product(id))));

    let products_for_load = services.products.clone();
    use_effect(move || {
        let _ = revision();
        let products = products_for_load.clone();
        detail.set(products.cached_product(id));
        spawn(async move {
            match run_blocking(move || products.get_product(id)).await {
                Ok(Ok(product)) => detail.set(Some(product)),
                Ok(Err(err)) if err.is_not_found() => {
                    detail.set(None);
                    status.set(format!("Product #{id} was not found"));
                }
                Ok(Err(err)) => status.set(err.to_string()),
                Err(err) => status.set(format!("Failed to load product #{id}: {err}")),
            }
        });
    });

    let current = detail().filter(|product| product.id == id);

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px; overflow: auto;",
            div {
                button { onclick: move |_| screen.set(Screen::Products), "Back to products" }
            }
            {match current {
                None => rsx! { p { "Loading..." } },
                Some(product) => {
                    let for_edit = product.clone();
                    rsx! {
                        div {
                            style: "display: flex; gap: 24px; align-items: flex-start;",
                            img {
                                src: "{product.image}",
                                alt: "{product.title}",
                                style: "width: 240px; max-height: 320px; object-fit: contain; border: 1px solid #ddd; border-radius: 8px; padding: 8px;",
                            }
                            div {
                                style: "display: flex; flex-direction: column; gap: 8px; max-width: 560px;",
                                span { style: "{category_badge_style()}", "{product.category.label()}" }
                                h3 { style: "margin: 0;", "{product.title}" }
                                div { style: "font-size: 20px; font-weight: 600;", "{format_price(product.price)}" }
                                p { style: "color: #444; line-height: 1.5;", "{product.description}" }
                                div {
                                    button {
                                        onclick: move |_| {
                                            editor.set(ProductEditor::for_product(&for_edit));
                                            image_name.set(None);
                                            screen.set(Screen::Edit(id));
                                        },
                                        "Edit"
                                    }
                                }
                            }
                        }
                    }
                }
            }}
        }
    }
}

#[component]
fn ProductEditorView() -> Element {
    let services = use_context::<Services>();
    let AppState {
        mut screen,
        mut editor,
        mut image_name,
        mut busy,
        mut status,
        mut revision,
        ..
    } = use_context::<AppState>();
    let open_dropdown = use_signal(|| None::<DropdownId>);
    let dropdown_pos = use_signal(|| None::<(f64, f64)>);
    let mode = editor.read().mode();
    let mut loading = use_signal(|| {
        matches!(mode, EditorMode::Edit(_)) && editor.peek().form().title.is_empty()
    });

    let products_for_load = services.products.clone();
    use_hook(move || {
        let EditorMode::Edit(id) = mode else {
            return;
        };
        if !*loading.peek() {
            return;
        }
        spawn(async move {
            match run_blocking(move || products_for_load.get_product(id)).await {
                Ok(Ok(product)) => editor.write().load(&product),
                Ok(Err(err)) => status.set(err.to_string()),
                Err(err) => status.set(format!("Failed to load product #{id}: {err}")),
            }
            loading.set(false);
        });
    });

    let snapshot = editor.read().clone();
    let form = snapshot.form().clone();
    let submitting = snapshot.is_submitting();
    let field_error = |field: ProductField| snapshot.error(field).map(str::to_string);
    let title_error = field_error(ProductField::Title);
    let description_error = field_error(ProductField::Description);
    let price_error = field_error(ProductField::Price);
    let category_error = field_error(ProductField::Category);
    let image_error = field_error(ProductField::Image);
    let heading = match mode {
        EditorMode::Create => "Add product".to_string(),
        EditorMode::Edit(id) => format!("Edit product #{id}"),
    };
    let submit_label = match mode {
        EditorMode::Create => "Create product",
        EditorMode::Edit(_) => "Save changes",
    };
    let selected_category = (!form.category.is_empty()).then(|| form.category.clone());
    let max_image_bytes = services.config.image_max_bytes;
    let products_for_submit = services.products.clone();
    let error_style = "color: #d24; font-size: 12px;";

    if loading() {
        return rsx! { p { "Loading..." } };
    }

    rsx! {
        div {
            style: "max-width: 560px; display: flex; flex-direction: column; gap: 6px; overflow: auto;",
            h3 { style: "margin: 0 0 8px 0;", "{heading}" }

            label { "Title" }
            input {
                value: "{form.title}",
                oninput: move |event| editor.write().set_field(ProductField::Title, event.value()),
            }
            if let Some(message) = title_error {
                span { style: "{error_style}", "{message}" }
            }

            label { "Description" }
            textarea {
                rows: "4",
                value: "{form.description}",
                oninput: move |event| editor.write().set_field(ProductField::Description, event.value()),
            }
            if let Some(message) = description_error {
                span { style: "{error_style}", "{message}" }
            }

            label { "Price" }
            input {
                r#type: "number",
                step: "0.01",
                value: "{form.price}",
                oninput: move |event| editor.write().set_field(ProductField::Price, event.value()),
            }
            if let Some(message) = price_error {
                span { style: "{error_style}", "{message}" }
            }

            DropdownSelect {
                id: DropdownId::EditorCategory,
                label: "Category",
                options: category_options(false),
                selected: selected_category,
                open_dropdown,
                dropdown_pos,
                on_select: move |value: String| editor.write().set_field(ProductField::Category, value),
            }
            if let Some(message) = category_error {
                span { style: "{error_style}", "{message}" }
            }

            label { "Image" }
            div { style: "display: flex; align-items: center; gap: 8px;",
                button {
                    disabled: submitting,
                    onclick: move |_| {
                        let Some(path) = FileDialog::new()
                            .add_filter("Images", &ACCEPTED_EXTENSIONS)
                            .pick_file()
                        else {
                            return;
                        };
                        spawn(async move {
                            match run_blocking(move || load_image_preview(&path, max_image_bytes)).await {
                                Ok(Ok(preview)) => {
                                    editor.write().set_field(ProductField::Image, preview.data_url);
                                    image_name.set(Some(preview.file_name));
                                }
                                Ok(Err(err)) => status.set(err.to_string()),
                                Err(err) => status.set(format!("Failed to read image: {err}")),
                            }
                        });
                    },
                    "Choose image"
                }
                span { style: "color: #555;", "SVG, PNG, JPG or GIF (max 2MB)" }
            }
            if !form.image.is_empty() {
                div { style: "display: flex; align-items: center; gap: 8px;",
                    img {
                        src: "{form.image}",
                        style: "max-width: 160px; max-height: 160px; object-fit: contain; border: 1px solid #ddd;",
                    }
                    if let Some(name) = image_name() {
                        span { "{name}" }
                    }
                    button {
                        disabled: submitting,
                        onclick: move |_| {
                            editor.write().set_field(ProductField::Image, String::new());
                            image_name.set(None);
                        },
                        "Remove"
                    }
                }
            }
            if let Some(message) = image_error {
                span { style: "{error_style}", "{message}" }
            }

            div { style: "display: flex; gap: 8px; margin-top: 12px;",
                button {
                    disabled: submitting || busy(),
                    onclick: move |_| {
                        let request = match editor.write().begin_submit() {
                            Ok(request) => request,
                            Err(MutationError::Validation(errors)) => {
                                status.set(format!("Please fix {} field(s)", errors.len()));
                                return;
                            }
                            Err(err) => {
                                status.set(err.to_string());
                                return;
                            }
                        };
                        let products = products_for_submit.clone();
                        spawn(async move {
                            *busy.write() = true;
                            let result = run_blocking(move || products.submit(&request))
                                .await
                                .unwrap_or_else(|err| Err(ApiError::Transport(err.to_string())));
                            editor.write().finish(&result);
                            match result {
                                Ok(outcome) => {
                                    let message = match mode {
                                        EditorMode::Create => "Product created",
                                        EditorMode::Edit(_) => "Product updated",
                                    };
                                    status.set(message.to_string());
                                    if !outcome.refetch.is_empty() {
                                        *revision.write() += 1;
                                    }
                                    screen.set(Screen::Products);
                                }
                                Err(err) => status.set(format!("Failed to save product: {err}")),
                            }
                            *busy.write() = false;
                        });
                    },
                    if submitting { "Saving..." } else { "{submit_label}" }
                }
                button {
                    disabled: submitting,
                    onclick: move |_| screen.set(Screen::Products),
                    "Cancel"
                }
            }
        }
    }
}
