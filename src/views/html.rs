//! Built-in HTML renderer.
//!
//! Renders every view inside one layout: navigation, a heading from
//! `data.title`, the view data laid out structurally, plus the input form for
//! `*_form` views and the confirmation button for `*_delete` views. Markup is
//! built with maud, which escapes every interpolated string.

use maud::{html, Markup, DOCTYPE};
use serde_json::{Map, Value};

use super::Renderer;
use crate::error::AppResult;

const NAV: &[(&str, &str)] = &[
    ("/catalog", "Home"),
    ("/catalog/books", "All books"),
    ("/catalog/authors", "All authors"),
    ("/catalog/genres", "All genres"),
    ("/catalog/bookinstances", "All book-instances"),
    ("/catalog/author/create", "Create new author"),
    ("/catalog/genre/create", "Create new genre"),
    ("/catalog/book/create", "Create new book"),
    ("/catalog/bookinstance/create", "Create new book instance (copy)"),
];

/// Keys that are layout, not content
const HIDDEN_KEYS: &[&str] = &["title", "errors", "id", "url", "checked"];

enum Input {
    Text(&'static str, &'static str),
    TextArea(&'static str, &'static str),
    Date(&'static str, &'static str),
    /// name, label, options key, option text key, selected-id key
    Select(&'static str, &'static str, &'static str, &'static str, &'static str),
    /// name, label, options key, option text key
    Checkboxes(&'static str, &'static str, &'static str, &'static str),
    /// name, label, key of a list of plain strings
    Choice(&'static str, &'static str, &'static str),
}

/// Form inputs per view, and the data key holding previously entered values
const FORMS: &[(&str, &str, &[Input])] = &[
    (
        "book_form",
        "book",
        &[
            Input::Text("title", "Title"),
            Input::Select("author", "Author", "authors", "name", "selected_author"),
            Input::TextArea("summary", "Summary"),
            Input::Text("isbn", "ISBN"),
            Input::Checkboxes("genre", "Genre", "genres", "name"),
        ],
    ),
    (
        "author_form",
        "author",
        &[
            Input::Text("first_name", "First Name"),
            Input::Text("family_name", "Family Name"),
            Input::Date("date_of_birth", "Date of birth"),
            Input::Date("date_of_death", "Date of death"),
        ],
    ),
    ("genre_form", "genre", &[Input::Text("name", "Genre")]),
    (
        "bookinstance_form",
        "bookinstance",
        &[
            Input::Select("book", "Book", "book_list", "title", "selected_book"),
            Input::Text("imprint", "Imprint"),
            Input::Date("due_back", "Date when book available"),
            Input::Choice("status", "Status", "statuses"),
        ],
    ),
];

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    site_name: String,
}

impl HtmlRenderer {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field(value: &Value, key: &str) -> String {
    text(value.get(key).unwrap_or(&Value::Null))
}

/// Link text for an object carrying a `url`
fn link_text(map: &Map<String, Value>) -> String {
    ["title", "name", "imprint"]
        .iter()
        .find_map(|key| map.get(*key).map(text).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| text(map.get("url").unwrap_or(&Value::Null)))
}

fn choices<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn render_value(value: &Value) -> Markup {
    match value {
        Value::Object(map) => {
            let fields: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(key, _)| !HIDDEN_KEYS.contains(&key.as_str()))
                .collect();
            html! {
                @if let Some(url) = map.get("url") {
                    a href=(text(url)) { (link_text(map)) }
                }
                @if !fields.is_empty() {
                    dl {
                        @for (key, value) in &fields {
                            dt { (key.replace('_', " ")) }
                            dd { (render_value(value)) }
                        }
                    }
                }
            }
        }
        Value::Array(items) if items.is_empty() => html! { p { "None" } },
        Value::Array(items) => html! {
            ul {
                @for item in items {
                    li { (render_value(item)) }
                }
            }
        },
        other => html! { (text(other)) },
    }
}

/// Id of the preselected option: the explicit `selected_*` key, else the
/// submitted value.
fn selected(values: &Value, data: &Value, name: &str, selected_key: &str) -> String {
    match data.get(selected_key) {
        Some(value) if !value.is_null() => text(value),
        _ => field(values, name),
    }
}

fn render_input(input: &Input, values: &Value, data: &Value) -> Markup {
    match *input {
        Input::Text(name, label) => html! {
            label for=(name) { (label) ":" }
            input id=(name) name=(name) type="text" value=(field(values, name));
        },
        Input::TextArea(name, label) => html! {
            label for=(name) { (label) ":" }
            textarea id=(name) name=(name) { (field(values, name)) }
        },
        Input::Date(name, label) => html! {
            label for=(name) { (label) ":" }
            input id=(name) name=(name) type="date" value=(field(values, name));
        },
        Input::Select(name, label, options, option_text, selected_key) => {
            let current = selected(values, data, name, selected_key);
            html! {
                label for=(name) { (label) ":" }
                select id=(name) name=(name) {
                    @for choice in choices(data, options) {
                        @let id = field(choice, "id");
                        option value=(id) selected[id == current] { (field(choice, option_text)) }
                    }
                }
            }
        }
        Input::Checkboxes(name, label, options, option_text) => html! {
            label { (label) ":" }
            @for choice in choices(data, options) {
                @let id = field(choice, "id");
                input type="checkbox" name=(name) id=(id) value=(id)
                    checked[choice.get("checked") == Some(&Value::Bool(true))];
                label for=(id) { (field(choice, option_text)) }
            }
        },
        Input::Choice(name, label, options) => {
            let current = field(values, name);
            html! {
                label for=(name) { (label) ":" }
                select id=(name) name=(name) {
                    @for choice in choices(data, options) {
                        @let choice = text(choice);
                        option value=(choice) selected[choice == current] { (choice) }
                    }
                }
            }
        }
    }
}

fn render_form(data: &Value, values_key: &str, inputs: &[Input]) -> Markup {
    let values = data.get(values_key).unwrap_or(&Value::Null);
    html! {
        form method="post" {
            @for input in inputs {
                div.form-group { (render_input(input, values, data)) }
            }
            button type="submit" { "Submit" }
        }
    }
}

fn render_errors(data: &Value) -> Markup {
    html! {
        @if let Some(errors) = data.get("errors").and_then(Value::as_array).filter(|e| !e.is_empty()) {
            ul.errors {
                @for error in errors {
                    li { (field(error, "message")) }
                }
            }
        }
    }
}

fn delete_confirmation() -> Markup {
    html! {
        form method="post" {
            p { "Do you really want to delete this?" }
            button type="submit" { "Delete" }
        }
    }
}

fn render_content(view: &str, data: &Value) -> Markup {
    match FORMS.iter().find(|(name, _, _)| *name == view) {
        Some((_, values_key, inputs)) => render_form(data, values_key, inputs),
        None => html! {
            (render_value(data))
            @if view.ends_with("_delete") {
                (delete_confirmation())
            }
        },
    }
}

fn layout(title: &str, view: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body {
                nav {
                    ul {
                        @for (href, label) in NAV {
                            li { a href=(href) { (label) } }
                        }
                    }
                }
                main data-view=(view) {
                    h1 { (title) }
                    (content)
                }
            }
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, view: &str, data: &Value) -> AppResult<String> {
        let title = data.get("title").map(text).unwrap_or_else(|| self.site_name.clone());
        let content = html! {
            (render_errors(data))
            (render_content(view, data))
        };
        Ok(layout(&title, view, content).into_string())
    }
}
