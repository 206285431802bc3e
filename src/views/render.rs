use num_format::{Locale, ToFormattedString};

use crate::{
    model::person::PersonRecord,
    persons::{
        editor::{Field, PersonForm, ValidationFailure},
        pagination::PageState,
    },
};

const EMPTY_CELL: &str = "-";

fn cell(value: &str) -> String {
    match value.trim() {
        "" => EMPTY_CELL.to_string(),
        value => value.to_string(),
    }
}

fn row<R: PersonRecord>(record: &R, with_address: bool) -> Vec<String> {
    let mut cells = vec![
        cell(&record.person_id().map(|id| id.to_string()).unwrap_or_default()),
        cell(record.name()),
        cell(record.cpf()),
        cell(record.email()),
        cell(record.gender().map(|g| g.label()).unwrap_or_default()),
        cell(record.date_of_birth()),
        cell(record.nationality()),
        cell(record.naturalness()),
    ];

    if with_address {
        cells.push(cell(
            &record.address().map(|a| a.format()).unwrap_or_default(),
        ));
    }

    cells
}

/// Plain text table of one page, columns padded to their widest cell
pub fn render_table<R: PersonRecord>(persons: &[R]) -> String {
    if persons.is_empty() {
        return "No persons found".to_string();
    }

    let with_address = persons.iter().any(|p| p.address().is_some());

    let mut header: Vec<String> = [
        "Id",
        "Name",
        "CPF",
        "Email",
        "Gender",
        "Date of birth",
        "Nationality",
        "Naturalness",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    if with_address {
        header.push("Address".to_string());
    }

    let rows: Vec<Vec<String>> = std::iter::once(header)
        .chain(persons.iter().map(|p| row(p, with_address)))
        .collect();

    let widths: Vec<usize> = (0..rows[0].len())
        .map(|column| {
            rows.iter()
                .map(|r| r[column].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|r| {
            r.iter()
                .zip(&widths)
                .map(|(value, width)| format!("{:<width$}", value, width = width))
                .collect::<Vec<String>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// "Showing X to Y of Z" plus the page window, the current page bracketed and disabled arrows hidden
pub fn render_footer<R>(state: &PageState<R>) -> String {
    let (first, last, total) = state.showing_range();

    let mut controls: Vec<String> = vec![];

    if state.has_previous() {
        controls.push("<".to_string());
    }

    for page in state.page_window() {
        if page == state.current_page.to_number() {
            controls.push(format!("[{}]", page));
        } else {
            controls.push(page.to_string());
        }
    }

    if state.has_next() {
        controls.push(">".to_string());
    }

    let mut footer = format!(
        "Showing {} to {} of {}",
        first.to_formatted_string(&Locale::en),
        last.to_formatted_string(&Locale::en),
        total.to_formatted_string(&Locale::en)
    );

    if !controls.is_empty() {
        footer.push_str("   ");
        footer.push_str(&controls.join(" "));
    }

    if state.is_loading {
        footer.push_str("   (loading)");
    }

    footer
}

pub fn render_form(form: &PersonForm, fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| format!("{:<12} {}", field.to_string(), cell(&form.get(*field))))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn render_form_errors(failure: &ValidationFailure) -> Vec<String> {
    failure
        .0
        .iter()
        .map(|(field, error)| format!("{}: {}", field, error))
        .collect()
}
