//! Cleanup rules turning pt-BR storefront text into plain scalar values.
//!
//! Every rule passes [`NOT_FOUND`] through untouched.

use chrono::NaiveDate;
use tracing::warn;

use crate::parser::NOT_FOUND;

const RATING_SUFFIX: &str = " de 5 estrelas";
const REVIEW_SUFFIXES: [&str; 3] = [
    " avaliações de clientes",
    " avaliação de cliente",
    " avaliações",
];
const CURRENCY: &str = "R$";
const PAGES_SUFFIX: &str = " páginas";

const MONTHS: [(&str, &str); 12] = [
    ("janeiro", "jan"),
    ("fevereiro", "feb"),
    ("março", "mar"),
    ("abril", "apr"),
    ("maio", "may"),
    ("junho", "jun"),
    ("julho", "jul"),
    ("agosto", "aug"),
    ("setembro", "sep"),
    ("outubro", "oct"),
    ("novembro", "nov"),
    ("dezembro", "dec"),
];

fn is_sentinel(raw: &str) -> bool {
    raw == NOT_FOUND
}

/// `"4,5 de 5 estrelas"` → `"4.5"`
pub fn rating(raw: &str) -> String {
    if is_sentinel(raw) {
        return raw.to_string();
    }
    raw.replace(RATING_SUFFIX, "").replace(',', ".").trim().to_string()
}

/// `"2.345 avaliações de clientes"` → `"2345"`
pub fn review_count(raw: &str) -> String {
    if is_sentinel(raw) {
        return raw.to_string();
    }
    let stripped = REVIEW_SUFFIXES
        .iter()
        .find_map(|suffix| raw.strip_suffix(*suffix))
        .unwrap_or(raw);
    stripped.replace('.', "").trim().to_string()
}

/// `"R$ 1.234,56"` → `"1234.56"`
pub fn price(raw: &str) -> String {
    if is_sentinel(raw) {
        return raw.to_string();
    }
    raw.replace(CURRENCY, "")
        .replace('.', "")
        .replace(',', ".")
        .trim()
        .to_string()
}

/// `"320 páginas"` → `"320"`
pub fn page_count(raw: &str) -> String {
    if is_sentinel(raw) {
        return raw.to_string();
    }
    raw.replace(PAGES_SUFFIX, "").trim().to_string()
}

/// Split the `Editora` bullet on `;` into (publisher, publication info).
///
/// Parts are kept verbatim, including surrounding spaces. Without a `;` the
/// publisher runs up to the parenthesized date, which then is the
/// publication info. A missing part is [`NOT_FOUND`].
pub fn split_publisher(raw: &str) -> (String, String) {
    if is_sentinel(raw) {
        return (NOT_FOUND.to_string(), NOT_FOUND.to_string());
    }
    if let Some((publisher, publication)) = raw.split_once(';') {
        let publication = publication.split(';').next().unwrap_or(publication);
        return (publisher.to_string(), publication.to_string());
    }
    match raw.find('(') {
        Some(at) => (raw[..at].to_string(), raw[at..].to_string()),
        None => (raw.to_string(), NOT_FOUND.to_string()),
    }
}

pub fn publisher(raw: &str) -> String {
    split_publisher(raw).0
}

pub fn publication(raw: &str) -> String {
    split_publisher(raw).1
}

/// ISO date of the `Editora` bullet's parenthesized date, or [`NOT_FOUND`].
pub fn last_update(raw: &str) -> String {
    let publication = publication(raw);
    if is_sentinel(&publication) {
        return publication;
    }
    match parse_parenthesized_date(&publication) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => {
            warn!("could not derive a date from {:?}", publication);
            NOT_FOUND.to_string()
        }
    }
}

/// `"1ª edição (15 março 2020)"` → 2020-03-15
pub fn parse_parenthesized_date(publication: &str) -> Option<NaiveDate> {
    let (_, inner) = publication.split_once('(')?;
    let inner = inner.split(')').next().unwrap_or(inner);

    let mut text = inner.to_lowercase().replace(" de ", " ");
    for (pt, en) in MONTHS {
        text = text.replace(pt, en);
    }

    NaiveDate::parse_from_str(text.trim(), "%d %b %Y").ok()
}
