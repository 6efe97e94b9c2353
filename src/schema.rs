//! Extraction profiles: which selectors feed which column, and how each raw
//! value is cleaned up.

use crate::models::columns;
use crate::normalize;
use crate::page::{Continuation, PageHandle};
use crate::parser::{self, NOT_FOUND};

/// Number of bullet positions inspected when looking for a label.
pub const LABEL_SCAN_WINDOW: usize = 10;

pub enum Lookup {
    /// Candidate selectors, primary first.
    Selectors(&'static [&'static str]),
    /// Value next to the bullet whose label contains this text.
    Labeled(&'static str),
}

pub struct FieldSpec {
    pub name: &'static str,
    pub lookup: Lookup,
    pub normalize: fn(&str) -> String,
}

impl FieldSpec {
    const fn new(name: &'static str, lookup: Lookup, normalize: fn(&str) -> String) -> Self {
        Self {
            name,
            lookup,
            normalize,
        }
    }
}

/// Wishlist-root profile.
pub struct LinkSpec {
    /// Must become queryable before links are read.
    pub container: &'static str,
    pub item_link: &'static str,
    /// Marker the wishlist uses to lazy-load further items on scroll.
    pub more: Continuation,
}

/// A bullet list whose entries carry a bold label and a value span.
pub struct LabeledList {
    pub item: &'static str,
    pub label: &'static str,
    pub value: &'static str,
    pub window: usize,
}

impl LabeledList {
    fn selector(&self, position: usize, part: &str) -> String {
        // nth-child is 1-based
        format!("{}:nth-child({}) > {}", self.item, position + 1, part)
    }

    pub fn label_selector(&self, position: usize) -> String {
        self.selector(position, self.label)
    }

    pub fn value_selector(&self, position: usize) -> String {
        self.selector(position, self.value)
    }
}

pub struct Schema {
    pub links: LinkSpec,
    pub details: LabeledList,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// Profile for amazon.com.br wishlists and book detail pages.
    pub fn amazon_br() -> Self {
        use Lookup::*;

        Self {
            links: LinkSpec {
                container: "#g-items li.g-item-sortable div.a-col-right div.a-row h2 a",
                item_link: "#g-items li.g-item-sortable div.a-col-right div.a-row h2 a",
                more: Continuation {
                    marker: r#"input[name="showMoreUrl"]"#,
                    attr: "value",
                    container_id: "g-items",
                },
            },
            details: LabeledList {
                item: "#detailBullets_feature_div > ul > li",
                label: "span > span.a-text-bold",
                value: "span > span:nth-child(2)",
                window: LABEL_SCAN_WINDOW,
            },
            fields: vec![
                FieldSpec::new(columns::TITLE, Selectors(&["#productTitle"]), keep),
                FieldSpec::new(columns::SUBTITLE, Selectors(&["#productSubtitle"]), keep),
                FieldSpec::new(
                    columns::AUTHOR,
                    Selectors(&[
                        "#bylineInfo > span.author.notFaded > span.a-declarative > a.a-link-normal.contributorNameID",
                        "#bylineInfo > span.author.notFaded",
                    ]),
                    keep,
                ),
                FieldSpec::new(
                    columns::STARS,
                    Selectors(&["#acrPopover > span.a-declarative > a > i.a-icon.a-icon-star > span"]),
                    normalize::rating,
                ),
                FieldSpec::new(
                    columns::EVALUATIONS,
                    Selectors(&["#acrCustomerReviewText"]),
                    normalize::review_count,
                ),
                FieldSpec::new(
                    columns::PRICE,
                    Selectors(&["#kindle-price", "#price"]),
                    normalize::price,
                ),
                FieldSpec::new(
                    columns::PAGES,
                    Labeled("Número de páginas"),
                    normalize::page_count,
                ),
                FieldSpec::new(columns::PUBLICATION, Labeled("Editora"), normalize::publication),
                FieldSpec::new(columns::PUBLISHER, Labeled("Editora"), normalize::publisher),
                FieldSpec::new(columns::LAST_UPDATE, Labeled("Editora"), normalize::last_update),
            ],
        }
    }
}

fn keep(raw: &str) -> String {
    raw.to_string()
}

/// Scan the first `list.window` positions for a label containing `label`
/// and return the normalized value beside it.
pub fn find_labeled_value<P: PageHandle>(page: &P, list: &LabeledList, label: &str) -> Option<String> {
    (0..list.window)
        .find(|&i| parser::extract_text(page, &list.label_selector(i)).contains(label))
        .map(|i| parser::extract_text(page, &list.value_selector(i)))
        .filter(|value| value != NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HtmlPage;

    fn bullets(items: &[(&str, &str)]) -> String {
        let lis: String = items
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<li><span><span class="a-text-bold">{label}</span><span>{value}</span></span></li>"#
                )
            })
            .collect();
        format!(r#"<div id="detailBullets_feature_div"><ul>{lis}</ul></div>"#)
    }

    #[test]
    fn finds_label_at_any_position_in_window() {
        let html = bullets(&[
            ("ASIN ‏ : ‎", "B000"),
            ("Editora ‏ : ‎", "Intrínseca; 1ª edição (2 maio 2018)"),
            ("Idioma ‏ : ‎", "Português"),
            ("Número de páginas ‏ : ‎", "320 páginas"),
        ]);
        let page = HtmlPage::from_html(&html);
        let list = Schema::amazon_br().details;

        assert_eq!(
            find_labeled_value(&page, &list, "Número de páginas").as_deref(),
            Some("320 páginas")
        );
        assert_eq!(
            find_labeled_value(&page, &list, "Editora").as_deref(),
            Some("Intrínseca; 1ª edição (2 maio 2018)")
        );
        assert_eq!(find_labeled_value(&page, &list, "Dimensões"), None);
    }

    #[test]
    fn label_beyond_window_is_absent() {
        let mut items = vec![("Filler", "x"); LABEL_SCAN_WINDOW];
        items.push(("Editora", "Too far"));
        let page = HtmlPage::from_html(&bullets(&items));
        let list = Schema::amazon_br().details;

        assert_eq!(find_labeled_value(&page, &list, "Editora"), None);
    }

    #[test]
    fn last_position_inside_window_is_scanned() {
        let mut items = vec![("Filler", "x"); LABEL_SCAN_WINDOW - 1];
        items.push(("Editora", "Just in"));
        let page = HtmlPage::from_html(&bullets(&items));
        let list = Schema::amazon_br().details;

        assert_eq!(find_labeled_value(&page, &list, "Editora").as_deref(), Some("Just in"));
    }

    #[test]
    fn detail_schema_covers_every_record_column_in_order() {
        let names: Vec<&str> = Schema::amazon_br().fields.iter().map(|f| f.name).collect();
        let expected = &crate::models::COLUMNS[..crate::models::FIELD_COUNT - 1];
        assert_eq!(names, expected);
    }
}
