use serde::Serialize;

use crate::parser::NOT_FOUND;

pub mod columns {
    pub const TITLE: &str = "title";
    pub const SUBTITLE: &str = "subtitle";
    pub const AUTHOR: &str = "author";
    pub const STARS: &str = "stars";
    pub const EVALUATIONS: &str = "evaluations";
    pub const PRICE: &str = "price";
    pub const PAGES: &str = "pages";
    pub const PUBLICATION: &str = "publication";
    pub const PUBLISHER: &str = "publisher";
    pub const LAST_UPDATE: &str = "lastUpdate";
    pub const LINK: &str = "link";
}

/// Output column order.
pub const COLUMNS: [&str; FIELD_COUNT] = [
    columns::TITLE,
    columns::SUBTITLE,
    columns::AUTHOR,
    columns::STARS,
    columns::EVALUATIONS,
    columns::PRICE,
    columns::PAGES,
    columns::PUBLICATION,
    columns::PUBLISHER,
    columns::LAST_UPDATE,
    columns::LINK,
];

pub const FIELD_COUNT: usize = 11;

pub const DELIMITER: &str = ";";

/// Absolute product URLs, in wishlist order.
pub type LinkSet = Vec<String>;

/// First line of every output file.
pub const HEADER: &str =
    "title,subtitle,author,stars,evaluations,price,pages,publication,publisher,lastUpdate,link";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub stars: String,
    pub evaluations: String,
    pub price: String,
    pub pages: String,
    pub publication: String,
    pub publisher: String,
    pub last_update: String,
    pub link: String,
}

impl ProductRecord {
    /// Assemble a record from named values. Any column without a value is
    /// filled with [`NOT_FOUND`].
    pub fn from_fields(fields: &[(&str, String)], link: &str) -> Self {
        let get = |name: &str| {
            fields
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| NOT_FOUND.to_string())
        };

        Self {
            title: get(columns::TITLE),
            subtitle: get(columns::SUBTITLE),
            author: get(columns::AUTHOR),
            stars: get(columns::STARS),
            evaluations: get(columns::EVALUATIONS),
            price: get(columns::PRICE),
            pages: get(columns::PAGES),
            publication: get(columns::PUBLICATION),
            publisher: get(columns::PUBLISHER),
            last_update: get(columns::LAST_UPDATE),
            link: link.to_string(),
        }
    }

    pub fn values(&self) -> [&str; FIELD_COUNT] {
        [
            &self.title,
            &self.subtitle,
            &self.author,
            &self.stars,
            &self.evaluations,
            &self.price,
            &self.pages,
            &self.publication,
            &self.publisher,
            &self.last_update,
            &self.link,
        ]
    }

    /// One `;`-joined, newline-terminated output line. Delimiters and line
    /// breaks inside values are replaced so the column count never changes.
    pub fn to_row(&self) -> String {
        let cells: Vec<String> = self
            .values()
            .iter()
            .map(|v| v.replace(DELIMITER, ",").replace(['\r', '\n'], " "))
            .collect();
        let mut row = cells.join(DELIMITER);
        row.push('\n');
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lists_columns_in_order() {
        assert_eq!(HEADER, COLUMNS.join(","));
    }

    #[test]
    fn missing_fields_become_sentinel_without_shifting() {
        let record = ProductRecord::from_fields(
            &[(columns::TITLE, "Duna".into()), (columns::PRICE, "45.90".into())],
            "https://www.amazon.com.br/dp/1",
        );
        let row = record.to_row();
        let cols: Vec<&str> = row.trim_end_matches('\n').split(DELIMITER).collect();

        assert_eq!(cols.len(), FIELD_COUNT);
        assert_eq!(cols[0], "Duna");
        assert_eq!(cols[1], NOT_FOUND);
        assert_eq!(cols[5], "45.90");
        assert_eq!(cols[FIELD_COUNT - 1], "https://www.amazon.com.br/dp/1");
        assert!(row.ends_with('\n') && !row.ends_with("\n\n"));
    }

    #[test]
    fn delimiter_inside_value_keeps_column_count() {
        let record = ProductRecord::from_fields(&[(columns::TITLE, "A; B\nC".into())], "l");
        let row = record.to_row();
        assert_eq!(row.matches(DELIMITER).count(), FIELD_COUNT - 1);
        assert!(row.starts_with("A, B C;"));
        assert_eq!(row.matches('\n').count(), 1);
    }

    #[test]
    fn serializes_with_header_names() {
        let record = ProductRecord::from_fields(&[], "l");
        let json = serde_json::to_value(&record).unwrap();
        for column in COLUMNS {
            assert!(json.get(column).is_some(), "missing {column}");
        }
    }
}
