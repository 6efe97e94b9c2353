use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::ScrapeError;
use crate::models::{LinkSet, ProductRecord};
use crate::page::PageHandle;
use crate::parser::{self, NOT_FOUND};
use crate::schema::{self, Lookup, Schema};

pub struct RecordBuilder<'a> {
    schema: &'a Schema,
    base: &'a Url,
    link_wait: Duration,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(schema: &'a Schema, base: &'a Url, link_wait: Duration) -> Self {
        Self {
            schema,
            base,
            link_wait,
        }
    }

    /// All wishlist item links, resolved against the base domain.
    ///
    /// Fails only when the item container does not show up within the link
    /// wait.
    pub fn collect_links<P: PageHandle>(&self, page: &mut P) -> Result<LinkSet, ScrapeError> {
        let links = &self.schema.links;
        page.wait_for_selector(links.container, Some(self.link_wait))?;
        let found = parser::extract_all(&*page, links.item_link, self.base);
        debug!("collected {} links", found.len());
        Ok(found)
    }

    /// One record per detail page. Never fails: unreadable fields are
    /// [`NOT_FOUND`].
    pub fn build_record<P: PageHandle>(&self, page: &P, link: &str) -> ProductRecord {
        let mut labeled: HashMap<&str, String> = HashMap::new();
        let mut values = Vec::with_capacity(self.schema.fields.len());

        for field in &self.schema.fields {
            let raw = match field.lookup {
                Lookup::Selectors(candidates) => parser::extract_first(page, candidates),
                Lookup::Labeled(label) => labeled
                    .entry(label)
                    .or_insert_with(|| {
                        schema::find_labeled_value(page, &self.schema.details, label)
                            .unwrap_or_else(|| NOT_FOUND.to_string())
                    })
                    .clone(),
            };
            values.push((field.name, (field.normalize)(&raw)));
        }

        ProductRecord::from_fields(&values, link)
    }
}
