use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};
use url::Url;

use crate::archiver::{self, Archive};
use crate::builder::RecordBuilder;
use crate::config::Config;
use crate::error::ScrapeError;
use crate::models::{LinkSet, ProductRecord};
use crate::page::{Browser, Launcher, PageHandle, WaitUntil};
use crate::schema::Schema;

/// Outcome of a full wishlist run.
#[derive(Debug)]
pub struct RunSummary {
    pub links: usize,
    pub written: usize,
    pub skipped: usize,
    pub output: PathBuf,
}

/// Visit the wishlist, recreate the dated output file and append one row
/// per linked product page, strictly one page at a time.
pub fn run<L: Launcher>(
    config: &Config,
    launcher: &L,
    schema: &Schema,
    date: NaiveDate,
) -> Result<RunSummary> {
    let base = config.base()?;
    let builder = RecordBuilder::new(schema, &base, config.link_wait());

    let browser = launcher.launch()?;
    let mut page = browser.new_page()?;
    open(&mut page, &config.wishlist_url)
        .with_context(|| format!("loading wishlist {}", config.wishlist_url))?;

    let archive = Archive::create(archiver::output_path(&config.output_dir, date))
        .context("creating output file")?;

    let links = builder
        .collect_links(&mut page)
        .context("collecting wishlist links")?;
    info!("found {} links", links.len());

    let mut written = 0;
    let mut skipped = 0;
    for link in &links {
        info!("{}", link);
        match scrape_one(launcher, &builder, link) {
            Ok(record) => {
                info!("{}", record.to_row().trim_end());
                archive.append(&record).context("appending record")?;
                written += 1;
            }
            Err(e) => {
                warn!("skipping {}: {}", link, e);
                skipped += 1;
            }
        }
    }

    page.close()?;
    browser.close()?;

    Ok(RunSummary {
        links: links.len(),
        written,
        skipped,
        output: archive.path().to_path_buf(),
    })
}

/// Wishlist links only, no output written.
pub fn list_links<L: Launcher>(config: &Config, launcher: &L, schema: &Schema) -> Result<LinkSet> {
    let base = config.base()?;
    let builder = RecordBuilder::new(schema, &base, config.link_wait());

    let browser = launcher.launch()?;
    let mut page = browser.new_page()?;
    open(&mut page, &config.wishlist_url)?;
    let links = builder.collect_links(&mut page)?;
    page.close()?;
    browser.close()?;
    Ok(links)
}

/// Load one detail page in its own browser and extract its record.
pub fn scrape_one<L: Launcher>(
    launcher: &L,
    builder: &RecordBuilder<'_>,
    link: &str,
) -> Result<ProductRecord, ScrapeError> {
    let url = Url::parse(link)?;
    let browser = launcher.launch()?;
    let mut page = browser.new_page()?;
    open(&mut page, url.as_str())?;
    let record = builder.build_record(&page, link);
    page.close()?;
    browser.close()?;
    Ok(record)
}

fn open<P: PageHandle>(page: &mut P, url: &str) -> Result<(), ScrapeError> {
    page.goto(url, WaitUntil::NetworkIdle)?;
    page.auto_scroll()
}
