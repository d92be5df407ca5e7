use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use super::base::SourceParser;
use super::html::{ancestors, inner_text, resolve_link};
use crate::common::constants::SYNDIO_URL;
use crate::common::types::{Record, Source, Status};

const MIN_TITLE_CHARS: usize = 10;
const MAX_CONTAINER_DEPTH: usize = 10;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("anchor selector is valid"));
static HEADINGS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3, h4, h5").expect("heading selector is valid"));

static AIRED_ON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Aired on[:\s]*([A-Za-z]+\s+\d{1,2},?\s*\d{4})")
        .expect("aired on pattern is valid")
});
static EMPTY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Empty heading").expect("empty heading pattern is valid"));

/// Syndio's resource library filtered to recorded webinars
pub struct SyndioParser;

impl SourceParser for SyndioParser {
    fn source(&self) -> Source {
        Source::Syndio
    }

    fn listing_url(&self) -> &'static str {
        SYNDIO_URL
    }

    fn parse_listing(&self, html: &str, page_url: &Url, _today: NaiveDate) -> Vec<Record> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for anchor in document.select(&ANCHORS) {
            if !inner_text(anchor).to_lowercase().contains("watch") {
                continue;
            }
            let Some(href) = resolve_link(page_url, anchor) else {
                continue;
            };
            if !href.contains("synd.io") || !seen.insert(href.clone()) {
                continue;
            }

            let mut title = String::new();
            let mut air_date = String::new();
            for container in ancestors(anchor, MAX_CONTAINER_DEPTH) {
                let text = inner_text(container);
                let Some(heading) = container.select(&HEADINGS).next() else {
                    continue;
                };
                if !text.to_lowercase().contains("aired on") {
                    continue;
                }

                let heading_text: String = heading.text().collect();
                title = heading_text
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .unwrap_or_default()
                    .to_string();
                if let Some(caps) = AIRED_ON.captures(&text) {
                    air_date = caps[1].to_string();
                }
                break;
            }

            let title = EMPTY_HEADING.replace_all(&title, "").trim().to_string();
            if title.chars().count() < MIN_TITLE_CHARS {
                debug!(link = %href, "Skipping resource without a usable title");
                continue;
            }

            records.push(Record::new(
                Source::Syndio,
                &title,
                Status::OnDemand,
                &air_date,
                "",
                &href,
            ));
        }

        debug!("Parsed {} Syndio webinars", records.len());
        records
    }
}
