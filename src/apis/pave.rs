use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use super::base::SourceParser;
use super::html::{ancestors, collapsed_text, resolve_link, text_lines};
use crate::common::constants::PAVE_URL;
use crate::common::types::{Record, Source, Status};
use crate::pipeline::processing::dates::DateNormalizer;

const MIN_TITLE_CHARS: usize = 10;
const SKIPPED_LINK_FRAGMENTS: &[&str] = &["Compensation-Budgets-Trends-Report", "trl2026"];
const PAGE_TITLE: &str = "Pave Events Webinars";

static CARD_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="explore.pave.com"], a[href*="pave.com/trl"]"#)
        .expect("card link selector is valid")
});
static HEADING_IN_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, strong").expect("heading selector is valid"));
static HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("heading selector is valid"));
static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("paragraph selector is valid"));

static ACTION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(Aired on|Coming up|Watch|Register|View)").expect("action pattern is valid")
});
static DESCRIPTION_LEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Join|Learn|Discover|Explore|In this|Dive into|A scalable)[^.!?]*[.!?]")
        .expect("description pattern is valid")
});
static TITLE_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Join|Learn|Discover|Planning for)\b")
        .expect("title tail pattern is valid")
});
static COMING_UP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Coming up[:\s]*([A-Za-z]+)\s+(\d{1,2})[^,]*,?\s*(\d{4})")
        .expect("coming up pattern is valid")
});
static AIRED_ON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Aired on[:\s]*([A-Za-z]+)\s+(\d{1,2})[^,]*,?\s*(\d{4})")
        .expect("aired on pattern is valid")
});

/// Pave's events page: one card per webinar linking out to explore.pave.com
pub struct PaveParser;

impl PaveParser {
    fn title_for(link: ElementRef<'_>) -> String {
        if let Some(heading) = link.select(&HEADING_IN_LINK).next() {
            let title = collapsed_text(heading);
            if !title.is_empty() {
                return title;
            }
        }

        for container in ancestors(link, 5) {
            if let Some(heading) = container.select(&HEADING).next() {
                return collapsed_text(heading);
            }
        }

        text_lines(link)
            .into_iter()
            .filter(|line| !ACTION_LINE.is_match(line))
            .find(|line| (15..=150).contains(&line.chars().count()))
            .unwrap_or_default()
    }

    fn description_for(link: ElementRef<'_>, link_text: &str) -> String {
        if let Some(lead) = DESCRIPTION_LEAD.find(link_text) {
            return lead.as_str().trim().to_string();
        }
        ancestors(link, 3)
            .find_map(|container| container.select(&PARAGRAPH).next())
            .map(collapsed_text)
            .unwrap_or_default()
    }

    /// Drops a trailing description fragment run into the title
    fn clean_title(title: &str) -> &str {
        match TITLE_TAIL.find(title) {
            Some(tail) if tail.start() > 0 => title[..tail.start()].trim(),
            _ => title.trim(),
        }
    }

    /// `(air_date, status)` announced by the card text
    fn announced_date(link_text: &str) -> Option<(String, Status)> {
        let (caps, status) = match COMING_UP.captures(link_text) {
            Some(caps) => (caps, Status::Upcoming),
            None => (AIRED_ON.captures(link_text)?, Status::OnDemand),
        };
        Some((format!("{} {}, {}", &caps[1], &caps[2], &caps[3]), status))
    }

    fn is_skipped(link: &str, title: &str) -> bool {
        SKIPPED_LINK_FRAGMENTS.iter().any(|fragment| link.contains(fragment)) || title == PAGE_TITLE
    }
}

impl SourceParser for PaveParser {
    fn source(&self) -> Source {
        Source::Pave
    }

    fn listing_url(&self) -> &'static str {
        PAVE_URL
    }

    fn parse_listing(&self, html: &str, page_url: &Url, today: NaiveDate) -> Vec<Record> {
        let document = Html::parse_document(html);
        let normalizer = DateNormalizer::new(today);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for link in document.select(&CARD_LINKS) {
            let Some(href) = resolve_link(page_url, link) else {
                continue;
            };
            if !seen.insert(href.clone()) {
                continue;
            }

            let link_text = collapsed_text(link);
            let raw_title = Self::title_for(link);
            let title = Self::clean_title(&raw_title);
            if title.chars().count() < MIN_TITLE_CHARS {
                debug!(link = %href, "Skipping card without a usable title");
                continue;
            }
            if Self::is_skipped(&href, title) {
                continue;
            }

            let (air_date, mut status) = Self::announced_date(&link_text)
                .unwrap_or((String::new(), Status::OnDemand));
            // The card label can lag behind the calendar.
            if let Some(at) = normalizer.normalize(&air_date).instant() {
                status = if at.date() > today { Status::Upcoming } else { Status::OnDemand };
            }

            let description = Self::description_for(link, &link_text);
            records.push(Record::new(Source::Pave, title, status, &air_date, &description, &href));
        }

        debug!("Parsed {} Pave cards", records.len());
        records
    }
}
