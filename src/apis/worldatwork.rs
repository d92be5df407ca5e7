use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use super::base::SourceParser;
use super::html::{ancestors, inner_text, resolve_link};
use crate::common::constants::{DESCRIPTION_MAX_CHARS, WORLDATWORK_URL};
use crate::common::types::{truncate_chars, Record, Source, Status};

const MIN_TITLE_CHARS: usize = 15;
const MAX_CONTAINER_DEPTH: usize = 15;
const MEMBER_ONLY_LABEL: &str = "Member Only Access";
const CATEGORIES: &[&str] = &["Demo Day", "Workshop", "Sponsor Delivered", "Exclusive", "Featured"];
const BOILERPLATE: &[&str] = &[
    "Skip to",
    "Register",
    "Member Only",
    "Recertification",
    "Live Event:",
    "Gain Recertification",
];

static PRODUCT_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="/product/redirect/"]"#).expect("product link selector is valid")
});
static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("body selector is valid"));

static LIVE_EVENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Live Event[:\s]*(\d{4}-\d{2}-\d{2})").expect("live event pattern is valid")
});
static AVAILABILITY: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        r"(?i)On\s*Demand\s*Until[:\s]*([A-Za-z]+\s+\d{1,2},?\s*\d{4})",
        r"(?i)Available\s*Until[:\s]*([A-Za-z]+\s+\d{1,2},?\s*\d{4})",
        r"(?i)Valid\s*Through[:\s]*([A-Za-z]+\s+\d{1,2},?\s*\d{4})",
    ]
    .map(|pattern| Regex::new(pattern).expect("availability pattern is valid"))
});

/// WorldAtWork's webinar catalog of live and on-demand products
pub struct WorldAtWorkParser;

impl WorldAtWorkParser {
    fn is_title_line(line: &str) -> bool {
        (20..=150).contains(&line.chars().count())
            && !BOILERPLATE.iter().any(|phrase| line.contains(phrase))
            && !CATEGORIES.contains(&line)
    }

    /// Last date the on-demand recording stays available, from a product page
    fn available_until(page_text: &str) -> Option<String> {
        AVAILABILITY
            .iter()
            .find_map(|pattern| pattern.captures(page_text))
            .map(|caps| caps[1].to_string())
    }
}

impl SourceParser for WorldAtWorkParser {
    fn source(&self) -> Source {
        Source::WorldAtWork
    }

    fn listing_url(&self) -> &'static str {
        WORLDATWORK_URL
    }

    fn parse_listing(&self, html: &str, page_url: &Url, _today: NaiveDate) -> Vec<Record> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for anchor in document.select(&PRODUCT_LINKS) {
            let Some(href) = resolve_link(page_url, anchor) else {
                continue;
            };
            if !seen.insert(href.clone()) {
                continue;
            }

            let member_only = inner_text(anchor) == MEMBER_ONLY_LABEL;
            let mut title: Option<String> = None;
            let mut category: Option<&str> = None;
            let mut air_date = String::new();
            let mut status = Status::OnDemand;

            for container in ancestors(anchor, MAX_CONTAINER_DEPTH) {
                let text = inner_text(container);

                if air_date.is_empty() {
                    if let Some(caps) = LIVE_EVENT.captures(&text) {
                        air_date = caps[1].to_string();
                        status = Status::Upcoming;
                    }
                }
                if category.is_none() {
                    category = CATEGORIES.iter().copied().find(|cat| text.contains(cat));
                }
                if title.is_none() {
                    title = text
                        .lines()
                        .map(str::trim)
                        .find(|line| Self::is_title_line(line))
                        .map(str::to_string);
                }
                if title.is_some() {
                    break;
                }
            }

            let Some(title) = title.filter(|t| t.chars().count() >= MIN_TITLE_CHARS) else {
                debug!(link = %href, "Skipping product without a usable title");
                continue;
            };

            let description = category
                .into_iter()
                .chain(member_only.then_some("Members Only"))
                .collect::<Vec<_>>()
                .join(" • ");

            records.push(Record::new(
                Source::WorldAtWork,
                &title,
                status,
                &air_date,
                &description,
                &href,
            ));
        }

        debug!("Parsed {} WorldAtWork products", records.len());
        records
    }

    fn wants_detail_pages(&self) -> bool {
        true
    }

    fn apply_detail(&self, record: &mut Record, html: &str) {
        let document = Html::parse_document(html);
        let page_text = match document.select(&BODY).next() {
            Some(body) => inner_text(body),
            None => inner_text(document.root_element()),
        };

        if let Some(until) = Self::available_until(&page_text) {
            let description = if record.description.is_empty() {
                format!("On Demand Until: {}", until)
            } else {
                format!("On Demand Until: {} • {}", until, record.description)
            };
            record.description = truncate_chars(&description, DESCRIPTION_MAX_CHARS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="grid">
            <div class="card">
              <span>Workshop</span>
              <span>Live Event: 2099-11-02</span>
              <h3>Building Salary Structures From Scratch</h3>
              <a href="/product/redirect/1001">Register</a>
            </div>
            <div class="card">
              <div class="body">
                <span>Sponsor Delivered</span>
                <h3>AI in Compensation: What Changes in 2026</h3>
                <a href="/product/redirect/1002">Member Only Access</a>
              </div>
            </div>
            <div class="card">
              <a href="/product/redirect/1002">Register</a>
            </div>
          </div>
        </body></html>
    "#;

    fn parse() -> Vec<Record> {
        let page_url = Url::parse(WORLDATWORK_URL).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        WorldAtWorkParser.parse_listing(LISTING, &page_url, today)
    }

    #[test]
    fn test_live_event_card() {
        let records = parse();
        let live = &records[0];
        assert_eq!(live.link, "https://worldatwork.org/product/redirect/1001");
        assert_eq!(live.title, "Building Salary Structures From Scratch");
        assert_eq!(live.status, Status::Upcoming);
        assert_eq!(live.air_date, "2099-11-02");
        assert_eq!(live.description, "Workshop");
    }

    #[test]
    fn test_member_only_on_demand_card() {
        let records = parse();
        assert_eq!(records.len(), 2);
        let member = &records[1];
        assert_eq!(member.link, "https://worldatwork.org/product/redirect/1002");
        assert_eq!(member.title, "AI in Compensation: What Changes in 2026");
        assert_eq!(member.status, Status::OnDemand);
        assert_eq!(member.air_date, "");
        assert_eq!(member.description, "Sponsor Delivered • Members Only");
    }

    #[test]
    fn test_detail_page_prepends_availability() {
        let mut record = parse().remove(1);
        let detail = r#"<html><body><main>
            <p>On Demand Until:</p><p>June 30, 2026</p>
        </main></body></html>"#;

        WorldAtWorkParser.apply_detail(&mut record, detail);

        assert_eq!(
            record.description,
            "On Demand Until: June 30, 2026 • Sponsor Delivered • Members Only"
        );
    }

    #[test]
    fn test_detail_page_without_dates_leaves_record() {
        let mut record = parse().remove(0);
        let before = record.clone();

        let detail = "<html><body><p>Register today</p></body></html>";
        WorldAtWorkParser.apply_detail(&mut record, detail);

        assert_eq!(record, before);
    }

    #[test]
    fn test_available_until_variants() {
        assert_eq!(
            WorldAtWorkParser::available_until("Available until Jan 5 2027"),
            Some("Jan 5 2027".to_string())
        );
        assert_eq!(
            WorldAtWorkParser::available_until("Valid Through: March 1, 2027"),
            Some("March 1, 2027".to_string())
        );
        assert_eq!(WorldAtWorkParser::available_until("No dates here"), None);
    }
}
