use chrono::NaiveDate;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::common::error::{Result, ScraperError};
use crate::common::types::{Extractor, Record, Source};
use crate::config::Config;
use crate::pipeline::processing::dates::DateNormalizer;

/// Source-specific knowledge: where the listing lives and how to read it.
///
/// Parsing is synchronous and infallible; markup it cannot make sense of
/// simply yields fewer records.
pub trait SourceParser: Send + Sync {
    fn source(&self) -> Source;

    fn listing_url(&self) -> &'static str;

    /// Candidate records from the listing page. `today` anchors relative dates.
    fn parse_listing(&self, html: &str, page_url: &Url, today: NaiveDate) -> Vec<Record>;

    /// Whether each record's own page should be fetched and passed to
    /// [`SourceParser::apply_detail`]
    fn wants_detail_pages(&self) -> bool {
        false
    }

    fn apply_detail(&self, _record: &mut Record, _html: &str) {}
}

/// Fetches a static listing page and hands it to a [`SourceParser`]
pub struct HtmlExtractor {
    client: Client,
    parser: Box<dyn SourceParser>,
    detail_delay: Duration,
}

impl HtmlExtractor {
    pub fn new(parser: Box<dyn SourceParser>, config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            parser,
            detail_delay: Duration::from_millis(config.detail_delay_ms),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self.client.get(url).send().await?.error_for_status()?.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    async fn enrich_from_detail_pages(&self, records: &mut [Record]) {
        let total = records.len();
        for (index, record) in records.iter_mut().enumerate() {
            debug!("Fetching details {}/{}: {}", index + 1, total, record.link);
            match self.fetch(&record.link).await {
                Ok(html) => self.parser.apply_detail(record, &html),
                Err(e) => warn!("Failed to fetch details for {}: {}", record.link, e),
            }
            if !self.detail_delay.is_zero() {
                tokio::time::sleep(self.detail_delay).await;
            }
        }
    }
}

#[async_trait::async_trait]
impl Extractor for HtmlExtractor {
    fn source(&self) -> Source {
        self.parser.source()
    }

    #[instrument(skip(self), fields(source = %self.parser.source()))]
    async fn produce_candidates(&self) -> Result<Vec<Record>> {
        let url = self.parser.listing_url();
        let page_url = Url::parse(url).map_err(|e| ScraperError::Extract {
            source_name: self.parser.source().to_string(),
            message: format!("invalid listing URL {}: {}", url, e),
        })?;

        let html = self.fetch(url).await?;
        let today = DateNormalizer::for_current_date().today();
        let mut records = self.parser.parse_listing(&html, &page_url, today);
        if records.is_empty() {
            warn!("No webinars found - the page structure may have changed");
        }

        if self.parser.wants_detail_pages() && !records.is_empty() {
            info!("Found {} webinars, now fetching detail pages...", records.len());
            self.enrich_from_detail_pages(&mut records).await;
        }

        info!("Scraped {} webinars", records.len());
        Ok(records)
    }
}
