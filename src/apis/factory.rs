use crate::apis::base::{HtmlExtractor, SourceParser};
use crate::apis::pave::PaveParser;
use crate::apis::syndio::SyndioParser;
use crate::apis::worldatwork::WorldAtWorkParser;
use crate::common::constants::{get_supported_apis, PAVE_API, SYNDIO_API, WORLDATWORK_API};
use crate::common::error::{Result, ScraperError};
use crate::common::types::Extractor;
use crate::config::Config;

pub fn create_parser(api_name: &str) -> Option<Box<dyn SourceParser>> {
    match api_name {
        PAVE_API => Some(Box::new(PaveParser)),
        WORLDATWORK_API => Some(Box::new(WorldAtWorkParser)),
        SYNDIO_API => Some(Box::new(SyndioParser)),
        _ => None,
    }
}

pub fn create_extractor(api_name: &str, config: &Config) -> Result<Box<dyn Extractor>> {
    let parser = create_parser(api_name).ok_or_else(|| {
        ScraperError::Config(format!(
            "Unknown source '{}'. Available: {}",
            api_name,
            get_supported_apis().join(", ")
        ))
    })?;
    Ok(Box::new(HtmlExtractor::new(parser, config)?))
}

/// Extractors for `api_names` in the given order
pub fn create_extractors(api_names: &[String], config: &Config) -> Result<Vec<Box<dyn Extractor>>> {
    api_names.iter().map(|name| create_extractor(name.trim(), config)).collect()
}
