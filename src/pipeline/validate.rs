// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::log;

/// Validate the configuration and log the effective values.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Validate - Checking configuration");

    if let Err(e) = config.validate() {
        ::log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::success("Config OK");
    log::sub_item(&format!("categories: {}", config.categories.join(", ")));
    log::sub_item(&format!("load policy: {:?}", config.load_policy));
    log::sub_item(&format!("user agent: {}", config.crawler.user_agent));
    log::sub_item(&format!(
        "timeout: {}s, delay: {}s",
        config.crawler.timeout_secs, config.crawler.delay_secs
    ));
    log::sub_item(&format!(
        "batch size: {}, max concurrent: {}",
        config.crawler.batch_size, config.crawler.max_concurrent
    ));
    log::sub_item(&format!("index: {}", config.index_path().display()));
    log::sub_item(&format!("page size: {}", config.pagination.page_size));
    log::sub_item(&format!(
        "site: {} (highlights: {}, prefixes: {})",
        config.export.site_dir,
        config.export.highlights,
        if config.export.category_prefixes.is_empty() {
            "all".to_string()
        } else {
            config.export.category_prefixes.join(", ")
        }
    ));
    Ok(())
}
