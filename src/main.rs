//! Content browser demo
//!
//! Opens a bundle manifest against a directory of content, reports what was
//! acquired, reloads everything once and tears the bundle down again.
//!
//! ```text
//! engine_content [root] [manifest]
//! ```
//!
//! A `content.ron` in the working directory, if present, provides the
//! starting configuration; `root` on the command line overrides it.

use std::path::Path;
use std::process::ExitCode;

use engine_content::prelude::*;

const CONFIG_FILE: &str = "content.ron";
const DEFAULT_MANIFEST: &str = "main.box";

fn load_config() -> ContentConfig {
    if !Path::new(CONFIG_FILE).is_file() {
        return ContentConfig::default();
    }
    match ContentConfig::load_ron(CONFIG_FILE) {
        Ok(config) => {
            log::info!("Using configuration from {CONFIG_FILE}");
            config
        }
        Err(e) => {
            log::warn!("Ignoring {CONFIG_FILE}: {e}");
            ContentConfig::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut config = load_config();
    if let Some(root) = args.next() {
        config = config.with_root(root);
    }
    let manifest = args.next().unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

    log::info!("Opening '{manifest}' from {}", config.root.display());
    let cache = ContentCache::from_config(config).into_shared();
    cache.borrow_mut().subscribe(|n: &Notification| {
        log::debug!("{} {} '{}'", n.event.name(), n.kind, n.path);
    });

    let bundle = match Bundle::open(cache.clone(), &manifest) {
        Ok(bundle) => bundle,
        Err(e) => {
            log::error!("Could not open '{manifest}': {e}");
            return ExitCode::FAILURE;
        }
    };

    for entry in bundle.entries() {
        let valid = cache.borrow().is_valid(entry.kind, &entry.path);
        log::info!(
            "  {:<16} {} {}",
            entry.kind.name(),
            entry.path,
            if valid { "" } else { "(invalid)" }
        );
    }
    for issue in bundle.diagnostics() {
        log::warn!("  skipped: {issue}");
    }
    log::info!(
        "{} entries, {} nested bundles, {} cached",
        bundle.len(),
        bundle.children().len(),
        cache.borrow().len()
    );

    let valid = cache.borrow_mut().reload_all();
    ContentCache::flush(&cache);
    log::info!("Reloaded everything: {valid} of {} valid", cache.borrow().len());

    drop(bundle);
    let evicted = cache.borrow_mut().compact();
    log::info!("Released bundle, evicted {evicted} entries");
    log::info!("{:?}", cache.borrow().stats());

    ExitCode::SUCCESS
}
