use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::model::config::PipelineConfig;

use super::store::TranslationStore;
use super::translator::Translator;

#[derive(Debug, Clone, Copy)]
pub struct FillOptions {
    pub delay: Duration,
    pub checkpoint_every: usize,
}

impl FillOptions {
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        FillOptions {
            delay: Duration::from_millis(cfg.translate_delay_ms),
            checkpoint_every: cfg.checkpoint_every.max(1),
        }
    }
}

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct FillReport {
    pub requested: usize,
    pub cached: usize,
    pub translated: usize,
    pub failed: usize,
    pub flushes: usize,
}

/// Translation failures never escape: the English name is stored instead.
/// Only a failed flush is returned as an error.
pub fn fill<'a, I>(
    store: &mut TranslationStore,
    names: I,
    translator: &dyn Translator,
    opts: FillOptions,
) -> Result<FillReport>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = FillReport::default();
    let mut since_flush = 0usize;

    for raw in names {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }

        report.requested += 1;

        if store.contains(name) {
            report.cached += 1;
            continue;
        }

        if !opts.delay.is_zero() {
            thread::sleep(opts.delay);
        }

        let value = match translator.translate(name) {
            Ok(t) => {
                debug!("[tm] {name} -> {t}");
                report.translated += 1;
                t
            }
            Err(e) => {
                warn!("[tm] translation failed for {name:?}, keeping source text: {e}");
                report.failed += 1;
                name.to_string()
            }
        };

        store.insert(name, value);
        since_flush += 1;

        if since_flush >= opts.checkpoint_every {
            store.flush()?;
            report.flushes += 1;
            since_flush = 0;
            info!(
                "[tm] checkpoint: {} new, {} total",
                report.translated + report.failed,
                store.len()
            );
        }
    }

    store.flush()?;
    report.flushes += 1;

    info!(
        "[tm] done: {} names, {} cached, {} translated, {} failed",
        report.requested, report.cached, report.translated, report.failed
    );

    Ok(report)
}
