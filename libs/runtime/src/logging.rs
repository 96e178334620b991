use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

// A writer handle that may be None (drops writes)
#[derive(Clone)]
struct RoutedWriterHandle(Option<RotWriterHandle>);

impl Write for RoutedWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }
    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Route log records to different files by target prefix; keys are crate
/// names like "catalog" or "storefront".
struct MultiFileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl MultiFileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriterHandle> {
        for (crate_name, wr) in &self.by_prefix {
            if matches_crate_prefix(target, crate_name) {
                return Some(RotWriterHandle(wr.0.clone()));
            }
        }
        self.default.as_ref().map(|w| RotWriterHandle(w.0.clone()))
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for MultiFileRouter {
    type Writer = RoutedWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriterHandle(self.default.as_ref().map(|w| RotWriterHandle(w.0.clone())))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriterHandle(self.resolve_for(meta.target()))
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir`; absolute paths are kept as-is.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn create_rotating_writer(section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) as usize * 1024 * 1024;
    let log_path = resolve_log_path(&section.file, base_dir);

    if let Some(parent) = log_path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            eprintln!("Failed to create log directory for '{}'", log_path.display());
            return None;
        }
    }

    let rot = FileRotate::new(
        &log_path,
        AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Some(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: logging sections keyed by subsystem name ("default" is the catch-all)
/// - `base_dir`: base directory for resolving relative log file paths
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let default_section = cfg.get("default");
    let crate_sections: Vec<(&String, &Section)> =
        cfg.iter().filter(|(k, _)| k.as_str() != "default").collect();

    // Console filter: explicit crate targets plus the default catch-all level.
    let default_console = default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(tracing::level_filters::LevelFilter::from_level)
        .unwrap_or(tracing::level_filters::LevelFilter::OFF);

    let mut console_targets = Targets::new().with_default(default_console);
    for (crate_name, section) in &crate_sections {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            console_targets = console_targets.with_target(
                crate_name.as_str(),
                tracing::level_filters::LevelFilter::from_level(level),
            );
        } else {
            console_targets = console_targets
                .with_target(crate_name.as_str(), tracing::level_filters::LevelFilter::OFF);
        }
    }

    // File filter mirrors the console one but uses the file levels.
    let default_file = default_section
        .and_then(|s| parse_tracing_level(&s.file_level))
        .map(tracing::level_filters::LevelFilter::from_level)
        .unwrap_or(tracing::level_filters::LevelFilter::OFF);

    let mut file_targets = Targets::new().with_default(default_file);
    for (crate_name, section) in &crate_sections {
        if section.file.trim().is_empty() {
            continue;
        }
        if let Some(level) = parse_tracing_level(&section.file_level) {
            file_targets = file_targets.with_target(
                crate_name.as_str(),
                tracing::level_filters::LevelFilter::from_level(level),
            );
        }
    }

    let mut router = MultiFileRouter {
        default: default_section.and_then(|s| create_rotating_writer(s, base_dir)),
        by_prefix: HashMap::new(),
    };
    for (crate_name, section) in &crate_sections {
        if let Some(writer) = create_rotating_writer(section, base_dir) {
            router.by_prefix.insert((*crate_name).clone(), writer);
        }
    }

    build_logging_layers(console_targets, file_targets, router);
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn build_logging_layers(console_targets: Targets, file_targets: Targets, router: MultiFileRouter) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    let ansi = atty::is(atty::Stream::Stdout);

    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    if router.is_empty() {
        let _ = Registry::default().with(console_layer).try_init();
        return;
    }

    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(file_targets);

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_prefix_matching() {
        assert!(matches_crate_prefix("catalog", "catalog"));
        assert!(matches_crate_prefix("catalog::domain::service", "catalog"));
        assert!(!matches_crate_prefix("catalogue", "catalog"));
        assert!(!matches_crate_prefix("store", "storefront"));
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_tracing_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("OFF"), None);
        assert_eq!(parse_tracing_level("bogus"), Some(Level::INFO));
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let base = Path::new("/var/lib/bookmart");
        assert_eq!(
            resolve_log_path("logs/api.log", base),
            PathBuf::from("/var/lib/bookmart/logs/api.log")
        );
        assert_eq!(
            resolve_log_path("/tmp/x.log", base),
            PathBuf::from("/tmp/x.log")
        );
    }
}
