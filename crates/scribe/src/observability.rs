//! Structured logging to a JSON-lines file.
//!
//! Never writes to stdout: that stream carries command output (rendered
//! messages, `--json` documents). Logs go to a file, or stderr as a last
//! resort.

use std::io::Write;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "SCRIBE_LOG_PATH";
const ENV_LOG_DIR: &str = "SCRIBE_LOG_DIR";
const SERVICE: &str = env!("CARGO_PKG_NAME");

/// Where log records end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    dir: Utf8PathBuf,
    file_name: String,
}

impl LogTarget {
    /// Full path of the log file.
    pub fn path(&self) -> Utf8PathBuf {
        self.dir.join(&self.file_name)
    }

    fn in_dir(dir: Utf8PathBuf) -> Self {
        Self {
            dir,
            file_name: format!("{SERVICE}.jsonl"),
        }
    }

    fn at_path(path: &Utf8Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .with_context(|| format!("{ENV_LOG_PATH} must include a file name"))?;
        let dir = path
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
        })
    }

    fn ensure_writable(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create log directory {}", self.dir))?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .with_context(|| format!("failed to open log file {}", self.path()))?;
        Ok(())
    }
}

/// Pick the log target.
///
/// Order: explicit path, explicit directory, config `log_dir`, then the
/// platform data directory.
fn resolve_log_target(
    path_override: Option<Utf8PathBuf>,
    dir_override: Option<Utf8PathBuf>,
    config_dir: Option<&Utf8Path>,
) -> Result<LogTarget> {
    let target = if let Some(path) = path_override {
        LogTarget::at_path(&path)?
    } else if let Some(dir) = dir_override.or_else(|| config_dir.map(Utf8Path::to_path_buf)) {
        LogTarget::in_dir(dir)
    } else {
        let dirs = directories::ProjectDirs::from("", "", SERVICE)
            .context("no home directory for default log location")?;
        let dir = Utf8PathBuf::try_from(dirs.data_local_dir().join("logs"))
            .context("default log directory is not valid UTF-8")?;
        LogTarget::in_dir(dir)
    };
    target.ensure_writable()?;
    Ok(target)
}

fn env_path(name: &str) -> Option<Utf8PathBuf> {
    std::env::var(name).ok().filter(|v| !v.is_empty()).map(Utf8PathBuf::from)
}

/// Keeps the background log writer alive; drop it last.
pub struct ObservabilityGuard {
    _writer: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the global subscriber.
pub fn init_observability(
    config_log_dir: Option<&Utf8Path>,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let target = resolve_log_target(env_path(ENV_LOG_PATH), env_path(ENV_LOG_DIR), config_log_dir);
    let (writer, guard) = match target {
        Ok(target) => {
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                target.dir.as_std_path(),
                &target.file_name,
            ))
        }
        Err(err) => {
            eprintln!("warning: {err:#}; logging to stderr");
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonLines { writer })
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(ObservabilityGuard { _writer: guard })
}

/// Build the filter.
///
/// `--quiet` beats `-v`/`-vv`, which beat `RUST_LOG`, which beats the
/// configured level.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
        }
        (false, 1) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    }
}

/// One JSON object per event, with the fields of every enclosing span.
struct JsonLines<W> {
    writer: W,
}

#[derive(Default)]
struct Fields(Map<String, Value>);

impl Visit for Fields {
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().into(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().into(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().into(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().into(), value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0.insert(field.name().into(), value.to_string().into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().into(), format!("{value:?}").into());
    }
}

impl<S, W> tracing_subscriber::Layer<S> for JsonLines<W>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + 'static,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: LayerContext<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: LayerContext<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<Fields>() {
            values.record(fields);
        } else {
            let mut fields = Fields::default();
            values.record(&mut fields);
            extensions.insert(fields);
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: LayerContext<'_, S>) {
        let meta = event.metadata();
        let mut record = Map::new();
        record.insert("timestamp_ms".into(), unix_millis().into());
        record.insert("level".into(), meta.level().as_str().to_lowercase().into());
        record.insert("target".into(), meta.target().into());
        if let Some(scope) = ctx.event_scope(event) {
            let mut spans = Vec::new();
            for span in scope.from_root() {
                spans.push(Value::from(span.name()));
                if let Some(fields) = span.extensions().get::<Fields>() {
                    record.extend(fields.0.clone());
                }
            }
            record.insert("spans".into(), spans.into());
        }
        let mut fields = Fields::default();
        event.record(&mut fields);
        record.extend(fields.0);

        let mut writer = self.writer.make_writer();
        if serde_json::to_writer(&mut writer, &Value::Object(record)).is_ok() {
            let _ = writer.write_all(b"\n");
        }
    }
}

fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
