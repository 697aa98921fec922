//! Configuration loading and parsing.
//!
//! Parses `xword.toml` (or an override path provided by the binary). Three
//! tables are recognized:
//! * `[assist]` feature toggles consumed by the selection controller
//!   (`smart_skip`, `auto_advance_word`, `check_as_you_type`).
//! * `[popup]` onload popup behavior (`onload`, `onload_delay_ms`).
//! * `[compound]` the key that toggles compound input (`toggle_key`).
//!
//! Unknown fields are ignored (TOML deserialization tolerance). A file that
//! fails to parse falls back to defaults with a warning rather than aborting
//! the session.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "xword.toml";

/// Feature toggles read by the cursor engine. Plain `Copy` data so the
/// controller can hold its own copy.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AssistConfig {
    /// Jump over filled cells toward the next empty cell while typing.
    #[serde(default = "AssistConfig::default_smart_skip")]
    pub smart_skip: bool,
    /// Move to the next/previous word when a word is filled or emptied.
    #[serde(default)]
    pub auto_advance_word: bool,
    /// Check each cell as soon as a letter is typed into it.
    #[serde(default)]
    pub check_as_you_type: bool,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            smart_skip: Self::default_smart_skip(),
            auto_advance_word: false,
            check_as_you_type: false,
        }
    }
}

impl AssistConfig {
    const fn default_smart_skip() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PopupConfig {
    #[serde(default = "PopupConfig::default_onload")]
    pub onload: bool,
    #[serde(default = "PopupConfig::default_onload_delay_ms")]
    pub onload_delay_ms: u64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            onload: Self::default_onload(),
            onload_delay_ms: Self::default_onload_delay_ms(),
        }
    }
}

impl PopupConfig {
    const fn default_onload() -> bool {
        true
    }
    const fn default_onload_delay_ms() -> u64 {
        200
    }

    pub fn onload_delay(&self) -> Duration {
        Duration::from_millis(self.onload_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompoundConfig {
    #[serde(default = "CompoundConfig::default_toggle_key")]
    pub toggle_key: char,
}

impl Default for CompoundConfig {
    fn default() -> Self {
        Self {
            toggle_key: Self::default_toggle_key(),
        }
    }
}

impl CompoundConfig {
    const fn default_toggle_key() -> char {
        '!'
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub assist: AssistConfig,
    #[serde(default)]
    pub popup: PopupConfig,
    #[serde(default)]
    pub compound: CompoundConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Best-effort config path: working directory first, then the platform config
/// dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("xword").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                smart_skip = file.assist.smart_skip,
                auto_advance_word = file.assist.auto_advance_word,
                check_as_you_type = file.assist.check_as_you_type,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn assist(&self) -> AssistConfig {
        self.file.assist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.file.assist.smart_skip);
        assert!(!cfg.file.assist.auto_advance_word);
        assert!(!cfg.file.assist.check_as_you_type);
        assert!(cfg.file.popup.onload);
        assert_eq!(cfg.file.popup.onload_delay(), Duration::from_millis(200));
        assert_eq!(cfg.file.compound.toggle_key, '!');
        assert!(cfg.source.is_none());
    }

    #[test]
    fn parses_assist_toggles() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[assist]\nsmart_skip = false\nauto_advance_word = true\ncheck_as_you_type = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(
            cfg.assist(),
            AssistConfig {
                smart_skip: false,
                auto_advance_word: true,
                check_as_you_type: true,
            }
        );
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn partial_tables_keep_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[popup]\nonload_delay_ms = 50\n[compound]\ntoggle_key = \"~\"\n[unknown]\nx = 1\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.file.popup.onload);
        assert_eq!(cfg.file.popup.onload_delay_ms, 50);
        assert_eq!(cfg.file.compound.toggle_key, '~');
        assert!(cfg.file.assist.smart_skip);
    }

    #[test]
    fn parse_error_falls_back_and_warns_on_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[assist\nsmart_skip = ").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap()
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
        assert!(cfg.raw.is_none());
        assert!(cfg.file.assist.smart_skip);
    }
}
