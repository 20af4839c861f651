// ── Configuration ─────────────────────────────────────────────────────────────
//
// Reads `%APPDATA%\clickthru\config.json` (or the file named by
// `CLICKTHRU_CONFIG`).  The file is optional; a missing file means defaults.
// No `unsafe` — pure safe Rust + serde_json.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Environment variable that overrides the config file location.
pub(crate) const CONFIG_ENV: &str = "CLICKTHRU_CONFIG";

/// Highest hotkey id an application may register (`0xC000..` is reserved for
/// shared DLLs).
const MAX_HOTKEY_ID: i32 = 0xBFFF;

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct Config {
    /// Window class name and title.
    pub(crate) window_title: String,
    pub(crate) hotkey: HotkeyConfig,
    /// Whether the window starts out click-through.
    pub(crate) start_active: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_title: "My window".to_owned(),
            hotkey: HotkeyConfig::default(),
            start_active: true,
        }
    }
}

/// The one global hotkey the tool registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct HotkeyConfig {
    /// Identifier passed to `RegisterHotKey` and echoed back in `WM_HOTKEY`.
    pub(crate) id: i32,
    pub(crate) modifiers: Vec<Modifier>,
    pub(crate) key: VirtualKey,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            id: 1,
            modifiers: vec![Modifier::NoRepeat],
            key: VirtualKey(0x42), // 'B'
        }
    }
}

impl HotkeyConfig {
    /// `fsModifiers` bit mask for `RegisterHotKey`.
    pub(crate) fn modifier_bits(&self) -> u32 {
        self.modifiers.iter().fold(0, |acc, m| acc | m.bits())
    }
}

/// One `MOD_*` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Modifier {
    Alt,
    Control,
    Shift,
    Win,
    /// `MOD_NOREPEAT`: holding the key down does not re-fire the hotkey.
    /// Not a modifier key.
    NoRepeat,
}

impl Modifier {
    pub(crate) fn bits(self) -> u32 {
        match self {
            Self::Alt => 0x0001,
            Self::Control => 0x0002,
            Self::Shift => 0x0004,
            Self::Win => 0x0008,
            Self::NoRepeat => 0x4000,
        }
    }
}

// ── Virtual keys ──────────────────────────────────────────────────────────────

/// A Win32 virtual-key code.
///
/// Written in the config as `"B"`, `"7"`, `"F5"`, or `"0x42"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct VirtualKey(pub(crate) u32);

impl TryFrom<String> for VirtualKey {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VirtualKey> for String {
    fn from(vk: VirtualKey) -> Self {
        vk.to_string()
    }
}

impl std::str::FromStr for VirtualKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return match u32::from_str_radix(hex, 16) {
                Ok(v @ 0x01..=0xFE) => Ok(Self(v)),
                _ => Err(format!("virtual-key code out of range: {s:?}")),
            };
        }

        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.clone().next()) {
            // VK_A..VK_Z and VK_0..VK_9 share their ASCII upper-case values.
            if c.is_ascii_alphanumeric() {
                return Ok(Self(c.to_ascii_uppercase() as u32));
            }
        }

        if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u32>().ok()) {
            if (1..=24).contains(&n) {
                return Ok(Self(0x70 + n - 1)); // VK_F1 = 0x70
            }
        }

        Err(format!("unrecognised key: {s:?}"))
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            v @ (0x30..=0x39 | 0x41..=0x5A) => write!(f, "{}", v as u8 as char),
            v @ 0x70..=0x87 => write!(f, "F{}", v - 0x70 + 1),
            v => write!(f, "{v:#04x}"),
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the config file path.
///
/// `CLICKTHRU_CONFIG` wins; otherwise `%APPDATA%\clickthru\config.json`.
/// Returns `None` if neither is set.
pub(crate) fn config_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("clickthru");
    p.push("config.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Load the config from the default location, falling back to defaults when
/// there is no file.
pub(crate) fn load() -> Result<Config> {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            debug!(event = "config.path_unresolved", "APPDATA not set; using defaults");
            Ok(Config::default())
        }
    }
}

/// Read and validate the config at `path`.
///
/// A missing file yields `Config::default()`; a malformed one is an error.
pub(crate) fn load_from(path: &Path) -> Result<Config> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(event = "config.not_found", path = %path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(e.into()),
    };

    let config: Config = serde_json::from_slice(&data).map_err(|source| AppError::Config {
        path: path.to_owned(),
        source,
    })?;
    config.validate(path)?;

    info!(
        event = "config.loaded",
        path = %path.display(),
        hotkey_id = config.hotkey.id,
        key = %config.hotkey.key,
        modifiers = config.hotkey.modifier_bits()
    );
    Ok(config)
}

impl Config {
    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |msg: String| AppError::Config {
            path: path.to_owned(),
            source: serde::de::Error::custom(msg),
        };

        if !(0..=MAX_HOTKEY_ID).contains(&self.hotkey.id) {
            return Err(invalid(format!(
                "hotkey.id {} outside 0..={MAX_HOTKEY_ID:#x}",
                self.hotkey.id
            )));
        }
        if self.window_title.is_empty() {
            return Err(invalid("window_title must not be empty".to_owned()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(body.as_bytes()).expect("write");
        f
    }

    #[test]
    fn defaults_are_bare_b_without_repeat() {
        let c = Config::default();
        assert_eq!(c.window_title, "My window");
        assert_eq!(c.hotkey.id, 1);
        assert_eq!(c.hotkey.key, VirtualKey(0x42));
        assert_eq!(c.hotkey.modifier_bits(), 0x4000);
        assert!(c.start_active);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let c = load_from(&dir.path().join("nope.json")).expect("load");
        assert_eq!(c, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let f = write_config(r#"{"hotkey":{"modifiers":["control","alt"],"key":"F9"}}"#);
        let c = load_from(f.path()).expect("load");
        assert_eq!(c.window_title, "My window");
        assert_eq!(c.hotkey.id, 1);
        assert_eq!(c.hotkey.key, VirtualKey(0x78));
        assert_eq!(c.hotkey.modifier_bits(), 0x0003);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let f = write_config(r#"{"colour":"blue"}"#);
        assert!(matches!(load_from(f.path()), Err(AppError::Config { .. })));
    }

    #[test]
    fn reserved_hotkey_id_is_rejected() {
        let f = write_config(r#"{"hotkey":{"id":49152}}"#);
        assert!(matches!(load_from(f.path()), Err(AppError::Config { .. })));
    }

    #[test]
    fn empty_title_is_rejected() {
        let f = write_config(r#"{"window_title":""}"#);
        assert!(matches!(load_from(f.path()), Err(AppError::Config { .. })));
    }

    #[test]
    fn parse_letters_and_digits() {
        assert_eq!("B".parse::<VirtualKey>(), Ok(VirtualKey(0x42)));
        assert_eq!("b".parse::<VirtualKey>(), Ok(VirtualKey(0x42)));
        assert_eq!("7".parse::<VirtualKey>(), Ok(VirtualKey(0x37)));
    }

    #[test]
    fn parse_function_keys() {
        assert_eq!("F1".parse::<VirtualKey>(), Ok(VirtualKey(0x70)));
        assert_eq!("f24".parse::<VirtualKey>(), Ok(VirtualKey(0x87)));
        assert!("F25".parse::<VirtualKey>().is_err());
    }

    #[test]
    fn parse_hex_codes() {
        assert_eq!("0xC0".parse::<VirtualKey>(), Ok(VirtualKey(0xC0)));
        assert!("0x00".parse::<VirtualKey>().is_err());
        assert!("0x1FF".parse::<VirtualKey>().is_err());
    }

    #[test]
    fn parse_rejects_words() {
        assert!("Space".parse::<VirtualKey>().is_err());
        assert!("".parse::<VirtualKey>().is_err());
    }

    #[test]
    fn key_display_uses_config_spelling() {
        assert_eq!(VirtualKey(0x42).to_string(), "B");
        assert_eq!(VirtualKey(0x74).to_string(), "F5");
        assert_eq!(VirtualKey(0xC0).to_string(), "0xc0");
    }

    #[test]
    fn serialised_config_reads_back() {
        let mut c = Config::default();
        c.hotkey.modifiers = vec![Modifier::Win, Modifier::Shift];
        c.hotkey.key = VirtualKey(0x74);
        let json = serde_json::to_string(&c).expect("serialize");
        assert!(json.contains(r#""key":"F5""#));
        assert!(json.contains(r#""modifiers":["win","shift"]"#));
        let f = write_config(&json);
        assert_eq!(load_from(f.path()).expect("load"), c);
    }
}
