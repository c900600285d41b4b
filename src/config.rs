/*
 *  config.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults < YAML file < command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::{
    DEFAULT_I2C_ADDRESS, DEFAULT_I2C_BUS, DEFAULT_INTERFACE, DEFAULT_PLACEHOLDER,
    DISPLAY_HEIGHT, DISPLAY_WIDTH, LABEL_GUTTER, MAX_REFRESH_SECS, REFRESH_SECS, ROW_HEIGHT,
};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every field is optional so a file only
/// needs to name what it changes; accessors resolve the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub refresh_secs: Option<u64>,
    pub display: Option<DisplayConfig>,
    pub network: Option<NetworkConfig>,
    pub font: Option<FontConfig>,
    pub layout: Option<LayoutConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub invert: Option<bool>,
    pub brightness: Option<u8>,       // 0-255
    pub driver: Option<DriverKind>,
    pub bus: Option<BusConfig>,
    /// headless driver only: PBM file rewritten on every frame
    pub frame_dump: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NetworkConfig {
    /// interface whose hardware address is shown
    pub interface: Option<String>,
    /// text drawn for a field that could not be read
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FontConfig {
    /// explicit TTF/OTF, skips the bundled/system search
    pub path: Option<PathBuf>,
    pub size: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LayoutConfig {
    pub gutter: Option<u32>,
    pub row_height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x3C (I2C addresses are 7-bit, stored in u8)
    },
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig::I2c {
            bus: DEFAULT_I2C_BUS.to_string(),
            address: DEFAULT_I2C_ADDRESS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Ssd1306,
    /// in-memory panel, optional PBM dump
    Headless,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(
    name = "netmons",
    version,
    about = "Host name, IP and MAC on a small I2C OLED",
    after_help = "Config search order: --config, ~/.config/netmons/config.yaml, \
                  ~/.config/netmons.yaml, ./netmons.yaml, ./config.yaml"
)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// I2C bus device path (e.g., /dev/i2c-1)
    #[arg(long)]
    pub i2c_bus: Option<String>,
    /// I2C address, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_address)]
    pub address: Option<u8>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub rotate_deg: Option<u16>,
    #[arg(long)]
    pub brightness: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    pub invert: Option<bool>,
    /// Network interface whose MAC is shown
    #[arg(short = 'i', long)]
    pub interface: Option<String>,
    /// Seconds between refreshes
    #[arg(short = 'n', long)]
    pub interval: Option<u64>,
    /// TTF/OTF font to use instead of the bundled/system search
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub font: Option<PathBuf>,
    #[arg(long)]
    pub font_size: Option<f32>,
    /// Render to an in-memory panel and write each frame to this PBM file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub headless: Option<PathBuf>,
    /// Draw a single frame and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub once: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    match parsed {
        Ok(addr) if addr <= 0x7F => Ok(addr),
        Ok(addr) => Err(format!("0x{:02X} is not a 7-bit I2C address", addr)),
        Err(e) => Err(format!("invalid I2C address '{}': {}", s, e)),
    }
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/netmons/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/netmons.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["netmons.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.refresh_secs.is_some()   { dst.refresh_secs = src.refresh_secs; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.network, src.network) {
        (None, Some(c)) => dst.network = Some(c),
        (Some(d), Some(s)) => {
            if s.interface.is_some()   { d.interface = s.interface; }
            if s.placeholder.is_some() { d.placeholder = s.placeholder; }
        }
        _ => {}
    }
    match (&mut dst.font, src.font) {
        (None, Some(c)) => dst.font = Some(c),
        (Some(d), Some(s)) => {
            if s.path.is_some() { d.path = s.path; }
            if s.size.is_some() { d.size = s.size; }
        }
        _ => {}
    }
    match (&mut dst.layout, src.layout) {
        (None, Some(c)) => dst.layout = Some(c),
        (Some(d), Some(s)) => {
            if s.gutter.is_some()     { d.gutter = s.gutter; }
            if s.row_height.is_some() { d.row_height = s.row_height; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.rotate_deg.is_some()  { dst.rotate_deg = src.rotate_deg; }
    if src.invert.is_some()      { dst.invert = src.invert; }
    if src.brightness.is_some()  { dst.brightness = src.brightness; }
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.bus.is_some()         { dst.bus = src.bus; }
    if src.frame_dump.is_some()  { dst.frame_dump = src.frame_dump; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug {
        cfg.log_level = Some("debug".to_string());
    }
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.interval.is_some()  { cfg.refresh_secs = cli.interval; }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.width.is_some()       { display.width = cli.width; }
    if cli.height.is_some()      { display.height = cli.height; }
    if cli.rotate_deg.is_some()  { display.rotate_deg = cli.rotate_deg; }
    if cli.brightness.is_some()  { display.brightness = cli.brightness; }
    if cli.invert.is_some()      { display.invert = cli.invert; }
    if cli.i2c_bus.is_some() || cli.address.is_some() {
        let BusConfig::I2c { bus, address } = display.bus.get_or_insert_with(BusConfig::default);
        if let Some(b) = cli.i2c_bus.as_ref() { *bus = b.clone(); }
        if let Some(a) = cli.address { *address = a; }
    }
    if let Some(path) = cli.headless.as_ref() {
        display.driver = Some(DriverKind::Headless);
        display.frame_dump = Some(path.clone());
    }

    if cli.interface.is_some() {
        cfg.network.get_or_insert_with(NetworkConfig::default).interface = cli.interface.clone();
    }
    if cli.font.is_some() || cli.font_size.is_some() {
        let font = cfg.font.get_or_insert_with(FontConfig::default);
        if cli.font.is_some()      { font.path = cli.font.clone(); }
        if cli.font_size.is_some() { font.size = cli.font_size; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.width() == 0 || cfg.height() == 0 {
        return Err(ConfigError::Validation("display width/height must be > 0".into()));
    }
    if let Some(rot) = cfg.display.as_ref().and_then(|d| d.rotate_deg) {
        match rot {
            0 | 90 | 180 | 270 => {},
            _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
        }
    }
    let BusConfig::I2c { address, .. } = cfg.bus();
    if address > 0x7F {
        return Err(ConfigError::Validation(format!("I2C address 0x{:02X} is not 7-bit", address)));
    }
    match cfg.refresh_secs {
        Some(0) => return Err(ConfigError::Validation("refresh_secs must be > 0".into())),
        Some(secs) if secs > MAX_REFRESH_SECS => {
            return Err(ConfigError::Validation(format!("refresh_secs must be <= {}", MAX_REFRESH_SECS)));
        }
        _ => {}
    }
    if cfg.row_height() == 0 || cfg.row_height() > cfg.height() {
        return Err(ConfigError::Validation("layout row_height must be in 1..=display height".into()));
    }
    if cfg.gutter() > cfg.width() {
        return Err(ConfigError::Validation("layout gutter must not exceed display width".into()));
    }
    if cfg.interface().trim().is_empty() {
        return Err(ConfigError::Validation("network interface must not be empty".into()));
    }
    if let Some(size) = cfg.font.as_ref().and_then(|f| f.size) {
        if size.is_nan() || size <= 0.0 {
            return Err(ConfigError::Validation("font size must be > 0".into()));
        }
    }
    Ok(())
}

impl Config {
    pub fn width(&self) -> u32 {
        self.display.as_ref().and_then(|d| d.width).unwrap_or(DISPLAY_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.display.as_ref().and_then(|d| d.height).unwrap_or(DISPLAY_HEIGHT)
    }

    pub fn driver(&self) -> DriverKind {
        self.display.as_ref().and_then(|d| d.driver).unwrap_or(DriverKind::Ssd1306)
    }

    pub fn bus(&self) -> BusConfig {
        self.display.as_ref().and_then(|d| d.bus.clone()).unwrap_or_default()
    }

    pub fn frame_dump(&self) -> Option<&Path> {
        self.display.as_ref().and_then(|d| d.frame_dump.as_deref())
    }

    pub fn interface(&self) -> &str {
        self.network
            .as_ref()
            .and_then(|n| n.interface.as_deref())
            .unwrap_or(DEFAULT_INTERFACE)
    }

    pub fn placeholder(&self) -> &str {
        self.network
            .as_ref()
            .and_then(|n| n.placeholder.as_deref())
            .unwrap_or(DEFAULT_PLACEHOLDER)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.unwrap_or(REFRESH_SECS))
    }

    pub fn gutter(&self) -> u32 {
        self.layout.as_ref().and_then(|l| l.gutter).unwrap_or(LABEL_GUTTER)
    }

    pub fn row_height(&self) -> u32 {
        self.layout.as_ref().and_then(|l| l.row_height).unwrap_or(ROW_HEIGHT)
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font.as_ref().and_then(|f| f.path.as_deref())
    }

    pub fn font_size(&self) -> Option<f32> {
        self.font.as_ref().and_then(|f| f.size)
    }

    pub fn log_filter(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}
