//! TOML configuration for the desk
//!
//! The file comes from `--config <path>`, defaulting to `config/dev.toml`.
//! Every section is optional; a missing or unreadable file falls back to
//! built-in defaults so the console always starts.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationMode {
    /// Built-in seed data, no network
    Seed,
    /// Fetch from the booking system HTTP endpoint
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelConfig {
    /// Property identifier stamped onto every room record
    #[serde(default = "default_hotel_id")]
    pub id: String,
    /// Nightly rate charged when committing without a reservation
    #[serde(default = "default_walk_in_rate")]
    pub walk_in_rate: f64,
    /// Assumed stay length for walk-in guests
    #[serde(default = "default_walk_in_nights")]
    pub walk_in_nights: u32,
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            id: default_hotel_id(),
            walk_in_rate: default_walk_in_rate(),
            walk_in_nights: default_walk_in_nights(),
        }
    }
}

fn default_hotel_id() -> String {
    "frontdesk".to_string()
}

fn default_walk_in_rate() -> f64 {
    120.0
}

fn default_walk_in_nights() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomsConfig {
    #[serde(default = "default_floors")]
    pub floors: u32,
    #[serde(default = "default_rooms_per_floor")]
    pub rooms_per_floor: u32,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self { floors: default_floors(), rooms_per_floor: default_rooms_per_floor() }
    }
}

fn default_floors() -> u32 {
    3
}

fn default_rooms_per_floor() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReservationsConfig {
    #[serde(default = "default_reservation_mode")]
    pub mode: ReservationMode,
    /// Booking system endpoint returning a JSON reservation array
    #[serde(default = "default_reservations_url")]
    pub url: String,
    /// How often the cached snapshot is re-fetched (0 disables the timer)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            mode: default_reservation_mode(),
            url: default_reservations_url(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

fn default_reservation_mode() -> ReservationMode {
    ReservationMode::Seed
}

fn default_reservations_url() -> String {
    "http://localhost:8080/api/reservations".to_string()
}

fn default_refresh_interval() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Simulated recognizer round-trip latency
    #[serde(default = "default_capture_latency_ms")]
    pub latency_ms: u64,
    /// Confidence reported on successful reads
    #[serde(default = "default_capture_confidence")]
    pub confidence: f64,
    /// Every Nth request returns no detection (0 = always detect)
    #[serde(default)]
    pub miss_every: u64,
    /// Plates the simulator cycles through
    #[serde(default = "default_capture_plates")]
    pub plates: Vec<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_capture_latency_ms(),
            confidence: default_capture_confidence(),
            miss_every: 0,
            plates: default_capture_plates(),
        }
    }
}

fn default_capture_latency_ms() -> u64 {
    400
}

fn default_capture_confidence() -> f64 {
    0.88
}

fn default_capture_plates() -> Vec<String> {
    vec![
        "KJ-482".to_string(),
        "MX-917".to_string(),
        "AB-123".to_string(),
        "TR-555".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory for report CSV files
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: default_export_dir() }
    }
}

fn default_export_dir() -> String {
    "exports".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub hotel: HotelConfig,
    #[serde(default)]
    pub rooms: RoomsConfig,
    #[serde(default)]
    pub reservations: ReservationsConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    hotel_id: String,
    walk_in_rate: f64,
    walk_in_nights: u32,
    floors: u32,
    rooms_per_floor: u32,
    reservation_mode: ReservationMode,
    reservations_url: String,
    refresh_interval_secs: u64,
    capture_latency_ms: u64,
    capture_confidence: f64,
    capture_miss_every: u64,
    capture_plates: Vec<String>,
    export_dir: String,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hotel_id: default_hotel_id(),
            walk_in_rate: default_walk_in_rate(),
            walk_in_nights: default_walk_in_nights(),
            floors: default_floors(),
            rooms_per_floor: default_rooms_per_floor(),
            reservation_mode: default_reservation_mode(),
            reservations_url: default_reservations_url(),
            refresh_interval_secs: default_refresh_interval(),
            capture_latency_ms: default_capture_latency_ms(),
            capture_confidence: default_capture_confidence(),
            capture_miss_every: 0,
            capture_plates: default_capture_plates(),
            export_dir: default_export_dir(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            hotel_id: toml_config.hotel.id,
            walk_in_rate: toml_config.hotel.walk_in_rate,
            walk_in_nights: toml_config.hotel.walk_in_nights,
            floors: toml_config.rooms.floors,
            rooms_per_floor: toml_config.rooms.rooms_per_floor,
            reservation_mode: toml_config.reservations.mode,
            reservations_url: toml_config.reservations.url,
            refresh_interval_secs: toml_config.reservations.refresh_interval_secs,
            capture_latency_ms: toml_config.capture.latency_ms,
            capture_confidence: toml_config.capture.confidence,
            capture_miss_every: toml_config.capture.miss_every,
            capture_plates: toml_config.capture.plates,
            export_dir: toml_config.export.dir,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Total sellable rooms, the RevPAR denominator
    pub fn total_rooms(&self) -> u32 {
        self.floors * self.rooms_per_floor
    }

    pub fn hotel_id(&self) -> &str {
        &self.hotel_id
    }

    pub fn walk_in_rate(&self) -> f64 {
        self.walk_in_rate
    }

    pub fn walk_in_nights(&self) -> u32 {
        self.walk_in_nights
    }

    pub fn floors(&self) -> u32 {
        self.floors
    }

    pub fn rooms_per_floor(&self) -> u32 {
        self.rooms_per_floor
    }

    pub fn reservation_mode(&self) -> &ReservationMode {
        &self.reservation_mode
    }

    pub fn reservations_url(&self) -> &str {
        &self.reservations_url
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.refresh_interval_secs
    }

    pub fn capture_latency_ms(&self) -> u64 {
        self.capture_latency_ms
    }

    pub fn capture_confidence(&self) -> f64 {
        self.capture_confidence
    }

    pub fn capture_miss_every(&self) -> u64 {
        self.capture_miss_every
    }

    pub fn capture_plates(&self) -> &[String] {
        &self.capture_plates
    }

    pub fn export_dir(&self) -> &str {
        &self.export_dir
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the room grid
    #[cfg(test)]
    pub fn with_rooms(mut self, floors: u32, rooms_per_floor: u32) -> Self {
        self.floors = floors;
        self.rooms_per_floor = rooms_per_floor;
        self
    }

    /// Builder method for tests to set the walk-in rate
    #[cfg(test)]
    pub fn with_walk_in_rate(mut self, rate: f64) -> Self {
        self.walk_in_rate = rate;
        self
    }
}
