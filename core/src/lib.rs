//! RetroLaunch Core - ROM preparation and launch pipeline
//!
//! Turns a library entry (a bare ROM, an archive, a folder, or a multi-disk
//! set) into a running libretro emulator host process.
//!
//! # Architecture
//!
//! - [`PlatformRegistry`] - Per-platform cores, extensions, archive and firmware policy
//! - [`firmware::verify`] - Mandatory firmware presence checks
//! - [`Extractor`] - Archive extraction into a persistent cache or per-launch staging
//! - [`resolve`] - Picks the concrete file the host should load
//! - [`Launcher`] - Orchestrates the steps above and runs the host

pub mod entry;
pub mod error;
pub mod extract;
pub mod firmware;
pub mod launch;
pub mod platform;
pub mod resolver;
pub mod settings;
#[cfg(test)]
mod test_utils;

pub use entry::{EntrySource, GameEntry};
pub use error::{LaunchError, Result};
pub use extract::{Extractor, ExtractorSession};
pub use firmware::FirmwareReport;
pub use launch::{LaunchOutcome, LaunchPlan, Launcher};
pub use platform::{ArchivePolicy, PlatformDescriptor, PlatformRegistry, core_file_name};
pub use resolver::{resolve, select_main_rom};
pub use settings::{DisplayOptions, LaunchConfig, Settings};
