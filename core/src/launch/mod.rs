//! Launch orchestration
//!
//! Composes the registry, firmware check, resolver, and extractor into a
//! single blocking `launch` call:
//!
//! 1. look up the platform descriptor
//! 2. verify firmware (nothing is extracted or spawned on failure)
//! 3. locate the core binary
//! 4. resolve the ROM, extracting archives as needed
//! 5. create the save directory and build the host command
//! 6. run the host and wait for it
//!
//! Staging directories are released on every exit path, including errors.

mod command;

use std::path::PathBuf;

use crate::entry::GameEntry;
use crate::error::{LaunchError, Result};
use crate::extract::Extractor;
use crate::firmware;
use crate::platform::PlatformRegistry;
use crate::resolver;
use crate::settings::LaunchConfig;

pub use command::{
    ENV_SAVESTATE_DIRECTORY, ENV_SRAM_DIRECTORY, ENV_SYSTEM_DIRECTORY, HOST_EXECUTABLE, LaunchPlan,
};

/// Result of a completed host run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub plan: LaunchPlan,
    /// Host exit code; `None` if it was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl LaunchOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs games through the emulator host, one launch at a time.
#[derive(Debug)]
pub struct Launcher {
    config: LaunchConfig,
    registry: PlatformRegistry,
    extractor: Extractor,
    host: String,
}

impl Launcher {
    pub fn new(config: LaunchConfig, registry: PlatformRegistry) -> Self {
        let extractor = Extractor::for_cache_path(&config.cache_root);
        Self {
            config,
            registry,
            extractor,
            host: HOST_EXECUTABLE.to_string(),
        }
    }

    /// Use a different host executable (name on `PATH` or explicit path).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn extractor_mut(&mut self) -> &mut Extractor {
        &mut self.extractor
    }

    /// Run every pre-launch step and return the command that would be run.
    ///
    /// Nothing is spawned and no save directory is created. Staging
    /// directories are released before returning, so a staged ROM path in the
    /// plan no longer exists afterwards; cached paths stay valid.
    pub fn plan(&mut self, entry: &GameEntry) -> Result<LaunchPlan> {
        let Launcher {
            config,
            registry,
            extractor,
            host,
        } = self;
        let mut session = extractor.session();
        prepare(config, registry, host, entry, &mut session)
    }

    /// Launch `entry` and block until the host exits.
    ///
    /// A non-zero host exit is logged and reported in the outcome, not
    /// treated as a failure.
    pub fn launch(&mut self, entry: &GameEntry) -> Result<LaunchOutcome> {
        let Launcher {
            config,
            registry,
            extractor,
            host,
        } = self;
        let mut session = extractor.session();

        let plan = prepare(config, registry, host, entry, &mut session)?;
        std::fs::create_dir_all(&plan.save_dir).map_err(|e| LaunchError::io(&plan.save_dir, e))?;

        let exit_code = run_host(&plan)?;
        Ok(LaunchOutcome { plan, exit_code })
    }
}

fn prepare(
    config: &LaunchConfig,
    registry: &PlatformRegistry,
    host: &str,
    entry: &GameEntry,
    extractor: &mut Extractor,
) -> Result<LaunchPlan> {
    let platform = entry.platform.as_str();
    let descriptor = registry
        .get(platform)
        .ok_or_else(|| LaunchError::UnknownPlatform(platform.to_string()))?;

    let report = firmware::verify(registry, platform, &config.firmware_root);
    if !report.ok {
        return Err(LaunchError::FirmwareMissing {
            platform: platform.to_string(),
            missing: report.missing,
            message: report.message,
        });
    }
    tracing::debug!("Firmware check for {}: {}", platform, report.message);

    let core_path = registry
        .core_path(platform, &config.core_root)
        .ok_or_else(|| LaunchError::CoreMissing {
            platform: platform.to_string(),
            expected: registry
                .expected_core_path(platform, &config.core_root)
                .unwrap_or_default(),
        })?;

    let rom_path = resolver::resolve(entry, descriptor, extractor)?;

    let system_dir = firmware::system_dir(&config.firmware_root, platform);
    let save_dir: PathBuf = config.save_root.join(platform);

    Ok(LaunchPlan::new(
        host,
        &core_path,
        &rom_path,
        &system_dir,
        &save_dir,
        config.display,
    ))
}

/// Spawn the host with inherited stdio and wait for it.
fn run_host(plan: &LaunchPlan) -> Result<Option<i32>> {
    let executable =
        which::which(&plan.program).map_err(|_| LaunchError::HostMissing(plan.program.clone()))?;

    tracing::info!("Running host: {}", plan.command_line());

    let status = match plan.command(&executable).status() {
        Ok(status) => status,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LaunchError::HostMissing(plan.program.clone()));
        }
        Err(e) => return Err(LaunchError::io(&executable, e)),
    };

    if !status.success() {
        match status.code() {
            Some(code) => tracing::warn!("{} exited with code {}", plan.program, code),
            None => tracing::warn!("{} terminated by signal", plan.program),
        }
    }

    Ok(status.code())
}
