//! Built-in platform table written to `platforms.json` on first use.

use std::collections::BTreeMap;

use super::{ArchivePolicy, PlatformDescriptor};

fn descriptor(
    core: &str,
    extensions: &[&str],
    archive_policy: ArchivePolicy,
    cache_extracted: bool,
    firmware: &[(&str, &str)],
) -> PlatformDescriptor {
    PlatformDescriptor {
        core_filename: format!("{}_libretro", core),
        extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        archive_policy,
        cache_extracted,
        firmware_required: !firmware.is_empty(),
        firmware_files: firmware
            .iter()
            .map(|(file, desc)| (file.to_string(), desc.to_string()))
            .collect(),
    }
}

/// Default descriptors keyed by platform display name.
pub fn builtin_platforms() -> BTreeMap<String, PlatformDescriptor> {
    use ArchivePolicy::{Extract, Native};

    let table = [
        (
            "Amiga",
            descriptor(
                "puae",
                &[".adf", ".adz", ".dms", ".fdi", ".ipf", ".hdf", ".hdz", ".lha", ".m3u"],
                Extract,
                true,
                &[
                    ("kick34005.A500", "Kickstart v1.3 rev 34.005 (A500)"),
                    ("kick40063.A600", "Kickstart v3.1 rev 40.063 (A600)"),
                    ("kick40068.A1200", "Kickstart v3.1 rev 40.068 (A1200)"),
                ],
            ),
        ),
        (
            "Atari 2600",
            descriptor("stella", &[".bin", ".a26", ".zip"], Native, false, &[]),
        ),
        (
            "Atari 7800",
            descriptor("prosystem", &[".a78", ".bin", ".zip"], Native, false, &[]),
        ),
        (
            "Commodore 64",
            descriptor(
                "vice_x64sc",
                &[".d64", ".g64", ".t64", ".tap", ".prg", ".crt"],
                Extract,
                true,
                &[],
            ),
        ),
        (
            "Game Boy",
            descriptor("gambatte", &[".gb", ".gbc", ".zip"], Native, false, &[]),
        ),
        (
            "Game Boy Advance",
            descriptor("mgba", &[".gba", ".zip"], Native, false, &[]),
        ),
        (
            "MSX",
            descriptor(
                "bluemsx",
                &[".rom", ".mx1", ".mx2", ".dsk", ".cas"],
                Extract,
                true,
                &[],
            ),
        ),
        (
            "NES",
            descriptor("fceumm", &[".nes", ".fds", ".unf", ".zip"], Native, false, &[]),
        ),
        (
            "PlayStation",
            descriptor(
                "pcsx_rearmed",
                &[".cue", ".bin", ".chd", ".pbp", ".m3u"],
                Extract,
                false,
                &[("scph5501.bin", "PlayStation BIOS (NTSC-U)")],
            ),
        ),
        (
            "Sega Genesis",
            descriptor(
                "genesis_plus_gx",
                &[".md", ".gen", ".smd", ".bin", ".zip"],
                Native,
                false,
                &[],
            ),
        ),
        (
            "SNES",
            descriptor("snes9x", &[".sfc", ".smc", ".zip"], Native, false, &[]),
        ),
        (
            "ZX Spectrum",
            descriptor(
                "fuse",
                &[".tap", ".tzx", ".z80", ".sna", ".dsk", ".trd", ".scl"],
                Extract,
                true,
                &[],
            ),
        ),
    ];

    table
        .into_iter()
        .map(|(name, descriptor)| (name.to_string(), descriptor))
        .collect()
}
