// ABOUTME: Capability-driven resolution of placeholder mode and transmission medium
// ABOUTME: Probes the terminal for "auto" settings and enforces the placeholder span limit

use super::sizing::SizeConstraints;
use crate::cli::{MediumChoice, PlaceholderMode};
use kgp_sdk::query::{probe_medium, probe_unicode_placeholders};
use kgp_sdk::{MAX_PLACEHOLDER_SPAN, MediumKind, PixelFormat, TerminalEnvironment};

/// Preference order when probing for a medium
const AUTO_MEDIUM_ORDER: [MediumKind; 3] = [
    MediumKind::SharedMemory,
    MediumKind::TempFile,
    MediumKind::Direct,
];

pub fn resolve_placeholders(
    mode: PlaceholderMode,
    limits: &SizeConstraints,
    env: &TerminalEnvironment,
) -> bool {
    resolve_placeholders_with(mode, limits, || probe_unicode_placeholders(env))
}

pub fn resolve_placeholders_with<P>(mode: PlaceholderMode, limits: &SizeConstraints, probe: P) -> bool
where
    P: FnOnce() -> bool,
{
    let enabled = match mode {
        PlaceholderMode::On => true,
        PlaceholderMode::Off => false,
        PlaceholderMode::Auto => probe(),
    };

    if enabled {
        if let Some((name, value)) = oversized_span(limits) {
            log::warn!(
                "{} for Unicode Placeholder cannot exceed {} (got {}), disabling Unicode Placeholder",
                name,
                MAX_PLACEHOLDER_SPAN,
                value
            );
            return false;
        }
    }

    log::debug!(
        "Unicode Placeholder support: {}",
        if enabled { "enabled" } else { "disabled" }
    );
    enabled
}

fn oversized_span(limits: &SizeConstraints) -> Option<(&'static str, u32)> {
    [
        ("display width", limits.cols),
        ("display height", limits.rows),
        ("max-cols", limits.max_cols),
        ("max-rows", limits.max_rows),
    ]
    .into_iter()
    .find_map(|(name, value)| match value {
        Some(v) if v as usize > MAX_PLACEHOLDER_SPAN => Some((name, v)),
        _ => None,
    })
}

pub fn resolve_medium(choice: MediumChoice, png: bool, env: &TerminalEnvironment) -> MediumKind {
    resolve_medium_with(choice, png, |kind, format| probe_medium(kind, format, env))
}

pub fn resolve_medium_with<P>(choice: MediumChoice, png: bool, mut probe: P) -> MediumKind
where
    P: FnMut(MediumKind, PixelFormat) -> bool,
{
    let kind = match choice.fixed() {
        Some(kind) => kind,
        None => {
            let format = if png {
                PixelFormat::Png
            } else {
                PixelFormat::Rgba32
            };
            AUTO_MEDIUM_ORDER
                .into_iter()
                .find(|kind| probe(*kind, format))
                .unwrap_or_else(|| {
                    log::warn!(
                        "No supported transmission medium detected, defaulting to direct transmission"
                    );
                    MediumKind::Direct
                })
        }
    };

    log::debug!("Transmission medium: {}", kind);
    kind
}
