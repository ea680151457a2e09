// ABOUTME: Capability query engine asking the terminal which media and formats it accepts
// ABOUTME: Builds per-medium query frames, runs the probe battery and collects a report

pub mod environment;
pub mod probe;
pub mod terminal;

pub use environment::TerminalEnvironment;
pub use probe::{ProbeExit, ProbeOutcome, QueryProbe, ResponseScanner, exchange, run_probe};
pub use terminal::{ModeGuard, QueryTerminal, ReadOutcome, Tty};

use crate::constants::envelope::{APC_CLOSE, APC_OPEN, FENCE_QUERY, FENCE_REPLY_PATTERN};
use crate::error::KgpError;
use crate::frame::Frame;
use crate::medium::{MediumKind, TransmissionMedium};
use crate::options::{Action, ControlOptions};
use crate::types::{ImageId, PixelFormat, PixelGrid};
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::time::Duration;

/// Name of the placeholder entry in a report
pub const UNICODE_PLACEHOLDERS: &str = "Unicode Placeholders";

const MEDIA: [MediumKind; 3] = [
    MediumKind::Direct,
    MediumKind::SharedMemory,
    MediumKind::TempFile,
];

const FORMATS: [PixelFormat; 3] = [PixelFormat::Rgba32, PixelFormat::Rgb24, PixelFormat::Png];

const MOCK_RGBA: [u8; 4] = [0; 4];
const MOCK_RGB: [u8; 3] = [0; 3];

/// Smallest valid PNG: one transparent pixel
const MOCK_PNG: [u8; 70] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xf8,
    0xff, 0xff, 0x7f, 0x03, 0x00, 0x09, 0x7c, 0x03, 0x7e, 0x91, 0xe5, 0x09, 0x4d, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Pixel data for a 1x1 image in `format`
pub fn mock_data(format: PixelFormat) -> &'static [u8] {
    match format {
        PixelFormat::Rgba32 => &MOCK_RGBA,
        PixelFormat::Rgb24 => &MOCK_RGB,
        PixelFormat::Png => &MOCK_PNG,
    }
}

/// Report label for a medium/format pair, e.g. "Direct Transmission (32bit)"
pub fn capability_name(kind: MediumKind, format: PixelFormat) -> String {
    format!("{} ({})", kind.label(), format.label())
}

/// Query frame plus fence for a medium already holding the mock data
pub fn build_probe(
    image_id: ImageId,
    format: PixelFormat,
    medium: &TransmissionMedium,
    timeout: Duration,
) -> Result<QueryProbe, KgpError> {
    let options = ControlOptions::builder()
        .image_id(image_id)
        .action(Action::Query)
        .format(format)
        .medium(medium.kind())
        .pixels(PixelGrid {
            width: 1,
            height: 1,
        })
        .compressed(medium.compressed())
        .build()
        .to_string();

    let mut code = Frame::single(&options, medium.payload()).to_string();
    code.push_str(FENCE_QUERY);

    let success = format!(
        "{}i={};OK{}",
        regex::escape(APC_OPEN),
        image_id,
        regex::escape(APC_CLOSE)
    );

    Ok(QueryProbe {
        code,
        success: Regex::new(&success)
            .map_err(|e| KgpError::Probe(format!("invalid success pattern: {}", e)))?,
        fence: Regex::new(FENCE_REPLY_PATTERN)
            .map_err(|e| KgpError::Probe(format!("invalid fence pattern: {}", e)))?,
        timeout,
    })
}

/// Ask the controlling terminal whether it accepts `format` over `kind`
pub fn probe_medium(kind: MediumKind, format: PixelFormat, env: &TerminalEnvironment) -> bool {
    probe_medium_with(kind, format, env, Tty::open)
}

/// Same as [`probe_medium`] with a caller-supplied terminal.
///
/// The terminal is opened before any medium exists so an unavailable
/// terminal never leaves a segment or file behind.
pub fn probe_medium_with<T, F>(
    kind: MediumKind,
    format: PixelFormat,
    env: &TerminalEnvironment,
    open: F,
) -> bool
where
    T: QueryTerminal,
    F: FnOnce() -> Result<T, KgpError>,
{
    let mut terminal = match open() {
        Ok(terminal) => terminal,
        Err(e) => {
            log::debug!("Skipping {} probe: {}", capability_name(kind, format), e);
            return false;
        }
    };

    let image_id = ImageId::random();
    let mut medium = match TransmissionMedium::create(image_id, mock_data(format), kind) {
        Ok(medium) => medium,
        Err(e) => {
            log::debug!("Cannot create {} medium for probe: {}", kind, e);
            return false;
        }
    };

    let supported = match build_probe(image_id, format, &medium, env.probe_timeout()) {
        Ok(probe) => run_probe(&mut terminal, &probe),
        Err(e) => {
            log::debug!("Cannot build probe: {}", e);
            false
        }
    };

    medium.cleanup();
    supported
}

/// Placeholder support is only probed in terminals known to implement it
pub fn probe_unicode_placeholders(env: &TerminalEnvironment) -> bool {
    probe_unicode_placeholders_with(env, Tty::open)
}

pub fn probe_unicode_placeholders_with<T, F>(env: &TerminalEnvironment, open: F) -> bool
where
    T: QueryTerminal,
    F: FnOnce() -> Result<T, KgpError>,
{
    if !env.may_support_placeholders() {
        log::debug!(
            "Terminal {} is not known to render Unicode placeholders",
            env.terminal_name
        );
        return false;
    }
    probe_medium_with(MediumKind::Direct, PixelFormat::Rgba32, env, open)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub name: String,
    pub supported: bool,
}

/// Ordered capability results; serializes as a name → bool map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityReport {
    entries: Vec<Capability>,
}

impl CapabilityReport {
    pub fn push(&mut self, name: impl Into<String>, supported: bool) {
        self.entries.push(Capability {
            name: name.into(),
            supported,
        });
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.supported)
    }

    pub fn supports(&self, kind: MediumKind, format: PixelFormat) -> bool {
        self.get(&capability_name(kind, format)).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CapabilityReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.supported)?;
        }
        map.end()
    }
}

/// Run the full probe battery against the controlling terminal
pub fn query_capabilities(env: &TerminalEnvironment) -> CapabilityReport {
    query_capabilities_with(env, Tty::open)
}

pub fn query_capabilities_with<T, F>(env: &TerminalEnvironment, mut open: F) -> CapabilityReport
where
    T: QueryTerminal,
    F: FnMut() -> Result<T, KgpError>,
{
    let mut report = CapabilityReport::default();
    report.push(
        UNICODE_PLACEHOLDERS,
        probe_unicode_placeholders_with(env, &mut open),
    );

    for kind in MEDIA {
        for format in FORMATS {
            let supported = probe_medium_with(kind, format, env, &mut open);
            report.push(capability_name(kind, format), supported);
        }
    }

    log::debug!(
        "Capability query finished: {} of {} supported",
        report.iter().filter(|c| c.supported).count(),
        report.len()
    );
    report
}
