//! TrueType font registration for PNG labels.
//!
//! plotters is built with the `ab_glyph` text backend, which has no system
//! font discovery. The first readable font among the configured path and a
//! few well-known locations is registered once per process. Without one the
//! PNG is still drawn, just without text.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const FONT_FAMILY: &str = "closeplot-sans";

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Register a label font if none is registered yet. Returns whether text can
/// be drawn. Only the first call's `preferred` path is considered.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    *REGISTERED.get_or_init(|| {
        let paths = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(CANDIDATES.iter().map(PathBuf::from));
        for path in paths {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
                debug!(path = %path.display(), "registered chart font");
                return true;
            }
        }
        warn!("no usable TrueType font found; PNG will be drawn without text");
        false
    })
}
