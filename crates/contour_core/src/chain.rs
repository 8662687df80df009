//! Signal Path Routing
//!
//! The equalizer input feeds exactly one entry stage: either the fixed
//! highpass (which then feeds the low shelf) or the low shelf directly. The
//! rest of the chain never changes. Response aggregation walks the same path,
//! so the drawn curve always matches what audio passes through.

use contour_dsp::FilterKind;
use serde::{Deserialize, Serialize};

/// Path with the highpass switched out
const SHELF_PATH: [FilterKind; 4] = [
    FilterKind::LowShelf,
    FilterKind::Peaking,
    FilterKind::HighShelf,
    FilterKind::Lowpass,
];

/// Path with the highpass in front of the low shelf
const HIGHPASS_PATH: [FilterKind; 5] = [
    FilterKind::Highpass,
    FilterKind::LowShelf,
    FilterKind::Peaking,
    FilterKind::HighShelf,
    FilterKind::Lowpass,
];

/// First stage of the live signal path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStage {
    /// Input feeds the low shelf directly
    #[default]
    LowShelf,
    /// Input feeds the highpass, which feeds the low shelf
    Highpass,
}

impl EntryStage {
    pub fn from_highpass_enabled(enabled: bool) -> Self {
        if enabled {
            EntryStage::Highpass
        } else {
            EntryStage::LowShelf
        }
    }

    pub fn highpass_enabled(self) -> bool {
        self == EntryStage::Highpass
    }

    /// The filter kind the input is wired to
    pub fn kind(self) -> FilterKind {
        match self {
            EntryStage::LowShelf => FilterKind::LowShelf,
            EntryStage::Highpass => FilterKind::Highpass,
        }
    }

    /// Stages on the live path, in processing order
    pub fn signal_path(self) -> &'static [FilterKind] {
        match self {
            EntryStage::LowShelf => &SHELF_PATH,
            EntryStage::Highpass => &HIGHPASS_PATH,
        }
    }
}
