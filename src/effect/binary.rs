//! Binary-outcome (2x2) ratio measures
//!
//! ```text
//!              event   no event
//! treatment      a        b
//! control        c        d
//! ```
//!
//! If any cell is zero, 0.5 is added to all four cells before either ratio or
//! its variance is computed.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::EffectSize;
use crate::study::BinaryStudy;

/// Amount added to every cell of a table with a zero cell
pub const CONTINUITY_CORRECTION: f64 = 0.5;

/// 2x2 table cells as reals, possibly continuity-corrected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoByTwo {
    /// Treatment events
    pub a: f64,
    /// Treatment non-events
    pub b: f64,
    /// Control events
    pub c: f64,
    /// Control non-events
    pub d: f64,
    /// Whether [`CONTINUITY_CORRECTION`] was added
    pub corrected: bool,
}

impl TwoByTwo {
    /// Raw table from arm counts, no correction
    #[must_use]
    pub fn from_study(study: &BinaryStudy) -> Self {
        Self {
            a: f64::from(study.treatment.events),
            b: f64::from(study.treatment.non_events()),
            c: f64::from(study.control.events),
            d: f64::from(study.control.non_events()),
            corrected: false,
        }
    }

    /// Whether any cell is zero
    #[must_use]
    pub fn has_zero_cell(&self) -> bool {
        [self.a, self.b, self.c, self.d].contains(&0.0)
    }

    /// Table with the continuity correction applied when a cell is zero
    #[must_use]
    pub fn corrected(study: &BinaryStudy) -> Self {
        let table = Self::from_study(study);
        if table.has_zero_cell() {
            warn!(
                a = table.a,
                b = table.b,
                c = table.c,
                d = table.d,
                correction = CONTINUITY_CORRECTION,
                "zero cell in 2x2 table, applying continuity correction"
            );
            Self {
                a: table.a + CONTINUITY_CORRECTION,
                b: table.b + CONTINUITY_CORRECTION,
                c: table.c + CONTINUITY_CORRECTION,
                d: table.d + CONTINUITY_CORRECTION,
                corrected: true,
            }
        } else {
            table
        }
    }

    /// Treatment-arm risk `a / (a + b)`
    #[must_use]
    pub fn treatment_risk(&self) -> f64 {
        self.a / (self.a + self.b)
    }

    /// Control-arm risk `c / (c + d)`
    #[must_use]
    pub fn control_risk(&self) -> f64 {
        self.c / (self.c + self.d)
    }
}

/// Log risk ratio.
///
/// `ln[(a/(a+b)) / (c/(c+d))]`, variance `1/a - 1/(a+b) + 1/c - 1/(c+d)`,
/// on continuity-corrected cells when any cell is zero.
#[must_use]
pub fn log_risk_ratio(study: &BinaryStudy) -> EffectSize {
    let t = TwoByTwo::corrected(study);
    let estimate = (t.treatment_risk() / t.control_risk()).ln();
    let variance = 1.0 / t.a - 1.0 / (t.a + t.b) + 1.0 / t.c - 1.0 / (t.c + t.d);
    EffectSize::from_variance(estimate, variance)
}

/// Log odds ratio.
///
/// `ln[(a·d) / (b·c)]`, variance `1/a + 1/b + 1/c + 1/d`, on
/// continuity-corrected cells when any cell is zero.
#[must_use]
pub fn log_odds_ratio(study: &BinaryStudy) -> EffectSize {
    let t = TwoByTwo::corrected(study);
    let estimate = ((t.a * t.d) / (t.b * t.c)).ln();
    let variance = 1.0 / t.a + 1.0 / t.b + 1.0 / t.c + 1.0 / t.d;
    EffectSize::from_variance(estimate, variance)
}
