//! Invariant checks for study records

use super::{
    BinaryArm, BinaryStudy, ContinuousArm, ContinuousStudy, DiagnosticStudy, ProportionStudy,
};
use crate::{Error, Result};

pub(super) fn continuous(study: &ContinuousStudy, label: &str) -> Result<()> {
    continuous_arm(&study.treatment, "treatment", label)?;
    continuous_arm(&study.control, "control", label)
}

fn continuous_arm(arm: &ContinuousArm, arm_name: &str, label: &str) -> Result<()> {
    if arm.n == 0 {
        return Err(Error::invalid_study(
            label,
            format!("{arm_name} sample size must be at least 1"),
        ));
    }
    if !arm.mean.is_finite() {
        return Err(Error::invalid_study(
            label,
            format!("{arm_name} mean is not finite ({})", arm.mean),
        ));
    }
    if !arm.sd.is_finite() || arm.sd < 0.0 {
        return Err(Error::invalid_study(
            label,
            format!("{arm_name} SD must be finite and non-negative ({})", arm.sd),
        ));
    }
    Ok(())
}

pub(super) fn binary(study: &BinaryStudy, label: &str) -> Result<()> {
    binary_arm(&study.treatment, "treatment", label)?;
    binary_arm(&study.control, "control", label)
}

fn binary_arm(arm: &BinaryArm, arm_name: &str, label: &str) -> Result<()> {
    counts(arm.events, arm.total, arm_name, label)
}

pub(super) fn proportion(study: &ProportionStudy, label: &str) -> Result<()> {
    counts(study.events, study.total, "arm", label)
}

fn counts(events: u32, total: u32, arm_name: &str, label: &str) -> Result<()> {
    if total == 0 {
        return Err(Error::invalid_study(
            label,
            format!("{arm_name} total must be at least 1"),
        ));
    }
    if events > total {
        return Err(Error::invalid_study(
            label,
            format!("{arm_name} events ({events}) exceed total ({total})"),
        ));
    }
    Ok(())
}

pub(super) fn diagnostic(study: &DiagnosticStudy, label: &str) -> Result<()> {
    if study.tp == 0 && study.fn_ == 0 {
        return Err(Error::invalid_study(
            label,
            "tp + fn is zero, sensitivity is undefined",
        ));
    }
    if study.tn == 0 && study.fp == 0 {
        return Err(Error::invalid_study(
            label,
            "tn + fp is zero, specificity is undefined",
        ));
    }
    Ok(())
}
