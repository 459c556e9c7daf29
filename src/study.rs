//! Methods and conditions compared in the force user study.
//!
//! The tables here are the only place that knows which methods a condition
//! requires and how folder prefixes map to methods.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A video-generation approach under comparison.
///
/// Declaration order is the order methods appear in a condition's entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ForcePrompting,
    TextInference,
    OursAutoregressive,
    KlingMotionBrush,
}

/// Folder-name prefixes checked in order; the first match wins.
pub const METHOD_PREFIXES: [(&str, Method); 4] = [
    ("kling_motion_brush_", Method::KlingMotionBrush),
    ("ours_autoregressive_", Method::OursAutoregressive),
    ("force_prompting_", Method::ForcePrompting),
    ("text_inference_", Method::TextInference),
];

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::ForcePrompting => "force_prompting",
            Method::TextInference => "text_inference",
            Method::OursAutoregressive => "ours_autoregressive",
            Method::KlingMotionBrush => "kling_motion_brush",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An experimental setup evaluated in the study.
///
/// `Ord` follows the canonical processing order, which is also the key order
/// of the manifest's `conditions` object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Wind,
    Point,
    WindChange,
    PointChange,
}

const THREE_WAY: &[Method] = &[
    Method::ForcePrompting,
    Method::TextInference,
    Method::OursAutoregressive,
];

const FOUR_WAY: &[Method] = &[
    Method::ForcePrompting,
    Method::TextInference,
    Method::OursAutoregressive,
    Method::KlingMotionBrush,
];

impl Condition {
    /// Canonical processing order.
    pub const ALL: [Condition; 4] = [
        Condition::Wind,
        Condition::Point,
        Condition::WindChange,
        Condition::PointChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Wind => "wind",
            Condition::Point => "point",
            Condition::WindChange => "wind_change",
            Condition::PointChange => "point_change",
        }
    }

    /// Methods that must all provide a case for it to be included.
    pub fn required_methods(self) -> &'static [Method] {
        match self {
            Condition::Wind | Condition::WindChange => THREE_WAY,
            Condition::Point | Condition::PointChange => FOUR_WAY,
        }
    }

    /// Apply the `_change` variant to a base condition.
    pub fn with_change(self, change: bool) -> Condition {
        match (self, change) {
            (Condition::Wind | Condition::WindChange, false) => Condition::Wind,
            (Condition::Wind | Condition::WindChange, true) => Condition::WindChange,
            (Condition::Point | Condition::PointChange, false) => Condition::Point,
            (Condition::Point | Condition::PointChange, true) => Condition::PointChange,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
