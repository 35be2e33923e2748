//! Pattern modes: one immutable row per pattern type.
//!
//! Each row decides how many candles to fetch, which endpoint the auto actions
//! hit, what the request body looks like and how the response is read. Adding a
//! mode is a data-only change here.

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::config::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum ModeId {
    #[strum(to_string = "fvg")]
    Fvg,
    #[strum(to_string = "ob")]
    OrderBlock,
    #[strum(to_string = "breaker")]
    BreakerBlock,
}

/// Extra fields the request body carries on top of `candles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `{candles}`
    CandlesOnly,
    /// `{candles, direction, require_displacement, min_body_ratio}`
    OrderBlock,
    /// `{candles, direction}`
    WithDirection,
}

/// Which field names carry the verdict in the endpoint's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `is_fvg | found | success`, optional `reason`
    FlagWithReason,
    /// `ok` plus non-empty `matches[]` with `ob` zones
    OrderBlockMatches,
    /// `ok`, reason under `info.reason`
    OkWithInfo,
    /// `is_ob`, `direction`, `reason`
    ManualOrderBlock,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeAction {
    pub key: &'static str,
    pub label: &'static str,
    pub direction: Option<Direction>,
}

#[derive(Debug, PartialEq)]
pub struct ModeConfig {
    pub id: ModeId,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub endpoint: &'static str,
    pub candle_amount: usize,
    pub actions: &'static [ModeAction],
    /// Show the manual role-tagging panel for this mode.
    pub manual_selection: bool,
    pub request: RequestShape,
    pub response: ResponseShape,
}

impl ModeConfig {
    pub fn action(&self, key: &str) -> Option<&'static ModeAction> {
        self.actions.iter().find(|a| a.key == key)
    }
}

pub const MODES: &[ModeConfig] = &[
    ModeConfig {
        id: ModeId::Fvg,
        title: "Fair Value Gaps",
        subtitle: "ICT Training · FVG only",
        endpoint: "check_fvg",
        candle_amount: 3,
        actions: &[ModeAction {
            key: "check_fvg",
            label: "Check FVG",
            direction: None,
        }],
        manual_selection: false,
        request: RequestShape::CandlesOnly,
        response: ResponseShape::FlagWithReason,
    },
    ModeConfig {
        id: ModeId::OrderBlock,
        title: "Order Blocks",
        subtitle: "ICT Training · Bullish & Bearish OB · Manual pattern helper",
        endpoint: "check_order_block",
        candle_amount: 43,
        actions: &[
            ModeAction {
                key: "bull_ob",
                label: "Bullish Order Block",
                direction: Some(Direction::Bullish),
            },
            ModeAction {
                key: "bear_ob",
                label: "Bearish Order Block",
                direction: Some(Direction::Bearish),
            },
        ],
        manual_selection: true,
        request: RequestShape::OrderBlock,
        response: ResponseShape::OrderBlockMatches,
    },
    ModeConfig {
        id: ModeId::BreakerBlock,
        title: "Breaker Blocks",
        subtitle: "ICT Training · Bullish & Bearish Breakers",
        endpoint: "check_breaker_block",
        candle_amount: 43,
        actions: &[
            ModeAction {
                key: "bull_bb",
                label: "Bullish Breaker Block",
                direction: Some(Direction::Bullish),
            },
            ModeAction {
                key: "bear_bb",
                label: "Bearish Breaker Block",
                direction: Some(Direction::Bearish),
            },
        ],
        manual_selection: false,
        request: RequestShape::WithDirection,
        response: ResponseShape::OkWithInfo,
    },
];

pub const DEFAULT_MODE: ModeId = ModeId::Fvg;

/// Title/shape used for the manual confirm, which is not a mode of its own.
pub const MANUAL_TITLE: &str = "Manual OB";
pub const MANUAL_RESPONSE: ResponseShape = ResponseShape::ManualOrderBlock;

pub fn mode(id: ModeId) -> &'static ModeConfig {
    MODES.iter().find(|m| m.id == id).unwrap_or(&MODES[0])
}

/// Look a mode up by its string id; unknown or missing ids get the default mode.
pub fn lookup(mode_id: Option<&str>) -> &'static ModeConfig {
    let id = mode_id
        .and_then(|s| ModeId::from_str(s.trim()).ok())
        .unwrap_or(DEFAULT_MODE);
    mode(id)
}
