//! The compiled plan: ordered block placements the host runtime
//! interprets literally.

use crate::error::Result;

/// Placement tag of one plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Block {
    /// Event header.
    DiamondBlock,
    /// Function header.
    LapisBlock,
    /// Loop header.
    EmeraldBlock,
    /// Leaf action (conditions included).
    IronBlock,
    /// Function-call action.
    NetherBrick,
    /// Row separator.
    Newline,
    /// Closes a nested condition scope.
    Skip,
}

/// Literal args value for an action whose chest stays empty.
pub const NO_ARGS: &str = "no";

/// One output row of the compiled plan. Order across entries is
/// load-bearing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlanEntry {
    pub block: Block,
    /// UI-facing `sign-pair` string; empty on layout entries.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// `"no"` or comma-joined `slot(N)=<value>` tokens.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub args: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

impl PlanEntry {
    #[must_use]
    pub fn action(block: Block, name: impl Into<String>, args: impl Into<String>) -> Self {
        Self { block, name: name.into(), args: args.into(), negated: false }
    }

    #[must_use]
    pub fn layout(block: Block) -> Self {
        Self { block, name: String::new(), args: String::new(), negated: false }
    }

    /// Layout entries separate and close; they never count toward the
    /// per-row action budget.
    #[must_use]
    pub fn is_layout(&self) -> bool {
        matches!(self.block, Block::Newline | Block::Skip)
    }

    /// Row headers open a new row and do not count as actions either.
    #[must_use]
    pub fn is_header(&self) -> bool {
        matches!(self.block, Block::DiamondBlock | Block::LapisBlock | Block::EmeraldBlock)
    }
}

/// The ordered result of one compilation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    /// Canonical on-disk form: two-space indent, trailing newline.
    #[must_use]
    pub fn render_json(&self) -> String {
        let mut out = serde_json::to_string_pretty(self).expect("plan serializes");
        out.push('\n');
        out
    }

    pub fn parse_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
