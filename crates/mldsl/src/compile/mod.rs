//! The DSL compiler: source text in, ordered plan out.
//!
//! Staged like the rest of the crate: parse (source → statements),
//! lower (statements → rows of entries, args coerced and macros
//! expanded), split (rows → flat entries under the per-row budget),
//! then the collapse/promote post-passes.

mod ast;
mod call;
mod emit;
mod expr;
mod plan;
mod resolve;
mod source;
mod split;
mod vfunc;

pub use self::{
    plan::{Block, NO_ARGS, Plan, PlanEntry},
    split::{collapse_autosplit_trampolines, promote_autosplit_targets},
};
use crate::{api::ApiMap, config::Config, error::Result};

/// Compiles DSL source against a normalized API surface.
///
/// The returned plan is fully assembled in memory; nothing is written
/// anywhere on failure. Warnings (unresolved lines, auto-splits) go to
/// stderr as single lines.
pub fn compile_source(source_text: &str, api: &ApiMap, config: &Config) -> Result<Plan> {
    let program = source::parse_program(source_text)?;
    let (rows, call_template) = emit::lower_program(&program, api, config)?;
    let entries = split::write_rows(rows, &call_template, config)?;
    let (entries, _) = collapse_autosplit_trampolines(&entries);
    let (entries, _) = promote_autosplit_targets(&entries);
    Ok(Plan { entries })
}
