//! Row auto-splitting.
//!
//! The runtime caps a row at a fixed number of actions. Pass 1 walks
//! the lowered rows and splits overflow through trampoline functions
//! (or newline continuations inside nested condition scopes). Pass 2
//! collapses call-only trampolines, pass 3 promotes trampoline bodies
//! into single-call user functions. Passes 2 and 3 run to a fixed point
//! and are idempotent.

use std::collections::VecDeque;

use super::plan::{Block, NO_ARGS, PlanEntry};
use crate::{
    config::Config,
    error::{Error, Result},
};

/// Lowered statement tree of one row: leaf actions and nested condition
/// scopes.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf(PlanEntry),
    Scope { cond: PlanEntry, body: Vec<Node> },
}

impl Node {
    fn size(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Scope { body, .. } => 1 + body.iter().map(Self::size).sum::<usize>(),
        }
    }
}

/// One row awaiting emission: header plus its statement tree.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub header: PlanEntry,
    pub nodes: Vec<Node>,
}

/// How the splitter emits a trampoline call.
#[derive(Debug, Clone)]
pub(crate) struct CallTemplate {
    pub entry_name: String,
    pub slot: usize,
}

impl CallTemplate {
    pub(crate) fn make(&self, target: &str) -> PlanEntry {
        PlanEntry::action(Block::NetherBrick, self.entry_name.clone(), format!("slot({})=text({target})", self.slot))
    }
}

struct RowWriter<'a> {
    out: Vec<PlanEntry>,
    queue: VecDeque<(Row, usize)>,
    call: &'a CallTemplate,
    budget: usize,
    max_depth: usize,
    auto_id: usize,
}

/// Pass 1: emits rows under the per-row budget, generating trampoline
/// rows as needed. One action slot is always reserved for the closing
/// brace, so the budget is `call_limit - 1`.
pub(crate) fn write_rows(rows: Vec<Row>, call: &CallTemplate, config: &Config) -> Result<Vec<PlanEntry>> {
    let budget = config.call_limit.saturating_sub(1);
    if budget == 0 {
        return Err(Error::RowLimit(format!(
            "per-row call limit {} leaves no action slots (one reserved for closing '}}')",
            config.call_limit
        )));
    }
    let mut writer = RowWriter {
        out: Vec::new(),
        queue: rows.into_iter().map(|r| (r, 0usize)).collect(),
        call,
        budget,
        max_depth: config.max_split_depth,
        auto_id: 0,
    };
    while let Some((row, depth)) = writer.queue.pop_front() {
        if !writer.out.is_empty() {
            writer.out.push(PlanEntry::layout(Block::Newline));
        }
        writer.emit_row(&row, depth)?;
    }
    Ok(writer.out)
}

struct RowState {
    header: PlanEntry,
    count: usize,
    open_conds: Vec<PlanEntry>,
    part: usize,
}

impl RowWriter<'_> {
    fn emit_row(&mut self, row: &Row, depth: usize) -> Result<()> {
        self.out.push(row.header.clone());
        let mut state = RowState { header: row.header.clone(), count: 0, open_conds: Vec::new(), part: 0 };
        self.emit_top_nodes(&row.nodes, &mut state, depth)
    }

    fn emit_top_nodes(&mut self, nodes: &[Node], state: &mut RowState, depth: usize) -> Result<()> {
        let mut i = 0;
        while i < nodes.len() {
            let node = &nodes[i];
            let remaining = nodes.len() - i;
            // Keep one slot free for a trampoline call whenever more
            // nodes follow.
            let avail = if remaining > 1 { self.budget - 1 } else { self.budget };
            if state.count + node.size() > avail {
                if let Node::Scope { cond, body } = node
                    && state.count == 0
                {
                    // The scope alone overflows a fresh row: split it
                    // internally with newline continuations.
                    self.emit_scope(cond, body, state)?;
                    i += 1;
                    continue;
                }
                return self.trampoline(&nodes[i..], state, depth);
            }
            match node {
                Node::Leaf(entry) => {
                    self.out.push(entry.clone());
                    state.count += 1;
                }
                Node::Scope { cond, body } => self.emit_scope(cond, body, state)?,
            }
            i += 1;
        }
        Ok(())
    }

    fn emit_scope(&mut self, cond: &PlanEntry, body: &[Node], state: &mut RowState) -> Result<()> {
        if state.count + 1 > self.budget {
            self.continuation(state)?;
        }
        self.out.push(cond.clone());
        state.count += 1;
        state.open_conds.push(cond.clone());
        for child in body {
            match child {
                Node::Leaf(entry) => {
                    if state.count + 1 > self.budget {
                        self.continuation(state)?;
                    }
                    self.out.push(entry.clone());
                    state.count += 1;
                }
                Node::Scope { cond, body } => self.emit_scope(cond, body, state)?,
            }
        }
        state.open_conds.pop();
        self.out.push(PlanEntry::layout(Block::Skip));
        Ok(())
    }

    /// Ends the current physical row and reopens the scope chain on a
    /// continuation row: the row header again, then every open
    /// condition.
    fn continuation(&mut self, state: &mut RowState) -> Result<()> {
        self.out.push(PlanEntry::layout(Block::Newline));
        self.out.push(state.header.clone());
        state.count = 0;
        for cond in &state.open_conds {
            self.out.push(cond.clone());
            state.count += 1;
        }
        if state.count >= self.budget {
            return Err(Error::RowLimit(format!(
                "scope headers fill the whole row ({} of {} slots, one reserved for closing '}}')",
                state.count, self.budget
            )));
        }
        Ok(())
    }

    /// Moves the overflow tail into a fresh auto-named function and
    /// emits the call that replaces it.
    fn trampoline(&mut self, tail: &[Node], state: &mut RowState, depth: usize) -> Result<()> {
        if depth + 1 > self.max_depth {
            return Err(Error::RowLimit(format!("auto-split recursion exceeded {} levels", self.max_depth)));
        }
        // A row filled to the brim by a nested scope still needs a slot
        // for the call itself.
        if state.count >= self.budget {
            self.continuation(state)?;
        }
        self.auto_id += 1;
        state.part += 1;
        let target = format!("__autosplit_row_{}", self.auto_id);
        self.out.push(self.call.make(&target));
        state.count += 1;
        eprintln!("[warn] row auto-split: row '{}' part#{} -> call({target})", state.header.name, state.part);
        let header = PlanEntry::action(Block::LapisBlock, target, NO_ARGS);
        self.queue.push_back((Row { header, nodes: tail.to_vec() }, depth + 1));
        Ok(())
    }
}

/// Splits a flat entry list into rows at `newline` separators.
fn into_rows(entries: &[PlanEntry]) -> Vec<Vec<PlanEntry>> {
    let mut rows = vec![Vec::new()];
    for entry in entries {
        if entry.block == Block::Newline {
            rows.push(Vec::new());
        } else {
            rows.last_mut().expect("non-empty").push(entry.clone());
        }
    }
    rows.retain(|r| !r.is_empty());
    rows
}

fn join_rows(rows: Vec<Vec<PlanEntry>>) -> Vec<PlanEntry> {
    let mut out = Vec::new();
    for (i, row) in rows.into_iter().enumerate() {
        if i > 0 {
            out.push(PlanEntry::layout(Block::Newline));
        }
        out.extend(row);
    }
    out
}

/// Extracts the call target of a single-token function-call entry.
fn call_target(entry: &PlanEntry) -> Option<&str> {
    if entry.block != Block::NetherBrick || entry.args.contains(',') {
        return None;
    }
    entry.args.split_once("=text(")?.1.strip_suffix(')')
}

fn retarget(entry: &mut PlanEntry, new_target: &str) {
    if let Some((prefix, _)) = entry.args.split_once("=text(") {
        entry.args = format!("{prefix}=text({new_target})");
    }
}

fn is_auto_name(name: &str) -> bool {
    name.starts_with("__autosplit_row_")
}

/// The header + single-call body shape both post-passes look for.
fn single_call_body(row: &[PlanEntry]) -> Option<String> {
    let (header, tail) = row.split_first()?;
    if header.block != Block::LapisBlock {
        return None;
    }
    let actions: Vec<&PlanEntry> = tail.iter().filter(|e| !e.is_layout()).collect();
    match actions.as_slice() {
        [only] => call_target(only).map(str::to_owned),
        _ => None,
    }
}

/// Pass 2: drops any auto function whose body is exactly one call to
/// another auto function, rewriting callers to the final target.
/// Returns the rewritten list and how many trampolines were removed.
#[must_use]
pub fn collapse_autosplit_trampolines(entries: &[PlanEntry]) -> (Vec<PlanEntry>, usize) {
    let mut rows = into_rows(entries);
    let mut collapsed = 0usize;
    loop {
        let mut mapping: Vec<(String, String)> = Vec::new();
        for row in &rows {
            let Some(header) = row.first() else { continue };
            if !is_auto_name(&header.name) {
                continue;
            }
            if let Some(target) = single_call_body(row)
                && is_auto_name(&target)
            {
                mapping.push((header.name.clone(), target));
            }
        }
        if mapping.is_empty() {
            break;
        }
        collapsed += mapping.len();
        let resolve = |name: &str| -> String {
            let mut current = name.to_owned();
            // Follow chains, guarding against accidental cycles.
            for _ in 0..mapping.len() {
                match mapping.iter().find(|(from, _)| *from == current) {
                    Some((_, to)) => current = to.clone(),
                    None => break,
                }
            }
            current
        };
        rows.retain(|row| row.first().is_none_or(|h| !mapping.iter().any(|(from, _)| *from == h.name)));
        for row in &mut rows {
            for entry in row.iter_mut() {
                if let Some(target) = call_target(entry).map(str::to_owned)
                    && mapping.iter().any(|(from, _)| *from == target)
                {
                    retarget(entry, &resolve(&target));
                }
            }
        }
    }
    (join_rows(rows), collapsed)
}

/// Pass 3: a user function whose body is exactly one call to an auto
/// function absorbs that function's body, keeping its own identity.
#[must_use]
pub fn promote_autosplit_targets(entries: &[PlanEntry]) -> (Vec<PlanEntry>, usize) {
    let mut rows = into_rows(entries);
    let mut promoted = 0usize;
    loop {
        let mut found: Option<(usize, usize, String)> = None;
        'outer: for (i, row) in rows.iter().enumerate() {
            let Some(header) = row.first() else { continue };
            if header.block != Block::LapisBlock || is_auto_name(&header.name) {
                continue;
            }
            let Some(target) = single_call_body(row) else { continue };
            if !is_auto_name(&target) {
                continue;
            }
            // The auto function must have exactly this one caller.
            let references: usize = rows
                .iter()
                .flat_map(|r| r.iter())
                .filter(|e| call_target(e) == Some(target.as_str()))
                .count();
            if references != 1 {
                continue;
            }
            for (j, candidate) in rows.iter().enumerate() {
                if candidate.first().is_some_and(|h| h.block == Block::LapisBlock && h.name == target) {
                    found = Some((i, j, target));
                    break 'outer;
                }
            }
        }
        let Some((wrapper_idx, auto_idx, target)) = found else { break };
        let auto_body: Vec<PlanEntry> = rows[auto_idx][1..].to_vec();
        let wrapper = &mut rows[wrapper_idx];
        let call_pos = wrapper
            .iter()
            .position(|e| call_target(e) == Some(target.as_str()))
            .expect("single-call body located above");
        wrapper.splice(call_pos..=call_pos, auto_body);
        rows.remove(auto_idx);
        promoted += 1;
    }
    (join_rows(rows), promoted)
}
