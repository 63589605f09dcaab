//! Statement-level AST of the DSL, with source line numbers carried for
//! error reporting.

use crate::api::SelectScope;

/// A parsed source file: top-level blocks plus vfunc macro definitions.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub tops: Vec<TopBlock>,
    pub vfuncs: Vec<VfuncDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopKind {
    Event,
    Func,
    Loop,
}

/// `event("NAME") { … }`, `func NAME(params?) { … }` or
/// `loop(NAME, TICKS?) { … }`.
#[derive(Debug, Clone)]
pub struct TopBlock {
    pub kind: TopKind,
    pub name: String,
    /// Loop interval in ticks, verbatim.
    pub ticks: Option<String>,
    /// Declared func parameter names (placement ignores them).
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Call(CallStmt),
    Assign(AssignStmt),
    Multiselect(MultiselectStmt),
    /// A line the parser could not shape into anything; resolution of
    /// these is deferred to the lowering pass (warn or strict error).
    Unknown { raw: String, line: usize },
}

/// One argument of a call: positional or named, value kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub name: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct CallStmt {
    /// `NOT`-prefixed condition.
    pub negated: bool,
    /// Dotted target segments: `player.msg` → `["player", "msg"]`.
    pub path: Vec<String>,
    pub args: Vec<CallArg>,
    /// Nested condition scope, when the call opens a block.
    pub body: Option<Vec<Stmt>>,
    pub line: usize,
    /// Original text for diagnostics.
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

/// `x = e` and the four compound sugars.
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: String,
    pub op: AssignOp,
    pub rhs: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// One weighted condition inside a `multiselect` body.
#[derive(Debug, Clone)]
pub struct WeightedCond {
    pub call: CallStmt,
    pub op: WeightOp,
    /// Weight factor, verbatim; defaults to `1` when omitted.
    pub factor: Option<String>,
}

/// `multiselect <scope> <selector> <cutoff>` with an indented body.
#[derive(Debug, Clone)]
pub struct MultiselectStmt {
    pub scope: SelectScope,
    pub selector: String,
    pub cutoff: String,
    pub body: Vec<WeightedCond>,
    pub line: usize,
}

/// A `vfunc` macro: parameters with optional defaults and a raw body
/// that is substituted and re-parsed at each call site.
#[derive(Debug, Clone)]
pub struct VfuncDef {
    pub name: String,
    pub params: Vec<VfuncParam>,
    /// Body lines with their relative indentation preserved, so nested
    /// braces survive expansion as a single scope.
    pub body: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfuncParam {
    pub name: String,
    pub default: Option<String>,
}
