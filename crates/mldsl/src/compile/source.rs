//! DSL source parsing: physical lines to statements.
//!
//! One statement per line, except that a call whose parenthesis list
//! spans multiple physical lines folds into one logical statement.
//! `#` starts a comment outside strings. Brace blocks may be written
//! inline (`header(…) { a() b() }`) and must parse identically to
//! their multi-line form.

use super::{
    ast::{
        AssignOp, AssignStmt, CallArg, CallStmt, MultiselectStmt, Program, Stmt, TopBlock, TopKind, VfuncDef,
        VfuncParam, WeightOp, WeightedCond,
    },
    call::{ValueKind, classify_value, parse_call_args, split_top_level},
};
use crate::{
    api::SelectScope,
    error::{Error, Result},
};

#[derive(Debug, Clone)]
struct LogicalLine {
    text: String,
    indent: usize,
    line: usize,
}

/// Strips an unquoted `#` comment from a physical line.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '#' => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Net parenthesis balance outside strings; used for multi-line folding.
fn paren_balance(text: &str) -> isize {
    let mut balance = 0isize;
    let mut in_string = false;
    let mut escaped = false;
    for ch in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => balance += 1,
            ')' => balance -= 1,
            _ => {}
        }
    }
    balance
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Folds physical lines into logical ones: comments stripped, blank
/// lines dropped, unbalanced parenthesis lists folded into a single
/// statement.
fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut iter = source.lines().enumerate().peekable();
    while let Some((idx, raw)) = iter.next() {
        let stripped = strip_comment(raw);
        if stripped.trim().is_empty() {
            continue;
        }
        let indent = indent_of(stripped);
        let mut text = stripped.trim().to_owned();
        let mut balance = paren_balance(&text);
        while balance > 0 {
            let Some((_, next_raw)) = iter.next() else { break };
            let next = strip_comment(next_raw).trim().to_owned();
            if next.is_empty() {
                continue;
            }
            balance += paren_balance(&next);
            text.push(' ');
            text.push_str(&next);
        }
        out.push(LogicalLine { text, indent, line: idx + 1 });
    }
    out
}

pub(crate) struct SourceParser {
    lines: Vec<LogicalLine>,
    pos: usize,
}

impl SourceParser {
    fn peek(&self) -> Option<&LogicalLine> {
        self.lines.get(self.pos)
    }

    fn next(&mut self) -> Option<LogicalLine> {
        let line = self.lines.get(self.pos).cloned();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Parses a brace-delimited body, consuming the closing `}`.
    fn parse_block_body(&mut self, open_line: usize) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            let Some(line) = self.next() else {
                return Err(Error::Parse { line: open_line, message: "unclosed '{' block".to_owned() });
            };
            if line.text == "}" {
                return Ok(stmts);
            }
            self.parse_statement_into(&line, &mut stmts)?;
        }
    }

    /// Parses one logical line into zero or more statements, consuming
    /// any follow-up lines the construct owns (nested blocks, indented
    /// bodies).
    fn parse_statement_into(&mut self, line: &LogicalLine, out: &mut Vec<Stmt>) -> Result<()> {
        let text = line.text.as_str();

        if let Some(rest) = text.strip_prefix("multiselect ") {
            let stmt = self.parse_multiselect(rest, line)?;
            out.push(Stmt::Multiselect(stmt));
            return Ok(());
        }

        if let Some(header) = text.strip_suffix('{') {
            let header = header.trim();
            let body = self.parse_block_body(line.line)?;
            let mut call = parse_condition_header(header, line.line)?;
            call.body = Some(body);
            out.push(Stmt::Call(call));
            return Ok(());
        }

        if let Some((header, inline_body, rest)) = split_inline_block(text) {
            let mut call = parse_condition_header(header.trim(), line.line)?;
            let mut body = Vec::new();
            for piece in split_inline_statements(&inline_body) {
                let sub = LogicalLine { text: piece, indent: line.indent, line: line.line };
                self.parse_statement_into(&sub, &mut body)?;
            }
            call.body = Some(body);
            out.push(Stmt::Call(call));
            if !rest.trim().is_empty() {
                let sub = LogicalLine { text: rest.trim().to_owned(), indent: line.indent, line: line.line };
                self.parse_statement_into(&sub, out)?;
            }
            return Ok(());
        }

        out.push(parse_plain_statement(text, line.line));
        Ok(())
    }

    fn parse_multiselect(&mut self, rest: &str, line: &LogicalLine) -> Result<MultiselectStmt> {
        let mut parts = rest.split_whitespace();
        let (Some(scope_raw), Some(selector), Some(cutoff)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Macro {
                line: line.line,
                message: "multiselect needs: multiselect <scope> <selector> <cutoff>".to_owned(),
            });
        };
        let Some(scope) = SelectScope::parse(scope_raw) else {
            return Err(Error::Macro { line: line.line, message: format!("multiselect: unknown scope `{scope_raw}`") });
        };
        let mut body = Vec::new();
        while let Some(next) = self.peek() {
            if next.indent <= line.indent || next.text == "}" {
                break;
            }
            let cond_line = self.next().expect("peeked");
            body.push(parse_weighted_condition(&cond_line)?);
        }
        Ok(MultiselectStmt {
            scope,
            selector: selector.to_owned(),
            cutoff: cutoff.to_owned(),
            body,
            line: line.line,
        })
    }

    /// Parses an indented `vfunc` body: every following line more
    /// indented than the header, relative indentation preserved.
    fn parse_vfunc_body(&mut self, header_indent: usize) -> Vec<String> {
        let mut body_lines = Vec::new();
        let mut base_indent: Option<usize> = None;
        while let Some(next) = self.peek() {
            if next.indent <= header_indent {
                break;
            }
            let line = self.next().expect("peeked");
            let base = *base_indent.get_or_insert(line.indent);
            let relative = line.indent.saturating_sub(base);
            body_lines.push(format!("{}{}", " ".repeat(relative), line.text));
        }
        body_lines
    }
}

/// Splits `header(…) { body } rest` at the first top-level brace pair.
fn split_inline_block(text: &str) -> Option<(String, String, String)> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut open: Option<usize> = None;
    let mut brace_depth = 0usize;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '{' if depth == 0 => {
                if brace_depth == 0 {
                    open = Some(i);
                }
                brace_depth += 1;
            }
            '}' if depth == 0 => {
                brace_depth = brace_depth.saturating_sub(1);
                if brace_depth == 0 {
                    let start = open?;
                    let header = text[..start].to_owned();
                    let body = text[start + 1..i].to_owned();
                    let rest = text[i + 1..].to_owned();
                    return Some((header, body, rest));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits the inside of an inline block into statement texts.
///
/// Statements are calls (balanced parens, optional `{…}` tail) or
/// assignments (target, operator, greedy expression consumed while
/// operators keep it open).
fn split_inline_statements(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0usize;
    let len = chars.len();

    let skip_ws = |i: &mut usize| {
        while *i < len && chars[*i].is_whitespace() {
            *i += 1;
        }
    };

    while i < len {
        skip_ws(&mut i);
        if i >= len {
            break;
        }
        let start = i;
        consume_path(&chars, &mut i);
        if i == start {
            // Not a statement head; take the rest as one piece.
            out.push(chars[start..].iter().collect::<String>().trim().to_owned());
            break;
        }
        let mut j = i;
        skip_ws(&mut j);
        if j < len && chars[j] == '(' {
            i = j;
            consume_balanced(&chars, &mut i, '(', ')');
            let mut k = i;
            skip_ws(&mut k);
            if k < len && chars[k] == '{' {
                i = k;
                consume_balanced(&chars, &mut i, '{', '}');
            }
            out.push(chars[start..i].iter().collect::<String>().trim().to_owned());
            continue;
        }
        if let Some(op_len) = peek_assign_op(&chars, j) {
            i = j + op_len;
            consume_expression(&chars, &mut i);
            out.push(chars[start..i].iter().collect::<String>().trim().to_owned());
            continue;
        }
        // A bare word; emit it alone.
        out.push(chars[start..i].iter().collect::<String>().trim().to_owned());
    }
    out.retain(|s| !s.is_empty());
    out
}

/// Consumes identifier-path characters (`a.b.c`, placeholders allowed).
fn consume_path(chars: &[char], i: &mut usize) {
    let len = chars.len();
    let mut in_placeholder = false;
    while *i < len {
        let c = chars[*i];
        if c == '%' {
            in_placeholder = !in_placeholder;
            *i += 1;
        } else if in_placeholder {
            *i += 1;
        } else if c == '_' || c == '.' || c.is_alphanumeric() {
            *i += 1;
        } else {
            break;
        }
    }
}

fn consume_balanced(chars: &[char], i: &mut usize, open: char, close: char) {
    let len = chars.len();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    while *i < len {
        let c = chars[*i];
        *i += 1;
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return;
            }
        }
    }
}

/// Length in chars of an assignment operator at `i`, if present.
fn peek_assign_op(chars: &[char], i: usize) -> Option<usize> {
    match chars.get(i) {
        Some('=') if chars.get(i + 1) != Some(&'=') => Some(1),
        Some('+' | '-' | '*' | '/') if chars.get(i + 1) == Some(&'=') => Some(2),
        _ => None,
    }
}

/// Consumes one expression: an atom, then further atoms while joined by
/// arithmetic operators.
fn consume_expression(chars: &[char], i: &mut usize) {
    let len = chars.len();
    let skip_ws = |i: &mut usize| {
        while *i < len && chars[*i].is_whitespace() {
            *i += 1;
        }
    };
    loop {
        skip_ws(i);
        if *i >= len {
            return;
        }
        // unary signs
        while *i < len && (chars[*i] == '-' || chars[*i] == '+') {
            *i += 1;
            skip_ws(i);
        }
        if *i >= len {
            return;
        }
        match chars[*i] {
            '"' => {
                *i += 1;
                let mut escaped = false;
                while *i < len {
                    let c = chars[*i];
                    *i += 1;
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
            }
            '(' => consume_balanced(chars, i, '(', ')'),
            _ => {
                let before = *i;
                consume_path(chars, i);
                if *i == before {
                    // Unknown char; give up to avoid an infinite loop.
                    *i += 1;
                }
                // A call atom: identifier directly followed by parens.
                if *i < len && chars[*i] == '(' {
                    consume_balanced(chars, i, '(', ')');
                }
            }
        }
        let mut j = *i;
        skip_ws(&mut j);
        if j < len && matches!(chars[j], '+' | '-' | '*' | '/') && chars.get(j + 1) != Some(&'=') {
            *i = j + 1;
            continue;
        }
        return;
    }
}

/// Parses a block header (`NOT select.x(…)`, `if if_value.y(…)`) into a
/// call statement without a body.
fn parse_condition_header(header: &str, line: usize) -> Result<CallStmt> {
    match parse_plain_statement(header, line) {
        Stmt::Call(call) => Ok(call),
        _ => Err(Error::Parse { line, message: format!("expected a call before '{{': {header}") }),
    }
}

fn parse_weighted_condition(line: &LogicalLine) -> Result<WeightedCond> {
    let text = line.text.trim();
    let close = text.rfind(')').ok_or_else(|| Error::Macro {
        line: line.line,
        message: format!("multiselect: expected a condition call, got: {text}"),
    })?;
    let (call_text, suffix) = text.split_at(close + 1);
    let suffix = suffix.trim();
    let (op, factor_text) = if let Some(rest) = suffix.strip_prefix("/=") {
        (WeightOp::Div, rest)
    } else if let Some(rest) = suffix.strip_prefix('+') {
        (WeightOp::Add, rest)
    } else if let Some(rest) = suffix.strip_prefix('-') {
        (WeightOp::Sub, rest)
    } else if let Some(rest) = suffix.strip_prefix('*') {
        (WeightOp::Mul, rest)
    } else {
        return Err(Error::Macro {
            line: line.line,
            message: format!("multiselect: missing weight operator after condition: {text}"),
        });
    };
    let Stmt::Call(call) = parse_plain_statement(call_text, line.line) else {
        return Err(Error::Macro { line: line.line, message: format!("multiselect: not a condition call: {call_text}") });
    };
    let factor_text = factor_text.trim();
    let factor = (!factor_text.is_empty()).then(|| factor_text.to_owned());
    Ok(WeightedCond { call, op, factor })
}

/// Parses a line that opens no block: assignment, call, or unknown.
fn parse_plain_statement(text: &str, line: usize) -> Stmt {
    let trimmed = text.trim();

    let (negated, rest) = strip_negation(trimmed);
    let rest = strip_if_keyword(rest);

    if !negated
        && let Some((target, op, rhs)) = split_assignment(rest)
    {
        return Stmt::Assign(AssignStmt { target, op, rhs, line });
    }

    if let Some((path, args)) = parse_call_text(rest) {
        return Stmt::Call(CallStmt { negated, path, args, body: None, line, raw: trimmed.to_owned() });
    }

    Stmt::Unknown { raw: trimmed.to_owned(), line }
}

fn strip_negation(text: &str) -> (bool, &str) {
    for prefix in ["NOT ", "not ", "НЕ ", "не "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return (true, rest.trim_start());
        }
    }
    (false, text)
}

fn strip_if_keyword(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("if ") {
        let rest = rest.trim_start();
        if rest.contains('(') {
            return rest;
        }
    }
    text
}

/// Detects `lhs <op>= rhs` at top level, quote- and paren-aware.
pub(crate) fn split_assignment(text: &str) -> Option<(String, AssignOp, String)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            prev = Some(ch);
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                if bytes.get(i + 1) == Some(&b'=') {
                    prev = Some(ch);
                    continue;
                }
                let (op, lhs_end) = match prev {
                    Some('+') => (AssignOp::Add, i - 1),
                    Some('-') => (AssignOp::Sub, i - 1),
                    Some('*') => (AssignOp::Mul, i - 1),
                    Some('/') => (AssignOp::Div, i - 1),
                    Some('=' | '!' | '<' | '>') => {
                        prev = Some(ch);
                        continue;
                    }
                    _ => (AssignOp::Set, i),
                };
                let lhs = text[..lhs_end].trim();
                let rhs = text[i + 1..].trim();
                if lhs.is_empty() || rhs.is_empty() {
                    return None;
                }
                if !matches!(classify_value(lhs), ValueKind::Ident(_)) {
                    return None;
                }
                return Some((lhs.to_owned(), op, rhs.to_owned()));
            }
            _ => {}
        }
        prev = Some(ch);
    }
    None
}

/// Parses `a.b.c(args…)` into path segments and arguments. The whole
/// text must be consumed.
fn parse_call_text(text: &str) -> Option<(Vec<String>, Vec<CallArg>)> {
    let open = find_top_level_open_paren(text)?;
    let path_text = text[..open].trim();
    if path_text.is_empty() {
        return None;
    }
    let segments: Vec<String> = path_text.split('.').map(str::trim).map(str::to_owned).collect();
    if segments.iter().any(|s| s.is_empty() || !is_name_segment(s)) {
        return None;
    }
    let rest = &text[open..];
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    if paren_balance(inner) != 0 {
        return None;
    }
    Some((segments, parse_call_args(inner)))
}

fn find_top_level_open_paren(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    let mut in_placeholder = false;
    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '%' => in_placeholder = !in_placeholder,
            '(' if !in_placeholder => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_name_segment(s: &str) -> bool {
    s.chars().all(|c| c == '_' || c == '%' || c == '(' || c == ')' || c.is_alphanumeric())
}

/// Parses a full source file into top-level blocks and vfunc macros.
pub fn parse_program(source: &str) -> Result<Program> {
    let lines = logical_lines(source);
    let mut parser = SourceParser { lines, pos: 0 };
    let mut program = Program::default();

    while let Some(line) = parser.next() {
        let text = line.text.clone();

        if let Some(rest) = text.strip_prefix("vfunc ") {
            let (name, params) = parse_vfunc_header(rest, line.line)?;
            let body = parser.parse_vfunc_body(line.indent);
            program.vfuncs.push(VfuncDef { name, params, body, line: line.line });
            continue;
        }

        if let Some(header) = text.strip_suffix('{') {
            let header = header.trim();
            if let Some(top) = parse_top_header(header, line.line) {
                let mut top = top;
                top.body = parser.parse_block_body(line.line)?;
                program.tops.push(top);
                continue;
            }
            // A free-standing condition block: attach it to the previous
            // top block's row when one exists.
            let body = parser.parse_block_body(line.line)?;
            let Some(last) = program.tops.last_mut() else {
                return Err(Error::Parse {
                    line: line.line,
                    message: format!("block before any event/func/loop header: {header}"),
                });
            };
            let mut call = parse_condition_header(header, line.line)?;
            call.body = Some(body);
            last.body.push(Stmt::Call(call));
            continue;
        }

        if let Some((header, inline_body, _rest)) = split_inline_block(&text) {
            if let Some(mut top) = parse_top_header(header.trim(), line.line) {
                let mut body = Vec::new();
                for piece in split_inline_statements(&inline_body) {
                    let sub = LogicalLine { text: piece, indent: line.indent, line: line.line };
                    parser.parse_statement_into(&sub, &mut body)?;
                }
                top.body = body;
                program.tops.push(top);
                continue;
            }
        }

        // Free-standing statements attach to the previous row; with no
        // row open yet they surface through the unresolved-line path.
        let last_is_real_row = program.tops.last().map(|t| !(t.kind == TopKind::Event && t.name.is_empty()));
        match last_is_real_row {
            Some(true) => {
                let sub = LogicalLine { text, indent: line.indent, line: line.line };
                let mut tail = Vec::new();
                parser.parse_statement_into(&sub, &mut tail)?;
                program.tops.last_mut().expect("non-empty").body.extend(tail);
            }
            Some(false) => {
                program.tops.last_mut().expect("non-empty").body.push(Stmt::Unknown { raw: text, line: line.line });
            }
            None => program.tops.push(TopBlock {
                kind: TopKind::Event,
                name: String::new(),
                ticks: None,
                params: Vec::new(),
                body: vec![Stmt::Unknown { raw: text, line: line.line }],
                line: line.line,
            }),
        }
    }

    Ok(program)
}

/// Recognizes `event("NAME")`, `func NAME(params?)`, `loop(NAME, TICKS?)`
/// headers (without the trailing `{`).
fn parse_top_header(header: &str, line: usize) -> Option<TopBlock> {
    if let Some(rest) = header.strip_prefix("event") {
        let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
        let name = match classify_value(inner.trim()) {
            ValueKind::Quoted(inner) => super::call::process_text_literal(&inner),
            _ => inner.trim().to_owned(),
        };
        return Some(TopBlock { kind: TopKind::Event, name, ticks: None, params: Vec::new(), body: Vec::new(), line });
    }
    if let Some(rest) = header.strip_prefix("func ") {
        let rest = rest.trim();
        let (name, params) = match rest.split_once('(') {
            Some((name, param_text)) => {
                let param_text = param_text.strip_suffix(')')?;
                let params = split_top_level(param_text, ',')
                    .into_iter()
                    .map(|p| p.trim().to_owned())
                    .filter(|p| !p.is_empty())
                    .collect();
                (name.trim().to_owned(), params)
            }
            None => (rest.to_owned(), Vec::new()),
        };
        if name.is_empty() {
            return None;
        }
        return Some(TopBlock { kind: TopKind::Func, name, ticks: None, params, body: Vec::new(), line });
    }
    if let Some(rest) = header.strip_prefix("loop") {
        let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
        let mut parts = split_top_level(inner, ',').into_iter().map(|p| p.trim().to_owned());
        let name = parts.next()?;
        let ticks = parts.next().filter(|t| !t.is_empty());
        return Some(TopBlock { kind: TopKind::Loop, name, ticks, params: Vec::new(), body: Vec::new(), line });
    }
    None
}

fn parse_vfunc_header(rest: &str, line: usize) -> Result<(String, Vec<VfuncParam>)> {
    let rest = rest.trim();
    let (name, param_text) = match rest.split_once('(') {
        Some((name, params)) => {
            let params = params.strip_suffix(')').ok_or_else(|| Error::Parse {
                line,
                message: format!("vfunc header missing ')': {rest}"),
            })?;
            (name.trim(), params)
        }
        None => (rest, ""),
    };
    if name.is_empty() {
        return Err(Error::Parse { line, message: "vfunc needs a name".to_owned() });
    }
    let mut params = Vec::new();
    for piece in split_top_level(param_text, ',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        match piece.split_once('=') {
            Some((pname, default)) => params.push(VfuncParam {
                name: pname.trim().to_owned(),
                default: Some(default.trim().to_owned()),
            }),
            None => params.push(VfuncParam { name: piece.to_owned(), default: None }),
        }
    }
    Ok((name.to_owned(), params))
}

/// Re-parses expanded vfunc body lines as statements (used at call
/// sites, after parameter substitution).
pub(crate) fn parse_statement_lines(lines: Vec<(String, usize)>) -> Result<Vec<Stmt>> {
    let logical: Vec<LogicalLine> = fold_raw_lines(lines);
    let mut parser = SourceParser { lines: logical, pos: 0 };
    let mut out = Vec::new();
    while let Some(line) = parser.next() {
        parser.parse_statement_into(&line, &mut out)?;
    }
    Ok(out)
}

fn fold_raw_lines(lines: Vec<(String, usize)>) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut iter = lines.into_iter().peekable();
    while let Some((raw, line_no)) = iter.next() {
        let stripped = strip_comment(&raw);
        if stripped.trim().is_empty() {
            continue;
        }
        let indent = indent_of(stripped);
        let mut text = stripped.trim().to_owned();
        let mut balance = paren_balance(&text);
        while balance > 0 {
            let Some((next_raw, _)) = iter.next() else { break };
            let next = strip_comment(&next_raw).trim().to_owned();
            if next.is_empty() {
                continue;
            }
            balance += paren_balance(&next);
            text.push(' ');
            text.push_str(&next);
        }
        out.push(LogicalLine { text, indent, line: line_no });
    }
    out
}
