//! Lowering: statements to plan entries, with per-mode argument
//! coercion, temp-variable hoisting, and the macro expansions.

use ahash::AHashMap;

use super::{
    ast::{AssignOp, AssignStmt, CallStmt, MultiselectStmt, Program, Stmt, TopBlock, TopKind, VfuncDef, WeightOp},
    call::{ValueKind, classify_value, normalize_item_literal, process_text_literal, quote},
    expr::{ArithOp, NumExpr, format_number, parse_num_expr},
    plan::{Block, NO_ARGS, PlanEntry},
    resolve::{ActionIndex, SelectLookup, norm_ident},
    source,
    split::{CallTemplate, Node, Row},
    vfunc,
};
use crate::{
    api::{ApiFunc, ApiMap, SelectScope},
    config::Config,
    error::{Error, Result},
    extract::Mode,
    text::{norm_enum_label, normalize},
};

/// Reserved prefix of compiler-synthesized temp variables.
const TMP_PREFIX: &str = "__mldsl_tmpargf";

pub(crate) struct Lowering<'a> {
    index: ActionIndex<'a>,
    config: &'a Config,
    tmp_counter: usize,
    vfuncs: AHashMap<String, VfuncDef>,
    expansion_stack: Vec<String>,
}

/// Lowers a parsed program into rows plus the call template the
/// splitter uses for trampolines.
pub(crate) fn lower_program<'a>(
    program: &Program,
    api: &'a ApiMap,
    config: &'a Config,
) -> Result<(Vec<Row>, CallTemplate)> {
    let index = ActionIndex::new(api);
    let mut lowering = Lowering {
        index,
        config,
        tmp_counter: 0,
        vfuncs: AHashMap::new(),
        expansion_stack: Vec::new(),
    };

    for def in &program.vfuncs {
        if program.tops.iter().any(|t| t.kind == TopKind::Func && t.name == def.name) {
            return Err(Error::Macro {
                line: def.line,
                message: format!("`{}` is declared as both func and vfunc", def.name),
            });
        }
        if lowering.vfuncs.insert(def.name.clone(), def.clone()).is_some() {
            return Err(Error::Macro { line: def.line, message: format!("duplicate vfunc `{}`", def.name) });
        }
    }

    let call_template = lowering.call_template();
    let mut rows = Vec::new();
    for top in &program.tops {
        // Statements that arrived outside any block parse into a
        // nameless synthetic event; they only surface diagnostics.
        if top.name.is_empty() && top.kind == TopKind::Event {
            for stmt in &top.body {
                if let Stmt::Unknown { raw, line } = stmt {
                    lowering.handle_unresolved(raw, *line)?;
                }
            }
            continue;
        }
        rows.push(lowering.lower_top(top)?);
    }
    Ok((rows, call_template))
}

impl<'a> Lowering<'a> {
    fn call_template(&self) -> CallTemplate {
        match self.index.call_function() {
            Some((_, func)) => {
                let slot = func
                    .params
                    .iter()
                    .find(|p| p.mode == Mode::Text)
                    .or_else(|| func.params.first())
                    .map_or(13, |p| p.slot);
                CallTemplate { entry_name: func.entry_name(), slot }
            }
            None => CallTemplate { entry_name: "Вызвать функцию||Вызвать функцию".to_owned(), slot: 13 },
        }
    }

    fn lower_top(&mut self, top: &TopBlock) -> Result<Row> {
        let header = match top.kind {
            TopKind::Event => {
                let (sign1, display) = self
                    .index
                    .event_signs(&top.name)
                    .unwrap_or_else(|| ("Событие игрока".to_owned(), top.name.clone()));
                PlanEntry::action(Block::DiamondBlock, format!("{sign1}||{display}"), NO_ARGS)
            }
            TopKind::Func => PlanEntry::action(Block::LapisBlock, top.name.clone(), NO_ARGS),
            TopKind::Loop => {
                let ticks = top.ticks.as_deref().unwrap_or("20");
                PlanEntry::action(Block::EmeraldBlock, format!("{}||{ticks}", top.name), NO_ARGS)
            }
        };
        let nodes = self.lower_stmts(&top.body)?;
        Ok(Row { header, nodes })
    }

    fn lower_stmts(&mut self, stmts: &[Stmt]) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for stmt in stmts {
            match stmt {
                Stmt::Unknown { raw, line } => self.handle_unresolved(raw, *line)?,
                Stmt::Assign(assign) => self.lower_assign(assign, &mut nodes)?,
                Stmt::Multiselect(ms) => self.lower_multiselect(ms, &mut nodes)?,
                Stmt::Call(call) => self.lower_call(call, &mut nodes)?,
            }
        }
        Ok(nodes)
    }

    fn handle_unresolved(&self, raw: &str, line: usize) -> Result<()> {
        if self.config.strict_unknown {
            return Err(Error::Unresolved { line, text: raw.to_owned() });
        }
        if self.config.warn_unknown {
            eprintln!("[warn] line {line}: unresolved line: {raw}");
        }
        Ok(())
    }

    fn lower_call(&mut self, call: &CallStmt, nodes: &mut Vec<Node>) -> Result<()> {
        // `call(name)` emits the function-call action directly.
        if call.path.len() == 1 && call.path[0] == "call" {
            let Some(arg) = call.args.first() else {
                return Err(Error::Resolve { line: call.line, message: "call(...) needs a function name".to_owned() });
            };
            let target = match classify_value(&arg.value) {
                ValueKind::Quoted(inner) => inner,
                _ => arg.value.clone(),
            };
            nodes.push(Node::Leaf(self.call_template().make(&target)));
            return Ok(());
        }

        // Bare-name calls are vfunc invocations (or unresolved lines).
        if call.path.len() == 1 {
            let name = call.path[0].clone();
            if self.vfuncs.contains_key(&name) {
                return self.expand_vfunc(&name, call, nodes);
            }
            return self.handle_unresolved(&call.raw, call.line);
        }

        let (module, canonical, func) = match self.resolve_call(call)? {
            Some(found) => found,
            None => return self.handle_unresolved(&call.raw, call.line),
        };

        let conditional = func.is_conditional(&module);
        if call.negated && !conditional {
            return Err(Error::Resolve {
                line: call.line,
                message: format!("NOT is only allowed on conditional actions, not {module}.{canonical}"),
            });
        }
        if call.body.is_some() && !conditional {
            return Err(Error::Parse {
                line: call.line,
                message: format!("{module}.{canonical} is not a condition and cannot open a block"),
            });
        }

        let mut pre = Vec::new();
        let args = self.encode_call_args(&module, func, call, &mut pre)?;
        nodes.extend(pre);

        let block = if is_call_function(func) { Block::NetherBrick } else { Block::IronBlock };
        let mut entry = PlanEntry::action(block, func.entry_name(), args);
        entry.negated = call.negated;

        match &call.body {
            Some(body) => {
                let body_nodes = self.lower_stmts(body)?;
                nodes.push(Node::Scope { cond: entry, body: body_nodes });
            }
            None => nodes.push(Node::Leaf(entry)),
        }
        Ok(())
    }

    /// Resolves a dotted call target, including the select-domain
    /// forms `select.<scope>.<leaf>` and unscoped `select.<leaf>`.
    fn resolve_call(&self, call: &CallStmt) -> Result<Option<(String, &'a str, &'a ApiFunc)>> {
        let line = call.line;
        if call.path[0] == "select" {
            let (scope, leaf) = match call.path.len() {
                2 => (None, call.path[1].as_str()),
                3 => {
                    let Some(scope) = SelectScope::parse(&call.path[1]) else {
                        return Err(Error::Resolve {
                            line,
                            message: format!("select: unknown domain scope `{}`", call.path[1]),
                        });
                    };
                    (Some(scope), call.path[2].as_str())
                }
                _ => {
                    return Err(Error::Resolve { line, message: format!("select: malformed call: {}", call.raw) });
                }
            };
            return match self.index.resolve_select(scope, leaf) {
                SelectLookup::Found { module, name, func } => Ok(Some((module.to_owned(), name, func))),
                SelectLookup::Ambiguous(candidates) => Err(Error::Resolve {
                    line,
                    message: format!(
                        "select: ambiguous selector `{leaf}` — qualify with if_player/if_mob/if_entity (candidates: {})",
                        candidates.join(", ")
                    ),
                }),
                SelectLookup::Unknown => {
                    Err(Error::Resolve { line, message: format!("select: unknown selector `{leaf}`") })
                }
            };
        }
        if call.path.len() != 2 {
            return Ok(None);
        }
        let module = call.path[0].as_str();
        Ok(self.index.get(module, &call.path[1]).map(|(name, func)| (module.to_owned(), name, func)))
    }

    fn expand_vfunc(&mut self, name: &str, call: &CallStmt, nodes: &mut Vec<Node>) -> Result<()> {
        if self.expansion_stack.iter().any(|n| n == name) {
            return Err(Error::Macro {
                line: call.line,
                message: format!("vfunc recursion cycle: {} -> {name}", self.expansion_stack.join(" -> ")),
            });
        }
        let def = self.vfuncs.get(name).expect("checked by caller").clone();
        let lines = vfunc::expand_body(&def, call)?;
        let stmts = source::parse_statement_lines(lines)?;
        self.expansion_stack.push(name.to_owned());
        let result = self.lower_stmts(&stmts);
        self.expansion_stack.pop();
        nodes.extend(result?);
        Ok(())
    }

    // ---- assignment sugars -------------------------------------------------

    fn lower_assign(&mut self, assign: &AssignStmt, nodes: &mut Vec<Node>) -> Result<()> {
        let line = assign.line;
        match assign.op {
            AssignOp::Set => self.lower_set(assign, nodes),
            op => {
                let arith = match op {
                    AssignOp::Add => ArithOp::Add,
                    AssignOp::Sub => ArithOp::Sub,
                    AssignOp::Mul => ArithOp::Mul,
                    AssignOp::Div => ArithOp::Div,
                    AssignOp::Set => unreachable!("handled above"),
                };
                let Some(expr) = parse_num_expr(&assign.rhs) else {
                    return Err(Error::Coerce {
                        line,
                        message: format!(
                            "`{}` on `{}` supports numeric expressions only, got: {}",
                            op_symbol(arith),
                            assign.target,
                            assign.rhs
                        ),
                    });
                };
                let operand = self.num_operand(&expr, line, nodes)?;
                let entry =
                    self.var_op_entry(arith_canonical(arith), &assign.target, &[format!("var({})", assign.target), operand], line)?;
                nodes.push(Node::Leaf(entry));
                Ok(())
            }
        }
    }

    fn lower_set(&mut self, assign: &AssignStmt, nodes: &mut Vec<Node>) -> Result<()> {
        let line = assign.line;
        let target = assign.target.as_str();
        if let Some(expr) = parse_num_expr(&assign.rhs) {
            // Plain literals keep their spelling; folded constants take
            // the minimal form.
            let value = match (&expr, expr.fold()) {
                // A literal (possibly sign-prefixed) keeps its spelling.
                (NumExpr::Num(_), _) => Some(format!("num({})", assign.rhs.trim())),
                (NumExpr::Neg(inner), Some(_)) if matches!(**inner, NumExpr::Num(_)) => {
                    Some(format!("num({})", assign.rhs.trim().replace(' ', "")))
                }
                (_, Some(v)) => Some(format!("num({})", format_number(v))),
                (NumExpr::Atom(a), None) => Some(format!("var({a})")),
                _ => None,
            };
            match value {
                Some(value) => {
                    let entry = self.var_op_entry("set_value", target, &[value], line)?;
                    nodes.push(Node::Leaf(entry));
                }
                None => self.emit_num_expr_into(target, &expr, line, nodes)?,
            }
            return Ok(());
        }
        let value = match classify_value(&assign.rhs) {
            ValueKind::Quoted(inner) => format!("text({})", process_text_literal(&inner)),
            ValueKind::ItemCall(inner) => normalize_item_literal(&inner),
            ValueKind::LocCall(inner) => paper_item(&inner),
            ValueKind::ArrSave(name) => format!("var({name}\u{2398})"),
            ValueKind::VarSave(name) => format!("var_save({name})"),
            ValueKind::Ident(id) => format!("var({id})"),
            _ => {
                return Err(Error::Coerce {
                    line,
                    message: format!("cannot assign `{}` to `{target}`", assign.rhs),
                });
            }
        };
        let entry = self.var_op_entry("set_value", target, &[value], line)?;
        nodes.push(Node::Leaf(entry));
        Ok(())
    }

    /// Lowers a non-constant numeric expression into `var.set_*`
    /// actions targeting `target`.
    fn emit_num_expr_into(&mut self, target: &str, expr: &NumExpr, line: usize, nodes: &mut Vec<Node>) -> Result<()> {
        if let Some(v) = expr.fold() {
            let entry = self.var_op_entry("set_value", target, &[format!("num({})", format_number(v))], line)?;
            nodes.push(Node::Leaf(entry));
            return Ok(());
        }
        match expr {
            NumExpr::Num(_) => unreachable!("constant handled by fold"),
            NumExpr::Atom(a) => {
                let entry = self.var_op_entry("set_value", target, &[format!("var({a})")], line)?;
                nodes.push(Node::Leaf(entry));
            }
            NumExpr::Neg(inner) => {
                let operand = self.num_operand(inner, line, nodes)?;
                let entry = self.var_op_entry("set_product", target, &["num(-1)".to_owned(), operand], line)?;
                nodes.push(Node::Leaf(entry));
            }
            NumExpr::Bin { op, lhs, rhs } => {
                let l = self.num_operand(lhs, line, nodes)?;
                let r = self.num_operand(rhs, line, nodes)?;
                let entry = self.var_op_entry(arith_canonical(*op), target, &[l, r], line)?;
                nodes.push(Node::Leaf(entry));
            }
        }
        Ok(())
    }

    /// Encodes one operand of an arithmetic action, hoisting nested
    /// expressions into fresh temp variables.
    fn num_operand(&mut self, expr: &NumExpr, line: usize, nodes: &mut Vec<Node>) -> Result<String> {
        if let Some(v) = expr.fold() {
            return Ok(format!("num({})", format_number(v)));
        }
        match expr {
            NumExpr::Atom(a) => Ok(format!("var({a})")),
            _ => {
                let tmp = self.fresh_tmp();
                self.emit_num_expr_into(&tmp, expr, line, nodes)?;
                Ok(format!("var({tmp})"))
            }
        }
    }

    fn fresh_tmp(&mut self) -> String {
        self.tmp_counter += 1;
        format!("{TMP_PREFIX}{}", self.tmp_counter)
    }

    /// Builds one `var.set_*` entry: the target variable in the
    /// VARIABLE slot, operands in the declared value slots (spilling
    /// into consecutive slots for the variadic sum/product forms).
    fn var_op_entry(&mut self, canonical: &str, target: &str, operands: &[String], line: usize) -> Result<PlanEntry> {
        let Some((_, func)) = self.index.get("var", canonical) else {
            return Err(Error::Resolve {
                line,
                message: format!("var.{canonical} is missing from the API (required for assignment lowering)"),
            });
        };
        let var_slot = func
            .params
            .iter()
            .find(|p| p.mode == Mode::Variable)
            .or_else(|| func.params.first())
            .map_or(9, |p| p.slot);
        let value_slots: Vec<usize> = func.params.iter().filter(|p| p.slot != var_slot).map(|p| p.slot).collect();
        let mut tokens = vec![format!("slot({var_slot})=var({target})")];
        for (i, operand) in operands.iter().enumerate() {
            let slot = value_slots.get(i).copied().unwrap_or_else(|| {
                value_slots.first().map_or(var_slot + 1 + i, |&base| base + (i - value_slots.len() + 1))
            });
            tokens.push(format!("slot({slot})={operand}"));
        }
        Ok(PlanEntry::action(Block::IronBlock, func.entry_name(), tokens.join(",")))
    }

    // ---- multiselect -------------------------------------------------------

    fn lower_multiselect(&mut self, ms: &MultiselectStmt, nodes: &mut Vec<Node>) -> Result<()> {
        let line = ms.line;
        let Some(select_all) = self.index.select_all(ms.scope) else {
            return Err(Error::Resolve {
                line,
                message: format!("multiselect: no select-all action for scope {}", ms.scope.prefix()),
            });
        };
        nodes.push(Node::Leaf(PlanEntry::action(Block::IronBlock, select_all.entry_name(), NO_ARGS)));

        for cond in &ms.body {
            let (module, canonical, func) = match self.resolve_call(&cond.call)? {
                Some(found) => found,
                None => {
                    return Err(Error::Macro {
                        line: cond.call.line,
                        message: format!("multiselect: unresolved condition: {}", cond.call.raw),
                    });
                }
            };
            let cond_scope = SelectScope::all()
                .into_iter()
                .find(|s| canonical.starts_with(&format!("{}_", s.prefix())))
                .or_else(|| crate::api::select_scope_from_sign2(&func.sign2));
            if cond_scope != Some(ms.scope) {
                return Err(Error::Macro {
                    line: cond.call.line,
                    message: format!(
                        "multiselect: scope mismatch: {}.{canonical} inside a {} block",
                        module,
                        ms.scope.prefix()
                    ),
                });
            }
            let mut pre = Vec::new();
            let args = self.encode_call_args(&module, func, &cond.call, &mut pre)?;
            nodes.extend(pre);
            nodes.push(Node::Leaf(PlanEntry::action(Block::IronBlock, func.entry_name(), args)));

            let factor = cond.factor.clone().unwrap_or_else(|| "1".to_owned());
            let arith = match cond.op {
                WeightOp::Add => ArithOp::Add,
                WeightOp::Sub => ArithOp::Sub,
                WeightOp::Mul => ArithOp::Mul,
                WeightOp::Div => ArithOp::Div,
            };
            let Some(expr) = parse_num_expr(&factor) else {
                return Err(Error::Macro {
                    line: cond.call.line,
                    message: format!("multiselect: weight factor must be numeric, got: {factor}"),
                });
            };
            let operand = self.num_operand(&expr, line, nodes)?;
            let entry = self.var_op_entry(
                arith_canonical(arith),
                &ms.selector,
                &[format!("var({})", ms.selector), operand],
                line,
            )?;
            nodes.push(Node::Leaf(entry));
        }

        let Some(compare) = self.index.compare_simple(ms.scope) else {
            return Err(Error::Resolve {
                line,
                message: format!("multiselect: no simple number comparison for scope {}", ms.scope.prefix()),
            });
        };
        let mut tokens = Vec::new();
        let mut num_params = compare.params.iter().filter(|p| p.mode == Mode::Number);
        if let Some(p) = num_params.next() {
            tokens.push(format!("slot({})=var({})", p.slot, ms.selector));
        }
        if let Some(p) = num_params.next() {
            let mut pre = Vec::new();
            let cutoff = self.coerce_value(Mode::Number, &ms.cutoff, line, &mut pre)?;
            nodes.extend(pre);
            tokens.push(format!("slot({})={cutoff}", p.slot));
        }
        if let Some(e) = compare.enums.first() {
            if let Some(key) = pick_gte_option(e) {
                tokens.push(format!("slot({})=text({key})", e.slot));
            }
        }
        let args = if tokens.is_empty() { NO_ARGS.to_owned() } else { tokens.join(",") };
        nodes.push(Node::Leaf(PlanEntry::action(Block::IronBlock, compare.entry_name(), args)));
        Ok(())
    }

    // ---- argument encoding -------------------------------------------------

    fn encode_call_args(
        &mut self,
        module: &str,
        func: &ApiFunc,
        call: &CallStmt,
        pre: &mut Vec<Node>,
    ) -> Result<String> {
        let line = call.line;
        let mut param_values: Vec<Option<String>> = vec![None; func.params.len()];
        let mut enum_values: Vec<Option<String>> = vec![None; func.enums.len()];
        let mut positionals = Vec::new();

        for arg in &call.args {
            let Some(name) = &arg.name else {
                positionals.push(arg);
                continue;
            };
            if let Some(idx) = func
                .params
                .iter()
                .position(|p| p.name == *name || norm_ident(&p.name) == norm_ident(name))
            {
                param_values[idx] = Some(self.coerce_value(func.params[idx].mode, &arg.value, line, pre)?);
                continue;
            }
            if let Some(idx) = mode_alias_index(func, name) {
                param_values[idx] = Some(self.coerce_value(func.params[idx].mode, &arg.value, line, pre)?);
                continue;
            }
            if let Some(eidx) = func.enums.iter().position(|e| norm_ident(&e.name) == norm_ident(name)) {
                enum_values[eidx] = Some(encode_enum_value(&func.enums[eidx], &arg.value, line)?);
                continue;
            }
            if !func.enums.is_empty() {
                let mut allowed: Vec<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
                allowed.extend(func.enums.iter().map(|e| e.name.as_str()));
                return Err(Error::EnumValue {
                    line,
                    message: format!("unknown named arguments/enum: `{name}` (allowed: {})", allowed.join(", ")),
                });
            }
            // With no enums declared, stray named arguments are dropped.
        }

        let mut next = positionals.into_iter();
        for idx in 0..func.params.len() {
            if param_values[idx].is_none() {
                let Some(arg) = next.next() else { break };
                param_values[idx] = Some(self.coerce_value(func.params[idx].mode, &arg.value, line, pre)?);
            }
        }

        if module == "if_value" && is_var_exists(func) {
            mirror_var_exists(func, &mut param_values);
        }

        let mut tokens = Vec::new();
        for (param, value) in func.params.iter().zip(&param_values) {
            if let Some(value) = value {
                tokens.push(format!("slot({})={value}", param.slot));
            }
        }
        for (e, value) in func.enums.iter().zip(&enum_values) {
            if let Some(value) = value {
                tokens.push(format!("slot({})={value}", e.slot));
            }
        }
        Ok(if tokens.is_empty() { NO_ARGS.to_owned() } else { tokens.join(",") })
    }

    fn coerce_value(&mut self, mode: Mode, raw: &str, line: usize, pre: &mut Vec<Node>) -> Result<String> {
        let kind = classify_value(raw);
        let fail = |message: String| Err(Error::Coerce { line, message });
        match mode {
            Mode::Text => match kind {
                ValueKind::Quoted(inner) => Ok(format!("text({})", process_text_literal(&inner))),
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                ValueKind::Number(n) => Ok(format!("text({n})")),
                ValueKind::Expr(e) => self.hoist_numeric(&e, line, pre),
                _ => fail(format!("cannot coerce `{raw}` into a text argument")),
            },
            Mode::Number => match kind {
                ValueKind::Number(n) => Ok(format!("num({n})")),
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                ValueKind::Quoted(inner) => {
                    if parse_num_expr(&inner).and_then(|e| e.fold()).is_some() {
                        Ok(format!("num({inner})"))
                    } else {
                        Ok(format!("var({inner})"))
                    }
                }
                ValueKind::Expr(e) => self.hoist_numeric(&e, line, pre),
                _ => fail(format!("cannot coerce `{raw}` into a number argument")),
            },
            Mode::Variable => match kind {
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                ValueKind::Quoted(inner) => Ok(format!("var({inner})")),
                ValueKind::VarSave(name) => Ok(format!("var_save({name})")),
                ValueKind::ItemCall(inner) => {
                    eprintln!("[warn] line {line}: VARIABLE argument got an item(...) literal; passing it through");
                    Ok(normalize_item_literal(&inner))
                }
                _ => fail(format!("VARIABLE argument must be a variable name, got: {raw}")),
            },
            Mode::Item | Mode::Vector | Mode::Block => match kind {
                ValueKind::ItemCall(inner) => Ok(normalize_item_literal(&inner)),
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                ValueKind::Quoted(_) => Ok(format!("item({})", raw.trim())),
                _ => fail(format!("cannot coerce `{raw}` into an item argument")),
            },
            Mode::Location => match kind {
                ValueKind::LocCall(inner) => Ok(paper_item(&inner)),
                ValueKind::Quoted(inner) => Ok(format!("item(minecraft:paper, name={})", quote(&process_text_literal(&inner)))),
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                _ => fail(format!("cannot coerce `{raw}` into a location argument")),
            },
            Mode::Array => match kind {
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                ValueKind::ArrSave(name) => Ok(format!("var({name}\u{2398})")),
                ValueKind::Quoted(inner) => Ok(format!("var({inner})")),
                _ => fail(format!("cannot coerce `{raw}` into an array argument")),
            },
            Mode::Any => match kind {
                ValueKind::Number(n) => Ok(n),
                ValueKind::Quoted(inner) => Ok(format!("text({})", process_text_literal(&inner))),
                ValueKind::Ident(id) => Ok(format!("var({id})")),
                ValueKind::ItemCall(inner) => Ok(normalize_item_literal(&inner)),
                ValueKind::LocCall(inner) => Ok(paper_item(&inner)),
                ValueKind::ArrSave(name) => Ok(format!("var({name}\u{2398})")),
                ValueKind::VarSave(name) => Ok(format!("var_save({name})")),
                ValueKind::Expr(e) => self.hoist_numeric(&e, line, pre),
                ValueKind::Empty => fail(format!("empty value cannot fill an argument: {raw}")),
            },
        }
    }

    /// Compiles an arithmetic expression into pre-action entries that
    /// fill a fresh temp variable; constants fold away entirely.
    fn hoist_numeric(&mut self, text: &str, line: usize, pre: &mut Vec<Node>) -> Result<String> {
        let Some(expr) = parse_num_expr(text) else {
            return Err(Error::Coerce { line, message: format!("cannot coerce expression: {text}") });
        };
        if let Some(v) = expr.fold() {
            return Ok(format!("num({})", format_number(v)));
        }
        let tmp = self.fresh_tmp();
        self.emit_num_expr_into(&tmp, &expr, line, pre)?;
        Ok(format!("var({tmp})"))
    }
}

fn op_symbol(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "+=",
        ArithOp::Sub => "-=",
        ArithOp::Mul => "*=",
        ArithOp::Div => "/=",
    }
}

fn arith_canonical(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "set_sum",
        ArithOp::Sub => "set_difference",
        ArithOp::Mul => "set_product",
        ArithOp::Div => "set_quotient",
    }
}

fn is_call_function(func: &ApiFunc) -> bool {
    let s2 = normalize(&func.sign2);
    s2 == "вызвать функцию" || s2 == "call function"
}

fn is_var_exists(func: &ApiFunc) -> bool {
    let s2 = normalize(&func.sign2);
    (s2 == "переменная существует" || s2 == "variable exists")
        && func.params.iter().filter(|p| p.mode == Mode::Variable).count() == 2
}

/// Mirrors a single provided VARIABLE value into the historical second
/// slot of the two-slot "variable exists" form.
fn mirror_var_exists(func: &ApiFunc, values: &mut [Option<String>]) {
    let var_indexes: Vec<usize> = func
        .params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.mode == Mode::Variable)
        .map(|(i, _)| i)
        .collect();
    if let [a, b] = var_indexes.as_slice() {
        match (values[*a].clone(), values[*b].clone()) {
            (Some(v), None) => values[*b] = Some(v),
            (None, Some(v)) => values[*a] = Some(v),
            _ => {}
        }
    }
}

/// `vector2`-style named keys address the n-th parameter of a mode.
fn mode_alias_index(func: &ApiFunc, name: &str) -> Option<usize> {
    let trimmed = name.trim();
    let digits_at = trimmed.find(|c: char| c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (base, suffix) = trimmed.split_at(digits_at);
    let n: usize = if suffix.is_empty() { 1 } else { suffix.parse().ok()? };
    let mode = match base {
        "vector" => Mode::Vector,
        "num" | "number" => Mode::Number,
        "text" => Mode::Text,
        "item" => Mode::Item,
        "loc" | "location" => Mode::Location,
        "arr" | "array" => Mode::Array,
        "value" => Mode::Any,
        "var" | "variable" => Mode::Variable,
        _ => return None,
    };
    func.params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.mode == mode)
        .map(|(i, _)| i)
        .nth(n - 1)
}

fn encode_enum_value(spec: &crate::api::ApiEnum, raw: &str, line: usize) -> Result<String> {
    let content = match classify_value(raw) {
        ValueKind::Quoted(inner) => inner,
        ValueKind::Ident(id) => id,
        ValueKind::Number(n) => n,
        _ => raw.trim().to_owned(),
    };
    let wanted = norm_enum_label(&content);
    for key in spec.options.keys() {
        if norm_enum_label(key) == wanted {
            return Ok(format!("text({key})"));
        }
    }
    let allowed: Vec<&str> = spec.options.keys().map(String::as_str).collect();
    Err(Error::EnumValue {
        line,
        message: format!("enum `{}`: value `{content}` is not in options (allowed: {})", spec.name, allowed.join(", ")),
    })
}

/// The "greater or equal" option the multiselect cutoff compare uses.
fn pick_gte_option(spec: &crate::api::ApiEnum) -> Option<String> {
    for key in spec.options.keys() {
        let n = normalize(key);
        if n.contains("больше или равно") || n.contains("greater or equal") || key.contains('≥') || n.contains(">=") {
            return Some(key.clone());
        }
    }
    spec.options.keys().next().cloned()
}

fn paper_item(inner: &str) -> String {
    match classify_value(inner) {
        ValueKind::Quoted(s) => format!("item(minecraft:paper, name={})", quote(&process_text_literal(&s))),
        _ => format!("item(minecraft:paper, name={})", quote(inner.trim())),
    }
}
