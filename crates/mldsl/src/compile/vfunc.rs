//! `vfunc` macro expansion: textual parameter substitution at call
//! sites, string literals left untouched.

use regex::Regex;

use super::ast::{CallStmt, VfuncDef};
use crate::error::{Error, Result};

/// Binds call-site arguments to the macro's parameters.
///
/// Positional arguments map in order; named arguments override by
/// parameter name; anything left unfilled takes its default. Unknown
/// names and missing required arguments fail fast.
fn bind_args(def: &VfuncDef, call: &CallStmt) -> Result<Vec<(String, String)>> {
    let line = call.line;
    let mut values: Vec<Option<String>> = vec![None; def.params.len()];
    let mut next_positional = 0usize;
    for arg in &call.args {
        match &arg.name {
            None => {
                if next_positional >= def.params.len() {
                    return Err(Error::Macro {
                        line,
                        message: format!("vfunc {}: too many positional arguments", def.name),
                    });
                }
                values[next_positional] = Some(arg.value.clone());
                next_positional += 1;
            }
            Some(name) => {
                let Some(idx) = def.params.iter().position(|p| p.name == *name) else {
                    return Err(Error::Macro { line, message: format!("vfunc {}: unknown argument `{name}`", def.name) });
                };
                values[idx] = Some(arg.value.clone());
            }
        }
    }
    let mut bound = Vec::with_capacity(def.params.len());
    for (param, value) in def.params.iter().zip(values) {
        let value = match value.or_else(|| param.default.clone()) {
            Some(v) => v,
            None => {
                return Err(Error::Macro {
                    line,
                    message: format!("vfunc {}: missing required argument `{}`", def.name, param.name),
                });
            }
        };
        bound.push((param.name.clone(), value));
    }
    Ok(bound)
}

/// Replaces whole-word parameter occurrences outside string literals.
fn substitute_line(line: &str, bindings: &[(String, Regex, String)]) -> String {
    let mut out = String::with_capacity(line.len());
    let mut segment = String::new();
    let mut in_string = false;
    let mut escaped = false;
    let flush = |segment: &mut String, out: &mut String| {
        let mut text = std::mem::take(segment);
        for (_, re, replacement) in bindings {
            text = re.replace_all(&text, replacement.as_str()).into_owned();
        }
        out.push_str(&text);
    };
    for ch in line.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            flush(&mut segment, &mut out);
            out.push(ch);
            in_string = true;
        } else {
            segment.push(ch);
        }
    }
    flush(&mut segment, &mut out);
    out
}

/// Expands one call site into substituted body lines (text plus the
/// definition's line number for diagnostics).
pub(crate) fn expand_body(def: &VfuncDef, call: &CallStmt) -> Result<Vec<(String, usize)>> {
    let bound = bind_args(def, call)?;
    let bindings: Vec<(String, Regex, String)> = bound
        .into_iter()
        .map(|(name, value)| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(&name))).expect("escaped pattern is valid");
            // `$` in the replacement would otherwise be treated as a
            // capture-group reference.
            let replacement = value.replace('$', "$$");
            (name, re, replacement)
        })
        .collect();
    Ok(def.body.iter().map(|line| (substitute_line(line, &bindings), def.line)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::ast::{CallArg, VfuncParam};

    fn def(params: Vec<VfuncParam>, body: &[&str]) -> VfuncDef {
        VfuncDef { name: "m".into(), params, body: body.iter().map(|s| (*s).to_owned()).collect(), line: 1 }
    }

    fn call(args: Vec<CallArg>) -> CallStmt {
        CallStmt { negated: false, path: vec!["m".into()], args, body: None, line: 5, raw: String::new() }
    }

    #[test]
    fn substitution_skips_string_literals() {
        let d = def(vec![VfuncParam { name: "v".into(), default: None }], &["player.msg(text=\"v\")", "player.msg(text=v)"]);
        let lines = expand_body(&d, &call(vec![CallArg { name: None, value: "abc".into() }])).expect("expands");
        assert_eq!(lines[0].0, "player.msg(text=\"v\")");
        assert_eq!(lines[1].0, "player.msg(text=abc)");
    }

    #[test]
    fn defaults_fill_missing_arguments() {
        let d = def(
            vec![
                VfuncParam { name: "a".into(), default: None },
                VfuncParam { name: "b".into(), default: Some("\"x\"".into()) },
            ],
            &["player.msg(text=b)"],
        );
        let lines = expand_body(&d, &call(vec![CallArg { name: None, value: "q".into() }])).expect("expands");
        assert_eq!(lines[0].0, "player.msg(text=\"x\")");
    }

    #[test]
    fn unknown_and_missing_arguments_fail_fast() {
        let d = def(vec![VfuncParam { name: "a".into(), default: None }], &[]);
        let err = expand_body(&d, &call(vec![CallArg { name: Some("zz".into()), value: "1".into() }])).unwrap_err();
        assert!(err.to_string().contains("unknown argument"));
        let err = expand_body(&d, &call(vec![])).unwrap_err();
        assert!(err.to_string().contains("missing required argument"));
    }
}
