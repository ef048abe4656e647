use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

// One assignment candidate per physical line: NAME=VALUE, with the value
// either unquoted or wrapped in double quotes on both sides.
fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^([a-zA-Z0-9_]+)=("|)(.*?)("|)$"#).expect("assignment regex")
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Raw,
    /// Inside a bare `$name` substitution.
    Simple,
    /// Inside a `${...}` expression (possibly nested).
    Complex,
}

/// Parser for the global variables of flat shell-dialect files (APKBUILD,
/// deviceinfo). Only `NAME=VALUE` lines are understood; comments, functions
/// and control flow are skipped without being interpreted.
///
/// Values are expanded eagerly, line by line, against the variables defined
/// so far. Reassigning a name overwrites it but never recomputes values that
/// already consumed the old one.
#[derive(Debug, Default)]
pub struct ShellParser {
    variables: BTreeMap<String, String>,
}

impl ShellParser {
    /// Scan `data` and evaluate every well-formed assignment in file order.
    /// `environment` is merged into the table first, so the file can
    /// reference variables defined by the build environment.
    pub fn parse(data: &str, environment: &BTreeMap<String, String>) -> Result<Self> {
        let mut parser = Self {
            variables: environment.clone(),
        };
        parser.scan(data)?;
        Ok(parser)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn into_variables(self) -> BTreeMap<String, String> {
        self.variables
    }

    fn scan(&mut self, data: &str) -> Result<()> {
        for line in data.lines() {
            let Some(caps) = assignment_regex().captures(line) else {
                continue;
            };
            if caps[2] != caps[4] {
                // Asymmetric quoting starts a multi-line value, which this
                // dialect does not support. The line is skipped, not an error.
                continue;
            }
            let name = caps[1].to_string();
            let resolved = self.substitute(&caps[3])?;
            self.variables.insert(name, resolved);
        }
        Ok(())
    }

    /// Evaluate the right-hand side of one assignment with a three-state
    /// machine: `Raw` copies characters through, `Simple` collects a bare
    /// `$name`, `Complex` collects `${...}` expressions with nesting.
    fn substitute(&mut self, value: &str) -> Result<String> {
        // The sentinel guarantees one final transition, so a substitution
        // that runs to the end of the value still gets flushed.
        let mut chars: Vec<char> = value.chars().collect();
        chars.push('\0');

        let mut state = State::Raw;
        // Stack of interpolation buffers, one per open ${ level.
        let mut stack: Vec<String> = Vec::new();
        // Name buffer for simple $name substitutions.
        let mut simple = String::new();
        let mut out = String::new();

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match state {
                State::Raw => {
                    if c != '$' {
                        out.push(c);
                    } else if chars.get(i + 1) == Some(&'{') {
                        state = State::Complex;
                    } else {
                        state = State::Simple;
                    }
                }
                State::Simple => {
                    if is_name_char(c) {
                        simple.push(c);
                    } else {
                        let value = self
                            .variables
                            .get(&simple)
                            .ok_or_else(|| Error::UndefinedVariable(simple.clone()))?;
                        out.push_str(value);
                        simple.clear();
                        state = State::Raw;
                        // The terminating character belongs to the raw text;
                        // rewind so the next iteration processes it again.
                        i -= 1;
                    }
                }
                State::Complex => {
                    if c == '{' {
                        stack.push(String::new());
                    } else if c == '$' && chars.get(i + 1) == Some(&'{') {
                        // Nested ${, open a deeper buffer and skip the brace.
                        stack.push(String::new());
                        i += 1;
                    } else if c == '}' {
                        let label = stack.pop().unwrap_or_default();
                        let value = self.eval_label(&label)?;
                        match stack.last_mut() {
                            Some(top) => top.push_str(&value),
                            None => {
                                out.push_str(&value);
                                state = State::Raw;
                            }
                        }
                    } else if let Some(top) = stack.last_mut() {
                        top.push(c);
                    }
                }
            }
            i += 1;
        }

        // Strip the sentinel again.
        out.pop();
        Ok(out)
    }

    /// Evaluate the label of one `${...}` expression.
    ///
    /// Dispatch is ordered substring matching, so a default value that
    /// contains an operator character of a later form is never reinterpreted.
    /// That is ambiguous on paper but exactly what existing recipes rely on.
    fn eval_label(&mut self, label: &str) -> Result<String> {
        // ${variable}
        if let Some(value) = self.variables.get(label) {
            return Ok(value.clone());
        }

        // ${variable:-default}
        // Default if unset or empty; the table is not touched.
        if label.contains(":-") {
            let (lookup, rest) = split_label(label, ':');
            let default = tail(rest);
            return Ok(match self.variables.get(lookup) {
                Some(v) if !v.is_empty() => v.clone(),
                _ => default.to_string(),
            });
        }

        // ${variable:=default}
        // Like :- but the default is also assigned to the variable.
        if label.contains(":=") {
            let (lookup, rest) = split_label(label, ':');
            let default = tail(rest);
            return Ok(match self.variables.get(lookup) {
                Some(v) if !v.is_empty() => v.clone(),
                _ => {
                    self.variables
                        .insert(lookup.to_string(), default.to_string());
                    default.to_string()
                }
            });
        }

        // ${variable=default}
        // Assign and return the default only if the variable is unset.
        if label.contains('=') {
            let (lookup, default) = split_label(label, '=');
            return Ok(match self.variables.get(lookup) {
                Some(v) => v.clone(),
                None => {
                    self.variables
                        .insert(lookup.to_string(), default.to_string());
                    default.to_string()
                }
            });
        }

        // ${#variable}: decimal string length of the variable's value.
        // ${variable#pattern}: remove the pattern from the start of the
        // value if it matches, otherwise return the value unchanged.
        if label.contains('#') {
            let (variable, pattern) = split_label(label, '#');
            if variable.is_empty() {
                let value = self
                    .variables
                    .get(pattern)
                    .ok_or_else(|| Error::UndefinedVariable(pattern.to_string()))?;
                return Ok(value.chars().count().to_string());
            }
            let value = self
                .variables
                .get(variable)
                .ok_or_else(|| Error::UndefinedVariable(variable.to_string()))?;
            return Ok(match value.strip_prefix(pattern) {
                Some(rest) => rest.to_string(),
                None => value.clone(),
            });
        }

        // A plain name that reached this point is simply not defined; only
        // labels with unrecognized operator content are "expressions".
        if !label.is_empty() && label.chars().all(is_name_char) {
            return Err(Error::UndefinedVariable(label.to_string()));
        }
        Err(Error::UnrecognizedExpression(label.to_string()))
    }
}

/// Split once on the operator separator. The caller has already checked that
/// the separator occurs in the label.
fn split_label(label: &str, sep: char) -> (&str, &str) {
    match label.split_once(sep) {
        Some((left, right)) => (left, right),
        None => (label, ""),
    }
}

/// Drop the operator character that `split_label` leaves at the head of a
/// `:-`/`:=` default.
fn tail(s: &str) -> &str {
    let mut cs = s.chars();
    cs.next();
    cs.as_str()
}
