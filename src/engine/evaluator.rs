#![forbid(unsafe_code)]

//! The recursive rule interpreter
//!
//! One [`Evaluator`] is created per validate call and owns all mutable state:
//! the location stack, the rejection trail, and the recursion depth. The
//! catalog and the native registry are shared read-only, so concurrent calls
//! never contend.
//!
//! Alternations run in two phases. The accept phase scans candidates in order
//! and commits to the first whose shape matches; the reject phase then applies
//! every candidate's refinements to the committed subject. Refinements
//! (`max-size`, `prefix`, `key`, comparisons) are wildcards during accept, so
//! a shape candidate earlier in the list wins even when a refinement follows.
//!
//! Rejections recorded while trying candidates are speculative: the trail is
//! truncated back to its entry mark when an alternation succeeds, keeping the
//! invariant that a true verdict leaves the trail empty.

use crate::error::ValidateError;
use crate::natives::NativeRegistry;
use crate::path::{Path, Segment};
use crate::rules::line::{Condition, Invocation, RuleLine, TypeName};
use crate::rules::{CatalogEntry, RuleCatalog};
use crate::engine::Rejection;
use serde_json::Value;

/// Depth guard tripping point; generous for data, tight enough to cut off
/// non-terminating rule cycles quickly
pub(crate) const MAX_DEPTH: usize = 512;

/// Template member that matches keys the template does not mention
const WILDCARD_KEY: &str = "%";

pub(crate) struct Evaluator<'a> {
    catalog: &'a RuleCatalog,
    natives: &'a NativeRegistry,
    path: Path,
    rejections: Vec<Rejection>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(catalog: &'a RuleCatalog, natives: &'a NativeRegistry) -> Self {
        Evaluator {
            catalog,
            natives,
            path: Path::root(),
            rejections: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn into_rejections(self) -> Vec<Rejection> {
        self.rejections
    }

    /// Evaluates a rule referenced by name, the entry point for a validate call
    ///
    /// Names that spell a built-in type, a `'literal`, or a comment evaluate
    /// directly; anything else resolves through the catalog.
    pub(crate) fn eval_named(
        &mut self,
        subject: Option<&Value>,
        name: &str,
        args: &[Value],
    ) -> Result<bool, ValidateError> {
        match RuleLine::parse(&Value::String(name.to_string())) {
            Ok(RuleLine::Name(name)) => match self.catalog.get(&name) {
                Some(CatalogEntry::Rule(rule)) => self.eval_rule(subject, rule),
                Some(CatalogEntry::Native) => {
                    let ok = self.native_accept(&name, subject, args)?
                        && self.native_reject(&name, subject, args)?;
                    if !ok {
                        self.record(Value::String(name));
                    }
                    Ok(ok)
                }
                None => Err(ValidateError::UndefinedRule(name)),
            },
            Ok(rule) => self.eval_rule(subject, &rule),
            // A bare name never fails to parse.
            Err(_) => Err(ValidateError::UndefinedRule(name.to_string())),
        }
    }

    /// Evaluates one rule line against the current subject
    ///
    /// Records a rejection at the current location when the verdict is false,
    /// except where a structural form (template, alternation) already recorded
    /// a more precise one.
    fn eval_rule(&mut self, subject: Option<&Value>, rule: &RuleLine) -> Result<bool, ValidateError> {
        self.descend()?;
        let result = self.eval_rule_inner(subject, rule);
        self.depth -= 1;
        result
    }

    fn eval_rule_inner(
        &mut self,
        subject: Option<&Value>,
        rule: &RuleLine,
    ) -> Result<bool, ValidateError> {
        match rule {
            RuleLine::Choice(candidates) => self.eval_choice_inner(subject, candidates),
            RuleLine::Template(template) => {
                self.object_match(subject, template, &[], || rule.to_value())
            }
            RuleLine::Name(name) => match self.catalog.get(name) {
                Some(CatalogEntry::Rule(body)) => self.eval_rule(subject, body),
                Some(CatalogEntry::Native) => {
                    let ok = self.native_accept(name, subject, &[])?
                        && self.native_reject(name, subject, &[])?;
                    if !ok {
                        self.record(rule.to_value());
                    }
                    Ok(ok)
                }
                None => Err(ValidateError::UndefinedRule(name.clone())),
            },
            // Object and tuple shapes surface their own member-level
            // rejections; an extra record at the container would repeat them.
            RuleLine::Op(Invocation::Object { template, extra }) => {
                self.object_match(subject, template, extra, || rule.to_value())
            }
            RuleLine::Op(Invocation::Tuple(rules)) => {
                self.tuple_match(subject, rules, false, || rule.to_value())
            }
            RuleLine::Op(Invocation::Vartuple(rules)) => {
                self.tuple_match(subject, rules, true, || rule.to_value())
            }
            RuleLine::Op(Invocation::Call { name, args }) => match self.catalog.get(name) {
                Some(CatalogEntry::Rule(body)) => self.eval_rule(subject, body),
                Some(CatalogEntry::Native) => {
                    let ok = self.native_accept(name, subject, args)?
                        && self.native_reject(name, subject, args)?;
                    if !ok {
                        self.record(rule.to_value());
                    }
                    Ok(ok)
                }
                None => Err(ValidateError::UndefinedRule(name.clone())),
            },
            _ => {
                let ok =
                    self.accept_one(subject, rule)? && self.reject_one(subject, rule)?;
                if !ok {
                    self.record(rule.to_value());
                }
                Ok(ok)
            }
        }
    }

    /// Evaluates an ordered alternation with the two-phase discipline
    fn eval_choice(
        &mut self,
        subject: Option<&Value>,
        candidates: &[RuleLine],
    ) -> Result<bool, ValidateError> {
        self.descend()?;
        let result = self.eval_choice_inner(subject, candidates);
        self.depth -= 1;
        result
    }

    fn eval_choice_inner(
        &mut self,
        subject: Option<&Value>,
        candidates: &[RuleLine],
    ) -> Result<bool, ValidateError> {
        let mark = self.rejections.len();
        let mut accepted = false;
        for candidate in candidates {
            if matches!(candidate, RuleLine::Comment(_)) {
                continue;
            }
            if self.accept_one(subject, candidate)? {
                accepted = true;
                break;
            }
        }
        if accepted {
            let mut rejected = false;
            for candidate in candidates {
                if matches!(candidate, RuleLine::Comment(_)) {
                    continue;
                }
                if !self.reject_one(subject, candidate)? {
                    rejected = true;
                    break;
                }
            }
            if !rejected {
                self.rejections.truncate(mark);
                return Ok(true);
            }
        }
        self.record(Value::Array(
            candidates.iter().map(RuleLine::to_value).collect(),
        ));
        Ok(false)
    }

    /// Evaluates a rule-list operand: one rule directly, several as an
    /// alternation
    fn eval_alternatives(
        &mut self,
        subject: Option<&Value>,
        rules: &[RuleLine],
    ) -> Result<bool, ValidateError> {
        match rules {
            [single] => self.eval_rule(subject, single),
            _ => self.eval_choice(subject, rules),
        }
    }

    /// Accept phase: does this candidate's shape match the subject?
    fn accept_one(
        &mut self,
        subject: Option<&Value>,
        rule: &RuleLine,
    ) -> Result<bool, ValidateError> {
        match rule {
            RuleLine::Comment(_) => Ok(false),
            RuleLine::Type(ty) => Ok(type_check(subject, *ty)),
            RuleLine::Literal(text) => {
                Ok(subject.and_then(Value::as_str) == Some(text.as_str()))
            }
            RuleLine::Scalar(v) => Ok(subject == Some(v)),
            RuleLine::Name(name) => match self.catalog.get(name) {
                Some(CatalogEntry::Rule(body)) => self.eval_rule(subject, body),
                Some(CatalogEntry::Native) => self.native_accept(name, subject, &[]),
                None => Err(ValidateError::UndefinedRule(name.clone())),
            },
            RuleLine::Choice(candidates) => self.eval_choice(subject, candidates),
            RuleLine::Template(template) => {
                self.object_match(subject, template, &[], || rule.to_value())
            }
            RuleLine::Op(inv) => self.accept_invocation(subject, inv),
        }
    }

    /// Reject phase: does this candidate's refinement pass on the subject?
    fn reject_one(
        &mut self,
        subject: Option<&Value>,
        rule: &RuleLine,
    ) -> Result<bool, ValidateError> {
        match rule {
            RuleLine::Op(inv) => self.reject_invocation(subject, inv),
            RuleLine::Name(name) => match self.catalog.get(name) {
                Some(CatalogEntry::Rule(_)) => Ok(true),
                Some(CatalogEntry::Native) => self.native_reject(name, subject, &[]),
                None => Err(ValidateError::UndefinedRule(name.clone())),
            },
            _ => Ok(true),
        }
    }

    fn accept_invocation(
        &mut self,
        subject: Option<&Value>,
        inv: &Invocation,
    ) -> Result<bool, ValidateError> {
        match inv {
            Invocation::Array(rules) => {
                let Some(Value::Array(items)) = subject else {
                    return Ok(false);
                };
                if rules.is_empty() {
                    return Ok(true);
                }
                for (i, item) in items.iter().enumerate() {
                    self.path.push(Segment::Index(i));
                    let ok = self.eval_alternatives(Some(item), rules)?;
                    self.path.pop();
                    if !ok {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Invocation::Object { template, extra } => {
                self.object_match(subject, template, extra, || inv.to_value())
            }
            Invocation::Tuple(rules) => self.tuple_match(subject, rules, false, || inv.to_value()),
            Invocation::Vartuple(rules) => {
                self.tuple_match(subject, rules, true, || inv.to_value())
            }
            Invocation::Not(rules) => {
                let mark = self.rejections.len();
                for rule in rules {
                    if matches!(rule, RuleLine::Comment(_)) {
                        continue;
                    }
                    if self.accept_one(subject, rule)? {
                        self.rejections.truncate(mark);
                        return Ok(false);
                    }
                }
                self.rejections.truncate(mark);
                Ok(true)
            }
            Invocation::All(conditions) => self.accept_all(subject, conditions),
            Invocation::Call { name, args } => match self.catalog.get(name) {
                Some(CatalogEntry::Rule(body)) => self.eval_rule(subject, body),
                Some(CatalogEntry::Native) => self.native_accept(name, subject, args),
                None => Err(ValidateError::UndefinedRule(name.clone())),
            },
            // Refinements accept anything; they constrain during reject.
            Invocation::Prefix { .. }
            | Invocation::Suffix { .. }
            | Invocation::MaxSize(_)
            | Invocation::MinSize(_)
            | Invocation::Key(_)
            | Invocation::Compare(_) => Ok(true),
        }
    }

    fn reject_invocation(
        &mut self,
        subject: Option<&Value>,
        inv: &Invocation,
    ) -> Result<bool, ValidateError> {
        match inv {
            Invocation::MaxSize(n) => Ok(size_of(subject).is_none_or(|s| s <= *n)),
            Invocation::MinSize(n) => Ok(size_of(subject).is_none_or(|s| s >= *n)),
            Invocation::Prefix { affix, rest } => self.affix_check(subject, affix, rest, true),
            Invocation::Suffix { affix, rest } => self.affix_check(subject, affix, rest, false),
            Invocation::Key(rules) => {
                let Some(key) = self.path.current_key().map(str::to_string) else {
                    return Ok(false);
                };
                let key = Value::String(key);
                self.eval_alternatives(Some(&key), rules)
            }
            Invocation::Compare(pairs) => {
                for (op, bound) in pairs {
                    if !self.native_reject(op.as_str(), subject, std::slice::from_ref(bound))? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Invocation::Call { name, args } => match self.catalog.get(name) {
                Some(CatalogEntry::Rule(_)) => Ok(true),
                Some(CatalogEntry::Native) => self.native_reject(name, subject, args),
                None => Err(ValidateError::UndefinedRule(name.clone())),
            },
            // Shape operators constrain during accept only.
            Invocation::Array(_)
            | Invocation::Object { .. }
            | Invocation::Tuple(_)
            | Invocation::Vartuple(_)
            | Invocation::Not(_)
            | Invocation::All(_) => Ok(true),
        }
    }

    /// `["object", template, extra...]` and bare templates
    ///
    /// Template members are checked against the member value (absent members
    /// evaluate as undefined, so `"optional"` alternatives admit them). Keys
    /// the template does not mention must match the extra alternation, or the
    /// `"%"` wildcard member when no extra rules are given; with neither, any
    /// unknown key rejects.
    fn object_match(
        &mut self,
        subject: Option<&Value>,
        template: &indexmap::IndexMap<String, RuleLine>,
        extra: &[RuleLine],
        origin: impl Fn() -> Value,
    ) -> Result<bool, ValidateError> {
        let Some(Value::Object(map)) = subject else {
            self.record(origin());
            return Ok(false);
        };
        for (key, rule) in template {
            if key == WILDCARD_KEY {
                continue;
            }
            let member = map.get(key);
            self.path.push(Segment::Key(key.clone()));
            let ok = self.eval_rule(member, rule)?;
            self.path.pop();
            if !ok {
                return Ok(false);
            }
        }
        for (key, value) in map {
            if key != WILDCARD_KEY && template.contains_key(key) {
                continue;
            }
            self.path.push(Segment::Key(key.clone()));
            let ok = if !extra.is_empty() {
                self.eval_alternatives(Some(value), extra)?
            } else if let Some(rule) = template.get(WILDCARD_KEY) {
                self.eval_rule(Some(value), rule)?
            } else {
                self.record(origin());
                false
            };
            self.path.pop();
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `tuple` / `vartuple`: positional rules over an array
    ///
    /// Iterates to the longer of the two lengths so missing required positions
    /// evaluate as undefined and surplus elements are caught. A variadic tail
    /// wraps through the rule list modulo its length; every started wrap group
    /// must complete, so the bound rounds up to the next group boundary.
    fn tuple_match(
        &mut self,
        subject: Option<&Value>,
        positions: &[RuleLine],
        variadic: bool,
        origin: impl Fn() -> Value,
    ) -> Result<bool, ValidateError> {
        let Some(Value::Array(items)) = subject else {
            self.record(origin());
            return Ok(false);
        };
        let n = positions.len();
        if n == 0 {
            if !variadic && !items.is_empty() {
                self.path.push(Segment::Index(0));
                self.record(origin());
                self.path.pop();
                return Ok(false);
            }
            return Ok(true);
        }
        let bound = if variadic {
            items.len().div_ceil(n).max(1) * n
        } else {
            items.len().max(n)
        };
        for i in 0..bound {
            let rule = if i < n {
                &positions[i]
            } else if variadic {
                &positions[i % n]
            } else {
                self.path.push(Segment::Index(i));
                self.record(origin());
                self.path.pop();
                return Ok(false);
            };
            let member = items.get(i);
            self.path.push(Segment::Index(i));
            let ok = self.eval_rule(member, rule)?;
            self.path.pop();
            if !ok {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `all`: every condition must hold
    fn accept_all(
        &mut self,
        subject: Option<&Value>,
        conditions: &[Condition],
    ) -> Result<bool, ValidateError> {
        for condition in conditions {
            match condition {
                Condition::Comment(_) => {}
                Condition::Rule(rule) => {
                    if !self.eval_rule(subject, rule)? {
                        return Ok(false);
                    }
                }
                Condition::Compare(op, bound) => {
                    if !self.native_reject(op.as_str(), subject, std::slice::from_ref(bound))? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// `prefix` / `suffix` refinement over strings and arrays
    ///
    /// When continuation rules are given, the remainder after stripping the
    /// affix must match them.
    fn affix_check(
        &mut self,
        subject: Option<&Value>,
        affix: &Value,
        rest: &[RuleLine],
        leading: bool,
    ) -> Result<bool, ValidateError> {
        let remainder = match (subject, affix) {
            (Some(Value::String(s)), Value::String(a)) => {
                let stripped = if leading {
                    s.strip_prefix(a.as_str())
                } else {
                    s.strip_suffix(a.as_str())
                };
                match stripped {
                    Some(rem) => Value::String(rem.to_string()),
                    None => return Ok(false),
                }
            }
            (Some(Value::Array(items)), Value::Array(a)) => {
                if items.len() < a.len() {
                    return Ok(false);
                }
                let (matched, rem) = if leading {
                    (&items[..a.len()], &items[a.len()..])
                } else {
                    (&items[items.len() - a.len()..], &items[..items.len() - a.len()])
                };
                if matched != a.as_slice() {
                    return Ok(false);
                }
                Value::Array(rem.to_vec())
            }
            _ => return Ok(false),
        };
        if rest.is_empty() {
            return Ok(true);
        }
        self.eval_alternatives(Some(&remainder), rest)
    }

    fn native_accept(
        &self,
        name: &str,
        subject: Option<&Value>,
        args: &[Value],
    ) -> Result<bool, ValidateError> {
        match self.natives.get(name) {
            Some(predicate) => Ok(predicate.accept(subject, args)),
            None => Err(ValidateError::UndefinedRule(name.to_string())),
        }
    }

    fn native_reject(
        &self,
        name: &str,
        subject: Option<&Value>,
        args: &[Value],
    ) -> Result<bool, ValidateError> {
        match self.natives.get(name) {
            Some(predicate) => Ok(predicate.reject(subject, args)),
            None => Err(ValidateError::UndefinedRule(name.to_string())),
        }
    }

    fn record(&mut self, rule: Value) {
        self.rejections
            .push(Rejection::new(self.path.segments().to_vec(), rule));
    }

    fn descend(&mut self) -> Result<(), ValidateError> {
        if self.depth >= MAX_DEPTH {
            return Err(ValidateError::RecursionLimit(MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }
}

fn type_check(subject: Option<&Value>, ty: TypeName) -> bool {
    match ty {
        TypeName::Any => subject.is_some(),
        TypeName::Undefined => subject.is_none(),
        TypeName::Null => matches!(subject, Some(Value::Null)),
        TypeName::String => matches!(subject, Some(Value::String(_))),
        TypeName::Number => matches!(subject, Some(Value::Number(_))),
        TypeName::Boolean => matches!(subject, Some(Value::Bool(_))),
        TypeName::Array => matches!(subject, Some(Value::Array(_))),
        TypeName::Object => matches!(subject, Some(Value::Object(_))),
    }
}

/// Element count for containers, character count for strings
fn size_of(subject: Option<&Value>) -> Option<u64> {
    match subject {
        Some(Value::Array(items)) => Some(items.len() as u64),
        Some(Value::Object(map)) => Some(map.len() as u64),
        Some(Value::String(s)) => Some(s.chars().count() as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(doc: Value, subject: Value) -> (bool, Value) {
        let natives = NativeRegistry::with_builtins();
        let catalog = RuleCatalog::from_value(&doc, &natives).unwrap();
        let mut evaluator = Evaluator::new(&catalog, &natives);
        let ok = evaluator
            .eval_named(Some(&subject), RuleCatalog::ENTRY_RULE, &[])
            .unwrap();
        let trail = Value::Array(
            evaluator
                .into_rejections()
                .iter()
                .map(Rejection::to_value)
                .collect(),
        );
        (ok, trail)
    }

    #[test]
    fn test_leaf_failure_records_at_root() {
        let (ok, trail) = eval(json!({"": "string"}), json!(12.5));
        assert!(!ok);
        assert_eq!(trail, json!([[[], "string"]]));
    }

    #[test]
    fn test_choice_success_discards_speculative_trail() {
        let (ok, trail) = eval(json!({"": ["string", "number"]}), json!(42));
        assert!(ok);
        assert_eq!(trail, json!([]));
    }

    #[test]
    fn test_refinement_is_wildcard_during_accept() {
        // max-size accepts nothing by itself; the shape candidate carries it.
        let (ok, _) = eval(
            json!({"": [["array", "number"], ["max-size", 3]]}),
            json!([10, 20, 30]),
        );
        assert!(ok);
        let (ok, trail) = eval(
            json!({"": [["array", "number"], ["max-size", 3]]}),
            json!([10, 20, 30, 40]),
        );
        assert!(!ok);
        assert_eq!(
            trail,
            json!([[[], [["array", "number"], ["max-size", 3]]]])
        );
    }

    #[test]
    fn test_not_negates_acceptance_only() {
        let (ok, _) = eval(json!({"": ["not", "string"]}), json!(42));
        assert!(ok);
        let (ok, _) = eval(json!({"": ["not", "string"]}), json!("x"));
        assert!(!ok);
    }

    #[test]
    fn test_depth_guard_trips_on_rule_cycle() {
        let natives = NativeRegistry::with_builtins();
        let doc = json!({"": "a", "a": "b", "b": "a"});
        let catalog = RuleCatalog::from_value(&doc, &natives).unwrap();
        let mut evaluator = Evaluator::new(&catalog, &natives);
        assert_eq!(
            evaluator.eval_named(Some(&json!(1)), RuleCatalog::ENTRY_RULE, &[]),
            Err(ValidateError::RecursionLimit(MAX_DEPTH))
        );
    }
}
