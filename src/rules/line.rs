#![forbid(unsafe_code)]

//! RuleLine: the grammar's AST
//!
//! A rule document member is parsed into a [`RuleLine`] once, at catalog
//! construction time; the evaluator then matches on the tagged variants
//! exhaustively instead of re-inspecting JSON shapes at every step.
//!
//! Concrete encoding (see the embedded grammar in [`crate::rules::catalog`]):
//!
//! - `"'text"` — literal string match
//! - `"#..."` — comment marker, never evaluated
//! - `"string" | "number" | "boolean" | "any" | "null" | "undefined" |
//!   "optional" | "array" | "object"` — built-in type checks
//! - any other string — class/native reference resolved through the catalog
//! - scalar — equality match
//! - object — structural template
//! - array headed by an operator keyword — compound invocation
//! - array headed by any other class name — class/native invocation with
//!   raw operand values
//! - any other array — alternation list

use indexmap::IndexMap;
use serde_json::Value;

/// Built-in atomic type names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    String,
    Number,
    Boolean,
    Any,
    Null,
    /// `undefined` / `optional`: the subject must be absent
    Undefined,
    Array,
    Object,
}

impl TypeName {
    fn from_str(s: &str) -> Option<TypeName> {
        match s {
            "string" => Some(TypeName::String),
            "number" => Some(TypeName::Number),
            "boolean" => Some(TypeName::Boolean),
            "any" => Some(TypeName::Any),
            "null" => Some(TypeName::Null),
            "undefined" | "optional" => Some(TypeName::Undefined),
            "array" => Some(TypeName::Array),
            "object" => Some(TypeName::Object),
            _ => None,
        }
    }

    /// Canonical spelling used when rendering rules back to JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeName::String => "string",
            TypeName::Number => "number",
            TypeName::Boolean => "boolean",
            TypeName::Any => "any",
            TypeName::Null => "null",
            TypeName::Undefined => "optional",
            TypeName::Array => "array",
            TypeName::Object => "object",
        }
    }
}

/// Comparison operators delegated to the native registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    fn from_str(s: &str) -> Option<CompareOp> {
        match s {
            ">" => Some(CompareOp::Gt),
            "<" => Some(CompareOp::Lt),
            ">=" => Some(CompareOp::Ge),
            "<=" => Some(CompareOp::Le),
            _ => None,
        }
    }

    /// The registry name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

/// One condition inside an `all` invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A full rule line, evaluated with the two-phase machinery
    Rule(RuleLine),
    /// An inline comparison pair, e.g. `">=", "0"`
    Compare(CompareOp, Value),
    /// A documentation marker, rendered but never evaluated
    Comment(String),
}

/// A compound invocation: an operator applied to operands
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// `["array", rule...]` — every element must match the operand alternation
    Array(Vec<RuleLine>),
    /// `["object", template, rule...]` — template members plus an extra-key
    /// alternation for keys the template does not mention
    Object {
        template: IndexMap<String, RuleLine>,
        extra: Vec<RuleLine>,
    },
    /// `["tuple", rule...]` — positional rules, exact length
    Tuple(Vec<RuleLine>),
    /// `["vartuple", rule...]` — positional rules, tail wraps modulo the list
    Vartuple(Vec<RuleLine>),
    /// `["prefix", literal, rule...]` — subject starts with `literal`; the
    /// remainder, if continuation rules are given, must match them
    Prefix { affix: Value, rest: Vec<RuleLine> },
    /// `["suffix", literal, rule...]`
    Suffix { affix: Value, rest: Vec<RuleLine> },
    /// `["max-size", n]`
    MaxSize(u64),
    /// `["min-size", n]`
    MinSize(u64),
    /// `["key", rule...]` — re-binds the current object key as the subject
    Key(Vec<RuleLine>),
    /// `["not", rule...]` — passes iff no alternative's accept phase matches
    Not(Vec<RuleLine>),
    /// `["all", condition...]` — conjunction of conditions
    All(Vec<Condition>),
    /// `[">", 0, "<", 10]` — chained comparison pairs
    Compare(Vec<(CompareOp, Value)>),
    /// `[name, operand...]` — class or native invocation with raw operands
    Call { name: String, args: Vec<Value> },
}

/// One grammar node
#[derive(Debug, Clone, PartialEq)]
pub enum RuleLine {
    /// Built-in type check
    Type(TypeName),
    /// Literal string match (`'text`)
    Literal(String),
    /// Comment marker, skipped wherever it appears
    Comment(String),
    /// Class or native reference, resolved through the catalog
    Name(String),
    /// Scalar matched by structural equality
    Scalar(Value),
    /// Ordered alternation: first-match-wins accept, all-must-pass reject
    Choice(Vec<RuleLine>),
    /// Structural object template; unknown keys reject
    Template(IndexMap<String, RuleLine>),
    /// Compound invocation
    Op(Invocation),
}

fn is_operator(s: &str) -> bool {
    matches!(
        s,
        "array"
            | "object"
            | "tuple"
            | "vartuple"
            | "prefix"
            | "suffix"
            | "max-size"
            | "maxsize"
            | "min-size"
            | "minsize"
            | "key"
            | "not"
            | "all"
    ) || CompareOp::from_str(s).is_some()
}

impl RuleLine {
    /// Parses one rule line from its JSON encoding
    ///
    /// Errors carry a human message; the catalog prefixes the owning rule name.
    pub fn parse(value: &Value) -> Result<RuleLine, String> {
        match value {
            Value::String(s) => Ok(Self::parse_word(s)),
            Value::Number(_) | Value::Bool(_) | Value::Null => Ok(RuleLine::Scalar(value.clone())),
            Value::Object(map) => {
                let mut template = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    template.insert(k.clone(), RuleLine::parse(v)?);
                }
                Ok(RuleLine::Template(template))
            }
            Value::Array(items) => Self::parse_list(items),
        }
    }

    fn parse_word(s: &str) -> RuleLine {
        if let Some(text) = s.strip_prefix('\'') {
            RuleLine::Literal(text.to_string())
        } else if s.starts_with('#') {
            RuleLine::Comment(s.to_string())
        } else if let Some(ty) = TypeName::from_str(s) {
            RuleLine::Type(ty)
        } else {
            RuleLine::Name(s.to_string())
        }
    }

    fn parse_list(items: &[Value]) -> Result<RuleLine, String> {
        let Some(Value::String(head)) = items.first() else {
            return Self::parse_choice(items);
        };
        if is_operator(head) {
            return Self::parse_invocation(head, &items[1..]).map(RuleLine::Op);
        }
        // A list headed by a class name is an invocation with raw operands
        // (e.g. ["datetime", "MM:mm"]); everything else is an alternation.
        match Self::parse_word(head) {
            RuleLine::Name(name) => Ok(RuleLine::Op(Invocation::Call {
                name,
                args: items[1..].to_vec(),
            })),
            _ => Self::parse_choice(items),
        }
    }

    fn parse_choice(items: &[Value]) -> Result<RuleLine, String> {
        let mut candidates = Vec::with_capacity(items.len());
        for item in items {
            candidates.push(RuleLine::parse(item)?);
        }
        Ok(RuleLine::Choice(candidates))
    }

    fn parse_invocation(op: &str, operands: &[Value]) -> Result<Invocation, String> {
        match op {
            "array" => {
                if operands.is_empty() {
                    // Bare ["array"] degrades to the type check; keep the
                    // invocation form so rendering round-trips.
                    Ok(Invocation::Array(Vec::new()))
                } else {
                    Ok(Invocation::Array(Self::parse_rules(operands)?))
                }
            }
            "object" => {
                let template = match operands.first() {
                    None => IndexMap::new(),
                    Some(Value::Object(map)) => {
                        let mut template = IndexMap::with_capacity(map.len());
                        for (k, v) in map {
                            template.insert(k.clone(), RuleLine::parse(v)?);
                        }
                        template
                    }
                    Some(other) => {
                        return Err(format!(
                            "'object' expects a template object, got {}",
                            kind_name(other)
                        ));
                    }
                };
                let extra = Self::parse_rules(operands.get(1..).unwrap_or(&[]))?;
                Ok(Invocation::Object { template, extra })
            }
            "tuple" => Ok(Invocation::Tuple(Self::parse_rules(operands)?)),
            "vartuple" => Ok(Invocation::Vartuple(Self::parse_rules(operands)?)),
            "prefix" | "suffix" => {
                let affix = operands
                    .first()
                    .ok_or_else(|| format!("'{}' expects a literal operand", op))?;
                if !affix.is_string() && !affix.is_array() {
                    return Err(format!(
                        "'{}' literal must be a string or array, got {}",
                        op,
                        kind_name(affix)
                    ));
                }
                let rest = Self::parse_rules(&operands[1..])?;
                if op == "prefix" {
                    Ok(Invocation::Prefix {
                        affix: affix.clone(),
                        rest,
                    })
                } else {
                    Ok(Invocation::Suffix {
                        affix: affix.clone(),
                        rest,
                    })
                }
            }
            "max-size" | "maxsize" | "min-size" | "minsize" => {
                let n = operands
                    .first()
                    .and_then(Value::as_u64)
                    .ok_or_else(|| format!("'{}' expects an unsigned integer operand", op))?;
                if op.starts_with("max") {
                    Ok(Invocation::MaxSize(n))
                } else {
                    Ok(Invocation::MinSize(n))
                }
            }
            "key" => Ok(Invocation::Key(Self::parse_rules(operands)?)),
            "not" => Ok(Invocation::Not(Self::parse_rules(operands)?)),
            "all" => Self::parse_all(operands),
            _ => match CompareOp::from_str(op) {
                Some(first) => Self::parse_compare(first, operands),
                None => Err(format!("unrecognized operator '{}'", op)),
            },
        }
    }

    fn parse_rules(operands: &[Value]) -> Result<Vec<RuleLine>, String> {
        operands.iter().map(RuleLine::parse).collect()
    }

    /// `all` operands: rule lines, inline `op, literal` pairs, and comments
    fn parse_all(operands: &[Value]) -> Result<Invocation, String> {
        let mut conditions = Vec::with_capacity(operands.len());
        let mut iter = operands.iter().peekable();
        while let Some(item) = iter.next() {
            if let Value::String(s) = item {
                if s.starts_with('#') {
                    conditions.push(Condition::Comment(s.clone()));
                    continue;
                }
                if let Some(cmp) = CompareOp::from_str(s) {
                    let lit = iter
                        .next()
                        .ok_or_else(|| format!("'{}' inside 'all' expects a literal operand", s))?;
                    conditions.push(Condition::Compare(cmp, lit.clone()));
                    continue;
                }
            }
            conditions.push(Condition::Rule(RuleLine::parse(item)?));
        }
        Ok(Invocation::All(conditions))
    }

    fn parse_compare(first: CompareOp, operands: &[Value]) -> Result<Invocation, String> {
        let mut pairs = Vec::new();
        let mut iter = operands.iter();
        let lit = iter
            .next()
            .ok_or_else(|| format!("'{}' expects a literal operand", first.as_str()))?;
        pairs.push((first, lit.clone()));
        while let Some(op) = iter.next() {
            let cmp = op
                .as_str()
                .and_then(CompareOp::from_str)
                .ok_or_else(|| format!("expected a comparison operator, got {}", kind_name(op)))?;
            let lit = iter
                .next()
                .ok_or_else(|| format!("'{}' expects a literal operand", cmp.as_str()))?;
            pairs.push((cmp, lit.clone()));
        }
        Ok(Invocation::Compare(pairs))
    }

    /// Renders the rule line back to its JSON encoding, for diagnostics
    pub fn to_value(&self) -> Value {
        match self {
            RuleLine::Type(ty) => Value::String(ty.as_str().to_string()),
            RuleLine::Literal(text) => Value::String(format!("'{}", text)),
            RuleLine::Comment(text) => Value::String(text.clone()),
            RuleLine::Name(name) => Value::String(name.clone()),
            RuleLine::Scalar(v) => v.clone(),
            RuleLine::Choice(candidates) => {
                Value::Array(candidates.iter().map(RuleLine::to_value).collect())
            }
            RuleLine::Template(template) => template_to_value(template),
            RuleLine::Op(inv) => inv.to_value(),
        }
    }
}

impl Invocation {
    /// Renders the invocation with its canonical operator spelling
    pub fn to_value(&self) -> Value {
        fn list(op: &str, rules: &[RuleLine]) -> Value {
            let mut items = vec![Value::String(op.to_string())];
            items.extend(rules.iter().map(RuleLine::to_value));
            Value::Array(items)
        }
        match self {
            Invocation::Array(rules) => list("array", rules),
            Invocation::Object { template, extra } => {
                let mut items = vec![
                    Value::String("object".to_string()),
                    template_to_value(template),
                ];
                items.extend(extra.iter().map(RuleLine::to_value));
                Value::Array(items)
            }
            Invocation::Tuple(rules) => list("tuple", rules),
            Invocation::Vartuple(rules) => list("vartuple", rules),
            Invocation::Prefix { affix, rest } => {
                let mut items = vec![Value::String("prefix".to_string()), affix.clone()];
                items.extend(rest.iter().map(RuleLine::to_value));
                Value::Array(items)
            }
            Invocation::Suffix { affix, rest } => {
                let mut items = vec![Value::String("suffix".to_string()), affix.clone()];
                items.extend(rest.iter().map(RuleLine::to_value));
                Value::Array(items)
            }
            Invocation::MaxSize(n) => {
                Value::Array(vec![Value::String("max-size".to_string()), Value::from(*n)])
            }
            Invocation::MinSize(n) => {
                Value::Array(vec![Value::String("min-size".to_string()), Value::from(*n)])
            }
            Invocation::Key(rules) => list("key", rules),
            Invocation::Not(rules) => list("not", rules),
            Invocation::All(conditions) => {
                let mut items = vec![Value::String("all".to_string())];
                for cond in conditions {
                    match cond {
                        Condition::Rule(rule) => items.push(rule.to_value()),
                        Condition::Compare(op, lit) => {
                            items.push(Value::String(op.as_str().to_string()));
                            items.push(lit.clone());
                        }
                        Condition::Comment(text) => items.push(Value::String(text.clone())),
                    }
                }
                Value::Array(items)
            }
            Invocation::Compare(pairs) => {
                let mut items = Vec::with_capacity(pairs.len() * 2);
                for (op, lit) in pairs {
                    items.push(Value::String(op.as_str().to_string()));
                    items.push(lit.clone());
                }
                Value::Array(items)
            }
            Invocation::Call { name, args } => {
                let mut items = vec![Value::String(name.clone())];
                items.extend(args.iter().cloned());
                Value::Array(items)
            }
        }
    }
}

fn template_to_value(template: &IndexMap<String, RuleLine>) -> Value {
    let mut map = serde_json::Map::new();
    for (k, rule) in template {
        map.insert(k.clone(), rule.to_value());
    }
    Value::Object(map)
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
