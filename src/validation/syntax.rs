//! Built-in syntax validator for action answers.
//!
//! Checks run in a fixed order and the first failure is reported, so the
//! model fixes structural problems before it is told about individual atoms:
//! headings, parseability, unsupported keywords, parameter types, new
//! predicate names and formats, and finally every predicate atom used in the
//! preconditions and effects.

use std::collections::HashMap;

use crate::domain::{DomainDescription, ParamMap, Predicate, PredicateRegistry};
use crate::parser::{parse_action, parse_typed_list};
use crate::pddl::{Expr, NUMERIC_OPERATORS, is_keyword, parse_all};
use crate::validation::format::HeaderValidator;
use crate::validation::traits::{ErrorKind, ValidationOutcome, Validator};

/// Keywords rejected unless the configuration enables them.
pub const DEFAULT_UNSUPPORTED_KEYWORDS: &[&str] = &["forall", "exists", "when", "imply", "preference"];

pub struct SyntaxValidator {
    headings: HeaderValidator,
    types: Vec<String>,
    action_names: Vec<String>,
    unsupported_keywords: Vec<String>,
}

impl SyntaxValidator {
    /// # Arguments
    /// * `types` - Flattened type names; an empty list disables type checks
    /// * `action_names` - Every action of the domain
    pub fn new(types: Vec<String>, action_names: Vec<String>) -> Self {
        Self {
            headings: HeaderValidator::default(),
            types,
            action_names,
            unsupported_keywords: DEFAULT_UNSUPPORTED_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn from_domain(domain: &DomainDescription) -> Self {
        Self::new(domain.types.flatten(), domain.action_names())
    }

    pub fn with_unsupported_keywords(mut self, keywords: Vec<String>) -> Self {
        self.unsupported_keywords = keywords;
        self
    }

    fn known_type(&self, ty: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t == ty)
    }

    fn type_list(&self) -> String {
        self.types.join(", ")
    }

    fn check_keywords(&self, exprs: &[Expr]) -> Option<ValidationOutcome> {
        let mut heads = Vec::new();
        for expr in exprs {
            collect_heads(expr, &mut heads);
        }
        let keyword = heads.into_iter().find(|h| self.unsupported_keywords.iter().any(|k| k == h))?;
        Some(
            ValidationOutcome::fail(
                ErrorKind::UnsupportedKeyword,
                format!(
                    "The keyword '{}' is not supported in this domain. Rewrite the preconditions and \
                     effects without it.",
                    keyword
                ),
            )
            .with_detail(keyword),
        )
    }

    fn check_param_types(&self, params: &ParamMap) -> Option<ValidationOutcome> {
        let (var, ty) = params.iter().find(|(_, ty)| !self.known_type(ty))?;
        Some(
            ValidationOutcome::fail(
                ErrorKind::InvalidParamType,
                format!(
                    "The parameter '{}' has type '{}', which is not a valid type. Valid types are: {}.",
                    var,
                    ty,
                    self.type_list()
                ),
            )
            .with_detail(ty.clone()),
        )
    }

    fn check_predicate_names(&self, new_predicates: &[Predicate]) -> Option<ValidationOutcome> {
        for predicate in new_predicates {
            let name = predicate.name.to_ascii_lowercase();
            let clash = if self.types.iter().any(|t| t.to_ascii_lowercase() == name) {
                Some("type")
            } else if self.action_names.iter().any(|a| a.to_ascii_lowercase() == name) {
                Some("action")
            } else {
                None
            };
            if let Some(what) = clash {
                return Some(
                    ValidationOutcome::fail(
                        ErrorKind::InvalidPredicateName,
                        format!(
                            "The new predicate '{}' has the same name as an existing {}. Rename the predicate.",
                            predicate.name, what
                        ),
                    )
                    .with_detail(predicate.name.clone()),
                );
            }
        }
        None
    }

    fn check_predicate_formats(&self, new_predicates: &[Predicate]) -> Option<ValidationOutcome> {
        for predicate in new_predicates {
            if let Some((var, ty)) = predicate.params.iter().find(|(_, ty)| !self.known_type(ty)) {
                return Some(
                    ValidationOutcome::fail(
                        ErrorKind::InvalidPredicateFormat,
                        format!(
                            "Parameter '{}' of the new predicate '{}' has type '{}', which is not a valid type. \
                             Valid types are: {}.",
                            var,
                            predicate.name,
                            ty,
                            self.type_list()
                        ),
                    )
                    .with_detail(predicate.name.clone()),
                );
            }
        }
        None
    }
}

impl Validator for SyntaxValidator {
    fn validate(&self, output: &str, current: &PredicateRegistry, new_predicates: &[Predicate]) -> ValidationOutcome {
        let headings = self.headings.validate(output, current, new_predicates);
        if !headings.ok {
            return headings;
        }

        let parsed = match parse_action(output, "candidate") {
            Ok(parsed) => parsed,
            Err(e) => return ValidationOutcome::fail(ErrorKind::ParseError, e.to_string()),
        };

        let mut exprs = Vec::new();
        for (label, text) in [("preconditions", &parsed.action.preconditions), ("effects", &parsed.action.effects)] {
            match parse_all(text) {
                Ok(mut parsed_exprs) => exprs.append(&mut parsed_exprs),
                Err(e) => {
                    return ValidationOutcome::fail(
                        ErrorKind::ParseError,
                        format!("The {} are not a valid PDDL expression: {}", label, e),
                    );
                }
            }
        }

        if let Some(outcome) = self.check_keywords(&exprs) {
            return outcome;
        }
        if let Some(outcome) = self.check_param_types(&parsed.action.parameters) {
            return outcome;
        }
        if let Some(outcome) = self.check_predicate_names(new_predicates) {
            return outcome;
        }
        if let Some(outcome) = self.check_predicate_formats(new_predicates) {
            return outcome;
        }

        let mut known: HashMap<&str, &Predicate> = current.iter().map(|p| (p.name.as_str(), p)).collect();
        for predicate in new_predicates {
            known.entry(predicate.name.as_str()).or_insert(predicate);
        }
        let scope: Vec<String> = parsed.action.parameters.keys().cloned().collect();
        for expr in &exprs {
            if let Err(outcome) = check_usage(expr, &scope, &known) {
                return outcome;
            }
        }

        ValidationOutcome::pass()
    }

    fn description(&self) -> &str {
        "syntax validator"
    }
}

/// Heads of every list in the tree.
fn collect_heads(expr: &Expr, out: &mut Vec<String>) {
    if let Expr::List(items) = expr {
        if let Some(head) = expr.head() {
            out.push(head.to_string());
        }
        for item in items {
            collect_heads(item, out);
        }
    }
}

fn check_usage(expr: &Expr, scope: &[String], known: &HashMap<&str, &Predicate>) -> Result<(), ValidationOutcome> {
    let Some(head) = expr.head() else {
        return Ok(());
    };

    match head {
        "forall" | "exists" => {
            let mut inner = scope.to_vec();
            if let Some(vars) = expr.args().first() {
                inner.extend(parse_typed_list(&vars.to_string()).into_iter().map(|v| v.name));
            }
            for arg in expr.args().iter().skip(1) {
                check_usage(arg, &inner, known)?;
            }
        }
        // numeric terms and equality
        h if NUMERIC_OPERATORS.contains(&h) => {}
        h if is_keyword(h) => {
            for arg in expr.args() {
                check_usage(arg, scope, known)?;
            }
        }
        name => check_atom(expr, name, scope, known)?,
    }
    Ok(())
}

fn check_atom(
    expr: &Expr,
    name: &str,
    scope: &[String],
    known: &HashMap<&str, &Predicate>,
) -> Result<(), ValidationOutcome> {
    let atom = expr.to_string();
    let Some(predicate) = known.get(name) else {
        return Err(ValidationOutcome::fail(
            ErrorKind::InvalidPredicateUsage,
            format!(
                "The predicate '{}' used in {} is not defined. Use one of the existing predicates or \
                 declare it under New Predicates.",
                name, atom
            ),
        )
        .with_detail(atom));
    };

    let args = expr.args();
    if args.len() != predicate.arity() {
        return Err(ValidationOutcome::fail(
            ErrorKind::InvalidPredicateUsage,
            format!(
                "The predicate '{}' takes {} argument(s) but {} were given in {}. Its definition is {}.",
                name,
                predicate.arity(),
                args.len(),
                atom,
                predicate.signature()
            ),
        )
        .with_detail(atom));
    }

    if let Some(var) = args
        .iter()
        .filter(|a| a.is_variable())
        .filter_map(Expr::as_atom)
        .find(|v| !scope.iter().any(|s| s == v))
    {
        return Err(ValidationOutcome::fail(
            ErrorKind::InvalidPredicateUsage,
            format!(
                "The variable '{}' in {} is not an action parameter or bound by a quantifier. \
                 Declare it under Parameters or use a declared one.",
                var, atom
            ),
        )
        .with_detail(atom));
    }
    Ok(())
}
