//! Parameter extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::sections::{extract_block, extract_section};
use crate::domain::ParamMap;

/// A numbered (`1.`, `1)`) or bulleted (`-`, `*`) list entry.
pub(super) static LIST_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*])\s+(.*)$").expect("list entry pattern"));

/// Variable list of a `forall`/`exists` scope.
static QUANTIFIER_SCOPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(?:forall|exists)\s*\(([^()]*)\)").expect("quantifier pattern"));

/// One variable of a typed list; `ty` is `None` when no `- type` follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedVar {
    pub name: String,
    pub ty: Option<String>,
}

/// Parse `?a ?b - block ?c - table` style lists. Consecutive untyped
/// variables share the next type; tokens that are neither variables nor
/// type markers are ignored.
pub fn parse_typed_list(text: &str) -> Vec<TypedVar> {
    let cleaned = text.replace(['(', ')', ','], " ");
    let mut tokens = cleaned.split_whitespace();
    let mut vars: Vec<TypedVar> = Vec::new();
    let mut pending = 0usize;

    while let Some(token) = tokens.next() {
        if token.starts_with('?') && token.len() > 1 {
            vars.push(TypedVar {
                name: token.to_string(),
                ty: None,
            });
            pending += 1;
        } else if token == "-" {
            if let Some(ty) = tokens.next() {
                let ty = ty.trim_matches(|c: char| !c.is_alphanumeric() && c != '_' && c != '-');
                let len = vars.len();
                for var in &mut vars[len - pending..] {
                    var.ty = Some(ty.to_string());
                }
                pending = 0;
            }
        }
    }
    vars
}

/// Strip markdown decoration a model tends to wrap list entries in.
pub(crate) fn strip_decoration(text: &str) -> String {
    text.replace('`', "").replace("**", "").trim().to_string()
}

/// Parameters declared under the `Parameters` heading.
///
/// Each entry must be a numbered or dashed `?name - type` line; anything
/// after a `:` is a description and ignored. Malformed entries are skipped
/// with a warning. With `include_internal`, typed variables introduced by
/// `forall`/`exists` scopes in the preconditions are added after the
/// declared ones, never overriding them.
pub fn parse_params(text: &str, include_internal: bool) -> ParamMap {
    let mut params = ParamMap::new();

    match extract_section(text, "Parameters") {
        Some(section) => {
            for line in section.lines() {
                let Some(caps) = LIST_ENTRY.captures(line) else {
                    continue;
                };
                let body = strip_decoration(&caps[1]);
                let declaration = body.split_once(':').map(|(decl, _)| decl).unwrap_or(body.as_str());
                let vars = parse_typed_list(declaration);

                if vars.is_empty() || vars.iter().any(|v| v.ty.is_none()) {
                    log::warn!("Skipping malformed parameter line: '{}'", line.trim());
                    continue;
                }
                for var in vars {
                    if let Some(ty) = var.ty {
                        params.entry(var.name).or_insert(ty);
                    }
                }
            }
        }
        None => log::debug!("No Parameters heading found"),
    }

    if include_internal {
        for (name, ty) in internal_params(text) {
            params.entry(name).or_insert(ty);
        }
    }

    params
}

/// Typed variables bound by quantifiers inside the preconditions block.
pub fn internal_params(text: &str) -> ParamMap {
    let mut params = ParamMap::new();
    let Ok(preconditions) = extract_block(text, "Preconditions") else {
        return params;
    };
    for caps in QUANTIFIER_SCOPE.captures_iter(&preconditions) {
        for var in parse_typed_list(&caps[1]) {
            let ty = var.ty.unwrap_or_else(|| crate::domain::ROOT_TYPE.to_string());
            params.entry(var.name).or_insert(ty);
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_list_shared_type() {
        let vars = parse_typed_list("?a ?b - block ?t - table");
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0].ty.as_deref(), Some("block"));
        assert_eq!(vars[1].ty.as_deref(), Some("block"));
        assert_eq!(vars[2].ty.as_deref(), Some("table"));
    }

    #[test]
    fn test_parse_typed_list_untyped_tail() {
        let vars = parse_typed_list("?a - block ?b");
        assert_eq!(vars[1].ty, None);
    }

    #[test]
    fn test_parse_params_numbered_and_dashed() {
        let text = "## Parameters\n1. ?b1 - block: the moved block\n- ?b2 - block\n2. `?t - table`\n";
        let params = parse_params(text, false);
        let keys: Vec<&String> = params.keys().collect();
        assert_eq!(keys, vec!["?b1", "?b2", "?t"]);
        assert_eq!(params["?t"], "table");
    }

    #[test]
    fn test_parse_params_skips_malformed() {
        let text = "## Parameters\n1. ?b - block\n2. the table we put it on\n3. ?x\n```\n";
        let params = parse_params(text, false);
        assert_eq!(params.len(), 1);
        assert_eq!(params["?b"], "block");
    }

    #[test]
    fn test_parse_params_missing_section() {
        assert!(parse_params("nothing here", false).is_empty());
    }

    #[test]
    fn test_parse_params_include_internal() {
        let text = r#"## Parameters
1. ?b - block

## Preconditions
```
(and (forall (?o - block) (not (on ?o ?b))) (exists (?t - table) (free ?t)))
```

## Effects
```
(holding ?b)
```
"#;
        let declared = parse_params(text, false);
        assert_eq!(declared.len(), 1);

        let all = parse_params(text, true);
        let keys: Vec<&String> = all.keys().collect();
        assert_eq!(keys, vec!["?b", "?o", "?t"]);
        assert_eq!(all["?t"], "table");
    }

    #[test]
    fn test_internal_params_do_not_override_declared() {
        let text = "## Parameters\n1. ?b - block\n## Preconditions\n```\n(forall (?b - thing) (p ?b))\n```\n";
        let all = parse_params(text, true);
        assert_eq!(all["?b"], "block");
    }
}
