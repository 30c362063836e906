//! JS/TS-family collector — the "module-graph source language" minimum
//! recognition set from spec §4.2: ES module import/export (named, default,
//! namespace, re-export), CommonJS `require`, dynamic `import()`, class
//! declarations (with `extends`), function declarations and arrow-function
//! assignments, async/generator flags, JSX/TSX capitalized-identifier
//! component references, TS interfaces and type aliases. Also emits raw
//! `api_call_site` references for `fetch`/axios/`$.ajax`-style calls, driven
//! by `plugins.api_helpers` (§4.6), which the cross-language linker turns
//! into `api_calls` edges.
//!
//! Same stack-based, scope-threaded traversal style as `collectors::php`.

use crate::ast::{Cursor, ParsedFile};
use crate::collectors::{CollectOutput, LanguageCollector};
use crate::ids::symbol_id;
use crate::model::{
    symbol::{DeclaredTypes, Parameter, Signature},
    LanguageKind, Modifier, RefContext, Reference, ReferenceKind, Span, Symbol, SymbolKind,
};

pub struct TypeScriptCollector {
    pub language: LanguageKind,
    pub api_helpers: Vec<String>,
}

struct Scope {
    qualifier: String,
    parent_id: String,
}

impl TypeScriptCollector {
    fn qualify(prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }
}

impl LanguageCollector for TypeScriptCollector {
    fn collect(&self, parsed: &ParsedFile, file_symbol_id: &str, repo_rel_path: &str) -> anyhow::Result<CollectOutput> {
        let mut out = CollectOutput::default();
        let root_scope = Scope {
            qualifier: String::new(),
            parent_id: file_symbol_id.to_string(),
        };
        walk(&parsed.root(), repo_rel_path, &root_scope, self.language, &self.api_helpers, &mut out);
        Ok(out)
    }
}

fn make_symbol(
    repo_rel_path: &str,
    lang: LanguageKind,
    kind: SymbolKind,
    name: &str,
    qn: &str,
    span: Span,
    parent_id: &str,
    modifiers: Vec<Modifier>,
) -> Symbol {
    Symbol {
        id: symbol_id(lang, kind, qn, repo_rel_path),
        kind,
        name: name.to_string(),
        qualified_name: qn.to_string(),
        language: lang,
        file_path: repo_rel_path.to_string(),
        span,
        parent_id: Some(parent_id.to_string()),
        modifiers,
        signature: None,
        declared_types: None,
        docblock: None,
    }
}

fn walk(node: &Cursor, repo_rel_path: &str, scope: &Scope, lang: LanguageKind, api_helpers: &[String], out: &mut CollectOutput) {
    for child in node.children() {
        match child.kind() {
            "import_statement" => {
                collect_import(&child, scope, out);
            }
            "export_statement" => {
                if let Some(src) = find_child(&child, "string") {
                    // `export ... from "module"` — re-export, recorded as imports.
                    out.references.push(Reference::raw(
                        scope.parent_id.clone(),
                        strip_quotes(&src.text()),
                        ReferenceKind::Imports,
                        child.span().start,
                    ));
                }
                // The exported declaration itself (class/function/const) is
                // still walked for its own decl/reference emission.
                walk(&child, repo_rel_path, scope, lang, api_helpers, out);
            }

            "class_declaration" | "abstract_class_declaration" => {
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = TypeScriptCollector::qualify(&scope.qualifier, &name);
                let mut mods = Vec::new();
                if child.kind() == "abstract_class_declaration" {
                    mods.push(Modifier::Abstract);
                }
                let sym = make_symbol(repo_rel_path, lang, SymbolKind::Class, &name, &qn, child.span(), &scope.parent_id, mods);
                let class_id = sym.id.clone();

                out.references.push(Reference::raw(
                    scope.parent_id.clone(),
                    class_id.clone(),
                    ReferenceKind::Defines,
                    child.span().start,
                ));

                if let Some(heritage) = find_child(&child, "class_heritage") {
                    for base in find_all(&heritage, "extends_clause") {
                        for n in identifier_names(&base) {
                            out.references.push(Reference::raw(class_id.clone(), n, ReferenceKind::Extends, base.span().start));
                        }
                    }
                    for impls in find_all(&heritage, "implements_clause") {
                        for n in identifier_names(&impls) {
                            out.references.push(Reference::raw(class_id.clone(), n, ReferenceKind::Implements, impls.span().start));
                        }
                    }
                }

                let child_scope = Scope { qualifier: qn, parent_id: class_id };
                out.symbols.push(sym);
                walk(&child, repo_rel_path, &child_scope, lang, api_helpers, out);
            }

            "interface_declaration" => {
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = TypeScriptCollector::qualify(&scope.qualifier, &name);
                let sym = make_symbol(repo_rel_path, lang, SymbolKind::Interface, &name, &qn, child.span(), &scope.parent_id, vec![]);
                out.references.push(Reference::raw(scope.parent_id.clone(), sym.id.clone(), ReferenceKind::Defines, child.span().start));
                if let Some(heritage) = find_child(&child, "extends_type_clause") {
                    for n in identifier_names(&heritage) {
                        out.references.push(Reference::raw(sym.id.clone(), n, ReferenceKind::Extends, heritage.span().start));
                    }
                }
                out.symbols.push(sym);
            }

            "type_alias_declaration" => {
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = TypeScriptCollector::qualify(&scope.qualifier, &name);
                let mut sym = make_symbol(repo_rel_path, lang, SymbolKind::Constant, &name, &qn, child.span(), &scope.parent_id, vec![]);
                if let Some(value) = child.child_by_field("value") {
                    let union_members = if value.kind() == "union_type" {
                        value.children().iter().map(|c| c.text()).collect()
                    } else {
                        vec![]
                    };
                    sym.declared_types = Some(DeclaredTypes { return_type: Some(value.text()), union_members });
                }
                out.references.push(Reference::raw(scope.parent_id.clone(), sym.id.clone(), ReferenceKind::Defines, child.span().start));
                out.symbols.push(sym);
            }

            "method_definition" => {
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = TypeScriptCollector::qualify(&scope.qualifier, &name);
                let mut mods = Vec::new();
                for c in child.children() {
                    match c.kind() {
                        "accessibility_modifier" => match c.text().as_str() {
                            "public" => mods.push(Modifier::Public),
                            "protected" => mods.push(Modifier::Protected),
                            "private" => mods.push(Modifier::Private),
                            _ => {}
                        },
                        "static" => mods.push(Modifier::Static),
                        _ => {}
                    }
                }
                if child.text().trim_start().starts_with("async") {
                    mods.push(Modifier::Async);
                }
                if child.text().contains('*') {
                    mods.push(Modifier::Generator);
                }
                let mut sym = make_symbol(repo_rel_path, lang, SymbolKind::Method, &name, &qn, child.span(), &scope.parent_id, mods);
                if let Some(params) = child.child_by_field("parameters") {
                    sym.signature = Some(Signature { parameters: parse_params(&params) });
                }
                out.references.push(Reference::raw(scope.parent_id.clone(), sym.id.clone(), ReferenceKind::Defines, child.span().start));
                let method_id = sym.id.clone();
                out.symbols.push(sym);
                if let Some(body) = child.child_by_field("body") {
                    collect_expression_refs(&body, &method_id, api_helpers, out);
                }
            }

            "function_declaration" | "generator_function_declaration" => {
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = TypeScriptCollector::qualify(&scope.qualifier, &name);
                let mut mods = Vec::new();
                if child.text().trim_start().starts_with("async") {
                    mods.push(Modifier::Async);
                }
                if child.kind() == "generator_function_declaration" {
                    mods.push(Modifier::Generator);
                }
                let mut sym = make_symbol(repo_rel_path, lang, SymbolKind::Function, &name, &qn, child.span(), &scope.parent_id, mods);
                if let Some(params) = child.child_by_field("parameters") {
                    sym.signature = Some(Signature { parameters: parse_params(&params) });
                }
                out.references.push(Reference::raw(scope.parent_id.clone(), sym.id.clone(), ReferenceKind::Defines, child.span().start));
                let fn_id = sym.id.clone();
                out.symbols.push(sym);
                if let Some(body) = child.child_by_field("body") {
                    collect_expression_refs(&body, &fn_id, api_helpers, out);
                }
            }

            "lexical_declaration" | "variable_declaration" => {
                // Arrow-function assignment: `const foo = (x) => { ... }` or
                // `const Foo = () => <jsx/>` (function component).
                for decl in find_all(&child, "variable_declarator") {
                    let name = decl.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                    let value = decl.child_by_field("value");
                    let is_callable = value.as_ref().map(|v| matches!(v.kind(), "arrow_function" | "function_expression")).unwrap_or(false);
                    if name.is_empty() || !is_callable {
                        continue;
                    }
                    let qn = TypeScriptCollector::qualify(&scope.qualifier, &name);
                    let value = value.unwrap();
                    let mut mods = Vec::new();
                    if value.text().trim_start().starts_with("async") {
                        mods.push(Modifier::Async);
                    }
                    let mut sym = make_symbol(repo_rel_path, lang, SymbolKind::Function, &name, &qn, decl.span(), &scope.parent_id, mods);
                    if let Some(params) = value.child_by_field("parameters").or_else(|| value.child_by_field("parameter")) {
                        sym.signature = Some(Signature { parameters: parse_params(&params) });
                    }
                    out.references.push(Reference::raw(scope.parent_id.clone(), sym.id.clone(), ReferenceKind::Defines, decl.span().start));
                    let fn_id = sym.id.clone();
                    out.symbols.push(sym);
                    if let Some(body) = value.child_by_field("body") {
                        collect_expression_refs(&body, &fn_id, api_helpers, out);
                    }
                }
            }

            "program" | "statement_block" | "class_body" => {
                walk(&child, repo_rel_path, scope, lang, api_helpers, out);
            }

            _ => {
                walk(&child, repo_rel_path, scope, lang, api_helpers, out);
            }
        }
    }
}

/// Handles `import x from "m"`, `import { a, b as c } from "m"`,
/// `import * as ns from "m"`, and bare `import "m"`.
fn collect_import(node: &Cursor, scope: &Scope, out: &mut CollectOutput) {
    let source = find_child(node, "string").map(|n| strip_quotes(&n.text())).unwrap_or_default();
    if source.is_empty() {
        return;
    }
    out.references.push(Reference::raw(scope.parent_id.clone(), source, ReferenceKind::Imports, node.span().start));
}

fn collect_expression_refs(node: &Cursor, enclosing_id: &str, api_helpers: &[String], out: &mut CollectOutput) {
    let site = node.span().start;
    match node.kind() {
        "new_expression" => {
            if let Some(ctor) = node.child_by_field("constructor") {
                out.references.push(Reference::raw(enclosing_id, flatten_member(&ctor), ReferenceKind::Instantiates, site));
            }
        }
        "call_expression" => {
            if let Some(f) = node.child_by_field("function") {
                let raw = flatten_member(&f);
                if is_api_helper(&raw, api_helpers) {
                    if let Some(path) = first_string_argument(node) {
                        let method = http_method_from_helper(&raw);
                        out.references.push(
                            Reference::raw(enclosing_id, format!("{method} {path}"), ReferenceKind::ApiCalls, site)
                                .with_context(RefContext::Call),
                        );
                    }
                } else if raw == "require" || raw == "import" {
                    if let Some(arg) = node.child_by_field("arguments").and_then(|a| a.children().into_iter().next()) {
                        out.references.push(Reference::raw(enclosing_id, strip_quotes(&arg.text()), ReferenceKind::Imports, site));
                    }
                } else {
                    out.references.push(Reference::raw(enclosing_id, raw, ReferenceKind::Calls, site).with_context(RefContext::Call));
                }
            }
        }
        "member_expression" => {
            if let Some(prop) = node.child_by_field("property") {
                out.references.push(Reference::raw(enclosing_id, prop.text(), ReferenceKind::AccessesRead, site).with_context(RefContext::Read));
            }
        }
        "assignment_expression" => {
            if let Some(left) = node.child_by_field("left") {
                if left.kind() == "member_expression" {
                    if let Some(prop) = left.child_by_field("property") {
                        out.references.push(
                            Reference::raw(enclosing_id, prop.text(), ReferenceKind::AccessesWrite, site).with_context(RefContext::Write),
                        );
                    }
                    for gc in left.children() {
                        collect_expression_refs(&gc, enclosing_id, api_helpers, out);
                    }
                }
            }
            if let Some(right) = node.child_by_field("right") {
                collect_expression_refs(&right, enclosing_id, api_helpers, out);
            }
        }
        "jsx_opening_element" | "jsx_self_closing_element" => {
            if let Some(name) = node.child_by_field("name") {
                let text = name.text();
                if text.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                    out.references.push(Reference::raw(enclosing_id, text, ReferenceKind::Calls, site).with_context(RefContext::Jsx));
                }
            }
        }
        "throw_statement" => {
            for c in node.children() {
                if c.kind() == "new_expression" {
                    if let Some(ctor) = c.child_by_field("constructor") {
                        out.references.push(Reference::raw(enclosing_id, flatten_member(&ctor), ReferenceKind::Throws, site));
                    }
                }
            }
        }
        _ => {}
    }

    for c in node.children() {
        if matches!(node.kind(), "assignment_expression") {
            continue;
        }
        collect_expression_refs(&c, enclosing_id, api_helpers, out);
    }
}

fn is_api_helper(raw: &str, helpers: &[String]) -> bool {
    helpers.iter().any(|h| h == raw || raw.ends_with(&format!(".{h}")) || raw == h.as_str())
}

/// First string-literal argument of a call expression, with its quotes
/// stripped — the URL/path argument to `fetch`/`axios.get`/`$.ajax`.
fn first_string_argument(call_node: &Cursor) -> Option<String> {
    let args = call_node.child_by_field("arguments")?;
    for a in args.children() {
        if a.kind() == "string" {
            return Some(strip_quotes(&a.text()));
        }
        if a.kind() == "template_string" {
            return Some(strip_quotes(&a.text()));
        }
    }
    None
}

/// Best-effort HTTP method from the helper call's trailing segment, e.g.
/// `axios.post` -> `POST`. Falls back to `GET` for bare `fetch`/`$.ajax`.
fn http_method_from_helper(raw: &str) -> String {
    let last = raw.rsplit('.').next().unwrap_or(raw).to_ascii_uppercase();
    match last.as_str() {
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS" => last,
        _ => "GET".to_string(),
    }
}

fn flatten_member(node: &Cursor) -> String {
    match node.kind() {
        "member_expression" => {
            let object = node.child_by_field("object").map(|n| flatten_member(&n)).unwrap_or_default();
            let prop = node.child_by_field("property").map(|n| n.text()).unwrap_or_default();
            if object.is_empty() {
                prop
            } else {
                format!("{object}.{prop}")
            }
        }
        _ => node.text(),
    }
}

fn identifier_names(node: &Cursor) -> Vec<String> {
    let mut out = Vec::new();
    if matches!(node.kind(), "identifier" | "type_identifier" | "nested_type_identifier") {
        out.push(node.text());
        return out;
    }
    for c in node.children() {
        out.extend(identifier_names(&c));
    }
    out
}

fn find_child<'a>(node: &Cursor<'a>, kind: &str) -> Option<Cursor<'a>> {
    node.children().into_iter().find(|c| c.kind() == kind)
}

fn find_all<'a>(node: &Cursor<'a>, kind: &str) -> Vec<Cursor<'a>> {
    let mut out = Vec::new();
    for c in node.children() {
        if c.kind() == kind {
            out.push(c);
        }
        out.extend(find_all(&c, kind));
    }
    out
}

fn strip_quotes(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

fn parse_params(params_node: &Cursor) -> Vec<Parameter> {
    let mut out = Vec::new();
    for p in params_node.children() {
        let (name_node, optional) = match p.kind() {
            "required_parameter" | "optional_parameter" => (p.child_by_field("pattern"), p.kind() == "optional_parameter"),
            "identifier" => (Some(p), false),
            "rest_pattern" => (p.children().into_iter().next(), false),
            _ => continue,
        };
        let Some(name_node) = name_node else { continue };
        let declared_type = p.child_by_field("type").map(|n| n.text());
        let has_default = optional || p.child_by_field("value").is_some();
        out.push(Parameter {
            name: name_node.text(),
            declared_type,
            has_default,
            by_reference: false,
            variadic: p.kind() == "rest_pattern",
        });
    }
    out
}
