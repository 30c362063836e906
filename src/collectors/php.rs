//! PHP-family collector — the "scoped source language" minimum recognition
//! set from spec §4.2: namespaces, classes, interfaces, traits, enums,
//! methods, properties, constants, functions; visibility/static/abstract/
//! final/readonly modifiers; use-statements (plain, aliased, grouped);
//! attributes.
//!
//! Traversal is a stack-based depth-first walk carrying an owner scope
//! chain, and hedges grammar node-kind naming by matching a small set of
//! plausible alternative kind strings per concept, since tree-sitter
//! grammars are assumed, not pinned against here.

use crate::ast::{Cursor, ParsedFile};
use crate::collectors::{CollectOutput, LanguageCollector};
use crate::ids::symbol_id;
use crate::model::{
    symbol::{DeclaredTypes, DocBlock, DocEntry, Parameter, Signature},
    LanguageKind, Modifier, RefContext, Reference, ReferenceKind, Span, Symbol, SymbolKind,
};
use regex::Regex;
use std::sync::OnceLock;

/// Matches a `#[Route("/path", methods: ["POST"])]`-style attribute text
/// (framework-agnostic enough to also hit `@Route("/path", methods={"GET"})`
/// annotation-style docblocks). Capture 1 is the path, capture 2 the
/// optional method.
fn route_attribute_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)Route\s*\(\s*["']([^"']+)["'](?:[^)]*?(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS))?[^)]*\)"#).unwrap()
    })
}

fn extract_route_entry(attribute_text: &str) -> Option<DocEntry> {
    let caps = route_attribute_pattern().captures(attribute_text)?;
    let path = caps.get(1)?.as_str();
    let method = caps.get(2).map(|m| m.as_str()).unwrap_or("GET");
    Some(DocEntry { tag: "http_route".to_string(), detail: format!("{method} {path}") })
}

pub struct PhpCollector;

const LANG: LanguageKind = LanguageKind::Php;

struct Scope {
    /// Dotted/scoped qualified-name prefix, PHP `\` separators normalized to `.`.
    qualifier: String,
    parent_id: String,
    /// Set while inside a class/interface/trait/enum body, for `self`/`static`.
    enclosing_class_qn: Option<String>,
}

impl PhpCollector {
    fn qualify(prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }
}

impl LanguageCollector for PhpCollector {
    fn collect(&self, parsed: &ParsedFile, file_symbol_id: &str, repo_rel_path: &str) -> anyhow::Result<CollectOutput> {
        let mut out = CollectOutput::default();
        let root_scope = Scope {
            qualifier: String::new(),
            parent_id: file_symbol_id.to_string(),
            enclosing_class_qn: None,
        };
        walk(&parsed.root(), repo_rel_path, &root_scope, &mut out);
        Ok(out)
    }
}

fn make_symbol(
    repo_rel_path: &str,
    kind: SymbolKind,
    name: &str,
    qn: &str,
    span: Span,
    parent_id: &str,
    modifiers: Vec<Modifier>,
) -> Symbol {
    Symbol {
        id: symbol_id(LANG, kind, qn, repo_rel_path),
        kind,
        name: name.to_string(),
        qualified_name: qn.to_string(),
        language: LANG,
        file_path: repo_rel_path.to_string(),
        span,
        parent_id: Some(parent_id.to_string()),
        modifiers,
        signature: None,
        declared_types: None,
        docblock: None,
    }
}

fn modifiers_of(node: &Cursor) -> Vec<Modifier> {
    let mut mods = Vec::new();
    for child in node.children() {
        match child.kind() {
            "abstract_modifier" => mods.push(Modifier::Abstract),
            "final_modifier" => mods.push(Modifier::Final),
            "static_modifier" => mods.push(Modifier::Static),
            "readonly_modifier" => mods.push(Modifier::Readonly),
            "visibility_modifier" => match child.text().as_str() {
                "public" => mods.push(Modifier::Public),
                "protected" => mods.push(Modifier::Protected),
                "private" => mods.push(Modifier::Private),
                _ => {}
            },
            _ => {}
        }
    }
    mods
}

/// Depth-first pre-order walk. Declarations and raw references are emitted
/// in the same traversal (the two "passes" from §4.2 are logically
/// separate concerns, both driven from this one walk for efficiency).
fn walk(node: &Cursor, repo_rel_path: &str, scope: &Scope, out: &mut CollectOutput) {
    for child in node.children() {
        match child.kind() {
            "namespace_definition" => {
                let name = child
                    .child_by_field("name")
                    .map(|n| n.text().replace('\\', "."))
                    .unwrap_or_default();
                let qn = PhpCollector::qualify(&scope.qualifier, &name);
                let sym = make_symbol(
                    repo_rel_path,
                    SymbolKind::Namespace,
                    &name,
                    &qn,
                    child.span(),
                    &scope.parent_id,
                    vec![],
                );
                out.references.push(Reference::raw(
                    scope.parent_id.clone(),
                    sym.id.clone(),
                    ReferenceKind::Defines,
                    child.span().start,
                ));
                let child_scope = Scope {
                    qualifier: qn,
                    parent_id: sym.id.clone(),
                    enclosing_class_qn: None,
                };
                out.symbols.push(sym);
                walk(&child, repo_rel_path, &child_scope, out);
            }

            "class_declaration" | "interface_declaration" | "trait_declaration" | "enum_declaration" => {
                let kind = match child.kind() {
                    "class_declaration" => SymbolKind::Class,
                    "interface_declaration" => SymbolKind::Interface,
                    "trait_declaration" => SymbolKind::Trait,
                    _ => SymbolKind::Enum,
                };
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = PhpCollector::qualify(&scope.qualifier, &name);
                let mods = modifiers_of(&child);
                let sym = make_symbol(repo_rel_path, kind, &name, &qn, child.span(), &scope.parent_id, mods);
                let container_id = sym.id.clone();

                out.references.push(Reference::raw(
                    scope.parent_id.clone(),
                    container_id.clone(),
                    ReferenceKind::Defines,
                    child.span().start,
                ));

                // `extends`: `base_clause` (classes/interfaces), single or multiple names.
                if let Some(base) = child.child_by_field("base_clause").or_else(|| find_child(&child, "base_clause")) {
                    for n in names_in(&base) {
                        out.references.push(Reference::raw(
                            container_id.clone(),
                            n,
                            ReferenceKind::Extends,
                            base.span().start,
                        ));
                    }
                }
                // `implements`: `class_interface_clause`.
                if let Some(iface) = find_child(&child, "class_interface_clause") {
                    for n in names_in(&iface) {
                        out.references.push(Reference::raw(
                            container_id.clone(),
                            n,
                            ReferenceKind::Implements,
                            iface.span().start,
                        ));
                    }
                }
                // Enum's backing/interface clause also resolves as `implements`.
                if let Some(iface) = find_child(&child, "enum_interface_clause") {
                    for n in names_in(&iface) {
                        out.references.push(Reference::raw(
                            container_id.clone(),
                            n,
                            ReferenceKind::Implements,
                            iface.span().start,
                        ));
                    }
                }

                let child_scope = Scope {
                    qualifier: qn,
                    parent_id: container_id,
                    enclosing_class_qn: Some(PhpCollector::qualify(&scope.qualifier, &name)),
                };
                out.symbols.push(sym);
                walk(&child, repo_rel_path, &child_scope, out);
            }

            "use_declaration" if scope.enclosing_class_qn.is_some() => {
                // `use TraitA, TraitB { ... }` inside a class/trait body.
                for n in names_in(&child) {
                    out.references.push(Reference::raw(
                        scope.parent_id.clone(),
                        n,
                        ReferenceKind::UsesTrait,
                        child.span().start,
                    ));
                }
            }

            "namespace_use_declaration" => {
                // Top-level `use`: plain, aliased (`as`), and grouped
                // (`use Foo\{Bar, Baz as Qux}`) all flatten to one raw
                // `imports` reference per imported name.
                for (raw_target, _alias) in use_clauses(&child) {
                    out.references.push(Reference::raw(
                        scope.parent_id.clone(),
                        raw_target,
                        ReferenceKind::Imports,
                        child.span().start,
                    ));
                }
            }

            "method_declaration" | "function_definition" => {
                let kind = if scope.enclosing_class_qn.is_some() {
                    SymbolKind::Method
                } else {
                    SymbolKind::Function
                };
                let name = child.child_by_field("name").map(|n| n.text()).unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let qn = PhpCollector::qualify(&scope.qualifier, &name);
                let mods = modifiers_of(&child);
                let mut sym = make_symbol(repo_rel_path, kind, &name, &qn, child.span(), &scope.parent_id, mods);

                if let Some(params) = child.child_by_field("parameters") {
                    sym.signature = Some(Signature { parameters: parse_params(&params) });
                    for p in &sym.signature.as_ref().unwrap().parameters {
                        if let Some(t) = &p.declared_type {
                            out.references.push(Reference::raw(
                                sym.id.clone(),
                                t.clone(),
                                ReferenceKind::ParameterType,
                                child.span().start,
                            ));
                        }
                    }
                }
                if let Some(rt) = child.child_by_field("return_type") {
                    let rt_name = rt.text();
                    sym.declared_types = Some(DeclaredTypes { return_type: Some(rt_name.clone()), union_members: vec![] });
                    out.references.push(Reference::raw(
                        sym.id.clone(),
                        rt_name,
                        ReferenceKind::ReturnsType,
                        child.span().start,
                    ));
                }
                if let Some(entry) = route_entry_from_preceding(&child) {
                    sym.docblock = Some(DocBlock { summary: None, entries: vec![entry] });
                }

                out.references.push(Reference::raw(
                    scope.parent_id.clone(),
                    sym.id.clone(),
                    ReferenceKind::Defines,
                    child.span().start,
                ));

                let method_id = sym.id.clone();
                out.symbols.push(sym);

                if let Some(body) = child.child_by_field("body") {
                    collect_expression_refs(&body, &method_id, scope, out);
                }
            }

            "property_declaration" => {
                let mods = modifiers_of(&child);
                let declared_type = find_child(&child, "union_type")
                    .or_else(|| find_child(&child, "primitive_type"))
                    .or_else(|| find_child(&child, "named_type"))
                    .map(|n| n.text());
                for element in child.children() {
                    if element.kind() != "property_element" {
                        continue;
                    }
                    let name = element.text().trim_start_matches('$').to_string();
                    let qn = PhpCollector::qualify(&scope.qualifier, &name);
                    let mut sym = make_symbol(
                        repo_rel_path,
                        SymbolKind::Property,
                        &name,
                        &qn,
                        element.span(),
                        &scope.parent_id,
                        mods.clone(),
                    );
                    if let Some(t) = &declared_type {
                        sym.declared_types = Some(DeclaredTypes { return_type: Some(t.clone()), union_members: vec![] });
                    }
                    out.references.push(Reference::raw(
                        scope.parent_id.clone(),
                        sym.id.clone(),
                        ReferenceKind::Defines,
                        element.span().start,
                    ));
                    out.symbols.push(sym);
                }
            }

            "const_declaration" => {
                for element in child.children() {
                    if element.kind() != "const_element" {
                        continue;
                    }
                    let name = element.child_by_field("name").map(|n| n.text()).unwrap_or_else(|| element.text());
                    let qn = PhpCollector::qualify(&scope.qualifier, &name);
                    let sym = make_symbol(
                        repo_rel_path,
                        SymbolKind::Constant,
                        &name,
                        &qn,
                        element.span(),
                        &scope.parent_id,
                        vec![],
                    );
                    out.references.push(Reference::raw(
                        scope.parent_id.clone(),
                        sym.id.clone(),
                        ReferenceKind::Defines,
                        element.span().start,
                    ));
                    out.symbols.push(sym);
                }
            }

            "compound_statement" | "declaration_list" | "program" => {
                walk(&child, repo_rel_path, scope, out);
            }

            _ => {
                // Free-function bodies at top level (rare in PHP outside a
                // function) still need expression-reference scanning.
                walk(&child, repo_rel_path, scope, out);
            }
        }
    }
}

/// Reference-pass scan of an expression/statement subtree, emitting the
/// `calls`/`calls_static`/`instantiates`/`accesses_*`/`throws`/`instanceof`
/// raw references described in §4.2.
fn collect_expression_refs(node: &Cursor, enclosing_id: &str, scope: &Scope, out: &mut CollectOutput) {
    let site = node.span().start;
    match node.kind() {
        "object_creation_expression" => {
            if let Some(target) = node.child_by_field("class").or_else(|| node.children().into_iter().next()) {
                out.references.push(Reference::raw(enclosing_id, target.text(), ReferenceKind::Instantiates, site));
            }
        }
        "member_call_expression" => {
            if let Some(name) = node.child_by_field("name") {
                let receiver = node.child_by_field("object").map(|n| n.text()).unwrap_or_default();
                let raw = if receiver.is_empty() { name.text() } else { format!("{receiver}.{}", name.text()) };
                out.references.push(Reference::raw(enclosing_id, raw, ReferenceKind::Calls, site).with_context(RefContext::Call));
            }
        }
        "scoped_call_expression" => {
            if let Some(name) = node.child_by_field("name") {
                let scope_name = node.child_by_field("scope").map(|n| n.text()).unwrap_or_default();
                let scope_name = resolve_self_parent(&scope_name, scope);
                let raw = format!("{scope_name}.{}", name.text());
                out.references.push(Reference::raw(enclosing_id, raw, ReferenceKind::CallsStatic, site).with_context(RefContext::StaticCall));
            }
        }
        "function_call_expression" => {
            if let Some(f) = node.child_by_field("function") {
                out.references.push(Reference::raw(enclosing_id, f.text(), ReferenceKind::Calls, site).with_context(RefContext::Call));
            }
        }
        "member_access_expression" => {
            let prop = node.child_by_field("name").map(|n| n.text()).unwrap_or_default();
            if !prop.is_empty() {
                out.references.push(Reference::raw(enclosing_id, prop, ReferenceKind::AccessesRead, site).with_context(RefContext::Read));
            }
        }
        "assignment_expression" | "augmented_assignment_expression" => {
            if let Some(left) = node.child_by_field("left") {
                if left.kind() == "member_access_expression" {
                    if let Some(prop) = left.child_by_field("name") {
                        out.references.push(
                            Reference::raw(enclosing_id, prop.text(), ReferenceKind::AccessesWrite, site).with_context(RefContext::Write),
                        );
                    }
                    // Do not also emit a read for the same site: the write
                    // supersedes it (§8 "Access direction" property).
                    for gc in left.children() {
                        collect_expression_refs(&gc, enclosing_id, scope, out);
                    }
                }
            }
            if let Some(right) = node.child_by_field("right") {
                collect_expression_refs(&right, enclosing_id, scope, out);
            }
        }
        "update_expression" => {
            if let Some(target) = node.children().into_iter().next() {
                if target.kind() == "member_access_expression" {
                    if let Some(prop) = target.child_by_field("name") {
                        out.references.push(
                            Reference::raw(enclosing_id, prop.text(), ReferenceKind::AccessesWrite, site).with_context(RefContext::Write),
                        );
                    }
                }
            }
        }
        "throw_expression" => {
            for c in node.children() {
                if c.kind() == "object_creation_expression" {
                    if let Some(target) = c.child_by_field("class") {
                        out.references.push(Reference::raw(enclosing_id, target.text(), ReferenceKind::Throws, site));
                    }
                }
            }
        }
        "instanceof_expression" => {
            if let Some(right) = node.child_by_field("right") {
                out.references.push(Reference::raw(enclosing_id, right.text(), ReferenceKind::Instanceof, site));
            }
        }
        _ => {}
    }

    for c in node.children() {
        // Avoid double-walking the subtrees already fully handled above.
        if matches!(node.kind(), "assignment_expression" | "augmented_assignment_expression" | "update_expression") {
            continue;
        }
        collect_expression_refs(&c, enclosing_id, scope, out);
    }
}

fn resolve_self_parent(scope_name: &str, scope: &Scope) -> String {
    match scope_name {
        "self" | "static" => scope.enclosing_class_qn.clone().unwrap_or_else(|| scope_name.to_string()),
        "parent" => format!("{}::parent", scope.enclosing_class_qn.clone().unwrap_or_default()),
        other => other.to_string(),
    }
}

/// Looks at the nodes immediately preceding `node` (attribute groups, then
/// a docblock comment) for a route declaration.
fn route_entry_from_preceding(node: &Cursor) -> Option<DocEntry> {
    let mut sibling = node.prev_named_sibling();
    while let Some(s) = sibling {
        match s.kind() {
            "attribute_list" | "attribute_group" | "comment" => {
                if let Some(entry) = extract_route_entry(&s.text()) {
                    return Some(entry);
                }
                sibling = s.prev_named_sibling();
            }
            _ => break,
        }
    }
    None
}

fn find_child<'a>(node: &Cursor<'a>, kind: &str) -> Option<Cursor<'a>> {
    node.children().into_iter().find(|c| c.kind() == kind)
}

/// Collect every `name`/`qualified_name` leaf under a clause node (used for
/// `extends`/`implements`/`use` target lists).
fn names_in(node: &Cursor) -> Vec<String> {
    let mut out = Vec::new();
    for c in node.children() {
        match c.kind() {
            "name" | "qualified_name" => out.push(c.text().replace('\\', ".")),
            _ => out.extend(names_in(&c)),
        }
    }
    out
}

/// Expands plain/aliased/grouped `use` clauses into `(raw_target, alias)` pairs.
fn use_clauses(node: &Cursor) -> Vec<(String, Option<String>)> {
    let mut out = Vec::new();
    for c in node.children() {
        match c.kind() {
            "namespace_use_clause" => {
                let name = c.child_by_field("name").map(|n| n.text().replace('\\', ".")).unwrap_or_default();
                let alias = c.child_by_field("alias").map(|n| n.text());
                if !name.is_empty() {
                    out.push((name, alias));
                }
            }
            "namespace_use_group" => {
                let prefix = c.child_by_field("prefix").map(|n| n.text().replace('\\', ".")).unwrap_or_default();
                for member in c.children() {
                    if member.kind() == "namespace_use_group_clause" {
                        let name = member.child_by_field("name").map(|n| n.text().replace('\\', ".")).unwrap_or_default();
                        let alias = member.child_by_field("alias").map(|n| n.text());
                        if !name.is_empty() {
                            out.push((format!("{prefix}.{name}"), alias));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn parse_params(params_node: &Cursor) -> Vec<Parameter> {
    let mut out = Vec::new();
    for p in params_node.children() {
        if !matches!(p.kind(), "simple_parameter" | "variadic_parameter" | "property_promotion_parameter") {
            continue;
        }
        let name = p
            .child_by_field("name")
            .map(|n| n.text().trim_start_matches('$').to_string())
            .unwrap_or_default();
        let declared_type = p
            .child_by_field("type")
            .map(|n| n.text());
        let has_default = p.child_by_field("default_value").is_some();
        let by_reference = p.text().trim_start().starts_with('&');
        let variadic = p.kind() == "variadic_parameter";
        out.push(Parameter { name, declared_type, has_default, by_reference, variadic });
    }
    out
}
