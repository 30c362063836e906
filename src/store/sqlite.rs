//! `rusqlite`-backed persistent symbol store (C3, spec §4.3). WAL mode lets
//! the single writer thread (see `writer`) commit while readers (resolver,
//! linker, materializer query helpers) run concurrently, per the spec's
//! "single writer, concurrent readers" constraint.
//!
//! Row <-> domain-type mapping follows the column layout in `schema`,
//! using plain `params!`/`query_map` calls rather than an ORM so the SQL
//! stays inspectable next to the struct it populates.

use crate::model::{
    symbol::{DeclaredTypes, DocBlock, Modifier, Signature},
    LanguageKind, Position, RefContext, RefTarget, Reference, ReferenceKind, Span, Symbol, SymbolKind,
};
use crate::store::schema;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "OFF")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute(schema::CREATE_SCHEMA_VERSION, [])?;
        self.conn.execute(schema::CREATE_SYMBOLS, [])?;
        self.conn.execute(schema::CREATE_REFERENCES, [])?;
        self.conn.execute(schema::CREATE_CONFIG_REFERENCES, [])?;
        for stmt in schema::INDEXES {
            self.conn.execute(stmt, [])?;
        }
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |r| r.get(0))
            .optional()?;
        if existing.is_none() {
            self.conn
                .execute("INSERT INTO schema_version(version) VALUES (?1)", params![schema::SCHEMA_VERSION])?;
        }
        Ok(())
    }

    /// Deletes every symbol/reference row rooted under `file_path`, used
    /// before re-indexing one file so re-runs are idempotent (§8).
    pub fn clear_file(&mut self, file_path: &str) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM refs WHERE source_id IN (SELECT id FROM symbols WHERE file_path = ?1)",
            params![file_path],
        )?;
        tx.execute("DELETE FROM symbols WHERE file_path = ?1", params![file_path])?;
        tx.commit()
    }

    pub fn insert_symbols(&mut self, symbols: &[Symbol]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        for s in symbols {
            insert_symbol(&tx, s)?;
        }
        tx.commit()
    }

    pub fn insert_references(&mut self, refs: &[Reference]) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        for r in refs {
            insert_reference(&tx, r)?;
        }
        tx.commit()
    }

    pub fn get_symbol(&self, id: &str) -> rusqlite::Result<Option<Symbol>> {
        self.conn
            .query_row("SELECT * FROM symbols WHERE id = ?1", params![id], row_to_symbol)
            .optional()
    }

    /// Strategy 1: exact fully-qualified-name match within the same language.
    pub fn find_exact(&self, language: LanguageKind, qualified_name: &str) -> rusqlite::Result<Vec<Symbol>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM symbols WHERE language = ?1 AND qualified_name = ?2")?;
        let rows = stmt
            .query_map(params![language.to_string(), qualified_name], row_to_symbol)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Strategy: any symbol whose qualified name ends with `.{suffix}` or
    /// equals `suffix`, used for the unique partial-suffix-match fallback.
    /// Only useful to the resolver when exactly one row comes back.
    pub fn find_by_suffix(&self, language: LanguageKind, suffix: &str) -> rusqlite::Result<Vec<Symbol>> {
        let pattern = format!("%.{suffix}");
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM symbols WHERE language = ?1 AND (qualified_name = ?2 OR qualified_name LIKE ?3)")?;
        let rows = stmt
            .query_map(params![language.to_string(), suffix, pattern], row_to_symbol)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn children_of(&self, parent_id: &str) -> rusqlite::Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT * FROM symbols WHERE parent_id = ?1")?;
        let rows = stmt.query_map(params![parent_id], row_to_symbol)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn symbols_by_kind(&self, kind: SymbolKind) -> rusqlite::Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT * FROM symbols WHERE kind = ?1")?;
        let rows = stmt
            .query_map(params![kind.as_str()], row_to_symbol)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn all_symbols(&self) -> rusqlite::Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare("SELECT * FROM symbols")?;
        let rows = stmt.query_map([], row_to_symbol)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn all_references(&self) -> rusqlite::Result<Vec<Reference>> {
        let mut stmt = self.conn.prepare("SELECT * FROM refs")?;
        let rows = stmt.query_map([], row_to_reference)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn unresolved_references(&self) -> rusqlite::Result<Vec<Reference>> {
        let mut stmt = self.conn.prepare("SELECT * FROM refs WHERE target_id IS NULL")?;
        let rows = stmt.query_map([], row_to_reference)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Resolved targets of every `kind`-edge out of `source_id` (used by the
    /// derived-reference pass to walk `extends`/`implements` chains).
    pub fn resolved_targets(&self, source_id: &str, kind: ReferenceKind) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT target_id FROM refs WHERE source_id = ?1 AND kind = ?2 AND target_id IS NOT NULL")?;
        let rows = stmt
            .query_map(params![source_id, kind.to_string()], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Resolves one previously-raw reference in place. Called by the
    /// resolver once it has decided a `target_id` for `(source_id, kind,
    /// site, target_raw)`.
    pub fn resolve_reference(
        &mut self,
        source_id: &str,
        target_raw: &str,
        kind: ReferenceKind,
        site: Position,
        target_id: &str,
    ) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE refs SET target_id = ?1, target_raw = NULL
             WHERE source_id = ?2 AND target_raw = ?3 AND kind = ?4 AND site_line = ?5 AND site_column = ?6",
            params![
                target_id,
                source_id,
                target_raw,
                kind.to_string(),
                site.line as i64,
                site.column as i64
            ],
        )?;
        Ok(())
    }

    pub fn insert_config_reference(
        &mut self,
        config_file_id: &str,
        target_raw: &str,
        target_id: Option<&str>,
        kind: ReferenceKind,
        key_path: &str,
    ) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO config_references(config_file_id, target_id, target_raw, kind, key_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![config_file_id, target_id, target_raw, kind.to_string(), key_path],
        )?;
        Ok(())
    }
}

fn insert_symbol(tx: &Transaction, s: &Symbol) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR REPLACE INTO symbols (
            id, kind, name, qualified_name, language, file_path,
            start_line, start_column, start_byte, end_byte, parent_id,
            modifiers_json, signature_json, declared_types_json, docblock_json, indexed_at
        ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        params![
            s.id,
            s.kind.as_str(),
            s.name,
            s.qualified_name,
            s.language.to_string(),
            s.file_path,
            s.span.start.line as i64,
            s.span.start.column as i64,
            s.span.start_byte as i64,
            s.span.end_byte as i64,
            s.parent_id,
            serde_json::to_string(&s.modifiers).unwrap_or_else(|_| "[]".into()),
            s.signature.as_ref().map(|v| serde_json::to_string(v).unwrap_or_default()),
            s.declared_types.as_ref().map(|v| serde_json::to_string(v).unwrap_or_default()),
            s.docblock.as_ref().map(|v| serde_json::to_string(v).unwrap_or_default()),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn insert_reference(tx: &Transaction, r: &Reference) -> rusqlite::Result<()> {
    let (target_id, target_raw) = match &r.target {
        RefTarget::Resolved(id) => (Some(id.clone()), None),
        RefTarget::Raw(raw) => (None, Some(raw.clone())),
    };
    tx.execute(
        "INSERT OR IGNORE INTO refs (source_id, target_id, target_raw, kind, site_line, site_column, context)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            r.source_id,
            target_id,
            target_raw,
            r.kind.to_string(),
            r.site.line as i64,
            r.site.column as i64,
            r.context.map(|c| format!("{c:?}")),
        ],
    )?;
    Ok(())
}

fn row_to_symbol(row: &rusqlite::Row) -> rusqlite::Result<Symbol> {
    let kind_str: String = row.get("kind")?;
    let lang_str: String = row.get("language")?;
    let modifiers_json: String = row.get("modifiers_json")?;
    let signature_json: Option<String> = row.get("signature_json")?;
    let declared_types_json: Option<String> = row.get("declared_types_json")?;
    let docblock_json: Option<String> = row.get("docblock_json")?;

    Ok(Symbol {
        id: row.get("id")?,
        kind: parse_symbol_kind(&kind_str),
        name: row.get("name")?,
        qualified_name: row.get("qualified_name")?,
        language: parse_language(&lang_str),
        file_path: row.get("file_path")?,
        span: Span::new(
            Position::new(row.get::<_, i64>("start_line")? as usize, row.get::<_, i64>("start_column")? as usize),
            row.get::<_, i64>("start_byte")? as usize,
            row.get::<_, i64>("end_byte")? as usize,
        ),
        parent_id: row.get("parent_id")?,
        modifiers: serde_json::from_str::<Vec<Modifier>>(&modifiers_json).unwrap_or_default(),
        signature: signature_json.and_then(|s| serde_json::from_str::<Signature>(&s).ok()),
        declared_types: declared_types_json.and_then(|s| serde_json::from_str::<DeclaredTypes>(&s).ok()),
        docblock: docblock_json.and_then(|s| serde_json::from_str::<DocBlock>(&s).ok()),
    })
}

fn row_to_reference(row: &rusqlite::Row) -> rusqlite::Result<Reference> {
    let kind_str: String = row.get("kind")?;
    let target_id: Option<String> = row.get("target_id")?;
    let target_raw: Option<String> = row.get("target_raw")?;
    let target = match target_id {
        Some(id) => RefTarget::Resolved(id),
        None => RefTarget::Raw(target_raw.unwrap_or_default()),
    };
    Ok(Reference {
        source_id: row.get("source_id")?,
        target,
        kind: parse_reference_kind(&kind_str),
        site: Position::new(row.get::<_, i64>("site_line")? as usize, row.get::<_, i64>("site_column")? as usize),
        context: row.get::<_, Option<String>>("context")?.and_then(|s| parse_ref_context(&s)),
    })
}

fn parse_symbol_kind(s: &str) -> SymbolKind {
    use SymbolKind::*;
    match s {
        "namespace" => Namespace,
        "module" => Module,
        "class" => Class,
        "interface" => Interface,
        "trait" => Trait,
        "enum" => Enum,
        "function" => Function,
        "method" => Method,
        "property" => Property,
        "constant" => Constant,
        "field" => Field,
        "parameter" => Parameter,
        "file" => File,
        "directory" => Directory,
        "config_file" => ConfigFile,
        "external_placeholder" => ExternalPlaceholder,
        "api_endpoint" => ApiEndpoint,
        _ => ExternalPlaceholder,
    }
}

fn parse_language(s: &str) -> LanguageKind {
    match s {
        "php" => LanguageKind::Php,
        "javascript" => LanguageKind::JavaScript,
        "typescript" => LanguageKind::TypeScript,
        _ => LanguageKind::Meta,
    }
}

fn parse_reference_kind(s: &str) -> ReferenceKind {
    use ReferenceKind::*;
    match s {
        "contains" => Contains,
        "defines" => Defines,
        "extends" => Extends,
        "implements" => Implements,
        "uses_trait" => UsesTrait,
        "imports" => Imports,
        "calls" => Calls,
        "calls_static" => CallsStatic,
        "instantiates" => Instantiates,
        "accesses_read" => AccessesRead,
        "accesses_write" => AccessesWrite,
        "parameter_type" => ParameterType,
        "returns_type" => ReturnsType,
        "throws" => Throws,
        "overrides" => Overrides,
        "implements_method" => ImplementsMethod,
        "instanceof" => Instanceof,
        "registered_in" => RegisteredIn,
        "loads_via_config" => LoadsViaConfig,
        _ => ApiCalls,
    }
}

fn parse_ref_context(s: &str) -> Option<RefContext> {
    match s {
        "Call" => Some(RefContext::Call),
        "StaticCall" => Some(RefContext::StaticCall),
        "Read" => Some(RefContext::Read),
        "Write" => Some(RefContext::Write),
        "Jsx" => Some(RefContext::Jsx),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::symbol::EXTERNAL_FILE_PATH;

    fn sample_symbol(id: &str, qn: &str) -> Symbol {
        Symbol {
            id: id.to_string(),
            kind: SymbolKind::Class,
            name: qn.rsplit('.').next().unwrap_or(qn).to_string(),
            qualified_name: qn.to_string(),
            language: LanguageKind::Php,
            file_path: "src/App.php".to_string(),
            span: Span::zero(),
            parent_id: None,
            modifiers: vec![],
            signature: None,
            declared_types: None,
            docblock: None,
        }
    }

    #[test]
    fn round_trips_symbol() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let sym = sample_symbol("abc123", "App.Controller");
        store.insert_symbols(&[sym.clone()]).unwrap();
        let found = store.get_symbol("abc123").unwrap().unwrap();
        assert_eq!(found.qualified_name, "App.Controller");
        assert_eq!(found.language, LanguageKind::Php);
    }

    #[test]
    fn exact_match_is_language_scoped() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut other_lang = sample_symbol("xyz", "App.Controller");
        other_lang.language = LanguageKind::TypeScript;
        store.insert_symbols(&[sample_symbol("abc", "App.Controller"), other_lang]).unwrap();
        let hits = store.find_exact(LanguageKind::Php, "App.Controller").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "abc");
    }

    #[test]
    fn clear_file_removes_its_references_too() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_symbols(&[sample_symbol("abc", "App.Controller")]).unwrap();
        store
            .insert_references(&[Reference::raw("abc", "App.Base", ReferenceKind::Extends, Position::new(1, 0))])
            .unwrap();
        store.clear_file("src/App.php").unwrap();
        assert!(store.get_symbol("abc").unwrap().is_none());
        assert_eq!(store.all_references().unwrap().len(), 0);
    }

    #[test]
    fn external_file_path_constant_is_distinct_from_real_paths() {
        assert_ne!(EXTERNAL_FILE_PATH, "src/App.php");
    }
}
