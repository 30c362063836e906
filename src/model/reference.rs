//! Reference model — a directed, typed edge between symbols, per spec §3.

use crate::model::span::Position;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The closed set of reference kinds. Never add a variant without updating
/// `materializer::label_map` and the resolver's layered-resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Contains,
    Defines,
    Extends,
    Implements,
    UsesTrait,
    Imports,
    Calls,
    CallsStatic,
    Instantiates,
    AccessesRead,
    AccessesWrite,
    ParameterType,
    ReturnsType,
    Throws,
    Overrides,
    ImplementsMethod,
    Instanceof,
    RegisteredIn,
    LoadsViaConfig,
    ApiCalls,
}

impl Display for ReferenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use ReferenceKind::*;
        let s = match self {
            Contains => "contains",
            Defines => "defines",
            Extends => "extends",
            Implements => "implements",
            UsesTrait => "uses_trait",
            Imports => "imports",
            Calls => "calls",
            CallsStatic => "calls_static",
            Instantiates => "instantiates",
            AccessesRead => "accesses_read",
            AccessesWrite => "accesses_write",
            ParameterType => "parameter_type",
            ReturnsType => "returns_type",
            Throws => "throws",
            Overrides => "overrides",
            ImplementsMethod => "implements_method",
            Instanceof => "instanceof",
            RegisteredIn => "registered_in",
            LoadsViaConfig => "loads_via_config",
            ApiCalls => "api_calls",
        };
        f.write_str(s)
    }
}

impl ReferenceKind {
    /// Structural references participate in type-hierarchy resolution and
    /// are resolved before signature/expression/derived references (§4.4).
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ReferenceKind::Extends
                | ReferenceKind::Implements
                | ReferenceKind::UsesTrait
                | ReferenceKind::Imports
        )
    }

    pub fn is_signature(self) -> bool {
        matches!(self, ReferenceKind::ParameterType | ReferenceKind::ReturnsType)
    }

    pub fn is_derived(self) -> bool {
        matches!(self, ReferenceKind::Overrides | ReferenceKind::ImplementsMethod)
    }
}

/// Extra context on a reference site: how the reference was made, distinct
/// from its kind (e.g. a `calls` made from inside a JSX element body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefContext {
    Call,
    StaticCall,
    Read,
    Write,
    Jsx,
}

/// A reference target: either a resolved concrete symbol, or a raw name
/// awaiting Pass 2 resolution. Exactly one of the two is ever `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefTarget {
    Resolved(String),
    Raw(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub source_id: String,
    pub target: RefTarget,
    pub kind: ReferenceKind,
    pub site: Position,
    #[serde(default)]
    pub context: Option<RefContext>,
}

impl Reference {
    pub fn raw(source_id: impl Into<String>, target_raw: impl Into<String>, kind: ReferenceKind, site: Position) -> Self {
        Self {
            source_id: source_id.into(),
            target: RefTarget::Raw(target_raw.into()),
            kind,
            site,
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: RefContext) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn target_raw(&self) -> Option<&str> {
        match &self.target {
            RefTarget::Raw(s) => Some(s),
            RefTarget::Resolved(_) => None,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match &self.target {
            RefTarget::Resolved(s) => Some(s),
            RefTarget::Raw(_) => None,
        }
    }
}
