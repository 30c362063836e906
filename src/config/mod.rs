//! Configuration loader (spec §6). Thin by design: parse YAML, apply env
//! overrides, validate. Treated as an external collaborator per §1, but
//! still a real module using real crates (`serde_yml`), not a stdlib
//! stand-in — see `SPEC_FULL.md` §0.

pub mod model;

pub use model::{ImportStrategy, ProjectConfig};
