//! Scope resolution: one [`Scope`] per query block, holding the tables in
//! scope under their aliases and the SELECT-list column aliases.
//!
//! Scopes live in an arena ([`ScopeTree`]) and refer to their parent by id,
//! so lookups can fall back outward without owning pointers.
crate::reexport!(tree);
crate::reexport!(resolver);
crate::reexport!(context);
use crate::*;
use serde::Serialize;
use std::sync::Arc;
