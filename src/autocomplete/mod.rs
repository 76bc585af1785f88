//! Completion core: rules produce candidates from a [`ScopeContext`], the
//! ranker filters and orders them, and [`ContextService`] ties extraction,
//! scope resolution and ranking together per request.
crate::reexport!(candidate);
crate::reexport!(rules);
crate::reexport!(builtin);
crate::reexport!(ranker);
crate::reexport!(context);
crate::reexport!(service);
mod service_tests;
use crate::*;
use serde::Serialize;
use std::sync::Arc;
