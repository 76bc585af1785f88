//! Catalog model: databases, tables and views with ordered columns, and
//! functions. A [`Catalog`] is an immutable snapshot; [`CatalogSource`]
//! hands out snapshots from a JSON file or a live Postgres server.
crate::reexport!(catalog);
crate::reexport!(column);
crate::reexport!(database);
crate::reexport!(datatype);
crate::reexport!(file);
crate::reexport!(function);
crate::reexport!(postgres);
crate::reexport!(source);
crate::reexport!(table);

use crate::*;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
