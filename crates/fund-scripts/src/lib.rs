//! Validators and script binding for the whitelisted fund.
//!
//! - [`ScriptRepository`] resolves a validator name plus parameters into a
//!   deterministic script; [`BlueprintRepository`] reads compiled blueprints
//! - [`ScriptsBag`] holds one value per [`ValidatorName`]
//! - [`ScriptBinder`] turns stored scripts into [`ScriptHandle`]s, either
//!   inline or pointing at a published copy on the ledger

pub mod binding;
pub mod error;
pub mod names;
pub mod repository;

pub use binding::{BindingMode, ScriptBinder, ScriptHandle};
pub use error::{ScriptError, ScriptResult};
pub use names::{ScriptsBag, ValidatorName};
pub use repository::{BlueprintRepository, ResolvedValidator, ScriptRepository, ValidatorParams};
