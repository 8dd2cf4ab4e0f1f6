use std::collections::HashMap;

use fund_crypto::script_hash;
use fund_types::{Address, AssetId, Identity, Script, ScriptHash, ScriptLanguage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScriptError, ScriptResult};
use crate::names::ValidatorName;

/// Parameters applied to a validator template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "validator")]
pub enum ValidatorParams {
    AdminToken {
        /// Token name (the fund id as text).
        token_name: String,
        admin: Identity,
    },
    Registry {
        admin_token: AssetId,
        admin: Identity,
    },
    Transfer {
        admin_token: AssetId,
        registry_hash: ScriptHash,
    },
}

impl ValidatorParams {
    pub fn name(&self) -> ValidatorName {
        match self {
            ValidatorParams::AdminToken { .. } => ValidatorName::AdminToken,
            ValidatorParams::Registry { .. } => ValidatorName::Registry,
            ValidatorParams::Transfer { .. } => ValidatorName::Transfer,
        }
    }

    /// Canonical byte encoding appended to the template.
    fn encode(&self) -> ScriptResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ScriptError::Blueprint(e.to_string()))
    }
}

/// A parameterized validator with its derived credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedValidator {
    pub name: ValidatorName,
    pub script: Script,
    pub hash: ScriptHash,
}

impl ResolvedValidator {
    pub fn address(&self) -> Address {
        Address::Script(self.hash)
    }
}

/// Source of parameterized validators.
///
/// Resolution must be deterministic: the same name and parameters always
/// yield byte-identical scripts and therefore the same credential hash.
pub trait ScriptRepository: Send + Sync {
    fn resolve(
        &self,
        name: ValidatorName,
        params: &ValidatorParams,
    ) -> ScriptResult<ResolvedValidator>;
}

#[derive(Clone, Debug, Deserialize)]
struct BlueprintValidator {
    title: String,
    #[serde(rename = "compiledCode")]
    compiled_code: String,
}

#[derive(Clone, Debug, Deserialize)]
struct Blueprint {
    validators: Vec<BlueprintValidator>,
}

/// Repository backed by a compiled blueprint (`plutus.json` layout).
///
/// A template is the blueprint's compiled code; applying parameters appends
/// their canonical encoding after a zero separator.
#[derive(Clone, Debug)]
pub struct BlueprintRepository {
    templates: HashMap<String, Vec<u8>>,
}

impl BlueprintRepository {
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let blueprint: Blueprint =
            serde_json::from_str(json).map_err(|e| ScriptError::Blueprint(e.to_string()))?;
        let mut templates = HashMap::new();
        for validator in blueprint.validators {
            let code = hex::decode(&validator.compiled_code).map_err(|e| {
                ScriptError::Blueprint(format!("{}: {e}", validator.title))
            })?;
            templates.insert(validator.title, code);
        }
        Ok(Self { templates })
    }

    /// Built-in development templates for local networks.
    pub fn builtin() -> Self {
        let templates = ValidatorName::ALL
            .into_iter()
            .map(|name| {
                let title = name.blueprint_title();
                (title.to_string(), format!("fund-dev-template:{title}").into_bytes())
            })
            .collect();
        Self { templates }
    }

    fn template(&self, name: ValidatorName) -> ScriptResult<&[u8]> {
        let title = name.blueprint_title();
        self.templates
            .get(title)
            .map(Vec::as_slice)
            .ok_or_else(|| ScriptError::UnknownValidator {
                title: title.to_string(),
            })
    }
}

impl ScriptRepository for BlueprintRepository {
    fn resolve(
        &self,
        name: ValidatorName,
        params: &ValidatorParams,
    ) -> ScriptResult<ResolvedValidator> {
        if params.name() != name {
            return Err(ScriptError::ParamsMismatch {
                expected: name,
                given: params.name(),
            });
        }
        let mut code = self.template(name)?.to_vec();
        code.push(0);
        code.extend(params.encode()?);

        let script = Script::new(ScriptLanguage::PlutusV3, code);
        let hash = script_hash(&script);
        debug!(%name, %hash, "validator resolved");
        Ok(ResolvedValidator { name, script, hash })
    }
}
