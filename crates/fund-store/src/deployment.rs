use chrono::{DateTime, Utc};
use fund_scripts::{ScriptRepository, ScriptsBag, ValidatorName, ValidatorParams};
use fund_types::{AssetId, AssetName, Identity, OutputRef, Script};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Fund-level parameters derived at deployment time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentParams {
    /// The capability token tracking whitelist membership.
    pub admin_token: AssetId,
}

/// Everything needed to operate one fund.
///
/// Immutable once created; [`Deployment::rebuild`] produces a new record
/// with scripts and derived hashes recomputed from the build arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub fund_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    pub params: DeploymentParams,
    pub scripts: ScriptsBag<Script>,
    /// Output references of published copies, when published.
    pub script_refs: ScriptsBag<Option<OutputRef>>,
    pub build_args: ScriptsBag<ValidatorParams>,
}

impl Deployment {
    /// Resolve all three validators for a new fund administered by `admin`.
    ///
    /// The AdminToken policy is parameterized by the fund id and admin; its
    /// hash and the fund id name the capability token, which parameterizes
    /// the Registry; the Transfer validator takes the token and the Registry
    /// hash.
    pub fn create<R: ScriptRepository + ?Sized>(
        repo: &R,
        fund_id: &str,
        admin: Identity,
    ) -> Result<Self> {
        let admin_token_args = ValidatorParams::AdminToken {
            token_name: fund_id.to_string(),
            admin,
        };
        let admin_policy = repo.resolve(ValidatorName::AdminToken, &admin_token_args)?;
        let admin_token = AssetId::new(admin_policy.hash, AssetName::from_text(fund_id));

        let registry_args = ValidatorParams::Registry {
            admin_token: admin_token.clone(),
            admin,
        };
        let registry = repo.resolve(ValidatorName::Registry, &registry_args)?;

        let transfer_args = ValidatorParams::Transfer {
            admin_token: admin_token.clone(),
            registry_hash: registry.hash,
        };
        let transfer = repo.resolve(ValidatorName::Transfer, &transfer_args)?;

        info!(fund_id, %admin_token, "deployment resolved");
        Ok(Self {
            fund_id: fund_id.to_string(),
            created_at: Utc::now(),
            description: None,
            params: DeploymentParams { admin_token },
            scripts: ScriptsBag {
                admin_token: admin_policy.script,
                registry: registry.script,
                transfer: transfer.script,
            },
            script_refs: ScriptsBag::default(),
            build_args: ScriptsBag {
                admin_token: admin_token_args,
                registry: registry_args,
                transfer: transfer_args,
            },
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Recompute scripts and derived hashes from the root build arguments.
    ///
    /// Published references whose script changed are dropped, since the
    /// on-ledger copy no longer matches.
    pub fn rebuild<R: ScriptRepository + ?Sized>(&self, repo: &R) -> Result<Self> {
        let admin = match &self.build_args.admin_token {
            ValidatorParams::AdminToken { admin, .. } => *admin,
            other => {
                return Err(fund_scripts::ScriptError::ParamsMismatch {
                    expected: ValidatorName::AdminToken,
                    given: other.name(),
                }
                .into())
            }
        };
        let mut rebuilt = Self::create(repo, &self.fund_id, admin)?;
        rebuilt.created_at = self.created_at;
        rebuilt.description = self.description.clone();
        rebuilt.script_refs = self.script_refs.clone();

        for name in ValidatorName::ALL {
            if rebuilt.scripts.get(name) != self.scripts.get(name) {
                if let Some(stale) = rebuilt.script_refs.get_mut(name).take() {
                    warn!(fund_id = %self.fund_id, %name, %stale, "script changed, dropping published reference");
                }
            }
        }
        Ok(rebuilt)
    }

    pub fn admin(&self) -> Option<Identity> {
        match &self.build_args.admin_token {
            ValidatorParams::AdminToken { admin, .. } => Some(*admin),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.script_refs.iter().all(|(_, r)| r.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_crypto::script_hash;
    use fund_scripts::BlueprintRepository;
    use fund_types::TxId;

    fn admin() -> Identity {
        Identity::from_raw([0xad; 28])
    }

    #[test]
    fn create_chains_derived_hashes() {
        let repo = BlueprintRepository::builtin();
        let d = Deployment::create(&repo, "fund-a", admin()).unwrap();

        assert_eq!(d.params.admin_token.policy, script_hash(&d.scripts.admin_token));
        assert_eq!(d.params.admin_token.name.as_text(), Some("fund-a"));
        match &d.build_args.transfer {
            ValidatorParams::Transfer { registry_hash, admin_token } => {
                assert_eq!(*registry_hash, script_hash(&d.scripts.registry));
                assert_eq!(admin_token, &d.params.admin_token);
            }
            other => panic!("unexpected transfer args {other:?}"),
        }
        assert_eq!(d.admin(), Some(admin()));
        assert!(!d.is_published());
    }

    #[test]
    fn distinct_funds_get_distinct_tokens() {
        let repo = BlueprintRepository::builtin();
        let a = Deployment::create(&repo, "fund-a", admin()).unwrap();
        let b = Deployment::create(&repo, "fund-b", admin()).unwrap();
        assert_ne!(a.params.admin_token, b.params.admin_token);
        assert_ne!(a.scripts.registry, b.scripts.registry);
    }

    #[test]
    fn rebuild_with_same_repository_is_stable() {
        let repo = BlueprintRepository::builtin();
        let mut d = Deployment::create(&repo, "fund-a", admin()).unwrap();
        d.script_refs.registry = Some(OutputRef::new(TxId::from_raw([4; 32]), 0));
        let rebuilt = d.rebuild(&repo).unwrap();
        assert_eq!(rebuilt, d);
    }

    #[test]
    fn rebuild_against_new_templates_drops_stale_refs() {
        let old = BlueprintRepository::builtin();
        let mut d = Deployment::create(&old, "fund-a", admin()).unwrap();
        d.script_refs.registry = Some(OutputRef::new(TxId::from_raw([4; 32]), 0));

        let json = r#"{ "validators": [
            { "title": "admin_token_policy.admin_token_policy.mint", "compiledCode": "aa" },
            { "title": "registry.registry.spend", "compiledCode": "bb" },
            { "title": "transfer.transfer.spend", "compiledCode": "cc" }
        ] }"#;
        let new = BlueprintRepository::from_json(json).unwrap();
        let rebuilt = d.rebuild(&new).unwrap();

        assert_ne!(rebuilt.params.admin_token, d.params.admin_token);
        assert_eq!(rebuilt.script_refs.registry, None);
        assert_eq!(rebuilt.created_at, d.created_at);
    }

    #[test]
    fn deployment_serde_roundtrip() {
        let repo = BlueprintRepository::builtin();
        let d = Deployment::create(&repo, "fund-a", admin())
            .unwrap()
            .with_description("test fund");
        let json = serde_json::to_string_pretty(&d).unwrap();
        assert!(json.contains("\"AdminToken\""));
        let back: Deployment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
