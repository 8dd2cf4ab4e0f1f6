use std::fmt;
use std::str::FromStr;

use fund_crypto::script_hash;
use fund_ledger::{LedgerClient, ScriptWitness};
use fund_types::{Address, Output, OutputRef, Script, ScriptHash};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScriptError, ScriptResult};
use crate::names::{ScriptsBag, ValidatorName};

/// How transactions obtain validator code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingMode {
    /// Embed the validator bytes in every transaction.
    #[default]
    Inline,
    /// Reference a previously published copy.
    Published,
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingMode::Inline => f.write_str("inline"),
            BindingMode::Published => f.write_str("published"),
        }
    }
}

impl FromStr for BindingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(BindingMode::Inline),
            "published" => Ok(BindingMode::Published),
            other => Err(format!("unknown binding mode '{other}'")),
        }
    }
}

/// A validator ready to be attached to a transaction.
///
/// Both shapes expose the same address and credential hash for the same
/// underlying bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptHandle {
    Inline {
        script: Script,
        hash: ScriptHash,
    },
    Published {
        out_ref: OutputRef,
        /// The live output holding the copy.
        output: Output,
        script: Script,
        hash: ScriptHash,
    },
}

impl ScriptHandle {
    pub fn inline(script: Script) -> Self {
        let hash = script_hash(&script);
        ScriptHandle::Inline { script, hash }
    }

    pub fn hash(&self) -> ScriptHash {
        match self {
            ScriptHandle::Inline { hash, .. } | ScriptHandle::Published { hash, .. } => *hash,
        }
    }

    pub fn address(&self) -> Address {
        Address::Script(self.hash())
    }

    pub fn script(&self) -> &Script {
        match self {
            ScriptHandle::Inline { script, .. } | ScriptHandle::Published { script, .. } => script,
        }
    }

    pub fn out_ref(&self) -> Option<OutputRef> {
        match self {
            ScriptHandle::Inline { .. } => None,
            ScriptHandle::Published { out_ref, .. } => Some(*out_ref),
        }
    }

    /// What a transaction needs to carry to satisfy this validator.
    pub fn witness(&self) -> ScriptWitness {
        match self {
            ScriptHandle::Inline { script, .. } => ScriptWitness::Inline(script.clone()),
            ScriptHandle::Published { output, .. } => ScriptWitness::Reference(output.clone()),
        }
    }
}

/// Turns stored validators into [`ScriptHandle`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptBinder {
    mode: BindingMode,
}

impl ScriptBinder {
    pub fn new(mode: BindingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    /// Bind all three validators.
    ///
    /// Inline binding is local. Published binding issues a single ledger
    /// query for every recorded reference and checks each live output still
    /// carries the expected script.
    pub async fn bind_all<L: LedgerClient + ?Sized>(
        &self,
        ledger: &L,
        scripts: &ScriptsBag<Script>,
        refs: &ScriptsBag<Option<OutputRef>>,
    ) -> ScriptResult<ScriptsBag<ScriptHandle>> {
        match self.mode {
            BindingMode::Inline => Ok(scripts.clone().map(|_, script| ScriptHandle::inline(script))),
            BindingMode::Published => {
                let wanted = refs.clone().try_map(|name, r| r.ok_or(ScriptError::NotPublished(name)))?;
                let all: Vec<OutputRef> = wanted.iter().map(|(_, r)| *r).collect();
                let live = ledger.outputs_by_ref(&all).await?;
                wanted.try_map(|name, out_ref| {
                    let output = live.iter().find(|o| o.out_ref == out_ref).cloned();
                    published_handle(name, out_ref, output, scripts.get(name))
                })
            }
        }
    }

    /// Bind one validator.
    pub async fn bind<L: LedgerClient + ?Sized>(
        &self,
        ledger: &L,
        name: ValidatorName,
        script: &Script,
        out_ref: Option<OutputRef>,
    ) -> ScriptResult<ScriptHandle> {
        match self.mode {
            BindingMode::Inline => Ok(ScriptHandle::inline(script.clone())),
            BindingMode::Published => {
                let out_ref = out_ref.ok_or(ScriptError::NotPublished(name))?;
                let output = ledger.outputs_by_ref(&[out_ref]).await?.into_iter().next();
                published_handle(name, out_ref, output, script)
            }
        }
    }
}

fn published_handle(
    name: ValidatorName,
    out_ref: OutputRef,
    output: Option<Output>,
    expected: &Script,
) -> ScriptResult<ScriptHandle> {
    let missing = |reason: &str| ScriptError::PublishedScriptMissing {
        name,
        out_ref,
        reason: reason.to_string(),
    };
    let output = output.ok_or_else(|| missing("output is no longer live"))?;
    let script = output
        .script_ref
        .clone()
        .ok_or_else(|| missing("output carries no script"))?;
    if script != *expected {
        return Err(missing("output carries a different script"));
    }
    let hash = script_hash(&script);
    debug!(%name, %out_ref, %hash, "published script bound");
    Ok(ScriptHandle::Published {
        out_ref,
        output,
        script,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_ledger::InMemoryLedger;
    use fund_types::{Amount, AssetId, Datum, ScriptLanguage, TxId, Value};

    fn script(tag: u8) -> Script {
        Script::new(ScriptLanguage::PlutusV3, vec![tag; 4])
    }

    fn bag() -> ScriptsBag<Script> {
        ScriptsBag {
            admin_token: script(1),
            registry: script(2),
            transfer: script(3),
        }
    }

    /// Publish every script of the bag into a fresh ledger (via a snapshot,
    /// since genesis outputs carry no script reference).
    fn ledger_with_published(scripts: &ScriptsBag<Script>) -> (InMemoryLedger, ScriptsBag<Option<OutputRef>>) {
        let mut snapshot = fund_ledger::LedgerSnapshot::default();
        let refs = scripts.clone().map(|name, script| {
            let out_ref = OutputRef::new(TxId::from_raw([name as u8 + 1; 32]), 0);
            snapshot.outputs.push(Output {
                out_ref,
                address: Address::unspendable(),
                value: Value::of(AssetId::coin(), Amount::from(2u64)),
                datum: Some(Datum::Void),
                script_ref: Some(script),
            });
            Some(out_ref)
        });
        (InMemoryLedger::from_snapshot(snapshot), refs)
    }

    #[tokio::test]
    async fn inline_and_published_agree_on_credentials() {
        let scripts = bag();
        let (ledger, refs) = ledger_with_published(&scripts);

        let inline = ScriptBinder::new(BindingMode::Inline)
            .bind_all(&ledger, &scripts, &refs)
            .await
            .unwrap();
        let published = ScriptBinder::new(BindingMode::Published)
            .bind_all(&ledger, &scripts, &refs)
            .await
            .unwrap();

        for name in ValidatorName::ALL {
            assert_eq!(inline.get(name).hash(), published.get(name).hash());
            assert_eq!(inline.get(name).address(), published.get(name).address());
            assert!(published.get(name).out_ref().is_some());
        }
        assert!(matches!(inline.registry.witness(), ScriptWitness::Inline(_)));
        assert!(matches!(published.registry.witness(), ScriptWitness::Reference(_)));
    }

    #[tokio::test]
    async fn consumed_copy_is_reported_missing() {
        let scripts = bag();
        let (ledger, refs) = ledger_with_published(&scripts);
        let registry_ref = refs.registry.unwrap();
        ledger.consume_external(&registry_ref).unwrap();

        let err = ScriptBinder::new(BindingMode::Published)
            .bind(&ledger, ValidatorName::Registry, &scripts.registry, refs.registry)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::PublishedScriptMissing { name: ValidatorName::Registry, out_ref, .. }
                if out_ref == registry_ref
        ));
    }

    #[tokio::test]
    async fn replaced_script_is_reported_missing() {
        let scripts = bag();
        let (ledger, refs) = ledger_with_published(&scripts);
        let err = ScriptBinder::new(BindingMode::Published)
            .bind(&ledger, ValidatorName::Transfer, &script(9), refs.transfer)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("different script"));
    }

    #[tokio::test]
    async fn unpublished_deployment_cannot_bind_published() {
        let ledger = InMemoryLedger::new();
        let err = ScriptBinder::new(BindingMode::Published)
            .bind_all(&ledger, &bag(), &ScriptsBag::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::NotPublished(ValidatorName::AdminToken)));
    }

    #[test]
    fn binding_mode_parses() {
        assert_eq!("published".parse::<BindingMode>().unwrap(), BindingMode::Published);
        assert_eq!(BindingMode::default(), BindingMode::Inline);
    }
}
