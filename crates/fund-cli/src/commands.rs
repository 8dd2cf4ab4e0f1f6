use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use fund_ledger::{InMemoryLedger, KeyWallet, LedgerClient, LedgerSnapshot, Wallet};
use fund_ops::{DeployTool, FundContext, OpsConfig, Submitted, TransferTarget};
use fund_scripts::BlueprintRepository;
use fund_store::{Account, AccountStore, JsonFileStore};
use fund_types::{Amount, AssetId, Identity, OutputRef, Value};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

/// Ledger, store and settings for one invocation.
pub struct Devnet {
    state_path: PathBuf,
    ledger: Arc<InMemoryLedger>,
    store: JsonFileStore,
    config: OpsConfig,
    format: OutputFormat,
}

impl Devnet {
    pub fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => OpsConfig::load(path)?,
            None => OpsConfig::default(),
        };
        let ledger = load_ledger(&cli.state)?;
        let store = JsonFileStore::open(&cli.store)
            .with_context(|| format!("opening store {}", cli.store.display()))?;
        debug!(state = %cli.state.display(), store = %cli.store.display(), "devnet opened");
        Ok(Self {
            state_path: cli.state.clone(),
            ledger: Arc::new(ledger),
            store,
            config,
            format: cli.format,
        })
    }

    /// Write the ledger state back; the store persists on every change.
    pub fn save(&self) -> anyhow::Result<()> {
        let snapshot = self.ledger.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        let tmp = self.state_path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.state_path)
            .with_context(|| format!("writing {}", self.state_path.display()))?;
        Ok(())
    }

    fn ledger(&self) -> Arc<dyn LedgerClient> {
        self.ledger.clone()
    }

    fn wallet(&self, alias: &str) -> anyhow::Result<Arc<KeyWallet>> {
        let account = self.store.require_account(alias)?;
        Ok(Arc::new(KeyWallet::new(account.signing_key()?)))
    }

    /// An account alias, or a raw identity in hex.
    fn identity(&self, text: &str) -> anyhow::Result<Identity> {
        if let Some(account) = self.store.get_account(text)? {
            return Ok(account.identity);
        }
        Identity::from_hex(text).with_context(|| format!("'{text}' is neither an account nor an identity"))
    }

    fn target(&self, text: &str) -> anyhow::Result<TransferTarget> {
        match text.split_once(':') {
            Some((who, amount)) if self.store.get_account(who)?.is_some() => {
                let amount: Amount = amount.parse()?;
                Ok(TransferTarget::new(self.identity(who)?, amount))
            }
            _ => Ok(text.parse()?),
        }
    }

    fn targets(&self, texts: &[String]) -> anyhow::Result<Vec<TransferTarget>> {
        texts.iter().map(|t| self.target(t)).collect()
    }

    async fn context(&self, fund_id: &str, wallet: Arc<dyn Wallet>) -> anyhow::Result<FundContext> {
        Ok(FundContext::load(self.ledger(), wallet, &self.store, fund_id, self.config.clone()).await?)
    }

    /// Read-only context; the throwaway wallet never signs.
    async fn reader(&self, fund_id: &str) -> anyhow::Result<FundContext> {
        self.context(fund_id, Arc::new(KeyWallet::generate())).await
    }

    fn deploy_tool(&self, wallet: Arc<dyn Wallet>) -> DeployTool {
        DeployTool::new(
            self.ledger(),
            wallet,
            Arc::new(BlueprintRepository::builtin()),
            self.config.clone(),
        )
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

fn load_ledger(path: &Path) -> anyhow::Result<InMemoryLedger> {
    if !path.exists() {
        return Ok(InMemoryLedger::new());
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot: LedgerSnapshot =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(InMemoryLedger::from_snapshot(snapshot))
}

fn parse_asset(text: &str) -> anyhow::Result<AssetId> {
    if text == "coin" {
        return Ok(AssetId::coin());
    }
    Ok(AssetId::parse(text)?)
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let devnet = Devnet::open(&cli)?;
    match cli.command {
        Command::Accounts(action) => cmd_accounts(&devnet, action)?,
        Command::Faucet(args) => cmd_faucet(&devnet, args)?,
        Command::Deploy(args) => cmd_deploy(&devnet, args).await?,
        Command::Rebuild(args) => cmd_rebuild(&devnet, args).await?,
        Command::Registry(action) => cmd_registry(&devnet, action).await?,
        Command::Transfer(action) => cmd_transfer(&devnet, action).await?,
        Command::View(action) => cmd_view(&devnet, action).await?,
    }
    devnet.save()
}

fn cmd_accounts(devnet: &Devnet, action: AccountsAction) -> anyhow::Result<()> {
    match action {
        AccountsAction::New { alias } => {
            let account = Account::generate(&alias);
            devnet.store.add_account(&account)?;
            println!("{} Account {} created", "✓".green().bold(), alias.bold());
            println!("  Identity: {}", account.identity.to_string().cyan());
        }
        AccountsAction::List => {
            let accounts = devnet.store.list_accounts()?;
            if devnet.json() {
                let rows: Vec<_> = accounts
                    .iter()
                    .map(|a| json!({ "alias": a.alias, "identity": a.identity.to_hex() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if accounts.is_empty() {
                println!("No accounts.");
            } else {
                for account in accounts {
                    println!("{:<16} {}", account.alias.bold(), account.identity.to_string().cyan());
                }
            }
        }
    }
    Ok(())
}

fn cmd_faucet(devnet: &Devnet, args: FaucetArgs) -> anyhow::Result<()> {
    let account = devnet.store.require_account(&args.alias)?;
    let mut value = Value::of(AssetId::coin(), Amount::from(args.coin));
    if let (Some(asset), Some(amount)) = (&args.asset, &args.amount) {
        let amount: Amount = amount.parse()?;
        value.add(&parse_asset(asset)?, &amount);
    }
    let out_ref = devnet.ledger.fund(account.address(), value)?;
    println!("{} Credited {} at {}", "✓".green().bold(), args.alias.bold(), out_ref.to_string().yellow());
    Ok(())
}

async fn cmd_deploy(devnet: &Devnet, args: DeployArgs) -> anyhow::Result<()> {
    let wallet = devnet.wallet(&args.fund.actor)?;
    let deployment = devnet
        .deploy_tool(wallet)
        .deploy(&devnet.store, &args.fund.fund_id, args.description, args.publish)
        .await?;
    println!("{} Fund {} deployed", "✓".green().bold(), deployment.fund_id.bold());
    println!("  Admin token: {}", deployment.params.admin_token.labeled().cyan());
    for (name, out_ref) in deployment.script_refs.iter() {
        if let Some(out_ref) = out_ref {
            println!("  {name} published at {}", out_ref.to_string().yellow());
        }
    }
    Ok(())
}

async fn cmd_rebuild(devnet: &Devnet, args: RebuildArgs) -> anyhow::Result<()> {
    let wallet = devnet.wallet(&args.fund.actor)?;
    let deployment = devnet
        .deploy_tool(wallet)
        .rebuild(&devnet.store, &args.fund.fund_id, args.publish)
        .await?;
    println!("{} Fund {} rebuilt", "✓".green().bold(), deployment.fund_id.bold());
    println!("  Admin token: {}", deployment.params.admin_token.labeled().cyan());
    Ok(())
}

fn report(what: &str, submitted: &Submitted) {
    println!(
        "{} {} in {} ({} attempt{})",
        "✓".green().bold(),
        what,
        submitted.tx_id.to_string().yellow(),
        submitted.attempts,
        if submitted.attempts == 1 { "" } else { "s" }
    );
}

async fn cmd_registry(devnet: &Devnet, action: RegistryAction) -> anyhow::Result<()> {
    match action {
        RegistryAction::Add { fund, identities } => {
            let ids = identities
                .iter()
                .map(|t| devnet.identity(t))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let ctx = devnet.context(&fund.fund_id, devnet.wallet(&fund.actor)?).await?;
            let submitted = ctx.registry().add(&ids).await?;
            report(&format!("Whitelisted {} identit{}", ids.len(), if ids.len() == 1 { "y" } else { "ies" }), &submitted);
        }
        RegistryAction::RemoveIdentity { fund, identity } => {
            let id = devnet.identity(&identity)?;
            let ctx = devnet.context(&fund.fund_id, devnet.wallet(&fund.actor)?).await?;
            let submitted = ctx.registry().remove_by_identity(id).await?;
            report(&format!("Removed {}", id.short_id()), &submitted);
        }
        RegistryAction::RemoveOutref { fund, refs } => {
            let refs = refs
                .iter()
                .map(|r| r.parse::<OutputRef>())
                .collect::<Result<Vec<_>, _>>()?;
            let ctx = devnet.context(&fund.fund_id, devnet.wallet(&fund.actor)?).await?;
            let submitted = ctx.registry().remove_by_output_refs(&refs).await?;
            report(&format!("Dissolved {} batch(es)", refs.len()), &submitted);
        }
        RegistryAction::Audit { fund_id } => {
            let ctx = devnet.reader(&fund_id).await?;
            let audit = ctx.registry().audit_registry().await?;
            println!(
                "{} {} batches, {} listed, {} tokens",
                "✓".green().bold(),
                audit.batches,
                audit.listed,
                audit.supply
            );
        }
    }
    Ok(())
}

async fn cmd_transfer(devnet: &Devnet, action: TransferAction) -> anyhow::Result<()> {
    match action {
        TransferAction::Deposit { fund, asset, targets } => {
            let asset = parse_asset(&asset)?;
            let targets = devnet.targets(&targets)?;
            let ctx = devnet.context(&fund.fund_id, devnet.wallet(&fund.actor)?).await?;
            let submitted = ctx.transfer().deposit(&asset, &targets).await?;
            report(&format!("Deposited into {} slot(s)", targets.len()), &submitted);
        }
        TransferAction::To { fund, asset, targets } => {
            let asset = parse_asset(&asset)?;
            let targets = devnet.targets(&targets)?;
            let ctx = devnet.context(&fund.fund_id, devnet.wallet(&fund.actor)?).await?;
            let submitted = ctx.transfer().transfer(&asset, &targets).await?;
            report("Transferred", &submitted);
        }
        TransferAction::Spend {
            fund,
            asset,
            inputs,
            targets,
        } => {
            let asset = parse_asset(&asset)?;
            let targets = devnet.targets(&targets)?;
            let refs = inputs
                .iter()
                .map(|r| r.parse::<OutputRef>())
                .collect::<Result<Vec<_>, _>>()?;
            let outputs = devnet.ledger.outputs_by_ref(&refs).await?;
            if let Some(missing) = refs.iter().find(|r| !outputs.iter().any(|o| o.out_ref == **r)) {
                bail!("input {missing} is not a live output");
            }
            let ctx = devnet.context(&fund.fund_id, devnet.wallet(&fund.actor)?).await?;
            let submitted = ctx.transfer().spend(&asset, &outputs, &targets).await?;
            report("Spent", &submitted);
        }
    }
    Ok(())
}

async fn cmd_view(devnet: &Devnet, action: ViewAction) -> anyhow::Result<()> {
    match action {
        ViewAction::Whitelist { fund_id } => {
            let whitelist = devnet.reader(&fund_id).await?.view().whitelist().await?;
            if devnet.json() {
                let rows: Vec<_> = whitelist
                    .iter()
                    .map(|(id, r)| json!({ "identity": id.to_hex(), "batch": r.to_string() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if whitelist.is_empty() {
                println!("Whitelist is empty.");
            } else {
                for (id, batch) in whitelist {
                    println!("{}  {}", id.to_string().cyan(), batch.to_string().dimmed());
                }
            }
        }
        ViewAction::Registry { fund_id } => {
            let batches = devnet.reader(&fund_id).await?.view().registry_batches().await?;
            if devnet.json() {
                let rows: Vec<_> = batches
                    .iter()
                    .map(|b| {
                        json!({
                            "out_ref": b.out_ref.to_string(),
                            "tokens": b.tokens.to_string(),
                            "identities": b.identities.iter().map(Identity::to_hex).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if batches.is_empty() {
                println!("No registry batches.");
            } else {
                for batch in batches {
                    println!("{} ({} tokens)", batch.out_ref.to_string().yellow().bold(), batch.tokens);
                    for id in &batch.identities {
                        println!("  {}", id.to_string().cyan());
                    }
                }
            }
        }
        ViewAction::Funds { fund_id } => {
            let funds = devnet.reader(&fund_id).await?.view().funds().await?;
            if devnet.json() {
                let rows: Vec<_> = funds
                    .iter()
                    .map(|(owner, f)| {
                        let totals: serde_json::Map<String, serde_json::Value> = f
                            .totals
                            .iter()
                            .map(|(asset, amount)| (asset.labeled(), json!(amount.to_string())))
                            .collect();
                        json!({
                            "owner": owner.to_hex(),
                            "totals": totals,
                            "slots": f.slots.iter().map(ToString::to_string).collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if funds.is_empty() {
                println!("No funds held.");
            } else {
                for (owner, holding) in funds {
                    println!("{} ({} slot(s))", owner.to_string().cyan().bold(), holding.slots.len());
                    for (asset, amount) in holding.totals.iter() {
                        println!("  {:>20}  {}", amount.to_string().green(), asset.labeled());
                    }
                }
            }
        }
    }
    Ok(())
}
