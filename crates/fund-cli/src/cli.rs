use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fundctl",
    about = "Operate whitelisted funds on a local devnet",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Operational settings (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Devnet ledger state.
    #[arg(long, global = true, default_value = "fund-devnet.json")]
    pub state: PathBuf,

    /// Deployments and accounts.
    #[arg(long, global = true, default_value = "fund-store.json")]
    pub store: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage local signing keys
    #[command(subcommand)]
    Accounts(AccountsAction),
    /// Credit an account with freshly created value
    Faucet(FaucetArgs),
    /// Resolve validators for a new fund and record the deployment
    Deploy(DeployArgs),
    /// Recompute a deployment's scripts from its build arguments
    Rebuild(RebuildArgs),
    /// Change the whitelist
    #[command(subcommand)]
    Registry(RegistryAction),
    /// Move value between transfer slots
    #[command(subcommand)]
    Transfer(TransferAction),
    /// Inspect a fund
    #[command(subcommand)]
    View(ViewAction),
}

#[derive(Subcommand)]
pub enum AccountsAction {
    New { alias: String },
    List,
}

#[derive(Args)]
pub struct FaucetArgs {
    pub alias: String,
    /// Native coin to credit.
    #[arg(long, default_value = "100000000")]
    pub coin: u64,
    /// Extra asset, as a unit or `policy:name`.
    #[arg(long, requires = "amount")]
    pub asset: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
}

#[derive(Args)]
pub struct FundArgs {
    pub fund_id: String,
    /// Account acting for this command.
    #[arg(long = "as")]
    pub actor: String,
}

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub fund: FundArgs,
    /// Publish validators so transactions can reference them.
    #[arg(long)]
    pub publish: bool,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RebuildArgs {
    #[command(flatten)]
    pub fund: FundArgs,
    #[arg(long)]
    pub publish: bool,
}

#[derive(Subcommand)]
pub enum RegistryAction {
    /// Whitelist identities (hex or account alias) as one batch
    Add {
        #[command(flatten)]
        fund: FundArgs,
        #[arg(required = true)]
        identities: Vec<String>,
    },
    /// Remove an identity from the first batch listing it
    RemoveIdentity {
        #[command(flatten)]
        fund: FundArgs,
        identity: String,
    },
    /// Dissolve batches by output reference (`txid#index`)
    RemoveOutref {
        #[command(flatten)]
        fund: FundArgs,
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Check capability token accounting
    Audit { fund_id: String },
}

#[derive(Subcommand)]
pub enum TransferAction {
    /// Create slots for the targets, funded by the acting account
    Deposit {
        #[command(flatten)]
        fund: FundArgs,
        #[arg(long)]
        asset: String,
        /// `identity:amount`, identity as hex or account alias.
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Pay targets from the acting account's own slots
    To {
        #[command(flatten)]
        fund: FundArgs,
        #[arg(long)]
        asset: String,
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Pay targets from explicitly chosen outputs
    Spend {
        #[command(flatten)]
        fund: FundArgs,
        #[arg(long)]
        asset: String,
        #[arg(long = "input", required = true)]
        inputs: Vec<String>,
        #[arg(required = true)]
        targets: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ViewAction {
    Whitelist { fund_id: String },
    Registry { fund_id: String },
    Funds { fund_id: String },
}
