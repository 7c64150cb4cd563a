// mint-admin/src/main.rs
use clap::{Parser, Subcommand, ValueEnum};
use collection_crypto::{Address, Hash};
use mint_admin::DeploymentConfig;
use mint_engine::{
    whitelist::parse_whitelist_json, Amount, MintRequest, MintService, MintTier, WhitelistClaim,
    WhitelistTree, WhitelistTreeDump,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mint-admin")]
#[command(about = "Collection minting administration", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default deployment file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./deployment.toml")]
        output: String,

        /// Initial owner address
        #[arg(long)]
        owner: Option<Address>,
    },

    /// Whitelist tree operations
    Whitelist {
        #[command(subcommand)]
        command: WhitelistCommands,
    },

    /// Dry-run a mint against a deployment file
    Quote {
        /// Deployment file path
        #[arg(short, long, default_value = "./deployment.toml")]
        config: String,

        #[arg(short, long, value_enum, default_value = "public")]
        tier: TierArg,

        /// Paying address
        #[arg(short, long)]
        payer: Address,

        /// Number of tokens
        #[arg(short, long, default_value = "1")]
        amount: u64,

        /// Attached payment in ether
        #[arg(short, long, default_value = "0")]
        value: String,

        /// Whitelist tree dump; the proof for the payer is taken from it
        #[arg(long)]
        tree: Option<String>,

        /// Treat the collection as unpaused
        #[arg(long)]
        unpaused: bool,
    },
}

#[derive(Subcommand)]
enum WhitelistCommands {
    /// Build a tree from a JSON list of [address, allocation] pairs
    Build {
        /// Input list
        #[arg(short, long)]
        input: String,

        /// Tree dump output path
        #[arg(short, long)]
        output: String,
    },

    /// Print the proof for an address
    Proof {
        /// Tree dump path
        #[arg(short, long)]
        tree: String,

        #[arg(short, long)]
        address: Address,
    },

    /// Check a proof against a root
    Verify {
        #[arg(short, long)]
        root: Hash,

        #[arg(short, long)]
        address: Address,

        #[arg(long)]
        allocation: u64,

        /// Proof hashes, comma separated
        #[arg(short, long, value_delimiter = ',')]
        proof: Vec<Hash>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Owner,
    Founder,
    Whitelist,
    Public,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mint_admin={0},mint_engine={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init { output, owner } => {
            init_deployment(&output, owner)?;
        }
        Commands::Whitelist { command } => {
            handle_whitelist_command(command)?;
        }
        Commands::Quote {
            config,
            tier,
            payer,
            amount,
            value,
            tree,
            unpaused,
        } => {
            quote(&config, tier, payer, amount, &value, tree.as_deref(), unpaused).await?;
        }
    }

    Ok(())
}

fn init_deployment(output: &str, owner: Option<Address>) -> anyhow::Result<()> {
    let mut config = DeploymentConfig::default();
    if let Some(owner) = owner {
        config.owner = owner;
    }
    config.collection.validate()?;
    config.to_file(output)?;

    tracing::info!("Deployment file written to {}", output);
    tracing::info!("Edit {} to set the owner, prices and metadata URIs", output);
    Ok(())
}

fn load_tree(path: &str) -> anyhow::Result<WhitelistTree> {
    let contents = std::fs::read_to_string(path)?;
    let dump: WhitelistTreeDump = serde_json::from_str(&contents)?;
    Ok(WhitelistTree::load(dump)?)
}

fn handle_whitelist_command(command: WhitelistCommands) -> anyhow::Result<()> {
    match command {
        WhitelistCommands::Build { input, output } => {
            let entries = parse_whitelist_json(&std::fs::read_to_string(&input)?)?;
            tracing::info!("Building whitelist tree over {} entries", entries.len());

            let tree = WhitelistTree::build(entries)?;
            std::fs::write(&output, serde_json::to_string_pretty(&tree.dump())?)?;

            tracing::info!("Tree written to {}", output);
            println!("{}", tree.root());
        }
        WhitelistCommands::Proof { tree, address } => {
            let tree = load_tree(&tree)?;
            let (entry, proof) = tree
                .proof_for(&address)
                .ok_or_else(|| anyhow::anyhow!("{} is not in the whitelist", address))?;

            let out = serde_json::json!({
                "root": tree.root(),
                "address": entry.address,
                "allocation": entry.allocation.to_string(),
                "proof": proof,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        WhitelistCommands::Verify {
            root,
            address,
            allocation,
            proof,
        } => {
            let whitelist = mint_engine::Whitelist::new(Some(root));
            let valid = whitelist.verify(&proof, &address, allocation);
            if !valid {
                tracing::warn!("Proof does not match root {}", root);
            }
            println!("{}", valid);
        }
    }

    Ok(())
}

async fn quote(
    config_path: &str,
    tier: TierArg,
    payer: Address,
    amount: u64,
    value: &str,
    tree_path: Option<&str>,
    unpaused: bool,
) -> anyhow::Result<()> {
    tracing::info!("Loading deployment from {}", config_path);
    let mut config = DeploymentConfig::from_file(config_path)?;
    if unpaused {
        config.collection.start_paused = false;
    }

    let tier = match tier {
        TierArg::Owner => MintTier::Owner,
        TierArg::Founder => MintTier::Founder,
        TierArg::Public => MintTier::Public,
        TierArg::Whitelist => match tree_path {
            Some(path) => {
                let tree = load_tree(path)?;
                let (entry, proof) = tree
                    .proof_for(&payer)
                    .ok_or_else(|| anyhow::anyhow!("{} is not in the whitelist", payer))?;
                if config.collection.whitelist_root.is_none() {
                    config.collection.whitelist_root = Some(tree.root());
                }
                MintTier::Whitelist(WhitelistClaim::Proof {
                    proof,
                    allocation: entry.allocation,
                })
            }
            None => MintTier::Whitelist(WhitelistClaim::Listed),
        },
    };

    let service = MintService::new(config.build_engine()?);
    let request = MintRequest::new(tier, payer, amount, Amount::from_ether_str(value)?);

    match service.quote(&request).await {
        Ok(quote) => {
            let out = serde_json::json!({
                "admitted": true,
                "tier": quote.tier,
                "price": quote.price,
                "remaining_supply": quote.remaining_supply,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Err(e) => {
            let out = serde_json::json!({
                "admitted": false,
                "reason": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
