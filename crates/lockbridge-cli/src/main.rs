//! Lockbridge CLI - Command-line tool for deposit attestation and readiness
//!
//! This tool provides commands for:
//! - Hashing deposit leaves and building batch trees
//! - Generating and verifying inclusion witnesses
//! - Deriving code verifiers and challenges
//! - Classifying and live-tracking deposit readiness
//! - Simulating a full lock, attest and mint round offline

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lockbridge_attest::{
    BatchAttestation, BatchWindow, CommittedRoot, DepositMerkleTree, MerkleWitness,
    RootByteOrder, SerializableWitness, MAX_DEPTH,
};
use lockbridge_client::{
    BridgeClient, CachedDeposit, ClientConfig, DepositCache, FeedPoller, HttpProofService,
};
use lockbridge_mint::{InMemoryLedger, MintGuard, MintRequest};
use lockbridge_pkarm::{
    derive_challenge, derive_verifier, signing_key_from_hex, verifier_from_key, CodeVerifier,
    LockContract, LockParams, RecipientIdentity,
};
use lockbridge_primitives::{
    felt_from_hex, felt_to_hex, Address, DepositRecord, B256, MIN_LOCK_UNIT, U256,
};
use lockbridge_readiness::{
    classify, spawn_tracker, BridgeHeadState, EthFinalityState, FeedHub, FinalityParams,
    PipelineStage, ReadinessStatus,
};

/// Committed-root byte order for CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ByteOrder {
    /// Little-endian field representation
    Canonical,
    /// Reversed bytes, as served by older deployments
    LegacyReversed,
}

impl From<ByteOrder> for RootByteOrder {
    fn from(value: ByteOrder) -> Self {
        match value {
            ByteOrder::Canonical => RootByteOrder::Canonical,
            ByteOrder::LegacyReversed => RootByteOrder::LegacyReversed,
        }
    }
}

/// Lockbridge - lock-and-mint bridge coordination
#[derive(Parser)]
#[command(name = "lockbridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Attest, bind and track lockbridge deposits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a deposit record and print its leaf hash
    Leaf {
        /// Source-chain depositor address
        #[arg(short, long)]
        address: Address,

        /// Attestation hash (code challenge) carried by the deposit
        #[arg(short, long)]
        challenge: B256,

        /// Total locked value
        #[arg(short, long)]
        value: U256,
    },

    /// Build the batch tree for a deposits file and print its root
    Tree {
        /// JSON array of deposit records
        #[arg(short, long)]
        deposits: PathBuf,

        /// Byte order for the printed committed root
        #[arg(long, value_enum, default_value = "canonical")]
        order: ByteOrder,
    },

    /// Generate an inclusion witness for one deposit
    Witness {
        /// JSON array of deposit records
        #[arg(short, long)]
        deposits: PathBuf,

        /// Leaf index of the deposit
        #[arg(short, long)]
        index: usize,

        /// Pad the path with dummy levels to the circuit depth
        #[arg(long)]
        pad: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a witness file
    #[command(name = "verify-witness")]
    VerifyWitness {
        /// Witness JSON produced by `witness`
        #[arg(short, long)]
        witness: PathBuf,

        /// Committed root to cross-check against (hex)
        #[arg(long)]
        committed_root: Option<String>,

        /// Byte order of `--committed-root`
        #[arg(long, value_enum, default_value = "canonical")]
        order: ByteOrder,
    },

    /// Derive the code verifier from a wallet key or signature
    #[command(name = "derive-verifier")]
    DeriveVerifier {
        /// Hex private key used to sign the verifier message
        #[arg(long, conflicts_with = "signature", required_unless_present = "signature")]
        private_key: Option<String>,

        /// Hex 65-byte signature over the verifier message
        #[arg(long)]
        signature: Option<String>,
    },

    /// Derive the code challenge for a verifier and recipient
    #[command(name = "derive-challenge")]
    DeriveChallenge {
        /// Code verifier (hex field element)
        #[arg(long)]
        verifier: String,

        /// Destination-chain recipient (32 bytes hex)
        #[arg(long)]
        recipient: String,
    },

    /// Classify a deposit against a finality frontier and job window
    Classify {
        #[arg(long)]
        deposit_block: u64,

        /// Latest finalized source-chain block
        #[arg(long)]
        finalized: u64,

        /// First block of the current job window
        #[arg(long)]
        input: u64,

        /// Last block of the current job window
        #[arg(long)]
        output: u64,
    },

    /// Track a deposit against the live bridge feeds
    Track {
        #[arg(long)]
        deposit_block: u64,

        /// Bridge API base URL
        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,

        /// Bearer token for the bridge API
        #[arg(long, env = "LOCKBRIDGE_API_KEY")]
        api_key: Option<String>,

        /// Feed poll interval in milliseconds
        #[arg(long, default_value = "12000")]
        poll_interval_ms: u64,

        /// Give up after this many seconds
        #[arg(long, default_value = "3600")]
        timeout_secs: u64,

        /// Persist the deposit and its attestation here, resuming any cached entry
        #[arg(long, requires_all = ["address", "challenge", "recipient"])]
        cache_dir: Option<PathBuf>,

        /// Source-chain depositor address
        #[arg(long)]
        address: Option<Address>,

        /// Code challenge the deposit was locked under
        #[arg(long)]
        challenge: Option<B256>,

        /// Destination-chain recipient (32 bytes hex)
        #[arg(long)]
        recipient: Option<String>,
    },

    /// Simulate lock, attestation and mint for a batch of depositors
    Simulate {
        /// Number of depositors in the batch
        #[arg(short = 'n', long, default_value = "8")]
        deposits: usize,

        /// Depositor to track and mint for
        #[arg(short, long, default_value = "0")]
        index: usize,

        /// Delay between pipeline stages in milliseconds
        #[arg(long, default_value = "20")]
        stage_delay_ms: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Leaf {
            address,
            challenge,
            value,
        } => leaf(address, challenge, value),

        Commands::Tree { deposits, order } => tree(&deposits, order.into()),

        Commands::Witness {
            deposits,
            index,
            pad,
            output,
        } => witness(&deposits, index, pad, output),

        Commands::VerifyWitness {
            witness,
            committed_root,
            order,
        } => verify_witness(&witness, committed_root, order.into()),

        Commands::DeriveVerifier {
            private_key,
            signature,
        } => derive_verifier_cmd(private_key, signature),

        Commands::DeriveChallenge {
            verifier,
            recipient,
        } => derive_challenge_cmd(&verifier, &recipient),

        Commands::Classify {
            deposit_block,
            finalized,
            input,
            output,
        } => classify_cmd(deposit_block, finalized, input, output),

        Commands::Track {
            deposit_block,
            base_url,
            api_key,
            poll_interval_ms,
            timeout_secs,
            cache_dir,
            address,
            challenge,
            recipient,
        } => {
            let mut config = ClientConfig::default().with_base_url(base_url);
            config.api_key = api_key;
            config.poll_interval_ms = poll_interval_ms;
            let resume = match (cache_dir, address, challenge, recipient) {
                (Some(dir), Some(address), Some(challenge), Some(recipient)) => {
                    let recipient = RecipientIdentity::from_hex(&recipient)?;
                    let cache = DepositCache::open(&dir).with_context(|| {
                        format!("Failed to open deposit cache: {}", dir.display())
                    })?;
                    let entry = cache.resume(CachedDeposit::new(
                        deposit_block,
                        address,
                        recipient,
                        challenge,
                    ))?;
                    Some(Resume { cache, entry })
                }
                _ => None,
            };
            track(deposit_block, config, Duration::from_secs(timeout_secs), resume).await
        }

        Commands::Simulate {
            deposits,
            index,
            stage_delay_ms,
        } => simulate(deposits, index, Duration::from_millis(stage_delay_ms)).await,
    }
}

// ============================================================================
// Attestation
// ============================================================================

fn read_deposits(path: &Path) -> Result<Vec<DepositRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read deposits file: {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| "Failed to parse deposits JSON")
}

fn leaf(address: Address, challenge: B256, value: U256) -> Result<()> {
    let record = DepositRecord::new(address, challenge, value);
    let packed = record.pack();

    let output = serde_json::json!({
        "record": record,
        "packed": {
            "a": format!("0x{}", hex::encode(packed.a)),
            "b": format!("0x{}", hex::encode(packed.b)),
            "c": format!("0x{}", hex::encode(packed.c)),
        },
        "leafHash": felt_to_hex(&record.leaf_hash()),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn tree(deposits: &Path, order: RootByteOrder) -> Result<()> {
    let records = read_deposits(deposits)?;
    let start = Instant::now();
    let tree = DepositMerkleTree::from_records(records).context("Failed to build batch tree")?;
    let elapsed = start.elapsed();

    let output = serde_json::json!({
        "root": felt_to_hex(&tree.root()),
        "committedRoot": CommittedRoot::new(tree.root()).to_hex(order),
        "depth": tree.depth(),
        "numLeaves": tree.num_leaves(),
        "paddedSize": tree.padded_size(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    info!(?elapsed, "tree built");
    Ok(())
}

fn witness(deposits: &Path, index: usize, pad: bool, output: Option<PathBuf>) -> Result<()> {
    let records = read_deposits(deposits)?;
    let tree = DepositMerkleTree::from_records(records).context("Failed to build batch tree")?;
    let mut witness = tree
        .witness(index)
        .with_context(|| format!("Failed to build witness for leaf {}", index))?;
    if pad {
        witness = witness.pad_to(MAX_DEPTH);
    }

    let json = SerializableWitness::new(witness).to_json()?;
    match output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!("Witness written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn verify_witness(path: &Path, committed_root: Option<String>, order: RootByteOrder) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read witness file: {}", path.display()))?;
    let witness = SerializableWitness::from_json(&contents)?.witness;

    let root = witness.verify().context("Witness verification failed")?;
    println!("Witness valid");
    println!("  Leaf index: {}", witness.leaf_index);
    println!("  Real depth: {}", witness.real_depth());
    println!("  Root: {}", felt_to_hex(&root));

    if let Some(hex_root) = committed_root {
        let committed = CommittedRoot::from_hex(&hex_root, order)?;
        committed
            .check(root)
            .context("Witness root does not match the committed root")?;
        println!("  Committed root: match");
    }
    Ok(())
}

// ============================================================================
// Identity binding
// ============================================================================

fn derive_verifier_cmd(private_key: Option<String>, signature: Option<String>) -> Result<()> {
    let verifier = match (private_key, signature) {
        (Some(key), _) => {
            let signing_key = signing_key_from_hex(&key)?;
            verifier_from_key(&signing_key)?
        }
        (None, Some(sig)) => {
            let bytes = hex::decode(sig.trim_start_matches("0x"))
                .context("Signature is not valid hex")?;
            derive_verifier(&bytes)?
        }
        (None, None) => anyhow::bail!("Either --private-key or --signature is required"),
    };

    warn!("the code verifier is a secret; do not share it before minting");
    println!("{}", verifier.to_hex());
    Ok(())
}

fn derive_challenge_cmd(verifier: &str, recipient: &str) -> Result<()> {
    let verifier = CodeVerifier::from_felt(felt_from_hex(verifier).context("Invalid verifier")?);
    let recipient = RecipientIdentity::from_hex(recipient)?;
    println!("{}", derive_challenge(&verifier, &recipient).to_b256());
    Ok(())
}

// ============================================================================
// Readiness
// ============================================================================

fn classify_cmd(deposit_block: u64, finalized: u64, input: u64, output: u64) -> Result<()> {
    let finality = EthFinalityState {
        latest_finality_block_number: finalized,
        latest_finality_slot: 0,
    };
    let bridge = BridgeHeadState {
        input_block_number: input,
        output_block_number: output,
        stage_name: PipelineStage::BridgeHeadJobCreated,
        elapsed_seconds: 0,
    };
    println!("{}", classify(deposit_block, &finality, &bridge));
    Ok(())
}

fn print_status(status: &ReadinessStatus) {
    let wait = status
        .estimated_wait_seconds
        .map(|s| format!("~{}s", s))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "[v{}] {} attestation={} mint={} paused={} wait={}",
        status.snapshot_version,
        status.readiness,
        status.attestation_unlocked,
        status.mint_unlocked,
        status.paused,
        wait
    );
}

/// Print every status change until the deposit is terminal or the tracker stops
async fn follow(mut updates: tokio::sync::watch::Receiver<ReadinessStatus>) {
    loop {
        let status = updates.borrow_and_update().clone();
        print_status(&status);
        if status.readiness.is_terminal() || updates.changed().await.is_err() {
            break;
        }
    }
}

/// Cached state of the tracked deposit
struct Resume {
    cache: DepositCache,
    entry: CachedDeposit,
}

async fn track(
    deposit_block: u64,
    config: ClientConfig,
    timeout: Duration,
    mut resume: Option<Resume>,
) -> Result<()> {
    let client = Arc::new(BridgeClient::try_new(&config).context("Failed to build client")?);
    let proofs = HttpProofService::new(Arc::clone(&client), config.root_byte_order);
    let hub = FeedHub::new();

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let poller = tokio::spawn(FeedPoller::new(client, hub.clone(), config).run(stop_rx));

    let mut handle = spawn_tracker(&hub, deposit_block, FinalityParams::mainnet())?;
    let printer = tokio::spawn(follow(handle.subscribe_status()));

    let outcome = tokio::time::timeout(timeout, async {
        handle.wait_for_attestation().await?;
        if let Some(Resume { cache, entry }) = resume.as_mut() {
            let attested = cache.attest(&proofs, entry).await?;
            println!(
                "Attestation for leaf {} in batch [{}, {}] cached in {}",
                attested.witness.leaf_index,
                attested.window.input_block_number,
                attested.window.output_block_number,
                cache.dir().display()
            );
        }
        anyhow::Ok(handle.wait_for_mint().await?)
    })
    .await;

    let status = handle.status();
    handle.shutdown().await;
    let _ = stop_tx.send(true);
    poller.await.context("Feed poller task failed")?;
    printer.await.context("Status printer failed")?;

    match outcome {
        Err(_) => anyhow::bail!("Timed out after {:?} in state {}", timeout, status.readiness),
        Ok(Err(e)) => Err(e.context(format!(
            "Deposit at block {} did not become mintable",
            deposit_block
        ))),
        Ok(Ok(_)) => {
            println!("Deposit at block {} is ready to mint", deposit_block);
            Ok(())
        }
    }
}

// ============================================================================
// Simulation
// ============================================================================

struct Depositor {
    address: Address,
    verifier: CodeVerifier,
    recipient: RecipientIdentity,
    challenge: B256,
}

fn simulated_depositor(i: usize) -> Result<Depositor> {
    let seed = (i % 250) as u8 + 1;
    let signing_key = signing_key_from_hex(&hex::encode([seed; 32]))?;
    let verifier = verifier_from_key(&signing_key)?;
    let recipient = RecipientIdentity::new([seed.wrapping_add(0x40); 32]);
    Ok(Depositor {
        address: Address::with_last_byte(seed),
        verifier,
        recipient,
        challenge: derive_challenge(&verifier, &recipient).to_b256(),
    })
}

async fn simulate(num_deposits: usize, index: usize, stage_delay: Duration) -> Result<()> {
    if num_deposits == 0 || num_deposits > 250 {
        anyhow::bail!("--deposits must be between 1 and 250");
    }
    if index >= num_deposits {
        anyhow::bail!("--index {} out of range for {} deposits", index, num_deposits);
    }

    println!();
    println!("========================================");
    println!("  Lockbridge Simulation");
    println!("========================================");
    println!();

    // Lock
    let window = BatchWindow::new(120, 180);
    let mut contract = LockContract::new(LockParams::default());
    let depositors = (0..num_deposits)
        .map(simulated_depositor)
        .collect::<Result<Vec<_>>>()?;
    for (i, d) in depositors.iter().enumerate() {
        let value = U256::from(MIN_LOCK_UNIT) * U256::from(i as u64 + 1);
        contract.lock(d.address, d.challenge, value, i as u64)?;
    }
    println!("Locked {} deposits, balance {}", num_deposits, contract.balance());

    // Commit the batch
    let records = contract.records();
    let root = DepositMerkleTree::from_records(records.clone())?.root();
    let batch = BatchAttestation::new(window, records, CommittedRoot::new(root));
    println!("Committed root: {}", felt_to_hex(&root));

    // Track
    let depositor = &depositors[index];
    let deposit_block = window.input_block_number + (index as u64 % 61);
    let hub = FeedHub::new();
    let finality = EthFinalityState {
        latest_finality_block_number: 200,
        latest_finality_slot: 6400,
    };
    let head = move |stage: PipelineStage| BridgeHeadState {
        input_block_number: window.input_block_number,
        output_block_number: window.output_block_number,
        stage_name: stage,
        elapsed_seconds: 0,
    };
    hub.publish_joint(finality, head(PipelineStage::BridgeHeadJobCreated));

    let mut handle = spawn_tracker(&hub, deposit_block, FinalityParams::mainnet())?;
    println!("Tracking deposit at block {}", deposit_block);

    let publisher = {
        let hub = hub.clone();
        tokio::spawn(async move {
            for &stage in &PipelineStage::ORDER[1..] {
                tokio::time::sleep(stage_delay).await;
                hub.publish_bridge_head(head(stage));
            }
        })
    };

    // Attest
    let status = handle.wait_for_attestation().await?;
    print_status(&status);
    let start = Instant::now();
    let (address, challenge) = (depositor.address, depositor.challenge);
    let witness: MerkleWitness =
        tokio::task::spawn_blocking(move || batch.attest(address, challenge)).await??;
    println!(
        "Witness for leaf {} built in {:?}",
        witness.leaf_index,
        start.elapsed()
    );

    // Mint
    let status = handle.wait_for_mint().await?;
    print_status(&status);
    publisher.await.context("Stage publisher failed")?;
    handle.shutdown().await;

    let guard = MintGuard::new(Arc::new(InMemoryLedger::new()));
    guard.setup_storage(&depositor.recipient)?;
    guard.commit_root(window, CommittedRoot::new(root))?;
    let request = MintRequest {
        recipient: depositor.recipient,
        code_verifier: depositor.verifier,
        witness,
        window,
    };
    let receipt = guard.mint_when_ready(&status, &request)?;

    println!();
    println!("========================================");
    println!("  Simulation Complete!");
    println!("========================================");
    println!("  Recipient: {}", receipt.recipient);
    println!("  Minted: {}", receipt.amount_minted);
    println!("  Minted so far: {}", receipt.minted_so_far);

    match guard.mint(&request) {
        Err(e) => println!("  Replay rejected: {}", e),
        Ok(_) => anyhow::bail!("Replayed mint was admitted"),
    }
    println!();
    Ok(())
}
