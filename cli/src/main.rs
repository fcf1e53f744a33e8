use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rsm_consensus::{Message, Replica, ReplicaConfigBuilder};
use rsm_core::Transaction;
use rsm_network::Transport;
use rsm_symbolic::parse;

#[derive(Parser)]
#[command(name = "rsm")]
#[command(about = "Replicated state machine demo CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short-lived four-replica PBFT demo and submit one transaction.
    Demo {
        /// Sender address on the demo transaction.
        #[arg(long, default_value = "client")]
        sender: String,
        /// Recipient address on the demo transaction.
        #[arg(long, default_value = "test")]
        recipient: String,
        /// Transfer amount on the demo transaction.
        #[arg(long, default_value_t = 10)]
        amount: i64,
        /// How long to let the replicas run before reporting results.
        #[arg(long, default_value_t = 2000)]
        settle_ms: u64,
    },
    /// Parse, simplify, differentiate, and (optionally) integrate an
    /// algebraic expression.
    Symbolic {
        /// The expression, e.g. "sin(x)^2 + cos(x)^2".
        expression: String,
        /// Variable to differentiate/integrate with respect to.
        #[arg(long, default_value = "x")]
        var: String,
        /// Also attempt symbolic integration.
        #[arg(long)]
        integrate: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            sender,
            recipient,
            amount,
            settle_ms,
        } => run_demo(sender, recipient, amount, settle_ms),
        Commands::Symbolic {
            expression,
            var,
            integrate,
        } => run_symbolic(&expression, &var, integrate),
    }
}

fn run_demo(sender: String, recipient: String, amount: i64, settle_ms: u64) {
    let ids: Vec<String> = (0..4).map(|i| format!("node-{i}")).collect();
    let (transport, mut mailboxes) = Transport::<Message>::new(ids.clone());
    let config = ReplicaConfigBuilder::new()
        .timeout(Duration::from_millis(500))
        .finish();

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let mailbox = mailboxes.remove(id).expect("mailbox for id");
            let replica = Replica::new(id.clone(), ids.clone(), transport.clone(), mailbox, config.clone())
                .expect("demo replica set is non-empty");
            thread::spawn(move || replica.run_for(Duration::from_millis(settle_ms)))
        })
        .collect();

    let mut sorted_ids = ids.clone();
    sorted_ids.sort();
    let primary = &sorted_ids[0];
    println!("submitting REQUEST to primary {primary}");
    transport.send(primary, Message::Request {
        transaction: Transaction::new(sender, recipient, amount),
    });

    for handle in handles {
        let replica = handle.join().expect("replica thread panicked");
        println!(
            "{:<8} view={} chain_len={} last_hash={}",
            replica.id(),
            replica.view(),
            replica.ledger().len(),
            replica.ledger().last().hash
        );
    }
}

fn run_symbolic(expression: &str, var: &str, integrate: bool) {
    let expr = match parse(expression) {
        Ok(expr) => expr,
        Err(error) => {
            eprintln!("parse error: {error}");
            std::process::exit(1);
        }
    };
    println!("parsed:       {expr}");
    println!("simplified:   {}", expr.simplify());

    match expr.differentiate(var) {
        Ok(derivative) => println!("d/d{var}:        {derivative}"),
        Err(error) => println!("d/d{var}: error ({error})"),
    }

    if integrate {
        match expr.integrate(var) {
            Ok(antiderivative) => println!("∫ d{var}:        {antiderivative}"),
            Err(error) => println!("∫ d{var}: error ({error})"),
        }
    }
}
