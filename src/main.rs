//! Shido CLI: inspect and reformat SGF records, or run a scripted demo of
//! the session arbiter.
//!
//! ## Usage
//!
//! - `shido demo` - Run a short arbitrated match and print the traffic
//! - `shido show <file.sgf>` - Print a record's metadata and final position
//! - `shido reformat <file.sgf>` - Parse and regenerate a record

use std::fs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use shido::message::{
    Arbiter, CreatePayload, GameMessage, MovePayload, PassPayload,
};
use shido::sgf;

/// Rules core of a real-time Go teaching platform
#[derive(Parser)]
#[command(name = "shido")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted match through the arbiter and print each broadcast
    Demo,
    /// Parse an SGF file and print its metadata and final main-line position
    Show { path: String },
    /// Parse an SGF file and print the regenerated record
    Reformat { path: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show { path }) => show(&path),
        Some(Commands::Reformat { path }) => reformat(&path),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn show(path: &str) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let game = sgf::parse(&text);

    let meta = &game.metadata;
    for (label, value) in [
        ("Black", &meta.black_player),
        ("White", &meta.white_player),
        ("Komi", &meta.komi),
        ("Handicap", &meta.handicap),
        ("Result", &meta.result),
        ("Date", &meta.date),
    ] {
        if let Some(v) = value {
            println!("{label}: {v}");
        }
    }

    let mut tree = game.tree;
    tree.fast_forward_to_end();
    let node = tree.current();
    println!("Board {0}x{0}, {1} nodes", tree.size, tree.len());
    println!("{}", node.board);
    Ok(())
}

fn reformat(path: &str) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    println!("{}", sgf::generate(&sgf::parse(&text)));
    Ok(())
}

/// Feed a short scripted game through the arbiter, printing every request
/// and broadcast as JSON.
fn run_demo() -> Result<()> {
    let mut arbiter = Arbiter::new();

    let mut requests = vec![GameMessage::Create(CreatePayload {
        session_id: "demo".to_string(),
        black_player: "teacher".to_string(),
        white_player: "student".to_string(),
        size: 9,
        handicap: 0,
        komi: 6.5,
    })];
    for (sender, x, y) in [
        ("teacher", 2, 1),
        ("student", 1, 1),
        ("teacher", 1, 2), // captures the corner stone
    ] {
        requests.push(GameMessage::Move(MovePayload {
            session_id: "demo".to_string(),
            sender: sender.to_string(),
            x,
            y,
        }));
    }
    for sender in ["student", "teacher"] {
        requests.push(GameMessage::Pass(PassPayload {
            session_id: "demo".to_string(),
            sender: sender.to_string(),
        }));
    }

    for request in requests {
        println!("-> {}", serde_json::to_string(&request)?);
        match arbiter.handle(request) {
            Some(reply) => println!("<- {}", serde_json::to_string(&reply)?),
            None => println!("<- (dropped)"),
        }
    }

    let session = arbiter.session("demo").expect("demo session exists");
    println!("\nFinal position:\n{}", session.board);
    println!("Captures: B {} / W {}", session.captures_black, session.captures_white);
    println!("SGF: {}", session.to_sgf());
    Ok(())
}
