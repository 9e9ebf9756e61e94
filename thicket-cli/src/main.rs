//! Thicket CLI
//!
//! Reads a JSON array of tokens, builds the document tree and prints it.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use thicket_dom::{DomTree, dump_tree};
use thicket_html::{ParseIssue, PassThrough, Token, TokenKind, TreeBuilder};

/// Thicket: build a document tree from a tag-soup token stream
#[derive(Parser, Debug)]
#[command(name = "thicket")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree for a token file
    thicket tokens.json

    # Read tokens from stdin and list every recovery made
    thicket --issues - < tokens.json

    # Keep attribute values exactly as tokenized
    thicket --no-decode tokens.json
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// JSON token file, or `-` for stdin
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Store attribute values without decoding entity references
    #[arg(long)]
    no_decode: bool,

    /// Print the recoveries made while building the tree
    #[arg(short, long)]
    issues: bool,

    /// Print how many tokens of each kind the input holds
    #[arg(short, long)]
    stats: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let tokens = load_tokens(&cli)?;
    log::debug!("loaded {} tokens", tokens.len());

    let builder = TreeBuilder::new(&tokens);
    let (tree, issues) = if cli.no_decode {
        builder.with_decoder(PassThrough).run_with_issues()
    } else {
        builder.run_with_issues()
    };

    print_tree(&tree, !cli.no_color);
    if cli.stats {
        print_stats(&tokens, &tree, !cli.no_color);
    }
    if cli.issues {
        print_issues(&issues, !cli.no_color);
    }
    Ok(())
}

/// Read and deserialize the token array named on the command line.
fn load_tokens(cli: &Cli) -> Result<Vec<Token>> {
    let json = if cli.path.as_os_str() == "-" {
        let mut buf = String::new();
        let _ = io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read tokens from stdin")?;
        buf
    } else {
        fs::read_to_string(&cli.path)
            .with_context(|| format!("failed to read {}", cli.path.display()))?
    };
    serde_json::from_str(&json).context("input is not a JSON array of tokens")
}

fn print_tree(tree: &DomTree, color: bool) {
    for line in dump_tree(tree).lines() {
        let body = line.trim_start();
        let indent = &line[..line.len() - body.len()];
        if color && body.starts_with("<!") {
            println!("{indent}{}", body.dimmed());
        } else if color && body.starts_with('<') {
            println!("{indent}{}", body.cyan());
        } else if color {
            println!("{indent}{}", body.green());
        } else {
            println!("{line}");
        }
    }
}

fn print_stats(tokens: &[Token], tree: &DomTree, color: bool) {
    println!();
    let heading = "=== Tokens ===";
    if color {
        println!("{}", heading.bold());
    } else {
        println!("{heading}");
    }
    for kind in TokenKind::iter() {
        let count = tokens.iter().filter(|t| t.kind == kind).count();
        println!("{:>20}: {count}", kind.to_string());
    }
    println!("{:>20}: {}", "nodes", tree.len());
}

fn print_issues(issues: &[ParseIssue], color: bool) {
    println!();
    let heading = format!("=== Issues ({}) ===", issues.len());
    if color {
        println!("{}", heading.bold());
    } else {
        println!("{heading}");
    }
    for issue in issues {
        let kind = issue.kind.to_string();
        if color {
            println!("[{:>4}] {}: {}", issue.token_index, kind.yellow(), issue.message);
        } else {
            println!("[{:>4}] {kind}: {}", issue.token_index, issue.message);
        }
    }
}
