use anyhow::Context as _;
use clap::Parser;
use lr0gen::{
    config::{Config, Limits},
    syntax,
};
use std::{
    fs,
    io,
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The start symbol of the grammar.
    start: char,

    /// The path of grammar definition file. Read from stdin if omitted.
    input: Option<PathBuf>,

    /// The maximum number of productions, including the augmented one.
    #[arg(long, default_value_t = Limits::DEFAULT.max_productions())]
    max_productions: usize,

    /// The maximum number of symbols in a production body.
    #[arg(long, default_value_t = Limits::DEFAULT.max_body_len())]
    max_body_len: usize,

    /// The maximum number of items in a state.
    #[arg(long, default_value_t = Limits::DEFAULT.max_items_per_state())]
    max_items_per_state: usize,

    /// The maximum number of states.
    #[arg(long, default_value_t = Limits::DEFAULT.max_states())]
    max_states: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let source = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| anyhow::anyhow!("failed to read {}", path.display()))?,
        None => syntax::read_source(io::stdin().lock())
            .context("failed to read the grammar from stdin")?,
    };

    let limits = Limits::default()
        .with_max_productions(args.max_productions)
        .with_max_body_len(args.max_body_len)
        .with_max_items_per_state(args.max_items_per_state)
        .with_max_states(args.max_states);

    let loaded = syntax::load(&source, args.start, &limits).context("failed to load the grammar")?;
    for malformed in &loaded.malformed {
        println!("[warning] skipped production at {}", malformed);
    }

    let grammar = loaded.grammar;
    let automaton = Config::new()
        .with_limits(limits)
        .generate(&grammar)
        .context("failed to build the LR(0) automaton")?;

    println!("{}", grammar);
    print!("{}", automaton.display(&grammar));

    Ok(())
}
