use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use puzzle_tagger::record::PuzzleRecord;
use puzzle_tagger::similarity::{rank_by_distance, search_similar_puzzle, similarity_score, CorpusEntry};
use puzzle_tagger::TagSequence;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CliError;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArg {
    /// Retagged CSV holding tag sequences in the themes column
    #[arg(long)]
    corpus: PathBuf,
    /// Query tag sequence, e.g. "fork:n/sacrifice:q/crushing short"
    #[arg(long)]
    tags: String,
    /// Number of nearest puzzles to list
    #[arg(long, default_value_t = 5)]
    top: usize,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct MatchReport {
    id: String,
    tags: String,
    score: f64,
}

impl MatchReport {
    fn new(entry: &CorpusEntry, score: f64) -> Self {
        Self {
            id: entry.id.clone(),
            tags: entry.tags.to_string(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SearchReport {
    query: String,
    corpus_size: usize,
    /// Lowest similarity score
    best: Option<MatchReport>,
    /// Nearest by sequence distance
    nearest: Vec<MatchReport>,
}

pub(crate) fn run(arg: &SearchArg) -> anyhow::Result<()> {
    let query: TagSequence = arg
        .tags
        .parse()
        .with_context(|| format!("parsing query {:?}", arg.tags))?;

    let file = File::open(&arg.corpus).with_context(|| format!("opening {}", arg.corpus.display()))?;
    let corpus = load_corpus(BufReader::new(file))?;
    info!(entries = corpus.len(), corpus = %arg.corpus.display(), "Corpus loaded");

    let report = search(&query, &corpus, arg.top);
    if arg.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Parse every data row of a retagged CSV; unreadable rows are skipped
fn load_corpus<R: BufRead>(reader: R) -> anyhow::Result<Vec<CorpusEntry>> {
    let mut lines = reader.lines();
    lines.next().ok_or(CliError::MissingHeader)??;

    let mut corpus = Vec::new();
    for (index, line) in lines.enumerate() {
        let row = index + 1;
        let line = line.with_context(|| format!("reading row {row}"))?;
        match PuzzleRecord::parse(&line).and_then(|record| record.to_corpus_entry()) {
            Ok(entry) => corpus.push(entry),
            Err(e) => warn!(row, error = %e, "Skipping corpus row"),
        }
    }
    Ok(corpus)
}

fn search(query: &TagSequence, corpus: &[CorpusEntry], top: usize) -> SearchReport {
    let best = search_similar_puzzle(query, corpus).map(|entry| MatchReport::new(entry, similarity_score(query, &entry.tags)));
    let nearest = rank_by_distance(query, corpus, top)
        .into_iter()
        .map(|(entry, distance)| MatchReport::new(entry, distance))
        .collect();
    SearchReport {
        query: query.to_string(),
        corpus_size: corpus.len(),
        best,
        nearest,
    }
}

fn print_report(report: &SearchReport) {
    println!("query: {}", report.query);
    match &report.best {
        Some(best) => println!("best match: {} (score {:.3}) {}", best.id, best.score, best.tags),
        None => println!("best match: none, the corpus is empty"),
    }
    for (rank, m) in report.nearest.iter().enumerate() {
        println!("{:>3}. {} (distance {:.3}) {}", rank + 1, m.id, m.score, m.tags);
    }
}
