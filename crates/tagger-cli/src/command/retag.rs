use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use puzzle_tagger::puzzle::{cook::cook, legacy};
use puzzle_tagger::record::{rename_themes_header, PuzzleRecord};
use puzzle_tagger::TaggerError;
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{info, warn};

use crate::config::{RetagConfig, RetagOverrides, Ruleset};
use crate::error::CliError;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RetagArg {
    /// Lichess puzzle CSV to read
    #[arg(long)]
    input: PathBuf,
    /// Output file path
    #[arg(long)]
    output: PathBuf,
    /// Rule set for the tag column (env TAGGER_RULESET)
    #[arg(long, value_enum)]
    ruleset: Option<Ruleset>,
    /// Stop after this many rows (env TAGGER_LIMIT)
    #[arg(long)]
    limit: Option<usize>,
    /// Worker threads (env TAGGER_THREADS, default one per CPU)
    #[arg(long)]
    threads: Option<usize>,
    /// Rows per parallel batch (env TAGGER_CHUNK_SIZE)
    #[arg(long)]
    chunk_size: Option<usize>,
}

impl RetagArg {
    fn overrides(&self) -> RetagOverrides {
        RetagOverrides {
            threads: self.threads,
            chunk_size: self.chunk_size,
            ruleset: self.ruleset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RetagStats {
    processed: usize,
    skipped: usize,
}

pub(crate) fn run(arg: &RetagArg) -> anyhow::Result<()> {
    let config = RetagConfig::load(&arg.overrides())?;
    info!(
        threads = config.threads,
        chunk_size = config.chunk_size,
        ruleset = ?config.ruleset,
        limit = ?config.limit,
        "Retag config loaded"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(CliError::from)?;

    let input = File::open(&arg.input).with_context(|| format!("opening {}", arg.input.display()))?;
    let output = File::create(&arg.output).with_context(|| format!("creating {}", arg.output.display()))?;

    let start = Instant::now();
    let stats = retag(&pool, &config, BufReader::new(input), BufWriter::new(output))?;

    info!(
        processed = stats.processed,
        skipped = stats.skipped,
        elapsed_ms = start.elapsed().as_millis() as u64,
        output = %arg.output.display(),
        "Retag complete"
    );
    Ok(())
}

/// Copy the header, then retag rows chunk by chunk, keeping input order
fn retag<R: BufRead, W: Write>(
    pool: &ThreadPool,
    config: &RetagConfig,
    reader: R,
    mut writer: W,
) -> anyhow::Result<RetagStats> {
    let mut lines = reader.lines();
    let header = lines.next().ok_or(CliError::MissingHeader)??;
    let header = match config.ruleset {
        Ruleset::Hierarchical => rename_themes_header(&header),
        Ruleset::Legacy => header,
    };
    writeln!(writer, "{header}")?;

    let mut stats = RetagStats::default();
    let mut chunk: Vec<(usize, String)> = Vec::with_capacity(config.chunk_size);
    let limit = config.limit.unwrap_or(usize::MAX);

    // rows are numbered from 1, the header excluded
    for (index, line) in lines.enumerate().take(limit) {
        let row = index + 1;
        let line = line.with_context(|| format!("reading row {row}"))?;
        chunk.push((row, line));
        if chunk.len() == config.chunk_size {
            process_chunk(pool, &chunk, config.ruleset, &mut writer, &mut stats)?;
            chunk.clear();
        }
    }
    process_chunk(pool, &chunk, config.ruleset, &mut writer, &mut stats)?;
    writer.flush()?;

    Ok(stats)
}

fn process_chunk<W: Write>(
    pool: &ThreadPool,
    chunk: &[(usize, String)],
    ruleset: Ruleset,
    writer: &mut W,
    stats: &mut RetagStats,
) -> io::Result<()> {
    let results: Vec<Result<String, TaggerError>> =
        pool.install(|| chunk.par_iter().map(|(_, line)| retag_line(line, ruleset)).collect());

    for ((row, _), result) in chunk.iter().zip(results) {
        match result {
            Ok(line) => {
                writeln!(writer, "{line}")?;
                stats.processed += 1;
            }
            Err(e) => {
                warn!(row, error = %e, "Skipping row");
                stats.skipped += 1;
            }
        }
    }
    Ok(())
}

/// One input row with its themes column replaced by computed tags
fn retag_line(line: &str, ruleset: Ruleset) -> Result<String, TaggerError> {
    let record = PuzzleRecord::parse(line)?;
    let puzzle = record.to_puzzle_line()?;
    let tags = match ruleset {
        Ruleset::Hierarchical => cook(&puzzle).to_string(),
        Ruleset::Legacy => legacy::render_flat(&legacy::cook_flat(&puzzle)),
    };
    Ok(record.with_themes(tags).to_line())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags";
    const FORK_ROW: &str = "fork1,r1bq1rk1/ppp1bppp/2n2n2/4p1B1/4N1P1/3P1N1P/PPP2P2/R2QKB1R w KQ - 1 9,d1d2 f6e4 d3e4 c6d4 e1c1 d4f3 d2d8 e7g5 d8g5 f3g5,1500,75,90,1000,crushing fork long,https://lichess.org/abc,";
    const MATE_ROW: &str = "mate1,6k1/p4ppp/8/8/8/8/5PPP/3R2K1 b - - 0 1,a7a6 d1d8,900,80,95,500,mate mateIn1 backRankMate,https://lichess.org/def,";
    const BAD_MOVE_ROW: &str = "bad1,6k1/p4ppp/8/8/8/8/5PPP/3R2K1 b - - 0 1,a7a6 d1d9,900,80,95,500,mate,https://lichess.org/ghi,";

    fn config(ruleset: Ruleset, chunk_size: usize, limit: Option<usize>) -> RetagConfig {
        RetagConfig {
            threads: 2,
            chunk_size,
            ruleset,
            limit,
        }
    }

    fn run_retag(config: &RetagConfig, input: &str) -> (RetagStats, Vec<String>) {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build().unwrap();
        let mut out = Vec::new();
        let stats = retag(&pool, config, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        (stats, text.lines().map(str::to_string).collect())
    }

    #[test]
    fn test_retag_hierarchical() {
        let input = format!("{HEADER}\n{FORK_ROW}\n{MATE_ROW}\n");
        let (stats, lines) = run_retag(&config(Ruleset::Hierarchical, 512, None), &input);
        assert_eq!(stats, RetagStats { processed: 2, skipped: 0 });
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(",hierarchy_tags,"));
        assert!(lines[1].starts_with("fork1,"));
        assert!(lines[2].starts_with("mate1,"));

        let mate = PuzzleRecord::parse(&lines[2]).unwrap();
        assert_eq!(mate.themes(), "/backRankMate mate mateIn1 oneMove rookEndgame");
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let input = format!("{HEADER}\n{BAD_MOVE_ROW}\nnot,enough,columns\n{MATE_ROW}\n");
        // chunk of one keeps every row in its own batch
        let (stats, lines) = run_retag(&config(Ruleset::Legacy, 1, None), &input);
        assert_eq!(stats, RetagStats { processed: 1, skipped: 2 });
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines.len(), 2);
        let mate = PuzzleRecord::parse(&lines[1]).unwrap();
        assert!(mate.themes().starts_with("mateIn1 mate:r backRankMate"));
    }

    #[test]
    fn test_limit_and_order() {
        let input = format!("{HEADER}\n{MATE_ROW}\n{FORK_ROW}\n{MATE_ROW}\n");
        let (stats, lines) = run_retag(&config(Ruleset::Hierarchical, 2, Some(2)), &input);
        assert_eq!(stats.processed, 2);
        assert!(lines[1].starts_with("mate1,"));
        assert!(lines[2].starts_with("fork1,"));
    }

    #[test]
    fn test_missing_header() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let err = retag(&pool, &config(Ruleset::Legacy, 4, None), "".as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("header"));
    }
}
