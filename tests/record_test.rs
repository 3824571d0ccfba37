//! Integration tests: Lichess CSV rows through the tagger and back.

use puzzle_tagger::puzzle::cook::cook;
use puzzle_tagger::puzzle::legacy::{cook_flat, render_flat};
use puzzle_tagger::record::{rename_themes_header, split_csv_line, PuzzleRecord, HIERARCHY_COLUMN, THEMES_COLUMN};
use puzzle_tagger::{CpTag, TaggerError};

const HEADER: &str = "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags";

const ROWS: &[&str] = &[
    "E9t7J,2r3k1/p3Q1p1/4p2p/3p4/5P2/7n/P5PP/1R3RqK w - - 7 32,f1g1 h3f2,1538,76,94,2155,endgame mate mateIn1 oneMove smotheredMate,https://lichess.org/abcdefgh#63,",
    "2FoRk,8/8/6k1/1q3P2/4N1pp/8/5RK1/8 b - - 0 60,g6f7 e4d6 f7f6 d6b5,1212,75,96,800,crushing endgame fork short,https://lichess.org/ijklmnop/black#120,",
    "no77n,8/3k1p2/5p1p/1p3P2/2n1B1PP/2R2P2/1r2K3/8 w - - 2 50,e2d3 b2d2,1300,80,90,300,endgame hookMate mate mateIn1 oneMove,https://lichess.org/qrstuvwx#99,\"Sicilian_Defense Sicilian_Defense_Other\"",
];

#[test]
fn test_rows_retag_in_place() {
    for row in ROWS {
        let record = PuzzleRecord::parse(row).unwrap();
        let line = record.to_puzzle_line().unwrap();
        let tags = cook(&line);

        let retagged = record.with_themes(tags.to_string());
        let reread = PuzzleRecord::parse(&retagged.to_line()).unwrap();
        assert_eq!(reread.id(), record.id());
        assert_eq!(reread.fen(), record.fen());
        assert_eq!(reread.fields().len(), record.fields().len());
        assert_eq!(reread.themes(), tags.to_string());

        // columns after the themes are carried through
        assert_eq!(reread.fields()[THEMES_COLUMN + 1..], record.fields()[THEMES_COLUMN + 1..]);

        let entry = reread.to_corpus_entry().unwrap();
        assert_eq!(entry.tags, tags);
    }
}

#[test]
fn test_cp_tag_from_themes() {
    let tiers: Vec<CpTag> = ROWS.iter().map(|row| PuzzleRecord::parse(row).unwrap().cp_tag()).collect();
    assert_eq!(tiers, vec![CpTag::Mate, CpTag::Crushing, CpTag::Mate]);
}

#[test]
fn test_legacy_rows() {
    let record = PuzzleRecord::parse(ROWS[0]).unwrap();
    let tags = cook_flat(&record.to_puzzle_line().unwrap());
    let retagged = record.with_themes(render_flat(&tags));
    assert!(retagged.themes().starts_with("mateIn1 mate:n smotheredMate"));
    assert!(retagged.themes().ends_with("oneMove"));
}

#[test]
fn test_header_rename() {
    let renamed = rename_themes_header(HEADER);
    assert_eq!(split_csv_line(&renamed)[THEMES_COLUMN], HIERARCHY_COLUMN);
    assert!(renamed.starts_with("PuzzleId,FEN,Moves,"));
}

#[test]
fn test_bad_rows() {
    assert_eq!(
        PuzzleRecord::parse("only,three,columns").unwrap_err(),
        TaggerError::MalformedRow { expected: 8, found: 3 }
    );

    let bad_fen = "x1,not a fen,e2e4 e7e5,1500,80,90,100,crushing,url,";
    let err = PuzzleRecord::parse(bad_fen).unwrap().to_puzzle_line().unwrap_err();
    assert!(matches!(err, TaggerError::InvalidFen(_)));

    let no_moves = "x2,4k3/8/8/8/8/8/8/4K3 w - - 0 1,,1500,80,90,100,crushing,url,";
    let err = PuzzleRecord::parse(no_moves).unwrap().to_puzzle_line().unwrap_err();
    assert_eq!(err, TaggerError::EmptyMainline);
}
