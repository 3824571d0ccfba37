//! Lichess puzzle CSV rows
//!
//! `PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags`
//!
//! Fields are comma-separated; a field may be double-quoted, with `""` for a
//! literal quote. Columns past the ones the tagger reads are carried through
//! untouched.

use crate::error::TaggerError;
use crate::puzzle::tag::TagSequence;
use crate::puzzle::{CpTag, PuzzleLine};
use crate::similarity::CorpusEntry;

pub const ID_COLUMN: usize = 0;
pub const FEN_COLUMN: usize = 1;
pub const MOVES_COLUMN: usize = 2;
pub const THEMES_COLUMN: usize = 7;

/// Header name of the themes column once it holds tag sequences
pub const HIERARCHY_COLUMN: &str = "hierarchy_tags";

/// Rows need at least every column up to the themes
pub const MIN_COLUMNS: usize = THEMES_COLUMN + 1;

/// One CSV row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleRecord {
    fields: Vec<String>,
}

impl PuzzleRecord {
    pub fn parse(line: &str) -> Result<Self, TaggerError> {
        let fields = split_csv_line(line);
        if fields.len() < MIN_COLUMNS {
            return Err(TaggerError::MalformedRow {
                expected: MIN_COLUMNS,
                found: fields.len(),
            });
        }
        Ok(Self { fields })
    }

    pub fn id(&self) -> &str {
        &self.fields[ID_COLUMN]
    }

    pub fn fen(&self) -> &str {
        &self.fields[FEN_COLUMN]
    }

    pub fn moves(&self) -> &str {
        &self.fields[MOVES_COLUMN]
    }

    pub fn themes(&self) -> &str {
        &self.fields[THEMES_COLUMN]
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Evaluation tier read from the themes column
    pub fn cp_tag(&self) -> CpTag {
        CpTag::from_themes(self.themes())
    }

    /// Replay the row's moves from its FEN
    pub fn to_puzzle_line(&self) -> Result<PuzzleLine, TaggerError> {
        PuzzleLine::from_uci(self.id(), self.fen(), self.moves(), self.cp_tag())
    }

    /// Same row with the themes column replaced
    pub fn with_themes(&self, themes: impl Into<String>) -> Self {
        let mut fields = self.fields.clone();
        fields[THEMES_COLUMN] = themes.into();
        Self { fields }
    }

    /// Read the themes column of a retagged row as a tag sequence
    pub fn to_corpus_entry(&self) -> Result<CorpusEntry, TaggerError> {
        let tags: TagSequence = self.themes().parse()?;
        Ok(CorpusEntry::new(self.id(), tags))
    }

    pub fn to_line(&self) -> String {
        join_csv_fields(&self.fields)
    }
}

/// Header with the themes column renamed, other columns untouched
pub fn rename_themes_header(header: &str) -> String {
    let mut fields = split_csv_line(header);
    if let Some(themes) = fields.get_mut(THEMES_COLUMN) {
        *themes = HIERARCHY_COLUMN.to_string();
    }
    join_csv_fields(&fields)
}

/// Split one CSV line, honoring double quotes
pub fn split_csv_line(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Join fields into one CSV line, quoting the ones that need it
pub fn join_csv_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| {
            let field = field.as_ref();
            if field.contains([',', '"', '\n']) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                field.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "00sHx,q3k1nr/1pp1nQpp/3p4/1P2p3/4P3/B1PP1b2/B5PP/5K2 b k - 0 17,e8d7 a2e6 d7d8 f7f8,1760,80,83,72,mate mateIn2 middlegame short,https://lichess.org/yyznGmXs/black#34,Italian_Game Italian_Game_Classical_Variation";

    #[test]
    fn test_parse_row() {
        let record = PuzzleRecord::parse(ROW).unwrap();
        assert_eq!(record.id(), "00sHx");
        assert_eq!(record.moves(), "e8d7 a2e6 d7d8 f7f8");
        assert_eq!(record.cp_tag(), CpTag::Mate);
        assert_eq!(record.fields().len(), 10);
        assert_eq!(record.to_line(), ROW);
    }

    #[test]
    fn test_short_row_is_malformed() {
        let err = PuzzleRecord::parse("abc,fen,e2e4").unwrap_err();
        assert_eq!(err, TaggerError::MalformedRow { expected: 8, found: 3 });
    }

    #[test]
    fn test_quoted_fields() {
        let fields = split_csv_line("a,\"b,c\",\"say \"\"hi\"\"\",d\r\n");
        assert_eq!(fields, vec!["a", "b,c", "say \"hi\"", "d"]);
        assert_eq!(join_csv_fields(&fields), "a,\"b,c\",\"say \"\"hi\"\"\",d");
    }

    #[test]
    fn test_empty_trailing_field() {
        assert_eq!(split_csv_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_with_themes_and_header() {
        let record = PuzzleRecord::parse(ROW).unwrap().with_themes("fork:n/mate short");
        assert_eq!(record.themes(), "fork:n/mate short");
        assert_eq!(record.id(), "00sHx");

        let header = "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags";
        assert_eq!(
            rename_themes_header(header),
            "PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,hierarchy_tags,GameUrl,OpeningTags"
        );
    }

    #[test]
    fn test_corpus_entry() {
        let entry = PuzzleRecord::parse(ROW)
            .unwrap()
            .with_themes("fork:n/mate short")
            .to_corpus_entry()
            .unwrap();
        assert_eq!(entry.id, "00sHx");
        assert_eq!(entry.tags.moves.len(), 1);
        assert_eq!(entry.tags.puzzle.len(), 2);
    }
}
