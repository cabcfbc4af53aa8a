//! Exchange record shared with the external engine
//!
//! The engine reads and rewrites a plain text file:
//!
//! ```text
//! Human Move:
//! 0 0 2R
//! 1B 0 0
//! ```
//!
//! The first line is a label, then one line per board row with one
//! whitespace-separated token per cell (see [`Cell::token`]). The engine
//! reports its move only by changing one token, so [`extract_move`] diffs the
//! rewritten text against the board that was sent.

use crate::board::{Board, Cell, Color, Move};
use crate::error::{RelayError, Result};

/// Header label the engine expects
pub const DEFAULT_LABEL: &str = "Human Move";

/// Encode a board as an exchange record
pub fn encode(board: &Board, label: &str) -> String {
    let mut out = format!("{}:\n", label);
    for row in board.rows() {
        let tokens: Vec<String> = row.iter().map(Cell::token).collect();
        out.push_str(&tokens.join(" "));
        out.push('\n');
    }
    out
}

/// Parse a single exchange token into a cell
///
/// Accepts `0` or a positive decimal count followed by exactly one color
/// letter.
pub fn parse_token(token: &str) -> Result<Cell> {
    let token = token.trim();
    if token == "0" {
        return Ok(Cell::empty());
    }

    let split = token
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| RelayError::Decode(format!("token {:?} has no owner", token)))?;
    let (digits, owner) = token.split_at(split);

    if digits.is_empty() {
        return Err(RelayError::Decode(format!(
            "token {:?} has no count",
            token
        )));
    }
    let count: u32 = digits
        .parse()
        .map_err(|e| RelayError::Decode(format!("token {:?}: bad count: {}", token, e)))?;

    let mut chars = owner.chars();
    let color = match (chars.next(), chars.next()) {
        (Some(id), None) => Color::new(id)
            .map_err(|_| RelayError::Decode(format!("token {:?} has invalid owner", token)))?,
        _ => {
            return Err(RelayError::Decode(format!(
                "token {:?} has invalid owner",
                token
            )));
        }
    };

    Cell::new(count, Some(color))
        .map_err(|e| RelayError::Decode(format!("token {:?}: {}", token, e)))
}

/// Locate the single cell that differs between `prior` and `text`
///
/// Returns the first difference in row-major order, or `None` when every
/// available token matches. The header line is skipped unconditionally and
/// blank row lines are treated as carrying no change. A row line with fewer
/// tokens than columns differs at the first missing column.
pub fn extract_move(prior: &Board, text: &str) -> Result<Option<Move>> {
    let mut lines = text.lines();
    if lines.next().is_none() {
        return Err(RelayError::Decode("exchange record is empty".into()));
    }
    let lines: Vec<&str> = lines.collect();

    // Extra non-blank rows mean the engine wrote a differently sized board.
    if let Some((idx, _)) = lines
        .iter()
        .enumerate()
        .skip(prior.num_rows())
        .find(|(_, line)| !line.trim().is_empty())
    {
        return Err(RelayError::Decode(format!(
            "exchange record has row {} but board has {} rows",
            idx,
            prior.num_rows()
        )));
    }

    for (i, row) in prior.rows().enumerate() {
        let line = match lines.get(i) {
            Some(line) if !line.trim().is_empty() => line,
            _ => continue,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() > row.len() {
            return Err(RelayError::Decode(format!(
                "row {} has {} tokens, board has {} columns",
                i,
                tokens.len(),
                row.len()
            )));
        }

        for (j, cell) in row.iter().enumerate() {
            let Some(actual) = tokens.get(j).map(|t| t.trim()) else {
                return Ok(Some(Move::new(i, j)));
            };
            if actual != cell.token() {
                parse_token(actual)?;
                return Ok(Some(Move::new(i, j)));
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(count: u32, color: Color) -> Cell {
        Cell::new(count, Some(color)).unwrap()
    }

    fn sample_board() -> Board {
        Board::new(vec![
            vec![Cell::empty(), owned(1, Color::HUMAN), Cell::empty()],
            vec![owned(2, Color::ENGINE), Cell::empty(), owned(3, Color::HUMAN)],
            vec![Cell::empty(), Cell::empty(), Cell::empty()],
        ])
        .unwrap()
    }

    /// Replace token (row, col) in an encoded record
    pub(super) fn mutate(text: &str, row: usize, col: usize, token: &str) -> String {
        text.lines()
            .enumerate()
            .map(|(i, line)| {
                if i == row + 1 {
                    let mut tokens: Vec<&str> = line.split_whitespace().collect();
                    tokens[col] = token;
                    tokens.join(" ")
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_encode_example() {
        let text = encode(&Board::empty(2, 2), DEFAULT_LABEL);
        assert_eq!(text, "Human Move:\n0 0\n0 0\n");
    }

    #[test]
    fn test_trailing_separators_are_tolerated() {
        // Older engines end every token with a space, including the last
        let board = Board::empty(2, 2);
        assert_eq!(extract_move(&board, "Human Move:\n0 0 \n0 0 \n").unwrap(), None);
        assert_eq!(
            extract_move(&board, "Human Move:\n0 0 \n3R 0 \n").unwrap(),
            Some(Move::new(1, 0))
        );
    }

    #[test]
    fn test_encode_owned_cells() {
        let text = encode(&sample_board(), "Label");
        assert_eq!(text, "Label:\n0 1R 0\n2B 0 3R\n0 0 0\n");
    }

    #[test]
    fn test_unchanged_record_has_no_move() {
        let board = sample_board();
        let text = encode(&board, DEFAULT_LABEL);
        assert_eq!(extract_move(&board, &text).unwrap(), None);

        let empty = Board::empty(9, 6);
        let text = encode(&empty, DEFAULT_LABEL);
        assert_eq!(extract_move(&empty, &text).unwrap(), None);
    }

    #[test]
    fn test_example_move() {
        let board = Board::empty(2, 2);
        let text = encode(&board, DEFAULT_LABEL);
        let mutated = mutate(&text, 1, 0, "3R");
        assert_eq!(
            extract_move(&board, &mutated).unwrap(),
            Some(Move::new(1, 0))
        );
    }

    #[test]
    fn test_single_diff_located_everywhere() {
        let board = sample_board();
        let text = encode(&board, DEFAULT_LABEL);
        for row in 0..board.num_rows() {
            for col in 0..board.num_cols() {
                let replacement = if board.cell(row, col).unwrap().token() == "9B" {
                    "8B"
                } else {
                    "9B"
                };
                let mutated = mutate(&text, row, col, replacement);
                assert_eq!(
                    extract_move(&board, &mutated).unwrap(),
                    Some(Move::new(row, col)),
                    "mutation at ({}, {})",
                    row,
                    col
                );
            }
        }
    }

    #[test]
    fn test_first_difference_wins() {
        let board = sample_board();
        let text = encode(&board, DEFAULT_LABEL);

        let mutated = mutate(&mutate(&text, 2, 0, "1B"), 1, 1, "1B");
        assert_eq!(extract_move(&board, &mutated).unwrap(), Some(Move::new(1, 1)));

        let mutated = mutate(&mutate(&text, 1, 2, "4R"), 1, 0, "3B");
        assert_eq!(extract_move(&board, &mutated).unwrap(), Some(Move::new(1, 0)));
    }

    #[test]
    fn test_whitespace_runs_are_separators() {
        let board = sample_board();
        let text = "Human Move:\n0   1R\t0  \n 2B 0 3R\n0 0  0\n";
        assert_eq!(extract_move(&board, text).unwrap(), None);
    }

    #[test]
    fn test_header_is_ignored() {
        let board = Board::empty(2, 2);
        assert_eq!(extract_move(&board, "AI Move:\n0 0\n0 0").unwrap(), None);
        assert_eq!(
            extract_move(&board, "0 1B\n0 0\n0 1B").unwrap(),
            Some(Move::new(1, 1))
        );
    }

    #[test]
    fn test_blank_row_line_is_skipped() {
        let board = sample_board();
        let text = encode(&board, DEFAULT_LABEL);

        let blanked = mutate(&text, 1, 0, "5R").replace("5R 0 3R", "");
        assert_eq!(extract_move(&board, &blanked).unwrap(), None);

        // Truncated record: only the first row survived
        assert_eq!(extract_move(&board, "Human Move:\n0 1R 0").unwrap(), None);
        assert_eq!(extract_move(&board, "Human Move:").unwrap(), None);
    }

    #[test]
    fn test_short_line_differs_at_missing_column() {
        let board = sample_board();
        let text = "Human Move:\n0 1R 0\n2B\n0 0 0\n";
        assert_eq!(extract_move(&board, text).unwrap(), Some(Move::new(1, 1)));
    }

    #[test]
    fn test_empty_record_is_decode_error() {
        let board = Board::empty(2, 2);
        assert!(matches!(extract_move(&board, ""), Err(RelayError::Decode(_))));
    }

    #[test]
    fn test_dimension_mismatch_is_decode_error() {
        let board = Board::empty(2, 2);
        assert!(matches!(
            extract_move(&board, "Human Move:\n0 0 0\n0 0\n"),
            Err(RelayError::Decode(_))
        ));
        assert!(matches!(
            extract_move(&board, "Human Move:\n0 0\n0 0\n0 0\n"),
            Err(RelayError::Decode(_))
        ));
        // Trailing blank lines are fine
        assert_eq!(extract_move(&board, "Human Move:\n0 0\n0 0\n\n\n").unwrap(), None);
    }

    #[test]
    fn test_malformed_changed_token_is_decode_error() {
        let board = Board::empty(2, 2);
        for bad in ["0R", "3", "R3", "3RB", "x", "-1R", "3?"] {
            let text = format!("Human Move:\n0 0\n{} 0\n", bad);
            assert!(
                matches!(extract_move(&board, &text), Err(RelayError::Decode(_))),
                "token {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("0").unwrap(), Cell::empty());
        assert_eq!(parse_token("3R").unwrap(), owned(3, Color::HUMAN));
        assert_eq!(parse_token(" 11B ").unwrap(), owned(11, Color::ENGINE));
        assert!(parse_token("").is_err());
        assert!(parse_token("00").is_err());
        assert!(parse_token("0B").is_err());
    }

    #[test]
    fn test_tokens_parse_back_to_cells() {
        for row in sample_board().rows() {
            for cell in row {
                assert_eq!(parse_token(&cell.token()).unwrap(), *cell);
            }
        }
    }
}
