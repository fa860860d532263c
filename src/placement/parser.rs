// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Placement (.plc) parser
//!
//! Every physical line is reduced to its `[0-9A-Za-z.-]+` tokens and matched
//! against an ordered list of header rules; the first rule whose literal
//! tokens are all present (and, for the count headers, whose token count
//! matches) wins. Lines of exactly five numeric/orientation tokens are
//! placement rows. Anything else is ignored so unknown headers pass through.
//!
//! ```text
//! # Columns : 30  Rows : 30
//! # Width : 1600.0  Height : 1600.0
//! # HARD MACROs : 1
//! 0 400.0 800.0 N 1
//! 1 10.0 20.0 - 0
//! ```

use std::str::FromStr;

use nom::{
    bytes::complete::{take_till, take_while1},
    multi::many0,
    sequence::preceded,
    IResult, Parser,
};

use super::{Placement, PlacementRecord};
use crate::element::Orientation;
use crate::error::{record, PlcError};

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    many0(preceded(
        take_till(is_token_char),
        take_while1(is_token_char),
    ))
    .parse(input)
}

/// Split a line into `[0-9A-Za-z.-]+` tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    tokens(line).map(|(_, tokens)| tokens).unwrap_or_default()
}

fn is_row_token(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, 'F' | 'N' | 'E' | 'W' | 'S' | '.' | '-'))
}

/// Whether a tokenized line is an `index x y orientation fixed` row.
pub fn is_placement_row(tokens: &[&str]) -> bool {
    tokens.len() == 5 && tokens.iter().all(|token| is_row_token(token))
}

fn field<T: FromStr>(tokens: &[&str], position: usize, name: &str) -> Result<T, String> {
    let text = tokens
        .get(position)
        .ok_or_else(|| format!("{name} is missing"))?;
    text.parse()
        .map_err(|_| format!("{name} `{text}` is not a number"))
}

type Apply = fn(&mut Placement, &[&str]) -> Result<(), String>;

/// Header line classifier.
pub struct HeaderRule {
    pub name: &'static str,
    /// Literal tokens that must all be present.
    pub required: &'static [&'static str],
    /// Exact token count, for headers that only differ in length.
    pub token_count: Option<usize>,
    apply: Apply,
}

impl HeaderRule {
    pub fn matches(&self, tokens: &[&str]) -> bool {
        self.token_count.map_or(true, |count| tokens.len() == count)
            && self
                .required
                .iter()
                .all(|required| tokens.contains(required))
    }
}

const fn rule(
    name: &'static str,
    required: &'static [&'static str],
    token_count: Option<usize>,
    apply: Apply,
) -> HeaderRule {
    HeaderRule {
        name,
        required,
        token_count,
        apply,
    }
}

/// Header rules in priority order.
pub static HEADER_RULES: &[HeaderRule] = &[
    rule("grid", &["Columns", "Rows"], None, |p, t| {
        p.columns = field(t, 1, "Columns")?;
        p.rows = field(t, 3, "Rows")?;
        Ok(())
    }),
    rule("canvas", &["Width", "Height"], None, |p, t| {
        let width: f64 = field(t, 1, "Width")?;
        let height: f64 = field(t, 3, "Height")?;
        // A zero canvas means "not computed yet"; fall back to the derived size.
        if width > 0.0 && height > 0.0 {
            p.canvas_width = Some(width);
            p.canvas_height = Some(height);
        }
        Ok(())
    }),
    rule("module area", &["Area", "stdcell", "macros"], None, |p, t| {
        p.total_area = field(t, 3, "Area")?;
        Ok(())
    }),
    rule("area", &["Area"], None, |p, t| {
        p.total_area = field(t, 1, "Area")?;
        Ok(())
    }),
    rule("block", &["Block"], None, |p, t| {
        let block = t.get(1).ok_or("Block name is missing")?;
        p.block_name = Some(block.to_string());
        Ok(())
    }),
    rule(
        "routes per micron",
        &["Routes", "per", "micron", "hor", "ver"],
        None,
        |p, t| {
            p.routing.routes_per_micron_h = field(t, 4, "Routes per micron hor")?;
            p.routing.routes_per_micron_v = field(t, 6, "Routes per micron ver")?;
            Ok(())
        },
    ),
    rule(
        "routes used by macros",
        &["Routes", "used", "by", "macros", "hor", "ver"],
        None,
        |p, t| {
            p.routing.routes_used_by_macros_h = field(t, 5, "Routes used by macros hor")?;
            p.routing.routes_used_by_macros_v = field(t, 7, "Routes used by macros ver")?;
            Ok(())
        },
    ),
    rule("smoothing", &["Smoothing", "factor"], None, |p, t| {
        p.routing.smoothing_factor = field(t, 2, "Smoothing factor")?;
        Ok(())
    }),
    rule("overlap", &["Overlap", "threshold"], None, |p, t| {
        p.routing.overlap_threshold = field(t, 2, "Overlap threshold")?;
        Ok(())
    }),
    rule("hard macros", &["HARD", "MACROs"], Some(3), |p, t| {
        p.counts.hard_macros = field(t, 2, "HARD MACROs")?;
        Ok(())
    }),
    rule("hard macro pins", &["HARD", "MACRO", "PINs"], Some(4), |p, t| {
        p.counts.hard_macro_pins = field(t, 3, "HARD MACRO PINs")?;
        Ok(())
    }),
    rule("ports", &["PORTs"], Some(2), |p, t| {
        p.counts.ports = field(t, 1, "PORTs")?;
        Ok(())
    }),
    rule("soft macros", &["SOFT", "MACROs"], Some(3), |p, t| {
        p.counts.soft_macros = field(t, 2, "SOFT MACROs")?;
        Ok(())
    }),
    rule("soft macro pins", &["SOFT", "MACRO", "PINs"], Some(4), |p, t| {
        p.counts.soft_macro_pins = field(t, 3, "SOFT MACRO PINs")?;
        Ok(())
    }),
    rule("std cells", &["STDCELLs"], Some(2), |p, t| {
        p.counts.std_cells = field(t, 1, "STDCELLs")?;
        Ok(())
    }),
    rule("macro pins", &["MACRO", "PINs"], Some(3), |p, t| {
        p.counts.macro_pins = field(t, 2, "MACRO PINs")?;
        Ok(())
    }),
    rule("macros", &["MACROs"], Some(2), |p, t| {
        p.counts.macros = field(t, 1, "MACROs")?;
        Ok(())
    }),
];

/// A parsed row plus a note when the fixed flag had to be ignored.
pub type ParsedRow = (usize, PlacementRecord, Option<String>);

/// Parse an `index x y orientation fixed` row. A non-integer fixed flag
/// keeps the row with `fixed: None` and returns a note for it.
pub fn parse_row(tokens: &[&str]) -> Result<ParsedRow, String> {
    if tokens.len() != 5 {
        return Err(format!("expected 5 row fields, found {}", tokens.len()));
    }
    let index: usize = field(tokens, 0, "node index")?;
    let x: f64 = field(tokens, 1, "x")?;
    let y: f64 = field(tokens, 2, "y")?;

    let orientation: Option<Orientation> = match tokens[3] {
        "-" => None,
        text => Some(
            text.parse()
                .map_err(|_| format!("node {index}: unknown orientation `{text}`"))?,
        ),
    };

    let mut note = None;
    let fixed = match tokens[4].parse::<i64>() {
        Ok(0) => Some(false),
        Ok(1) => Some(true),
        Ok(_) => None,
        Err(_) => {
            note = Some(format!(
                "node {index}: fixed flag `{}` is not an integer, flag ignored",
                tokens[4]
            ));
            None
        }
    };

    Ok((
        index,
        PlacementRecord {
            x,
            y,
            orientation,
            fixed,
        },
        note,
    ))
}

/// Parse a placement file. Unreadable headers and rows are skipped and
/// reported in [`Placement::diagnostics`]; the parse itself never fails.
pub fn parse_placement(content: &str) -> Placement {
    let mut placement = Placement::default();

    for (index, line) in content.lines().enumerate() {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            continue;
        }

        let result = if let Some(rule) = HEADER_RULES.iter().find(|rule| rule.matches(&tokens)) {
            log::debug!("[DBG] Line {}: {} header", index + 1, rule.name);
            (rule.apply)(&mut placement, &tokens)
        } else if is_placement_row(&tokens) {
            parse_row(&tokens).and_then(|(node, row, note)| {
                if placement.placements.insert(node, row).is_some() {
                    log::warn!(
                        "[WARN] Line {}: node {node} placed twice, keeping the last row",
                        index + 1
                    );
                }
                note.map_or(Ok(()), Err)
            })
        } else {
            Ok(())
        };

        if let Err(message) = result {
            record(
                &mut placement.diagnostics,
                PlcError::MalformedPlacement {
                    line: index + 1,
                    message,
                },
            );
        }
    }

    placement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("# Columns : 30  Rows : 20"),
            vec!["Columns", "30", "Rows", "20"]
        );
        assert_eq!(
            tokenize("# Routes per micron, hor : 11.285  ver : 12.605"),
            vec!["Routes", "per", "micron", "hor", "11.285", "ver", "12.605"]
        );
        assert_eq!(tokenize("12 -3.5 4e2 - 1"), vec!["12", "-3.5", "4e2", "-", "1"]);
        assert!(tokenize("   # : ").is_empty());
    }

    #[test]
    fn test_hard_macro_count_not_confused_with_macros() {
        let placement = parse_placement("# HARD MACROs : 4\n# MACROs : 9\n# MACRO PINs : 7\n");
        assert_eq!(placement.counts.hard_macros, 4);
        assert_eq!(placement.counts.macros, 9);
        assert_eq!(placement.counts.macro_pins, 7);
    }

    #[test]
    fn test_area_variants() {
        let placement = parse_placement("# Area (stdcell+macros) : 250.5\n");
        assert_eq!(placement.total_area, 250.5);
        let placement = parse_placement("# Area : 60\n");
        assert_eq!(placement.total_area, 60.0);
    }

    #[test]
    fn test_row_classification() {
        assert!(is_placement_row(&["5", "10.0", "20.0", "-", "1"]));
        assert!(is_placement_row(&["0", "1", "2", "FN", "0"]));
        assert!(!is_placement_row(&["5", "10.0", "20.0", "-"]));
        assert!(!is_placement_row(&["Date", "2022-03-13", "09", "30", "00"]));
    }

    #[test]
    fn test_parse_row() {
        let (index, row, note) = parse_row(&["5", "10.0", "20.0", "-", "1"]).unwrap();
        assert_eq!(index, 5);
        assert!(note.is_none());
        assert_eq!(row.x, 10.0);
        assert_eq!(row.y, 20.0);
        assert_eq!(row.orientation, None);
        assert_eq!(row.fixed, Some(true));

        let (_, row, _) = parse_row(&["0", "1", "2", "FS", "3"]).unwrap();
        assert_eq!(row.orientation, Some(Orientation::FS));
        assert_eq!(row.fixed, None);
    }

    #[test]
    fn test_non_integer_fixed_flag_keeps_row() {
        let (index, row, note) = parse_row(&["7", "12", "14", "-", "1.0"]).unwrap();
        assert_eq!(index, 7);
        assert_eq!((row.x, row.y), (12.0, 14.0));
        assert_eq!(row.fixed, None);
        assert!(note.unwrap().contains("`1.0`"));

        let placement = parse_placement("7 12 14 - 1.0\n");
        assert!(placement.placements.contains_key(&7));
        assert!(matches!(
            placement.diagnostics.as_slice(),
            [PlcError::MalformedPlacement { line: 1, .. }]
        ));
    }

    #[test]
    fn test_unreadable_row_skipped() {
        let placement = parse_placement("0 1.0 2.0 NN 1\n1 3.0 4.0 N 0\n");
        assert_eq!(placement.placements.len(), 1);
        assert!(placement.placements.contains_key(&1));
        assert_eq!(placement.diagnostics.len(), 1);
        assert!(matches!(
            placement.diagnostics[0],
            PlcError::MalformedPlacement { line: 1, .. }
        ));
    }

    #[test]
    fn test_bad_header_value_is_diagnostic() {
        let placement = parse_placement("# Columns : many  Rows : 10\n# Block : ariane\n");
        assert_eq!(placement.columns, 0);
        assert_eq!(placement.block_name.as_deref(), Some("ariane"));
        assert_eq!(placement.diagnostics.len(), 1);
    }

    #[test]
    fn test_canvas_derived_when_absent() {
        let placement = parse_placement("# Area : 60\n");
        assert_eq!(placement.canvas_size(), (10.0, 10.0));

        let placement = parse_placement("# Width : 0.0  Height : 0.0\n# Area : 60\n");
        assert_eq!(placement.canvas_size(), (10.0, 10.0));

        let placement = parse_placement("# Width : 120.5  Height : 80\n# Area : 60\n");
        assert_eq!(placement.canvas_size(), (120.5, 80.0));
    }
}
