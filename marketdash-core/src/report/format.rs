//! Display formatting: rows to text cells with a color tone.

use super::Section;
use crate::domain::{Category, ChangeUnit, Missing, Reading};
use crate::returns::ReturnRow;

/// Placeholder glyph for any unavailable value.
pub const DASH: &str = "\u{2014}";

/// Text shown in the value column of a row with no data source.
pub const NO_SOURCE: &str = "no source";

/// Color class of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Change > 0
    Gain,
    /// Change < 0
    Loss,
    /// Exactly zero, or a non-change value (price, label)
    Flat,
    /// No value
    Unavailable,
}

impl Tone {
    pub fn of_change(reading: Reading) -> Tone {
        match reading {
            Reading::Present(v) if v > 0.0 => Tone::Gain,
            Reading::Present(v) if v < 0.0 => Tone::Loss,
            Reading::Present(_) => Tone::Flat,
            Reading::Missing(_) => Tone::Unavailable,
        }
    }

    /// Fill color as RGB in 0..=1.
    pub fn rgb(self) -> (f32, f32, f32) {
        match self {
            Tone::Gain => (0.0, 0.38, 0.0),
            Tone::Loss => (0.61, 0.0, 0.024),
            Tone::Flat => (0.15, 0.15, 0.15),
            Tone::Unavailable => (0.55, 0.55, 0.55),
        }
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Flat,
        }
    }

    fn unavailable() -> Self {
        Self {
            text: DASH.to_string(),
            tone: Tone::Unavailable,
        }
    }
}

/// A section laid out as header + rows of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Format a change: one decimal for percent, whole basis points for yields.
///
/// The sign follows the displayed digits, so a change that rounds to zero
/// prints as an unsigned `0.0%` / `0 bps`. The tone still follows the exact
/// value.
pub fn format_change(reading: Reading, unit: ChangeUnit) -> Cell {
    let Reading::Present(v) = reading else {
        return Cell::unavailable();
    };
    let (digits, zero, suffix) = match unit {
        ChangeUnit::Percent => (format!("{:.1}", v.abs()), "0.0", "%"),
        ChangeUnit::BasisPoints => (format!("{:.0}", v.abs()), "0", " bps"),
    };
    let text = if digits == zero {
        format!("{zero}{suffix}")
    } else {
        let sign = if v < 0.0 { '-' } else { '+' };
        format!("{sign}{digits}{suffix}")
    };
    Cell {
        text,
        tone: Tone::of_change(reading),
    }
}

/// Format the current value: `$1,234.56` for prices, `4.25%` for yields.
pub fn format_current(reading: Reading, category: Category) -> Cell {
    match reading {
        Reading::Present(v) => match category {
            Category::BondYield => Cell::plain(format!("{v:.2}%")),
            _ => Cell::plain(format_money(v)),
        },
        Reading::Missing(Missing::NoDataSource) => Cell {
            text: NO_SOURCE.to_string(),
            tone: Tone::Unavailable,
        },
        Reading::Missing(_) => Cell::unavailable(),
    }
}

/// Dollar amount with thousands separators and two decimals.
pub fn format_money(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

fn row_cells(row: &ReturnRow) -> Vec<Cell> {
    let label = if row.note.is_some() {
        format!("{} *", row.label)
    } else {
        row.label.clone()
    };

    let mut cells = vec![
        Cell::plain(row.symbol.clone()),
        Cell::plain(label),
        format_current(row.current, row.category),
    ];
    cells.extend(
        row.category
            .horizons()
            .iter()
            .map(|&h| format_change(row.change(h), row.unit)),
    );
    cells
}

/// Lay a section out as a table.
pub fn section_table(section: &Section) -> Table {
    let value_header = match section.category {
        Category::BondYield => "Yield",
        _ => "Price",
    };
    let mut headers = vec!["Ticker".to_string(), "Name".to_string(), value_header.to_string()];
    headers.extend(section.category.horizons().iter().map(|h| match section.category.change_unit() {
        ChangeUnit::BasisPoints => format!("{} (bps)", h.label()),
        ChangeUnit::Percent => h.label().to_string(),
    }));

    Table {
        headers,
        rows: section.rows.iter().map(row_cells).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal_with_sign() {
        let c = format_change(Reading::Present(10.0 / 570.0 * 100.0), ChangeUnit::Percent);
        assert_eq!(c.text, "+1.8%");
        assert_eq!(c.tone, Tone::Gain);

        let c = format_change(Reading::Present(-0.44), ChangeUnit::Percent);
        assert_eq!(c.text, "-0.4%");
        assert_eq!(c.tone, Tone::Loss);
    }

    #[test]
    fn bps_round_to_whole_numbers() {
        let c = format_change(Reading::Present((4.25 - 4.20) * 100.0), ChangeUnit::BasisPoints);
        assert_eq!(c.text, "+5 bps");
        assert_eq!(c.tone, Tone::Gain);

        let c = format_change(Reading::Present(-12.4), ChangeUnit::BasisPoints);
        assert_eq!(c.text, "-12 bps");
        assert_eq!(c.tone, Tone::Loss);
    }

    #[test]
    fn zero_change_is_flat_and_unsigned() {
        let c = format_change(Reading::Present(0.0), ChangeUnit::Percent);
        assert_eq!((c.text.as_str(), c.tone), ("0.0%", Tone::Flat));
        let c = format_change(Reading::Present(0.0), ChangeUnit::BasisPoints);
        assert_eq!((c.text.as_str(), c.tone), ("0 bps", Tone::Flat));
    }

    #[test]
    fn changes_that_round_to_zero_print_unsigned() {
        let c = format_change(Reading::Present(-0.3), ChangeUnit::BasisPoints);
        assert_eq!((c.text.as_str(), c.tone), ("0 bps", Tone::Loss));
        let c = format_change(Reading::Present(0.04), ChangeUnit::Percent);
        assert_eq!((c.text.as_str(), c.tone), ("0.0%", Tone::Gain));
        let c = format_change(Reading::Present(-0.06), ChangeUnit::Percent);
        assert_eq!(c.text, "-0.1%");
    }

    #[test]
    fn every_missing_reason_renders_as_gray_dash() {
        for m in [
            Missing::NoHistory,
            Missing::FetchFailed,
            Missing::StaleQuote,
            Missing::NoDataSource,
            Missing::ZeroBase,
        ] {
            let c = format_change(Reading::Missing(m), ChangeUnit::Percent);
            assert_eq!(c.text, DASH);
            assert_eq!(c.tone, Tone::Unavailable);
        }
    }

    #[test]
    fn current_value_formats() {
        assert_eq!(format_current(Reading::Present(580.0), Category::Equity).text, "$580.00");
        assert_eq!(format_current(Reading::Present(4.25), Category::BondYield).text, "4.25%");
        assert_eq!(
            format_current(Reading::Missing(Missing::NoDataSource), Category::BondYield).text,
            NO_SOURCE
        );
        assert_eq!(
            format_current(Reading::Missing(Missing::FetchFailed), Category::Crypto).text,
            DASH
        );
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(67234.5), "$67,234.50");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(12.0), "$12.00");
        assert_eq!(format_money(-1500.0), "-$1,500.00");
    }

    #[test]
    fn tone_colors_are_distinct() {
        let tones = [Tone::Gain, Tone::Loss, Tone::Flat, Tone::Unavailable];
        for (i, a) in tones.iter().enumerate() {
            for b in &tones[i + 1..] {
                assert_ne!(a.rgb(), b.rgb());
            }
        }
    }
}
