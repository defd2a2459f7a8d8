//! Box-drawing table renderer
//!
//! Rendering is two-pass: column widths are measured over the header and
//! every row first, then each line is written with those fixed widths.

use std::fmt::Write;

use colored::Colorize;

use super::TableModel;

/// Truecolor background of shaded rows, the RGB of xterm-256 colour 238
const SHADE_RGB: (u8, u8, u8) = (68, 68, 68);

const VERTICAL: char = '│';
const HORIZONTAL: char = '─';

/// Left, junction and right glyphs of one horizontal rule
struct Rule {
    left: char,
    junction: char,
    right: char,
}

const TOP: Rule = Rule {
    left: '┌',
    junction: '┬',
    right: '┐',
};
const SEPARATOR: Rule = Rule {
    left: '├',
    junction: '┼',
    right: '┤',
};
const BOTTOM: Rule = Rule {
    left: '└',
    junction: '┴',
    right: '┘',
};

/// Alternating background state, local to one render call
struct Shading {
    shaded: bool,
}

impl Shading {
    fn new() -> Self {
        Self { shaded: true }
    }

    /// Whether the next data row is shaded; flips the state
    fn next_row(&mut self) -> bool {
        let current = self.shaded;
        self.shaded = !self.shaded;
        current
    }
}

/// Renders [`TableModel`]s as bordered, fixed-width text
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer {
    colorize: bool,
}

impl TableRenderer {
    pub fn new(colorize: bool) -> Self {
        Self { colorize }
    }

    /// Printed width of every column: the longest cell, header included
    pub fn column_widths(model: &TableModel) -> Vec<usize> {
        let mut widths: Vec<usize> = model.header().iter().map(|h| cell_width(h)).collect();
        for row in model.rows() {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell_width(cell));
            }
        }
        widths
    }

    /// Render the whole table, one `\n`-terminated line per table line
    pub fn render(&self, model: &TableModel) -> String {
        let widths = Self::column_widths(model);
        let mut out = String::new();

        push_rule(&mut out, &widths, &TOP);
        self.push_row(&mut out, &widths, model.header(), false);
        push_rule(&mut out, &widths, &SEPARATOR);

        let mut shading = Shading::new();
        for row in model.rows() {
            let shaded = shading.next_row();
            self.push_row(&mut out, &widths, row, shaded);
        }

        push_rule(&mut out, &widths, &BOTTOM);
        out
    }

    fn push_row(&self, out: &mut String, widths: &[usize], cells: &[String], shaded: bool) {
        out.push(VERTICAL);
        for (cell, width) in cells.iter().zip(widths) {
            let padding = width.saturating_sub(cell_width(cell));
            let segment = format!(" {}{} ", cell, " ".repeat(padding));
            if shaded && self.colorize {
                let (r, g, b) = SHADE_RGB;
                let _ = write!(out, "{}", segment.on_truecolor(r, g, b));
            } else {
                out.push_str(&segment);
            }
            out.push(VERTICAL);
        }
        out.push('\n');
    }
}

fn push_rule(out: &mut String, widths: &[usize], rule: &Rule) {
    out.push(rule.left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            out.push(rule.junction);
        }
        out.extend(std::iter::repeat(HORIZONTAL).take(width + 2));
    }
    out.push(rule.right);
    out.push('\n');
}

fn cell_width(cell: &str) -> usize {
    cell.chars().count()
}
