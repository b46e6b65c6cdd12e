use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use crate::color::Color as AppColor;
use crate::model::Palette;

/// Rows taken by one card: border, swatch strip, border.
pub const CARD_HEIGHT: u16 = 3;

const HEX_WIDTH: usize = 7;

fn to_color(c: AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Black or white text, whichever reads better on `c`.
fn contrast_fg(c: AppColor) -> Color {
    if c.wants_dark_text() {
        Color::Black
    } else {
        Color::White
    }
}

/// One palette rendered as a bordered strip of swatches.
///
/// Each swatch gets an equal share of the width and shows its hex value when
/// there is room for it. Entries that are not valid hex are drawn as gaps.
pub struct PaletteCard<'a> {
    palette: &'a Palette,
    index: usize,
    selected: bool,
    confirm_delete: bool,
}

impl<'a> PaletteCard<'a> {
    pub fn new(palette: &'a Palette, index: usize) -> Self {
        Self {
            palette,
            index,
            selected: false,
            confirm_delete: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn confirm_delete(mut self, confirm: bool) -> Self {
        self.confirm_delete = confirm;
        self
    }

    fn block(&self) -> Block<'a> {
        let count = format!(" {} ", self.palette.colors.len());
        let mut block = Block::bordered()
            .title(format!(" {}: {} ", self.index, self.palette.name))
            .title_bottom(Line::from(count).right_aligned());
        if self.selected {
            block = block
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(Color::Yellow));
        }
        if self.confirm_delete {
            block = block
                .title_bottom(
                    Line::from(" d again to delete ")
                        .left_aligned()
                        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                )
                .border_style(Style::default().fg(Color::Red));
        }
        block
    }
}

/// Build the swatch strip for `colors` across `width` cells.
///
/// At most one swatch per cell is drawn; colors past that are cut off.
fn swatch_line(colors: &[String], width: u16) -> Line<'static> {
    let width = usize::from(width);
    let shown = &colors[..colors.len().min(width)];
    if shown.is_empty() {
        return Line::default();
    }
    let base = width / shown.len();
    let extra = width % shown.len();

    let spans = shown
        .iter()
        .enumerate()
        .map(|(i, hex)| {
            let w = base + usize::from(i < extra);
            match AppColor::from_hex(hex) {
                Ok(c) => {
                    let label = if w >= HEX_WIDTH {
                        c.to_hex().to_uppercase()
                    } else {
                        String::new()
                    };
                    Span::styled(
                        format!("{label:^w$}"),
                        Style::default().bg(to_color(c)).fg(contrast_fg(c)),
                    )
                },
                Err(_) => Span::raw(" ".repeat(w)),
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

impl Widget for PaletteCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(swatch_line(&self.palette.colors, inner.width)).render(inner, buf);
    }
}
