use tui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Gauge, Row, Table},
};

use crate::solver::{ByteSlot, SlotBlock, StateSnapshot};

const CIPHERTEXT_COLOR: Color = Color::Red;
const INTERMEDIATE_COLOR: Color = Color::Cyan;
const PLAINTEXT_COLOR: Color = Color::Green;
const CURRENT_BYTE_STYLE: Style = Style {
    fg: Some(Color::Yellow),
    bg: Some(Color::Black),
    add_modifier: Modifier::BOLD,
    sub_modifier: Modifier::empty(),
};

pub(super) fn build_status_panel_border(title_style: Style) -> Block<'static> {
    Block::default()
        .title(Span::styled("Status", title_style))
        .borders(Borders::ALL)
}

pub(super) fn build_log_view(title_style: Style) -> Block<'static> {
    Block::default()
        .title(Span::styled("Log", title_style))
        .borders(Borders::NONE)
}

pub(super) fn build_progress_bar(solved_bytes: usize, total_bytes: usize) -> Gauge<'static> {
    let ratio = if total_bytes == 0 {
        0.0
    } else {
        solved_bytes as f64 / total_bytes as f64
    };
    let label = Span::styled(
        format!("{}/{} bytes", solved_bytes, total_bytes),
        Style::default().fg(Color::DarkGray),
    );

    Gauge::default()
        .gauge_style(Style::default().fg(Color::LightCyan))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label)
        .use_unicode(true)
}

/// Builds the four-column (block index, Cₙ₋₁′, Iₙ, Pₙ) table, with the
/// current byte highlighted in the row currently being worked on.
pub(super) fn build_block_table(title_style: Style, snapshot: &StateSnapshot) -> Table<'static> {
    let header = Row::new(vec![
        Cell::from("Block"),
        Cell::from(Span::styled("Cₙ₋₁′", Style::default().fg(CIPHERTEXT_COLOR))),
        Cell::from(Span::styled("Iₙ", Style::default().fg(INTERMEDIATE_COLOR))),
        Cell::from(Span::styled("Pₙ", Style::default().fg(PLAINTEXT_COLOR))),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = (0..snapshot.working_previous.len())
        .map(|block_idx| {
            if block_idx == 0 {
                return Row::new(vec![
                    Cell::from("IV"),
                    Cell::from(render_hex_block(
                        &snapshot.working_previous[0],
                        CIPHERTEXT_COLOR,
                        None,
                    )),
                    Cell::from(""),
                    Cell::from(""),
                ]);
            }

            let is_current = block_idx == snapshot.current_block && !snapshot.complete;
            let highlight = if is_current { Some(snapshot.current_byte) } else { None };

            Row::new(vec![
                Cell::from(block_idx.to_string()),
                Cell::from(render_hex_block(
                    &snapshot.working_previous[block_idx],
                    CIPHERTEXT_COLOR,
                    highlight,
                )),
                Cell::from(render_slot_block(
                    &snapshot.intermediate[block_idx],
                    INTERMEDIATE_COLOR,
                    highlight,
                )),
                Cell::from(render_slot_block(
                    &snapshot.plaintext[block_idx],
                    PLAINTEXT_COLOR,
                    highlight,
                )),
            ])
        })
        .collect();

    let title = format!(
        "Block {}/{}  byte {}  pad k={}  v{}",
        snapshot.current_block,
        snapshot.block_count,
        snapshot.current_byte,
        snapshot.pad_width,
        snapshot.version,
    );

    Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title(Span::styled(title, title_style))
                .borders(Borders::ALL),
        )
        .widths(&[
            Constraint::Length(6),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .column_spacing(1)
}

fn render_hex_block(block: &crate::block::Block, color: Color, highlight_byte: Option<usize>) -> Spans<'static> {
    let spans: Vec<Span> = block
        .iter()
        .enumerate()
        .flat_map(|(i, byte)| {
            let text = format!("{:02x} ", byte);
            let style = match highlight_byte {
                Some(h) if h == i => CURRENT_BYTE_STYLE,
                _ => Style::default().fg(color),
            };
            [Span::styled(text, style)]
        })
        .collect();
    Spans::from(spans)
}

fn render_slot_block(block: &SlotBlock, color: Color, highlight_byte: Option<usize>) -> Spans<'static> {
    let spans: Vec<Span> = block
        .0
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let text = format!("{} ", slot.glyph());
            let style = match (highlight_byte, slot) {
                (Some(h), _) if h == i => CURRENT_BYTE_STYLE,
                (_, ByteSlot::Solved(_)) => Style::default().fg(color),
                _ => Style::default().fg(Color::DarkGray),
            };
            Span::styled(text, style)
        })
        .collect();
    Spans::from(spans)
}
