use getset::Getters;
use tui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Getters)]
pub(super) struct TuiLayout {
    #[get = "pub"]
    block_table_area: Rect,

    #[get = "pub"]
    status_panel_area: Rect,
    #[get = "pub"]
    progress_bar_area: Rect,
    #[get = "pub"]
    logs_area: Rect,
}

impl TuiLayout {
    pub(super) fn calculate(full_frame_size: Rect) -> Self {
        let main_vertical_layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Ratio(3, 5), Constraint::Ratio(2, 5)].as_ref())
            .split(full_frame_size);

        let status_panel = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Ratio(1, 6), Constraint::Ratio(5, 6)].as_ref())
            .split(main_vertical_layout[1]);

        Self {
            block_table_area: main_vertical_layout[0],
            status_panel_area: main_vertical_layout[1],
            progress_bar_area: status_panel[0],
            logs_area: status_panel[1],
        }
    }
}
