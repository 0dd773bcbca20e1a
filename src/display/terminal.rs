// src/display/terminal.rs v3
//! Interactive terminal display: map viewport, filters, forms and directions

use crate::controller::{MapController, MarkerFilter, Notice, OriginChoice};
use crate::dataset::DatasetSource;
use crate::error::Result;
use crate::geo;
use crate::marker::USER_ICON;
use crate::record::{NewLocation, PointCategory};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::io::{self, Write};
use std::time::Duration;

/// Character cells in the map viewport
const MAP_W: usize = 64;
const MAP_H: usize = 16;
/// World pixels per character cell; terminal cells are roughly twice as tall
/// as they are wide
const CELL_PX_X: f64 = 8.0;
const CELL_PX_Y: f64 = 16.0;

/// How many marker rows the list panel shows
const LIST_ROWS: usize = 8;

pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Run the display loop until the user quits. All controller operations
    /// are awaited inline, one at a time.
    pub async fn run(&self, controller: &mut MapController, source: &DatasetSource) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, Hide, DisableLineWrap)?;

        let result = self.event_loop(&mut stdout, controller, source).await;

        terminal::disable_raw_mode()?;
        execute!(stdout, Show, EnableLineWrap)?;
        println!("\nShutting down...");
        result
    }

    async fn event_loop(
        &self,
        stdout: &mut io::Stdout,
        controller: &mut MapController,
        source: &DatasetSource,
    ) -> Result<()> {
        let mut selected: usize = 0;
        let mut dirty = true;

        loop {
            if dirty {
                self.render(stdout, controller, selected)?;
                dirty = false;
            }

            if !event::poll(Duration::from_millis(200))? {
                continue;
            }

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Char('1') => {
                            controller.apply_filter(MarkerFilter::All);
                            selected = 0;
                        }
                        KeyCode::Char('2') => {
                            controller.apply_filter(MarkerFilter::Cushion);
                            selected = 0;
                        }
                        KeyCode::Char('3') => {
                            controller.apply_filter(MarkerFilter::Permanent);
                            selected = 0;
                        }
                        KeyCode::Char('4') => {
                            controller.apply_filter(MarkerFilter::UserAdded);
                            selected = 0;
                        }
                        KeyCode::Up => selected = selected.saturating_sub(1),
                        KeyCode::Down => {
                            let count = controller.visible_markers().count();
                            if count > 0 && selected < count - 1 {
                                selected += 1;
                            }
                        }
                        KeyCode::Enter => {
                            if let Some(id) = self.selected_marker_id(controller, selected) {
                                if let Err(e) = controller.open_record_popup(&id) {
                                    controller.set_notice(Notice::error(&e));
                                }
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = self.selected_marker_id(controller, selected) {
                                if let Err(e) = controller.directions_to_marker(&id).await {
                                    controller.set_notice(Notice::error(&e));
                                }
                            }
                        }
                        KeyCode::Char('l') => {
                            if let Err(e) = controller.show_user_location().await {
                                controller.set_notice(Notice::error(&e));
                            }
                        }
                        KeyCode::Char('a') => {
                            self.add_location_flow(stdout, controller).await?;
                        }
                        KeyCode::Char('r') => {
                            self.directions_flow(stdout, controller).await?;
                        }
                        KeyCode::Char('g') => {
                            if let Err(e) = controller.load_dataset(source).await {
                                log::error!("dataset reload failed: {}", e);
                                controller.install_records(Vec::new());
                                controller.set_notice(Notice::error(&e));
                            }
                            selected = 0;
                        }
                        KeyCode::Esc => controller.clear_notice(),
                        _ => {}
                    }
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        Ok(())
    }

    fn selected_marker_id(&self, controller: &MapController, selected: usize) -> Option<String> {
        controller
            .visible_markers()
            .nth(selected)
            .map(|m| m.record_id.clone())
    }

    // --- interactive flows ---

    /// The add-location form: name, type, address, optional notes.
    /// Esc at any prompt abandons the form without changes.
    async fn add_location_flow(
        &self,
        stdout: &mut io::Stdout,
        controller: &mut MapController,
    ) -> Result<()> {
        let Some(location) = self.prompt_line(stdout, "Location name")? else {
            return Ok(());
        };
        let Some(kind) = self.prompt_line(stdout, "Type ([c]ushion / [p]ermanent)")? else {
            return Ok(());
        };
        let Some(address) = self.prompt_line(stdout, "Street address")? else {
            return Ok(());
        };
        let Some(notes) = self.prompt_line(stdout, "Notes (optional)")? else {
            return Ok(());
        };

        let category = if kind.trim().to_ascii_lowercase().starts_with('c') {
            PointCategory::Cushion
        } else {
            PointCategory::Permanent
        };
        let form = NewLocation {
            location,
            category,
            address,
            description: if notes.trim().is_empty() { None } else { Some(notes) },
        };

        // A geocoding failure leaves the dataset untouched; the notice tells
        // the user to retry
        if let Err(e) = controller.submit_location(form).await {
            controller.set_notice(Notice::error(&e));
        }
        Ok(())
    }

    /// Directions between an origin ("me" or a list number) and a
    /// destination list number
    async fn directions_flow(
        &self,
        stdout: &mut io::Stdout,
        controller: &mut MapController,
    ) -> Result<()> {
        let Some(origin_input) = self.prompt_line(stdout, "Origin ('me' or list #)")? else {
            return Ok(());
        };
        let Some(dest_input) = self.prompt_line(stdout, "Destination (list #)")? else {
            return Ok(());
        };

        let origin = if origin_input.trim().eq_ignore_ascii_case("me") {
            OriginChoice::UserLocation
        } else {
            OriginChoice::Record(self.option_id(controller, &origin_input))
        };
        let destination = dest_input.trim();
        let destination_id = if destination.is_empty() {
            None
        } else {
            Some(self.option_id(controller, destination))
        };

        if let Err(e) = controller.get_directions(origin, destination_id.as_deref()).await {
            controller.set_notice(Notice::error(&e));
        }
        Ok(())
    }

    /// Map a 1-based list number to a destination id; anything else passes
    /// through for the controller to validate
    fn option_id(&self, controller: &MapController, input: &str) -> String {
        let options = controller.destinations();
        match input.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => options[n - 1].id.clone(),
            _ => input.trim().to_string(),
        }
    }

    /// Read one line of input on the prompt row. Enter confirms, Esc cancels.
    fn prompt_line(&self, stdout: &mut io::Stdout, label: &str) -> Result<Option<String>> {
        let prompt_row = (MAP_H + LIST_ROWS + 10) as u16;
        let mut buffer = String::new();

        execute!(stdout, Show)?;
        loop {
            execute!(
                stdout,
                MoveTo(0, prompt_row),
                Clear(ClearType::CurrentLine),
                SetForegroundColor(Color::Cyan),
                Print(format!("{}> ", label)),
                ResetColor,
                Print(&buffer)
            )?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Enter => break,
                    KeyCode::Esc => {
                        execute!(stdout, Hide, MoveTo(0, prompt_row), Clear(ClearType::CurrentLine))?;
                        return Ok(None);
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                    }
                    KeyCode::Char(c) => buffer.push(c),
                    _ => {}
                }
            }
        }
        execute!(stdout, Hide, MoveTo(0, prompt_row), Clear(ClearType::CurrentLine))?;
        Ok(Some(buffer))
    }

    // --- rendering ---

    fn render(
        &self,
        stdout: &mut io::Stdout,
        controller: &MapController,
        selected: usize,
    ) -> Result<()> {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

        self.render_header(stdout, controller)?;
        self.render_map(stdout, controller)?;
        self.render_marker_list(stdout, controller, selected)?;
        self.render_notice(stdout, controller)?;
        self.render_footer(stdout)?;

        stdout.flush()?;
        Ok(())
    }

    fn render_header(&self, stdout: &mut io::Stdout, controller: &MapController) -> Result<()> {
        let stats = controller.stats();
        let viewport = controller.viewport();

        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print("=".repeat(MAP_W + 2)),
            Print("\r\n"),
            Print("Hump Map - Traffic-Calming Installations"),
            Print("\r\n"),
            Print("=".repeat(MAP_W + 2)),
            Print("\r\n"),
            ResetColor,
            Print(format!(
                "Filter: {}   Total: {}   Visible: {}\r\n",
                controller.filter().label(),
                stats.total,
                stats.visible
            )),
            Print(format!(
                "Center: {}   Zoom: {}\r\n",
                viewport.center, viewport.zoom
            ))
        )?;
        Ok(())
    }

    /// Project visible markers, the user position and the active route into
    /// a character grid centred on the viewport
    fn render_map(&self, stdout: &mut io::Stdout, controller: &MapController) -> Result<()> {
        let viewport = controller.viewport();
        let (cx, cy) = geo::lat_lng_to_world_px(&viewport.center, viewport.zoom);

        let mut grid = vec![vec![(' ', Color::Reset); MAP_W]; MAP_H];

        let place = |pos: &crate::geo::LatLng, ch: char, color: Color, grid: &mut Vec<Vec<(char, Color)>>| {
            let (x, y) = geo::lat_lng_to_world_px(pos, viewport.zoom);
            let col = ((x - cx) / CELL_PX_X + MAP_W as f64 / 2.0).floor();
            let row = ((y - cy) / CELL_PX_Y + MAP_H as f64 / 2.0).floor();
            if col >= 0.0 && (col as usize) < MAP_W && row >= 0.0 && (row as usize) < MAP_H {
                grid[row as usize][col as usize] = (ch, color);
            }
        };

        // route underneath, markers on top, user pin above everything
        if let Some(route) = controller.active_route() {
            for point in &route.polyline {
                place(point, '.', Color::DarkBlue, &mut grid);
            }
        }
        for marker in controller.visible_markers() {
            place(&marker.position, marker.icon.label, marker.icon.terminal_color(), &mut grid);
        }
        if let Some(user) = controller.user_location() {
            place(&user.position, USER_ICON.label, Color::Blue, &mut grid);
        }

        queue!(stdout, Print(format!("+{}+\r\n", "-".repeat(MAP_W))))?;
        for row in &grid {
            queue!(stdout, Print("|"))?;
            for &(ch, color) in row {
                if color == Color::Reset {
                    queue!(stdout, Print(ch))?;
                } else {
                    queue!(stdout, SetForegroundColor(color), Print(ch), ResetColor)?;
                }
            }
            queue!(stdout, Print("|\r\n"))?;
        }
        queue!(stdout, Print(format!("+{}+\r\n", "-".repeat(MAP_W))))?;
        Ok(())
    }

    fn render_marker_list(
        &self,
        stdout: &mut io::Stdout,
        controller: &MapController,
        selected: usize,
    ) -> Result<()> {
        execute!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print("DESTINATIONS:\r\n"),
            ResetColor
        )?;

        let options = controller.destinations();
        if options.is_empty() {
            execute!(stdout, Print("  (no visible markers)\r\n"))?;
        }

        // keep the selection within the visible window
        let start = selected.saturating_sub(LIST_ROWS - 1);
        for (index, option) in options.iter().enumerate().skip(start).take(LIST_ROWS) {
            let pointer = if index == selected { ">" } else { " " };
            execute!(
                stdout,
                Print(format!("{} {:>2}. {}\r\n", pointer, index + 1, option.label))
            )?;
        }
        Ok(())
    }

    fn render_notice(&self, stdout: &mut io::Stdout, controller: &MapController) -> Result<()> {
        let Some(notice) = controller.notice() else {
            return Ok(());
        };

        let color = if notice.is_error { Color::Red } else { Color::Cyan };
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(format!("\r\n{}\r\n", notice.title)),
            ResetColor
        )?;
        for line in &notice.lines {
            execute!(stdout, Print(format!("  {}\r\n", line)))?;
        }
        if let Some(position) = notice.position {
            execute!(stdout, Print(format!("  ({})\r\n", position)))?;
        }
        Ok(())
    }

    fn render_footer(&self, stdout: &mut io::Stdout) -> Result<()> {
        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print("\r\n[1] all  [2] cushions  [3] permanent  [4] mine  [l] locate  [a] add\r\n"),
            Print("[r] directions  [d] route to selection  [Enter] details  [g] reload  [q] quit\r\n"),
            ResetColor
        )?;
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}
