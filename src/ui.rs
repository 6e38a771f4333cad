use anyhow::Result;
use building_meter::db::{KeyValueStore, LoadStatus};
use building_meter::derive::{
    completed_units_on_floor, household_delta, is_unit_completed, previous_commercial_water,
    progress_by_inspector, room_label, usage_delta,
};
use building_meter::export::{export_record, workbook_file_name, XlsxWorkbookWriter};
use building_meter::model::{
    floor_label, floor_labels, next_unit, parse_reading, previous_unit, unit_label, unit_labels,
    CommercialField, HouseholdField, InspectorRole, Reading, FIRST_FLOOR, HOUSEHOLD_COUNT,
};
use building_meter::store::{suggested_month_id, RecordStore};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Household,
    Commercial,
    MainMeter,
    Summary,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Household, Page::Commercial, Page::MainMeter, Page::Summary];

    pub fn next(&self) -> Self {
        match self {
            Page::Household => Page::Commercial,
            Page::Commercial => Page::MainMeter,
            Page::MainMeter => Page::Summary,
            Page::Summary => Page::Household,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Household => Page::Summary,
            Page::Commercial => Page::Household,
            Page::MainMeter => Page::Commercial,
            Page::Summary => Page::MainMeter,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Household => "세대 검침",
            Page::Commercial => "상가 검침",
            Page::MainMeter => "상수도 메인",
            Page::Summary => "작업 이력",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    /// Typing a value for the selected field
    Editing(String),
    /// New-month dialog
    Creating { input: String, error: Option<String> },
}

/// Household editor order: utility readings first, then electric meters
const FORM_FIELDS: [HouseholdField; 11] = [
    HouseholdField::Water,
    HouseholdField::Heating,
    HouseholdField::HotWater,
    HouseholdField::OutdoorUnit,
    HouseholdField::Elec13,
    HouseholdField::Elec14,
    HouseholdField::Elec15,
    HouseholdField::Elec16,
    HouseholdField::Elec17,
    HouseholdField::Elec19,
    HouseholdField::Elec20,
];

pub struct App<S: KeyValueStore> {
    pub store: RecordStore<S>,
    pub current_page: Page,
    pub active_inspector: InspectorRole,
    pub selected_floor: String,
    pub selected_unit: String,
    pub field_state: TableState,
    pub commercial_state: TableState,
    pub input_mode: InputMode,
    pub status_message: Option<String>,
    export_dir: PathBuf,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: RecordStore<S>, load_status: &LoadStatus, export_dir: PathBuf) -> Self {
        let mut field_state = TableState::default();
        field_state.select(Some(0));

        let mut commercial_state = TableState::default();
        commercial_state.select(Some(0));

        let status_message = match load_status {
            LoadStatus::Recovered(_) => {
                Some("저장 데이터가 손상되어 초기화되었습니다.".to_string())
            }
            LoadStatus::Partial { skipped, .. } => {
                Some(format!("손상된 월 기록 {}건을 건너뛰었습니다.", skipped))
            }
            _ => None,
        };

        Self {
            store,
            current_page: Page::Household,
            active_inspector: InspectorRole::Chief,
            selected_floor: floor_label(FIRST_FLOOR),
            selected_unit: unit_label(1),
            field_state,
            commercial_state,
            input_mode: InputMode::Normal,
            status_message,
            export_dir,
        }
    }

    pub fn selected_field(&self) -> HouseholdField {
        FORM_FIELDS[self.field_state.selected().unwrap_or(0).min(FORM_FIELDS.len() - 1)]
    }

    fn selected_commercial(&self) -> usize {
        self.commercial_state.selected().unwrap_or(0)
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn toggle_inspector(&mut self) {
        self.active_inspector = self.active_inspector.toggle();
        info!(inspector = self.active_inspector.label(), "inspector mode switched");
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn next_row(&mut self) {
        match self.current_page {
            Page::Household => step(&mut self.field_state, FORM_FIELDS.len(), true),
            Page::Commercial => {
                let len = self.store.current_record().map(|r| r.commercials.len()).unwrap_or(0);
                step(&mut self.commercial_state, len, true)
            }
            _ => {}
        }
    }

    pub fn previous_row(&mut self) {
        match self.current_page {
            Page::Household => step(&mut self.field_state, FORM_FIELDS.len(), false),
            Page::Commercial => {
                let len = self.store.current_record().map(|r| r.commercials.len()).unwrap_or(0);
                step(&mut self.commercial_state, len, false)
            }
            _ => {}
        }
    }

    pub fn next_unit(&mut self) {
        if let Some((floor, unit)) = next_unit(&self.selected_floor, &self.selected_unit) {
            self.selected_floor = floor;
            self.selected_unit = unit;
        }
    }

    pub fn previous_unit(&mut self) {
        if let Some((floor, unit)) = previous_unit(&self.selected_floor, &self.selected_unit) {
            self.selected_floor = floor;
            self.selected_unit = unit;
        }
    }

    /// Changing floor starts again at unit 1
    pub fn change_floor(&mut self, forward: bool) {
        let floors = floor_labels();
        let Some(i) = floors.iter().position(|f| *f == self.selected_floor) else {
            return;
        };
        let target = if forward { floors.get(i + 1) } else { i.checked_sub(1).and_then(|p| floors.get(p)) };
        if let Some(floor) = target {
            self.selected_floor = floor.clone();
            self.selected_unit = unit_label(1);
        }
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    fn selected_value(&self) -> Option<Reading> {
        let record = self.store.current_record()?;
        match self.current_page {
            Page::Household => record
                .household(&self.selected_floor, &self.selected_unit)
                .map(|h| h.get(self.selected_field())),
            Page::Commercial => record
                .commercials
                .get(self.selected_commercial())
                .map(|c| c.get(CommercialField::Water)),
            Page::MainMeter => Some(record.main_meter),
            Page::Summary => None,
        }
    }

    pub fn begin_edit(&mut self) {
        if let Some(value) = self.selected_value() {
            self.input_mode = InputMode::Editing(format_reading(value));
        }
    }

    pub fn commit_edit(&mut self) {
        let InputMode::Editing(buffer) = std::mem::replace(&mut self.input_mode, InputMode::Normal) else {
            return;
        };
        let value = parse_reading(&buffer);
        let inspector = self.active_inspector;
        let field = self.selected_field();

        let result = match self.current_page {
            Page::Household => match self.store.find_household(&self.selected_floor, &self.selected_unit) {
                Some(index) => self.store.update_household_field(index, field, value, inspector),
                None => Ok(()),
            },
            Page::Commercial => {
                let index = self.selected_commercial();
                self.store.update_commercial_field(index, CommercialField::Water, value, inspector)
            }
            Page::MainMeter => self.store.update_main_meter(value),
            Page::Summary => Ok(()),
        };

        if let Err(e) = result {
            error!(error = %e, "failed to save reading");
            self.status_message = Some(format!("저장 실패: {}", e));
        }
    }

    pub fn open_create_dialog(&mut self, initial: String) {
        self.input_mode = InputMode::Creating { input: initial, error: None };
    }

    pub fn submit_create(&mut self) {
        let InputMode::Creating { input, .. } = &self.input_mode else {
            return;
        };
        let input = input.clone();

        match self.store.create_month(&input) {
            Ok(id) => {
                self.input_mode = InputMode::Normal;
                self.status_message = Some(format!("{} 생성됨", id));
            }
            Err(e) if e.is_validation() => {
                self.input_mode = InputMode::Creating { input, error: Some(e.to_string()) };
            }
            Err(e) => {
                error!(error = %e, "month created but not saved");
                self.input_mode = InputMode::Normal;
                self.status_message = Some(format!("저장 실패: {}", e));
            }
        }
    }

    pub fn export_current(&mut self) {
        let Some(current) = self.store.current_record() else {
            return;
        };
        let previous = self.store.previous_record();
        let mut sink = XlsxWorkbookWriter::new(self.export_dir.clone());

        self.status_message = Some(match export_record(&mut sink, current, previous) {
            Ok(path) => format!("{} → {}", workbook_file_name(current), path.display()),
            Err(e) => {
                error!(error = %e, "export failed");
                format!("내보내기 실패: {}", e)
            }
        });
    }

    /// Apply one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let editing = matches!(self.input_mode, InputMode::Editing(_));
        let creating = matches!(self.input_mode, InputMode::Creating { .. });

        match key.code {
            KeyCode::Enter if editing => {
                self.commit_edit();
                return false;
            }
            KeyCode::Enter if creating => {
                self.submit_create();
                return false;
            }
            KeyCode::Esc if editing || creating => {
                self.input_mode = InputMode::Normal;
                return false;
            }
            _ => {}
        }

        match &mut self.input_mode {
            InputMode::Editing(buffer) => {
                match key.code {
                    KeyCode::Backspace => {
                        buffer.pop();
                    }
                    KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => buffer.push(c),
                    _ => {}
                }
                return false;
            }
            InputMode::Creating { input, error } => {
                match key.code {
                    KeyCode::Backspace => {
                        input.pop();
                        *error = None;
                    }
                    KeyCode::Char(c) => {
                        input.push(c);
                        *error = None;
                    }
                    _ => {}
                }
                return false;
            }
            InputMode::Normal => {}
        }

        self.status_message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char('i') => self.toggle_inspector(),
            KeyCode::Char('n') => {
                self.open_create_dialog(suggested_month_id(Local::now().date_naive()))
            }
            KeyCode::Char('<') | KeyCode::Char(',') => self.store.select_adjacent(false),
            KeyCode::Char('>') | KeyCode::Char('.') => self.store.select_adjacent(true),
            KeyCode::Char('x') => self.export_current(),
            KeyCode::Enter => self.begin_edit(),
            KeyCode::Down | KeyCode::Char('j') => self.next_row(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_row(),
            KeyCode::Right | KeyCode::Char('l') if self.current_page == Page::Household => self.next_unit(),
            KeyCode::Left | KeyCode::Char('h') if self.current_page == Page::Household => self.previous_unit(),
            KeyCode::Char(']') if self.current_page == Page::Household => self.change_floor(true),
            KeyCode::Char('[') if self.current_page == Page::Household => self.change_floor(false),
            _ => {}
        }

        false
    }
}

fn step(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

fn format_reading(value: Reading) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn run_ui<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Month, tabs, inspector
            Constraint::Min(0),    // Page
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.store.current_record().is_none() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  데이터를 선택하거나 새로 생성해주세요. (n: 새 월 생성)",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, chunks[1]);
    } else {
        match app.current_page {
            Page::Household => render_household(f, chunks[1], app),
            Page::Commercial => render_commercial(f, chunks[1], app),
            Page::MainMeter => render_main_meter(f, chunks[1], app),
            Page::Summary => render_summary(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);

    if let InputMode::Creating { input, error } = &app.input_mode {
        render_create_dialog(f, input, error.as_deref());
    }
}

fn render_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let month = app
        .store
        .current_record()
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "-".to_string());

    let mut spans = vec![
        Span::styled(month, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  |  "),
    ];

    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("{} 모드", app.active_inspector.label()),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 빌딩 통합 검침 마스터 "),
    );

    f.render_widget(header, area);
}

fn editing_cell(app_mode: &InputMode, selected: bool, value: Reading) -> Cell<'static> {
    match app_mode {
        InputMode::Editing(buffer) if selected => Cell::from(format!("{}▏", buffer))
            .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
        _ => Cell::from(format_reading(value)),
    }
}

fn render_household<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(area);

    let Some(record) = app.store.current_record() else {
        return;
    };
    let previous = app.store.previous_record();

    // Unit picker for the selected floor
    let done = completed_units_on_floor(record, &app.selected_floor);
    let unit_lines: Vec<Line> = unit_labels()
        .into_iter()
        .map(|unit| {
            let completed = is_unit_completed(record, &app.selected_floor, &unit);
            let mark = if completed { "✓" } else { " " };
            let style = if unit == app.selected_unit {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else if completed {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(
                format!(" {} {}", mark, room_label(&app.selected_floor, &unit)),
                style,
            ))
        })
        .collect();

    let picker = Paragraph::new(unit_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}/{}) ", app.selected_floor, done, unit_labels().len())),
    );

    // Field editor for the selected unit
    let current = record.household(&app.selected_floor, &app.selected_unit).cloned();
    let prev_row = previous.and_then(|p| p.household(&app.selected_floor, &app.selected_unit));
    let selected = app.field_state.selected();

    let (rows, title) = match &current {
        Some(row) => {
            let delta = household_delta(row, prev_row);
            let rows: Vec<Row> = FORM_FIELDS
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    let prev_value = prev_row.and_then(|p| p.get(*field));
                    let change = match field {
                        HouseholdField::Water => delta.water.to_string(),
                        HouseholdField::Heating => delta.heating.to_string(),
                        HouseholdField::HotWater => delta.hot_water.to_string(),
                        HouseholdField::OutdoorUnit => delta.outdoor_unit.to_string(),
                        _ => usage_delta(row.get(*field), prev_value).to_string(),
                    };
                    let label_style = if field.is_electric() {
                        Style::default().fg(Color::Magenta)
                    } else {
                        Style::default().fg(Color::Cyan)
                    };
                    Row::new(vec![
                        Cell::from(field.label().to_string()).style(label_style),
                        editing_cell(&app.input_mode, selected == Some(i), row.get(*field)),
                        Cell::from(format_reading(prev_value)).style(Style::default().fg(Color::DarkGray)),
                        Cell::from(change),
                    ])
                })
                .collect();
            let title = format!(
                " {} · 최종 입력: {} · 전기 합계 증감 {} ",
                room_label(&row.floor, &row.unit),
                row.inspector.label(),
                delta.elec_total
            );
            (rows, title)
        }
        None => (Vec::new(), " - ".to_string()),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["항목", "검침값", "전월", "사용량"]))
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_widget(picker, columns[0]);
    f.render_stateful_widget(table, columns[1], &mut app.field_state);
}

fn render_commercial<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let Some(record) = app.store.current_record() else {
        return;
    };
    let previous = app.store.previous_record();
    let selected = app.commercial_state.selected();

    let rows: Vec<Row> = record
        .commercials
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let prev_value = previous_commercial_water(previous, i);
            Row::new(vec![
                Cell::from(c.unit.clone()),
                Cell::from(c.inspector.label().to_string()),
                editing_cell(&app.input_mode, selected == Some(i), c.water),
                Cell::from(format_reading(prev_value)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(usage_delta(c.water, prev_value).to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(12),
        ],
    )
    .header(header_row(&["호수", "담당자", "수도계량검침", "전월", "사용량"]))
    .block(Block::default().borders(Borders::ALL).title(" 상가 검침 "))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.commercial_state);
}

fn render_main_meter<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let Some(record) = app.store.current_record() else {
        return;
    };
    let previous = app.store.previous_record();
    let prev_value = previous.and_then(|p| p.main_meter);

    let current_text = match &app.input_mode {
        InputMode::Editing(buffer) => format!("{}▏", buffer),
        _ => format_reading(record.main_meter),
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  당월 검침값: ", label),
            Span::styled(current_text, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  전월 검침값: ", label),
            Span::raw(match previous {
                Some(p) => format!("{} ({})", format_reading(prev_value), p.name),
                None => "-".to_string(),
            }),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  당월 사용량: ", label),
            Span::styled(
                usage_delta(record.main_meter, prev_value).to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter 입력 · 빈 값으로 저장하면 미검침",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" 상수도 메인 계량기 "));
    f.render_widget(paragraph, area);
}

fn render_summary<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let Some(record) = app.store.current_record() else {
        return;
    };

    let mut constraints = vec![Constraint::Length(5); InspectorRole::ALL.len()];
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, role) in InspectorRole::ALL.iter().enumerate() {
        let progress = progress_by_inspector(record, *role);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(
                " {} · 세대 검침 ({} / {}) · 상가 검침 {} ",
                role.label(),
                progress.household_count,
                HOUSEHOLD_COUNT,
                progress.commercial_count
            )))
            .gauge_style(Style::default().fg(Color::Green))
            .percent(progress.household_percent().min(100) as u16);
        f.render_widget(gauge, chunks[i]);
    }

    let export = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("x", Style::default().fg(Color::Yellow)),
            Span::raw(format!(" 엑셀 내보내기 → {}", workbook_file_name(record))),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title(" 내보내기 "));
    f.render_widget(export, chunks[InspectorRole::ALL.len()]);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let spans = if let Some(message) = &app.status_message {
        vec![Span::styled(format!(" {}", message), Style::default().fg(Color::Green))]
    } else if matches!(app.input_mode, InputMode::Editing(_)) {
        vec![key(" Enter"), Span::raw(" 저장 | "), key("Esc"), Span::raw(" 취소")]
    } else {
        vec![
            key(" Tab"), Span::raw(" 탭 | "),
            key("i"), Span::raw(" 검침자 | "),
            key("←/→"), Span::raw(" 호실 | "),
            key("[/]"), Span::raw(" 층 | "),
            key("</>"), Span::raw(" 월 | "),
            key("n"), Span::raw(" 새 월 | "),
            key("x"), Span::raw(" 내보내기 | "),
            Span::styled("q", Style::default().fg(Color::Red)), Span::raw(" 종료"),
        ]
    };

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_create_dialog(f: &mut Frame, input: &str, error: Option<&str>) {
    let area = centered_rect(50, 9, f.size());

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  월 (YYYY-MM): "),
            Span::styled(format!("{}▏", input), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
    ];
    if let Some(message) = error {
        content.push(Line::from(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Red),
        )));
    }
    content.push(Line::from(Span::styled(
        "  Enter 생성 · Esc 취소",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let dialog = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" 새 월 생성 "),
    );

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn header_row(labels: &[&'static str]) -> Row<'static> {
    Row::new(labels.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1)
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height: height.min(area.height),
    }
}
