use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use seafood_cost::{
    format_amount, format_usd, CostBreakdown, CostTable, QualityEngine, QualityReport, Session,
    Severity, VariableName,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Products,
    RateChart,
    Variables,
    CostOutput,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Products, Page::RateChart, Page::Variables, Page::CostOutput];

    pub fn next(&self) -> Self {
        match self {
            Page::Products => Page::RateChart,
            Page::RateChart => Page::Variables,
            Page::Variables => Page::CostOutput,
            Page::CostOutput => Page::Products,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Products => Page::CostOutput,
            Page::RateChart => Page::Products,
            Page::Variables => Page::RateChart,
            Page::CostOutput => Page::Variables,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Products => "Products",
            Page::RateChart => "Rate Chart",
            Page::Variables => "Variables",
            Page::CostOutput => "Cost Output",
        }
    }
}

// ============================================================================
// FORMS
// ============================================================================

/// What a form edits. Existing rows are addressed by identity (product id,
/// rate size, variable name), never by table position.
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    AddProduct,
    EditProduct { id: String },
    AddRate,
    EditRate { size: u32 },
    EditVariable(VariableName),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub hint: Option<&'static str>,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<(&'static str, String)>) -> Self {
        Form {
            kind,
            fields: fields
                .into_iter()
                .map(|(label, value)| FormField { label, value })
                .collect(),
            focus: 0,
            hint: None,
        }
    }

    pub fn title(&self) -> String {
        match &self.kind {
            FormKind::AddProduct => " Add New Product ".to_string(),
            FormKind::EditProduct { .. } => " Edit Product ".to_string(),
            FormKind::AddRate => " Add New Rate ".to_string(),
            FormKind::EditRate { size } => format!(" Edit Rate - Size {} ", size),
            FormKind::EditVariable(name) => format!(" Edit {} ", name),
        }
    }

    fn value(&self, i: usize) -> &str {
        self.fields.get(i).map(|f| f.value.trim()).unwrap_or("")
    }

    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn previous_field(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn push(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }
}

fn parse_size(value: &str, label: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("{} must be a whole number, got '{}'", label, value))
}

fn parse_rate(value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("Rate must be a number, got '{}'", value))
}

// ============================================================================
// APP STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App {
    pub session: Session,
    pub current_page: Page,
    pub products_state: TableState,
    pub rates_state: TableState,
    pub variables_state: TableState,
    pub cost_state: TableState,
    pub form: Option<Form>,
    pub breakdown: Option<CostBreakdown>,
    pub cost_table: Option<CostTable>,
    pub show_formula: bool,
    pub status: Option<Status>,
    pub quality: QualityReport,
}

impl App {
    pub fn new(session: Session) -> Self {
        let quality = QualityEngine::new().check(&session);

        let mut app = Self {
            session,
            current_page: Page::Products,
            products_state: TableState::default(),
            rates_state: TableState::default(),
            variables_state: TableState::default(),
            cost_state: TableState::default(),
            form: None,
            breakdown: None,
            cost_table: None,
            show_formula: false,
            status: None,
            quality,
        };
        app.clamp_selections();
        app
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.form.is_some() {
            self.handle_form_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::BackTab => self.current_page = self.current_page.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Enter => {
                if self.current_page == Page::CostOutput {
                    self.calculate_selected();
                } else {
                    self.open_edit_form();
                }
            }
            KeyCode::Char('A') if self.current_page == Page::CostOutput => self.calculate_all(),
            KeyCode::Char('f') if self.current_page == Page::CostOutput => {
                self.show_formula = !self.show_formula;
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.form = None;
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push(c),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn page_len(&self, page: Page) -> usize {
        match page {
            Page::Products | Page::CostOutput => self.session.catalog.len(),
            Page::RateChart => self.session.rates.len(),
            Page::Variables => VariableName::ALL.len(),
        }
    }

    fn state_mut(&mut self, page: Page) -> &mut TableState {
        match page {
            Page::Products => &mut self.products_state,
            Page::RateChart => &mut self.rates_state,
            Page::Variables => &mut self.variables_state,
            Page::CostOutput => &mut self.cost_state,
        }
    }

    fn move_selection(&mut self, delta: i64) {
        let page = self.current_page;
        let len = self.page_len(page);
        if len == 0 {
            return;
        }
        let state = self.state_mut(page);
        let i = match state.selected() {
            Some(i) => (i as i64 + delta).rem_euclid(len as i64) as usize,
            None => 0,
        };
        state.select(Some(i));
    }

    fn clamp_selections(&mut self) {
        for page in Page::ALL {
            let len = self.page_len(page);
            let state = self.state_mut(page);
            let selected = match (len, state.selected()) {
                (0, _) => None,
                (_, None) => Some(0),
                (len, Some(i)) => Some(i.min(len - 1)),
            };
            state.select(selected);
        }
    }

    pub fn selected_product_id(&self) -> Option<String> {
        let page_state = if self.current_page == Page::CostOutput {
            &self.cost_state
        } else {
            &self.products_state
        };
        page_state
            .selected()
            .and_then(|i| self.session.catalog.get(i))
            .map(|p| p.id.clone())
    }

    pub fn selected_rate_size(&self) -> Option<u32> {
        self.rates_state
            .selected()
            .and_then(|i| self.session.rates.get_index(i))
            .map(|e| e.size)
    }

    pub fn selected_variable(&self) -> Option<VariableName> {
        self.variables_state
            .selected()
            .and_then(|i| VariableName::ALL.get(i).copied())
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    fn open_add_form(&mut self) {
        self.form = match self.current_page {
            Page::Products => Some(Form::new(
                FormKind::AddProduct,
                vec![
                    ("Product Name", String::new()),
                    ("Smallest Raw Material Size", "5".to_string()),
                    ("Largest Raw Material Size", "10".to_string()),
                ],
            )),
            Page::RateChart => Some(Form::new(
                FormKind::AddRate,
                vec![("Size", "25".to_string()), ("Rate (Tk.)", "850".to_string())],
            )),
            _ => None,
        };
    }

    fn open_edit_form(&mut self) {
        self.form = match self.current_page {
            Page::Products => self
                .selected_product_id()
                .and_then(|id| self.session.catalog.find_by_id(&id).cloned())
                .map(|p| {
                    Form::new(
                        FormKind::EditProduct { id: p.id.clone() },
                        vec![
                            ("Product Name", p.name.clone()),
                            ("Smallest Raw Material Size", p.smallest_size.to_string()),
                            ("Largest Raw Material Size", p.largest_size.to_string()),
                        ],
                    )
                }),
            Page::RateChart => self.selected_rate_size().map(|size| {
                let rate = self.session.rates.get(size).unwrap_or(0.0);
                Form::new(FormKind::EditRate { size }, vec![("Rate (Tk.)", rate.to_string())])
            }),
            Page::Variables => self.selected_variable().map(|name| {
                let current = self
                    .session
                    .variables
                    .get(name)
                    .map(|v| v.display())
                    .unwrap_or_default();
                let mut form = Form::new(FormKind::EditVariable(name), vec![(name.as_str(), current)]);
                form.hint = Some(name.hint());
                form
            }),
            Page::CostOutput => None,
        };
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };

        let result = match &form.kind {
            FormKind::AddProduct => self.submit_add_product(&form),
            FormKind::EditProduct { id } => self.submit_edit_product(id, &form),
            FormKind::AddRate => self.submit_add_rate(&form),
            FormKind::EditRate { size } => parse_rate(form.value(0)).and_then(|rate| {
                self.session.update_rate(*size, rate).map_err(|e| e.message)?;
                Ok(format!("Updated rate for size {}", size))
            }),
            FormKind::EditVariable(name) => self
                .session
                .set_variable(*name, form.value(0))
                .map(|v| format!("{} set to {}", name, v.display()))
                .map_err(|e| e.to_string()),
        };

        match result {
            Ok(message) => {
                self.form = None;
                self.after_edit();
                self.set_status(StatusKind::Success, message);
            }
            Err(message) => self.set_status(StatusKind::Error, message),
        }
    }

    fn submit_add_product(&mut self, form: &Form) -> Result<String, String> {
        let smallest = parse_size(form.value(1), "Smallest size")?;
        let largest = parse_size(form.value(2), "Largest size")?;
        let product = self
            .session
            .add_product(form.value(0), smallest, largest)
            .map_err(|e| e.message)?;
        self.products_state.select(Some(self.session.catalog.len() - 1));
        Ok(format!("Added {} to products list!", product.name))
    }

    fn submit_edit_product(&mut self, id: &str, form: &Form) -> Result<String, String> {
        let smallest = parse_size(form.value(1), "Smallest size")?;
        let largest = parse_size(form.value(2), "Largest size")?;
        self.session
            .update_product(id, form.value(0), smallest, largest)
            .map_err(|e| e.message)?;
        Ok(format!("Updated {}", form.value(0)))
    }

    fn submit_add_rate(&mut self, form: &Form) -> Result<String, String> {
        let size = parse_size(form.value(0), "Size")?;
        let rate = parse_rate(form.value(1))?;
        self.session.add_rate(size, rate).map_err(|e| e.message)?;
        if let Some(pos) = self.session.rates.iter().position(|e| e.size == size) {
            self.rates_state.select(Some(pos));
        }
        Ok(format!("Added rate for size {}!", size))
    }

    fn delete_selected(&mut self) {
        let result = match self.current_page {
            Page::Products => self.selected_product_id().map(|id| {
                self.session
                    .remove_product(&id)
                    .map(|p| format!("Deleted {}", p.name))
                    .map_err(|e| e.message)
            }),
            Page::RateChart => self.selected_rate_size().map(|size| {
                self.session
                    .remove_rate(size)
                    .map(|_| format!("Deleted rate for size {}!", size))
                    .map_err(|e| e.message)
            }),
            _ => None,
        };

        match result {
            Some(Ok(message)) => {
                self.after_edit();
                self.set_status(StatusKind::Success, message);
            }
            Some(Err(message)) => self.set_status(StatusKind::Error, message),
            None => {}
        }
    }

    /// Stores changed: results on screen are stale
    fn after_edit(&mut self) {
        self.breakdown = None;
        self.cost_table = None;
        self.quality = QualityEngine::new().check(&self.session);
        self.clamp_selections();
    }

    fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some(Status { kind, text });
    }

    // ------------------------------------------------------------------
    // Calculation
    // ------------------------------------------------------------------

    fn calculate_selected(&mut self) {
        let Some(name) = self
            .cost_state
            .selected()
            .and_then(|i| self.session.catalog.get(i))
            .map(|p| p.name.clone())
        else {
            self.set_status(StatusKind::Error, "Please select a product first.".to_string());
            return;
        };

        match self.session.compute_cost(&name) {
            Ok(breakdown) => {
                let message = format!(
                    "The final cost for {} is: {} USD",
                    breakdown.product,
                    format_usd(breakdown.final_cost_usd)
                );
                self.breakdown = Some(breakdown);
                self.set_status(StatusKind::Success, message);
            }
            Err(e) => {
                self.breakdown = None;
                self.set_status(StatusKind::Error, e.to_string());
            }
        }
    }

    fn calculate_all(&mut self) {
        match self.session.compute_all() {
            Ok(table) => {
                let message = format!("Calculated {} products", table.rows.len());
                self.cost_table = Some(table);
                self.set_status(StatusKind::Success, message);
            }
            Err(e) => {
                self.cost_table = None;
                self.set_status(StatusKind::Error, e.to_string());
            }
        }
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn highlight_style() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn header_row(labels: &[&'static str]) -> Row<'static> {
    Row::new(labels.iter().map(|h| Cell::from(*h).style(header_style())))
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Products => render_products(f, chunks[1], app),
        Page::RateChart => render_rates(f, chunks[1], app),
        Page::Variables => render_variables(f, chunks[1], app),
        Page::CostOutput => render_cost_output(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if let Some(form) = &app.form {
        render_form(f, form);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        "🦐 Seafood Cost Calculator  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    let issue_color = if app.quality.has_critical_issues() {
        Color::Red
    } else if app.quality.is_clean() {
        Color::Green
    } else {
        Color::Yellow
    };
    tab_spans.push(Span::styled(
        format!("Issues: {}", app.quality.issues.len()),
        Style::default().fg(issue_color),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_products(f: &mut Frame, area: Rect, app: &mut App) {
    let issues_height = if app.quality.is_clean() {
        0
    } else {
        (app.quality.issues.len() as u16 + 2).min(8)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(issues_height)])
        .split(area);

    let rows: Vec<Row> = app
        .session
        .catalog
        .iter()
        .map(|p| {
            let covered = app.session.rates.in_range(p.smallest_size, p.largest_size).count();
            let coverage_color = if covered == 0 {
                Color::Red
            } else if covered < p.size_count() {
                Color::Yellow
            } else {
                Color::Green
            };
            Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(p.smallest_size.to_string()),
                Cell::from(p.largest_size.to_string()),
                Cell::from(format!("{}/{}", covered, p.size_count()))
                    .style(Style::default().fg(coverage_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(28),
            Constraint::Length(24),
            Constraint::Length(24),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["Product", "Smallest Raw Material", "Largest Raw Material", "Sizes Priced"]))
    .block(bordered(" Current Products "))
    .highlight_style(highlight_style())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[0], &mut app.products_state);

    if issues_height > 0 {
        let lines: Vec<Line> = app
            .quality
            .issues
            .iter()
            .map(|issue| {
                let color = match issue.severity {
                    Severity::Critical => Color::Red,
                    Severity::Warning => Color::Yellow,
                    Severity::Info => Color::Cyan,
                };
                Line::from(vec![
                    Span::styled(format!(" {} ", issue.severity.as_str()), Style::default().fg(color)),
                    Span::styled(format!("{}: ", issue.subject), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(issue.issue.clone()),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines).block(bordered(" Data Quality ")), chunks[1]);
    }
}

fn render_rates(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .session
        .rates
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(e.size.to_string()),
                Cell::from(format_amount(e.rate)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(10), Constraint::Length(16)])
        .header(header_row(&["Size", "Rate (Tk.)"]))
        .block(bordered(" Current Rate Chart "))
        .highlight_style(highlight_style())
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.rates_state);
}

fn render_variables(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = VariableName::ALL
        .iter()
        .map(|name| {
            let value = match app.session.variables.get(*name) {
                Some(v) => Cell::from(v.display()),
                None => Cell::from("(not set)").style(Style::default().fg(Color::Red)),
            };
            Row::new(vec![
                Cell::from(name.as_str()),
                value,
                Cell::from(name.hint()).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(20), Constraint::Length(14), Constraint::Min(20)],
    )
    .header(header_row(&["Variable", "Value", "Format"]))
    .block(bordered(" Current Variables "))
    .highlight_style(highlight_style())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.variables_state);
}

fn render_cost_output(f: &mut Frame, area: Rect, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    // Left: product picker, and the all-products table when calculated
    let table_height = app
        .cost_table
        .as_ref()
        .map(|t| t.rows.len() as u16 + 3)
        .unwrap_or(0);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(table_height)])
        .split(columns[0]);

    let product_rows: Vec<Row> = app
        .session
        .catalog
        .iter()
        .map(|p| Row::new(vec![Cell::from(p.name.clone())]))
        .collect();
    let picker = Table::new(product_rows, [Constraint::Min(10)])
        .block(bordered(" Select Product "))
        .highlight_style(highlight_style())
        .highlight_symbol("→ ");
    f.render_stateful_widget(picker, left[0], &mut app.cost_state);

    if let Some(table) = &app.cost_table {
        let rows: Vec<Row> = table
            .rows
            .iter()
            .map(|r| Row::new(vec![Cell::from(r.product.clone()), Cell::from(format_usd(r.final_cost_usd))]))
            .collect();
        let title = format!(" Cost Table ({} UTC) ", table.generated_at.format("%H:%M:%S"));
        let widget = Table::new(rows, [Constraint::Min(12), Constraint::Length(12)])
            .header(header_row(&["Product", "Cost (USD)"]))
            .block(bordered(&title));
        f.render_widget(widget, left[1]);
    }

    // Right: breakdown + chart (or formula)
    let Some(breakdown) = &app.breakdown else {
        let help = Paragraph::new(vec![
            Line::from(""),
            Line::from("  Select a product and press Enter to calculate its cost."),
            Line::from("  Press A to calculate all products."),
        ])
        .block(bordered(" Cost Calculator "));
        f.render_widget(help, columns[1]);
        return;
    };

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(8)])
        .split(columns[1]);

    let rows: Vec<Row> = breakdown
        .lines()
        .iter()
        .map(|(label, value)| {
            Row::new(vec![Cell::from(label.as_str()), Cell::from(format_amount(*value))])
        })
        .collect();
    let title = format!(" Cost Breakdown - {} ", breakdown.product);
    let table = Table::new(rows, [Constraint::Length(26), Constraint::Length(14)])
        .header(header_row(&["Component", "Value"]))
        .block(bordered(&title));
    f.render_widget(table, right[0]);

    if app.show_formula {
        let formula = Paragraph::new(vec![
            Line::from(""),
            Line::from("  1. Raw Material Cost = Sum of raw material rates / Count of rates"),
            Line::from("  2. FOB Cost in Tk.   = Raw Material Cost + Variable Overhead + Fixed Overhead"),
            Line::from("  3. FOB Cost in USD   = FOB Cost in Tk. / USD Rate"),
            Line::from("  4. Subsidy           = FOB Cost in USD * Subsidy Rate"),
            Line::from("  5. Net FOB Cost      = FOB Cost in USD - Subsidy"),
            Line::from("  6. Final Cost        = Net FOB Cost in USD + Freight per Kg"),
        ])
        .block(bordered(" Formula Explanation "));
        f.render_widget(formula, right[1]);
    } else {
        let bars: Vec<Bar> = breakdown
            .chart_components()
            .into_iter()
            .map(|(label, value)| {
                Bar::default()
                    .value((value * 100.0).round().max(0.0) as u64)
                    .text_value(format_usd(value))
                    .label(Line::from(label))
            })
            .collect();
        let chart = BarChart::default()
            .block(bordered(" Cost Components (USD) "))
            .data(BarGroup::default().bars(&bars))
            .bar_width(18)
            .bar_gap(2)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        f.render_widget(chart, right[1]);
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
        };
        status_spans.push(Span::styled(format!(" {} ", status.text), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    let keys: &[(&str, &str)] = if app.form.is_some() {
        &[("Enter", "Save"), ("Tab", "Field"), ("Esc", "Cancel")]
    } else {
        match app.current_page {
            Page::Products | Page::RateChart => &[
                ("a", "Add"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("Tab", "Page"),
                ("q", "Quit"),
            ],
            Page::Variables => &[("e", "Edit"), ("Tab", "Page"), ("q", "Quit")],
            Page::CostOutput => &[
                ("Enter", "Calculate"),
                ("A", "All Products"),
                ("f", "Formula"),
                ("Tab", "Page"),
                ("q", "Quit"),
            ],
        }
    };

    for (i, (key, action)) in keys.iter().enumerate() {
        if i > 0 {
            status_spans.push(Span::raw(" | "));
        }
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {}", action)));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(bordered(""));
    f.render_widget(status_bar, area);
}

fn render_form(f: &mut Frame, form: &Form) {
    let height = form.fields.len() as u16 * 2 + 4;
    let area = centered_rect(60, height, f.size());

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let cursor = if focused { "▏" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", field.label), label_style),
            Span::raw(format!("{}{}", field.value, cursor)),
        ]));
        lines.push(Line::from(""));
    }
    if let Some(hint) = form.hint {
        lines.push(Line::from(Span::styled(
            format!("  {}", hint),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let title = form.title();
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title.as_str()),
    );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(width_pct: u16, height: u16, r: Rect) -> Rect {
    let width = (r.width as u32 * width_pct as u32 / 100) as u16;
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn clear_field(app: &mut App) {
        for _ in 0..16 {
            press(app, KeyCode::Backspace);
        }
    }

    fn go_to(app: &mut App, page: Page) {
        while app.current_page != page {
            press(app, KeyCode::Tab);
        }
    }

    #[test]
    fn test_page_navigation_wraps() {
        let mut app = App::new(Session::seeded());
        assert_eq!(app.current_page, Page::Products);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_page, Page::CostOutput);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Products);
    }

    #[test]
    fn test_add_product_through_form() {
        let mut app = App::new(Session::seeded());

        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Scampi");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_none());
        assert_eq!(app.session.catalog.len(), 6);
        assert_eq!(app.session.catalog.find("Scampi").unwrap().sizes(), 5..=10);
        assert_eq!(app.products_state.selected(), Some(5));
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Success);
    }

    #[test]
    fn test_invalid_form_stays_open() {
        let mut app = App::new(Session::seeded());

        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Product 1");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_some());
        assert_eq!(app.session.catalog.len(), 5);
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);

        press(&mut app, KeyCode::Esc);
        assert!(app.form.is_none());
        // Esc in a form cancels, it does not quit
        assert!(!press(&mut app, KeyCode::Char('j')));
    }

    #[test]
    fn test_duplicate_rate_rejected_from_form() {
        let mut app = App::new(Session::seeded());
        go_to(&mut app, Page::RateChart);

        press(&mut app, KeyCode::Char('a'));
        clear_field(&mut app);
        type_str(&mut app, "12");
        press(&mut app, KeyCode::Tab);
        clear_field(&mut app);
        type_str(&mut app, "5000");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_some());
        assert!(app.status.as_ref().unwrap().text.contains("already exists"));
        assert_eq!(app.session.rates.get(12), Some(1200.0));
    }

    #[test]
    fn test_delete_addresses_selected_identity() {
        let mut app = App::new(Session::seeded());

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.session.catalog.find("Product 2").is_none());

        // Selection now sits on what was the third row
        press(&mut app, KeyCode::Char('e'));
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.fields[0].value, "Product 3");
    }

    #[test]
    fn test_edit_variable_and_calculate() {
        let mut app = App::new(Session::seeded());
        go_to(&mut app, Page::Variables);

        press(&mut app, KeyCode::Enter);
        clear_field(&mut app);
        type_str(&mut app, "0 Tk.");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.quality.count(Severity::Critical), 1);

        go_to(&mut app, Page::CostOutput);
        press(&mut app, KeyCode::Enter);
        assert!(app.breakdown.is_none());
        assert!(app.status.as_ref().unwrap().text.contains("USD Rate"));

        press(&mut app, KeyCode::Char('A'));
        assert!(app.cost_table.is_none());
        assert!(app.status.as_ref().unwrap().text.contains("Product 1"));
    }

    #[test]
    fn test_calculate_selected_and_all() {
        let mut app = App::new(Session::seeded());
        go_to(&mut app, Page::CostOutput);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.breakdown.as_ref().unwrap().product, "Product 1");

        press(&mut app, KeyCode::Char('A'));
        assert_eq!(app.cost_table.as_ref().unwrap().rows.len(), 5);

        // Any edit invalidates the shown results
        go_to(&mut app, Page::RateChart);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.breakdown.is_none());
        assert!(app.cost_table.is_none());
    }

    #[test]
    fn test_quit() {
        let mut app = App::new(Session::seeded());
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_centered_rect_on_wide_terminal() {
        let area = Rect { x: 0, y: 0, width: 2000, height: 30 };
        let popup = centered_rect(60, 12, area);

        assert_eq!(popup.width, 1200);
        assert_eq!(popup.height, 12);
        assert_eq!(popup.x, 400);
        assert_eq!(popup.y, 9);
    }
}
