use anyhow::Result;
use chrono::NaiveDate;
use std::io::{BufRead, Write};

use crate::application::{AppError, ExpenseService};
use crate::domain::{
    Cents, DATE_FORMAT, RecordId, RecordUpdate, display_cents, parse_amount, parse_date,
};

use super::render::{BANNER, Palette, Tone, expense_table, paint, summary_table};

/// Whether the menu loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ran out; behave as if the user chose to exit.
    Closed,
}

/// The numbered interactive menu.
///
/// Reads answers from `input` and writes everything to `output`, so a script
/// of lines can drive it in tests.
pub struct Menu<'a, R, W> {
    service: &'a mut ExpenseService,
    input: R,
    output: W,
    palette: &'a Palette,
    today: NaiveDate,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(
        service: &'a mut ExpenseService,
        input: R,
        output: W,
        palette: &'a Palette,
        today: NaiveDate,
    ) -> Self {
        Self {
            service,
            input,
            output,
            palette,
            today,
        }
    }

    /// Run until the user picks "Save & Exit" or input ends, then save.
    pub fn run(mut self) -> Result<()> {
        let loaded = self.service.ledger().len();
        self.say(Tone::Success, &format!("Loaded {} expenses.", loaded))?;

        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt("Select an option: ")? else {
                break;
            };
            writeln!(self.output)?;

            let flow = match choice.as_str() {
                "1" => self.add_expense()?,
                "2" => self.edit_expense()?,
                "3" => self.delete_expense()?,
                "4" => self.list_all()?,
                "5" => self.list_by_category()?,
                "6" => self.list_by_date_range()?,
                "7" => self.monthly_summary()?,
                "8" => self.show_total()?,
                "9" => break,
                _ => {
                    self.say(Tone::Warning, "Invalid choice, try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Closed {
                break;
            }
        }

        self.say(Tone::Progress, "Saving data...")?;
        let saved = self.service.save()?;
        tracing::info!(saved, "menu session saved");
        self.say(Tone::Success, "Data saved. Goodbye!")?;
        Ok(())
    }

    fn say(&mut self, tone: Tone, text: &str) -> Result<()> {
        writeln!(self.output, "{}", paint(self.palette, tone, text))?;
        Ok(())
    }

    fn show(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Print `label` and read one trimmed line. `None` once input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_amount(&mut self, label: &str) -> Result<Option<Cents>> {
        loop {
            let Some(text) = self.prompt(label)? else {
                return Ok(None);
            };
            match parse_amount(&text) {
                Ok(amount) => return Ok(Some(amount)),
                Err(_) => self.say(Tone::Error, "Invalid number, please try again.")?,
            }
        }
    }

    /// Keep asking until a valid date is given; an empty answer means today.
    fn prompt_date(&mut self, label: &str) -> Result<Option<NaiveDate>> {
        loop {
            let Some(text) = self.prompt(label)? else {
                return Ok(None);
            };
            if text.is_empty() {
                return Ok(Some(self.today));
            }
            match parse_date(&text) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => self.say(Tone::Error, "Invalid date format. Please use YYYY-MM-DD.")?,
            }
        }
    }

    fn show_menu(&mut self) -> Result<()> {
        self.say(Tone::Title, BANNER)?;
        for entry in [
            "1. Add new expense",
            "2. Edit expense",
            "3. Delete expense",
            "4. List all expenses",
            "5. List by category",
            "6. List by date range",
            "7. Monthly summary",
            "8. Show total spending",
        ] {
            self.say(Tone::Info, entry)?;
        }
        writeln!(self.output)?;
        self.say(Tone::Warning, "9. Save & Exit")?;
        self.say(Tone::Title, &"-".repeat(40))
    }

    fn add_expense(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== Add Expense ===")?;

        let Some(amount) = self.prompt_amount("Amount: ")? else {
            return Ok(Flow::Closed);
        };
        let Some(category) = self.prompt("Category: ")? else {
            return Ok(Flow::Closed);
        };
        let Some(date) = self.prompt_date("Date (YYYY-MM-DD, empty for today): ")? else {
            return Ok(Flow::Closed);
        };
        let Some(note) = self.prompt("Note (optional): ")? else {
            return Ok(Flow::Closed);
        };

        let date_text = date.format(DATE_FORMAT).to_string();
        match self
            .service
            .add_expense(amount, &category, &date_text, &note)
        {
            Ok(record) => {
                let id = record.id().unwrap_or_default();
                self.say(Tone::Success, &format!("Expense {} added successfully!", id))?
            }
            Err(e) => self.say(Tone::Error, &format!("Failed to add expense: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    fn edit_expense(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== Edit Expense ===")?;
        self.list_all()?;

        let Some(answer) = self.prompt("Enter ID to edit: ")? else {
            return Ok(Flow::Closed);
        };
        let Ok(id) = answer.parse::<RecordId>() else {
            self.say(Tone::Error, "Invalid ID.")?;
            return Ok(Flow::Continue);
        };

        let current = match self.service.get_expense(id) {
            Ok(record) => record.clone(),
            Err(_) => {
                self.say(Tone::Error, "No expense found with that ID.")?;
                return Ok(Flow::Continue);
            }
        };

        self.say(Tone::Info, &format!("Current amount: {}", display_cents(current.amount())))?;
        self.say(Tone::Info, &format!("Current category: {}", current.category()))?;
        self.say(Tone::Info, &format!("Current date: {}", current.date()))?;
        self.say(Tone::Info, &format!("Current note: {}", current.note()))?;
        self.say(Tone::Info, "Press Enter to keep the current value for any field.")?;

        let mut update = RecordUpdate::new();

        let Some(amount_text) = self.prompt("New amount: ")? else {
            return Ok(Flow::Closed);
        };
        if !amount_text.is_empty() {
            match parse_amount(&amount_text) {
                Ok(amount) => update = update.amount(amount),
                Err(_) => {
                    self.say(Tone::Error, "Invalid amount. Edit cancelled.")?;
                    return Ok(Flow::Continue);
                }
            }
        }

        let Some(category) = self.prompt("New category: ")? else {
            return Ok(Flow::Closed);
        };
        if !category.is_empty() {
            update = update.category(category);
        }

        let Some(date_text) = self.prompt("New date (YYYY-MM-DD): ")? else {
            return Ok(Flow::Closed);
        };
        if !date_text.is_empty() {
            match update.clone().date_text(&date_text) {
                Ok(with_date) => update = with_date,
                Err(_) => {
                    self.say(Tone::Error, "Invalid date format. Edit cancelled.")?;
                    return Ok(Flow::Continue);
                }
            }
        }

        let Some(note) = self.prompt("New note: ")? else {
            return Ok(Flow::Closed);
        };
        if !note.is_empty() {
            update = update.note(note);
        }

        match self.service.edit_expense(id, update) {
            Ok(_) => self.say(Tone::Success, "Expense updated.")?,
            Err(AppError::RecordNotFound(_)) => {
                self.say(Tone::Error, "No expense found with that ID.")?
            }
            Err(e) => self.say(Tone::Error, &format!("Edit rejected: {}", e))?,
        }
        Ok(Flow::Continue)
    }

    fn delete_expense(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== Delete Expense ===")?;

        if self.service.ledger().is_empty() {
            self.say(Tone::Error, "No expenses to delete.")?;
            return Ok(Flow::Continue);
        }

        self.list_all()?;
        let Some(choice) = self.prompt("Enter the ID to delete (or 'cancel'): ")? else {
            return Ok(Flow::Closed);
        };

        if choice.eq_ignore_ascii_case("cancel") {
            self.say(Tone::Warning, "Cancelled.")?;
            return Ok(Flow::Continue);
        }

        let Ok(id) = choice.parse::<RecordId>() else {
            self.say(Tone::Error, "Invalid input.")?;
            return Ok(Flow::Continue);
        };

        match self.service.delete_expense(id) {
            Ok(_) => self.say(Tone::Success, &format!("Expense {} deleted.", id))?,
            Err(_) => self.say(Tone::Error, "ID not found.")?,
        }
        Ok(Flow::Continue)
    }

    fn list_all(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== Expense List ===")?;

        if self.service.ledger().is_empty() {
            self.say(Tone::Warning, "No expenses recorded.")?;
            return Ok(Flow::Continue);
        }

        let table = expense_table(self.service.list_expenses());
        self.show(&table)?;
        Ok(Flow::Continue)
    }

    fn list_categories(&mut self) -> Result<()> {
        self.say(Tone::Title, "=== All Categories ===")?;

        let categories = self.service.categories();
        if categories.is_empty() {
            return self.say(Tone::Warning, "No categories found.");
        }
        for category in categories {
            self.say(Tone::Info, &format!("- {}", category))?;
        }
        Ok(())
    }

    fn list_by_category(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== List Expenses by Category ===")?;
        self.list_categories()?;

        let Some(category) = self.prompt("Enter category: ")? else {
            return Ok(Flow::Closed);
        };

        let matches = self.service.expenses_by_category(&category);
        if matches.is_empty() {
            self.say(Tone::Warning, "No expenses found for this category.")?;
            return Ok(Flow::Continue);
        }

        let table = expense_table(matches);
        self.show(&table)?;
        Ok(Flow::Continue)
    }

    fn list_by_date_range(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== List by Date Range ===")?;

        let Some(start) = self.prompt_date("Start date (YYYY-MM-DD): ")? else {
            return Ok(Flow::Closed);
        };
        let Some(end) = self.prompt_date("End date (YYYY-MM-DD): ")? else {
            return Ok(Flow::Closed);
        };

        let matches = self.service.expenses_between(start, end);
        if matches.is_empty() {
            self.say(Tone::Warning, "No expenses in this date range.")?;
            return Ok(Flow::Continue);
        }

        let table = expense_table(matches);
        self.show(&table)?;
        Ok(Flow::Continue)
    }

    fn monthly_summary(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== Monthly Summary ===")?;

        let report = match self.service.monthly_report() {
            Ok(report) => report,
            Err(e) => {
                self.say(Tone::Error, &format!("Cannot summarize: {}", e))?;
                return Ok(Flow::Continue);
            }
        };
        if report.is_empty() {
            self.say(Tone::Warning, "No expenses recorded.")?;
            return Ok(Flow::Continue);
        }

        self.show(&summary_table(&report))?;
        Ok(Flow::Continue)
    }

    fn show_total(&mut self) -> Result<Flow> {
        self.say(Tone::Title, "=== Total Amount ===")?;

        if self.service.ledger().is_empty() {
            self.say(Tone::Warning, "No expenses yet.")?;
            return Ok(Flow::Continue);
        }

        match self.service.total() {
            Ok(total) => {
                self.say(Tone::Info, &format!("Total: {}", display_cents(total)))?;
            }
            Err(e) => self.say(Tone::Error, &format!("Cannot total: {}", e))?,
        }
        Ok(Flow::Continue)
    }
}
