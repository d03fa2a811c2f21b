//! Terminal UI port.
//!
//! The reconciler talks to the terminal only through the [`Ui`] trait, so
//! the pipeline runs headless in tests with a scripted implementation.

use colored::Colorize;
use dialoguer::Confirm;

/// Panel a piece of content is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Info,
    Notice,
    Warning,
    Error,
    Table,
}

/// Rendering and confirmation capabilities the pipeline needs.
pub trait Ui {
    /// Render content into a panel.
    fn render(&self, panel: Panel, content: &str);

    /// Ask the user a yes/no question. `false` aborts the pipeline.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive terminal implementation.
pub struct TermUi;

impl TermUi {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TermUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for TermUi {
    fn render(&self, panel: Panel, content: &str) {
        match panel {
            Panel::Info => println!("{content}"),
            Panel::Notice => println!("{}", content.green()),
            Panel::Warning => println!("{}", content.yellow()),
            Panel::Error => eprintln!("{}", content.red().bold()),
            Panel::Table => println!("{content}"),
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
