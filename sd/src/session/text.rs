//! User-facing wording and choice lists

use crate::assembler::format_count;
use crate::events::Choice;

use super::state::Mode;

pub const CANCEL_CHOICE: &str = "cancel";

const ORIENTATION: &str = "This service filters a fixed text dataset for you.\n\
Pick a mode, answer its question, then say how many lines you want (a number or all). \
The matching lines come back as a file. Send /cancel at any time to stop.";

pub const LIMIT_QUESTION: &str = "Enter the maximum results (number or all):";

pub fn menu_choices() -> Vec<Choice> {
    Mode::ALL.iter().map(|m| Choice::new(m.choice_id(), m.title())).collect()
}

pub fn cancel_choices() -> Vec<Choice> {
    vec![Choice::new(CANCEL_CHOICE, "Cancel")]
}

/// Main menu text
pub fn menu(display_name: Option<&str>, corpus_ready: bool, first_visit: bool) -> String {
    let name = display_name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("User");
    let mut text = String::new();
    if first_visit {
        text.push_str(&format!("Welcome, {}!\n\n{}\n\n", name, ORIENTATION));
    } else {
        text.push_str(&format!("Welcome back, {}!\n\n", name));
    }
    text.push_str("Choose an operation:");
    if !corpus_ready {
        text.push_str("\n\nNote: the data file is unavailable. Modes 1, 2 and 3 will not work.");
    }
    text
}

/// Question asked when a mode needs a free-text parameter
pub fn parameter_prompt(mode: Mode) -> String {
    match mode {
        Mode::FilterBySiteName => format!(
            "Mode 1: {}\n\nEnter the site name (e.g. example or example.com). \
             Lines containing this name will be returned.",
            mode.title()
        ),
        _ => format!(
            "Mode 3: {}\n\nEnter the email, username or any text to search for (case-insensitive).",
            mode.title()
        ),
    }
}

pub fn site_limit_prompt(site: &str) -> String {
    format!("Searching for lines containing: {}\n{}", site, LIMIT_QUESTION)
}

pub fn common_limit_prompt(site_count: usize) -> String {
    format!(
        "Mode 2: {}\nFiltering for {} common domains.\n\n{}",
        Mode::FilterByCommonSites.title(),
        format_count(site_count),
        LIMIT_QUESTION
    )
}

pub fn term_limit_prompt(term: &str) -> String {
    format!("Searching for: {}\n{}", term, LIMIT_QUESTION)
}

/// Same prompt again with the error inlined
pub fn correction(base: &str, error: &str) -> String {
    format!("{}\n\n{}\nPlease try again:", base, error)
}

pub const EMPTY_SITE: &str = "Site name cannot be empty. Please enter a name (e.g. example).";
pub const EMPTY_TERM: &str = "Search term cannot be empty. Please enter text to search for.";
pub const INVALID_SELECTION: &str = "Invalid selection.";
pub const CORPUS_UNAVAILABLE: &str = "The data file couldn't be loaded. Modes 1-3 need this data.";
pub const NO_SITES: &str = "No common sites are configured for this mode.";
pub const CANCELLED: &str = "Operation cancelled.";

pub const UNEXPECTED_TEXT: &str = "Please choose an operation from the menu, or send /start to see it again.";
pub const UNEXPECTED_ATTACHMENT: &str =
    "Attachments are not expected here. Please respond to the prompt above or use /cancel to stop.";
pub const STALE_MENU: &str =
    "That menu is no longer active. Please respond to the prompt above or use /cancel to stop.";

pub const ANOTHER_OPERATION: &str = "Would you like to perform another operation?";
pub const FILE_SENT: &str = "File sent successfully!";
pub const FILE_NOT_SENT: &str = "Operation finished, but the results file could not be sent.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_first_visit_has_orientation() {
        let text = menu(Some("Ada"), true, true);
        assert!(text.starts_with("Welcome, Ada!"));
        assert!(text.contains("/cancel"));
        assert!(!text.contains("unavailable"));
    }

    #[test]
    fn test_menu_warns_when_corpus_missing() {
        let text = menu(None, false, false);
        assert!(text.starts_with("Welcome back, User!"));
        assert!(text.contains("data file is unavailable"));
    }

    #[test]
    fn test_menu_choices_cover_all_modes() {
        let ids: Vec<String> = menu_choices().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["mode_1", "mode_2", "mode_3"]);
    }

    #[test]
    fn test_correction_keeps_base() {
        let text = correction(&site_limit_prompt("netflix"), "Limit must be a positive number (e.g. 100).");
        assert!(text.starts_with("Searching for lines containing: netflix"));
        assert!(text.ends_with("Please try again:"));
    }
}
