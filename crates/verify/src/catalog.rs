//! Built-in scenarios for the bill book application

use crate::assertion::{Expectation, Locator};
use crate::scenario::{Scenario, Step};

/// Footer text mixing Latin and Devanagari across several lines
pub const FOOTER_MESSAGE: &str = "Terms & Conditions:\n1. Goods once sold will not be taken back.\n2. यह एक कंप्यूटर जनित बिल है।";

/// Requests that persist bill settings
pub const SETTINGS_WRITE: &str = "**/rest/v1/bill_settings*";

/// Toast title shown once settings are stored
pub const SAVED_TOAST: &str = "Settings Updated";

/// Every built-in scenario, in run order
pub fn all() -> Vec<Scenario> {
    vec![
        bills_table(),
        home_content(),
        bill_book_flow(),
        history_search(),
        shopkeeper_search(),
        footer_settings(),
    ]
}

fn navigate(url: &str) -> Step {
    Step::Navigate { url: url.into(), wait_for: None }
}

fn navigate_until(url: &str, locator: Locator) -> Step {
    Step::Navigate { url: url.into(), wait_for: Some(locator) }
}

fn assert(locator: Locator, expect: Expectation) -> Step {
    Step::Assert { locator, expect, timeout_ms: None }
}

fn screenshot(name: &str) -> Step {
    Step::Screenshot { name: name.into(), full_page: true }
}

/// Today's bills table renders the compact column set
pub fn bills_table() -> Scenario {
    Scenario::new("bills-table")
        .describe("Today's bills table shows S.No. and customer, hides Paid and Bill #")
        .tag("home")
        .tag("stubbed")
        .with_fixtures()
        .authenticated()
        .step(navigate("/"))
        .step(Step::Assert {
            locator: Locator::role("heading", "Today's Bills").first(),
            expect: Expectation::Visible,
            timeout_ms: Some(10_000),
        })
        .step(assert(Locator::role("columnheader", "S.No."), Expectation::Visible))
        .step(assert(Locator::role("columnheader", "Paid"), Expectation::Hidden))
        .step(assert(Locator::role("columnheader", "Bill #"), Expectation::Hidden))
        .step(assert(Locator::role("cell", "1").exact(), Expectation::Visible))
        .step(assert(Locator::role("cell", "Test Customer"), Expectation::Visible))
        .step(assert(Locator::role("row", "Test Customer"), Expectation::Count { count: 1 }))
        .step(screenshot("verification"))
}

/// Raw page content carries the new header and not the old one
pub fn home_content() -> Scenario {
    Scenario::new("home-content")
        .describe("Home page markup contains S.No. and no Bill # header")
        .tag("home")
        .tag("stubbed")
        .with_fixtures()
        .authenticated()
        .step(navigate("/"))
        .step(Step::Settle { timeout_ms: None })
        .step(Step::PageContains { text: "S.No.".into() })
        .step(Step::PageLacks { text: "Bill #".into() })
        .step(screenshot("debug"))
}

/// Login, reports chart, ledger, new bill search and pre-filled new bill
pub fn bill_book_flow() -> Scenario {
    Scenario::new("bill-book-flow")
        .describe("Bill book pages after an interactive login")
        .tag("bill-book")
        .tag("login")
        .step(Step::Login { timeout_ms: Some(30_000) })
        .step(Step::Log { message: "Logged in".into() })
        .step(navigate("/bill-book/reports"))
        .step(Step::Assert {
            locator: Locator::text("Product Sales (Quantity)"),
            expect: Expectation::Visible,
            timeout_ms: Some(30_000),
        })
        .step(Step::Screenshot { name: "1_reports_chart".into(), full_page: false })
        .step(navigate("/bill-book/ledger"))
        .step(Step::Assert {
            locator: Locator::text("Customer Ledger"),
            expect: Expectation::Visible,
            timeout_ms: Some(30_000),
        })
        .step(Step::Screenshot { name: "2_ledger_buttons".into(), full_page: false })
        .step(navigate("/bill-book/new"))
        .step(Step::Click {
            locator: Locator::css("button[title='Search Existing Customer']"),
            timeout_ms: None,
            wait_for_response: None,
        })
        .step(Step::Fill {
            locator: Locator::css("input[placeholder='Search customer...']"),
            value: "a".into(),
        })
        // the customer list filters in place; wait for it to render
        .step(Step::WaitFor {
            locator: Locator::css("[cmdk-list]"),
            state: Default::default(),
            timeout_ms: None,
        })
        .step(Step::Screenshot { name: "3_new_bill_search".into(), full_page: false })
        .step(navigate("/bill-book/new?customerId=test-id-123"))
        .step(assert(Locator::text("Create New Bill"), Expectation::Visible))
        .step(Step::Screenshot { name: "4_new_bill_param".into(), full_page: false })
}

/// Debounced search on the bill history page
pub fn history_search() -> Scenario {
    Scenario::new("history-search")
        .describe("Bill history search filters to the matching bill")
        .tag("bill-book")
        .tag("search")
        .tag("stubbed")
        .with_fixtures()
        .authenticated()
        .step(navigate_until(
            "/bill-book/history",
            Locator::css("h1:has-text('All Bills / History')"),
        ))
        .step(Step::Fill {
            locator: Locator::placeholder("Search by customer, bill number, or date..."),
            value: "Test Customer".into(),
        })
        .step(assert(
            Locator::placeholder("Search by customer, bill number, or date..."),
            Expectation::HasValue { value: "Test Customer".into() },
        ))
        .step(assert(Locator::role("row", "Test Customer"), Expectation::Count { count: 1 }))
        .step(screenshot("history_page_debounced"))
}

/// Search box on the shopkeepers page
pub fn shopkeeper_search() -> Scenario {
    Scenario::new("shopkeeper-search")
        .describe("Shopkeepers page exposes a working search input")
        .tag("shopkeepers")
        .tag("search")
        .tag("stubbed")
        .with_fixtures()
        .authenticated()
        .step(navigate("/shopkeepers"))
        .step(Step::WaitFor {
            locator: Locator::text("Shopkeepers").first(),
            state: Default::default(),
            timeout_ms: Some(10_000),
        })
        .step(assert(Locator::placeholder("Search by name..."), Expectation::Visible))
        .step(Step::Fill {
            locator: Locator::placeholder("Search by name..."),
            value: "Test Shopkeeper".into(),
        })
        .step(assert(
            Locator::placeholder("Search by name..."),
            Expectation::HasValue { value: "Test Shopkeeper".into() },
        ))
        .step(screenshot("shopkeepers_search"))
}

/// Footer message survives a save and reload unchanged
pub fn footer_settings() -> Scenario {
    let footer = Locator::css("textarea#footer_message");
    Scenario::new("footer-settings")
        .describe("Bill footer with Devanagari text persists across reload")
        .tag("bill-book")
        .tag("login")
        .tag("settings")
        .step(Step::Login { timeout_ms: Some(10_000) })
        .step(navigate_until("/bill-book/settings", footer.clone()))
        .step(Step::Fill { locator: footer.clone(), value: FOOTER_MESSAGE.into() })
        .step(Step::Click {
            locator: Locator::css("button:has-text('Save Settings')"),
            timeout_ms: None,
            wait_for_response: Some(SETTINGS_WRITE.into()),
        })
        .step(Step::WaitFor {
            locator: Locator::text(SAVED_TOAST).first(),
            state: Default::default(),
            timeout_ms: None,
        })
        .step(screenshot("settings_page"))
        .step(Step::Reload { wait_for: Some(footer.clone()) })
        .step(assert(footer, Expectation::HasValue { value: FOOTER_MESSAGE.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_valid() {
        let scenarios = all();
        assert_eq!(scenarios.len(), 6);
        for s in &scenarios {
            s.validate().unwrap();
        }
        let names: HashSet<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_screenshot_names_are_unique() {
        let mut seen = HashSet::new();
        for s in all() {
            for step in &s.steps {
                if let Step::Screenshot { name, .. } = step {
                    assert!(seen.insert(name.clone()), "duplicate screenshot {}", name);
                }
            }
        }
    }

    #[test]
    fn test_bills_table_expectations() {
        let s = bills_table();
        assert!(s.fixtures && s.authenticated);
        let hidden: Vec<_> = s
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Assert { locator, expect: Expectation::Hidden, .. } => Some(locator.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(hidden, vec!["columnheader \"Paid\"", "columnheader \"Bill #\""]);
    }

    #[test]
    fn test_footer_round_trip_compares_full_value() {
        let s = footer_settings();
        let last = s.steps.last().unwrap();
        assert_eq!(
            last,
            &Step::Assert {
                locator: Locator::css("textarea#footer_message"),
                expect: Expectation::HasValue { value: FOOTER_MESSAGE.into() },
                timeout_ms: None,
            }
        );
        assert!(FOOTER_MESSAGE.contains('\n'));
        assert!(FOOTER_MESSAGE.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)));
    }

    #[test]
    fn test_bills_table_expects_one_customer_row() {
        let s = bills_table();
        assert!(s.steps.contains(&Step::Assert {
            locator: Locator::role("row", "Test Customer"),
            expect: Expectation::Count { count: 1 },
            timeout_ms: None,
        }));
    }

    /// Steps that only wait for network idle prove nothing after an
    /// interaction on a loaded page
    #[test]
    fn test_no_settle_after_interaction() {
        for s in all() {
            for pair in s.steps.windows(2) {
                if matches!(pair[1], Step::Settle { .. }) {
                    assert!(
                        !matches!(pair[0], Step::Click { .. } | Step::Fill { .. } | Step::Press { .. }),
                        "{}: settle after {}",
                        s.name,
                        pair[0].label()
                    );
                }
            }
        }
    }

    #[test]
    fn test_footer_save_waits_for_write_and_toast() {
        let steps = footer_settings().steps;
        let save = steps
            .iter()
            .position(|s| matches!(s, Step::Click { wait_for_response: Some(p), .. } if p == SETTINGS_WRITE))
            .unwrap();
        let toast = steps
            .iter()
            .position(|s| matches!(s, Step::WaitFor { locator, .. } if *locator == Locator::text(SAVED_TOAST).first()))
            .unwrap();
        let reload = steps.iter().position(|s| matches!(s, Step::Reload { .. })).unwrap();
        assert!(save < toast && toast < reload);
    }
}
