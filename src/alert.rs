//! Error alerts shown in the page's alert container.
//!
//! Alerts are returned as HTML fragments that HTMX swaps into
//! `#alert-container` via `hx-target-error`.

use maud::{Markup, html};

/// A dismissible error message with a short summary and some details.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message: String,
    pub details: String,
}

impl Alert {
    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/alerts/#border-accent
        html!(
            div
                id="alert"
                role="alert"
                class="flex items-start p-4 mb-4 border-t-4 rounded shadow-lg
                    text-red-800 border-red-300 bg-red-50
                    dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            {
                span class="sr-only" { "Error" }

                div class="ms-3 text-sm"
                {
                    p class="font-semibold" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="mt-1" { (self.details) }
                    }
                }

                button
                    type="button"
                    aria-label="Close"
                    class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex
                        items-center justify-center h-8 w-8 hover:opacity-75"
                    onclick="this.closest('#alert').remove()"
                {
                    span class="sr-only" { "Close" }
                    "✕"
                }
            }
        )
    }
}
