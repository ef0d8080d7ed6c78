//! Terminal rendering for the CLI.

use std::io::{self, IsTerminal};

use rumin::models::{Hostel, Listing, Room};
use rumin::notify::{Level, Notifications, Notifier, TracingNotifier};
use rumin::pipeline::{RenderState, SearchPage};

/// One-line summary plus a detail view, per listing type.
pub trait Row: Listing {
    fn summary(&self) -> String;

    fn details(&self) -> Vec<(&'static str, String)>;
}

impl Row for Room {
    fn summary(&self) -> String {
        format!(
            "{} · {} · ₹{}/month · {}",
            self.title, self.bhk, self.price, self.address
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("Type", self.bhk.clone()),
            ("Rent", format!("₹{}/month", self.price)),
            ("Address", self.address.to_string()),
            ("Status", self.status.to_string()),
            ("Amenities", self.amenities.join(", ")),
            ("Views", self.views.to_string()),
            ("Photos", self.images.len().to_string()),
            ("Description", self.description.clone()),
        ]
    }
}

impl Row for Hostel {
    fn summary(&self) -> String {
        format!(
            "{} · {} · ₹{}/month · {}/{} beds free · {}",
            self.title,
            self.hostel_type,
            self.price,
            self.available_beds,
            self.total_beds,
            self.address
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.clone()),
            ("Type", self.hostel_type.clone()),
            ("Rent", format!("₹{}/month", self.price)),
            (
                "Beds",
                format!("{} of {} available", self.available_beds, self.total_beds),
            ),
            ("Address", self.address.to_string()),
            ("Status", self.status.to_string()),
            ("Amenities", self.amenities.join(", ")),
            ("Views", self.views.to_string()),
            ("Photos", self.images.len().to_string()),
            ("Description", self.description.clone()),
        ]
    }
}

pub fn print_page<L: Row>(page: &SearchPage<L>) {
    let kind = L::KIND;
    match page.render_state() {
        RenderState::Loading => println!("Loading {}s…", kind),
        RenderState::Failed(message) => println!("Could not load {kind}s: {message}"),
        RenderState::Empty if page.filters().is_empty() => println!("No {kind}s listed yet."),
        RenderState::Empty => println!("No {kind}s found. Try widening your filters."),
        RenderState::Results {
            shown,
            total,
            exhausted,
        } => {
            for (i, listing) in page.visible().iter().enumerate() {
                println!("{:>3}. {}", i + 1, listing.summary());
                println!("     [{}] {}", listing.status(), listing.id());
            }
            println!();
            if exhausted {
                println!("You've seen all {total} {kind}s");
            } else {
                println!("Showing {shown} of {total} {kind}s (use --pages to see more)");
            }
        }
    }
}

pub fn print_details<L: Row>(listing: &L) {
    println!("{}\n", listing.title());
    for (label, value) in listing.details() {
        if !value.is_empty() {
            println!("{label:>12}: {value}");
        }
    }
    if let Some(cover) = listing.cover_image() {
        println!("{:>12}: {cover}", "Cover");
    }
}

/// Print and clear pending notifications. When stderr is not a terminal
/// they go to the log instead.
pub fn flush(notes: &Notifications) {
    let interactive = io::stderr().is_terminal();
    for note in notes.drain() {
        if !interactive {
            TracingNotifier.notify(note);
            continue;
        }
        match note.level {
            Level::Error => eprintln!("✗ {}", note.message),
            Level::Success => eprintln!("✓ {}", note.message),
            Level::Info => eprintln!("• {}", note.message),
        }
    }
}
