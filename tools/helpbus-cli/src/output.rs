use std::sync::Arc;

use helpbus_core::planner::{DestinationSearch, Suggestions};
use helpbus_core::route_view::RouteView;
use helpbus_core::storage::{Favorite, RecentSearch};
use helpbus_core::transit::Line;

fn line_heading(line: &Line) -> String {
    format!("{:>5}  {}", line.number(), line.name())
}

pub fn print_lines(lines: &[Arc<Line>]) {
    if lines.is_empty() {
        println!("No lines in the catalog");
        return;
    }

    for line in lines {
        println!(
            "{}  [{}]  {} stops",
            line_heading(line),
            line.id(),
            line.stops().len()
        );
    }
}

pub fn print_suggestions(search: &DestinationSearch<'_>) {
    println!("Destination: {} ({})", search.destination.name, search.destination.position);

    match &search.suggestions {
        Suggestions::Nearby(matches) => {
            println!("Lines passing nearby:");
            for m in matches {
                match m.closest_stop() {
                    Some(closest) => println!(
                        "{}  {} at {:.0} m",
                        line_heading(m.line),
                        closest.stop.name,
                        m.nearest_distance
                    ),
                    None => println!("{}", line_heading(m.line)),
                }
            }
        }
        Suggestions::Fallback(lines) => {
            println!("No line stops close to the destination; all lines:");
            for line in lines.iter() {
                println!("{}", line_heading(line));
            }
        }
    }
}

pub fn print_view(view: &RouteView) {
    println!("{}  {}", view.title, view.name);
    println!("  {} → {}", view.origin, view.destination);
    println!("  Distance: {}   Time: {}", view.distance_text, view.time_text);
    println!("  Nearest stop: {}", view.nearest_stop_text);

    if view.next_stops.is_empty() {
        println!("  End of the line");
        return;
    }

    println!("  Next stops:");
    for stop in &view.next_stops {
        let marker = if stop.is_destination { "◉" } else { "○" };
        println!("    {} {}", marker, stop.name);
    }
}

pub fn print_recents(recents: &[RecentSearch]) {
    if recents.is_empty() {
        println!("No recent searches");
        return;
    }

    for recent in recents {
        if recent.line_number.is_empty() {
            println!("{} → {}", recent.origin, recent.destination);
        } else {
            println!("{} → {}  (line {})", recent.origin, recent.destination, recent.line_number);
        }
    }
}

pub fn print_favorites(favorites: &[Favorite]) {
    if favorites.is_empty() {
        println!("No favorite lines");
        return;
    }

    for favorite in favorites {
        println!("★ {}  {}  ({})", favorite.id, favorite.name, favorite.address);
    }
}
