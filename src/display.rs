use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::cards::{simplify_hand, Card, Rank, Suit};
use crate::equity::Equities;
use crate::hand_evaluator::HandRank;

/// `equity` is a fraction in 0..=1.
pub fn equity_bar(equity: f64, width: usize) -> String {
    let equity = equity.clamp(0.0, 1.0);
    let filled = (equity * width as f64) as usize;
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.2}%", equity * 100.0);

    if equity >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if equity >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

pub fn board_display(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "(preflop)".dimmed().to_string();
    }
    cards
        .iter()
        .map(|card| {
            let text = card.pretty();
            match card.suit {
                Suit::Spades => text.white().to_string(),
                Suit::Hearts => text.red().to_string(),
                Suit::Diamonds => text.blue().to_string(),
                Suit::Clubs => text.green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row per player: hand, win, tie, equity. Percentages to two decimals.
pub fn equity_table(hands: &[Vec<Card>], result: &Equities) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Player"),
        Cell::new("Hand"),
        Cell::new("Win").set_alignment(CellAlignment::Right),
        Cell::new("Tie").set_alignment(CellAlignment::Right),
        Cell::new("Equity").set_alignment(CellAlignment::Right),
    ]);

    for (i, (hand, player)) in hands.iter().zip(&result.players).enumerate() {
        let label = simplify_hand(hand).unwrap_or_default();
        table.add_row(vec![
            Cell::new(format!("Player {}", i + 1).bold().to_string()),
            Cell::new(format!("{} {}", board_display(hand), label.dimmed())),
            Cell::new(format!("{:.2}%", player.win)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", player.tie)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", player.equity).bold().to_string())
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

pub fn rank_table(cards: &[Card], rank: HandRank) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new("Cards".bold().to_string()),
        Cell::new(board_display(cards)),
    ]);
    table.add_row(vec![
        Cell::new("Hand".bold().to_string()),
        Cell::new(rank.to_string().green().bold().to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Category".bold().to_string()),
        Cell::new(rank.category().to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Kickers".bold().to_string()),
        Cell::new(
            rank.kickers()
                .into_iter()
                .filter_map(Rank::from_value)
                .map(|r| r.to_char().to_string())
                .collect::<Vec<_>>()
                .join(" "),
        ),
    ]);
    table.to_string()
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("  {}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg);
}
