use std::{
    io::{self, Write},
    time::Instant,
};

use itertools::Itertools;
use regex::Regex;
use types::{Placement, PlacementStrategy, PlacementView};

/// Asks a human on stdin.
#[derive(Debug, Default)]
pub struct InputStrategy {}

impl PlacementStrategy for InputStrategy {
    fn select_placement(&mut self, view: &PlacementView) -> Placement {
        print_view(view);

        let started = Instant::now();
        let mut buf = String::new();
        loop {
            match select_placement_from_stdin(&mut buf, view) {
                Ok((card_idx, position)) => {
                    return Placement {
                        card_id: view.hand[card_idx].id.clone(),
                        position,
                        time_taken: started.elapsed().as_secs() as u32,
                    };
                }
                Err(err) => {
                    buf.clear();
                    log::error!("Error parsing message from stdin: {err}")
                }
            }
        }
    }
}

fn print_view(view: &PlacementView) {
    let base = view.position_base;
    println!(
        "Timeline: {}",
        view.timeline
            .iter()
            .enumerate()
            .map(|(idx, card)| format!("[{}] {card}", idx + base))
            .join("  ")
    );
    println!(
        "Hand: {}",
        view.hand
            .iter()
            .enumerate()
            .map(|(idx, card)| format!("({}) {}", idx + 1, card.title))
            .join("  ")
    );
    let range = view.slot_range();
    println!("Positions run from {} to {}", range.start(), range.end());
}

fn select_placement_from_stdin(
    buf: &mut String,
    view: &PlacementView,
) -> Result<(usize, usize), String> {
    print!("Place which card where? (e.g. `2 at 3`) >> ");
    let _ = io::stdout().flush();
    match io::stdin().read_line(buf) {
        Ok(_) => select_placement_from_str(buf, view),
        Err(err) => Err(format!("Error reading line from stdin: {err}")),
    }
}

/// Parses `<card> at <position>` (or just `<card> <position>`), where card is
/// the 1-based hand number or a card id. Returns the hand index and position.
fn select_placement_from_str(input: &str, view: &PlacementView) -> Result<(usize, usize), String> {
    let re = Regex::new(r"^\s*(?:place\s+)?(?<card>\S+)\s+(?:at\s+)?(?<pos>\d+)\s*$")
        .expect("Valid placement regex");
    let input = input.to_lowercase();
    let Some(caps) = re.captures(&input) else {
        return Err(format!("Unable to parse a placement from string: {input:?}"));
    };

    let card_str = caps.name("card").expect("card is a required group").as_str();
    let card_idx = match card_str.parse::<usize>() {
        Ok(n) if (1..=view.hand.len()).contains(&n) => n - 1,
        Ok(n) => return Err(format!("No card number {n} in hand")),
        Err(_) => view
            .hand
            .iter()
            .position(|card| card.id.as_str().to_lowercase() == card_str)
            .ok_or_else(|| format!("No card {card_str:?} in hand"))?,
    };

    let position: usize = caps
        .name("pos")
        .expect("pos is a required group")
        .as_str()
        .parse()
        .map_err(|err| format!("Bad position: {err}"))?;
    if !view.slot_range().contains(&position) {
        let range = view.slot_range();
        return Err(format!(
            "Position {position} is outside {}..={}",
            range.start(),
            range.end()
        ));
    }

    Ok((card_idx, position))
}
