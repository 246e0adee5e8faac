//! The command interpreter: turns a token list into narrative text.
//!
//! Everything here is synchronous and local to one session. The only
//! command that needs the hub, `take`, comes back as a plan for the caller
//! to confirm before anything moves.

use crossroads_core::item::ItemRecord;

use super::fixtures::FixtureOutcome;
use super::grammar::PlayerCommand;
use super::rooms::{ExitResolution, RoomGraph};
use super::session::{Placement, Session};

pub const UNKNOWN_COMMAND: &str = "I don't know how to do that.";
pub const NO_EXIT: &str = "You can't go that way from here.";

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Reply(String),
    /// A take the hub has to approve before the item moves.
    Take { record: ItemRecord, query: String },
}

/// The uniform answer to any take that did not happen.
#[must_use]
pub fn take_refusal(query: &str) -> String {
    format!("There's no {query} here to take")
}

#[must_use]
pub fn taken(name: &str) -> String {
    format!("{name} was taken.")
}

/// Interprets one command for `session`.
pub fn interpret(session: &mut Session, graph: &RoomGraph, tokens: &[String]) -> Interpretation {
    let command = PlayerCommand::parse(tokens);
    let reply = match command {
        PlayerCommand::Look => {
            let here = session.location().to_owned();
            describe_room(session, graph, &here, true)
        }
        PlayerCommand::LookAt(target) => look_at(session, graph, target),
        PlayerCommand::Take(target) => return take(session, target),
        PlayerCommand::Go(direction) => go(session, graph, direction),
        other => fixture_command(session, graph, other)
            .or_else(|| read_sign(session, graph, other))
            .unwrap_or_else(|| item_verb(session, other)),
    };
    Interpretation::Reply(reply)
}

/// Room header plus every visible item. `long` selects the full description.
#[must_use]
pub fn describe_room(session: &Session, graph: &RoomGraph, room: &str, long: bool) -> String {
    let Some(spec) = graph.room(room) else {
        return String::new();
    };
    let mut lines = Vec::new();
    if long {
        lines.push(spec.description.clone());
        if let Some(interior) = open_interior(session, graph, room) {
            lines.push(interior.to_owned());
        }
    } else {
        lines.push(spec.name.clone());
    }
    lines.extend(inside_lines(session, graph, room));
    lines.extend(
        session
            .items_placed(room, Placement::Here)
            .into_iter()
            .map(|record| format!("There is a {} <sub>{}</sub> here.", record.name, record.id)),
    );
    lines.join("\n")
}

fn open_interior<'g>(session: &Session, graph: &'g RoomGraph, room: &str) -> Option<&'g str> {
    let spec = graph.puzzle(room)?;
    let open = session
        .room(room)
        .and_then(|state| state.puzzle.as_ref())
        .is_some_and(|puzzle| puzzle.is_open());
    open.then_some(spec.texts.interior.as_str())
}

fn inside_lines(session: &Session, graph: &RoomGraph, room: &str) -> Vec<String> {
    let Some(spec) = graph.puzzle(room) else {
        return Vec::new();
    };
    session
        .items_placed(room, Placement::Inside)
        .into_iter()
        .map(|record| {
            format!(
                "There is a {} <sub>{}</sub> inside the {}.",
                record.name, record.id, spec.container
            )
        })
        .collect()
}

/// First item in the current room that answers to `query` and can be seen.
fn find_visible<'s>(session: &'s Session, query: &str) -> Option<&'s ItemRecord> {
    let here = session.location();
    session
        .items_placed(here, Placement::Inside)
        .into_iter()
        .chain(session.items_placed(here, Placement::Here))
        .find(|record| record.answers_to(query))
}

fn look_at(session: &Session, graph: &RoomGraph, target: &str) -> String {
    let here = session.location();
    let puzzle = graph
        .puzzle(here)
        .zip(session.room(here).and_then(|state| state.puzzle.as_ref()));
    if let Some((spec, state)) = puzzle {
        if target == spec.container {
            let mut lines = vec![state.container_text(&spec.texts).to_owned()];
            if state.is_open() {
                lines.push(spec.texts.interior.clone());
                lines.extend(inside_lines(session, graph, here));
            }
            return lines.join("\n");
        }
        if target == spec.display {
            return state.display_text(&spec.texts).to_owned();
        }
        if target == spec.switch {
            return state
                .switch_text(&spec.texts)
                .unwrap_or(UNKNOWN_COMMAND)
                .to_owned();
        }
    }

    session
        .find_held(target)
        .or_else(|| find_visible(session, target))
        .map_or_else(|| UNKNOWN_COMMAND.to_owned(), |record| record.description.clone())
}

fn take(session: &Session, target: &str) -> Interpretation {
    match find_visible(session, target) {
        Some(record) => Interpretation::Take {
            record: record.clone(),
            query: target.to_owned(),
        },
        None => Interpretation::Reply(take_refusal(target)),
    }
}

fn go(session: &mut Session, graph: &RoomGraph, direction: &str) -> String {
    match graph.exit(session.location(), direction) {
        None => NO_EXIT.to_owned(),
        Some(ExitResolution::CrossDomainSignal(towards)) => format!("$journey {towards}"),
        Some(ExitResolution::ToRoom(room)) => {
            let first_visit = session.move_to(&room);
            describe_room(session, graph, &room, first_visit)
        }
    }
}

/// Container, switch and display commands in the room that hosts them.
fn fixture_command(
    session: &mut Session,
    graph: &RoomGraph,
    command: PlayerCommand<'_>,
) -> Option<String> {
    let here = session.location().to_owned();
    let spec = graph.puzzle(&here)?;
    let holding_key = session.holds_item_named(&spec.key_item);
    let state = session.room_mut(&here)?.puzzle.as_mut()?;

    let outcome = match command {
        PlayerCommand::Verb {
            verb: "open",
            target,
        } if target == spec.container => state.open(),
        PlayerCommand::Verb {
            verb: "close",
            target,
        } if target == spec.container => state.close(),
        PlayerCommand::Verb { verb: "use", target } if target == spec.switch => {
            state.flip_switch()
        }
        PlayerCommand::UseOn { item, target }
            if item == spec.key_item && target == spec.container =>
        {
            state.turn_key(holding_key)
        }
        PlayerCommand::Tell { target, word } if target == spec.display => {
            state.tell(word, &spec.password)
        }
        _ => return None,
    };

    let text = outcome.text(&spec.texts)?;
    if outcome == FixtureOutcome::Opened {
        let mut lines = vec![text, spec.texts.interior.clone()];
        lines.extend(inside_lines(session, graph, &here));
        return Some(lines.join("\n"));
    }
    Some(text)
}

fn read_sign(session: &Session, graph: &RoomGraph, command: PlayerCommand<'_>) -> Option<String> {
    let PlayerCommand::Verb {
        verb: "read",
        target,
    } = command
    else {
        return None;
    };
    graph
        .room(session.location())?
        .signs
        .get(target)
        .cloned()
}

/// `<verb> <item>` for an item the user holds.
fn item_verb(session: &Session, command: PlayerCommand<'_>) -> String {
    let PlayerCommand::Verb { verb, target } = command else {
        return UNKNOWN_COMMAND.to_owned();
    };
    session
        .find_held(target)
        .and_then(|record| record.verb_response(verb))
        .unwrap_or(UNKNOWN_COMMAND)
        .to_owned()
}
