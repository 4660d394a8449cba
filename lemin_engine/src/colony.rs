use crate::entities::{Room, RoomKind};
use crate::error::{LemInError, LemInResult};
use crate::graph::RoomGraph;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static ROOM_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)$").unwrap());
static TUNNEL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s]*-[^\s]*$").unwrap());

/// A parsed colony: the ants to move, the rooms and the tunnels between them.
#[derive(Clone, Debug, PartialEq)]
pub struct Colony {
    ants: usize,
    rooms: Vec<Room>,
    tunnels: Vec<(String, String)>,
    graph: RoomGraph,
    start: String,
    end: String,
    contents: String,
}

/// Which room the next room line declares.
enum Mark {
    Room,
    Start,
    End,
}

impl Colony {
    /// Parses a colony from the contents of a colony file.
    ///
    /// The first line holds the number of ants, followed by rooms (`name x y`),
    /// tunnels (`a-b`), comments (`#...`) and the `##start` / `##end` commands
    /// marking the room declared right after them.
    pub fn parse(contents: &str) -> LemInResult<Colony> {
        let contents = contents.replace("\r\n", "\n");
        let mut lines = contents.lines().enumerate();

        let ants = match lines.next() {
            Some((_, line)) if !line.trim().is_empty() => parse_ant_count(line.trim())?,
            _ => return Err(LemInError::EmptyInput),
        };

        let mut graph = RoomGraph::new();
        let mut rooms = Vec::new();
        let mut tunnels = Vec::new();
        let mut start = None;
        let mut end = None;
        let mut mark = Mark::Room;

        for (index, raw) in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix("##") {
                match command.trim() {
                    "start" => mark = Mark::Start,
                    "end" => mark = Mark::End,
                    // Unknown commands are ignored
                    _ => {}
                }
                continue;
            }

            if line.starts_with('#') {
                continue;
            }

            if let Some(captures) = ROOM_LINE.captures(line) {
                let room = parse_room(line, &captures[1], &captures[2], &captures[3])?;
                graph.add_room(&room.name)?;

                match mark {
                    Mark::Start => start = Some(room.name.clone()),
                    Mark::End => end = Some(room.name.clone()),
                    Mark::Room => {}
                }
                mark = Mark::Room;

                rooms.push(room);
                continue;
            }

            if TUNNEL_LINE.is_match(line) {
                let (a, b) = parse_tunnel(line)?;
                graph.add_tunnel(&a, &b)?;
                tunnels.push((a, b));
                continue;
            }

            return Err(LemInError::UnrecognizedLine {
                line_number: index + 1,
                line: line.to_string(),
            });
        }

        let start = start.ok_or(LemInError::MissingStart)?;
        let end = end.ok_or(LemInError::MissingEnd)?;

        debug!(
            ants,
            rooms = rooms.len(),
            tunnels = tunnels.len(),
            %start,
            %end,
            "Parsed colony"
        );

        Ok(Colony {
            ants,
            rooms,
            tunnels,
            graph,
            start,
            end,
            contents,
        })
    }

    /// Reads and parses a colony file. Only `.txt` files are accepted.
    pub fn load(path: impl AsRef<Path>) -> LemInResult<Colony> {
        let path = path.as_ref();
        if path.extension().is_none_or(|extension| extension != "txt") {
            return Err(LemInError::InvalidExtension(path.display().to_string()));
        }

        let contents = fs::read_to_string(path)?;
        Colony::parse(&contents)
    }

    pub fn ants(&self) -> usize {
        self.ants
    }

    /// The rooms in declaration order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.name == name)
    }

    /// The tunnels in declaration order.
    pub fn tunnels(&self) -> &[(String, String)] {
        &self.tunnels
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn kind(&self, name: &str) -> RoomKind {
        if name == self.start {
            RoomKind::Start
        } else if name == self.end {
            RoomKind::End
        } else {
            RoomKind::Tunnel
        }
    }

    /// The colony file as it was read, with line endings normalised.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

fn parse_ant_count(line: &str) -> LemInResult<usize> {
    match line.parse::<usize>() {
        Ok(ants) if ants > 0 => Ok(ants),
        _ => Err(LemInError::InvalidAntCount(line.to_string())),
    }
}

fn parse_room(line: &str, name: &str, x: &str, y: &str) -> LemInResult<Room> {
    // `L` prefixes ant identifiers in the output and `#` starts comments
    if name.starts_with('L') || name.starts_with('#') {
        return Err(LemInError::InvalidRoom(line.to_string()));
    }

    match (x.parse::<i64>(), y.parse::<i64>()) {
        (Ok(x), Ok(y)) => Ok(Room::new(name, x, y)),
        _ => Err(LemInError::InvalidRoom(line.to_string())),
    }
}

fn parse_tunnel(line: &str) -> LemInResult<(String, String)> {
    let parts: Vec<&str> = line.split('-').collect();
    match parts.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(LemInError::InvalidTunnel(line.to_string())),
    }
}
