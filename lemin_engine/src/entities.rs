use crossterm::style::Color;
use serde::Serialize;

/// A room of the colony as declared in the colony file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Room {
    pub name: String,
    pub x: i64,
    pub y: i64,
}

impl Room {
    pub fn new(name: &str, x: i64, y: i64) -> Room {
        Room {
            name: name.to_string(),
            x,
            y,
        }
    }
}

/// The role a room plays in the colony.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoomKind {
    Start,
    End,
    Tunnel,
}

impl RoomKind {
    pub fn char(&self) -> char {
        match self {
            RoomKind::Start => 'S',
            RoomKind::End => 'E',
            RoomKind::Tunnel => 'o',
        }
    }

    pub fn color(&self) -> Color {
        match self {
            RoomKind::Start => Color::Green,
            RoomKind::End => Color::Red,
            RoomKind::Tunnel => Color::Grey,
        }
    }
}

/// An ant walking one route of the chosen group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ant {
    number: usize,
    route: usize,
    position: usize,
}

impl Ant {
    /// Creates an ant waiting in the start room.
    ///
    /// # Arguments
    /// * `number` - The admission number, 1 for the first ant admitted.
    /// * `route` - The index of the route in the group the ant walks.
    pub fn new(number: usize, route: usize) -> Ant {
        Ant {
            number,
            route,
            position: 0,
        }
    }

    /// The display identifier, e.g. `L3`.
    pub fn id(&self) -> String {
        format!("L{}", self.number)
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn route(&self) -> usize {
        self.route
    }

    /// Index of the next room along the route (the start room is not counted).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }
}

pub fn ant_to_color(number: usize) -> Color {
    // Colors cycle since colonies can hold any number of ants
    match number % 10 {
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Blue,
        4 => Color::Yellow,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::DarkRed,
        8 => Color::DarkGreen,
        9 => Color::DarkMagenta,
        _ => Color::DarkYellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_creating_an_ant_it_waits_at_the_start_of_its_route() {
        let ant = Ant::new(3, 1);

        assert_eq!(ant.id(), "L3");
        assert_eq!(ant.route(), 1);
        assert_eq!(ant.position(), 0);
    }

    #[test]
    fn when_advancing_an_ant_its_position_moves_one_room_forward() {
        let mut ant = Ant::new(1, 0);
        ant.advance();
        ant.advance();

        assert_eq!(ant.position(), 2);
    }

    #[test]
    fn when_coloring_ants_the_colors_cycle_every_ten_ants() {
        assert_eq!(ant_to_color(1), ant_to_color(11));
        assert_ne!(ant_to_color(1), ant_to_color(2));
    }
}
