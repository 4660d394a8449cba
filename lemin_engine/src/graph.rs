use crate::error::{LemInError, LemInResult};
use std::collections::HashMap;

/// Undirected graph of rooms connected by tunnels.
///
/// Neighbors are kept in the order their tunnels were declared, which is the
/// order the path search walks them in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoomGraph {
    rooms: Vec<String>,
    neighbors: HashMap<String, Vec<String>>,
    tunnels: usize,
}

impl RoomGraph {
    pub fn new() -> RoomGraph {
        RoomGraph::default()
    }

    /// Declares a new room.
    ///
    /// # Arguments
    /// * `name` - The unique identifier of the room.
    pub fn add_room(&mut self, name: &str) -> LemInResult<()> {
        if self.neighbors.contains_key(name) {
            return Err(LemInError::DuplicateRoom(name.to_string()));
        }

        self.rooms.push(name.to_string());
        self.neighbors.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Connects two previously declared rooms.
    ///
    /// # Arguments
    /// * `a` - One end of the tunnel.
    /// * `b` - The other end of the tunnel.
    pub fn add_tunnel(&mut self, a: &str, b: &str) -> LemInResult<()> {
        if a == b {
            return Err(LemInError::SelfLoop(a.to_string()));
        }

        for room in [a, b] {
            if !self.contains(room) {
                return Err(LemInError::UnknownRoom(room.to_string()));
            }
        }

        if self.has_tunnel(a, b) {
            return Err(LemInError::DuplicateTunnel(a.to_string(), b.to_string()));
        }

        // Both rooms were checked above
        if let Some(links) = self.neighbors.get_mut(a) {
            links.push(b.to_string());
        }
        if let Some(links) = self.neighbors.get_mut(b) {
            links.push(a.to_string());
        }
        self.tunnels += 1;

        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.neighbors.contains_key(name)
    }

    /// The rooms connected to `name`, in tunnel declaration order.
    /// Unknown rooms have no neighbors.
    pub fn neighbors(&self, name: &str) -> &[String] {
        self.neighbors
            .get(name)
            .map(|links| links.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_tunnel(&self, a: &str, b: &str) -> bool {
        self.neighbors(a).iter().any(|room| room == b)
    }

    /// All rooms in declaration order.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn tunnel_count(&self) -> usize {
        self.tunnels
    }
}
