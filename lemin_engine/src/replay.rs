use crate::colony::Colony;
use crate::error::LemInResult;
use crate::schedule::Schedule;
use serde_json::json;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
};
use tracing::info;
use uuid::Uuid;

pub fn create_replay_logger(filename: Option<String>, colony: &Colony) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(filename, colony)),
    }
}

pub trait ReplayLogger: Send + Sync {
    #[allow(unused_variables)]
    fn log_plan(&mut self, routes: Vec<Vec<String>>, schedule: Schedule) {}

    #[allow(unused_variables)]
    fn log_turn(&mut self, turn: usize, active: usize, waiting: usize, arrived: usize) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, turn: usize, event: Event) {}

    fn clear(&mut self) {}

    fn save(&self) -> LemInResult<()> {
        Ok(())
    }

    fn log_spawn_ant(&mut self, turn: usize, id: String, route: usize) {
        self.log_event(
            turn,
            Event {
                event_type: EventType::Spawn,
                ant: id,
                route: Some(route),
                room: None,
            },
        );
    }

    fn log_move_ant(&mut self, turn: usize, id: String, room: String) {
        self.log_event(
            turn,
            Event {
                event_type: EventType::Move,
                ant: id,
                route: None,
                room: Some(room),
            },
        );
    }

    fn log_arrive_ant(&mut self, turn: usize, id: String, room: String) {
        self.log_event(
            turn,
            Event {
                event_type: EventType::Arrive,
                ant: id,
                route: None,
                room: Some(room),
            },
        );
    }
}

#[derive(Debug, serde::Serialize)]
enum EventType {
    Spawn,
    Move,
    Arrive,
}

#[derive(Debug, serde::Serialize)]
pub struct Event {
    event_type: EventType,
    ant: String,
    route: Option<usize>,
    room: Option<String>,
}

struct Turn {
    turn: usize,
    active: usize,
    waiting: usize,
    arrived: usize,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

struct JsonReplayLogger {
    id: Uuid,
    filename: String,
    colony: serde_json::Value,
    routes: Vec<Vec<String>>,
    schedule: Option<Schedule>,
    turns: Vec<Turn>,
    events: HashMap<usize, Vec<Event>>,
}

impl JsonReplayLogger {
    pub fn new(filename: String, colony: &Colony) -> JsonReplayLogger {
        JsonReplayLogger {
            id: Uuid::new_v4(),
            filename,
            colony: json!({
                "ants": colony.ants(),
                "start": colony.start(),
                "end": colony.end(),
                "rooms": colony.rooms(),
                "tunnels": colony.tunnels(),
            }),
            routes: Vec::new(),
            schedule: None,
            turns: Vec::new(),
            events: HashMap::new(),
        }
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn log_plan(&mut self, routes: Vec<Vec<String>>, schedule: Schedule) {
        self.routes = routes;
        self.schedule = Some(schedule);
    }

    fn log_turn(&mut self, turn: usize, active: usize, waiting: usize, arrived: usize) {
        self.turns.push(Turn {
            turn,
            active,
            waiting,
            arrived,
        });
    }

    fn log_event(&mut self, turn: usize, event: Event) {
        self.events.entry(turn).or_default().push(event);
    }

    fn clear(&mut self) {
        self.turns.clear();
        self.events.clear();
    }

    fn save(&self) -> LemInResult<()> {
        let file = File::create(&self.filename)?;
        let turns: Vec<_> = self
            .turns
            .iter()
            .map(|turn| {
                json!({
                    "turn": turn.turn,
                    "active": turn.active,
                    "waiting": turn.waiting,
                    "arrived": turn.arrived,
                    "events": self.events.get(&turn.turn).unwrap_or(&Vec::new()),
                })
            })
            .collect();

        let data = json!({
            "id": self.id.to_string(),
            "colony": self.colony,
            "routes": self.routes,
            "schedule": self.schedule,
            "turns": turns,
        });

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, &data)?;
        writer.flush()?;
        info!(filename = %self.filename, turns = self.turns.len(), "Saved replay");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LemInError;

    fn colony() -> Colony {
        Colony::parse("1\n##start\ns 0 0\n##end\ne 1 0\ns-e").unwrap()
    }

    #[test]
    fn when_no_filename_is_given_saving_the_replay_does_nothing() {
        let mut logger = create_replay_logger(None, &colony());
        logger.log_turn(0, 1, 0, 0);

        assert!(logger.save().is_ok());
    }

    #[test]
    fn when_saving_a_replay_the_plan_turns_and_events_are_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let filename = dir.path().join("replay.json").display().to_string();
        let mut logger = create_replay_logger(Some(filename.clone()), &colony());

        logger.log_plan(
            vec![vec!["s".to_string(), "e".to_string()]],
            Schedule {
                total_steps: 1,
                counts: vec![1],
            },
        );
        logger.log_spawn_ant(0, "L1".to_string(), 0);
        logger.log_turn(0, 1, 0, 0);
        logger.log_arrive_ant(1, "L1".to_string(), "e".to_string());
        logger.log_turn(1, 0, 0, 1);
        logger.save().unwrap();

        let contents = std::fs::read_to_string(&filename).unwrap();
        let data: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(data["id"].as_str().unwrap().len(), 36);
        assert_eq!(data["colony"]["start"], "s");
        assert_eq!(data["colony"]["rooms"][1]["name"], "e");
        assert_eq!(data["routes"][0][1], "e");
        assert_eq!(data["schedule"]["total_steps"], 1);
        assert_eq!(data["turns"].as_array().unwrap().len(), 2);
        assert_eq!(data["turns"][0]["events"][0]["event_type"], "Spawn");
        assert_eq!(data["turns"][1]["events"][0]["event_type"], "Arrive");
        assert_eq!(data["turns"][1]["events"][0]["room"], "e");
        assert_eq!(data["turns"][1]["arrived"], 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn when_the_replay_file_cannot_be_written_saving_returns_an_error() {
        // Every write to /dev/full fails, but only once the buffer is flushed
        let mut logger = create_replay_logger(Some("/dev/full".to_string()), &colony());
        logger.log_turn(0, 1, 0, 0);

        assert!(matches!(logger.save(), Err(LemInError::Io(_))));
    }

    #[test]
    fn when_clearing_a_replay_previous_turns_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let filename = dir.path().join("replay.json").display().to_string();
        let mut logger = create_replay_logger(Some(filename.clone()), &colony());

        logger.log_turn(0, 1, 0, 0);
        logger.log_move_ant(1, "L1".to_string(), "e".to_string());
        logger.clear();
        logger.save().unwrap();

        let data: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&filename).unwrap()).unwrap();
        assert!(data["turns"].as_array().unwrap().is_empty());
    }
}
