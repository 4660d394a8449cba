use crate::server::{self, ServerConfig};
use anyhow::{anyhow, Result};
use lemin_engine::{format_turn, Colony, Simulation, SolveOptions, Turn, Visualizer};
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Solves the colony in `file` and prints it followed by the moves of every turn.
pub fn run(file: &Path, options: &SolveOptions, replay: Option<PathBuf>) -> Result<()> {
    let colony = Colony::load(file)?;
    let mut simulation = Simulation::new(
        colony,
        options,
        replay.map(|path| path.display().to_string()),
    )?;
    let turns = simulation.run()?;

    let mut stdout = stdout().lock();
    write_solution(&mut stdout, simulation.colony(), &turns)?;
    stdout.flush()?;

    Ok(())
}

/// Opens the interactive terminal visualizer for the colony in `file`.
pub fn visualize(file: &Path, options: &SolveOptions) -> Result<()> {
    let colony = Colony::load(file)?;
    let simulation = Simulation::new(colony, options, None)?;
    let mut visualizer = Visualizer::new(simulation)?;

    // Terminal failures must not be reported as bad colonies
    visualizer
        .run()
        .map_err(|e| anyhow!("Terminal visualizer failed: {}", e))?;

    Ok(())
}

/// Prints the solution of `file` like `run` does, then serves the browser visualizer.
pub async fn serve(
    file: Option<PathBuf>,
    addr: &str,
    web_dir: PathBuf,
    timeout_ms: u64,
    options: SolveOptions,
) -> Result<()> {
    if let Some(file) = &file {
        run(file, &options, None)?;
        println!();
        println!(
            "Open visualization: http://{}/visual.html?file={}",
            addr,
            file.display()
        );
    }

    let config = ServerConfig {
        default_file: file,
        web_dir,
        timeout: Duration::from_millis(timeout_ms),
        options,
    };

    info!(addr, timeout_ms, "Starting server");
    server::serve(config, addr).await
}

/// Writes the colony file followed by a blank line and one line per turn.
pub fn write_solution(out: &mut impl Write, colony: &Colony, turns: &[Turn]) -> Result<()> {
    writeln!(out, "{}", colony.contents().trim_end())?;
    writeln!(out)?;
    for turn in turns {
        writeln!(out, "{}", format_turn(turn))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemin_engine::{solve, LemInError};
    use std::fs;

    const COLONY: &str = "3\n##start\nstart 0 0\na 1 0\n##end\nend 2 0\nstart-a\na-end\n";

    #[test]
    fn when_writing_a_solution_the_colony_is_followed_by_a_blank_line_and_the_turns() {
        let colony = Colony::parse(COLONY).unwrap();
        let solution = solve(&colony, &SolveOptions::default()).unwrap();
        let mut out = Vec::new();

        write_solution(&mut out, &colony, &solution.turns).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3\n##start\nstart 0 0\na 1 0\n##end\nend 2 0\nstart-a\na-end\n\n\
             L1-a\nL1-end L2-a\nL2-end L3-a\nL3-end\n"
        );
    }

    #[test]
    fn when_writing_a_solution_windows_line_endings_are_normalised() {
        let colony = Colony::parse("1\r\n##start\r\ns 0 0\r\n##end\r\ne 1 0\r\ns-e\r\n").unwrap();
        let solution = solve(&colony, &SolveOptions::default()).unwrap();
        let mut out = Vec::new();

        write_solution(&mut out, &colony, &solution.turns).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1\n##start\ns 0 0\n##end\ne 1 0\ns-e\n\nL1-e\n"
        );
    }

    #[test]
    fn when_running_a_colony_with_a_replay_the_replay_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("line.txt");
        let replay = dir.path().join("replay.json");
        fs::write(&file, COLONY).unwrap();

        run(&file, &SolveOptions::default(), Some(replay.clone())).unwrap();

        let data: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&replay).unwrap()).unwrap();
        assert_eq!(data["colony"]["ants"], 3);
    }

    #[test]
    fn when_running_a_colony_that_is_not_txt_the_engine_error_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("line.map");
        fs::write(&file, COLONY).unwrap();

        let error = run(&file, &SolveOptions::default(), None).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<LemInError>(),
            Some(LemInError::InvalidExtension(_))
        ));
    }
}
