/// meshctl - interactive terminal mesh viewer
///
/// Loads an OBJ mesh and shows it with a coordinate indicator and a
/// control panel for scaling and rotating it.
/// Controls:
///   - Tab / Shift-Tab: Move between panel widgets
///   - Digits then Enter: Edit a number; Enter/Space: Press a button
///   - WASD / Arrow Keys: Orbit the view
///   - E/R: Roll the view
///   - Q/ESC: Quit
use std::process::ExitCode;

use clap::Parser;
use meshctl_core::load_obj;
use meshctl_terminal::config::{initialize_tracing, Cli};
use meshctl_terminal::{AppError, MeshControlApp, Viewer};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    initialize_tracing(&cli.log_filter, cli.log_file.as_deref())?;

    // Load before touching the terminal so a bad path never opens the viewer
    let mesh = load_obj(&cli.model)?;

    let mut app = MeshControlApp::new(mesh);
    let mut viewer = Viewer::new(cli.viewer_config());
    viewer.launch(&mut app)?;

    Ok(())
}
