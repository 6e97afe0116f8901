mod app;
mod cli;

use app::IwtApp;
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // Session log first so every collaborator failure has somewhere to go.
    iwt::logger::init();

    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS { 0 } else { 1 });
    }

    // -- GUI mode -----------------------------------------------------
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("ImageWithText"),
        ..Default::default()
    };

    eframe::run_native(
        "ImageWithText",
        options,
        Box::new(|cc| Box::new(IwtApp::new(cc))),
    )
}
