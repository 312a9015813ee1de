use canny_playground::app::CannyPlaygroundApp;
use canny_playground::settings::AppSettings;
use canny_playground::{cli, log_info, logger};
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode ---------------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let settings = AppSettings::load();
    log_info!("Settings: {:?}", settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window_width, settings.window_height])
            .with_drag_and_drop(true)
            .with_title("Canny Edge Detection Playground"),
        ..Default::default()
    };

    eframe::run_native(
        "Canny Playground",
        options,
        Box::new(move |cc| Box::new(CannyPlaygroundApp::new(cc, settings))),
    )
}
