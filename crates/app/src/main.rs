//! frameloop - minimal Win32 + Direct3D 11 clear/present harness.

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use frameloop_gfx::D3d11Api;
    use frameloop_platform::Win32Window;
    use tracing::info;

    frameloop_core::init_logging();
    info!("Starting frameloop");

    let mut window = Win32Window::new("Window", 1280, 720)?;
    let api = D3d11Api::new(window.hwnd());
    frameloop::run(&mut window, api)?;

    info!("Shut down cleanly");
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("frameloop targets Win32 + Direct3D 11 and only runs on Windows");
    std::process::exit(1);
}
