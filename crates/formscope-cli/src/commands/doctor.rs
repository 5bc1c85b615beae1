//! `formscope doctor`: report the effective configuration and whether a
//! browser is available for the rendered tier.

use formscope::config::find_chromium;
use formscope::ExtractorConfig;

pub fn run(config: &ExtractorConfig) -> anyhow::Result<()> {
    println!("formscope {}", env!("CARGO_PKG_VERSION"));
    println!("  Static timeout:  {}s", config.static_timeout_secs);
    println!("  Launch timeout:  {}s", config.launch_timeout_secs);
    println!("  Render timeout:  {}s", config.render_timeout_secs);
    println!("  Settle delay:    {}ms", config.settle_delay_ms);

    if !config.render_enabled {
        println!("  Rendering:       disabled");
        return Ok(());
    }

    match find_chromium(config.chromium_path.as_ref()) {
        Some(path) => println!("  Chromium:        {}", path.display()),
        None => {
            println!("  Chromium:        not found");
            println!();
            println!("Pages that need rendering will fail with a network error.");
            println!("Install Chrome/Chromium or set FORMSCOPE_CHROMIUM_PATH.");
        }
    }
    Ok(())
}
