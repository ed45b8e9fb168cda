//! Utility commands: color inspection and config init.

use std::path::Path;

use rgbscape::config::{self, DEFAULT_SURFACE_TOML};
use rgbscape::Color;

use super::CommandResult;

/// Print a color in every color space the model supports.
pub fn color(hex: &str) -> CommandResult {
    let color = Color::from_hex(hex)?;
    let (a, r, g, b) = color.argb_bytes();
    let (h, s, v) = color.hsv();
    let (x, y, z) = color.xyz();
    let (l, la, lb) = color.lab();
    let (hh, hc, hl) = color.hcl();

    println!("Color {}", color.to_hex_argb());
    println!("  ARGB  {a:3} {r:3} {g:3} {b:3}");
    println!(
        "  float {:.3} {:.3} {:.3} {:.3}",
        color.a(),
        color.r(),
        color.g(),
        color.b()
    );
    println!("  HSV   {h:7.2} {s:.3} {v:.3}");
    println!("  XYZ   {x:.3} {y:.3} {z:.3}");
    println!("  Lab   {l:7.2} {la:7.2} {lb:7.2}");
    println!("  HCL   {hh:7.2} {hc:7.2} {hl:7.2}");
    Ok(())
}

/// Write the default surface config to `path` (or the user config dir).
pub fn init(path: Option<&Path>, force: bool) -> CommandResult {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_path);
    if path.exists() && !force {
        println!("Config already exists: {} (use --force to overwrite)", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, DEFAULT_SURFACE_TOML)?;
    println!("Wrote {}", path.display());
    Ok(())
}
