use std::env;
use std::fs;
use std::path::Path;
use vergen::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};

const PROFILES: [&str; 2] = ["debug", "release"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;

    let cargo = CargoBuilder::default()
        .opt_level(true)
        .target_triple(true)
        .build()?;

    let rustc = RustcBuilder::default().semver(true).channel(true).build()?;

    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?
        .emit()?;

    copy_profiles()?;

    Ok(())
}

/// Places config/{profile}.toml next to the built binaries
///
/// Release builds ship only the release profile.
fn copy_profiles() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = env::var("OUT_DIR")?;
    let build_profile = env::var("PROFILE")?;

    // OUT_DIR is target/{profile}/build/touch-bridge-xxx/out
    let target_dir = Path::new(&out_dir)
        .ancestors()
        .nth(3)
        .ok_or("Could not determine target directory")?;

    let config_out_dir = target_dir.join("config");
    fs::create_dir_all(&config_out_dir)?;

    for profile in PROFILES {
        if build_profile == "release" && profile != "release" {
            continue;
        }
        let file_name = format!("{profile}.toml");
        let source = Path::new("config").join(&file_name);
        println!("cargo:rerun-if-changed={}", source.display());
        if source.exists() {
            fs::copy(&source, config_out_dir.join(&file_name))?;
        }
    }

    Ok(())
}
