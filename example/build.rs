use std::{env, path::PathBuf};

fn main() -> Result<(), wiregen::ProtocolError> {
    println!("cargo:rerun-if-changed=protocol.yml");
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| {
        wiregen::ProtocolError::SchemaError("OUT_DIR is not set".to_string())
    })?);
    wiregen::generate_protocol("protocol.yml", &out_dir, &wiregen::GenerateOptions::default())?;
    Ok(())
}
