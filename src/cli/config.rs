use std::fs;
use std::path::PathBuf;

use crate::session::FileSessionStore;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("UPC_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("up-connection")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_store() -> anyhow::Result<FileSessionStore> {
    Ok(FileSessionStore::new(get_config_dir()?.join("session.json")))
}
