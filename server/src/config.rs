/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Server configuration: a YAML file overridden by environment variables,
//! falling back to hardcoded defaults when neither is present.

use crate::util::error::{Error, SkyResult};
use serde::Deserialize;
use std::env;
use std::net::IpAddr;
use std::path::Path;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 6379;
const DEFAULT_MAX_CONNECTIONS: usize = 50000;

const ENV_CONFIG_FILE: &str = "MINIDB_CONFIG";
const ENV_HOST: &str = "MINIDB_HOST";
const ENV_PORT: &str = "MINIDB_PORT";
const ENV_MAX_CONNECTIONS: &str = "MINIDB_MAX_CONNECTIONS";

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    max_connections: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.parse().unwrap(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Layers configuration from lowest to highest priority: hardcoded
    /// defaults, then an optional YAML file, then environment variables.
    pub fn load() -> SkyResult<Self> {
        let mut cfg = Self::default();

        if let Some(path) = env::var_os(ENV_CONFIG_FILE) {
            let file = Self::read_file(Path::new(&path))?;
            cfg.apply_file(file)?;
        }

        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `PortConfig`-style sanity check run once every layer has had a chance
    /// to override a field. An unparseable host is already rejected as it's
    /// read (`apply_file`/`apply_env` fail loudly); port 0 has no usable bind
    /// semantics and needs its own check since any `u16` parses successfully.
    fn validate(&self) -> SkyResult<()> {
        if self.port == 0 {
            return Err(Error::config("port 0 is not a valid bind port"));
        }
        Ok(())
    }

    fn read_file(path: &Path) -> SkyResult<FileConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ioerror_extra(e, format!("reading config file {}", path.display())))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::config(format!("malformed config file {}: {e}", path.display())))
    }

    fn apply_file(&mut self, file: FileConfig) -> SkyResult<()> {
        if let Some(host) = file.host {
            self.host = host
                .parse()
                .map_err(|_| Error::config(format!("invalid host in config file: '{host}'")))?;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(max) = file.max_connections {
            self.max_connections = max;
        }
        Ok(())
    }

    fn apply_env(&mut self) -> SkyResult<()> {
        if let Ok(host) = env::var(ENV_HOST) {
            self.host = host
                .parse()
                .map_err(|_| Error::config(format!("invalid {ENV_HOST} value '{host}'")))?;
        }
        if let Ok(port) = env::var(ENV_PORT) {
            self.port = port
                .parse()
                .map_err(|_| Error::config(format!("invalid {ENV_PORT} value '{port}'")))?;
        }
        if let Ok(max) = env::var(ENV_MAX_CONNECTIONS) {
            self.max_connections = max
                .parse()
                .map_err(|_| Error::config(format!("invalid {ENV_MAX_CONNECTIONS} value '{max}'")))?;
        }
        Ok(())
    }
}
