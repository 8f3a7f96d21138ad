#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

/// Helper for driving the built `trafficlight` binary.
pub struct TrafficLightProcess;

impl TrafficLightProcess {
    /// Runs the binary with `args` to completion and returns its output.
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_trafficlight"))
            .args(args)
            .env_remove("TRAFFICLIGHT_LOG_LEVEL")
            .env_remove("TRAFFICLIGHT_CONFIG")
            .env_remove("TRAFFICLIGHT_SEED")
            .env_remove("TRAFFICLIGHT_MIN_CYCLE")
            .env_remove("TRAFFICLIGHT_MAX_CYCLE")
            .env_remove("TRAFFICLIGHT_METRICS_PORT")
            .env_remove("TRAFFICLIGHT_LOG_FORMAT")
            .env_remove("TRAFFICLIGHT_COLOR")
            .output()
            .expect("failed to run trafficlight binary")
    }

    /// Runs the binary with `args` followed by a config file path.
    pub fn spawn_with_config(args: &[&str], config: &Path) -> Output {
        let path = config.to_str().expect("config path should be UTF-8");
        let mut argv = args.to_vec();
        argv.push(path);
        Self::spawn_command(&argv)
    }

    /// Writes `contents` to a temporary YAML file.
    pub fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("failed to create temp config");
        file.write_all(contents.as_bytes())
            .expect("failed to write temp config");
        file
    }
}
