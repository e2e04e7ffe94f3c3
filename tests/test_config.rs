use std::collections::HashMap;

use spindle::config::{Config, ServerConfig};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_config_default_address() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen, "127.0.0.1:8080");
    assert_eq!(cfg.server.listen_addr().unwrap(), "127.0.0.1:8080");
    assert!(cfg.server.loops >= 1);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml(
        "server:\n  listen: \"tcp://0.0.0.0:9000\"\n  loops: 4\n  read_buffer_size: 1024\n",
    )
    .unwrap();

    assert_eq!(cfg.server.loops, 4);
    assert_eq!(cfg.server.read_buffer_size, 1024);
    assert_eq!(cfg.server.listen_addr().unwrap(), "0.0.0.0:9000");
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml("server:\n  loops: 2\n").unwrap();

    assert_eq!(cfg.server.loops, 2);
    assert_eq!(cfg.server.listen, ServerConfig::default().listen);
}

#[test]
fn test_config_rejects_unknown_fields() {
    assert!(Config::from_yaml("server:\n  lops: 2\n").is_err());
}

#[test]
fn test_config_rejects_zero_loops() {
    assert!(Config::from_yaml("server:\n  loops: 0\n").is_err());
}

#[test]
fn test_config_env_overrides() {
    let mut cfg = Config::default();
    cfg.apply_overrides(env(&[("LISTEN", "0.0.0.0:3000"), ("LOOPS", "3")]))
        .unwrap();

    assert_eq!(cfg.server.listen_addr().unwrap(), "0.0.0.0:3000");
    assert_eq!(cfg.server.loops, 3);
}

#[test]
fn test_config_env_rejects_bad_loops() {
    let mut cfg = Config::default();
    assert!(cfg.apply_overrides(env(&[("LOOPS", "many")])).is_err());
}

#[test]
fn test_listen_addr_forms() {
    let listen = |s: &str| ServerConfig {
        listen: s.to_string(),
        ..ServerConfig::default()
    };

    assert_eq!(listen("localhost:8000").listen_addr().unwrap(), "localhost:8000");
    assert_eq!(listen("tcp://127.0.0.1:0").listen_addr().unwrap(), "127.0.0.1:0");
    assert_eq!(listen("tcp://[::1]:8080").listen_addr().unwrap(), "[::1]:8080");

    assert!(listen("127.0.0.1").listen_addr().is_err());
    assert!(listen("http://127.0.0.1:80").listen_addr().is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1, cfg2);
}
