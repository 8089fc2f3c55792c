use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use webroot::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server.client_timeout_ms, 2000);
    assert_eq!(cfg.static_files.root_dir, PathBuf::from("webroot"));
    assert_eq!(cfg.static_files.uploads_dir, PathBuf::from("uploaded_imgs"));
    assert!(cfg.static_files.content_types.is_empty());
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml(
        r#"
server:
  listen_addr: "0.0.0.0:3000"
  client_timeout_ms: 250
"#,
    )
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.server.client_timeout_ms, 250);
    // Untouched sections keep their defaults
    assert_eq!(cfg.server.max_line_length, 8192);
    assert_eq!(cfg.static_files.root_dir, PathBuf::from("webroot"));
}

#[test]
fn test_config_from_yaml_static_files() {
    let cfg = Config::from_yaml(
        r#"
static_files:
  root_dir: /srv/www
  uploads_dir: incoming
  content_types:
    svg: image/svg+xml
"#,
    )
    .unwrap();

    assert_eq!(cfg.static_files.root_dir, PathBuf::from("/srv/www"));
    assert_eq!(cfg.static_files.uploads_dir, PathBuf::from("incoming"));
    assert_eq!(
        cfg.static_files.content_types.get("svg").map(String::as_str),
        Some("image/svg+xml")
    );
}

#[test]
fn test_config_from_yaml_rejects_bad_types() {
    assert!(Config::from_yaml("server:\n  client_timeout_ms: soon\n").is_err());
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server:\n  listen_addr: \"127.0.0.1:9999\"").unwrap();

    let cfg = Config::from_file(file.path()).unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9999");
}

#[test]
fn test_config_from_missing_file() {
    assert!(Config::from_file(std::path::Path::new("/definitely/not/here.yaml")).is_err());
}

#[test]
fn test_config_listen_override() {
    let cfg = Config::default().with_listen_override(Some("0.0.0.0:5000".to_string()));
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:5000");

    let cfg = Config::default().with_listen_override(None);
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
}

#[test]
fn test_config_custom_address_from_env() {
    unsafe {
        std::env::remove_var("WEBROOT_CONFIG");
        std::env::set_var("LISTEN", "0.0.0.0:3000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    unsafe {
        std::env::remove_var("LISTEN");
    }
}

#[test]
fn test_config_read_limits() {
    let cfg = Config::from_yaml(
        "server:\n  client_timeout_ms: 1500\n  max_line_length: 100\n  max_body_bytes: 42\n",
    )
    .unwrap();

    let limits = cfg.server.read_limits();

    assert_eq!(limits.read_timeout, Duration::from_millis(1500));
    assert_eq!(limits.max_line_length, 100);
    assert_eq!(limits.max_body_bytes, 42);
}
