use assert_cmd::Command;

const ENV_VARS: &[&str] = &[
    "SHOPFRONT_ENV",
    "NODE_ENV",
    "SHOPFRONT_CONFIG_DIR",
    "MONGODB_URI",
    "DATABASE_URL",
    "MONGO_URL",
    "PORT",
    "CLIENT_URL",
];

fn shopfront() -> Command {
    let mut cmd = Command::cargo_bin("shopfront").unwrap();
    for name in ENV_VARS {
        cmd.env_remove(name);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = shopfront().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for subcommand in ["serve", "seed", "config"] {
        assert!(stdout.contains(subcommand), "missing {subcommand}");
    }
}

#[test]
fn config_redacts_connection_string() {
    let output = shopfront()
        .arg("config")
        .env("MONGODB_URI", "sqlite:///tmp/secret-shop.db")
        .env("PORT", "8088")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("secret-shop"));

    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(settings["database"]["url"], "<redacted>");
    assert_eq!(settings["server"]["port"], 8088);
    assert_eq!(settings["environment"], "development");
}

#[test]
fn seed_without_database_fails() {
    let output = shopfront().arg("seed").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn invalid_environment_is_rejected() {
    shopfront()
        .arg("config")
        .env("SHOPFRONT_ENV", "qa")
        .assert()
        .failure();
}
