use assert_cmd::Command;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env_remove("BOOKSHELF_ENV")
        .env_remove("RUST_LOG")
        .env("BOOKSHELF_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .env("BOOKSHELF_AUTH__JWT_SECRET", "cli-test-secret")
        .env("BOOKSHELF_AUTH__BCRYPT_COST", "4");
    cmd
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn help_lists_subcommands() {
    let output = bookshelf().arg("--help").output().unwrap();

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["serve", "issue-token", "verify-token", "hash-password"] {
        assert!(text.contains(command), "missing {command} in:\n{text}");
    }
}

#[test]
fn issued_token_verifies() {
    let issued = bookshelf()
        .args([
            "issue-token",
            "--id",
            "u1",
            "--username",
            "a",
            "--email",
            "a@x.com",
        ])
        .output()
        .unwrap();
    assert!(issued.status.success());
    let token = stdout(&issued);

    let verified = bookshelf().args(["verify-token", &token]).output().unwrap();
    assert!(verified.status.success());

    let claims: serde_json::Value = serde_json::from_str(&stdout(&verified)).unwrap();
    assert_eq!(
        claims,
        serde_json::json!({"id": "u1", "username": "a", "email": "a@x.com"})
    );
}

#[test]
fn token_from_another_secret_is_rejected() {
    let issued = bookshelf()
        .env("BOOKSHELF_AUTH__JWT_SECRET", "some-other-secret")
        .args(["issue-token", "--id", "u1", "--username", "a", "--email", "a@x.com"])
        .output()
        .unwrap();
    let token = stdout(&issued);

    let verified = bookshelf().args(["verify-token", &token]).output().unwrap();
    assert!(!verified.status.success());
    assert!(String::from_utf8_lossy(&verified.stderr).contains("invalid token"));
}

#[test]
fn garbage_token_fails() {
    let output = bookshelf()
        .args(["verify-token", "not-a-token"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid token"));
}

#[test]
fn hash_password_prints_bcrypt_hash() {
    let output = bookshelf()
        .args(["hash-password", "hunter2"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let hash = stdout(&output);
    assert!(hash.starts_with("$2"));
    assert!(hash.contains("$04$"));
}
