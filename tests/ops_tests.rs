//! Integration tests for the vault operations over in-memory stores.

mod common;

use serde_json::json;

use common::{bundle, domain, fast_cipher, FakeEnvchain, FixedPasswordInput, Harness, ScriptedEditor};
use wellkept::crypto::Encryption;
use wellkept::errors::WellKeptError;
use wellkept::store::{BrokenCode, CredentialStatus, CredentialStore};
use wellkept::vault::{DomainEdit, DomainsBundle, VaultStatus};

const PW: &str = "correct horse";

fn user_message(err: WellKeptError) -> String {
    assert!(err.is_user_error(), "expected a user error, got {err:?}");
    err.to_string()
}

// ---------------------------------------------------------------------------
// getSecrets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_secrets_from_the_single_holder() {
    let h = Harness::new(PW);
    h.seed_vault("/a.vault", "pa", &bundle(vec![domain("dev", &[("X", "1")])])).await;
    h.seed_vault(
        "/b.vault",
        "pb",
        &bundle(vec![domain("prod", &[("TOKEN", "t"), ("DB", "d")])]),
    )
    .await;
    h.seed_vault("/c.vault", "pc", &DomainsBundle::empty()).await;

    let secrets = h.ops.get_secrets("prod").await.unwrap();
    let names: Vec<&str> = secrets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["DB", "TOKEN"]);
    assert_eq!(secrets[1].value, "t");
}

#[tokio::test]
async fn get_secrets_rejects_ambiguity() {
    let h = Harness::new(PW);
    h.seed_vault("/a.vault", "pa", &bundle(vec![domain("prod", &[])])).await;
    h.seed_vault("/b.vault", "pb", &bundle(vec![domain("prod", &[("A", "1")])])).await;

    let err = h.ops.get_secrets("prod").await.unwrap_err();
    assert_eq!(
        user_message(err),
        "More than one vault found containing domain \"prod\""
    );
}

#[tokio::test]
async fn get_secrets_reports_unknown_domain() {
    let h = Harness::new(PW);
    h.seed_vault("/a.vault", "pa", &bundle(vec![domain("dev", &[])])).await;

    let err = h.ops.get_secrets("prod").await.unwrap_err();
    assert_eq!(
        user_message(err),
        "No vaults found containing domain \"prod\""
    );
}

#[tokio::test]
async fn get_secrets_of_empty_domain_is_empty() {
    let h = Harness::new(PW);
    h.seed_vault("/a.vault", "pa", &bundle(vec![domain("prod", &[])])).await;
    assert!(h.ops.get_secrets("prod").await.unwrap().is_empty());
}

#[tokio::test]
async fn get_secrets_ignores_unreadable_vaults() {
    let h = Harness::new(PW);
    h.seed_vault("/a.vault", "pa", &bundle(vec![domain("prod", &[("A", "1")])])).await;
    // Same domain, but registered with the wrong password.
    h.seed_file("/b.vault", "real", &bundle(vec![domain("prod", &[])])).await;
    h.credentials
        .insert("/b.vault", "stale", CredentialStatus::Ok)
        .await;

    assert_eq!(h.ops.get_secrets("prod").await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// createVault
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_writes_empty_vault_then_registers() {
    let h = Harness::new(PW);
    h.ops.create_vault("/new.vault").await.unwrap();

    assert_eq!(h.files.write_count(), 1);
    assert_eq!(h.open_file("/new.vault", PW).await, DomainsBundle::empty());

    let entries = h.credentials.list_credentials().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].vault_filepath, "/new.vault");
    assert_eq!(entries[0].password.as_str(), PW);
}

#[tokio::test]
async fn create_refuses_registered_path() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;
    h.files.remove("/v.vault").await;

    let err = h.ops.create_vault("/v.vault").await.unwrap_err();
    assert_eq!(user_message(err), "Vault with path /v.vault already registered");
    assert_eq!(h.files.write_count(), 0);
    assert_eq!(h.input.prompt_count(), 0);
}

#[tokio::test]
async fn create_refuses_existing_file() {
    let h = Harness::new(PW);
    h.files.seed("/v.vault", "whatever").await;

    let err = h.ops.create_vault("/v.vault").await.unwrap_err();
    assert_eq!(user_message(err), "File /v.vault already exists");
    assert_eq!(h.files.content("/v.vault").await.as_deref(), Some("whatever"));
    assert!(h.credentials.is_empty().await);
}

#[tokio::test]
async fn create_with_mismatched_passwords_leaves_no_trace() {
    let h = Harness::with_input(FixedPasswordInput::mismatching());

    let err = h.ops.create_vault("/v.vault").await.unwrap_err();
    assert!(matches!(err, WellKeptError::PasswordMismatch));
    assert_eq!(h.files.write_count(), 0);
    assert!(h.credentials.is_empty().await);
}

// ---------------------------------------------------------------------------
// registerVault
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_with_right_password_adds_one_entry_and_writes_nothing() {
    let h = Harness::new(PW);
    h.seed_file("/v.vault", PW, &bundle(vec![domain("dev", &[])])).await;

    h.ops.register_vault("/v.vault").await.unwrap();

    assert_eq!(h.credentials.len().await, 1);
    assert_eq!(h.files.write_count(), 0);
    assert_eq!(h.cipher.encrypt_count(), 0);
}

#[tokio::test]
async fn register_with_wrong_password_adds_nothing() {
    let h = Harness::new("wrong password");
    h.seed_file("/v.vault", PW, &DomainsBundle::empty()).await;

    let err = h.ops.register_vault("/v.vault").await.unwrap_err();
    match &err {
        WellKeptError::InvalidVault(fault) => assert_eq!(fault.status(), VaultStatus::CannotDecrypt),
        other => panic!("expected an invalid vault error, got {other:?}"),
    }
    assert!(user_message(err).starts_with("Invalid vault: cannot_decrypt"));
    assert!(h.credentials.is_empty().await);
}

#[tokio::test]
async fn register_requires_existing_file() {
    let h = Harness::new(PW);
    let err = h.ops.register_vault("/missing.vault").await.unwrap_err();
    assert_eq!(user_message(err), "File /missing.vault does not exist");
    assert_eq!(h.input.prompt_count(), 0);
}

#[tokio::test]
async fn register_refuses_duplicate_registration() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;

    let err = h.ops.register_vault("/v.vault").await.unwrap_err();
    assert_eq!(user_message(err), "Vault with path /v.vault already registered");
    assert_eq!(h.credentials.len().await, 1);
}

// ---------------------------------------------------------------------------
// deregisterVault
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deregister_removes_every_entry_for_the_path() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;
    h.credentials
        .insert("/v.vault", "other", CredentialStatus::Ok)
        .await;
    h.seed_vault("/keep.vault", PW, &DomainsBundle::empty()).await;

    assert_eq!(h.ops.deregister_vault("/v.vault").await.unwrap(), 2);

    let left = h.credentials.list_credentials().await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].vault_filepath, "/keep.vault");
    // The file itself stays.
    assert!(h.files.content("/v.vault").await.is_some());
}

#[tokio::test]
async fn deregister_unknown_path_fails() {
    let h = Harness::new(PW);
    let err = h.ops.deregister_vault("/nope.vault").await.unwrap_err();
    assert_eq!(user_message(err), "Vault not found with path /nope.vault");
}

// ---------------------------------------------------------------------------
// editVault
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_vault_without_changes_writes_nothing() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &bundle(vec![domain("dev", &[("A", "1")])])).await;
    let before = h.files.content("/v.vault").await;

    let editor = ScriptedEditor::unchanged();
    assert!(!h.ops.edit_vault("/v.vault", &editor).await.unwrap());

    assert_eq!(editor.shown(), vec!["[dev]\nA=1\n".to_string()]);
    assert_eq!(h.files.write_count(), 0);
    assert_eq!(h.cipher.encrypt_count(), 0);
    assert_eq!(h.files.content("/v.vault").await, before);
}

#[tokio::test]
async fn edit_vault_persists_new_content() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &bundle(vec![domain("dev", &[("A", "1")])])).await;

    let editor = ScriptedEditor::saving(&["[dev]\nA=2\n\n[prod]\nB=\n"]);
    assert!(h.ops.edit_vault("/v.vault", &editor).await.unwrap());

    assert_eq!(h.files.write_count(), 1);
    assert_eq!(
        h.open_file("/v.vault", PW).await,
        bundle(vec![domain("dev", &[("A", "2")]), domain("prod", &[("B", "")])])
    );
}

#[tokio::test]
async fn edit_vault_keeps_edits_through_validation_errors() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;

    let editor = ScriptedEditor::saving(&["[dev]\nNO_EQUALS\n", "[dev]\nX=1\nX=2\n", "[dev]\nX=1\n"]);
    assert!(h.ops.edit_vault("/v.vault", &editor).await.unwrap());

    let rejections = editor.rejections();
    assert_eq!(rejections.len(), 2);
    assert!(rejections[0].contains("missing \"=\" sign"));
    assert_eq!(rejections[1], "Duplicate name X");
    assert_eq!(h.files.write_count(), 1);
}

#[tokio::test]
async fn edit_vault_abandoned_after_invalid_text_writes_nothing() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;

    let editor = ScriptedEditor::saving(&["no header"]);
    let err = h.ops.edit_vault("/v.vault", &editor).await.unwrap_err();
    assert!(matches!(err, WellKeptError::UserCancelled));
    assert_eq!(h.files.write_count(), 0);
}

#[tokio::test]
async fn edit_vault_requires_exactly_one_entry() {
    let h = Harness::new(PW);
    let editor = ScriptedEditor::unchanged();

    let err = h.ops.edit_vault("/v.vault", &editor).await.unwrap_err();
    assert_eq!(user_message(err), "Vault not found with path /v.vault");

    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;
    h.credentials.insert("/v.vault", PW, CredentialStatus::Ok).await;
    let err = h.ops.edit_vault("/v.vault", &editor).await.unwrap_err();
    assert_eq!(user_message(err), "Multiple vaults found with path /v.vault");
    assert!(editor.shown().is_empty());
}

#[tokio::test]
async fn edit_vault_refuses_unreadable_vault() {
    let h = Harness::new(PW);
    h.seed_file("/v.vault", "real", &DomainsBundle::empty()).await;
    h.credentials.insert("/v.vault", "stale", CredentialStatus::Ok).await;

    let editor = ScriptedEditor::unchanged();
    let err = h.ops.edit_vault("/v.vault", &editor).await.unwrap_err();
    assert!(matches!(err, WellKeptError::InvalidVault(ref f) if f.status() == VaultStatus::CannotDecrypt));
    assert!(editor.shown().is_empty());
}

// ---------------------------------------------------------------------------
// editDomain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn edit_domain_splices_into_its_vault() {
    let h = Harness::new(PW);
    h.seed_vault(
        "/v.vault",
        PW,
        &bundle(vec![
            domain("dev", &[("A", "1")]),
            domain("prod", &[("B", "2")]),
            domain("test", &[]),
        ]),
    )
    .await;
    h.seed_vault("/other.vault", "po", &bundle(vec![domain("misc", &[])])).await;

    let editor = ScriptedEditor::saving(&["[prod]\nB=3\nC=4\n"]);
    let outcome = h.ops.edit_domain("prod", &editor).await.unwrap();

    assert_eq!(
        outcome,
        DomainEdit::Updated {
            vault_filepath: "/v.vault".into()
        }
    );
    assert_eq!(editor.shown(), vec!["[prod]\nB=2".to_string()]);
    assert_eq!(
        h.open_file("/v.vault", PW).await,
        bundle(vec![
            domain("dev", &[("A", "1")]),
            domain("prod", &[("B", "3"), ("C", "4")]),
            domain("test", &[]),
        ])
    );
    assert_eq!(h.files.write_count(), 1);
}

#[tokio::test]
async fn edit_domain_can_rename() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &bundle(vec![domain("dev", &[]), domain("prod", &[])])).await;

    let editor = ScriptedEditor::saving(&["[staging]\nX=1"]);
    h.ops.edit_domain("prod", &editor).await.unwrap();

    assert_eq!(
        h.open_file("/v.vault", PW).await,
        bundle(vec![domain("dev", &[]), domain("staging", &[("X", "1")])])
    );
}

#[tokio::test]
async fn edit_domain_rejects_rename_onto_sibling() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &bundle(vec![domain("dev", &[]), domain("prod", &[])])).await;

    let editor = ScriptedEditor::saving(&["[dev]\nX=1", "[prod]\nX=1"]);
    h.ops.edit_domain("prod", &editor).await.unwrap();

    assert_eq!(editor.rejections(), vec!["Domain dev already exists in this vault".to_string()]);
    assert_eq!(
        h.open_file("/v.vault", PW).await,
        bundle(vec![domain("dev", &[]), domain("prod", &[("X", "1")])])
    );
}

#[tokio::test]
async fn edit_domain_without_changes_writes_nothing() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &bundle(vec![domain("prod", &[("A", "1")])])).await;

    let outcome = h
        .ops
        .edit_domain("prod", &ScriptedEditor::unchanged())
        .await
        .unwrap();
    assert_eq!(outcome, DomainEdit::Unchanged);
    assert_eq!(h.files.write_count(), 0);
    assert_eq!(h.cipher.encrypt_count(), 0);
}

#[tokio::test]
async fn edit_domain_requires_exactly_one_holder() {
    let h = Harness::new(PW);
    let editor = ScriptedEditor::unchanged();

    let err = h.ops.edit_domain("prod", &editor).await.unwrap_err();
    assert_eq!(user_message(err), "No vault contains domain prod");

    h.seed_vault("/a.vault", "pa", &bundle(vec![domain("prod", &[])])).await;
    h.seed_vault("/b.vault", "pb", &bundle(vec![domain("prod", &[])])).await;
    let err = h.ops.edit_domain("prod", &editor).await.unwrap_err();
    assert_eq!(user_message(err), "Multiple vaults contain domain prod");
}

// ---------------------------------------------------------------------------
// importFromEnvchain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_builds_one_domain_per_namespace() {
    let h = Harness::new(PW);
    let envchain = FakeEnvchain::default()
        .with("aws", &[("AWS_SECRET", "s"), ("AWS_KEY", "k")])
        .with("gh", &[("GH_TOKEN", "g")]);
    let namespaces = vec!["gh".to_string(), "aws".to_string(), "unknown".to_string()];

    h.ops
        .import_from_envchain("/i.vault", &namespaces, &envchain)
        .await
        .unwrap();

    assert_eq!(
        h.open_file("/i.vault", PW).await,
        bundle(vec![
            domain("aws", &[("AWS_KEY", "k"), ("AWS_SECRET", "s")]),
            domain("gh", &[("GH_TOKEN", "g")]),
            domain("unknown", &[]),
        ])
    );
    assert_eq!(h.credentials.len().await, 1);
}

#[tokio::test]
async fn import_rejects_repeated_namespace() {
    let h = Harness::new(PW);
    let namespaces = vec!["aws".to_string(), "aws".to_string()];

    let err = h
        .ops
        .import_from_envchain("/i.vault", &namespaces, &FakeEnvchain::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WellKeptError::DuplicateName(ref n) if n == "aws"));
    assert_eq!(h.files.write_count(), 0);
    assert_eq!(h.input.prompt_count(), 0);
}

#[tokio::test]
async fn import_shares_create_preconditions() {
    let h = Harness::new(PW);
    h.files.seed("/i.vault", "taken").await;

    let err = h
        .ops
        .import_from_envchain("/i.vault", &["aws".to_string()], &FakeEnvchain::default())
        .await
        .unwrap_err();
    assert_eq!(user_message(err), "File /i.vault already exists");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_report_every_status() {
    let h = Harness::new(PW);
    h.seed_vault(
        "/1-ok.vault",
        PW,
        &bundle(vec![domain("dev", &[("A", "1"), ("B", "2")]), domain("prod", &[])]),
    )
    .await;
    h.credentials.insert("/2-missing.vault", PW, CredentialStatus::Ok).await;
    h.credentials
        .insert(
            "/3-broken.vault",
            "",
            CredentialStatus::Broken {
                code: BrokenCode::UnknownVersion,
                message: "Unknown credentials version, try upgrading the app".into(),
            },
        )
        .await;
    h.files.mark_unreadable("/4-locked.vault").await;
    h.credentials.insert("/4-locked.vault", PW, CredentialStatus::Ok).await;
    h.seed_file("/5-wrong.vault", "real", &DomainsBundle::empty()).await;
    h.credentials.insert("/5-wrong.vault", "stale", CredentialStatus::Ok).await;
    let future_schema = fast_cipher()
        .encrypt(&json!({"v": 2, "domains": []}), PW)
        .unwrap();
    h.files.seed("/6-future.vault", &future_schema).await;
    h.credentials.insert("/6-future.vault", PW, CredentialStatus::Ok).await;

    let stats = h.ops.vault_stats().await.unwrap();
    let statuses: Vec<(&str, bool)> = stats
        .iter()
        .map(|s| (s.status.split(' ').next().unwrap_or(""), s.ok))
        .collect();
    assert_eq!(
        statuses,
        [
            ("ok", true),
            ("missing", false),
            ("broken_key", false),
            ("cannot_read", false),
            ("cannot_decrypt", false),
            ("cannot_parse", false),
        ]
    );

    assert_eq!(stats[0].domains.len(), 2);
    assert_eq!(stats[0].domains[0].name, "dev");
    assert_eq!(stats[0].domains[0].num_secrets, 2);
    assert_eq!(stats[0].domains[1].num_secrets, 0);
    assert_eq!(stats[1].status, "missing");
    assert_eq!(
        stats[2].status,
        "broken_key Unknown credentials version, try upgrading the app"
    );
    assert!(stats[5].status.contains("unknown version"));
    assert!(stats[1..].iter().all(|s| s.domains.is_empty()));
}

#[tokio::test]
async fn listing_reads_fresh_state_every_time() {
    let h = Harness::new(PW);
    h.seed_vault("/v.vault", PW, &DomainsBundle::empty()).await;
    assert!(h.ops.vault_stats().await.unwrap()[0].ok);

    h.files.remove("/v.vault").await;
    assert_eq!(h.ops.vault_stats().await.unwrap()[0].status, "missing");
    assert_eq!(h.cipher.decrypt_count(), 1);
}

#[tokio::test]
async fn empty_registry_lists_nothing() {
    let h = Harness::new(PW);
    assert!(h.ops.vault_stats().await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_are_sorted_by_path_whatever_the_store_order() {
    let h = Harness::new(PW);
    h.seed_vault("/b.vault", PW, &bundle(vec![domain("b", &[])])).await;
    h.seed_vault("/a.vault", PW, &bundle(vec![domain("a", &[])])).await;
    h.credentials.insert("/0-gone.vault", PW, CredentialStatus::Ok).await;

    let stats = h.ops.vault_stats().await.unwrap();
    let paths: Vec<&str> = stats.iter().map(|s| s.vault_filepath.as_str()).collect();
    assert_eq!(paths, ["/0-gone.vault", "/a.vault", "/b.vault"]);
    assert_eq!(stats[1].domains[0].name, "a");
}
