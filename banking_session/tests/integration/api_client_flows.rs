//! `ApiClient` against the mock backend: cookies, DTO shapes and failures.

use crate::common::TestSetup;
use banking_session::{
    AccountCategory, LoginCredentials, NewAccount, ProfileUpdate, TransferDirection,
    TransferRequest, UserId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_verify_without_cookie_is_unauthorized() {
    // Given a fresh client with no session cookie
    let setup = TestSetup::start().await;

    // When verifying
    let failure = setup.client.verify_session().await.unwrap_err();

    // Then the backend's error body is carried through
    assert_eq!(failure.status, 401);
    assert_eq!(failure.message, "Token inválido ou expirado");
    assert_eq!(failure.code.as_deref(), Some("Unauthorized"));
}

#[tokio::test]
async fn test_login_stores_session_cookie() {
    let setup = TestSetup::start().await;

    // When logging in with valid credentials
    let profile = setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "senha123"))
        .await
        .unwrap();

    // Then the profile is unwrapped and later calls carry the cookie
    assert_eq!(profile.id, Some(UserId::new("1")));
    assert_eq!(profile.account_category(), AccountCategory::Individual);
    setup.client.verify_session().await.unwrap();
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let setup = TestSetup::start().await;

    let failure = setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "errada"))
        .await
        .unwrap_err();

    assert_eq!(failure.status, 403);
    assert_eq!(failure.message, "Email ou senha inválidos");
    assert!(setup.client.verify_session().await.is_err());
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    // Given a logged-in client
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "senha123"))
        .await
        .unwrap();

    // When logging out
    setup.client.logout().await.unwrap();

    // Then the session no longer verifies
    assert_eq!(setup.client.verify_session().await.unwrap_err().status, 401);
}

#[tokio::test]
async fn test_fetch_profile_decodes_money_and_dates() {
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("contato@acme.com", "acme2024"))
        .await
        .unwrap();

    let profile = setup.client.fetch_profile(&UserId::new("2")).await.unwrap();

    assert_eq!(profile.name.as_deref(), Some("ACME Ltda"));
    assert_eq!(profile.account_category(), AccountCategory::Organization);
    assert_eq!(profile.balance, Some(Decimal::from(50000)));
    assert_eq!(profile.monthly_income, Some(Decimal::from(3500)));
    assert_eq!(
        profile.birth_date_parsed(),
        NaiveDate::from_ymd_opt(1990, 5, 17)
    );
}

#[tokio::test]
async fn test_fetch_unknown_profile_is_not_found() {
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "senha123"))
        .await
        .unwrap();

    let failure = setup
        .client
        .fetch_profile(&UserId::new("999"))
        .await
        .unwrap_err();

    assert_eq!(failure.status, 404);
    assert_eq!(failure.message, "Usuário não encontrado");
}

fn new_account(email: &str) -> NewAccount {
    NewAccount {
        name: "João Souza".to_string(),
        email: email.to_string(),
        password: "joao1234".to_string(),
        fiscal_id: "987.654.321-00".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1985, 1, 31).unwrap(),
        monthly_income: Decimal::new(420050, 2),
    }
}

#[tokio::test]
async fn test_create_account_then_login() {
    // Given a newly registered account
    let setup = TestSetup::start().await;
    let created = setup
        .client
        .create_account(&new_account("joao@example.com"))
        .await
        .unwrap();
    assert!(created.id.is_some());
    assert_eq!(created.email.as_deref(), Some("joao@example.com"));

    // When logging in with its credentials
    let profile = setup
        .client
        .login(&LoginCredentials::new("joao@example.com", "joao1234"))
        .await
        .unwrap();

    // Then the new user is returned
    assert_eq!(profile.id, created.id);
    assert_eq!(profile.account_category(), AccountCategory::Individual);
}

#[tokio::test]
async fn test_create_account_with_taken_email() {
    let setup = TestSetup::start().await;

    let failure = setup
        .client
        .create_account(&new_account("maria@example.com"))
        .await
        .unwrap_err();

    assert_eq!(failure.status, 409);
    assert_eq!(failure.message, "Email já cadastrado");
    assert_eq!(failure.code.as_deref(), Some("Conflict"));
}

#[tokio::test]
async fn test_list_users_and_update_profile() {
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "senha123"))
        .await
        .unwrap();

    let users = setup.client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);

    // When renaming the current user
    let mut update = ProfileUpdate::new(UserId::new("1"));
    update.name = Some("Maria S. Oliveira".to_string());
    let echoed = setup.client.update_profile(&update).await.unwrap();

    // Then the echo matches and the profile reflects the change
    assert_eq!(echoed, update);
    let profile = setup.client.fetch_profile(&UserId::new("1")).await.unwrap();
    assert_eq!(profile.name.as_deref(), Some("Maria S. Oliveira"));
}

#[tokio::test]
async fn test_transfer_shows_up_in_both_histories() {
    // Given Maria sends money to ACME
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "senha123"))
        .await
        .unwrap();
    let receipt = setup
        .client
        .transfer(&TransferRequest {
            recipient_id: UserId::new("2"),
            amount: Decimal::new(1505, 1),
            description: Some("Aluguel".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(receipt.amount, Decimal::new(1505, 1));
    assert_eq!(setup.backend.state.balance_of(1), Some(849.5));

    // When each side reads its history
    let sent = setup.client.history(0, 10).await.unwrap();
    setup.client.logout().await.unwrap();
    setup
        .client
        .login(&LoginCredentials::new("contato@acme.com", "acme2024"))
        .await
        .unwrap();
    let received = setup.client.history(0, 10).await.unwrap();

    // Then the direction is seen from each user's perspective
    assert_eq!(sent.total_elements, 1);
    assert_eq!(sent.content[0].direction, TransferDirection::Sent);
    assert_eq!(
        sent.content[0]
            .counterpart
            .as_ref()
            .and_then(|u| u.name.as_deref()),
        Some("ACME Ltda")
    );
    assert_eq!(received.content[0].direction, TransferDirection::Received);
    assert_eq!(received.content[0].description.as_deref(), Some("Aluguel"));
}

#[tokio::test]
async fn test_transfer_with_insufficient_balance() {
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("maria@example.com", "senha123"))
        .await
        .unwrap();

    let failure = setup
        .client
        .transfer(&TransferRequest {
            recipient_id: UserId::new("2"),
            amount: Decimal::from(5000),
            description: None,
        })
        .await
        .unwrap_err();

    assert_eq!(failure.status, 400);
    assert_eq!(failure.message, "Saldo insuficiente");
    assert_eq!(setup.backend.state.balance_of(1), Some(1000.0));
}

#[tokio::test]
async fn test_history_paging() {
    let setup = TestSetup::start().await;
    setup
        .client
        .login(&LoginCredentials::new("contato@acme.com", "acme2024"))
        .await
        .unwrap();
    for cents in [100, 200, 300] {
        setup
            .client
            .transfer(&TransferRequest {
                recipient_id: UserId::new("1"),
                amount: Decimal::new(cents, 2),
                description: None,
            })
            .await
            .unwrap();
    }

    let page = setup.client.history(1, 2).await.unwrap();

    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.number, 1);
    assert_eq!(page.content.len(), 1);
    // Newest first, so the last page holds the oldest transfer
    assert_eq!(page.content[0].amount, Decimal::new(100, 2));
}
