mod logging;

use std::sync::Arc;

use banking_session::{
    ApiClient, GuardDecision, LoginCredentials, RouteTargets, RoutePolicy, Session,
    SessionManager, identity_store_from_env, wait_for_decision,
};

use logging::init_tracing;

/// Pages of the banking front end and who may see them.
const ROUTES: &[(&str, RoutePolicy, &str)] = &[
    ("/", RoutePolicy::RequireAuthenticated, "home"),
    ("/login", RoutePolicy::RequireAnonymous, "login"),
    ("/cadastro", RoutePolicy::RequireAnonymous, "sign-up"),
    ("/transferir", RoutePolicy::RequireAuthenticated, "transfer"),
    ("/historico", RoutePolicy::RequireAuthenticated, "history"),
    ("/perfil", RoutePolicy::RequireAuthenticated, "profile"),
];

const USAGE: &str = "\
Usage: demo-cli <command>

Commands:
  status                     show the session and what each page would do
  login <email> <password>   sign in
  logout                     sign out
  profile                    show the signed-in user's profile
  users                      list transfer recipients
  history [page] [size]      show transaction history
  delete                     delete the signed-in user's account";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("demo-cli");

    dotenvy::dotenv().ok();

    let client = ApiClient::from_env()?;
    let store = identity_store_from_env().await?;
    let manager = Arc::new(SessionManager::new(Arc::new(client.clone()), store));
    let targets = RouteTargets::default();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");

    let mut rx = manager.subscribe();
    let init = Arc::clone(&manager);
    tokio::spawn(async move {
        init.initialize().await;
    });

    match command {
        "status" => {
            for (path, policy, view) in ROUTES {
                let decision = wait_for_decision(&mut rx, *policy, &targets, path, *view).await;
                println!("{:<12} {}", path, describe(&decision));
            }
            print_session(&manager.snapshot());
        }
        "login" => {
            let (Some(email), Some(password)) = (args.get(1), args.get(2)) else {
                println!("{USAGE}");
                return Ok(());
            };
            if let Some(redirect) = guard(&mut rx, &targets, "/login").await {
                println!("Already signed in, go to {redirect}");
                return Ok(());
            }
            let credentials = LoginCredentials::new(email.as_str(), password.as_str());
            if !credentials.is_complete() {
                println!("Email and password are required");
                return Ok(());
            }
            match manager.sign_in(&credentials).await {
                Ok(session) => print_session(&session),
                Err(e) => println!("{e}"),
            }
        }
        "logout" => {
            manager.initialize().await;
            print_session(&manager.logout().await);
            // Give the background notification a moment before the runtime exits
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
        "profile" => {
            if let Some(redirect) = guard(&mut rx, &targets, "/perfil").await {
                println!("Not signed in, go to {redirect}");
                return Ok(());
            }
            let session = manager.snapshot();
            let Some(user_id) = session.user_id() else {
                return Ok(());
            };
            match client.fetch_profile(user_id).await {
                Ok(profile) => {
                    println!("Name:     {}", profile.name.as_deref().unwrap_or_default());
                    println!("Email:    {}", profile.email.as_deref().unwrap_or_default());
                    println!("Category: {:?}", profile.account_category());
                    if let Some(balance) = profile.balance {
                        println!("Balance:  {balance:.2}");
                    }
                }
                Err(failure) => println!("{}", failure.message),
            }
        }
        "users" => {
            if let Some(redirect) = guard(&mut rx, &targets, "/transferir").await {
                println!("Not signed in, go to {redirect}");
                return Ok(());
            }
            match client.list_users().await {
                Ok(users) => {
                    for user in users {
                        println!(
                            "{:>6}  {:<30} {}",
                            user.id.map(|id| id.to_string()).unwrap_or_default(),
                            user.name.unwrap_or_default(),
                            user.email.unwrap_or_default()
                        );
                    }
                }
                Err(failure) => println!("{}", failure.message),
            }
        }
        "history" => {
            if let Some(redirect) = guard(&mut rx, &targets, "/historico").await {
                println!("Not signed in, go to {redirect}");
                return Ok(());
            }
            let page = args.get(1).and_then(|p| p.parse().ok()).unwrap_or(0);
            let size = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
            match client.history(page, size).await {
                Ok(history) => {
                    for entry in &history.content {
                        println!(
                            "{:<20} {:?} {:>12.2} {}",
                            entry.created_at.as_deref().unwrap_or("-"),
                            entry.direction,
                            entry.amount,
                            entry
                                .counterpart
                                .as_ref()
                                .and_then(|u| u.name.as_deref())
                                .unwrap_or("-")
                        );
                    }
                    println!(
                        "Page {} of {} ({} transactions)",
                        history.number + 1,
                        history.total_pages.max(1),
                        history.total_elements
                    );
                }
                Err(failure) => println!("{}", failure.message),
            }
        }
        "delete" => {
            if let Some(redirect) = guard(&mut rx, &targets, "/perfil").await {
                println!("Not signed in, go to {redirect}");
                return Ok(());
            }
            match manager.delete_account().await {
                Ok(()) => println!("Account deleted"),
                Err(e) => println!("{e}"),
            }
        }
        _ => println!("{USAGE}"),
    }

    Ok(())
}

/// Evaluates the policy of `path` and returns where the user is sent, if
/// anywhere.
async fn guard(
    rx: &mut tokio::sync::watch::Receiver<Session>,
    targets: &RouteTargets,
    path: &str,
) -> Option<String> {
    let policy = ROUTES
        .iter()
        .find(|(p, _, _)| *p == path)
        .map(|(_, policy, _)| *policy)
        .unwrap_or(RoutePolicy::RequireAuthenticated);

    match wait_for_decision(rx, policy, targets, path, ()).await {
        GuardDecision::Render(()) => None,
        GuardDecision::Redirect(redirect) => Some(redirect.to),
        GuardDecision::Pending => Some(targets.login.clone()),
    }
}

fn describe(decision: &GuardDecision<&str>) -> String {
    match decision {
        GuardDecision::Pending => "loading".to_string(),
        GuardDecision::Render(view) => format!("render {view}"),
        GuardDecision::Redirect(redirect) => match &redirect.from {
            Some(from) => format!("redirect to {} (from {})", redirect.to, from),
            None => format!("redirect to {}", redirect.to),
        },
    }
}

fn print_session(session: &Session) {
    match session.user_id() {
        Some(user_id) => println!(
            "Signed in as user {} ({:?})",
            user_id,
            session.account_category()
        ),
        None => println!("Not signed in"),
    }
}
