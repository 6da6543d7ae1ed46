//! Account commands: login, register, logout.

use std::path::PathBuf;

use redseam_storefront::{AvatarUpload, RegistrationForm, SessionError, StorefrontApp};

/// Log in and load the account's cart.
#[allow(clippy::print_stdout)]
pub async fn login(
    app: &StorefrontApp,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = app.tracker().login(email, password).await?;
    println!("logged in as {} ({})", user.username, user.email);
    println!("cart: {} items", app.store().snapshot().total_quantity());
    Ok(())
}

/// Create an account and log it in.
#[allow(clippy::print_stdout)]
pub async fn register(
    app: &StorefrontApp,
    username: String,
    email: String,
    password: String,
    avatar: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let avatar = match avatar {
        Some(path) => {
            let content = std::fs::read(&path)?;
            let file_name = path
                .file_name()
                .map_or_else(|| "avatar".to_string(), |name| name.to_string_lossy().into_owned());
            Some(AvatarUpload { file_name, content })
        }
        None => None,
    };

    let form = RegistrationForm {
        username,
        email,
        password: password.clone(),
        password_confirmation: password,
        avatar,
    };

    match app.tracker().register(&form).await {
        Ok(user) => {
            println!("registered {} ({})", user.username, user.email);
            Ok(())
        }
        Err(SessionError::Validation { message, errors }) => {
            println!("{message}");
            for (field, error) in errors.iter() {
                println!("  {field}: {error}");
            }
            Err(message.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and clear local state.
#[allow(clippy::print_stdout)]
pub fn logout(app: &StorefrontApp) -> Result<(), Box<dyn std::error::Error>> {
    app.tracker().logout()?;
    println!("logged out");
    Ok(())
}
